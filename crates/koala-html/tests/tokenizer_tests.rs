//! Integration tests for the HTML tokenizer.

use koala_html::{HTMLTokenizer, ParseErrorKind, ParseStage, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    HTMLTokenizer::new(input).with_quiet(true).collect()
}

/// Helper to tokenize a string and return the parse error kinds
fn error_kinds(input: &str) -> Vec<ParseErrorKind> {
    let mut tokenizer = HTMLTokenizer::new(input).with_quiet(true);
    while tokenizer.next_token().is_some() {}
    tokenizer.issues().iter().map(|issue| issue.kind).collect()
}

/// Concatenate the character tokens.
fn text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

fn start_tag(name: &str) -> Token {
    Token::StartTag {
        name: name.to_owned(),
        self_closing: false,
    }
}

fn end_tag(name: &str) -> Token {
    Token::EndTag {
        name: name.to_owned(),
        self_closing: false,
    }
}

fn comment(data: &str) -> Token {
    Token::Comment {
        data: data.to_owned(),
    }
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert_eq!(tokens[0], Token::Character { data: 'H' });
    assert_eq!(tokens[4], Token::Character { data: 'o' });
    assert_eq!(tokens[5], Token::EndOfFile);
}

#[test]
fn test_empty_input_is_just_eof() {
    assert_eq!(tokenize(""), vec![Token::EndOfFile]);
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(
        tokens,
        vec![
            Token::Doctype {
                name: Some("html".to_owned()),
                public_identifier: None,
                system_identifier: None,
                force_quirks: false,
            },
            Token::EndOfFile,
        ]
    );
    assert!(error_kinds("<!DOCTYPE html>").is_empty());
}

#[test]
fn test_doctype_keyword_and_name_are_case_insensitive() {
    let tokens = tokenize("<!doctype HTML>");
    assert!(matches!(
        &tokens[0],
        Token::Doctype { name: Some(name), .. } if name == "html"
    ));
}

#[test]
fn test_doctype_public_without_identifier() {
    let tokens = tokenize("<!DOCTYPE HTML PUBLIC>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(public_identifier, &None);
            assert_eq!(system_identifier, &None);
            assert!(force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
    assert_eq!(
        error_kinds("<!DOCTYPE HTML PUBLIC>"),
        vec![ParseErrorKind::MissingDoctypePublicIdentifier]
    );
}

#[test]
fn test_doctype_with_public_and_system_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    match &tokens[0] {
        Token::Doctype {
            public_identifier,
            system_identifier,
            force_quirks,
            ..
        } => {
            assert_eq!(public_identifier.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_empty_identifier_is_not_missing() {
    let tokens = tokenize(r#"<!DOCTYPE html SYSTEM "">"#);
    assert!(matches!(
        &tokens[0],
        Token::Doctype {
            system_identifier: Some(system),
            public_identifier: None,
            ..
        } if system.is_empty()
    ));
}

#[test]
fn test_doctype_without_name() {
    let tokens = tokenize("<!DOCTYPE>");
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: None,
            public_identifier: None,
            system_identifier: None,
            force_quirks: true,
        }
    );
    assert_eq!(
        error_kinds("<!DOCTYPE>"),
        vec![ParseErrorKind::MissingDoctypeName]
    );
}

#[test]
fn test_doctype_eof() {
    let tokens = tokenize("<!DOCTYPE html");
    assert!(matches!(
        &tokens[0],
        Token::Doctype { name: Some(name), force_quirks: true, .. } if name == "html"
    ));
    assert_eq!(tokens[1], Token::EndOfFile);
    assert_eq!(error_kinds("<!DOCTYPE html"), vec![ParseErrorKind::EofInDoctype]);
}

#[test]
fn test_bogus_doctype() {
    let tokens = tokenize("<!DOCTYPE html bogus>x");
    assert!(matches!(
        &tokens[0],
        Token::Doctype { force_quirks: true, .. }
    ));
    assert_eq!(tokens[1], Token::Character { data: 'x' });
}

#[test]
fn test_start_and_end_tags() {
    let tokens = tokenize("<div>Hi</div>");
    assert_eq!(
        tokens,
        vec![
            start_tag("div"),
            Token::Character { data: 'H' },
            Token::Character { data: 'i' },
            end_tag("div"),
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_tag_names_are_lowercased() {
    let tokens = tokenize("<DIV></Div>");
    assert_eq!(tokens[0], start_tag("div"));
    assert_eq!(tokens[1], end_tag("div"));
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert_eq!(
        tokens[0],
        Token::StartTag {
            name: "br".to_owned(),
            self_closing: true,
        }
    );
}

#[test]
fn test_attributes_are_consumed_and_dropped() {
    let tokens = tokenize(r#"<a href="x" title='y' data-z=1 hidden>link</a>"#);
    assert_eq!(tokens[0], start_tag("a"));
    assert_eq!(text(&tokens), "link");
    assert!(error_kinds(r#"<a href="x" title='y' data-z=1 hidden>"#).is_empty());
}

#[test]
fn test_attribute_value_with_gt_inside_quotes() {
    let tokens = tokenize(r#"<p title="a>b">c"#);
    assert_eq!(tokens[0], start_tag("p"));
    assert_eq!(text(&tokens), "c");
}

#[test]
fn test_duplicate_attribute() {
    assert_eq!(
        error_kinds(r#"<p id="a" ID="b">"#),
        vec![ParseErrorKind::DuplicateAttribute]
    );
}

#[test]
fn test_duplicates_are_per_tag() {
    assert!(error_kinds(r#"<p id="a"><p id="b">"#).is_empty());
}

#[test]
fn test_end_tag_with_attributes() {
    assert_eq!(
        error_kinds(r#"</p class="x">"#),
        vec![ParseErrorKind::EndTagWithAttributes]
    );
}

#[test]
fn test_end_tag_with_trailing_solidus() {
    assert_eq!(
        error_kinds("</p/>"),
        vec![ParseErrorKind::EndTagWithTrailingSolidus]
    );
}

#[test]
fn test_missing_whitespace_between_attributes() {
    assert_eq!(
        error_kinds(r#"<p a="1"b="2">"#),
        vec![ParseErrorKind::MissingWhitespaceBetweenAttributes]
    );
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(tokens, vec![comment(" hello "), Token::EndOfFile]);
}

#[test]
fn test_comment_with_dashes() {
    assert_eq!(tokenize("<!--a-b--c-->")[0], comment("a-b--c"));
}

#[test]
fn test_abrupt_empty_comment() {
    assert_eq!(tokenize("<!-->")[0], comment(""));
    assert_eq!(
        error_kinds("<!-->"),
        vec![ParseErrorKind::AbruptClosingOfEmptyComment]
    );
}

#[test]
fn test_incorrectly_closed_comment() {
    assert_eq!(tokenize("<!--x--!>")[0], comment("x"));
    assert_eq!(
        error_kinds("<!--x--!>"),
        vec![ParseErrorKind::IncorrectlyClosedComment]
    );
}

#[test]
fn test_nested_comment() {
    assert_eq!(tokenize("<!--<!--x-->")[0], comment("<!--x"));
    assert_eq!(error_kinds("<!--<!--x-->"), vec![ParseErrorKind::NestedComment]);
}

#[test]
fn test_comment_eof() {
    let tokens = tokenize("<!--abc");
    assert_eq!(tokens, vec![comment("abc"), Token::EndOfFile]);
    assert_eq!(error_kinds("<!--abc"), vec![ParseErrorKind::EofInComment]);
}

#[test]
fn test_incorrectly_opened_comment() {
    assert_eq!(tokenize("<!x>")[0], comment("x"));
    assert_eq!(
        error_kinds("<!x>"),
        vec![ParseErrorKind::IncorrectlyOpenedComment]
    );
}

#[test]
fn test_cdata_in_html_content() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert_eq!(tokens, vec![comment("[CDATA[x]]"), Token::EndOfFile]);
    assert_eq!(
        error_kinds("<![CDATA[x]]>"),
        vec![ParseErrorKind::CdataInHtmlContent]
    );
}

#[test]
fn test_processing_instruction_becomes_bogus_comment() {
    let tokens = tokenize(r#"<?xml version="1.0"?>"#);
    assert_eq!(
        tokens,
        vec![comment(r#"?xml version="1.0"?"#), Token::EndOfFile]
    );
    assert_eq!(
        error_kinds("<?x?>"),
        vec![ParseErrorKind::UnexpectedQuestionMarkInsteadOfTagName]
    );
}

#[test]
fn test_less_than_sign_not_starting_a_tag() {
    let tokens = tokenize("a < b");
    assert_eq!(text(&tokens), "a < b");
    assert_eq!(
        error_kinds("a < b"),
        vec![ParseErrorKind::InvalidFirstCharacterOfTagName]
    );
}

#[test]
fn test_eof_after_less_than_sign() {
    let tokens = tokenize("<");
    assert_eq!(tokens, vec![Token::Character { data: '<' }, Token::EndOfFile]);
}

#[test]
fn test_eof_in_tag_drops_the_tag() {
    let tokens = tokenize("x<div class=");
    assert_eq!(tokens, vec![Token::Character { data: 'x' }, Token::EndOfFile]);
    assert_eq!(error_kinds("<div class="), vec![ParseErrorKind::EofInTag]);
}

#[test]
fn test_named_character_references() {
    assert_eq!(text(&tokenize("&amp;&lt;&gt;&quot;&apos;")), "&<>\"'");
    assert_eq!(text(&tokenize("&copy; 2024")), "\u{00A9} 2024");
    assert_eq!(text(&tokenize("a&nbsp;b")), "a\u{00A0}b");
}

#[test]
fn test_legacy_named_reference_without_semicolon() {
    assert_eq!(text(&tokenize("&amp")), "&");
    assert_eq!(
        error_kinds("&amp"),
        vec![ParseErrorKind::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn test_unknown_named_reference_is_left_alone() {
    assert_eq!(text(&tokenize("&bogus;")), "&bogus;");
    assert_eq!(
        error_kinds("&bogus;"),
        vec![ParseErrorKind::UnknownNamedCharacterReference]
    );
    assert_eq!(text(&tokenize("a & b")), "a & b");
    assert!(error_kinds("a & b").is_empty());
}

#[test]
fn test_numeric_character_references() {
    assert_eq!(text(&tokenize("&#65;&#x42;&#X43;")), "ABC");
    assert_eq!(text(&tokenize("&#x1F600;")), "\u{1F600}");
}

#[test]
fn test_numeric_reference_without_semicolon() {
    assert_eq!(text(&tokenize("&#65x")), "Ax");
    assert_eq!(
        error_kinds("&#65x"),
        vec![ParseErrorKind::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn test_numeric_reference_edge_cases() {
    assert_eq!(text(&tokenize("&#0;")), "\u{FFFD}");
    assert_eq!(error_kinds("&#0;"), vec![ParseErrorKind::NullCharacterReference]);

    assert_eq!(text(&tokenize("&#x110000;")), "\u{FFFD}");
    assert_eq!(
        error_kinds("&#x110000;"),
        vec![ParseErrorKind::CharacterReferenceOutsideUnicodeRange]
    );

    assert_eq!(text(&tokenize("&#xD800;")), "\u{FFFD}");
    assert_eq!(
        error_kinds("&#xD800;"),
        vec![ParseErrorKind::SurrogateCharacterReference]
    );

    assert_eq!(text(&tokenize("&#99999999999999999999;")), "\u{FFFD}");
}

#[test]
fn test_c1_control_reference_is_remapped() {
    assert_eq!(text(&tokenize("&#x80;")), "\u{20AC}");
    assert_eq!(
        error_kinds("&#x80;"),
        vec![ParseErrorKind::ControlCharacterReference]
    );
}

#[test]
fn test_absence_of_digits() {
    assert_eq!(text(&tokenize("&#;")), "&#;");
    assert_eq!(
        error_kinds("&#;"),
        vec![ParseErrorKind::AbsenceOfDigitsInNumericCharacterReference]
    );
}

#[test]
fn test_character_reference_in_attribute_is_not_emitted() {
    let tokens = tokenize(r#"<a title="&amp;">x"#);
    assert_eq!(text(&tokens), "x");
}

#[test]
fn test_null_character_in_data() {
    assert_eq!(text(&tokenize("a\0b")), "a\0b");
    assert_eq!(
        error_kinds("a\0b"),
        vec![ParseErrorKind::UnexpectedNullCharacter]
    );
}

#[test]
fn test_control_characters_are_errors_but_still_emitted() {
    assert_eq!(text(&tokenize("a\u{1}b")), "a\u{1}b");
    assert_eq!(
        error_kinds("a\u{1}b"),
        vec![ParseErrorKind::ControlCharacterInInputStream]
    );
    assert_eq!(
        error_kinds("\u{FDD0}"),
        vec![ParseErrorKind::NoncharacterInInputStream]
    );
}

#[test]
fn test_control_character_is_reported_once_when_reconsumed() {
    // The `<` state reconsumes the control character in the data state.
    assert_eq!(
        error_kinds("<\u{1}"),
        vec![
            ParseErrorKind::ControlCharacterInInputStream,
            ParseErrorKind::InvalidFirstCharacterOfTagName,
        ]
    );
}

#[test]
fn test_newlines_are_normalized() {
    assert_eq!(text(&tokenize("a\r\nb\rc")), "a\nb\nc");
}

#[test]
fn test_issue_positions_and_stage() {
    let mut tokenizer = HTMLTokenizer::new("ab\0").with_quiet(true);
    while tokenizer.next_token().is_some() {}
    let issues = tokenizer.take_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].position, 2);
    assert_eq!(issues[0].stage, ParseStage::Tokenizer);
    assert!(tokenizer.issues().is_empty());
}

/// Issues raised for the input stream itself, with their positions.
fn input_stream_issues(input: &str) -> Vec<(ParseErrorKind, usize)> {
    let mut tokenizer = HTMLTokenizer::new(input).with_quiet(true);
    while tokenizer.next_token().is_some() {}
    tokenizer
        .take_issues()
        .into_iter()
        .map(|issue| (issue.kind, issue.position))
        .collect()
}

#[test]
fn test_control_character_position() {
    assert_eq!(
        input_stream_issues("ab\u{1}c"),
        vec![(ParseErrorKind::ControlCharacterInInputStream, 2)]
    );
}

#[test]
fn test_noncharacter_position() {
    assert_eq!(
        input_stream_issues("xyz\u{FDD0}"),
        vec![(ParseErrorKind::NoncharacterInInputStream, 3)]
    );
}

#[test]
fn test_reconsumed_control_character_position() {
    // Both errors point at the control character.
    assert_eq!(
        input_stream_issues("a<\u{1}"),
        vec![
            (ParseErrorKind::ControlCharacterInInputStream, 2),
            (ParseErrorKind::InvalidFirstCharacterOfTagName, 2),
        ]
    );
}

#[test]
fn test_eof_is_emitted_exactly_once() {
    let mut tokenizer = HTMLTokenizer::new("<p>x").with_quiet(true);
    let tokens: Vec<Token> = tokenizer.by_ref().collect();
    assert_eq!(tokens.iter().filter(|token| token.is_eof()).count(), 1);
    assert_eq!(tokens.last(), Some(&Token::EndOfFile));
    assert_eq!(tokenizer.next_token(), None);
    assert_eq!(tokenizer.next(), None);
}

#[test]
fn test_tokenizer_is_lazy() {
    let mut tokenizer = HTMLTokenizer::new("<p>abc</p>").with_quiet(true);
    assert_eq!(tokenizer.next_token(), Some(start_tag("p")));
    assert_eq!(tokenizer.next_token(), Some(Token::Character { data: 'a' }));
    assert_eq!(tokenizer.position(), 4);
}

#[test]
fn test_token_json_snapshot() {
    let tokens = tokenize("<!DOCTYPE html><p>x</p><!--c-->");
    let json = serde_json::to_value(&tokens).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "type": "Doctype",
                "name": "html",
                "public_identifier": null,
                "system_identifier": null,
                "force_quirks": false
            },
            { "type": "StartTag", "name": "p", "self_closing": false },
            { "type": "Character", "data": "x" },
            { "type": "EndTag", "name": "p", "self_closing": false },
            { "type": "Comment", "data": "c" },
            { "type": "EndOfFile" }
        ])
    );
}

#[test]
fn test_parse_error_codes_are_kebab_case() {
    assert_eq!(
        ParseErrorKind::ControlCharacterInInputStream.to_string(),
        "control-character-in-input-stream"
    );
    let code: &'static str = ParseErrorKind::MissingDoctypeName.into();
    assert_eq!(code, "missing-doctype-name");
    assert_eq!(ParseStage::Tokenizer.to_string(), "tokenizer");
}

#[test]
fn test_token_display() {
    assert_eq!(start_tag("div").to_string(), "<div>");
    assert_eq!(end_tag("div").to_string(), "</div>");
    assert_eq!(comment("x").to_string(), "<!--x-->");
    assert_eq!(Token::EndOfFile.to_string(), "EOF");
}
