//! DOCTYPE states, [§ 13.2.5.53] through [§ 13.2.5.68].
//!
//! [§ 13.2.5.53]: https://html.spec.whatwg.org/multipage/parsing.html#doctype-state
//! [§ 13.2.5.68]: https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::Token;
use crate::error::ParseErrorKind;

impl HTMLTokenizer {
    /// "This is an eof-in-doctype parse error. Set the current DOCTYPE token's
    /// force-quirks flag to on. Emit the current DOCTYPE token. Emit an
    /// end-of-file token."
    ///
    /// Creates the DOCTYPE token first if none exists yet.
    fn eof_in_doctype(&mut self) {
        self.parse_error(ParseErrorKind::EofInDoctype);
        let mut token = self.current_token.take().unwrap_or_else(Token::new_doctype);
        token.set_force_quirks();
        self.current_token = Some(token);
        self.emit_token();
        self.emit_eof_token();
    }

    /// Report `kind`, turn force-quirks on and emit the DOCTYPE from the data
    /// state. Shared by every "missing identifier" and "abrupt" branch.
    fn emit_quirky_doctype(&mut self, kind: ParseErrorKind) {
        self.parse_error(kind);
        self.with_current_token(Token::set_force_quirks);
        self.switch_to(TokenizerState::Data);
        self.emit_token();
    }

    /// Report `kind`, turn force-quirks on and reconsume in the bogus DOCTYPE
    /// state.
    fn bogus_doctype(&mut self, kind: ParseErrorKind) {
        self.parse_error(kind);
        self.with_current_token(Token::set_force_quirks);
        self.reconsume_in(TokenizerState::BogusDOCTYPE);
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before DOCTYPE name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Reconsume in the before DOCTYPE name state."
            Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPEName),
            // "EOF - This is an eof-in-doctype parse error. Create a new DOCTYPE token.
            // Set its force-quirks flag to on. Emit the current token. Emit an end-of-file token."
            None => self.eof_in_doctype(),
            // "Anything else - This is a missing-whitespace-before-doctype-name parse error.
            // Reconsume in the before DOCTYPE name state."
            Some(_) => {
                self.parse_error(ParseErrorKind::MissingWhitespaceBeforeDoctypeName);
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            // "Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "ASCII upper alpha - Create a new DOCTYPE token. Set the token's name to
            // the lowercase version of the current input character. Switch to the DOCTYPE name state."
            Some(c) if c.is_ascii_uppercase() => {
                let mut token = Token::new_doctype();
                token.append_to_doctype_name(c.to_ascii_lowercase());
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Create a new
            // DOCTYPE token. Set the token's name to a U+FFFD REPLACEMENT CHARACTER. Switch to
            // the DOCTYPE name state."
            Some('\0') => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
                let mut token = Token::new_doctype();
                token.append_to_doctype_name('\u{FFFD}');
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-name parse error.
            // Create a new DOCTYPE token. Set its force-quirks flag to on. Switch to the data state.
            // Emit the current token."
            Some('>') => {
                self.current_token = Some(Token::new_doctype());
                self.emit_quirky_doctype(ParseErrorKind::MissingDoctypeName);
            }
            None => self.eof_in_doctype(),
            // "Anything else - Create a new DOCTYPE token. Set the token's name to the
            // current input character. Switch to the DOCTYPE name state."
            Some(c) => {
                let mut token = Token::new_doctype();
                token.append_to_doctype_name(c);
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current
            // DOCTYPE token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current DOCTYPE token's name."
            Some(c) if c.is_ascii_uppercase() => {
                self.with_current_token(|t| t.append_to_doctype_name(c.to_ascii_lowercase()));
            }
            Some('\0') => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
                self.with_current_token(|t| t.append_to_doctype_name('\u{FFFD}'));
            }
            None => self.eof_in_doctype(),
            Some(c) => self.with_current_token(|t| t.append_to_doctype_name(c)),
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            Some(_) => {
                // "If the six characters starting from the current input character are an
                // ASCII case-insensitive match for the word 'PUBLIC', then consume those
                // characters and switch to the after DOCTYPE public keyword state."
                if self.current_and_next_few_characters_are_case_insensitive("PUBLIC") {
                    self.skip(5);
                    self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
                }
                // "Otherwise, if the six characters starting from the current input
                // character are an ASCII case-insensitive match for the word 'SYSTEM', then
                // consume those characters and switch to the after DOCTYPE system keyword state."
                else if self.current_and_next_few_characters_are_case_insensitive("SYSTEM") {
                    self.skip(5);
                    self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
                }
                // "Otherwise, this is an invalid-character-sequence-after-doctype-name parse
                // error. Set the current DOCTYPE token's force-quirks flag to on. Reconsume
                // in the bogus DOCTYPE state."
                else {
                    self.bogus_doctype(ParseErrorKind::InvalidCharacterSequenceAfterDoctypeName);
                }
            }
        }
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    pub(super) fn handle_after_doctype_public_keyword_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEPublicIdentifier);
            }
            // "U+0022 QUOTATION MARK (") - This is a missing-whitespace-after-doctype-public-keyword
            // parse error. Set the current DOCTYPE token's public identifier to the empty string
            // (not missing), then switch to the DOCTYPE public identifier (double-quoted) state."
            Some('"') => {
                self.parse_error(ParseErrorKind::MissingWhitespaceAfterDoctypePublicKeyword);
                self.with_current_token(Token::set_public_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.parse_error(ParseErrorKind::MissingWhitespaceAfterDoctypePublicKeyword);
                self.with_current_token(Token::set_public_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPEPublicIdentifierSingleQuoted);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-public-identifier parse
            // error. Set the current DOCTYPE token's force-quirks flag to on. Switch to the data
            // state. Emit the current DOCTYPE token."
            Some('>') => self.emit_quirky_doctype(ParseErrorKind::MissingDoctypePublicIdentifier),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_doctype(ParseErrorKind::MissingQuoteBeforeDoctypePublicIdentifier),
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    pub(super) fn handle_before_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => {
                self.with_current_token(Token::set_public_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.with_current_token(Token::set_public_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPEPublicIdentifierSingleQuoted);
            }
            Some('>') => self.emit_quirky_doctype(ParseErrorKind::MissingDoctypePublicIdentifier),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_doctype(ParseErrorKind::MissingQuoteBeforeDoctypePublicIdentifier),
        }
    }

    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// [§ 13.2.5.60 DOCTYPE public identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state)
    pub(super) fn handle_doctype_public_identifier_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterDOCTYPEPublicIdentifier),
            Some('\0') => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
                self.with_current_token(|t| t.append_to_public_identifier('\u{FFFD}'));
            }
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-doctype-public-identifier
            // parse error. Set the current DOCTYPE token's force-quirks flag to on. Switch
            // to the data state. Emit the current DOCTYPE token."
            Some('>') => self.emit_quirky_doctype(ParseErrorKind::AbruptDoctypePublicIdentifier),
            None => self.eof_in_doctype(),
            Some(c) => self.with_current_token(|t| t.append_to_public_identifier(c)),
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "This is a missing-whitespace-between-doctype-public-and-system-identifiers
            // parse error. Set the current DOCTYPE token's system identifier to the empty
            // string (not missing), then switch to the DOCTYPE system identifier
            // (double-quoted) state."
            Some('"') => {
                self.parse_error(
                    ParseErrorKind::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                );
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.parse_error(
                    ParseErrorKind::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                );
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierSingleQuoted);
            }
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_doctype(ParseErrorKind::MissingQuoteBeforeDoctypeSystemIdentifier),
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('"') => {
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierSingleQuoted);
            }
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_doctype(ParseErrorKind::MissingQuoteBeforeDoctypeSystemIdentifier),
        }
    }

    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_system_keyword_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPESystemIdentifier);
            }
            Some('"') => {
                self.parse_error(ParseErrorKind::MissingWhitespaceAfterDoctypeSystemKeyword);
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.parse_error(ParseErrorKind::MissingWhitespaceAfterDoctypeSystemKeyword);
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierSingleQuoted);
            }
            Some('>') => self.emit_quirky_doctype(ParseErrorKind::MissingDoctypeSystemIdentifier),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_doctype(ParseErrorKind::MissingQuoteBeforeDoctypeSystemIdentifier),
        }
    }

    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => {
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.with_current_token(Token::set_system_identifier_empty);
                self.switch_to(TokenizerState::DOCTYPESystemIdentifierSingleQuoted);
            }
            Some('>') => self.emit_quirky_doctype(ParseErrorKind::MissingDoctypeSystemIdentifier),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_doctype(ParseErrorKind::MissingQuoteBeforeDoctypeSystemIdentifier),
        }
    }

    /// [§ 13.2.5.65 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    /// [§ 13.2.5.66 DOCTYPE system identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    pub(super) fn handle_doctype_system_identifier_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterDOCTYPESystemIdentifier),
            Some('\0') => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
                self.with_current_token(|t| t.append_to_system_identifier('\u{FFFD}'));
            }
            Some('>') => self.emit_quirky_doctype(ParseErrorKind::AbruptDoctypeSystemIdentifier),
            None => self.eof_in_doctype(),
            Some(c) => self.with_current_token(|t| t.append_to_system_identifier(c)),
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            // "Anything else - This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does not set the
            // current DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.parse_error(ParseErrorKind::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('\0') => self.parse_error(ParseErrorKind::UnexpectedNullCharacter),
            // "EOF - Emit the DOCTYPE token. Emit an end-of-file token."
            None => {
                self.emit_token();
                self.emit_eof_token();
            }
            // "Anything else - Ignore the character."
            Some(_) => {}
        }
    }
}
