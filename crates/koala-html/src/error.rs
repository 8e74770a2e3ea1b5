//! Parse errors.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "Certain points in the parsing algorithm are said to be parse errors. The
//! error handling for parse errors is well-defined."
//!
//! None of these stop the parse. They are collected next to the tree and
//! logged through [`koala_common::warning::warn_once`].

use strum_macros::{Display, IntoStaticStr};

/// Which stage of the pipeline raised an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ParseStage {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    Tokenizer,
    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    TreeConstruction,
}

/// A named parse error. `Display` gives the standard's kebab-case code,
/// e.g. `unexpected-null-character`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ParseErrorKind {
    // ===== Tokenizer =====
    /// `<!-->` or `<!--->`
    AbruptClosingOfEmptyComment,
    /// `>` inside a DOCTYPE public identifier.
    AbruptDoctypePublicIdentifier,
    /// `>` inside a DOCTYPE system identifier.
    AbruptDoctypeSystemIdentifier,
    /// `&#` or `&#x` not followed by a digit.
    AbsenceOfDigitsInNumericCharacterReference,
    /// `<![CDATA[` outside foreign content.
    CdataInHtmlContent,
    /// A numeric reference above U+10FFFF.
    CharacterReferenceOutsideUnicodeRange,
    /// A control code point in the input stream.
    ControlCharacterInInputStream,
    /// A numeric reference to a control code point.
    ControlCharacterReference,
    /// The same attribute name twice on one tag.
    DuplicateAttribute,
    /// An end tag carrying attributes.
    EndTagWithAttributes,
    /// `</div/>`
    EndTagWithTrailingSolidus,
    /// Input ends right after `<` or `</`.
    EofBeforeTagName,
    /// Input ends inside a comment.
    EofInComment,
    /// Input ends inside a DOCTYPE.
    EofInDoctype,
    /// Input ends inside a tag.
    EofInTag,
    /// A comment closed by `--!>`.
    IncorrectlyClosedComment,
    /// `<!` not followed by `--`, `DOCTYPE` or `[CDATA[`.
    IncorrectlyOpenedComment,
    /// Garbage after the DOCTYPE name.
    InvalidCharacterSequenceAfterDoctypeName,
    /// `<` followed by something that cannot start a tag name.
    InvalidFirstCharacterOfTagName,
    /// `name=` followed directly by `>`.
    MissingAttributeValue,
    /// `<!DOCTYPE>`
    MissingDoctypeName,
    /// `PUBLIC` with no identifier.
    MissingDoctypePublicIdentifier,
    /// `SYSTEM` with no identifier.
    MissingDoctypeSystemIdentifier,
    /// `</>`
    MissingEndTagName,
    /// A public identifier that is not quoted.
    MissingQuoteBeforeDoctypePublicIdentifier,
    /// A system identifier that is not quoted.
    MissingQuoteBeforeDoctypeSystemIdentifier,
    /// A character reference without its closing `;`.
    MissingSemicolonAfterCharacterReference,
    /// `PUBLIC"` with no whitespace.
    MissingWhitespaceAfterDoctypePublicKeyword,
    /// `SYSTEM"` with no whitespace.
    MissingWhitespaceAfterDoctypeSystemKeyword,
    /// `<!DOCTYPEhtml>`
    MissingWhitespaceBeforeDoctypeName,
    /// `a="1"b="2"`
    MissingWhitespaceBetweenAttributes,
    /// Public and system identifiers with nothing between them.
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    /// `<!--` inside a comment.
    NestedComment,
    /// A numeric reference to a noncharacter.
    NoncharacterCharacterReference,
    /// A noncharacter in the input stream.
    NoncharacterInInputStream,
    /// `&#0;`
    NullCharacterReference,
    /// A numeric reference to a surrogate.
    SurrogateCharacterReference,
    /// Garbage after the DOCTYPE system identifier.
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    /// `"`, `'` or `<` in an attribute name.
    UnexpectedCharacterInAttributeName,
    /// `"`, `'`, `<`, `=` or `` ` `` in an unquoted attribute value.
    UnexpectedCharacterInUnquotedAttributeValue,
    /// `=` where an attribute name should start.
    UnexpectedEqualsSignBeforeAttributeName,
    /// U+0000 in the input.
    UnexpectedNullCharacter,
    /// `<?`
    UnexpectedQuestionMarkInsteadOfTagName,
    /// A `/` inside a tag not followed by `>`.
    UnexpectedSolidusInTag,
    /// `&name;` that is not in the table.
    UnknownNamedCharacterReference,

    // ===== Tree construction =====
    /// The document does not start with a DOCTYPE.
    MissingDoctype,
    /// A DOCTYPE that is not `<!DOCTYPE html>` or the legacy-compat form.
    NonConformingDoctype,
    /// A DOCTYPE after the initial insertion mode.
    UnexpectedDoctype,
    /// `<div/>`: the trailing solidus is ignored on non-void elements.
    NonVoidHtmlElementStartTagWithTrailingSolidus,
    /// A start tag the current insertion mode does not accept.
    UnexpectedStartTag,
    /// An end tag with no matching open element.
    UnexpectedEndTag,
    /// Content after `</body>` or `</html>`.
    UnexpectedContentAfterBody,
    /// Input ended with elements still open.
    ExpectedClosingTagButGotEof,
}

/// One parse error, with the code-point offset it was raised at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} error at {position}: {kind}")]
pub struct ParseIssue {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Offset in code points into the (newline-normalized) input.
    pub position: usize,
    /// Where it was raised.
    pub stage: ParseStage,
}

impl ParseIssue {
    /// A tokenizer error.
    #[must_use]
    pub const fn tokenizer(kind: ParseErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            stage: ParseStage::Tokenizer,
        }
    }

    /// A tree-construction error.
    #[must_use]
    pub const fn tree_construction(kind: ParseErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            stage: ParseStage::TreeConstruction,
        }
    }
}

/// Strict-mode failure: the parse finished but raised at least one issue.
///
/// The finished document is carried along so callers can still use it.
#[derive(Debug, thiserror::Error)]
#[error("strict mode: {first}")]
pub struct StrictModeError {
    /// The first issue raised.
    pub first: ParseIssue,
    /// The complete parse.
    pub document: Box<crate::ParsedDocument>,
}
