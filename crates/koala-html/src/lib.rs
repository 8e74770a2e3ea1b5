//! HTML tokenizer and parser for the Koala front end.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, tag and attribute states (attributes are read and dropped)
//!   - DOCTYPE, comment and bogus comment handling
//!   - Numeric and named character references
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes: Initial, `BeforeHtml`, `BeforeHead`, `InHead`, `AfterHead`, `InBody`,
//!     Text, `AfterBody`, `AfterAfterBody`
//!   - Implicit html/head/body creation and the stack of open elements
//!   - Quirks mode and the document title recorded on the Document
//!
//! # Not Yet Implemented
//!
//! - RCDATA, RAWTEXT and script data states
//! - Table, select and template insertion modes
//! - Foster parenting
//! - Adoption agency algorithm
//!
//! # Example
//!
//! ```
//! let parsed = koala_html::parse_document("<!DOCTYPE html><title>Hi</title>").unwrap();
//! assert_eq!(parsed.tree.title(parsed.document), Some("Hi"));
//! ```

/// Parse errors and their stages.
pub mod error;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use koala_dom::{DomError, DomTree, NodeId};

pub use error::{ParseErrorKind, ParseIssue, ParseStage, StrictModeError};
pub use parser::{HTMLParser, InsertionMode, ParserOptions, dump_tree, print_tree};
pub use tokenizer::{HTMLTokenizer, Token, TokenizerState};

/// A parsed document together with the parse errors raised on the way.
#[derive(Debug)]
pub struct ParsedDocument {
    /// The tree holding the document.
    pub tree: DomTree,
    /// The Document node.
    pub document: NodeId,
    /// Parse errors, in the order they were raised.
    pub issues: Vec<ParseIssue>,
    /// Whether the parse ran in strict mode.
    pub strict: bool,
}

impl ParsedDocument {
    /// In strict mode, turn the first parse error into an `Err`. Outside
    /// strict mode, or without errors, the document is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`StrictModeError`] carrying the first issue and the finished parse.
    pub fn into_strict_result(self) -> Result<Self, StrictModeError> {
        if self.strict
            && let Some(first) = self.issues.first().cloned()
        {
            return Err(StrictModeError {
                first,
                document: Box::new(self),
            });
        }
        Ok(self)
    }

    /// Render the document with [`dump_tree`].
    #[must_use]
    pub fn dump(&self) -> String {
        dump_tree(&self.tree, self.document)
    }
}

/// Parse `input` into a fresh Document with default options.
///
/// # Errors
///
/// See [`HTMLParser::run`].
pub fn parse_document(input: &str) -> Result<ParsedDocument, DomError> {
    parse_document_with(input, ParserOptions::default())
}

/// Parse `input` into a fresh Document.
///
/// # Errors
///
/// See [`HTMLParser::run`].
pub fn parse_document_with(input: &str, options: ParserOptions) -> Result<ParsedDocument, DomError> {
    let mut tree = DomTree::new();
    let document = tree.create_document()?;
    let issues = HTMLParser::new(&mut tree, document, input)
        .with_options(options)
        .run()?;
    Ok(ParsedDocument {
        tree,
        document,
        issues,
        strict: options.strict,
    })
}
