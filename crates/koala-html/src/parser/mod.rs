//! HTML parser module for tree construction.
//!
//! Implements [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//! for the insertion modes from "initial" to "after after body".

/// The parser driving the tokenizer and mutating the DOM.
pub mod core;
/// Insertion modes as pure transition functions.
pub mod modes;

pub use self::core::{HTMLParser, ParserOptions, dump_tree, print_tree};
pub use modes::{CommentTarget, InsertionMode, Transition, TreeAction, TreeContext, transition};
