//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard.

/// Character reference states per § 13.2.5.72 to § 13.2.5.80.
mod character_reference;
/// HTML tokenizer state machine implementation.
pub mod core;
/// DOCTYPE states per § 13.2.5.53 to § 13.2.5.68.
mod doctype;
/// Helper methods for tokenizer state transitions.
mod helpers;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{HTMLTokenizer, TokenizerState};
pub use token::Token;
