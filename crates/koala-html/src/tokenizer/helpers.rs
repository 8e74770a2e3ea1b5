//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Attribute bookkeeping for duplicate detection
//! - Parse error reporting

use koala_common::string::{is_ascii_whitespace, is_control, is_noncharacter};
use koala_common::warning::warn_once;

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::Token;
use crate::error::{ParseErrorKind, ParseIssue};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// The next character is consumed on the next step of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Rewinds the cursor by one so the new state consumes the same character
    /// (or the same end of input) again.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.position = self.position.saturating_sub(1);
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Consume the next input character"
    ///
    /// Returns `None` at the end of input. The cursor advances either way, so
    /// reconsuming after EOF sees EOF again.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied();
        self.position += 1;
        // `parse_error` reports `position - 1`, the character just consumed.
        if let Some(c) = c
            && self.position > self.checked_upto
        {
            self.checked_upto = self.position;
            self.check_input_stream_character(c);
        }
        c
    }

    /// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
    ///
    /// "Any occurrences of surrogates are surrogate-in-input-stream parse
    /// errors. Any occurrences of noncharacters are noncharacter-in-input-stream
    /// parse errors and any occurrences of controls other than ASCII whitespace
    /// and U+0000 NULL characters are control-character-in-input-stream parse
    /// errors."
    ///
    /// Each code point is checked once, the first time it is consumed. The
    /// character itself is still emitted.
    fn check_input_stream_character(&mut self, c: char) {
        let code_point = u32::from(c);
        if is_noncharacter(code_point) {
            self.parse_error(ParseErrorKind::NoncharacterInInputStream);
        } else if is_control(code_point) && !is_ascii_whitespace(c) && c != '\0' {
            self.parse_error(ParseErrorKind::ControlCharacterInInputStream);
        }
    }

    /// Peek at the code point `offset` places past the cursor without
    /// consuming it.
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// "If the next few characters are..."
    ///
    /// Check if the next few characters match the target string exactly.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek_codepoint(i) == Some(expected))
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        target.chars().enumerate().all(|(i, expected)| {
            self.peek_codepoint(i)
                .is_some_and(|c| c.eq_ignore_ascii_case(&expected))
        })
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    ///
    /// "If the six characters starting from the current input character are an
    /// ASCII case-insensitive match for the word 'PUBLIC'..."
    pub(super) fn current_and_next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        let start = self.position.saturating_sub(1);
        target.chars().enumerate().all(|(i, expected)| {
            self.input
                .get(start + i)
                .is_some_and(|c| c.eq_ignore_ascii_case(&expected))
        })
    }

    /// Advance the cursor past `count` code points already matched by lookahead.
    pub(super) const fn skip(&mut self, count: usize) {
        self.position += count;
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// The tokenizer's whitespace set: tab, LF, FF and space. CR never
    /// reaches it because newlines are normalized first.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current token"
    ///
    /// End tags are checked here: attributes or a self-closing flag on an end
    /// tag are parse errors.
    pub(super) fn emit_token(&mut self) {
        if let Some(token) = self.current_token.take() {
            if let Token::EndTag { self_closing, .. } = &token {
                if !self.attribute_names.is_empty() {
                    self.parse_error(ParseErrorKind::EndTagWithAttributes);
                }
                if *self_closing {
                    self.parse_error(ParseErrorKind::EndTagWithTrailingSolidus);
                }
            }
            self.attribute_names.clear();
            self.queue.push_back(token);
        }
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.queue.push_back(Token::new_character(c));
    }

    /// "Emit an end-of-file token."
    ///
    /// Nothing is tokenized after this.
    pub(super) fn emit_eof_token(&mut self) {
        self.queue.push_back(Token::new_eof());
        self.emitted_eof = true;
    }

    /// Apply `f` to the current token, if there is one.
    pub(super) fn with_current_token(&mut self, f: impl FnOnce(&mut Token)) {
        if let Some(token) = self.current_token.as_mut() {
            f(token);
        }
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// "Start a new attribute in the current tag token. Set that attribute
    /// name and value to the empty string."
    pub(super) fn start_new_attribute(&mut self) {
        self.current_attribute_name.clear();
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state (and before
    /// emitting the tag token, if appropriate), the complete attribute's name
    /// must be compared to the other attributes on the same token; if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    pub(super) fn leave_attribute_name(&mut self) {
        let name = std::mem::take(&mut self.current_attribute_name);
        if self.attribute_names.contains(&name) {
            self.parse_error(ParseErrorKind::DuplicateAttribute);
        } else {
            self.attribute_names.push(name);
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Record a parse error at the current input character and log it.
    /// Parse errors in HTML are not fatal: the state machine recovers and
    /// continues.
    pub(super) fn parse_error(&mut self, kind: ParseErrorKind) {
        let position = self.position.saturating_sub(1).min(self.input.len());
        if !self.quiet {
            let _ = warn_once("HTML Tokenizer", &format!("{kind} at position {position}"));
        }
        self.issues.push(ParseIssue::tokenizer(kind, position));
    }

    /// Log a construct the tokenizer accepts but does not support.
    pub(super) fn unsupported(&self, message: &str) {
        if !self.quiet {
            let _ = warn_once("HTML Tokenizer", message);
        }
    }
}
