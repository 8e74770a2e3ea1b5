//! Strings as sequences of code points.
//!
//! [§ 4.7 Code points](https://infra.spec.whatwg.org/#code-points)
//! [§ 4.6 Strings](https://infra.spec.whatwg.org/#strings)
//!
//! The tokenizer works on a pre-decoded buffer of code points, and the tree
//! builder and DOM need a handful of the Infra string operations on top of
//! `str`. Everything here is a free function over `&str`/`char` so callers
//! never have to wrap their data.

use std::collections::TryReserveError;

use thiserror::Error;

/// A fallible append could not grow the destination string.
///
/// Returned instead of silently truncating the appended data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot grow string of {len} bytes by {additional} more")]
pub struct CapacityError {
    /// Length of the destination string before the failed append.
    pub len: usize,
    /// Number of bytes the append needed.
    pub additional: usize,
    /// The allocator's report.
    #[source]
    pub source: TryReserveError,
}

// =============================================================================
// Code points
// =============================================================================

/// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
///
/// "Before the tokenization stage, the input stream must be preprocessed by
/// normalizing newlines. Thus, newlines in HTML DOMs are represented by U+000A
/// LF characters, and there are never any U+000D CR characters in the input
/// to the tokenization stage."
#[must_use]
pub fn normalize_newlines(input: &str) -> String {
    // "To normalize newlines in a string, replace every U+000D CR U+000A LF
    // code point pair with a single U+000A LF code point, and then replace
    // every remaining U+000D CR code point with a U+000A LF code point."
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decode `input` into the code-point buffer the tokenizer indexes into,
/// normalizing newlines on the way.
#[must_use]
pub fn code_points(input: &str) -> Vec<char> {
    normalize_newlines(input).chars().collect()
}

/// [§ 4.5 Code points](https://infra.spec.whatwg.org/#surrogate)
///
/// "A surrogate is a leading surrogate or a trailing surrogate", i.e. a code
/// point in the range U+D800 to U+DFFF, inclusive.
///
/// Takes a raw `u32` because a surrogate can never be a Rust `char`.
#[must_use]
pub const fn is_surrogate(code_point: u32) -> bool {
    matches!(code_point, 0xD800..=0xDFFF)
}

/// [§ 4.5 Code points](https://infra.spec.whatwg.org/#noncharacter)
///
/// "A noncharacter is a code point that is in the range U+FDD0 to U+FDEF,
/// inclusive, or U+FFFE, U+FFFF, U+1FFFE, U+1FFFF, ..., U+10FFFE, or U+10FFFF."
#[must_use]
pub const fn is_noncharacter(code_point: u32) -> bool {
    matches!(code_point, 0xFDD0..=0xFDEF)
        || (code_point <= 0x10_FFFF && (code_point & 0xFFFE) == 0xFFFE)
}

/// [§ 4.5 Code points](https://infra.spec.whatwg.org/#c0-control)
///
/// "A C0 control is a code point in the range U+0000 NULL to U+001F
/// INFORMATION SEPARATOR ONE, inclusive."
#[must_use]
pub const fn is_c0_control(code_point: u32) -> bool {
    code_point <= 0x1F
}

/// [§ 4.5 Code points](https://infra.spec.whatwg.org/#control)
///
/// "A control is a C0 control or a code point in the range U+007F DELETE to
/// U+009F APPLICATION PROGRAM COMMAND, inclusive."
#[must_use]
pub const fn is_control(code_point: u32) -> bool {
    is_c0_control(code_point) || matches!(code_point, 0x7F..=0x9F)
}

/// [§ 4.5 Code points](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR, or
/// U+0020 SPACE."
#[must_use]
pub const fn is_ascii_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// "An ASCII upper alpha is a code point in the range U+0041 (A) to U+005A (Z),
/// inclusive."
#[must_use]
pub const fn is_ascii_upper_alpha(c: char) -> bool {
    c.is_ascii_uppercase()
}

/// "An ASCII lower alpha is a code point in the range U+0061 (a) to U+007A (z),
/// inclusive."
#[must_use]
pub const fn is_ascii_lower_alpha(c: char) -> bool {
    c.is_ascii_lowercase()
}

/// "An ASCII alpha is an ASCII upper alpha or ASCII lower alpha."
#[must_use]
pub const fn is_ascii_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// "An ASCII digit is a code point in the range U+0030 (0) to U+0039 (9),
/// inclusive."
#[must_use]
pub const fn is_ascii_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// "An ASCII hex digit is an ASCII upper hex digit or ASCII lower hex digit."
#[must_use]
pub const fn is_ascii_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// "An ASCII alphanumeric is an ASCII digit or ASCII alpha."
#[must_use]
pub const fn is_ascii_alphanumeric(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

// =============================================================================
// Trimming and removal over a code-point set
// =============================================================================

/// Remove every leading code point matching `set`.
pub fn strip_leading<P>(input: &str, set: P) -> &str
where
    P: Fn(char) -> bool,
{
    input.trim_start_matches(set)
}

/// Remove every trailing code point matching `set`.
pub fn strip_trailing<P>(input: &str, set: P) -> &str
where
    P: Fn(char) -> bool,
{
    input.trim_end_matches(set)
}

/// Remove leading and trailing code points matching `set`.
pub fn strip_leading_and_trailing<P>(input: &str, set: P) -> &str
where
    P: Fn(char) -> bool,
{
    input.trim_matches(set)
}

/// Remove every code point matching `set`, wherever it occurs.
pub fn remove_all<P>(input: &str, set: P) -> String
where
    P: Fn(char) -> bool,
{
    input.chars().filter(|&c| !set(c)).collect()
}

/// Whether any code point of `input` matches `set`.
pub fn contains_any<P>(input: &str, set: P) -> bool
where
    P: Fn(char) -> bool,
{
    input.chars().any(set)
}

/// [§ 4.6 Strings](https://infra.spec.whatwg.org/#strip-and-collapse-ascii-whitespace)
///
/// "To strip and collapse ASCII whitespace in a string, replace any sequence of
/// one or more consecutive code points that are ASCII whitespace in the string
/// with a single U+0020 SPACE code point, and then remove any leading and
/// trailing ASCII whitespace from that string."
#[must_use]
pub fn strip_and_collapse_ascii_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for c in strip_leading_and_trailing(input, is_ascii_whitespace).chars() {
        if is_ascii_whitespace(c) {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Fallible append
// =============================================================================

/// Append `c` to `dest`, reporting allocation failure instead of aborting.
///
/// # Errors
///
/// Returns [`CapacityError`] if `dest` could not grow; `dest` is unchanged.
pub fn try_push(dest: &mut String, c: char) -> Result<(), CapacityError> {
    reserve(dest, c.len_utf8())?;
    dest.push(c);
    Ok(())
}

/// Append `data` to `dest`, reporting allocation failure instead of aborting.
///
/// # Errors
///
/// Returns [`CapacityError`] if `dest` could not grow; `dest` is unchanged.
pub fn try_push_str(dest: &mut String, data: &str) -> Result<(), CapacityError> {
    reserve(dest, data.len())?;
    dest.push_str(data);
    Ok(())
}

fn reserve(dest: &mut String, additional: usize) -> Result<(), CapacityError> {
    dest.try_reserve(additional).map_err(|source| CapacityError {
        len: dest.len(),
        additional,
        source,
    })
}
