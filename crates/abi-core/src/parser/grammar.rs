//! Grammar tables — keyword sets and the basic-type grammar
//!
//! The keyword sets drive both lexing (every listed word lexes as
//! `Keyword`) and parsing (each consumption helper accepts one set).

use crate::{Error, Result};

/// A fixed set of keywords accepted at one grammar position
pub type KeywordSet = &'static [&'static str];

/// Declaration keywords that open a fragment
pub const KW_TYPES: KeywordSet = &[
    "constructor",
    "error",
    "event",
    "fallback",
    "function",
    "receive",
    "struct",
];

/// Visibility and mutability keywords that may follow a function's inputs
pub const KW_VISIBILITY: KeywordSet = &[
    "constant",
    "external",
    "internal",
    "nonpayable",
    "override",
    "payable",
    "private",
    "public",
    "pure",
    "view",
];

/// Keywords allowed after a constructor's inputs
pub const KW_VISIBILITY_DEPLOY: KeywordSet = &["external", "override", "payable", "public"];

/// Parameter modifiers
pub const KW_MODIFIERS: KeywordSet = &["calldata", "indexed", "memory", "payable", "storage"];

/// Remaining structural keywords
pub const KW_OTHER: KeywordSet = &["anonymous", "returns", "tuple"];

pub const KW_TUPLE: KeywordSet = &["tuple"];
pub const KW_RETURNS: KeywordSet = &["returns"];
pub const KW_ANONYMOUS: KeywordSet = &["anonymous"];
pub const KW_CONSTRUCTOR: KeywordSet = &["constructor"];
pub const KW_FALLBACK: KeywordSet = &["fallback", "receive"];

/// Mutually exclusive mutability keywords (legacy group)
pub(crate) const EXCLUSIVE_LEGACY: KeywordSet = &["constant", "payable", "nonpayable"];

/// Mutually exclusive mutability keywords (modern group)
pub(crate) const EXCLUSIVE_MUTABILITY: KeywordSet = &["pure", "view", "payable", "nonpayable"];

/// Check whether a word lexes as a keyword
pub fn is_keyword(word: &str) -> bool {
    [KW_TYPES, KW_VISIBILITY, KW_MODIFIERS, KW_OTHER]
        .iter()
        .any(|set| set.contains(&word))
}

/// Check a name against `[a-zA-Z$_][a-zA-Z0-9$_]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_continue),
        _ => false,
    }
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '$' || c == '_'
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '$' || c == '_'
}

// ── Basic types ───────────────────────────────────────────

/// A word matched against `address|bool|bytes[0-9]*|string|u?int[0-9]*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BasicType<'a> {
    Plain,
    FixedBytes(&'a str),
    Integer(&'a str),
}

fn match_basic_type(word: &str) -> Option<BasicType<'_>> {
    if matches!(word, "address" | "bool" | "string") {
        return Some(BasicType::Plain);
    }
    let digits = |rest: &str| rest.chars().all(|c| c.is_ascii_digit());
    if let Some(rest) = word.strip_prefix("bytes") {
        return digits(rest).then_some(BasicType::FixedBytes(rest));
    }
    let rest = word
        .strip_prefix("uint")
        .or_else(|| word.strip_prefix("int"))?;
    digits(rest).then_some(BasicType::Integer(rest))
}

/// Check whether a word is shaped like a basic type (widths unchecked)
pub fn is_basic_type(word: &str) -> bool {
    match_basic_type(word).is_some()
}

/// Validate a basic type and return its canonical spelling
///
/// Bare `uint`/`int` widen to 256 bits, integer widths must be a
/// multiple of 8 in `[8, 256]` and fixed bytes lengths must lie in `[1, 32]`.
/// Dynamic `bytes` is accepted as-is.
///
/// # Errors
/// Returns `InvalidArgument` naming the offending type.
pub fn verify_basic_type(ty: &str) -> Result<String> {
    let invalid = |message: &str| Error::argument(message, "type", ty);

    match match_basic_type(ty).ok_or_else(|| invalid("invalid type"))? {
        BasicType::Plain => Ok(ty.to_string()),
        BasicType::FixedBytes("") => Ok(ty.to_string()),
        BasicType::FixedBytes(width) => match parse_width(width) {
            Some(length) if (1..=32).contains(&length) => Ok(ty.to_string()),
            _ => Err(invalid("invalid bytes length")),
        },
        BasicType::Integer("") => Ok(format!("{}256", ty)),
        BasicType::Integer(width) => match parse_width(width) {
            Some(size) if (8..=256).contains(&size) && size % 8 == 0 => Ok(ty.to_string()),
            _ => Err(invalid("invalid numeric width")),
        },
    }
}

/// Widths are written without leading zeros
fn parse_width(digits: &str) -> Option<usize> {
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}
