//! Human-readable ABI parser — tokenizer, token cursor and grammar helpers
//!
//! Converts signature text such as
//! `function transfer(address to, uint256 amount) returns (bool)` into
//! tokens, then exposes the small consumption helpers the recursive-descent
//! builders in `param_type` and `fragment` are written with.

pub mod grammar;
pub mod token_stream;
pub mod tokenizer;

use std::collections::BTreeSet;

use num_bigint::BigUint;

use crate::fragment::StateMutability;
use crate::param_type::ParamType;
use crate::{Error, Result};

use grammar::{KeywordSet, EXCLUSIVE_LEGACY, EXCLUSIVE_MUTABILITY, KW_TYPES, KW_VISIBILITY};
pub use token_stream::TokenString;
pub use tokenizer::{lex, Token, TokenKind, Tokenizer};

/// Consume an optional declaration keyword, then the declared name
///
/// # Errors
/// Returns `ParseError` if the keyword is not `decl_type` or no identifier follows.
pub fn consume_name(decl_type: &str, tokens: &mut TokenString) -> Result<String> {
    if let Some(keyword) = tokens.peek_keyword(KW_TYPES) {
        if keyword != decl_type {
            let offset = tokens.peek()?.offset;
            return Err(Error::parse(
                format!("expected {}, got {}", decl_type, keyword),
                Some(offset),
            ));
        }
        tokens.pop()?;
    }
    tokens.pop_type(TokenKind::Id)
}

/// Greedily consume keywords from `allowed`
///
/// Stops at the first token that is not an allowed keyword.
///
/// # Errors
/// Returns `ParseError` if a keyword appears twice.
pub fn consume_keywords(tokens: &mut TokenString, allowed: KeywordSet) -> Result<BTreeSet<String>> {
    let mut keywords = BTreeSet::new();
    while tokens.peek_keyword(allowed).is_some() {
        let token = tokens.pop()?;
        if keywords.contains(&token.text) {
            return Err(Error::parse(
                format!("duplicate keywords: {:?}", token.text),
                Some(token.offset),
            ));
        }
        keywords.insert(token.text);
    }
    Ok(keywords)
}

/// Consume visibility keywords and resolve the state mutability
///
/// Precedence: view > pure > payable > nonpayable > legacy `constant`
/// (as view) > default nonpayable.
///
/// # Errors
/// Returns `ParseError` ("conflicting types") if more than one member of
/// `{constant, payable, nonpayable}` or of `{pure, view, payable, nonpayable}`
/// is present.
pub fn consume_mutability(tokens: &mut TokenString) -> Result<StateMutability> {
    let offset = tokens.peek().ok().map(|token| token.offset);
    let modifiers = consume_keywords(tokens, KW_VISIBILITY)?;

    allow_single(&modifiers, EXCLUSIVE_LEGACY, offset)?;
    allow_single(&modifiers, EXCLUSIVE_MUTABILITY, offset)?;

    let mutability = if modifiers.contains("view") {
        StateMutability::View
    } else if modifiers.contains("pure") {
        StateMutability::Pure
    } else if modifiers.contains("payable") {
        StateMutability::Payable
    } else if modifiers.contains("nonpayable") {
        StateMutability::NonPayable
    } else if modifiers.contains("constant") {
        StateMutability::View
    } else {
        StateMutability::NonPayable
    };
    Ok(mutability)
}

fn allow_single(present: &BTreeSet<String>, group: KeywordSet, offset: Option<usize>) -> Result<()> {
    let included: Vec<&str> = group
        .iter()
        .copied()
        .filter(|keyword| present.contains(*keyword))
        .collect();
    if included.len() > 1 {
        return Err(Error::parse(
            format!("conflicting types: {}", included.join(", ")),
            offset,
        ));
    }
    Ok(())
}

/// Consume a parenthesized parameter list
///
/// `allow_indexed` is threaded to every parameter; only event inputs set it.
pub fn consume_params(tokens: &mut TokenString, allow_indexed: bool) -> Result<Vec<ParamType>> {
    tokens
        .pop_params()?
        .into_iter()
        .map(|mut param| ParamType::from_tokens(&mut param, allow_indexed))
        .collect()
}

/// Consume an optional `@<number>` gas hint
///
/// # Errors
/// Returns `ParseError` if `@` is not followed by a number.
pub fn consume_gas(tokens: &mut TokenString) -> Result<Option<BigUint>> {
    if tokens.peek_type(TokenKind::At).is_none() {
        return Ok(None);
    }
    let at = tokens.pop()?;
    match tokens.peek_type(TokenKind::Number) {
        Some(digits) => {
            let gas = digits
                .parse::<BigUint>()
                .map_err(|_| Error::parse("invalid gas", Some(at.offset)))?;
            tokens.pop()?;
            Ok(Some(gas))
        }
        None => Err(Error::parse("invalid gas", Some(at.offset))),
    }
}

/// Assert every token has been consumed
///
/// # Errors
/// Returns `ParseError` naming the leftover tokens.
pub fn consume_eoi(tokens: &TokenString) -> Result<()> {
    if tokens.is_empty() {
        return Ok(());
    }
    let offset = tokens.peek()?.offset;
    Err(Error::parse(
        format!("unexpected tokens: {}", tokens),
        Some(offset),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::KW_MODIFIERS;

    // ── consume_name ───────────────────────────────────

    #[test]
    fn test_consume_name_with_keyword() {
        let mut tokens = lex("function transfer").unwrap();
        assert_eq!(consume_name("function", &mut tokens).unwrap(), "transfer");
    }

    #[test]
    fn test_consume_name_without_keyword() {
        let mut tokens = lex("transfer").unwrap();
        assert_eq!(consume_name("function", &mut tokens).unwrap(), "transfer");
    }

    #[test]
    fn test_consume_name_wrong_keyword() {
        let mut tokens = lex("event Transfer").unwrap();
        let err = consume_name("function", &mut tokens).unwrap_err();
        assert!(err.to_string().contains("expected function, got event"));
    }

    #[test]
    fn test_consume_name_missing_identifier() {
        let mut tokens = lex("function ()").unwrap();
        assert!(consume_name("function", &mut tokens).is_err());
    }

    // ── consume_keywords ───────────────────────────────

    #[test]
    fn test_consume_keywords_stops_at_other_tokens() {
        let mut tokens = lex("indexed memory value").unwrap();
        let keywords = consume_keywords(&mut tokens, KW_MODIFIERS).unwrap();
        assert_eq!(keywords.len(), 2);
        assert!(keywords.contains("indexed"));
        assert!(keywords.contains("memory"));
        assert_eq!(tokens.peek().unwrap().text, "value");
    }

    #[test]
    fn test_consume_keywords_stops_at_disallowed_keyword() {
        let mut tokens = lex("view returns").unwrap();
        let keywords = consume_keywords(&mut tokens, KW_VISIBILITY).unwrap();
        assert!(keywords.contains("view"));
        assert_eq!(tokens.peek().unwrap().text, "returns");
    }

    #[test]
    fn test_consume_keywords_duplicate() {
        let mut tokens = lex("indexed indexed").unwrap();
        let err = consume_keywords(&mut tokens, KW_MODIFIERS).unwrap_err();
        assert!(err.to_string().contains("duplicate keywords"));
    }

    // ── consume_mutability ─────────────────────────────

    fn mutability(text: &str) -> Result<StateMutability> {
        consume_mutability(&mut lex(text).unwrap())
    }

    #[test]
    fn test_mutability_resolution() {
        assert_eq!(mutability("").unwrap(), StateMutability::NonPayable);
        assert_eq!(mutability("view").unwrap(), StateMutability::View);
        assert_eq!(mutability("external pure").unwrap(), StateMutability::Pure);
        assert_eq!(mutability("public payable").unwrap(), StateMutability::Payable);
        assert_eq!(mutability("nonpayable").unwrap(), StateMutability::NonPayable);
        assert_eq!(mutability("constant").unwrap(), StateMutability::View);
        assert_eq!(mutability("constant view").unwrap(), StateMutability::View);
    }

    #[test]
    fn test_mutability_conflicts() {
        for text in ["payable view", "pure view", "constant payable", "payable nonpayable"] {
            let err = mutability(text).unwrap_err();
            assert!(
                err.to_string().contains("conflicting types"),
                "{} gave {}",
                text,
                err
            );
        }
    }

    // ── consume_gas ────────────────────────────────────

    #[test]
    fn test_consume_gas() {
        let mut tokens = lex("@ 30000").unwrap();
        assert_eq!(consume_gas(&mut tokens).unwrap(), Some(BigUint::from(30000u32)));
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_consume_gas_big_value() {
        let mut tokens = lex("@123456789012345678901234567890").unwrap();
        let gas = consume_gas(&mut tokens).unwrap().unwrap();
        assert_eq!(gas.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn test_consume_gas_absent() {
        let mut tokens = lex("view").unwrap();
        assert_eq!(consume_gas(&mut tokens).unwrap(), None);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_consume_gas_without_number() {
        let mut tokens = lex("@ view").unwrap();
        let err = consume_gas(&mut tokens).unwrap_err();
        assert!(err.to_string().contains("invalid gas"));
    }

    // ── consume_eoi ────────────────────────────────────

    #[test]
    fn test_consume_eoi() {
        assert!(consume_eoi(&lex("").unwrap()).is_ok());
        let err = consume_eoi(&lex("uint8 extra").unwrap()).unwrap_err();
        assert_eq!(
            err,
            Error::ParseError {
                message: "unexpected tokens: uint8 extra".into(),
                offset: Some(0),
            }
        );
    }

    // ── consume_params ─────────────────────────────────

    #[test]
    fn test_consume_params() {
        let mut tokens = lex("(address indexed from, uint256 value)").unwrap();
        let params = consume_params(&mut tokens, true).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].indexed(), Some(true));
        assert_eq!(params[1].indexed(), Some(false));
    }

    #[test]
    fn test_consume_params_rejects_indexed_outside_events() {
        let mut tokens = lex("(address indexed from)").unwrap();
        let err = consume_params(&mut tokens, false).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }
}
