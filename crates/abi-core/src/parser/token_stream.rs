//! Token stream cursor
//!
//! A `TokenString` owns an immutable token buffer and a read offset.
//! Structural extraction (`pop_paren`, `pop_params`) follows the links the
//! tokenizer precomputed, so a whole parenthesized group is skipped in one
//! step. Every extracted range is a fresh `TokenString` over a re-based copy
//! of the tokens with its own cursor.

use std::fmt;

use super::grammar::KeywordSet;
use super::tokenizer::{Token, TokenKind};
use crate::{Error, Result};

/// Read cursor over a lexed token buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenString {
    tokens: Vec<Token>,
    offset: usize,
}

impl TokenString {
    /// Wrap a token buffer with the cursor at its start
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenString { tokens, offset: 0 }
    }

    /// Current cursor position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of tokens left to read
    pub fn len(&self) -> usize {
        self.tokens.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewind the cursor to the first token
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    // ── Lookahead ──────────────────────────────────────────

    /// The next token, without consuming it
    ///
    /// # Errors
    /// Returns `ParseError` at end of input.
    pub fn peek(&self) -> Result<&Token> {
        self.tokens
            .get(self.offset)
            .ok_or_else(|| Error::parse("unexpected end of input", self.end_offset()))
    }

    /// The next token's text if it has the given kind
    pub fn peek_type(&self, kind: TokenKind) -> Option<&str> {
        self.tokens
            .get(self.offset)
            .filter(|token| token.kind == kind)
            .map(|token| token.text.as_str())
    }

    /// The next token's text if it is a keyword in `allowed`
    pub fn peek_keyword(&self, allowed: KeywordSet) -> Option<&str> {
        self.peek_type(TokenKind::Keyword)
            .filter(|word| allowed.contains(word))
    }

    // ── Consumption ────────────────────────────────────────

    /// Consume the next token
    pub fn pop(&mut self) -> Result<Token> {
        let token = self.peek()?.clone();
        self.offset += 1;
        Ok(token)
    }

    /// Consume the next token, which must have the given kind
    pub fn pop_type(&mut self, kind: TokenKind) -> Result<String> {
        let top = self.peek()?;
        if top.kind != kind {
            return Err(Error::parse(
                format!("expected {}; got {} {:?}", kind, top.kind, top.text),
                Some(top.offset),
            ));
        }
        Ok(self.pop()?.text)
    }

    /// Consume the next token, which must be a keyword in `allowed`
    pub fn pop_keyword(&mut self, allowed: KeywordSet) -> Result<String> {
        let top = self.peek()?;
        if top.kind != TokenKind::Keyword || !allowed.contains(&top.text.as_str()) {
            return Err(Error::parse(
                format!("expected keyword {}; got {:?}", allowed.join("|"), top.text),
                Some(top.offset),
            ));
        }
        Ok(self.pop()?.text)
    }

    /// Consume a parenthesized group, returning a cursor over its interior
    pub fn pop_paren(&mut self) -> Result<TokenString> {
        let close = self.open_group()?;
        let interior = self.sub_string(self.offset + 1, close);
        self.offset = close + 1;
        Ok(interior)
    }

    /// Consume a parenthesized group, returning one cursor per
    /// comma-separated item
    ///
    /// `()` yields an empty list. An empty item (as in `(a,)`) yields an
    /// empty cursor, which the item's parser rejects.
    pub fn pop_params(&mut self) -> Result<Vec<TokenString>> {
        let close = self.open_group()?;

        let mut params = Vec::new();
        if close > self.offset + 1 {
            let mut cursor = self.offset;
            while cursor < close {
                let next = self.tokens[cursor]
                    .link_next
                    .filter(|&next| next > cursor && next <= close)
                    .ok_or_else(|| {
                        Error::parse("broken parameter links", Some(self.tokens[cursor].offset))
                    })?;
                params.push(self.sub_string(cursor + 1, next));
                cursor = next;
            }
        }

        self.offset = close + 1;
        Ok(params)
    }

    /// Check the cursor sits on `(` and return the index of its `)`
    fn open_group(&self) -> Result<usize> {
        let top = self.peek()?;
        if top.kind != TokenKind::OpenParen {
            return Err(Error::parse(
                format!("expected OPEN_PAREN; got {} {:?}", top.kind, top.text),
                Some(top.offset),
            ));
        }
        top.match_index
            .filter(|&close| close > self.offset && close < self.tokens.len())
            .ok_or_else(|| Error::parse("missing closing parenthesis", Some(top.offset)))
    }

    /// Copy `tokens[from..to]`, re-basing links into the new buffer
    ///
    /// Links that point outside the range are dropped.
    fn sub_string(&self, from: usize, to: usize) -> TokenString {
        let rebase = |index: Option<usize>| {
            index
                .filter(|&i| i >= from && i < to)
                .map(|i| i - from)
        };
        let tokens = self.tokens[from..to]
            .iter()
            .map(|token| Token {
                match_index: rebase(token.match_index),
                link_back: rebase(token.link_back),
                link_next: rebase(token.link_next),
                ..token.clone()
            })
            .collect();
        TokenString::new(tokens)
    }

    /// Source offset used for end-of-input errors
    fn end_offset(&self) -> Option<usize> {
        self.tokens
            .last()
            .map(|token| token.offset + token.text.chars().count())
    }
}

impl fmt::Display for TokenString {
    /// The unread tokens, space separated
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, token) in self.tokens[self.offset..].iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&token.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::{KW_MODIFIERS, KW_TYPES};
    use crate::parser::lex;

    fn texts(tokens: &TokenString) -> Vec<String> {
        let mut tokens = tokens.clone();
        tokens.reset();
        let mut out = Vec::new();
        while let Ok(token) = tokens.pop() {
            out.push(token.text);
        }
        out
    }

    // ── Lookahead ──────────────────────────────────────

    #[test]
    fn test_peek_does_not_consume() {
        let tokens = lex("uint8 value").unwrap();
        assert_eq!(tokens.peek().unwrap().text, "uint8");
        assert_eq!(tokens.peek().unwrap().text, "uint8");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_peek_at_end_fails() {
        let tokens = lex("").unwrap();
        assert!(tokens.is_empty());
        assert!(tokens.peek().is_err());
        assert_eq!(tokens.peek_type(TokenKind::Id), None);
    }

    #[test]
    fn test_peek_type_and_keyword() {
        let tokens = lex("function foo()").unwrap();
        assert_eq!(tokens.peek_type(TokenKind::Keyword), Some("function"));
        assert_eq!(tokens.peek_type(TokenKind::Id), None);
        assert_eq!(tokens.peek_keyword(KW_TYPES), Some("function"));
        assert_eq!(tokens.peek_keyword(KW_MODIFIERS), None);
    }

    // ── Consumption ────────────────────────────────────

    #[test]
    fn test_pop_type_mismatch() {
        let mut tokens = lex("uint8 value").unwrap();
        let err = tokens.pop_type(TokenKind::Id).unwrap_err();
        assert_eq!(
            err,
            Error::ParseError {
                message: "expected ID; got TYPE \"uint8\"".into(),
                offset: Some(0),
            }
        );
        assert_eq!(tokens.offset(), 0);
    }

    #[test]
    fn test_pop_keyword() {
        let mut tokens = lex("event Foo()").unwrap();
        assert!(tokens.pop_keyword(KW_MODIFIERS).is_err());
        assert_eq!(tokens.pop_keyword(KW_TYPES).unwrap(), "event");
        assert_eq!(tokens.pop_type(TokenKind::Id).unwrap(), "Foo");
    }

    // ── Structural extraction ──────────────────────────

    #[test]
    fn test_pop_paren_interior() {
        let mut tokens = lex("(uint8 a, bool) tail").unwrap();
        let inner = tokens.pop_paren().unwrap();
        assert_eq!(texts(&inner), vec!["uint8", "a", ",", "bool"]);
        assert_eq!(tokens.peek().unwrap().text, "tail");
    }

    #[test]
    fn test_pop_params_splits_top_level() {
        let mut tokens = lex("(uint8 a, (bool, address)[2] b, string) returns").unwrap();
        let params = tokens.pop_params().unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(texts(&params[0]), vec!["uint8", "a"]);
        assert_eq!(
            texts(&params[1]),
            vec!["(", "bool", ",", "address", ")", "[2]", "b"]
        );
        assert_eq!(texts(&params[2]), vec!["string"]);
        assert_eq!(tokens.pop_type(TokenKind::Keyword).unwrap(), "returns");
    }

    #[test]
    fn test_pop_params_empty_group() {
        let mut tokens = lex("()").unwrap();
        assert!(tokens.pop_params().unwrap().is_empty());
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_pop_params_trailing_comma_yields_empty_item() {
        let mut tokens = lex("(uint8,)").unwrap();
        let params = tokens.pop_params().unwrap();
        assert_eq!(params.len(), 2);
        assert!(params[1].is_empty());
    }

    #[test]
    fn test_sub_string_links_are_rebased() {
        let mut tokens = lex("((a, b), c)").unwrap();
        let params = tokens.pop_params().unwrap();
        let mut first = params[0].clone();
        // ( a , b ) rebased to start at zero
        assert_eq!(first.peek().unwrap().match_index, Some(4));
        let nested = first.pop_params().unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(texts(&nested[1]), vec!["b"]);
    }

    #[test]
    fn test_pop_params_requires_open_paren() {
        let mut tokens = lex("uint8").unwrap();
        assert!(tokens.pop_params().is_err());
        assert!(tokens.pop_paren().is_err());
    }

    // ── Cursor management ──────────────────────────────

    #[test]
    fn test_clone_has_independent_cursor() {
        let mut tokens = lex("uint8 a").unwrap();
        let snapshot = tokens.clone();
        tokens.pop().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_reset_rewinds() {
        let mut tokens = lex("uint8 a").unwrap();
        tokens.pop().unwrap();
        tokens.pop().unwrap();
        assert!(tokens.is_empty());
        tokens.reset();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_display_shows_unread_tokens() {
        let mut tokens = lex("uint8[2] indexed value").unwrap();
        tokens.pop().unwrap();
        assert_eq!(tokens.to_string(), "[2] indexed value");
    }
}
