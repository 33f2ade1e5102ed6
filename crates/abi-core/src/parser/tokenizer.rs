//! ABI Tokenizer — converts human-readable signature text into a token stream
//!
//! Handles: punctuation `( ) [ ] , @`, keywords, basic type names,
//! identifiers and decimal numbers. Bracket suffixes are folded into a
//! single `Bracket` token (`[`, `3`, `]` becomes `[3]`).
//!
//! While scanning, the tokenizer precomputes structure so the parser never
//! has to search for it:
//! - every `(` and its `)` point at each other through `match_index`
//! - the `(`, each top-level `,` and the `)` of one group form a chain
//!   through `link_back`/`link_next`
//!
//! Guarantees:
//! - All-or-nothing: either the whole input lexes or an error is returned
//! - Every error carries the offending text and its absolute offset

use super::grammar;
use super::token_stream::TokenString;
use crate::{Error, Result};

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    Bracket,
    Comma,
    At,
    Keyword,
    Type,
    Id,
    Number,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            TokenKind::OpenParen => "OPEN_PAREN",
            TokenKind::CloseParen => "CLOSE_PAREN",
            TokenKind::Bracket => "BRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::At => "AT",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Type => "TYPE",
            TokenKind::Id => "ID",
            TokenKind::Number => "NUMBER",
        };
        f.write_str(name)
    }
}

/// Token with source position and precomputed structural links
///
/// Link indices are positions within the token buffer that owns the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Character offset of the token in the source text
    pub offset: usize,
    /// Parenthesis nesting depth
    pub depth: usize,
    /// For parens: index of the matching paren
    pub match_index: Option<usize>,
    /// For `,` and `)`: index of the previous sibling in the group chain
    pub link_back: Option<usize>,
    /// For `(` and `,`: index of the next sibling in the group chain
    pub link_next: Option<usize>,
    /// For `Number`: the parsed value; for `Bracket`: the folded array length
    pub value: Option<usize>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, offset: usize, depth: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            offset,
            depth,
            match_index: None,
            link_back: None,
            link_next: None,
            value: None,
        }
    }
}

/// Lex human-readable ABI text into a token stream
///
/// # Errors
/// Returns `LexError` for unexpected characters and unbalanced brackets.
pub fn lex(text: &str) -> Result<TokenString> {
    let tokens = Tokenizer::new(text).tokenize()?;
    tracing::trace!(tokens = tokens.len(), "lexed abi text");
    Ok(TokenString::new(tokens))
}

/// Tokenizer for human-readable ABI text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    tokens: Vec<Token>,
    /// Indices of currently open `(` tokens
    parens: Vec<usize>,
    /// Per open group: index of the most recent `(` or `,`
    commas: Vec<usize>,
    /// Index of the `[` awaiting its `]`
    open_bracket: Option<usize>,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            tokens: Vec::new(),
            parens: Vec::new(),
            commas: Vec::new(),
            open_bracket: None,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else { break };
            self.next_token(ch)?;
        }

        if let Some(open) = self.open_bracket {
            let offset = self.tokens[open].offset;
            return Err(self.error_at("missing closing bracket", "[", offset));
        }
        if let Some(&open) = self.parens.last() {
            let offset = self.tokens[open].offset;
            return Err(self.error_at("missing closing parenthesis", "(", offset));
        }

        Ok(self.tokens)
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.position += 1;
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while matches!(self.peek(), Some(ch) if accept(ch)) {
            self.position += 1;
        }
        self.input[start..self.position].iter().collect()
    }

    fn depth(&self) -> usize {
        self.parens.len()
    }

    fn error(&self, message: &str) -> Error {
        let token = self.peek().map(String::from).unwrap_or_else(|| "$EOI".into());
        self.error_at(message, &token, self.position)
    }

    fn error_at(&self, message: &str, token: &str, offset: usize) -> Error {
        Error::LexError {
            message: message.to_string(),
            token: token.to_string(),
            offset,
        }
    }

    // ── Main dispatch ──────────────────────────────────────

    fn next_token(&mut self, ch: char) -> Result<()> {
        match ch {
            '(' => self.open_paren(),
            ')' => self.close_paren(),
            ',' => self.comma(),
            '[' => self.open_bracket(),
            ']' => self.close_bracket(),
            '@' => {
                self.push_punct(TokenKind::At, ch);
                Ok(())
            }
            c if grammar::is_identifier_start(c) => {
                self.read_word();
                Ok(())
            }
            c if c.is_ascii_digit() => self.read_number(),
            _ => Err(self.error("unexpected token")),
        }
    }

    fn push_punct(&mut self, kind: TokenKind, ch: char) -> usize {
        let token = Token::new(kind, ch, self.position, self.depth());
        self.position += 1;
        self.tokens.push(token);
        self.tokens.len() - 1
    }

    // ── Parentheses & commas ───────────────────────────────

    fn open_paren(&mut self) -> Result<()> {
        self.ensure_no_open_bracket()?;
        let index = self.push_punct(TokenKind::OpenParen, '(');
        self.parens.push(index);
        self.commas.push(index);
        Ok(())
    }

    fn close_paren(&mut self) -> Result<()> {
        self.ensure_no_open_bracket()?;
        let (Some(open), Some(back)) = (self.parens.pop(), self.commas.pop()) else {
            return Err(self.error("no matching open bracket"));
        };
        let index = self.push_punct(TokenKind::CloseParen, ')');

        let close = &mut self.tokens[index];
        close.match_index = Some(open);
        close.link_back = Some(back);
        self.tokens[open].match_index = Some(index);
        self.tokens[back].link_next = Some(index);
        Ok(())
    }

    fn comma(&mut self) -> Result<()> {
        self.ensure_no_open_bracket()?;
        let Some(back) = self.commas.pop() else {
            return Err(self.error("comma outside of parentheses"));
        };
        let index = self.push_punct(TokenKind::Comma, ',');

        self.tokens[index].link_back = Some(back);
        self.tokens[back].link_next = Some(index);
        self.commas.push(index);
        Ok(())
    }

    // ── Array suffixes ─────────────────────────────────────

    fn ensure_no_open_bracket(&self) -> Result<()> {
        match self.open_bracket {
            Some(_) => Err(self.error("missing closing bracket")),
            None => Ok(()),
        }
    }

    fn open_bracket(&mut self) -> Result<()> {
        self.ensure_no_open_bracket()?;
        let index = self.push_punct(TokenKind::Bracket, '[');
        self.open_bracket = Some(index);
        Ok(())
    }

    /// Fold `[`, optional length and `]` into the opening `Bracket` token
    fn close_bracket(&mut self) -> Result<()> {
        let Some(open) = self.open_bracket.take() else {
            return Err(self.error("missing opening bracket"));
        };

        let mut suffix = String::from("]");
        if self.tokens.len() == open + 2 && self.tokens[open + 1].kind == TokenKind::Number {
            let Some(number) = self.tokens.pop() else {
                return Err(self.error("missing opening bracket"));
            };
            let Some(length) = number.value else {
                return Err(self.error_at("invalid array length", &number.text, number.offset));
            };
            suffix.insert_str(0, &number.text);
            self.tokens[open].value = Some(length);
        }
        if self.tokens.len() != open + 1 {
            return Err(self.error("missing opening bracket"));
        }

        self.tokens[open].text.push_str(&suffix);
        self.position += 1;
        Ok(())
    }

    // ── Words & numbers ────────────────────────────────────

    fn read_word(&mut self) {
        let offset = self.position;
        let text = self.take_while(grammar::is_identifier_continue);

        let kind = if grammar::is_keyword(&text) {
            TokenKind::Keyword
        } else if grammar::is_basic_type(&text) {
            TokenKind::Type
        } else {
            TokenKind::Id
        };
        self.tokens.push(Token::new(kind, text, offset, self.depth()));
    }

    fn read_number(&mut self) -> Result<()> {
        let offset = self.position;
        let text = self.take_while(|ch| ch.is_ascii_digit());

        // Gas hints may exceed usize; only array lengths need the parsed value
        let mut token = Token::new(TokenKind::Number, text, offset, self.depth());
        token.value = token.text.parse().ok();
        self.tokens.push(token);
        Ok(())
    }
}
