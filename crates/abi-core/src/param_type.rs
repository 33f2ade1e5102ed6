//! Parameter type descriptors
//!
//! A `ParamType` describes one parameter: a basic type (`uint256`,
//! `address`, ...), a tuple of components, or an array of an element type.
//! Each shape is a variant of `ParamKind` carrying only its own fields, and
//! the only ways to obtain a `ParamType` are the validating factories in
//! this module, so every instance is canonical by construction:
//!
//! - bare `uint`/`int` are widened to `uint256`/`int256`
//! - integer widths are multiples of 8 in `[8, 256]`, fixed bytes in `[1, 32]`
//! - `ty()` is always the canonical type text, e.g. `tuple(uint256,address)[3]`
//!
//! Descriptors are never mutated after construction and are freely shared.

use std::str::FromStr;

use serde::Deserialize;

use crate::formatter::{self, FormatType};
use crate::parser::grammar::{self, KW_MODIFIERS, KW_TUPLE};
use crate::parser::{consume_eoi, consume_keywords, consume_params, lex, TokenKind, TokenString};
use crate::{Error, Result};

/// Shape of a parameter type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// A leaf type such as `uint256`, `bool` or `bytes`
    Basic,
    /// An ordered list of (possibly named) components
    Tuple { components: Vec<ParamType> },
    /// An array of `children`; `length` is `None` for a dynamic array (`[]`)
    Array {
        length: Option<usize>,
        children: Box<ParamType>,
    },
}

/// Immutable, validated descriptor of one parameter's type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamType {
    name: String,
    ty: String,
    indexed: Option<bool>,
    kind: ParamKind,
}

/// Structural (JSON ABI) form of a parameter
///
/// Unknown fields such as `internalType` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JsonParamType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub indexed: Option<bool>,
    #[serde(default)]
    pub components: Option<Vec<JsonParamType>>,
}

// ── Construction ──────────────────────────────────────────

impl ParamType {
    /// A basic (leaf) type, validated and canonicalized
    ///
    /// # Errors
    /// Returns `InvalidArgument` for unknown types and invalid widths.
    pub fn basic(ty: &str) -> Result<Self> {
        let ty = grammar::verify_basic_type(ty)?;
        Ok(ParamType {
            name: String::new(),
            ty,
            indexed: None,
            kind: ParamKind::Basic,
        })
    }

    /// A tuple of components; the canonical type text is derived from them
    pub fn tuple(components: Vec<ParamType>) -> Self {
        ParamType {
            name: String::new(),
            ty: tuple_type(&components),
            indexed: None,
            kind: ParamKind::Tuple { components },
        }
    }

    /// An array of `children`, dynamic when `length` is `None`
    ///
    /// The element's own name and indexed flag are dropped; those belong to
    /// the outermost array level only.
    pub fn array(children: ParamType, length: Option<usize>) -> Self {
        let ty = format!("{}{}", children.ty, array_suffix(length));
        let children = ParamType {
            name: String::new(),
            indexed: None,
            ..children
        };
        ParamType {
            name: String::new(),
            ty,
            indexed: None,
            kind: ParamKind::Array {
                length,
                children: Box::new(children),
            },
        }
    }

    /// The same type with a declared name
    ///
    /// # Errors
    /// Returns `InvalidArgument` unless `name` is empty or a valid identifier.
    pub fn with_name(self, name: &str) -> Result<Self> {
        if !name.is_empty() && !grammar::is_identifier(name) {
            return Err(Error::argument("invalid name", "name", name));
        }
        Ok(ParamType {
            name: name.to_string(),
            ..self
        })
    }

    /// The same type with an explicit indexed flag (event inputs)
    pub(crate) fn with_indexed(self, indexed: bool) -> Self {
        ParamType {
            indexed: Some(indexed),
            ..self
        }
    }

    pub(crate) fn without_indexed(self) -> Self {
        ParamType {
            indexed: None,
            ..self
        }
    }

    // ── Factories ──────────────────────────────────────

    /// Build a `ParamType` from text, tokens, JSON or an existing descriptor
    ///
    /// `allow_indexed` permits the `indexed` modifier; only event inputs set it.
    pub fn parse<T: IntoParamType>(input: T, allow_indexed: bool) -> Result<Self> {
        input.into_param_type(allow_indexed)
    }

    /// Recursive-descent parse of one parameter from tokens
    ///
    /// Grammar: `(tuple? '(' params ')' | TYPE) BRACKET* MODIFIER* ID?`,
    /// after which the token stream must be exhausted.
    ///
    /// # Errors
    /// Returns `ParseError` for structural problems, `InvalidArgument` for
    /// invalid basic types and `UnsupportedOperation` for `indexed` where it
    /// is not allowed.
    pub fn from_tokens(tokens: &mut TokenString, allow_indexed: bool) -> Result<Self> {
        let is_tuple = consume_keywords(tokens, KW_TUPLE)?.contains("tuple")
            || tokens.peek_type(TokenKind::OpenParen).is_some();

        let mut param = if is_tuple {
            ParamType::tuple(consume_params(tokens, false)?)
        } else {
            ParamType::basic(&tokens.pop_type(TokenKind::Type)?)?
        };

        while tokens.peek_type(TokenKind::Bracket).is_some() {
            let bracket = tokens.pop()?;
            param = ParamType::array(param, bracket.value);
        }

        let keywords = consume_keywords(tokens, KW_MODIFIERS)?;
        let is_indexed = keywords.contains("indexed");
        if is_indexed && !allow_indexed {
            return Err(Error::unsupported(
                "indexed",
                "parameter cannot be indexed outside event inputs",
            ));
        }
        if allow_indexed {
            param = param.with_indexed(is_indexed);
        }

        if tokens.peek_type(TokenKind::Id).is_some() {
            let name = tokens.pop()?.text;
            param = param.with_name(&name)?;
        }

        consume_eoi(tokens)?;
        Ok(param)
    }

    /// Build a `ParamType` from its structural (JSON ABI) form
    ///
    /// Array suffixes on `type` recurse into the element type, so
    /// `uint8[2][3]` nests like the token parser. Tuples take their
    /// components from `components`, or from the type text when it spells
    /// them out (`tuple(uint256,bool)`). No modifier keywords are parsed.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for invalid names, types and array lengths.
    pub fn from_json(obj: &JsonParamType, allow_indexed: bool) -> Result<Self> {
        let name = obj.name.as_deref().unwrap_or_default();
        let ty = obj.ty.trim();

        let param = if let Some(prefix) = ty.strip_suffix(']') {
            let open = prefix
                .rfind('[')
                .ok_or_else(|| Error::argument("invalid type", "type", ty))?;
            let length = parse_array_length(&prefix[open + 1..], ty)?;
            let element = JsonParamType {
                name: None,
                ty: prefix[..open].to_string(),
                indexed: None,
                components: obj.components.clone(),
            };
            ParamType::array(ParamType::from_json(&element, false)?, length)
        } else if ty == "tuple" || ty.starts_with("tuple(") || ty.starts_with('(') {
            match &obj.components {
                Some(components) => ParamType::tuple(
                    components
                        .iter()
                        .map(|component| ParamType::from_json(component, false))
                        .collect::<Result<_>>()?,
                ),
                None if ty == "tuple" => {
                    return Err(Error::argument(
                        "tuple type requires components",
                        "components",
                        ty,
                    ))
                }
                None => ParamType::from_tokens(&mut lex(ty)?, false)?,
            }
        } else {
            ParamType::basic(ty)?
        };

        let param = param.with_name(name)?;
        match (obj.indexed, allow_indexed) {
            (Some(true), false) => Err(Error::unsupported(
                "indexed",
                "parameter cannot be indexed outside event inputs",
            )),
            (indexed, true) => Ok(param.with_indexed(indexed.unwrap_or(false))),
            (_, false) => Ok(param),
        }
    }

    /// Signature text, or a JSON object when the text starts with `{`
    fn from_text(text: &str, allow_indexed: bool) -> Result<Self> {
        if text.trim_start().starts_with('{') {
            tracing::debug!("parameter text is a JSON object");
            let obj: JsonParamType = serde_json::from_str(text)?;
            return ParamType::from_json(&obj, allow_indexed);
        }
        ParamType::from_tokens(&mut lex(text)?, allow_indexed)
    }

    /// Build a `ParamType` from a JSON value
    pub fn from_value(value: &serde_json::Value, allow_indexed: bool) -> Result<Self> {
        let obj: JsonParamType = serde_json::from_value(value.clone())?;
        ParamType::from_json(&obj, allow_indexed)
    }

    // ── Accessors ──────────────────────────────────────

    /// Declared name, empty when anonymous
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical type text
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// `"tuple"`, `"array"`, or the basic type itself
    pub fn base_type(&self) -> &str {
        match self.kind {
            ParamKind::Basic => &self.ty,
            ParamKind::Tuple { .. } => "tuple",
            ParamKind::Array { .. } => "array",
        }
    }

    /// `None` unless the parameter was built as an event input
    pub fn indexed(&self) -> Option<bool> {
        self.indexed
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed == Some(true)
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self.kind, ParamKind::Tuple { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ParamKind::Array { .. })
    }

    /// Tuple components
    pub fn components(&self) -> Option<&[ParamType]> {
        match &self.kind {
            ParamKind::Tuple { components } => Some(components),
            _ => None,
        }
    }

    /// Array element type
    pub fn array_children(&self) -> Option<&ParamType> {
        match &self.kind {
            ParamKind::Array { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Fixed array length; `None` for dynamic arrays and non-arrays
    pub fn array_length(&self) -> Option<usize> {
        match self.kind {
            ParamKind::Array { length, .. } => length,
            _ => None,
        }
    }

    /// Render in one of the four output grammars
    pub fn format(&self, format: FormatType) -> String {
        formatter::format_param(self, format)
    }

    /// The JSON ABI form as a `serde_json::Value`
    pub fn to_json(&self) -> serde_json::Value {
        formatter::param_to_json(self)
    }
}

fn tuple_type(components: &[ParamType]) -> String {
    let types: Vec<&str> = components.iter().map(|c| c.ty()).collect();
    format!("tuple({})", types.join(","))
}

pub(crate) fn array_suffix(length: Option<usize>) -> String {
    match length {
        Some(length) => format!("[{}]", length),
        None => "[]".to_string(),
    }
}

fn parse_array_length(digits: &str, ty: &str) -> Result<Option<usize>> {
    if digits.is_empty() {
        return Ok(None);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::argument("invalid array length", "type", ty));
    }
    digits
        .parse()
        .map(Some)
        .map_err(|_| Error::argument("invalid array length", "type", ty))
}

impl FromStr for ParamType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ParamType::from_text(s, false)
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.format(FormatType::Full))
    }
}

// ── Input dispatch ────────────────────────────────────────

/// Anything a `ParamType` can be built from
pub trait IntoParamType {
    fn into_param_type(self, allow_indexed: bool) -> Result<ParamType>;
}

impl IntoParamType for ParamType {
    fn into_param_type(self, _allow_indexed: bool) -> Result<ParamType> {
        Ok(self)
    }
}

impl IntoParamType for &ParamType {
    fn into_param_type(self, _allow_indexed: bool) -> Result<ParamType> {
        Ok(self.clone())
    }
}

impl IntoParamType for &str {
    fn into_param_type(self, allow_indexed: bool) -> Result<ParamType> {
        ParamType::from_text(self, allow_indexed)
    }
}

impl IntoParamType for String {
    fn into_param_type(self, allow_indexed: bool) -> Result<ParamType> {
        self.as_str().into_param_type(allow_indexed)
    }
}

impl IntoParamType for TokenString {
    fn into_param_type(mut self, allow_indexed: bool) -> Result<ParamType> {
        ParamType::from_tokens(&mut self, allow_indexed)
    }
}

impl IntoParamType for &JsonParamType {
    fn into_param_type(self, allow_indexed: bool) -> Result<ParamType> {
        ParamType::from_json(self, allow_indexed)
    }
}

impl IntoParamType for &serde_json::Value {
    fn into_param_type(self, allow_indexed: bool) -> Result<ParamType> {
        ParamType::from_value(self, allow_indexed)
    }
}
