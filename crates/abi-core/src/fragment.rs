//! Fragments — one top-level ABI declaration each
//!
//! `Fragment` is a closed union over the declaration kinds:
//!
//! ```text
//! constructor(address owner) payable @50000
//! error InsufficientBalance(uint256 available, uint256 required)
//! event Transfer(address indexed from, address indexed to, uint256 value)
//! function balanceOf(address owner) view returns (uint256)
//! struct Order(address maker, uint256 amount)
//! fallback() payable / receive() payable
//! ```
//!
//! Every kind is built through a validating constructor (`new`), from
//! tokens, or from the standard JSON ABI object. All of them are immutable
//! once built and share their `ParamType`s freely.
//!
//! # Guarantees
//! - Only event inputs ever carry `indexed: Some(_)`
//! - `FunctionFragment::constant()` is derived, never stored
//! - A fragment parsed from text consumed every token

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::formatter::{self, FormatType};
use crate::param_type::{JsonParamType, ParamType};
use crate::parser::grammar::{
    self, KW_ANONYMOUS, KW_CONSTRUCTOR, KW_FALLBACK, KW_RETURNS, KW_TYPES, KW_VISIBILITY_DEPLOY,
};
use crate::parser::{
    consume_eoi, consume_gas, consume_keywords, consume_mutability, consume_name, consume_params,
    lex, TokenString,
};
use crate::{Error, Result};

// ── Mutability and kinds ──────────────────────────────────

/// Declared state-interaction class of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Payable,
    #[default]
    NonPayable,
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::Payable => "payable",
            StateMutability::NonPayable => "nonpayable",
        };
        f.write_str(name)
    }
}

impl FromStr for StateMutability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pure" => Ok(StateMutability::Pure),
            "view" => Ok(StateMutability::View),
            "payable" => Ok(StateMutability::Payable),
            "nonpayable" => Ok(StateMutability::NonPayable),
            _ => Err(Error::argument(
                "invalid state mutability",
                "stateMutability",
                s,
            )),
        }
    }
}

/// Discriminant of a `Fragment`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Constructor,
    Error,
    Event,
    /// `fallback` and `receive`
    Fallback,
    Function,
    Struct,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FragmentKind::Constructor => "constructor",
            FragmentKind::Error => "error",
            FragmentKind::Event => "event",
            FragmentKind::Fallback => "fallback",
            FragmentKind::Function => "function",
            FragmentKind::Struct => "struct",
        };
        f.write_str(name)
    }
}

// ── JSON schema ───────────────────────────────────────────

/// Structural (JSON ABI) form of a fragment
///
/// Every field is optional so legacy documents deserialize; the per-kind
/// `from_json` decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFragment {
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Option<Vec<JsonParamType>>,
    #[serde(default)]
    pub outputs: Option<Vec<JsonParamType>>,
    #[serde(default)]
    pub state_mutability: Option<StateMutability>,
    #[serde(default)]
    pub anonymous: Option<bool>,
    #[serde(default)]
    pub constant: Option<bool>,
    #[serde(default)]
    pub payable: Option<bool>,
    /// Decimal string, `0x` hex string or JSON number
    #[serde(default)]
    pub gas: Option<serde_json::Value>,
}

impl JsonFragment {
    fn expect_type(&self, expected: &[&str]) -> Result<&str> {
        let ty = self.ty.as_deref().unwrap_or("function");
        if !expected.contains(&ty) {
            return Err(Error::argument(
                format!("expected {} fragment", expected.join(" or ")),
                "type",
                ty,
            ));
        }
        Ok(ty)
    }

    fn required_name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| Error::argument("missing fragment name", "name", ""))
    }

    fn params(params: &Option<Vec<JsonParamType>>, allow_indexed: bool) -> Result<Vec<ParamType>> {
        params
            .iter()
            .flatten()
            .map(|param| ParamType::from_json(param, allow_indexed))
            .collect()
    }

    /// `stateMutability`, else the legacy `constant`/`payable` flags
    fn mutability(&self) -> Result<StateMutability> {
        if let Some(mutability) = self.state_mutability {
            return Ok(mutability);
        }
        match (self.constant.unwrap_or(false), self.payable.unwrap_or(false)) {
            (true, true) => Err(Error::argument(
                "cannot have constant payable function",
                "value",
                "constant+payable",
            )),
            (true, false) => Ok(StateMutability::View),
            (false, true) => Ok(StateMutability::Payable),
            (false, false) => Ok(StateMutability::NonPayable),
        }
    }

    fn gas(&self) -> Result<Option<BigUint>> {
        let invalid =
            |value: &serde_json::Value| Error::argument("invalid gas", "gas", value.to_string());
        match &self.gas {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .map(|gas| Some(BigUint::from(gas)))
                .ok_or_else(|| invalid(&serde_json::Value::Number(n.clone()))),
            Some(value @ serde_json::Value::String(text)) => {
                let parsed = match text.strip_prefix("0x") {
                    Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
                    None if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
                        text.parse().ok()
                    }
                    None => None,
                };
                parsed.map(Some).ok_or_else(|| invalid(value))
            }
            Some(value) => Err(invalid(value)),
        }
    }
}

// ── Shared validation ─────────────────────────────────────

fn verify_name(kind: &str, name: &str) -> Result<String> {
    if !grammar::is_identifier(name) {
        return Err(Error::argument(format!("invalid {} name", kind), "name", name));
    }
    Ok(name.to_string())
}

/// Rejects indexed parameters and drops any `indexed: false` flag, which
/// only event inputs carry.
fn unindexed(params: Vec<ParamType>) -> Result<Vec<ParamType>> {
    if let Some(param) = params.iter().find(|param| param.is_indexed()) {
        return Err(Error::unsupported(
            "indexed",
            format!("parameter {:?} cannot be indexed outside event inputs", param.name()),
        ));
    }
    Ok(params.into_iter().map(ParamType::without_indexed).collect())
}

fn bytes_param() -> Result<ParamType> {
    ParamType::basic("bytes")
}

fn is_bytes(params: &[ParamType]) -> bool {
    matches!(params, [param] if param.ty() == "bytes")
}

// ── Error ─────────────────────────────────────────────────

/// `error Name(params)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFragment {
    name: String,
    inputs: Vec<ParamType>,
}

impl ErrorFragment {
    pub fn new(name: &str, inputs: Vec<ParamType>) -> Result<Self> {
        let inputs = unindexed(inputs)?;
        Ok(ErrorFragment {
            name: verify_name("error", name)?,
            inputs,
        })
    }

    pub fn from_tokens(tokens: &mut TokenString) -> Result<Self> {
        let name = consume_name("error", tokens)?;
        let inputs = consume_params(tokens, false)?;
        consume_eoi(tokens)?;
        ErrorFragment::new(&name, inputs)
    }

    pub fn from_json(obj: &JsonFragment) -> Result<Self> {
        obj.expect_type(&["error"])?;
        ErrorFragment::new(obj.required_name()?, JsonFragment::params(&obj.inputs, false)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn format(&self, format: FormatType) -> String {
        formatter::format_error(self, format)
    }
}

// ── Event ─────────────────────────────────────────────────

/// `event Name(params) [anonymous]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFragment {
    name: String,
    inputs: Vec<ParamType>,
    anonymous: bool,
}

impl EventFragment {
    /// Inputs without an indexed flag are marked `indexed: Some(false)`
    pub fn new(name: &str, inputs: Vec<ParamType>, anonymous: bool) -> Result<Self> {
        let inputs = inputs
            .into_iter()
            .map(|param| match param.indexed() {
                Some(_) => param,
                None => param.with_indexed(false),
            })
            .collect();
        Ok(EventFragment {
            name: verify_name("event", name)?,
            inputs,
            anonymous,
        })
    }

    pub fn from_tokens(tokens: &mut TokenString) -> Result<Self> {
        let name = consume_name("event", tokens)?;
        let inputs = consume_params(tokens, true)?;
        let anonymous = consume_keywords(tokens, KW_ANONYMOUS)?.contains("anonymous");
        consume_eoi(tokens)?;
        EventFragment::new(&name, inputs, anonymous)
    }

    pub fn from_json(obj: &JsonFragment) -> Result<Self> {
        obj.expect_type(&["event"])?;
        EventFragment::new(
            obj.required_name()?,
            JsonFragment::params(&obj.inputs, true)?,
            obj.anonymous.unwrap_or(false),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn format(&self, format: FormatType) -> String {
        formatter::format_event(self, format)
    }
}

// ── Constructor ───────────────────────────────────────────

/// `constructor(params) [payable] [@gas]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorFragment {
    inputs: Vec<ParamType>,
    payable: bool,
    gas: Option<BigUint>,
}

impl ConstructorFragment {
    pub fn new(inputs: Vec<ParamType>, payable: bool, gas: Option<BigUint>) -> Result<Self> {
        let inputs = unindexed(inputs)?;
        Ok(ConstructorFragment {
            inputs,
            payable,
            gas,
        })
    }

    pub fn from_tokens(tokens: &mut TokenString) -> Result<Self> {
        tokens.pop_keyword(KW_CONSTRUCTOR)?;
        let inputs = consume_params(tokens, false)?;
        let payable = consume_keywords(tokens, KW_VISIBILITY_DEPLOY)?.contains("payable");
        let gas = consume_gas(tokens)?;
        consume_eoi(tokens)?;
        ConstructorFragment::new(inputs, payable, gas)
    }

    pub fn from_json(obj: &JsonFragment) -> Result<Self> {
        obj.expect_type(&["constructor"])?;
        let payable = match obj.mutability()? {
            StateMutability::Payable => true,
            StateMutability::NonPayable => false,
            other => {
                return Err(Error::argument(
                    "constructor cannot be view or pure",
                    "stateMutability",
                    other.to_string(),
                ))
            }
        };
        ConstructorFragment::new(JsonFragment::params(&obj.inputs, false)?, payable, obj.gas()?)
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn payable(&self) -> bool {
        self.payable
    }

    pub fn gas(&self) -> Option<&BigUint> {
        self.gas.as_ref()
    }

    /// # Errors
    /// Returns `UnsupportedOperation` for `FormatType::Sighash`.
    pub fn format(&self, format: FormatType) -> Result<String> {
        formatter::format_constructor(self, format)
    }
}

// ── Fallback / receive ────────────────────────────────────

/// `fallback() [payable]` or `receive() payable`
///
/// A fallback function always receives the raw calldata as one `bytes`
/// input; `receive` takes none and is always payable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackFragment {
    inputs: Vec<ParamType>,
    payable: bool,
}

impl FallbackFragment {
    pub fn fallback(payable: bool) -> Result<Self> {
        Ok(FallbackFragment {
            inputs: vec![bytes_param()?],
            payable,
        })
    }

    pub fn receive() -> Self {
        FallbackFragment {
            inputs: Vec::new(),
            payable: true,
        }
    }

    pub fn from_tokens(tokens: &mut TokenString) -> Result<Self> {
        let offset = tokens.peek()?.offset;
        let keyword = tokens.pop_keyword(KW_FALLBACK)?;
        let inputs = consume_params(tokens, false)?;
        let mutability = consume_mutability(tokens)?;

        let fragment = if keyword == "receive" {
            if !inputs.is_empty() {
                return Err(Error::parse("receive cannot have arguments", Some(offset)));
            }
            if mutability != StateMutability::Payable {
                return Err(Error::parse("receive must be payable", Some(offset)));
            }
            FallbackFragment::receive()
        } else {
            if !inputs.is_empty() && !is_bytes(&inputs) {
                return Err(Error::parse("fallback can only accept bytes", Some(offset)));
            }
            if consume_keywords(tokens, KW_RETURNS)?.contains("returns") {
                let outputs = consume_params(tokens, false)?;
                if !is_bytes(&outputs) {
                    return Err(Error::parse("fallback can only return bytes", Some(offset)));
                }
            }
            match mutability {
                StateMutability::Payable => FallbackFragment::fallback(true)?,
                StateMutability::NonPayable => FallbackFragment::fallback(false)?,
                other => {
                    return Err(Error::parse(
                        format!("fallback cannot be {}", other),
                        Some(offset),
                    ))
                }
            }
        };

        consume_eoi(tokens)?;
        Ok(fragment)
    }

    pub fn from_json(obj: &JsonFragment) -> Result<Self> {
        let ty = obj.expect_type(&["fallback", "receive"])?;
        let mutability = match (ty, obj.state_mutability) {
            ("receive", None) => StateMutability::Payable,
            _ => obj.mutability()?,
        };
        match (ty, mutability) {
            ("receive", StateMutability::Payable) => Ok(FallbackFragment::receive()),
            ("receive", other) => Err(Error::argument(
                "receive must be payable",
                "stateMutability",
                other.to_string(),
            )),
            (_, StateMutability::Payable) => FallbackFragment::fallback(true),
            (_, StateMutability::NonPayable) => FallbackFragment::fallback(false),
            (_, other) => Err(Error::argument(
                "fallback cannot be view or pure",
                "stateMutability",
                other.to_string(),
            )),
        }
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn payable(&self) -> bool {
        self.payable
    }

    pub fn is_receive(&self) -> bool {
        self.inputs.is_empty()
    }

    /// `"receive"` or `"fallback"`
    pub fn kind_name(&self) -> &'static str {
        if self.is_receive() {
            "receive"
        } else {
            "fallback"
        }
    }

    /// # Errors
    /// Returns `UnsupportedOperation` for `FormatType::Sighash`.
    pub fn format(&self, format: FormatType) -> Result<String> {
        formatter::format_fallback(self, format)
    }
}

// ── Function ──────────────────────────────────────────────

/// `function name(params) [mutability] [returns (params)] [@gas]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFragment {
    name: String,
    state_mutability: StateMutability,
    inputs: Vec<ParamType>,
    outputs: Vec<ParamType>,
    gas: Option<BigUint>,
}

impl FunctionFragment {
    pub fn new(
        name: &str,
        state_mutability: StateMutability,
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
        gas: Option<BigUint>,
    ) -> Result<Self> {
        let inputs = unindexed(inputs)?;
        let outputs = unindexed(outputs)?;
        Ok(FunctionFragment {
            name: verify_name("function", name)?,
            state_mutability,
            inputs,
            outputs,
            gas,
        })
    }

    pub fn from_tokens(tokens: &mut TokenString) -> Result<Self> {
        let name = consume_name("function", tokens)?;
        let inputs = consume_params(tokens, false)?;
        let mutability = consume_mutability(tokens)?;
        let outputs = if consume_keywords(tokens, KW_RETURNS)?.contains("returns") {
            consume_params(tokens, false)?
        } else {
            Vec::new()
        };
        let gas = consume_gas(tokens)?;
        consume_eoi(tokens)?;
        FunctionFragment::new(&name, mutability, inputs, outputs, gas)
    }

    /// A missing `type` is read as `"function"`
    pub fn from_json(obj: &JsonFragment) -> Result<Self> {
        obj.expect_type(&["function"])?;
        FunctionFragment::new(
            obj.required_name()?,
            obj.mutability()?,
            JsonFragment::params(&obj.inputs, false)?,
            JsonFragment::params(&obj.outputs, false)?,
            obj.gas()?,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_mutability(&self) -> StateMutability {
        self.state_mutability
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ParamType] {
        &self.outputs
    }

    pub fn gas(&self) -> Option<&BigUint> {
        self.gas.as_ref()
    }

    /// True for `pure` and `view` functions
    pub fn constant(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::Pure | StateMutability::View
        )
    }

    pub fn payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }

    pub fn format(&self, format: FormatType) -> String {
        formatter::format_function(self, format)
    }
}

// ── Struct ────────────────────────────────────────────────

/// `struct Name(params)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructFragment {
    name: String,
    inputs: Vec<ParamType>,
}

impl StructFragment {
    pub fn new(name: &str, inputs: Vec<ParamType>) -> Result<Self> {
        let inputs = unindexed(inputs)?;
        Ok(StructFragment {
            name: verify_name("struct", name)?,
            inputs,
        })
    }

    pub fn from_tokens(tokens: &mut TokenString) -> Result<Self> {
        let name = consume_name("struct", tokens)?;
        let inputs = consume_params(tokens, false)?;
        consume_eoi(tokens)?;
        StructFragment::new(&name, inputs)
    }

    pub fn from_json(obj: &JsonFragment) -> Result<Self> {
        obj.expect_type(&["struct"])?;
        StructFragment::new(obj.required_name()?, JsonFragment::params(&obj.inputs, false)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn format(&self, format: FormatType) -> String {
        formatter::format_struct(self, format)
    }
}

macro_rules! impl_from_str {
    ($($kind:ident),*) => {$(
        impl FromStr for $kind {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                $kind::from_tokens(&mut lex(s)?)
            }
        }
    )*};
}

impl_from_str!(
    ErrorFragment,
    EventFragment,
    ConstructorFragment,
    FallbackFragment,
    FunctionFragment,
    StructFragment
);

// ── Fragment ──────────────────────────────────────────────

/// Any top-level ABI declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Constructor(ConstructorFragment),
    Error(ErrorFragment),
    Event(EventFragment),
    Fallback(FallbackFragment),
    Function(FunctionFragment),
    Struct(StructFragment),
}

impl Fragment {
    /// Build a fragment from text, tokens, JSON or an existing fragment
    ///
    /// Text whose first non-blank character is `{` is read as a JSON object.
    pub fn parse<T: IntoFragment>(input: T) -> Result<Self> {
        input.into_fragment()
    }

    /// Dispatch on the leading declaration keyword
    ///
    /// # Errors
    /// Returns `InvalidArgument` when the tokens do not start with one of
    /// `constructor`, `error`, `event`, `fallback`, `function`, `receive`
    /// or `struct`.
    pub fn from_tokens(tokens: &mut TokenString) -> Result<Self> {
        let keyword = tokens.peek_keyword(KW_TYPES).map(str::to_string);
        let fragment = match keyword.as_deref() {
            Some("constructor") => Fragment::Constructor(ConstructorFragment::from_tokens(tokens)?),
            Some("error") => Fragment::Error(ErrorFragment::from_tokens(tokens)?),
            Some("event") => Fragment::Event(EventFragment::from_tokens(tokens)?),
            Some("fallback") | Some("receive") => {
                Fragment::Fallback(FallbackFragment::from_tokens(tokens)?)
            }
            Some("function") => Fragment::Function(FunctionFragment::from_tokens(tokens)?),
            Some("struct") => Fragment::Struct(StructFragment::from_tokens(tokens)?),
            _ => {
                return Err(Error::argument(
                    "unsupported fragment",
                    "fragment",
                    tokens.to_string(),
                ))
            }
        };
        tracing::debug!(
            kind = %fragment.kind(),
            name = fragment.name().unwrap_or_default(),
            "parsed fragment from tokens"
        );
        Ok(fragment)
    }

    /// Dispatch on the JSON `type`; a missing `type` means `function`
    ///
    /// # Errors
    /// Returns `UnsupportedOperation` for an unknown `type`.
    pub fn from_json(obj: &JsonFragment) -> Result<Self> {
        let fragment = match obj.ty.as_deref().unwrap_or("function") {
            "constructor" => Fragment::Constructor(ConstructorFragment::from_json(obj)?),
            "error" => Fragment::Error(ErrorFragment::from_json(obj)?),
            "event" => Fragment::Event(EventFragment::from_json(obj)?),
            "fallback" | "receive" => Fragment::Fallback(FallbackFragment::from_json(obj)?),
            "function" => Fragment::Function(FunctionFragment::from_json(obj)?),
            "struct" => Fragment::Struct(StructFragment::from_json(obj)?),
            other => {
                return Err(Error::unsupported(
                    "from_json",
                    format!("unsupported fragment type {:?}", other),
                ))
            }
        };
        tracing::debug!(
            kind = %fragment.kind(),
            name = fragment.name().unwrap_or_default(),
            "parsed fragment from json"
        );
        Ok(fragment)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let obj: JsonFragment = serde_json::from_value(value.clone())?;
        Fragment::from_json(&obj)
    }

    fn from_text(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('{') {
            tracing::debug!("fragment text is a JSON object");
            let obj: JsonFragment = serde_json::from_str(text)?;
            return Fragment::from_json(&obj);
        }
        Fragment::from_tokens(&mut lex(text)?)
    }

    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Constructor(_) => FragmentKind::Constructor,
            Fragment::Error(_) => FragmentKind::Error,
            Fragment::Event(_) => FragmentKind::Event,
            Fragment::Fallback(_) => FragmentKind::Fallback,
            Fragment::Function(_) => FragmentKind::Function,
            Fragment::Struct(_) => FragmentKind::Struct,
        }
    }

    /// Declared name; constructors and fallback functions have none
    pub fn name(&self) -> Option<&str> {
        match self {
            Fragment::Constructor(_) | Fragment::Fallback(_) => None,
            Fragment::Error(f) => Some(f.name()),
            Fragment::Event(f) => Some(f.name()),
            Fragment::Function(f) => Some(f.name()),
            Fragment::Struct(f) => Some(f.name()),
        }
    }

    pub fn inputs(&self) -> &[ParamType] {
        match self {
            Fragment::Constructor(f) => f.inputs(),
            Fragment::Error(f) => f.inputs(),
            Fragment::Event(f) => f.inputs(),
            Fragment::Fallback(f) => f.inputs(),
            Fragment::Function(f) => f.inputs(),
            Fragment::Struct(f) => f.inputs(),
        }
    }

    /// Render in one of the four output grammars
    ///
    /// # Errors
    /// Returns `UnsupportedOperation` for the sighash of a constructor or a
    /// fallback function.
    pub fn format(&self, format: FormatType) -> Result<String> {
        formatter::format_fragment(self, format)
    }

    pub fn to_json(&self) -> serde_json::Value {
        formatter::fragment_to_json(self)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = self.format(FormatType::Full).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Fragment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Fragment::from_text(s)
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident => $kind:ident),*) => {$(
        impl From<$kind> for Fragment {
            fn from(fragment: $kind) -> Self {
                Fragment::$variant(fragment)
            }
        }
    )*};
}

impl_from_kind!(
    Constructor => ConstructorFragment,
    Error => ErrorFragment,
    Event => EventFragment,
    Fallback => FallbackFragment,
    Function => FunctionFragment,
    Struct => StructFragment
);

// ── Input dispatch ────────────────────────────────────────

/// Anything a `Fragment` can be built from
pub trait IntoFragment {
    fn into_fragment(self) -> Result<Fragment>;
}

impl IntoFragment for Fragment {
    fn into_fragment(self) -> Result<Fragment> {
        Ok(self)
    }
}

impl IntoFragment for &Fragment {
    fn into_fragment(self) -> Result<Fragment> {
        Ok(self.clone())
    }
}

impl IntoFragment for &str {
    fn into_fragment(self) -> Result<Fragment> {
        Fragment::from_text(self)
    }
}

impl IntoFragment for String {
    fn into_fragment(self) -> Result<Fragment> {
        Fragment::from_text(&self)
    }
}

impl IntoFragment for TokenString {
    fn into_fragment(mut self) -> Result<Fragment> {
        Fragment::from_tokens(&mut self)
    }
}

impl IntoFragment for &JsonFragment {
    fn into_fragment(self) -> Result<Fragment> {
        Fragment::from_json(self)
    }
}

impl IntoFragment for &serde_json::Value {
    fn into_fragment(self) -> Result<Fragment> {
        Fragment::from_value(self)
    }
}
