//! Output grammars — renders parameter types and fragments as text or JSON
//!
//! | grammar   | example                                                      |
//! |-----------|--------------------------------------------------------------|
//! | `sighash` | `transfer(address,uint256)`                                  |
//! | `minimal` | `function transfer(address,uint256) returns (bool)`          |
//! | `full`    | `function transfer(address to, uint256 amount) returns (bool)` |
//! | `json`    | the standard ABI JSON object                                 |
//!
//! The sighash form is the pre-image hashed into selectors and event
//! topics: no whitespace, no names, no `tuple` keyword. It is undefined for
//! constructors and fallback functions, which report `UnsupportedOperation`.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::fragment::{
    ConstructorFragment, ErrorFragment, EventFragment, FallbackFragment, Fragment,
    FunctionFragment, StateMutability, StructFragment,
};
use crate::param_type::{array_suffix, ParamKind, ParamType};
use crate::{Error, Result};

/// Output grammar selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatType {
    /// Canonical signature used for selector and topic hashing
    #[default]
    Sighash,
    /// Human-readable, types and modifiers only
    Minimal,
    /// Human-readable, with names and spacing
    Full,
    /// Standard ABI JSON
    Json,
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FormatType::Sighash => "sighash",
            FormatType::Minimal => "minimal",
            FormatType::Full => "full",
            FormatType::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for FormatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sighash" => Ok(FormatType::Sighash),
            "minimal" => Ok(FormatType::Minimal),
            "full" => Ok(FormatType::Full),
            "json" => Ok(FormatType::Json),
            _ => Err(Error::argument("invalid format type", "format", s)),
        }
    }
}

// ── Parameter types ───────────────────────────────────────

/// Render a parameter type in the requested grammar
pub fn format_param(param: &ParamType, format: FormatType) -> String {
    if format == FormatType::Json {
        return param_to_json(param).to_string();
    }

    let mut out = String::new();
    write_param_type(&mut out, param, format);
    if format != FormatType::Sighash {
        if param.is_indexed() {
            out.push_str(" indexed");
        }
        if format == FormatType::Full && !param.name().is_empty() {
            out.push(' ');
            out.push_str(param.name());
        }
    }
    out
}

/// The type portion only; names and modifiers belong to the caller
fn write_param_type(out: &mut String, param: &ParamType, format: FormatType) {
    match param.kind() {
        ParamKind::Basic => out.push_str(param.ty()),
        ParamKind::Tuple { components } => {
            if format != FormatType::Sighash {
                out.push_str("tuple");
            }
            out.push_str(&join_params(format, components));
        }
        ParamKind::Array { length, children } => {
            write_param_type(out, children, format);
            out.push_str(&array_suffix(*length));
        }
    }
}

/// `(p1,p2)`: comma-space separated in the full grammar
pub fn join_params(format: FormatType, params: &[ParamType]) -> String {
    let separator = if format == FormatType::Full { ", " } else { "," };
    let parts: Vec<String> = params.iter().map(|p| format_param(p, format)).collect();
    format!("({})", parts.join(separator))
}

/// The JSON ABI object for a parameter
///
/// Arrays carry their element's JSON with the suffixed type, so an array of
/// tuples is `{"type": "tuple[]", "components": [...]}`.
pub fn param_to_json(param: &ParamType) -> Value {
    let (ty, components) = json_shape(param);

    let mut obj = Map::new();
    obj.insert("type".into(), Value::String(ty));
    obj.insert("name".into(), Value::String(param.name().to_string()));
    if let Some(indexed) = param.indexed() {
        obj.insert("indexed".into(), Value::Bool(indexed));
    }
    if let Some(components) = components {
        obj.insert("components".into(), Value::Array(components));
    }
    Value::Object(obj)
}

fn json_shape(param: &ParamType) -> (String, Option<Vec<Value>>) {
    match param.kind() {
        ParamKind::Basic => (param.ty().to_string(), None),
        ParamKind::Tuple { components } => (
            "tuple".to_string(),
            Some(components.iter().map(param_to_json).collect()),
        ),
        ParamKind::Array { length, children } => {
            let (ty, components) = json_shape(children);
            (format!("{}{}", ty, array_suffix(*length)), components)
        }
    }
}

fn params_to_json(params: &[ParamType]) -> Value {
    Value::Array(params.iter().map(param_to_json).collect())
}

// ── Fragments ─────────────────────────────────────────────

/// Render a fragment in the requested grammar
///
/// # Errors
/// Returns `UnsupportedOperation` for the sighash of a constructor or a
/// fallback function.
pub fn format_fragment(fragment: &Fragment, format: FormatType) -> Result<String> {
    match fragment {
        Fragment::Constructor(f) => format_constructor(f, format),
        Fragment::Error(f) => Ok(format_error(f, format)),
        Fragment::Event(f) => Ok(format_event(f, format)),
        Fragment::Fallback(f) => format_fallback(f, format),
        Fragment::Function(f) => Ok(format_function(f, format)),
        Fragment::Struct(f) => Ok(format_struct(f, format)),
    }
}

/// `keyword name(params)`, with the keyword dropped for sighash
fn named_signature(
    keyword: &str,
    name: &str,
    inputs: &[ParamType],
    format: FormatType,
) -> Vec<String> {
    let mut parts = Vec::new();
    if format != FormatType::Sighash {
        parts.push(keyword.to_string());
    }
    parts.push(format!("{}{}", name, join_params(format, inputs)));
    parts
}

pub(crate) fn format_error(f: &ErrorFragment, format: FormatType) -> String {
    if format == FormatType::Json {
        return error_to_json(f).to_string();
    }
    named_signature("error", f.name(), f.inputs(), format).join(" ")
}

pub(crate) fn format_event(f: &EventFragment, format: FormatType) -> String {
    if format == FormatType::Json {
        return event_to_json(f).to_string();
    }
    let mut parts = named_signature("event", f.name(), f.inputs(), format);
    if format != FormatType::Sighash && f.anonymous() {
        parts.push("anonymous".into());
    }
    parts.join(" ")
}

pub(crate) fn format_struct(f: &StructFragment, format: FormatType) -> String {
    if format == FormatType::Json {
        return struct_to_json(f).to_string();
    }
    named_signature("struct", f.name(), f.inputs(), format).join(" ")
}

pub(crate) fn format_function(f: &FunctionFragment, format: FormatType) -> String {
    if format == FormatType::Json {
        return function_to_json(f).to_string();
    }
    let mut parts = named_signature("function", f.name(), f.inputs(), format);
    if format != FormatType::Sighash {
        if f.state_mutability() != StateMutability::NonPayable {
            parts.push(f.state_mutability().to_string());
        }
        if !f.outputs().is_empty() {
            parts.push("returns".into());
            parts.push(join_params(format, f.outputs()));
        }
        if let Some(gas) = f.gas() {
            parts.push(format!("@{}", gas));
        }
    }
    parts.join(" ")
}

pub(crate) fn format_constructor(f: &ConstructorFragment, format: FormatType) -> Result<String> {
    match format {
        FormatType::Sighash => Err(Error::unsupported(
            "format(sighash)",
            "cannot format a constructor for sighash",
        )),
        FormatType::Json => Ok(constructor_to_json(f).to_string()),
        FormatType::Minimal | FormatType::Full => {
            let mut parts = vec![format!("constructor{}", join_params(format, f.inputs()))];
            if f.payable() {
                parts.push("payable".into());
            }
            if let Some(gas) = f.gas() {
                parts.push(format!("@{}", gas));
            }
            Ok(parts.join(" "))
        }
    }
}

pub(crate) fn format_fallback(f: &FallbackFragment, format: FormatType) -> Result<String> {
    match format {
        FormatType::Sighash => Err(Error::unsupported(
            "format(sighash)",
            format!("cannot format {} for sighash", f.kind_name()),
        )),
        FormatType::Json => Ok(fallback_to_json(f).to_string()),
        FormatType::Minimal | FormatType::Full => {
            let payable = if f.payable() { " payable" } else { "" };
            Ok(format!("{}(){}", f.kind_name(), payable))
        }
    }
}

// ── Fragment JSON ─────────────────────────────────────────

/// The JSON ABI object for a fragment
pub fn fragment_to_json(fragment: &Fragment) -> Value {
    match fragment {
        Fragment::Constructor(f) => constructor_to_json(f),
        Fragment::Error(f) => error_to_json(f),
        Fragment::Event(f) => event_to_json(f),
        Fragment::Fallback(f) => fallback_to_json(f),
        Fragment::Function(f) => function_to_json(f),
        Fragment::Struct(f) => struct_to_json(f),
    }
}

fn error_to_json(f: &ErrorFragment) -> Value {
    json!({
        "type": "error",
        "name": f.name(),
        "inputs": params_to_json(f.inputs()),
    })
}

fn event_to_json(f: &EventFragment) -> Value {
    json!({
        "type": "event",
        "anonymous": f.anonymous(),
        "name": f.name(),
        "inputs": params_to_json(f.inputs()),
    })
}

fn struct_to_json(f: &StructFragment) -> Value {
    json!({
        "type": "struct",
        "name": f.name(),
        "inputs": params_to_json(f.inputs()),
    })
}

fn function_to_json(f: &FunctionFragment) -> Value {
    let mut obj = json!({
        "type": "function",
        "name": f.name(),
        "constant": f.constant(),
        "stateMutability": f.state_mutability().to_string(),
        "payable": f.payable(),
        "inputs": params_to_json(f.inputs()),
        "outputs": params_to_json(f.outputs()),
    });
    if let (Some(gas), Some(map)) = (f.gas(), obj.as_object_mut()) {
        map.insert("gas".into(), Value::String(gas.to_string()));
    }
    obj
}

fn constructor_to_json(f: &ConstructorFragment) -> Value {
    let mut obj = json!({
        "type": "constructor",
        "stateMutability": payable_mutability(f.payable()).to_string(),
        "payable": f.payable(),
        "inputs": params_to_json(f.inputs()),
    });
    if let (Some(gas), Some(map)) = (f.gas(), obj.as_object_mut()) {
        map.insert("gas".into(), Value::String(gas.to_string()));
    }
    obj
}

fn fallback_to_json(f: &FallbackFragment) -> Value {
    json!({
        "type": f.kind_name(),
        "stateMutability": payable_mutability(f.payable()).to_string(),
    })
}

fn payable_mutability(payable: bool) -> StateMutability {
    if payable {
        StateMutability::Payable
    } else {
        StateMutability::NonPayable
    }
}
