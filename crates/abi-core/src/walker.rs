//! Value walker — shape-checked traversal of a value tree along a `ParamType`
//!
//! A binary coder hands the walker a parameter type and an application
//! value; the walker checks the value's shape against the type and calls a
//! leaf transform once per basic-typed position. The result has the same
//! shape as the type:
//!
//! - arrays must be sequences, of exactly the declared length when fixed
//! - tuples accept a positional sequence or an object keyed by component
//!   name; the result is always positional, in declared order
//! - leaves are replaced by whatever the transform returns
//!
//! `walk_async` lets the transform return a future per leaf. Every future is
//! created up front in depth-first, left-to-right order, all of them are
//! driven together, and each result is written back to its structural slot.
//! The first failure fails the whole walk.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use futures::future::try_join_all;
use num_bigint::BigInt;

use crate::param_type::{ParamKind, ParamType};
use crate::{Error, Result};

// ── Value tree ────────────────────────────────────────────

/// An application value as seen by the walker
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    /// Arbitrary-precision integer
    Integer(BigInt),
    /// Text, including hex-encoded addresses and byte strings
    String(String),
    Array(Vec<Value>),
    /// Ordered map (BTreeMap for deterministic iteration)
    Object(BTreeMap<String, Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Value {
    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
        }
    }

    /// Convert from serde_json::Value
    ///
    /// Non-integral numbers have no ABI meaning and are kept as their text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(BigInt::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Integer(BigInt::from(u))
                } else {
                    Value::String(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to serde_json::Value
    ///
    /// Integers outside the `i64` range become decimal strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => match i64::try_from(i) {
                Ok(small) => serde_json::json!(small),
                Err(_) => serde_json::Value::String(i.to_string()),
            },
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(BigInt::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Integer(BigInt::from(u))
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

// ── Shape checking ────────────────────────────────────────

/// One level of a value matched against one level of a type
enum Expanded<'a> {
    Leaf,
    Children(Vec<(&'a ParamType, &'a Value)>),
}

fn expand<'a>(param: &'a ParamType, value: &'a Value) -> Result<Expanded<'a>> {
    match param.kind() {
        ParamKind::Basic => Ok(Expanded::Leaf),
        ParamKind::Array { length, children } => {
            let Value::Array(items) = value else {
                return Err(Error::value("invalid array value", param.ty(), value));
            };
            if length.is_some_and(|length| length != items.len()) {
                return Err(Error::value("array is wrong length", param.ty(), value));
            }
            Ok(Expanded::Children(
                items.iter().map(|item| (children.as_ref(), item)).collect(),
            ))
        }
        ParamKind::Tuple { components } => match value {
            Value::Array(items) => {
                if items.len() != components.len() {
                    return Err(Error::value("tuple is wrong length", param.ty(), value));
                }
                Ok(Expanded::Children(components.iter().zip(items).collect()))
            }
            Value::Object(map) => components
                .iter()
                .map(|component| {
                    if component.name().is_empty() {
                        return Err(Error::value(
                            "cannot use object value with unnamed components",
                            param.ty(),
                            value,
                        ));
                    }
                    map.get(component.name())
                        .map(|item| (component, item))
                        .ok_or_else(|| {
                            Error::value(
                                format!("missing value for component {}", component.name()),
                                param.ty(),
                                value,
                            )
                        })
                })
                .collect::<Result<Vec<_>>>()
                .map(Expanded::Children),
            _ => Err(Error::value("invalid tuple value", param.ty(), value)),
        },
    }
}

// ── Synchronous walk ──────────────────────────────────────

fn walk_sync<F>(param: &ParamType, value: &Value, leaf: &mut F) -> Result<Value>
where
    F: FnMut(&str, &Value) -> Result<Value>,
{
    match expand(param, value)? {
        Expanded::Leaf => leaf(param.ty(), value),
        Expanded::Children(children) => children
            .into_iter()
            .map(|(child, item)| walk_sync(child, item, leaf))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
    }
}

// ── Asynchronous walk ─────────────────────────────────────

/// Where each leaf result goes once every future has settled
enum Slot {
    Leaf(usize),
    Branch(Vec<Slot>),
}

fn plan<'a>(
    param: &'a ParamType,
    value: &'a Value,
    leaves: &mut Vec<(&'a str, &'a Value)>,
) -> Result<Slot> {
    match expand(param, value)? {
        Expanded::Leaf => {
            leaves.push((param.ty(), value));
            Ok(Slot::Leaf(leaves.len() - 1))
        }
        Expanded::Children(children) => children
            .into_iter()
            .map(|(child, item)| plan(child, item, leaves))
            .collect::<Result<Vec<_>>>()
            .map(Slot::Branch),
    }
}

fn assemble(slot: Slot, results: &mut [Value]) -> Value {
    match slot {
        Slot::Leaf(index) => std::mem::take(&mut results[index]),
        Slot::Branch(slots) => Value::Array(
            slots
                .into_iter()
                .map(|slot| assemble(slot, results))
                .collect(),
        ),
    }
}

impl ParamType {
    /// Check `value` against this type and transform every leaf
    ///
    /// `leaf` receives the canonical basic type (`"uint256"`, `"address"`,
    /// ...) and the leaf value.
    ///
    /// # Errors
    /// Returns `InvalidValue` on a shape mismatch, or the first error `leaf`
    /// returns.
    pub fn walk<F>(&self, value: &Value, mut leaf: F) -> Result<Value>
    where
        F: FnMut(&str, &Value) -> Result<Value>,
    {
        walk_sync(self, value, &mut leaf)
    }

    /// Like `walk`, with a leaf transform returning a future
    ///
    /// The whole shape is checked before `leaf` is first called, so a shape
    /// error anywhere in the tree never starts leaf work. Leaf futures are
    /// created in depth-first order and driven concurrently; completion
    /// order does not affect the result.
    ///
    /// # Errors
    /// Returns `InvalidValue` on a shape mismatch, or the first leaf error
    /// to resolve. Remaining leaf futures are dropped.
    pub async fn walk_async<F, Fut>(&self, value: &Value, mut leaf: F) -> Result<Value>
    where
        F: FnMut(&str, &Value) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let mut leaves = Vec::new();
        let slots = plan(self, value, &mut leaves)?;
        tracing::trace!(leaves = leaves.len(), ty = self.ty(), "walking value");
        let pending: Vec<Fut> = leaves.into_iter().map(|(ty, item)| leaf(ty, item)).collect();
        let mut results = try_join_all(pending).await?;
        Ok(assemble(slots, &mut results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn param(text: &str) -> ParamType {
        ParamType::parse(text, false).unwrap()
    }

    fn ints(values: &[i64]) -> Value {
        Value::from(values.to_vec())
    }

    fn double(_ty: &str, value: &Value) -> Result<Value> {
        match value {
            Value::Integer(i) => Ok(Value::Integer(i * BigInt::from(2))),
            other => Err(Error::value("not an integer", "uint256", other)),
        }
    }

    // ── Arrays ─────────────────────────────────────────

    #[test]
    fn test_walk_fixed_array() {
        let p = param("uint256[2]");
        assert_eq!(p.walk(&ints(&[1, 2]), double).unwrap(), ints(&[2, 4]));
    }

    #[test]
    fn test_walk_fixed_array_wrong_length() {
        let err = param("uint256[2]").walk(&ints(&[1, 2, 3]), double).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert!(err.to_string().contains("array is wrong length"));
    }

    #[test]
    fn test_walk_dynamic_array_any_length() {
        let p = param("uint8[]");
        assert_eq!(p.walk(&ints(&[]), double).unwrap(), ints(&[]));
        assert_eq!(p.walk(&ints(&[1, 2, 3]), double).unwrap(), ints(&[2, 4, 6]));
    }

    #[test]
    fn test_walk_array_requires_sequence() {
        let err = param("uint8[]").walk(&Value::from(7i64), double).unwrap_err();
        assert!(err.to_string().contains("invalid array value"));
    }

    #[test]
    fn test_walk_nested_arrays() {
        let p = param("uint8[2][]");
        let value = Value::from(vec![ints(&[1, 2]), ints(&[3, 4])]);
        let expected = Value::from(vec![ints(&[2, 4]), ints(&[6, 8])]);
        assert_eq!(p.walk(&value, double).unwrap(), expected);
        let ragged = Value::from(vec![ints(&[1, 2]), ints(&[3])]);
        assert!(p.walk(&ragged, double).is_err());
    }

    // ── Tuples ─────────────────────────────────────────

    #[test]
    fn test_walk_tuple_positional() {
        let p = param("tuple(uint256 a, string b)");
        let value = Value::from(vec![Value::from(5i64), Value::from("x")]);
        let seen = p
            .walk(&value, |ty, v| Ok(Value::from(format!("{}:{}", ty, v))))
            .unwrap();
        assert_eq!(
            seen,
            Value::from(vec!["uint256:5".to_string(), "string:\"x\"".to_string()])
        );
    }

    #[test]
    fn test_walk_tuple_keyed_returns_declared_order() {
        let p = param("tuple(uint256 b, uint256 a)");
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::from(1i64));
        map.insert("b".to_string(), Value::from(2i64));
        let result = p.walk(&Value::Object(map), double).unwrap();
        assert_eq!(result, ints(&[4, 2]));
    }

    #[test]
    fn test_walk_tuple_keyed_errors() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::from(1i64));
        let object = Value::Object(map);

        let err = param("tuple(uint256 a, uint256 b)").walk(&object, double).unwrap_err();
        assert!(err.to_string().contains("missing value for component b"));

        let err = param("tuple(uint256 a, uint256)").walk(&object, double).unwrap_err();
        assert!(err.to_string().contains("unnamed components"));
    }

    #[test]
    fn test_walk_tuple_wrong_shape() {
        let p = param("(uint256, bool)");
        assert!(p.walk(&ints(&[1]), double).is_err());
        let err = p.walk(&Value::Null, double).unwrap_err();
        assert!(err.to_string().contains("invalid tuple value"));
    }

    #[test]
    fn test_walk_leaf_error_propagates() {
        let p = param("uint256[]");
        let value = Value::from(vec![Value::from(1i64), Value::from("two")]);
        let err = p.walk(&value, double).unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }

    #[test]
    fn test_walk_leaf_order_is_depth_first() {
        let p = param("tuple(uint8 a, (bool b, string c)[] d, address e)");
        let value = Value::from(vec![
            Value::from(1i64),
            Value::Array(vec![
                Value::from(vec![Value::from(true), Value::from("x")]),
                Value::from(vec![Value::from(false), Value::from("y")]),
            ]),
            Value::from("0xabc"),
        ]);
        let mut order = Vec::new();
        p.walk(&value, |ty, v| {
            order.push(ty.to_string());
            Ok(v.clone())
        })
        .unwrap();
        assert_eq!(order, vec!["uint8", "bool", "string", "bool", "string", "address"]);
    }

    // ── Value conversions ──────────────────────────────

    #[test]
    fn test_value_json_conversion() {
        let json = serde_json::json!({"a": [1, true, "x", null], "b": 18446744073709551615u64});
        let value = Value::from_json(&json);
        assert_eq!(value.type_name(), "Object");
        assert_eq!(value.to_json(), serde_json::json!({
            "a": [1, true, "x", null],
            "b": "18446744073709551615"
        }));
    }

    // ── Asynchronous walk ──────────────────────────────

    #[tokio::test]
    async fn test_walk_async_preserves_positions() {
        let p = param("uint256[3]");
        // later leaves finish first
        let result = p
            .walk_async(&ints(&[1, 2, 3]), |_ty, v| {
                let v = v.clone();
                async move {
                    let delay = match &v {
                        Value::Integer(i) => 30 - 10 * u64::try_from(i).unwrap_or(0),
                        _ => 0,
                    };
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    double("uint256", &v)
                }
            })
            .await
            .unwrap();
        assert_eq!(result, ints(&[2, 4, 6]));
    }

    #[tokio::test]
    async fn test_walk_async_starts_leaves_in_declared_order() {
        let p = param("tuple(uint8 a, (bool, string)[2] b)");
        let value = Value::from(vec![
            Value::from(1i64),
            Value::Array(vec![
                Value::from(vec![Value::from(true), Value::from("x")]),
                Value::from(vec![Value::from(false), Value::from("y")]),
            ]),
        ]);
        let started = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&started);
        let result = p
            .walk_async(&value, move |ty, v| {
                if let Ok(mut log) = log.lock() {
                    log.push(ty.to_string());
                }
                let v = v.clone();
                async move { Ok(v) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(
            *started.lock().unwrap(),
            vec!["uint8", "bool", "string", "bool", "string"]
        );
    }

    #[tokio::test]
    async fn test_walk_async_fails_fast() {
        let p = param("uint256[]");
        let err = p
            .walk_async(&ints(&[1, 2]), |_ty, v| {
                let v = v.clone();
                async move {
                    if v == Value::from(2i64) {
                        return Err(Error::value("rejected", "uint256", &v));
                    }
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(v)
                }
            })
            .await;
        assert!(err.unwrap_err().to_string().contains("rejected"));
    }

    #[tokio::test]
    async fn test_walk_async_shape_error_starts_no_leaves() {
        let p = param("uint256[2]");
        let mut calls = 0;
        let err = p
            .walk_async(&ints(&[1, 2, 3]), |_ty, v| {
                calls += 1;
                let v = v.clone();
                async move { Ok(v) }
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("wrong length"));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_walk_async_nested_shape_error_starts_no_leaves() {
        let p = param("tuple(uint8 a, uint8[2] b)");
        let value = Value::Array(vec![Value::from(1i64), ints(&[1, 2, 3])]);
        let mut calls = 0;
        let err = p
            .walk_async(&value, |_ty, v| {
                calls += 1;
                let v = v.clone();
                async move { Ok(v) }
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("array is wrong length"));
        assert_eq!(calls, 0);
    }
}
