//! Integration tests for the value walker
//!
//! The leaf transforms here stand in for a binary coder: they stringify or
//! scale leaves, sometimes after an artificial delay, and the tests check
//! the shape contract the walker guarantees around them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use abi_core::{Error, Fragment, ParamType, Value};
use num_bigint::BigInt;

// ── Helpers ───────────────────────────────────────────────

fn order_type() -> ParamType {
    ParamType::parse(
        "tuple(address maker, (address token, uint256 amount)[] legs, bytes32 salt)",
        false,
    )
    .unwrap()
}

fn object(entries: Vec<(&str, Value)>) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn order_value() -> Value {
    object(vec![
        ("maker", Value::from("0xaa")),
        (
            "legs",
            Value::Array(vec![
                object(vec![("token", Value::from("0xbb")), ("amount", Value::from(10i64))]),
                Value::Array(vec![Value::from("0xcc"), Value::from(20i64)]),
            ]),
        ),
        ("salt", Value::from("0x01")),
    ])
}

fn tag(ty: &str, value: &Value) -> Value {
    Value::from(format!("{}={}", ty, value))
}

// ── Synchronous ───────────────────────────────────────────

#[test]
fn test_walk_mixed_keyed_and_positional_tuples() {
    let result = order_type().walk(&order_value(), |ty, v| Ok(tag(ty, v))).unwrap();
    assert_eq!(
        result,
        Value::Array(vec![
            Value::from("address=\"0xaa\""),
            Value::Array(vec![
                Value::from(vec!["address=\"0xbb\"", "uint256=10"]),
                Value::from(vec!["address=\"0xcc\"", "uint256=20"]),
            ]),
            Value::from("bytes32=\"0x01\""),
        ])
    );
}

#[test]
fn test_walk_fragment_inputs_as_tuple() {
    let f = Fragment::parse("function transfer(address to, uint256 amount)").unwrap();
    let inputs = ParamType::tuple(f.inputs().to_vec());
    let args = object(vec![("to", Value::from("0xdd")), ("amount", Value::from(5i64))]);
    let result = inputs.walk(&args, |ty, v| Ok(tag(ty, v))).unwrap();
    assert_eq!(result, Value::from(vec!["address=\"0xdd\"", "uint256=5"]));
}

#[test]
fn test_walk_error_names_type_and_value() {
    let p = ParamType::parse("uint8[2]", false).unwrap();
    let err = p.walk(&Value::from(vec![1i64]), |_, v| Ok(v.clone())).unwrap_err();
    match err {
        Error::InvalidValue { message, ty, value } => {
            assert_eq!(message, "array is wrong length");
            assert_eq!(ty, "uint8[2]");
            assert_eq!(value, "[1]");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

// ── Asynchronous ──────────────────────────────────────────

#[tokio::test]
async fn test_walk_async_matches_sync_walk() {
    let sync = order_type().walk(&order_value(), |ty, v| Ok(tag(ty, v))).unwrap();
    let asynchronous = order_type()
        .walk_async(&order_value(), |ty, v| {
            let tagged = tag(ty, v);
            async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Ok(tagged)
            }
        })
        .await
        .unwrap();
    assert_eq!(asynchronous, sync);
}

#[tokio::test]
async fn test_walk_async_runs_leaves_concurrently() {
    let p = ParamType::parse("uint256[8]", false).unwrap();
    let value = Value::from((1..=8).collect::<Vec<i64>>());
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let result = p
        .walk_async(&value, |_ty, v| {
            let v = v.clone();
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                match v {
                    Value::Integer(i) => Ok(Value::Integer(i * BigInt::from(10))),
                    other => Ok(other),
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(result, Value::from((1..=8).map(|i| i * 10).collect::<Vec<i64>>()));
    assert_eq!(peak.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn test_walk_async_first_failure_wins() {
    let p = ParamType::parse("(uint256, uint256, uint256)", false).unwrap();
    let value = Value::from(vec![1i64, 2, 3]);
    let err = p
        .walk_async(&value, |_ty, v| {
            let v = v.clone();
            async move {
                if v == Value::from(3i64) {
                    return Err(Error::InvalidValue {
                        message: "overflow".into(),
                        ty: "uint256".into(),
                        value: v.to_string(),
                    });
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(v)
            }
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("overflow"));
}

#[tokio::test]
async fn test_walk_async_keyed_tuple_missing_component() {
    let calls = AtomicUsize::new(0);
    let err = order_type()
        .walk_async(&object(vec![("maker", Value::from("0xaa"))]), |_ty, v| {
            calls.fetch_add(1, Ordering::SeqCst);
            let v = v.clone();
            async move { Ok(v) }
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing value for component legs"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
