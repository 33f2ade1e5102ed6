//! Error types for the ABI front end
//!
//! All fallible operations return `Result<T, Error>`.
//! Every error is raised at the point of detection and is fatal to the
//! call that produced it: nothing partially built is ever returned.

use thiserror::Error;

/// ABI front-end error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Unexpected character or unbalanced bracket while lexing
    #[error("invalid token {token:?} at {offset}: {message}")]
    LexError {
        message: String,
        token: String,
        offset: usize,
    },

    /// Wrong token, duplicate keyword, leftover tokens or premature end of input
    #[error("parse error{}: {message}", at_offset(.offset))]
    ParseError {
        message: String,
        offset: Option<usize>,
    },

    /// A type, name or modifier that violates the ABI grammar
    #[error("{message} ({argument}={value:?})")]
    InvalidArgument {
        message: String,
        argument: String,
        value: String,
    },

    /// A value tree whose shape does not match its type descriptor
    #[error("{message} for {ty} (value={value})")]
    InvalidValue {
        message: String,
        ty: String,
        value: String,
    },

    /// An operation the requested target cannot support
    #[error("unsupported operation {operation}: {message}")]
    UnsupportedOperation { operation: String, message: String },

    /// Malformed JSON text
    #[error("invalid JSON: {0}")]
    JsonError(String),
}

fn at_offset(offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!(" at offset {}", offset),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, offset: Option<usize>) -> Self {
        Error::ParseError {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn argument(
        message: impl Into<String>,
        argument: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            message: message.into(),
            argument: argument.into(),
            value: value.into(),
        }
    }

    pub(crate) fn value(
        message: impl Into<String>,
        ty: impl Into<String>,
        value: impl std::fmt::Display,
    ) -> Self {
        Error::InvalidValue {
            message: message.into(),
            ty: ty.into(),
            value: value.to_string(),
        }
    }

    pub(crate) fn unsupported(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UnsupportedOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err.to_string())
    }
}

/// Result type alias for ABI operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_with_offset() {
        let err = Error::parse("leftover tokens", Some(7));
        assert_eq!(err.to_string(), "parse error at offset 7: leftover tokens");
    }

    #[test]
    fn test_parse_error_display_without_offset() {
        let err = Error::parse("unexpected end of input", None);
        assert_eq!(err.to_string(), "parse error: unexpected end of input");
    }

    #[test]
    fn test_invalid_argument_carries_context() {
        let err = Error::argument("invalid bytes length", "type", "bytes33");
        assert_eq!(err.to_string(), "invalid bytes length (type=\"bytes33\")");
        match err {
            Error::InvalidArgument { argument, value, .. } => {
                assert_eq!(argument, "type");
                assert_eq!(value, "bytes33");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::JsonError(_)));
    }
}
