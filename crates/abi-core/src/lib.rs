//! ABI Core - front end for smart-contract ABI descriptions
//!
//! Parses human-readable signatures and JSON ABI objects into immutable,
//! validated parameter types and fragments, and renders them back out in
//! four grammars.
//!
//! # Architecture
//!
//! ```text
//! signature text → Tokenizer → TokenString → ParamType / Fragment ← JSON ABI
//!                                                  ↓
//!                                     Formatter (sighash | minimal | full | json)
//!                                                  ↓
//!                                     Walker → external binary coder
//! ```
//!
//! # Guarantees
//!
//! - **Canonical**: every `ParamType` carries canonical type text (`uint` is `uint256`)
//! - **Validated**: no public path builds an invalid type or fragment
//! - **Immutable**: parsed values are never mutated and are freely shared
//! - **Deterministic**: same input always produces identical output
//!
//! # Example
//!
//! ```
//! use abi_core::{FormatType, Fragment};
//!
//! let f = Fragment::parse("function transfer(address to, uint amount) returns (bool)").unwrap();
//! assert_eq!(f.format(FormatType::Sighash).unwrap(), "transfer(address,uint256)");
//! ```

pub mod abi;
pub mod error;
pub mod formatter;
pub mod fragment;
pub mod param_type;
pub mod parser;
pub mod walker;

pub use abi::Abi;
pub use error::{Error, Result};
pub use formatter::FormatType;
pub use fragment::{
    ConstructorFragment, ErrorFragment, EventFragment, FallbackFragment, Fragment, FragmentKind,
    FunctionFragment, IntoFragment, JsonFragment, StateMutability, StructFragment,
};
pub use param_type::{IntoParamType, JsonParamType, ParamKind, ParamType};
pub use parser::{lex, Token, TokenKind, TokenString};
pub use walker::Value;
