//! # validobj
//!
//! Custom types for a type-directed parser of untyped input.
//!
//! Input produced by deserializing JSON, YAML or config files arrives as a
//! [`serde_json::Value`]. A parser walks a declared [`TypeExpr`] and turns the
//! raw value into typed data. This crate defines how an application teaches
//! that parser about its own types: a plain conversion function is declared
//! as a custom type with [`Parser`], and the result can be used anywhere a
//! type is accepted, including inside unions and containers.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_json::json;
//! use validobj::{engine, ConvertError, Describe, Parser, TypeExpr};
//!
//! #[derive(Deserialize)]
//! #[serde(untagged)]
//! enum Seconds {
//!     Int(u64),
//!     Str(String),
//! }
//!
//! impl Describe for Seconds {
//!     fn type_expr() -> TypeExpr {
//!         TypeExpr::union([TypeExpr::Int, TypeExpr::Str])
//!     }
//! }
//!
//! fn to_duration(raw: Seconds) -> Result<std::time::Duration, ConvertError> {
//!     let secs = match raw {
//!         Seconds::Int(n) => n,
//!         Seconds::Str(s) => s
//!             .strip_suffix('s')
//!             .and_then(|n| n.parse().ok())
//!             .ok_or_else(|| ConvertError::new(format!("not a duration: {s}")))?,
//!     };
//!     Ok(std::time::Duration::from_secs(secs))
//! }
//!
//! // `Duration` has no `Describe` impl, so the signature is spelled out.
//! let timeout = Parser::new()
//!     .build(
//!         validobj::Signature::new("to_duration")
//!             .typed_param("raw", Seconds::type_expr())
//!             .returns(TypeExpr::named("Duration")),
//!         to_duration,
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     timeout.to_string(),
//!     "Annotated[Duration, InputType(int | str), Validator(to_duration)]"
//! );
//! assert_eq!(engine::parse_input(json!("30s"), &timeout).unwrap().as_secs(), 30);
//! assert!(engine::parse_input(json!("soon"), &timeout).is_err());
//! ```
//!
//! ## Features
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `bigdecimal` | `Describe` for `BigDecimal` and [`builtin::decimal`] | ✅ |
//! | `chrono` | `Describe` for `chrono::DateTime` | ❌ |
//! | `uuid` | `Describe` for `uuid::Uuid` | ❌ |
//!
//! ## Modules
//!
//! - [`types`] - the [`TypeExpr`] type language
//! - [`traits`] - [`Describe`], mapping Rust types to type expressions
//! - [`custom`] - [`InputType`], [`Validator`], [`Annotated`] and [`Parser`]
//! - [`engine`] - dispatch of raw values through a [`CustomType`] or a schema
//! - [`config`] - [`ParserConfig`]
//! - [`error`] - error types

pub mod config;
pub mod custom;
pub mod engine;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(feature = "bigdecimal")]
pub mod builtin;

#[cfg(test)]
mod tests;

pub use config::ParserConfig;
pub use custom::{Annotated, CustomType, InputType, Param, Parser, Signature, Validator, parser};
pub use engine::{ErasedConverter, FieldPath, PathSegment};
pub use error::{BoxError, ConvertError, DeclarationError, ErrorCode, ParseError};
pub use traits::Describe;
pub use types::{CustomTypeExpr, TypeExpr};
