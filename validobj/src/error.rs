//! Error types for custom type declaration and dispatch.
//!
//! Failures fall into two groups:
//!
//! - [`DeclarationError`]: raised by [`Parser`](crate::Parser) when a
//!   converter cannot serve as a custom type. Fatal to the declaration.
//! - [`ParseError`]: raised at the engine's dispatch point when a raw value
//!   has the wrong shape, cannot be read as the input type, or is rejected by
//!   the converter. The converter's own error is kept as the source.
//!
//! Converters are free to fail with any error type. [`ConvertError`] is a
//! ready-made one.

use crate::engine::FieldPath;
use crate::types::TypeExpr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error type used for converter failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error codes for custom type failures.
///
/// When serialized, codes are converted to SCREAMING_SNAKE_CASE strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    /// The converter declaration is unusable
    InvalidArgument,
    /// The raw value does not have the expected input shape
    WrongInputType,
    /// The raw value could not be read as the input type
    CoercionFailed,
    /// The converter rejected the value
    ConversionFailed,
    /// A custom type node has no converter to dispatch to
    MissingConverter,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::WrongInputType => "WRONG_INPUT_TYPE",
            Self::CoercionFailed => "COERCION_FAILED",
            Self::ConversionFailed => "CONVERSION_FAILED",
            Self::MissingConverter => "MISSING_CONVERTER",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised while declaring a custom type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DeclarationError {
    /// The converter takes no parameter to convert from.
    #[error("custom type `{name}` expects at least one parameter")]
    MissingParameter { name: String },

    /// The converter takes more than one parameter and extras are disallowed.
    #[error("custom type `{name}` takes {count} parameters, expected exactly one")]
    ExtraParameters { name: String, count: usize },

    /// A parameter has no annotation and annotations are required.
    #[error("parameter `{param}` of custom type `{name}` has no type annotation")]
    MissingAnnotation { name: String, param: String },

    /// The converter has no return annotation and annotations are required.
    #[error("custom type `{name}` has no return type annotation")]
    MissingReturnType { name: String },
}

impl DeclarationError {
    /// Returns the error code. Every declaration error is an invalid argument.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }

    /// Name of the converter that failed to declare.
    pub fn name(&self) -> &str {
        match self {
            Self::MissingParameter { name }
            | Self::ExtraParameters { name, .. }
            | Self::MissingAnnotation { name, .. }
            | Self::MissingReturnType { name } => name,
        }
    }
}

/// General purpose error for converters.
///
/// # Example
/// ```rust
/// use validobj::ConvertError;
///
/// fn to_port(raw: i64) -> Result<u16, ConvertError> {
///     u16::try_from(raw).map_err(|e| ConvertError::new("port out of range").with_source(e))
/// }
///
/// assert!(to_port(80).is_ok());
/// assert_eq!(to_port(-1).unwrap_err().to_string(), "port out of range");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConvertError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ConvertError {
    /// Create a new error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error raised when the engine parses a raw value through a custom type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The raw value does not have the shape of the input type.
    #[error("{path}: expected {expected}, got {found}")]
    WrongInputType {
        path: FieldPath,
        expected: TypeExpr,
        found: &'static str,
        value: Value,
    },

    /// The raw value has the right shape but could not be read as the input type.
    #[error("{path}: cannot read value as {expected}: {source}")]
    Coercion {
        path: FieldPath,
        expected: TypeExpr,
        value: Value,
        #[source]
        source: serde_json::Error,
    },

    /// The converter failed.
    #[error("{path}: {validator} failed: {source}")]
    Conversion {
        path: FieldPath,
        validator: String,
        value: Value,
        #[source]
        source: BoxError,
    },

    /// The converter succeeded but its output could not be represented as a
    /// raw value during a schema walk.
    #[error("{path}: output of {validator} is not representable: {source}")]
    Output {
        path: FieldPath,
        validator: String,
        value: Value,
        #[source]
        source: serde_json::Error,
    },

    /// A schema walk reached a custom type read back without its converter.
    #[error("{path}: no converter attached to {validator}")]
    MissingConverter {
        path: FieldPath,
        validator: String,
        value: Value,
    },
}

impl ParseError {
    /// Returns the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::WrongInputType { .. } => ErrorCode::WrongInputType,
            Self::Coercion { .. } => ErrorCode::CoercionFailed,
            Self::Conversion { .. } | Self::Output { .. } => ErrorCode::ConversionFailed,
            Self::MissingConverter { .. } => ErrorCode::MissingConverter,
        }
    }

    /// Location of the failing value.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::WrongInputType { path, .. }
            | Self::Coercion { path, .. }
            | Self::Conversion { path, .. }
            | Self::Output { path, .. }
            | Self::MissingConverter { path, .. } => path,
        }
    }

    /// The raw value that failed to parse.
    pub fn value(&self) -> &Value {
        match self {
            Self::WrongInputType { value, .. }
            | Self::Coercion { value, .. }
            | Self::Conversion { value, .. }
            | Self::Output { value, .. }
            | Self::MissingConverter { value, .. } => value,
        }
    }

    /// The converter's own error, when the converter was the one that failed.
    pub fn conversion_source(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Conversion { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
