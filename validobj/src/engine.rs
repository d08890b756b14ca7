//! Dispatch of raw input through custom types.
//!
//! This is the point where the parsing engine hands a raw value to a
//! [`CustomType`]:
//!
//! 1. the value is checked against the shape of the custom type's
//!    [`InputType`](crate::InputType) and deserialized into its input type,
//! 2. the converter is called with the prepared value,
//! 3. its output is the parsed result; its failure becomes a [`ParseError`]
//!    carrying the field path and the offending value.
//!
//! [`parse_value`] walks a whole [`TypeExpr`] and performs the same dispatch
//! for every custom type it finds, inside unions and containers included.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use validobj::{engine, ConvertError, FieldPath, Parser};
//!
//! fn to_port(raw: i64) -> Result<u16, ConvertError> {
//!     u16::try_from(raw).map_err(|e| ConvertError::new("port out of range").with_source(e))
//! }
//!
//! let port = Parser::new().typed("to_port", to_port);
//! assert_eq!(engine::parse_input(json!(443), &port).unwrap(), 443);
//!
//! let path = FieldPath::root().key("server").key("port");
//! let err = engine::parse_input_at(json!(70000), &port, &path).unwrap_err();
//! assert_eq!(err.to_string(), "input.server.port: to_port failed: port out of range");
//! ```

use crate::custom::CustomType;
use crate::error::ParseError;
use crate::types::TypeExpr;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// List index
    Index(usize),
}

/// Location of a value inside the raw input, rendered as `input.items[2].price`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The top-level input.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path with an object key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Key(key.into()));
        path
    }

    /// Extend the path with a list index.
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Index(index));
        path
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if this is the top-level input.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("input")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Parse a top-level raw value through a custom type.
pub fn parse_input<C: CustomType>(raw: Value, custom: &C) -> Result<C::Output, ParseError> {
    parse_input_at(raw, custom, &FieldPath::root())
}

/// Parse a raw value found at `path` through a custom type.
pub fn parse_input_at<C: CustomType>(
    raw: Value,
    custom: &C,
    path: &FieldPath,
) -> Result<C::Output, ParseError> {
    dispatch(&raw, custom, path)
}

fn dispatch<C: CustomType>(
    raw: &Value,
    custom: &C,
    path: &FieldPath,
) -> Result<C::Output, ParseError> {
    let expected = custom.input_type().ty();
    trace!(
        path = %path,
        custom_type = %custom.name(),
        input = %expected,
        "Dispatching to custom type"
    );

    if !expected.admits(raw) {
        debug!(path = %path, expected = %expected, found = json_kind(raw), "Input has wrong shape");
        return Err(wrong_input_type(expected, raw, path));
    }

    let input = match C::Input::deserialize(raw) {
        Ok(input) => input,
        Err(source) => {
            debug!(path = %path, expected = %expected, error = %source, "Input could not be read");
            return Err(ParseError::Coercion {
                path: path.clone(),
                expected: expected.clone(),
                value: raw.clone(),
                source,
            });
        }
    };

    custom.convert(input).map_err(|source| {
        debug!(
            path = %path,
            custom_type = %custom.name(),
            error = %source,
            "Custom type rejected input"
        );
        ParseError::Conversion {
            path: path.clone(),
            validator: custom.name().to_string(),
            value: raw.clone(),
            source: Box::new(source),
        }
    })
}

// =============================================================================
// Schema walk
// =============================================================================

type DispatchFn = dyn Fn(&Value, &FieldPath) -> Result<Value, ParseError> + Send + Sync;

/// A custom type's converter with its Rust types erased.
///
/// Stored in [`CustomTypeExpr`](crate::CustomTypeExpr) so that a custom type
/// nested anywhere in a [`TypeExpr`] can be dispatched from the schema alone.
/// The converter's output is handed back as a [`Value`].
#[derive(Clone)]
pub struct ErasedConverter {
    func: Arc<DispatchFn>,
}

impl ErasedConverter {
    /// Erase a custom type.
    pub fn new<C>(custom: C) -> Self
    where
        C: CustomType + Send + Sync + 'static,
        C::Output: Serialize,
    {
        Self {
            func: Arc::new(move |raw: &Value, path: &FieldPath| {
                let output = dispatch(raw, &custom, path)?;
                serde_json::to_value(output).map_err(|source| ParseError::Output {
                    path: path.clone(),
                    validator: custom.name().to_string(),
                    value: raw.clone(),
                    source,
                })
            }),
        }
    }

    /// Dispatch a raw value found at `path`.
    pub fn call(&self, raw: &Value, path: &FieldPath) -> Result<Value, ParseError> {
        (self.func)(raw, path)
    }
}

impl fmt::Debug for ErasedConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedConverter")
    }
}

/// Parse a top-level raw value against a schema.
///
/// Every [`TypeExpr::Custom`] node reached by the walk is dispatched through
/// its converter and replaced by the converter's output. Plain nodes are
/// shape-checked and copied.
///
/// ```rust
/// use serde_json::json;
/// use validobj::{engine, ConvertError, Parser, TypeExpr};
///
/// fn to_cents(raw: f64) -> Result<i64, ConvertError> {
///     Ok((raw * 100.0).round() as i64)
/// }
///
/// let cents = Parser::new().typed("to_cents", to_cents);
/// let schema = TypeExpr::list(TypeExpr::optional(cents.type_expr()));
///
/// let parsed = engine::parse_value(&json!([1.5, null, 2]), &schema).unwrap();
/// assert_eq!(parsed, json!([150, null, 200]));
/// ```
pub fn parse_value(raw: &Value, schema: &TypeExpr) -> Result<Value, ParseError> {
    parse_value_at(raw, schema, &FieldPath::root())
}

/// Parse a raw value found at `path` against a schema.
pub fn parse_value_at(
    raw: &Value,
    schema: &TypeExpr,
    path: &FieldPath,
) -> Result<Value, ParseError> {
    match schema {
        TypeExpr::Custom(custom) => match &custom.converter {
            Some(converter) => converter.call(raw, path),
            None => {
                debug!(path = %path, custom_type = %custom.validator, "No converter attached");
                Err(ParseError::MissingConverter {
                    path: path.clone(),
                    validator: custom.validator.clone(),
                    value: raw.clone(),
                })
            }
        },
        TypeExpr::Optional(_) if raw.is_null() => Ok(Value::Null),
        TypeExpr::Optional(inner) => parse_value_at(raw, inner, path),
        TypeExpr::List(item) => {
            let Some(items) = raw.as_array() else {
                return Err(wrong_input_type(schema, raw, path));
            };
            items
                .iter()
                .enumerate()
                .map(|(i, v)| parse_value_at(v, item, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        TypeExpr::Map(key, value) => {
            let Some(entries) = raw.as_object() else {
                return Err(wrong_input_type(schema, raw, path));
            };
            let mut parsed = Map::with_capacity(entries.len());
            for (k, v) in entries {
                let entry_path = path.key(k.as_str());
                if !key.admits_key(k) {
                    return Err(wrong_input_type(key, &Value::String(k.clone()), &entry_path));
                }
                parsed.insert(k.clone(), parse_value_at(v, value, &entry_path)?);
            }
            Ok(Value::Object(parsed))
        }
        TypeExpr::Union(members) => {
            // First admitting member that parses wins.
            let mut last_error = None;
            for member in members.iter().filter(|m| m.admits(raw)) {
                match parse_value_at(raw, member, path) {
                    Ok(parsed) => return Ok(parsed),
                    Err(err) => last_error = Some(err),
                }
            }
            Err(last_error.unwrap_or_else(|| wrong_input_type(schema, raw, path)))
        }
        plain if plain.admits(raw) => Ok(raw.clone()),
        plain => Err(wrong_input_type(plain, raw, path)),
    }
}

fn wrong_input_type(expected: &TypeExpr, raw: &Value, path: &FieldPath) -> ParseError {
    ParseError::WrongInputType {
        path: path.clone(),
        expected: expected.clone(),
        found: json_kind(raw),
        value: raw.clone(),
    }
}

/// Short name of a raw value's kind, used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "None",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_path_display() {
        assert_eq!(FieldPath::root().to_string(), "input");
        let path = FieldPath::root().key("items").index(2).key("price");
        assert_eq!(path.to_string(), "input.items[2].price");
        assert_eq!(path.segments().len(), 3);
        assert!(!path.is_root());
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!(null)), "None");
        assert_eq!(json_kind(&json!(1)), "int");
        assert_eq!(json_kind(&json!(1.5)), "float");
        assert_eq!(json_kind(&json!({})), "dict");
    }
}
