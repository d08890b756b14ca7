//! Type expressions accepted wherever a schema expects a type.
//!
//! [`TypeExpr`] is the closed type language of the parser: primitives,
//! containers, unions, opaque named types and custom types. A custom type is
//! carried as [`TypeExpr::Custom`], which holds exactly one [`InputType`] and
//! one validator next to its logical type. Tooling that knows nothing
//! about custom types can call [`TypeExpr::strip_custom`] and see plain types.

use crate::custom::InputType;
use crate::engine::ErasedConverter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TypeExpr {
    // ==========================================================================
    // Primitives
    // ==========================================================================
    /// Unconstrained; admits every value
    Any,

    /// The null value
    Null,

    /// Boolean
    Bool,

    /// Integer (any width)
    Int,

    /// Floating point number; integers are admitted too
    Float,

    /// String
    Str,

    /// Opaque application type referenced by name (e.g. `Decimal`)
    Named(String),

    // ==========================================================================
    // Compound Types
    // ==========================================================================
    /// Value or null
    Optional(Box<TypeExpr>),

    /// Homogeneous list
    List(Box<TypeExpr>),

    /// Mapping with string-encoded keys
    Map(Box<TypeExpr>, Box<TypeExpr>),

    /// Any one of the members (T | U | V)
    Union(Vec<TypeExpr>),

    // ==========================================================================
    // Custom Types
    // ==========================================================================
    /// A type whose parsing is delegated to a user converter
    Custom(CustomTypeExpr),
}

impl TypeExpr {
    /// Create a named type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    /// Create an optional type.
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional(Box::new(inner))
    }

    /// Create a list type.
    pub fn list(item: TypeExpr) -> Self {
        TypeExpr::List(Box::new(item))
    }

    /// Create a map type.
    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map(Box::new(key), Box::new(value))
    }

    /// Create a union type.
    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Union(members.into_iter().collect())
    }

    /// Check if this is the unconstrained type.
    pub fn is_any(&self) -> bool {
        matches!(self, TypeExpr::Any)
    }

    /// Check if this is a custom type.
    pub fn is_custom(&self) -> bool {
        matches!(self, TypeExpr::Custom(_))
    }

    /// Return the custom type metadata when this is a custom type.
    pub fn as_custom(&self) -> Option<&CustomTypeExpr> {
        match self {
            TypeExpr::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    /// Replace every custom type, at any depth, with its logical type.
    pub fn strip_custom(&self) -> TypeExpr {
        match self {
            TypeExpr::Custom(custom) => custom.logical.strip_custom(),
            TypeExpr::Optional(inner) => TypeExpr::optional(inner.strip_custom()),
            TypeExpr::List(item) => TypeExpr::list(item.strip_custom()),
            TypeExpr::Map(key, value) => TypeExpr::map(key.strip_custom(), value.strip_custom()),
            TypeExpr::Union(members) => TypeExpr::union(members.iter().map(TypeExpr::strip_custom)),
            other => other.clone(),
        }
    }

    /// Check whether a raw value has the shape this type expects.
    ///
    /// Named types are opaque here and admit everything; their shape is
    /// checked when the value is deserialized. A custom type admits what its
    /// input type admits.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            TypeExpr::Any | TypeExpr::Named(_) => true,
            TypeExpr::Null => value.is_null(),
            TypeExpr::Bool => value.is_boolean(),
            TypeExpr::Int => value.is_i64() || value.is_u64(),
            TypeExpr::Float => value.is_number(),
            TypeExpr::Str => value.is_string(),
            TypeExpr::Optional(inner) => value.is_null() || inner.admits(value),
            TypeExpr::List(item) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| item.admits(v))),
            TypeExpr::Map(key, val) => value
                .as_object()
                .is_some_and(|map| map.iter().all(|(k, v)| key.admits_key(k) && val.admits(v))),
            TypeExpr::Union(members) => members.iter().any(|m| m.admits(value)),
            TypeExpr::Custom(custom) => custom.input.ty().admits(value),
        }
    }

    /// Check whether an object key, always a string in raw input, can be
    /// read as this type.
    pub(crate) fn admits_key(&self, key: &str) -> bool {
        match self {
            TypeExpr::Any | TypeExpr::Str | TypeExpr::Named(_) => true,
            TypeExpr::Int => key.parse::<i64>().is_ok(),
            TypeExpr::Float => key.parse::<f64>().is_ok(),
            TypeExpr::Bool => key == "true" || key == "false",
            TypeExpr::Union(members) => members.iter().any(|m| m.admits_key(key)),
            TypeExpr::Custom(custom) => custom.input.ty().admits_key(key),
            _ => false,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => f.write_str("Any"),
            TypeExpr::Null => f.write_str("None"),
            TypeExpr::Bool => f.write_str("bool"),
            TypeExpr::Int => f.write_str("int"),
            TypeExpr::Float => f.write_str("float"),
            TypeExpr::Str => f.write_str("str"),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Optional(inner) => write!(f, "Optional[{}]", inner),
            TypeExpr::List(item) => write!(f, "list[{}]", item),
            TypeExpr::Map(key, value) => write!(f, "dict[{}, {}]", key, value),
            TypeExpr::Union(members) if members.is_empty() => f.write_str("Never"),
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            TypeExpr::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

/// Metadata of a custom type as seen from inside a type expression.
///
/// Holds the logical type, the expected input type, the name of the
/// validator and, when built from an [`Annotated`](crate::Annotated), the
/// converter itself. The converter is not serialized; a node read back from
/// serde only describes the custom type. Equality compares the validator by
/// name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTypeExpr {
    /// The type the converter produces
    pub logical: Box<TypeExpr>,
    /// The shape of raw input the converter expects
    pub input: InputType,
    /// Display name of the converter
    pub validator: String,
    /// The converter, with its Rust types erased
    #[serde(skip)]
    pub converter: Option<ErasedConverter>,
}

impl CustomTypeExpr {
    /// Describe a custom type without attaching a converter.
    pub fn new(logical: TypeExpr, input: InputType, validator: impl Into<String>) -> Self {
        Self {
            logical: Box::new(logical),
            input,
            validator: validator.into(),
            converter: None,
        }
    }

    /// Attach the converter the engine calls for this node.
    pub fn with_converter(mut self, converter: ErasedConverter) -> Self {
        self.converter = Some(converter);
        self
    }
}

impl PartialEq for CustomTypeExpr {
    fn eq(&self, other: &Self) -> bool {
        self.logical == other.logical
            && self.input == other.input
            && self.validator == other.validator
    }
}

impl fmt::Display for CustomTypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Annotated[{}, {}, Validator({})]",
            self.logical, self.input, self.validator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number_like() -> TypeExpr {
        TypeExpr::union([TypeExpr::Str, TypeExpr::Int, TypeExpr::Float])
    }

    fn decimal_custom() -> TypeExpr {
        TypeExpr::Custom(CustomTypeExpr::new(
            TypeExpr::named("Decimal"),
            InputType::new(number_like()),
            "to_decimal",
        ))
    }

    #[test]
    fn test_display_primitives() {
        assert_eq!(TypeExpr::Any.to_string(), "Any");
        assert_eq!(TypeExpr::Null.to_string(), "None");
        assert_eq!(TypeExpr::Str.to_string(), "str");
        assert_eq!(TypeExpr::named("Decimal").to_string(), "Decimal");
    }

    #[test]
    fn test_display_compound() {
        assert_eq!(number_like().to_string(), "str | int | float");
        assert_eq!(TypeExpr::list(TypeExpr::Int).to_string(), "list[int]");
        assert_eq!(
            TypeExpr::map(TypeExpr::Str, TypeExpr::optional(TypeExpr::Bool)).to_string(),
            "dict[str, Optional[bool]]"
        );
        assert_eq!(TypeExpr::union([]).to_string(), "Never");
    }

    #[test]
    fn test_display_custom() {
        assert_eq!(
            decimal_custom().to_string(),
            "Annotated[Decimal, InputType(str | int | float), Validator(to_decimal)]"
        );
    }

    #[test]
    fn test_strip_custom_nested() {
        let ty = TypeExpr::list(TypeExpr::union([decimal_custom(), TypeExpr::Null]));
        let stripped = ty.strip_custom();
        assert_eq!(
            stripped,
            TypeExpr::list(TypeExpr::union([TypeExpr::named("Decimal"), TypeExpr::Null]))
        );
        assert!(!stripped.to_string().contains("Annotated"));
    }

    #[test]
    fn test_admits_primitives() {
        assert!(TypeExpr::Int.admits(&json!(3)));
        assert!(!TypeExpr::Int.admits(&json!(3.5)));
        assert!(TypeExpr::Float.admits(&json!(3)));
        assert!(TypeExpr::Str.admits(&json!("x")));
        assert!(!TypeExpr::Bool.admits(&json!("true")));
        assert!(TypeExpr::Any.admits(&json!({"a": [1, 2]})));
    }

    #[test]
    fn test_admits_compound() {
        assert!(TypeExpr::optional(TypeExpr::Int).admits(&json!(null)));
        assert!(TypeExpr::list(TypeExpr::Int).admits(&json!([1, 2, 3])));
        assert!(!TypeExpr::list(TypeExpr::Int).admits(&json!([1, "2"])));
        assert!(TypeExpr::map(TypeExpr::Str, TypeExpr::Int).admits(&json!({"a": 1})));
        assert!(TypeExpr::map(TypeExpr::Int, TypeExpr::Int).admits(&json!({"12": 1})));
        assert!(!TypeExpr::map(TypeExpr::Int, TypeExpr::Int).admits(&json!({"a": 1})));
        assert!(number_like().admits(&json!(0.5)));
        assert!(!number_like().admits(&json!([0.5])));
    }

    #[test]
    fn test_admits_custom_uses_input_type() {
        assert!(decimal_custom().admits(&json!("1.25")));
        assert!(!decimal_custom().admits(&json!(null)));
    }

    #[test]
    fn test_as_custom() {
        assert!(decimal_custom().as_custom().is_some());
        assert!(decimal_custom().is_custom());
        assert!(TypeExpr::Int.as_custom().is_none());
    }

    #[test]
    fn test_custom_nested_in_custom_input() {
        let nested = TypeExpr::Custom(CustomTypeExpr::new(
            TypeExpr::named("Prices"),
            InputType::new(TypeExpr::list(decimal_custom())),
            "to_prices",
        ));
        assert_eq!(
            nested.to_string(),
            "Annotated[Prices, InputType(list[Annotated[Decimal, InputType(str | int | float), Validator(to_decimal)]]), Validator(to_prices)]"
        );
        assert!(nested.admits(&json!(["1.5", 2])));
        assert!(!nested.admits(&json!([null])));
        assert_eq!(nested.strip_custom(), TypeExpr::named("Prices"));
    }

    #[test]
    fn test_custom_serde_drops_converter() {
        let value = serde_json::to_value(decimal_custom()).unwrap();
        assert_eq!(value["type"], json!("Custom"));
        assert!(value["value"].get("converter").is_none());

        let back: TypeExpr = serde_json::from_value(value).unwrap();
        assert_eq!(back, decimal_custom());
        assert!(back.as_custom().unwrap().converter.is_none());
    }

    #[test]
    fn test_serde_tagging() {
        let value = serde_json::to_value(TypeExpr::list(TypeExpr::Str)).unwrap();
        assert_eq!(value, json!({"type": "List", "value": {"type": "Str"}}));
    }
}
