//! Ready-made custom types.

use crate::custom::{Annotated, Parser};
use crate::error::ConvertError;
use crate::traits::Describe;
use crate::types::TypeExpr;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::str::FromStr;

/// Raw input accepted by [`decimal`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    /// Integer input
    Int(i64),
    /// Integer input above `i64::MAX`
    UInt(u64),
    /// Floating point input, read through its shortest decimal rendering
    Float(f64),
    /// Decimal string such as `"1.10"`
    Str(String),
}

impl Describe for NumberLike {
    fn type_expr() -> TypeExpr {
        TypeExpr::union([TypeExpr::Str, TypeExpr::Int, TypeExpr::Float])
    }
}

/// Convert a number or numeric string to a [`BigDecimal`].
pub fn to_decimal(input: NumberLike) -> Result<BigDecimal, ConvertError> {
    match input {
        NumberLike::Int(i) => Ok(BigDecimal::from(i)),
        NumberLike::UInt(u) => Ok(BigDecimal::from(u)),
        NumberLike::Float(f) => BigDecimal::from_str(&f.to_string())
            .map_err(|e| ConvertError::new("Invalid decimal").with_source(e)),
        NumberLike::Str(s) => BigDecimal::from_str(s.trim())
            .map_err(|e| ConvertError::new("Invalid decimal").with_source(e)),
    }
}

/// The `Decimal` custom type: `str | int | float` in, [`BigDecimal`] out.
///
/// ```rust
/// use serde_json::json;
/// use validobj::{builtin, engine};
///
/// let decimal = builtin::decimal();
/// assert_eq!(decimal.logical_type().to_string(), "Decimal");
/// let value = engine::parse_input(json!("12.50"), &decimal).unwrap();
/// assert_eq!(value.to_string(), "12.50");
/// ```
pub fn decimal() -> Annotated<NumberLike, BigDecimal, ConvertError> {
    Parser::new().typed("to_decimal", to_decimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_inputs() {
        let half = BigDecimal::from_str("0.5").unwrap();
        assert_eq!(to_decimal(NumberLike::Float(0.5)).unwrap(), half);
        assert_eq!(to_decimal(NumberLike::Str(" 0.5 ".to_string())).unwrap(), half);
        assert_eq!(to_decimal(NumberLike::Int(3)).unwrap(), BigDecimal::from(3));
    }

    #[test]
    fn test_large_integers_stay_exact() {
        let decimal = decimal();
        let parsed = crate::engine::parse_input(serde_json::json!(u64::MAX), &decimal).unwrap();
        assert_eq!(parsed, BigDecimal::from_str("18446744073709551615").unwrap());

        let parsed = crate::engine::parse_input(serde_json::json!(i64::MIN), &decimal).unwrap();
        assert_eq!(parsed, BigDecimal::from(i64::MIN));
    }

    #[test]
    fn test_to_decimal_rejects_garbage() {
        let err = to_decimal(NumberLike::Str("abc".to_string())).unwrap_err();
        assert_eq!(err.message(), "Invalid decimal");
    }

    #[test]
    fn test_decimal_declaration() {
        let decimal = decimal();
        assert_eq!(
            decimal.to_string(),
            "Annotated[Decimal, InputType(str | int | float), Validator(to_decimal)]"
        );
    }
}
