//! Property-based tests for custom type declarations
//!
//! These tests validate the correctness properties of the declaration path:
//! - Property 1: Declared types are carried through unchanged
//! - Property 2: Missing annotations default to Any
//! - Property 3: Validators forward calls transparently
//! - Property 4: Nullary converters are rejected
//! - Property 5: Repeated declarations are independent

use crate::{ConvertError, DeclarationError, ErrorCode, Parser, ParserConfig, Signature, TypeExpr};
use proptest::prelude::*;
use std::convert::Infallible;

fn arb_type_expr() -> impl Strategy<Value = TypeExpr> {
    let leaf = prop_oneof![
        Just(TypeExpr::Any),
        Just(TypeExpr::Null),
        Just(TypeExpr::Bool),
        Just(TypeExpr::Int),
        Just(TypeExpr::Float),
        Just(TypeExpr::Str),
        "[A-Z][a-zA-Z]{0,8}".prop_map(TypeExpr::named),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeExpr::optional),
            inner.clone().prop_map(TypeExpr::list),
            inner.clone().prop_map(|v| TypeExpr::map(TypeExpr::Str, v)),
            prop::collection::vec(inner, 1..4).prop_map(TypeExpr::union),
        ]
    })
}

fn checked_half(x: i64) -> Result<i64, ConvertError> {
    if x % 2 == 0 {
        Ok(x / 2)
    } else {
        Err(ConvertError::new(format!("{} is odd", x)))
    }
}

// =============================================================================
// Property 1: Declared types are carried through unchanged
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The logical type is the return annotation and the input type is the
    /// first parameter's annotation.
    #[test]
    fn prop_annotations_carried_through(
        input in arb_type_expr(),
        output in arb_type_expr(),
        name in "[a-z_]{1,12}",
    ) {
        let sig = Signature::new(name.clone())
            .typed_param("raw", input.clone())
            .returns(output.clone());
        let ty = Parser::new().build(sig, |x: i64| Ok::<_, Infallible>(x)).unwrap();

        prop_assert_eq!(ty.logical_type(), &output);
        prop_assert_eq!(ty.input_type().ty(), &input);
        prop_assert_eq!(ty.validator().name(), name.as_str());

        let expr = ty.type_expr();
        let custom = expr.as_custom().unwrap();
        prop_assert_eq!(custom.logical.as_ref(), &output);
        prop_assert_eq!(custom.input.ty(), &input);
        prop_assert_eq!(expr.strip_custom(), output.strip_custom());
    }

    /// Only the first parameter is read when extra parameters are declared.
    #[test]
    fn prop_extra_params_ignored(
        first in arb_type_expr(),
        extras in prop::collection::vec(arb_type_expr(), 1..4),
    ) {
        let mut sig = Signature::new("multi").typed_param("raw", first.clone());
        for (i, extra) in extras.into_iter().enumerate() {
            sig = sig.typed_param(format!("extra{}", i), extra);
        }
        let ty = Parser::new().build(sig, |x: i64| Ok::<_, Infallible>(x)).unwrap();
        prop_assert_eq!(ty.input_type().ty(), &first);
    }
}

// =============================================================================
// Property 2: Missing annotations default to Any
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_missing_param_annotation_is_any(output in arb_type_expr()) {
        let sig = Signature::new("f").param("x").returns(output.clone());
        let ty = Parser::new().build(sig, |x: i64| Ok::<_, Infallible>(x)).unwrap();
        prop_assert!(ty.input_type().ty().is_any());
        prop_assert_eq!(ty.logical_type(), &output);
    }

    #[test]
    fn prop_missing_return_annotation_is_any(input in arb_type_expr()) {
        let sig = Signature::new("f").typed_param("x", input.clone());
        let ty = Parser::new().build(sig, |x: i64| Ok::<_, Infallible>(x)).unwrap();
        prop_assert!(ty.logical_type().is_any());
        prop_assert_eq!(ty.input_type().ty(), &input);
    }
}

// =============================================================================
// Property 3: Validators forward calls transparently
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_validator_matches_function(x in any::<i64>()) {
        let ty = Parser::new().typed("checked_half", checked_half);
        match (ty.validator().call(x), checked_half(x)) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.message(), b.message()),
            (a, b) => prop_assert!(false, "validator returned {:?}, function returned {:?}", a, b),
        }
    }

    #[test]
    fn prop_passthrough_returns_input(s in ".*", n in any::<i64>()) {
        let ty = Parser::new()
            .build(Signature::new("passthrough").param("x"), |x: serde_json::Value| {
                Ok::<_, Infallible>(x)
            })
            .unwrap();
        let value = serde_json::json!({"s": s, "n": n});
        prop_assert_eq!(ty.validator().call(value.clone()).unwrap(), value);
    }
}

// =============================================================================
// Property 4: Nullary converters are rejected
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_nullary_rejected(name in "[a-z_]{1,12}", ret in arb_type_expr()) {
        let sig = Signature::new(name.clone()).returns(ret);
        let err = Parser::new().build(sig, |_: ()| Ok::<_, Infallible>(1)).unwrap_err();
        prop_assert_eq!(err.code(), ErrorCode::InvalidArgument);
        prop_assert_eq!(err, DeclarationError::MissingParameter { name });
    }
}

// =============================================================================
// Property 5: Repeated declarations are independent
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_repeated_declarations_independent(x in any::<i64>()) {
        let parser = Parser::new();
        let a = parser.typed("checked_half", checked_half);
        let b = parser.typed("checked_half", checked_half);

        prop_assert!(!a.validator().ptr_eq(b.validator()));
        prop_assert_eq!(a.to_string(), b.to_string());
        prop_assert_eq!(
            a.validator().call(x).map_err(|e| e.to_string()),
            b.validator().call(x).map_err(|e| e.to_string())
        );
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_strict_config_rejects_extra_params() {
    let sig = Signature::new("scaled")
        .typed_param("x", TypeExpr::Float)
        .typed_param("factor", TypeExpr::Float)
        .returns(TypeExpr::Float);
    let parser = Parser::with_config(ParserConfig::new().with_allow_extra_params(false));
    let err = parser
        .build(sig, |x: f64| Ok::<_, Infallible>(x))
        .unwrap_err();
    assert_eq!(
        err,
        DeclarationError::ExtraParameters {
            name: "scaled".to_string(),
            count: 2
        }
    );
}

#[test]
fn test_strict_config_rejects_missing_annotations() {
    let parser = Parser::with_config(ParserConfig::strict());

    let err = parser
        .build(
            Signature::new("f").param("x").returns(TypeExpr::Int),
            |x: i64| Ok::<_, Infallible>(x),
        )
        .unwrap_err();
    assert_eq!(
        err,
        DeclarationError::MissingAnnotation {
            name: "f".to_string(),
            param: "x".to_string()
        }
    );

    let err = parser
        .build(
            Signature::new("g").typed_param("x", TypeExpr::Int),
            |x: i64| Ok::<_, Infallible>(x),
        )
        .unwrap_err();
    assert_eq!(err, DeclarationError::MissingReturnType { name: "g".to_string() });
}

#[test]
fn test_nullary_rejected_even_when_lenient() {
    let parser = Parser::with_config(ParserConfig::new().with_allow_extra_params(true));
    let result = parser.build(Signature::new("bad"), |_: ()| Ok::<_, Infallible>(()));
    assert!(matches!(result, Err(DeclarationError::MissingParameter { .. })));
}

#[test]
fn test_converter_not_called_at_declaration() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let ty = Parser::new().typed("count", move |x: i64| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, Infallible>(x)
    });
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    ty.validator().call(1).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
