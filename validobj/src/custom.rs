//! Custom type declarations.
//!
//! A custom type teaches the parser to build a value of an application type
//! from raw input. It is declared from a plain conversion function and
//! bundles three things:
//!
//! - the **logical type**: what the function returns, used for
//!   documentation and by tooling that does not know about custom types,
//! - an [`InputType`]: the shape of raw input the function expects, used
//!   by the engine to prepare the raw value,
//! - a [`Validator`]: the function itself, invoked by the engine.
//!
//! Declarations go through [`Parser`]. The typed path reads input and output
//! types from the function's generic parameters:
//!
//! ```rust
//! use validobj::{ConvertError, Parser, TypeExpr};
//!
//! fn to_port(raw: i64) -> Result<u16, ConvertError> {
//!     u16::try_from(raw).map_err(|e| ConvertError::new("port out of range").with_source(e))
//! }
//!
//! let port = Parser::new().typed("to_port", to_port);
//! assert_eq!(port.input_type().ty(), &TypeExpr::Int);
//! assert_eq!(port.validator().call(8080).unwrap(), 8080);
//! ```
//!
//! Converters declared at runtime describe themselves with a [`Signature`].
//! Missing annotations default to [`TypeExpr::Any`]:
//!
//! ```rust
//! use std::convert::Infallible;
//! use serde_json::{json, Value};
//! use validobj::{Parser, Signature, TypeExpr};
//!
//! let passthrough = Parser::new()
//!     .build(Signature::new("passthrough").param("x"), |x: Value| Ok::<_, Infallible>(x))
//!     .unwrap();
//!
//! assert!(passthrough.logical_type().is_any());
//! assert_eq!(passthrough.validator().call(json!([1, 2])).unwrap(), json!([1, 2]));
//! ```

use crate::config::ParserConfig;
use crate::engine::ErasedConverter;
use crate::error::{ConvertError, DeclarationError};
use crate::traits::Describe;
use crate::types::{CustomTypeExpr, TypeExpr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// InputType
// =============================================================================

/// The declared type of the raw value a converter expects.
///
/// Stored verbatim; well-formedness is not checked here.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct InputType {
    ty: Box<TypeExpr>,
}

impl InputType {
    /// Wrap a type expression.
    pub fn new(ty: TypeExpr) -> Self {
        Self { ty: Box::new(ty) }
    }

    /// The wrapped type expression.
    pub fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    /// Consume the wrapper and return the type expression.
    pub fn into_inner(self) -> TypeExpr {
        *self.ty
    }
}

impl fmt::Debug for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputType({})", self.ty)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Validator
// =============================================================================

type ConvertFn<I, O, E> = dyn Fn(I) -> Result<O, E> + Send + Sync;

/// A conversion function wrapped for use by the engine.
///
/// Calling the validator is calling the function: the result and any error
/// come back unchanged. The display name and doc string stand in for the
/// function's own name and documentation in listings and error messages.
pub struct Validator<I, O, E = ConvertError> {
    name: String,
    doc: Option<String>,
    func: Arc<ConvertFn<I, O, E>>,
}

impl<I, O, E> Validator<I, O, E> {
    /// Wrap a function under the given display name.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: None,
            func: Arc::new(func),
        }
    }

    /// Set the doc string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Invoke the wrapped function.
    pub fn call(&self, input: I) -> Result<O, E> {
        (self.func)(input)
    }

    /// Display name of the wrapped function.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Doc string of the wrapped function.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Check whether two validators wrap the same function instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl<I, O, E> Clone for Validator<I, O, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            doc: self.doc.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<I, O, E> fmt::Debug for Validator<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.name)
    }
}

impl<I, O, E> fmt::Display for Validator<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Signature
// =============================================================================

/// A single declared parameter of a converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeExpr>,
}

impl Param {
    /// Create an unannotated parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
        }
    }

    /// Create an annotated parameter.
    pub fn typed(name: impl Into<String>, annotation: TypeExpr) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation),
        }
    }
}

/// Declared signature of a converter.
///
/// # Example
///
/// ```rust
/// use validobj::{Signature, TypeExpr};
///
/// let sig = Signature::new("to_decimal")
///     .typed_param("inp", TypeExpr::union([TypeExpr::Str, TypeExpr::Int, TypeExpr::Float]))
///     .returns(TypeExpr::named("Decimal"))
///     .doc("Read a decimal number.");
///
/// assert_eq!(sig.params().len(), 1);
/// assert_eq!(sig.return_annotation(), Some(&TypeExpr::named("Decimal")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    doc: Option<String>,
    #[serde(default)]
    params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    returns: Option<TypeExpr>,
}

impl Signature {
    /// Create a signature with no parameters and no return annotation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
            returns: None,
        }
    }

    /// Append an unannotated parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::new(name));
        self
    }

    /// Append an annotated parameter.
    pub fn typed_param(mut self, name: impl Into<String>, annotation: TypeExpr) -> Self {
        self.params.push(Param::typed(name, annotation));
        self
    }

    /// Set the return annotation.
    pub fn returns(mut self, annotation: TypeExpr) -> Self {
        self.returns = Some(annotation);
        self
    }

    /// Set the doc string.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Converter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters, in order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Declared return type, if any.
    pub fn return_annotation(&self) -> Option<&TypeExpr> {
        self.returns.as_ref()
    }
}

// =============================================================================
// Annotated
// =============================================================================

/// A custom type: logical type plus the metadata the engine dispatches on.
///
/// Produced by [`Parser`]. Use [`Annotated::type_expr`] to place it inside
/// other type expressions (unions, lists, maps).
pub struct Annotated<I, O, E = ConvertError> {
    logical: TypeExpr,
    input_type: InputType,
    validator: Validator<I, O, E>,
}

impl<I, O, E> Annotated<I, O, E> {
    /// The type the converter produces.
    pub fn logical_type(&self) -> &TypeExpr {
        &self.logical
    }

    /// The shape of raw input the converter expects.
    pub fn input_type(&self) -> &InputType {
        &self.input_type
    }

    /// The wrapped converter.
    pub fn validator(&self) -> &Validator<I, O, E> {
        &self.validator
    }

}

impl<I, O, E> Annotated<I, O, E>
where
    I: DeserializeOwned + 'static,
    O: Serialize + 'static,
    E: StdError + Send + Sync + 'static,
{
    /// This custom type as a type expression.
    ///
    /// The node carries the converter, so the engine can dispatch it from
    /// the schema alone wherever it is nested (see
    /// [`engine::parse_value`](crate::engine::parse_value)).
    pub fn type_expr(&self) -> TypeExpr {
        TypeExpr::Custom(
            CustomTypeExpr::new(
                self.logical.clone(),
                self.input_type.clone(),
                self.validator.name(),
            )
            .with_converter(ErasedConverter::new(self.clone())),
        )
    }
}

impl<I, O, E> Clone for Annotated<I, O, E> {
    fn clone(&self) -> Self {
        Self {
            logical: self.logical.clone(),
            input_type: self.input_type.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<I, O, E> fmt::Debug for Annotated<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Annotated[{}, {:?}, {:?}]",
            self.logical, self.input_type, self.validator
        )
    }
}

impl<I, O, E> fmt::Display for Annotated<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// CustomType capability
// =============================================================================

/// Capability of a schema node whose parsing is delegated to a converter.
///
/// The engine reads [`input_type`](CustomType::input_type) to prepare the raw
/// value, deserializes it into [`Input`](CustomType::Input) and hands it to
/// [`convert`](CustomType::convert).
pub trait CustomType {
    /// Value handed to the converter.
    type Input: DeserializeOwned;
    /// Value produced by the converter.
    type Output;
    /// Error raised by the converter.
    type Error: StdError + Send + Sync + 'static;

    /// The type the converter produces.
    fn logical_type(&self) -> &TypeExpr;

    /// The shape of raw input the converter expects.
    fn input_type(&self) -> &InputType;

    /// Display name of the converter, used in error messages.
    fn name(&self) -> &str;

    /// Run the converter.
    fn convert(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}

impl<I, O, E> CustomType for Annotated<I, O, E>
where
    I: DeserializeOwned,
    E: StdError + Send + Sync + 'static,
{
    type Input = I;
    type Output = O;
    type Error = E;

    fn logical_type(&self) -> &TypeExpr {
        &self.logical
    }

    fn input_type(&self) -> &InputType {
        &self.input_type
    }

    fn name(&self) -> &str {
        self.validator.name()
    }

    fn convert(&self, input: I) -> Result<O, E> {
        self.validator.call(input)
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Factory for custom types.
///
/// Stateless apart from its [`ParserConfig`]; every call returns an
/// independent [`Annotated`]. The converter is never called here.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with a custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Declare a custom type from a described signature.
    ///
    /// The first parameter's annotation becomes the input type and the
    /// return annotation becomes the logical type; either defaults to
    /// [`TypeExpr::Any`] when missing.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::MissingParameter`] if the signature has no
    /// parameters. With a non-default [`ParserConfig`], also rejects extra
    /// parameters or missing annotations.
    pub fn build<I, O, E, F>(
        &self,
        signature: Signature,
        func: F,
    ) -> Result<Annotated<I, O, E>, DeclarationError>
    where
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        let (logical, input) = self.resolve(&signature)?;

        let Signature { name, doc, .. } = signature;
        let mut validator = Validator::new(name, func);
        if let Some(doc) = doc {
            validator = validator.with_doc(doc);
        }

        Ok(self.assemble(logical, input, validator))
    }

    /// Declare a custom type whose input and logical types come from `I`
    /// and `O`.
    pub fn typed<I, O, E, F>(&self, name: impl Into<String>, func: F) -> Annotated<I, O, E>
    where
        I: Describe,
        O: Describe,
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        self.assemble(O::type_expr(), I::type_expr(), Validator::new(name, func))
    }

    /// Resolve the logical and input types of a signature.
    fn resolve(&self, signature: &Signature) -> Result<(TypeExpr, TypeExpr), DeclarationError> {
        let name = signature.name();
        let params = signature.params();

        let Some(first) = params.first() else {
            return Err(DeclarationError::MissingParameter {
                name: name.to_string(),
            });
        };

        if params.len() > 1 {
            if !self.config.allow_extra_params {
                return Err(DeclarationError::ExtraParameters {
                    name: name.to_string(),
                    count: params.len(),
                });
            }
            debug!(
                custom_type = %name,
                ignored = params.len() - 1,
                "Only the first parameter is used as input"
            );
        }

        let logical = match signature.return_annotation() {
            Some(ty) => ty.clone(),
            None if self.config.require_annotations => {
                return Err(DeclarationError::MissingReturnType {
                    name: name.to_string(),
                });
            }
            None => TypeExpr::Any,
        };

        let input = match &first.annotation {
            Some(ty) => ty.clone(),
            None if self.config.require_annotations => {
                return Err(DeclarationError::MissingAnnotation {
                    name: name.to_string(),
                    param: first.name.clone(),
                });
            }
            None => TypeExpr::Any,
        };

        Ok((logical, input))
    }

    fn assemble<I, O, E>(
        &self,
        logical: TypeExpr,
        input: TypeExpr,
        validator: Validator<I, O, E>,
    ) -> Annotated<I, O, E> {
        debug!(
            custom_type = %validator.name(),
            logical = %logical,
            input = %input,
            "Declared custom type"
        );
        Annotated {
            logical,
            input_type: InputType::new(input),
            validator,
        }
    }
}

/// Declare a custom type with the default [`Parser`].
///
/// Shorthand for `Parser::new().typed(name, func)`.
pub fn parser<I, O, E, F>(name: impl Into<String>, func: F) -> Annotated<I, O, E>
where
    I: Describe,
    O: Describe,
    F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
{
    Parser::new().typed(name, func)
}
