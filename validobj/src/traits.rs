//! Mapping from Rust types to [`TypeExpr`].
//!
//! The [`Describe`] trait lets the typed registration path
//! ([`Parser::typed`](crate::Parser::typed)) read the input and output types
//! of a converter from its generic parameters instead of from annotations.
//!
//! ## Implementations
//!
//! - **Primitives**: `String`, `bool`, `char`, integers, floats, `()`
//! - **Collections**: `Option<T>`, `Vec<T>`, `HashSet<T>`, `BTreeSet<T>`,
//!   `HashMap<K, V>`, `BTreeMap<K, V>`
//! - **Wrappers**: `Box<T>`, `Arc<T>` (transparent)
//! - **Untyped**: `serde_json::Value` maps to `Any`
//! - **Feature-gated**: `BigDecimal` (bigdecimal), `DateTime<Tz>` (chrono),
//!   `Uuid` (uuid)
//!
//! Types that accept several raw shapes, such as an untagged serde enum,
//! implement the trait by hand and return a [`TypeExpr::Union`]:
//!
//! ```rust
//! use serde::Deserialize;
//! use validobj::{Describe, TypeExpr};
//!
//! #[derive(Deserialize)]
//! #[serde(untagged)]
//! enum NumberLike {
//!     Int(i64),
//!     Float(f64),
//!     Str(String),
//! }
//!
//! impl Describe for NumberLike {
//!     fn type_expr() -> TypeExpr {
//!         TypeExpr::union([TypeExpr::Str, TypeExpr::Int, TypeExpr::Float])
//!     }
//! }
//!
//! assert_eq!(NumberLike::type_expr().to_string(), "str | int | float");
//! ```

use crate::types::TypeExpr;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Trait for types that can describe themselves as a [`TypeExpr`].
pub trait Describe {
    /// Returns the type expression for this type.
    fn type_expr() -> TypeExpr;
}

// =============================================================================
// Primitive implementations
// =============================================================================

macro_rules! impl_describe {
    ($expr:expr => $($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_expr() -> TypeExpr {
                    $expr
                }
            }
        )*
    };
}

impl_describe!(TypeExpr::Str => String, char);
impl_describe!(TypeExpr::Bool => bool);
impl_describe!(TypeExpr::Null => ());
impl_describe!(TypeExpr::Int => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_describe!(TypeExpr::Float => f32, f64);
impl_describe!(TypeExpr::Any => serde_json::Value);

// =============================================================================
// Compound implementations
// =============================================================================

impl<T: Describe> Describe for Option<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::optional(T::type_expr())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::list(T::type_expr())
    }
}

impl<T: Describe> Describe for HashSet<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::list(T::type_expr())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::list(T::type_expr())
    }
}

impl<K: Describe, V: Describe> Describe for HashMap<K, V> {
    fn type_expr() -> TypeExpr {
        TypeExpr::map(K::type_expr(), V::type_expr())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn type_expr() -> TypeExpr {
        TypeExpr::map(K::type_expr(), V::type_expr())
    }
}

impl<T: Describe> Describe for Box<T> {
    fn type_expr() -> TypeExpr {
        T::type_expr()
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn type_expr() -> TypeExpr {
        T::type_expr()
    }
}

// =============================================================================
// Feature-gated implementations
// =============================================================================

#[cfg(feature = "bigdecimal")]
impl Describe for bigdecimal::BigDecimal {
    fn type_expr() -> TypeExpr {
        TypeExpr::named("Decimal")
    }
}

#[cfg(feature = "chrono")]
impl<Tz: chrono::TimeZone> Describe for chrono::DateTime<Tz> {
    fn type_expr() -> TypeExpr {
        TypeExpr::named("datetime")
    }
}

#[cfg(feature = "uuid")]
impl Describe for uuid::Uuid {
    fn type_expr() -> TypeExpr {
        TypeExpr::named("UUID")
    }
}
