//! Configuration for custom type declarations.
//!
//! [`ParserConfig`] controls how strictly [`Parser`](crate::Parser) reads a
//! converter's [`Signature`](crate::Signature). The defaults accept any
//! signature with at least one parameter and fill in missing annotations
//! with `Any`.
//!
//! The config deserializes from JSON with every field optional, so it can
//! live in an application's config file:
//!
//! ```rust
//! use validobj::ParserConfig;
//!
//! let config: ParserConfig = serde_json::from_str(r#"{"allow_extra_params": false}"#).unwrap();
//! assert!(!config.allow_extra_params);
//! assert!(!config.require_annotations);
//! ```

use serde::{Deserialize, Serialize};

/// Declaration strictness settings.
///
/// # Fields
///
/// * `allow_extra_params` - Accept converters declaring more than one
///   parameter; only the first is read. Default: `true`.
///
/// * `require_annotations` - Reject a signature whose first parameter or
///   return type is unannotated instead of assuming `Any`. Default: `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Accept converters with more than one declared parameter
    pub allow_extra_params: bool,
    /// Reject missing annotations instead of defaulting to `Any`
    pub require_annotations: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            allow_extra_params: true,
            require_annotations: false,
        }
    }
}

impl ParserConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that rejects extra parameters and missing annotations.
    pub fn strict() -> Self {
        Self {
            allow_extra_params: false,
            require_annotations: true,
        }
    }

    /// Set whether extra parameters are accepted.
    pub fn with_allow_extra_params(mut self, allow: bool) -> Self {
        self.allow_extra_params = allow;
        self
    }

    /// Set whether annotations are required.
    pub fn with_require_annotations(mut self, require: bool) -> Self {
        self.require_annotations = require;
        self
    }
}
