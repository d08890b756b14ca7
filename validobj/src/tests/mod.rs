//! Test module for validobj
//!
//! This module contains property-based tests using proptest
//! to validate the custom type declaration and dispatch contracts.

#[cfg(test)]
pub mod custom_tests;
