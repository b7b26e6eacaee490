//! Unified error types for the domain layer
//!
//! The calculator itself never fails; these errors come from parsing rule keys
//! and from edits that address something that does not exist.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (unknown rule key, malformed value)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Edit addressed a sublimation row that does not exist
    #[error("No sublimation at index {index} (document has {len})")]
    SublimationIndex { index: usize, len: usize },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant:
    ///
    /// ```ignore
    /// "strength".parse::<Characteristic>()
    ///     // Err(DomainError::Parse("Unknown characteristic: strength"))
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a sublimation index error
    pub fn sublimation_index(index: usize, len: usize) -> Self {
        Self::SublimationIndex { index, len }
    }
}
