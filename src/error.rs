//! Crate error type.

use thiserror::Error;

use crate::attr::AttributeId;

/// Errors surfaced synchronously to callers.
///
/// Out-of-domain queries (empty series, X beyond the data range) return
/// `Option`/sentinel values instead; only contract violations error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An attribute was given a value of the wrong kind.
    #[error("attribute {id:?} expects a {expected} value, got {actual}")]
    TypeMismatch {
        /// Attribute that rejected the value.
        id: AttributeId,
        /// Kind declared for the attribute.
        expected: &'static str,
        /// Kind of the rejected value.
        actual: &'static str,
    },
    /// A named series was required but does not exist.
    #[error("series `{0}` does not exist")]
    MissingSeries(String),
}
