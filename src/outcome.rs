//! Best-effort results for the RAG boundary
//!
//! Every public RAG operation returns an [`Outcome`] instead of an error.
//! A degraded outcome still carries a usable value (empty list, empty string,
//! zero count) so callers can keep serving their primary request, while the
//! reason stays visible without reading logs.

use std::fmt;

use tracing::warn;

use crate::errors::FinRagError;

/// Why an operation fell back to its default value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedReason {
    /// The embedding model could not be loaded for this process
    EmbeddingUnavailable,
    /// The vector store never initialized or is currently unreachable
    StoreUnavailable,
    /// The dependency was up but this particular call failed
    OperationFailed(String),
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmbeddingUnavailable => write!(f, "embedding model unavailable"),
            Self::StoreUnavailable => write!(f, "vector store unavailable"),
            Self::OperationFailed(msg) => write!(f, "operation failed: {msg}"),
        }
    }
}

impl From<&FinRagError> for DegradedReason {
    fn from(err: &FinRagError) -> Self {
        match err {
            FinRagError::EmbeddingUnavailable => Self::EmbeddingUnavailable,
            FinRagError::StoreUnavailable => Self::StoreUnavailable,
            other => Self::OperationFailed(other.to_string()),
        }
    }
}

/// Result of a best-effort operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Healthy(T),
    Degraded { value: T, reason: DegradedReason },
}

impl<T> Outcome<T> {
    pub const fn healthy(value: T) -> Self {
        Self::Healthy(value)
    }

    pub const fn degraded(value: T, reason: DegradedReason) -> Self {
        Self::Degraded { value, reason }
    }

    /// Convert an internal result, substituting `fallback` on error.
    ///
    /// The error is logged under `operation` so failures stay observable.
    pub fn from_result(result: crate::Result<T>, fallback: T, operation: &str) -> Self {
        match result {
            Ok(value) => Self::Healthy(value),
            Err(err) => {
                warn!("{} degraded: {}", operation, err);
                Self::Degraded {
                    value: fallback,
                    reason: DegradedReason::from(&err),
                }
            }
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub const fn reason(&self) -> Option<&DegradedReason> {
        match self {
            Self::Healthy(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub const fn value(&self) -> &T {
        match self {
            Self::Healthy(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Healthy(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Healthy(value) => Outcome::Healthy(f(value)),
            Self::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Degraded outcome carrying the type's default value
    pub fn fallback(reason: DegradedReason) -> Self {
        Self::Degraded {
            value: T::default(),
            reason,
        }
    }
}
