//! Shared error definitions for flowbridge primitives.

use thiserror::Error;

/// Result alias used throughout the flowbridge workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive descriptor types.
#[derive(Debug, Error)]
pub enum Error {
    /// A variable or field descriptor failed validation.
    #[error("invalid descriptor: {reason}")]
    InvalidDescriptor {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A data class definition collided with an existing registration.
    #[error("data class `{name}` is already registered")]
    DuplicateDataClass {
        /// Qualified name of the offending class.
        name: String,
    },
}

impl Error {
    /// Creates a descriptor validation error from the supplied reason.
    #[must_use]
    pub fn invalid_descriptor(reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            reason: reason.into(),
        }
    }
}
