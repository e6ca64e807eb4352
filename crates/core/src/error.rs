//! Error types for the identifier registry
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Propagation policy: the registry never retries; every failure is returned
//! synchronously to the caller. Destructor failures during removal are
//! best-effort surfaced (see [`Error::CallbackFailed`]) but never block the
//! removal itself.

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the identifier registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An identifier or type id does not resolve to anything live
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// An operation was legal for the handle but not in its current state
    /// (e.g. decrementing a zero type refcount, destroying a non-empty type)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Type-level mutation of a builtin (predefined) type
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Identifier or type-id space is saturated
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A destructor or iteration callback reported failure
    ///
    /// Carried as part of the result, never silently dropped: bulk clear
    /// aggregates destructor failures into a single variant after all
    /// removals have been attempted.
    #[error("Callback failed: {0}")]
    CallbackFailed(String),
}

impl Error {
    /// Shorthand for an invalid-handle error naming the offending id
    pub fn invalid_id(id: impl std::fmt::Display) -> Self {
        Error::InvalidHandle(format!("identifier {} is not live", id))
    }

    /// Shorthand for an invalid-handle error naming an unknown type
    pub fn unknown_type(ty: impl std::fmt::Display) -> Self {
        Error::InvalidHandle(format!("{} is not a registered type", ty))
    }
}
