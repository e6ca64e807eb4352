//! Core types for the idspace identifier registry
//!
//! This crate defines the foundational types used throughout the system:
//! - Id: bit-packed object identifier (type tag + sequence number)
//! - TypeId / BuiltinType: identifier type discriminators
//! - Object / FreeFunc: shared object references and destructor callbacks
//! - Visit / IterationOutcome: tagged-variant visitor results
//! - Error: error type hierarchy
//!
//! It carries no state and does no locking; the registry proper lives in
//! `idspace-registry`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod callback;
pub mod error;
pub mod types;

// Re-export commonly used types at the crate root
pub use callback::{FreeFunc, IterationOutcome, Object, Visit};
pub use error::{Error, Result};
pub use types::{
    BuiltinType, Id, TypeId, MAX_SEQ, MAX_TYPES, NTYPES, SEQ_BITS, TYPE_BITS,
};
