//! # idspace
//!
//! In-process identifier registry with typed handles and reference counting.
//!
//! Callers obtain small integer identifiers for opaque objects, partitioned
//! into named types. Each identifier carries an independent reference count;
//! each type carries a destructor callback, a type-level reference count,
//! and the ability to be enumerated, cleared, or destroyed as a group.
//!
//! ## Quick Start
//!
//! ```ignore
//! use idspace::prelude::*;
//! use std::sync::Arc;
//!
//! let space = IdSpace::new();
//!
//! // Register a user type with a destructor callback
//! let ty = space.register_type(0, Some(Arc::new(|_obj| Ok(()))))?;
//!
//! // Register objects under it
//! let id = space.register(ty, Arc::new("payload".to_string()))?;
//! assert!(space.is_valid(id));
//!
//! // Walk the live members
//! space.iterate(ty, |id| {
//!     println!("member: {id}");
//!     Ok(Visit::Continue)
//! })?;
//!
//! // Release and tear down
//! space.dec_ref(id)?;
//! space.close(false)?;
//! ```
//!
//! ## Architecture
//!
//! Two components, built bottom-up in `idspace-registry`:
//!
//! - [`TypeRegistry`] owns the set of known types (builtin and
//!   user-registered), each with a destructor callback and a type-level
//!   reference count.
//! - [`HandleTable`] owns the identifier-to-object mapping. Identifier
//!   values encode their owning type in the high bits, so type recovery is
//!   O(1) without a lookup.
//!
//! [`IdSpace`] is the facade over both, with explicit construction and
//! teardown — never a process singleton.

#![warn(missing_docs)]

mod space;

pub mod prelude;

// Re-export main entry point
pub use space::IdSpace;

// Re-export core types
pub use idspace_core::{
    BuiltinType, Error, FreeFunc, Id, IterationOutcome, Object, Result, TypeId, Visit,
    MAX_SEQ, MAX_TYPES, NTYPES, SEQ_BITS, TYPE_BITS,
};

// Re-export registry components for callers that want narrower capabilities
pub use idspace_registry::{HandleTable, MemberSnapshot, TypeRegistry};
