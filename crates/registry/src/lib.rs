//! Identifier registry for idspace
//!
//! This crate implements the two registry components:
//! - [`TypeRegistry`]: the set of known identifier types, their destructor
//!   callbacks, and type-level reference counts
//! - [`HandleTable`]: identifier allocation, per-handle reference counting,
//!   lookup, iteration, search, and bulk clear
//!
//! The registry is a shared in-process resource: operations on the same
//! type are serialized by a per-type lock, callbacks always run with no
//! lock held, and iteration works off a point-in-time snapshot
//! ([`MemberSnapshot`]) so caller-supplied visitors can safely mutate the
//! member set mid-walk.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod handle_table;
pub mod snapshot;
pub mod type_registry;

pub use handle_table::HandleTable;
pub use snapshot::MemberSnapshot;
pub use type_registry::{TypeDescriptor, TypeRegistry};
