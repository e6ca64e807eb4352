//! Convenient imports for idspace.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```ignore
//! use idspace::prelude::*;
//!
//! let space = IdSpace::new();
//! let ty = space.register_type(0, None)?;
//! ```

// Main entry point
pub use crate::IdSpace;

// Error handling
pub use crate::{Error, Result};

// Identifier types
pub use crate::{BuiltinType, Id, TypeId};

// Callback and iteration types
pub use crate::{FreeFunc, IterationOutcome, Object, Visit};
