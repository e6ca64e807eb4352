//! Callback and visitor types
//!
//! The registry never takes ownership of the objects it indexes: it holds a
//! shared reference ([`Object`]) and invokes a caller-supplied destructor
//! ([`FreeFunc`]) on last-reference release or bulk clear. Iteration uses a
//! visitor closure returning a tagged variant ([`Visit`]) instead of a
//! sentinel integer.

use crate::error::Result;
use std::any::Any;
use std::sync::Arc;

/// Shared reference to a caller-supplied object
///
/// The registry holds a non-owning association: it clones this `Arc` for
/// lookups and passes it to the type's destructor on removal, but the
/// object's real lifetime is the caller's business.
pub type Object = Arc<dyn Any + Send + Sync>;

/// Destructor callback attached to a type at registration time
///
/// Invoked synchronously, on the thread performing the removal, with no
/// registry lock held (so the callback may re-enter the registry). A
/// returned error is surfaced to the caller where the operation contract
/// allows it (bulk clear) and logged otherwise (quiet close on
/// `dec_ref`-to-zero).
pub type FreeFunc = Arc<dyn Fn(Object) -> Result<()> + Send + Sync>;

/// Visitor verdict for a single iteration step
///
/// A visitor returns `Result<Visit>`: `Ok(Continue)` to keep walking,
/// `Ok(Stop)` to end the walk early without error, or `Err(_)` to abort
/// the walk and propagate the error as the overall iteration status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep visiting remaining members
    Continue,
    /// End the iteration early; not an error
    Stop,
}

/// Overall outcome of a completed (non-erroring) iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Every member in the snapshot was offered to the visitor
    Completed,
    /// The visitor returned [`Visit::Stop`] before the snapshot was exhausted
    Stopped,
}

impl IterationOutcome {
    /// True iff the iteration ran to the end of its snapshot
    pub fn is_complete(&self) -> bool {
        matches!(self, IterationOutcome::Completed)
    }
}
