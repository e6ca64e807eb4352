//! Point-in-time member snapshots
//!
//! Iteration and search must visit every member that was live when the walk
//! started, exactly once, even when a visitor mutates the member set (a
//! visitor may deregister the very id it is handed, or any sibling). The
//! snapshot is the concurrency contract that makes this safe: the id list
//! is captured under the type's state lock, the lock is released, and the
//! walk revalidates each id just before offering it to the visitor.
//!
//! A snapshot never shows members registered after capture, and ids removed
//! after capture are skipped rather than revisited.

use idspace_core::Id;
use smallvec::SmallVec;

/// Immutable capture of a type's live member ids
///
/// Cheap for small types (inline storage for up to 16 ids) and O(members)
/// for large ones. The snapshot holds ids only, never entries: liveness is
/// re-checked against the real table at visit time.
pub struct MemberSnapshot {
    ids: SmallVec<[Id; 16]>,
}

impl MemberSnapshot {
    /// Capture a snapshot from an iterator of live ids
    ///
    /// Callers must hold the owning type's state lock across this call so
    /// the capture is linearizable with respect to mutations.
    pub(crate) fn capture<'a>(ids: impl Iterator<Item = &'a Id>) -> Self {
        Self {
            ids: ids.copied().collect(),
        }
    }

    /// Number of ids captured
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True iff no ids were live at capture time
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The captured ids, in capture order
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }
}

impl<'a> IntoIterator for &'a MemberSnapshot {
    type Item = Id;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Id>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}
