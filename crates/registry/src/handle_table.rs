//! Handle Table: identifier allocation, refcounting, lookup, and bulk ops
//!
//! The handle table owns the mapping from identifier to (type, object,
//! refcount). It consults the [`TypeRegistry`] for type existence and
//! destructor metadata; everything member-level flows through here.
//!
//! ## Callback discipline
//!
//! Destructors and visitors are caller-supplied and may re-enter the
//! registry (a visitor commonly deregisters the id it was handed). Every
//! path in this module therefore drops the owning type's state lock before
//! invoking a callback. Iteration and search additionally work off a
//! [`MemberSnapshot`] captured under the lock, so a mutating visitor can
//! never invalidate the walk.

use crate::snapshot::MemberSnapshot;
use crate::type_registry::{HandleEntry, TypeDescriptor, TypeRegistry};
use idspace_core::{Error, Id, IterationOutcome, Object, Result, TypeId, Visit};
use std::sync::Arc;
use tracing::warn;

/// The identifier table
///
/// Allocates identifiers (type tag bits + monotonic per-type sequence),
/// tracks per-handle reference counts, and implements iteration, search,
/// and bulk clear. All operations are safe to call from parallel threads;
/// mutual exclusion is at the granularity of a single type's member set.
pub struct HandleTable {
    registry: TypeRegistry,
}

impl HandleTable {
    /// Create a handle table over a freshly seeded type registry
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
        }
    }

    /// The type registry backing this table
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // ========== Registration and Lookup ==========

    /// Register an object under a type, returning a fresh identifier
    ///
    /// The new handle starts with `member_refcount = 1`. Identifier values
    /// combine the type's tag bits with a monotonic sequence number,
    /// skipping any value currently in use; O(1) amortized.
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist; `ResourceExhausted` if
    /// the type's sequence space is saturated.
    pub fn register(&self, ty: TypeId, object: Object) -> Result<Id> {
        let desc = self.registry.descriptor(ty)?;
        let mut state = desc.state();
        let mut seq = state.next_seq;
        let id = loop {
            let candidate = Id::encode(ty, seq).ok_or_else(|| {
                Error::ResourceExhausted(format!("identifier space for {} saturated", ty))
            })?;
            if !state.members.contains_key(&candidate) {
                break candidate;
            }
            seq += 1;
        };
        state.next_seq = seq + 1;
        state.members.insert(
            id,
            HandleEntry {
                object,
                refcount: 1,
            },
        );
        Ok(id)
    }

    /// True iff the identifier resolves to a live handle; never errors
    pub fn is_valid(&self, id: Id) -> bool {
        if !id.is_plausible() {
            return false;
        }
        match self.registry.descriptor(id.type_of()) {
            Ok(desc) => desc.state().members.contains_key(&id),
            Err(_) => false,
        }
    }

    /// The type of a live identifier
    ///
    /// Decodes the tag from the identifier bits (no table scan) but still
    /// verifies the id is registered before trusting the decoded type. For
    /// the pure, unvalidated decode use [`Id::type_of`].
    ///
    /// # Errors
    /// `InvalidHandle` if the id is not live.
    pub fn type_of(&self, id: Id) -> Result<TypeId> {
        let desc = self.live_descriptor(id)?;
        let state = desc.state();
        if state.members.contains_key(&id) {
            Ok(id.type_of())
        } else {
            Err(Error::invalid_id(id))
        }
    }

    /// The object associated with a live identifier; refcount unchanged
    ///
    /// # Errors
    /// `InvalidHandle` if the id is not live.
    pub fn object_of(&self, id: Id) -> Result<Object> {
        let desc = self.live_descriptor(id)?;
        let state = desc.state();
        state
            .members
            .get(&id)
            .map(|entry| Arc::clone(&entry.object))
            .ok_or_else(|| Error::invalid_id(id))
    }

    /// Type-checked object lookup
    ///
    /// # Errors
    /// `InvalidHandle` if the id is not live or is not a member of `ty`.
    pub fn object_verify(&self, id: Id, ty: TypeId) -> Result<Object> {
        if id.type_of() != ty {
            return Err(Error::InvalidHandle(format!(
                "identifier {} is not of type {}",
                id, ty
            )));
        }
        self.object_of(id)
    }

    /// Remove a handle without invoking its type's destructor
    ///
    /// Returns the object so the caller can dispose of it directly. The
    /// handle is gone regardless of its current refcount.
    ///
    /// # Errors
    /// `InvalidHandle` if the id is not live.
    pub fn remove(&self, id: Id) -> Result<Object> {
        let desc = self.live_descriptor(id)?;
        let mut state = desc.state();
        state
            .members
            .remove(&id)
            .map(|entry| entry.object)
            .ok_or_else(|| Error::invalid_id(id))
    }

    // ========== Reference Counting ==========

    /// Increment a handle's reference count, returning the new count
    ///
    /// # Errors
    /// `InvalidHandle` if the id is not live.
    pub fn inc_ref(&self, id: Id) -> Result<u32> {
        let desc = self.live_descriptor(id)?;
        let mut state = desc.state();
        let entry = state
            .members
            .get_mut(&id)
            .ok_or_else(|| Error::invalid_id(id))?;
        entry.refcount = entry.refcount.checked_add(1).ok_or_else(|| {
            Error::ResourceExhausted(format!("refcount overflow for {}", id))
        })?;
        Ok(entry.refcount)
    }

    /// Decrement a handle's reference count, returning the new count
    ///
    /// Reaching 0 removes the entry and invokes the owning type's
    /// destructor with the object. A destructor failure is logged and
    /// otherwise ignored (the quiet-close convention): the table never
    /// retains a dangling entry because a destructor misbehaved.
    ///
    /// # Errors
    /// `InvalidHandle` if the id is not live.
    pub fn dec_ref(&self, id: Id) -> Result<u32> {
        let desc = self.live_descriptor(id)?;
        let mut state = desc.state();
        let entry = state
            .members
            .get_mut(&id)
            .ok_or_else(|| Error::invalid_id(id))?;
        if entry.refcount > 1 {
            entry.refcount -= 1;
            return Ok(entry.refcount);
        }
        // Last reference: remove, then destroy outside the lock
        let entry = state
            .members
            .remove(&id)
            .ok_or_else(|| Error::invalid_id(id))?;
        let free = desc.free().cloned();
        drop(state);
        if let Some(free) = free {
            if let Err(err) = free(entry.object) {
                warn!(%id, error = %err, "destructor failed on last-reference release");
            }
        }
        Ok(0)
    }

    /// Current reference count of a live handle
    ///
    /// # Errors
    /// `InvalidHandle` if the id is not live.
    pub fn ref_count(&self, id: Id) -> Result<u32> {
        let desc = self.live_descriptor(id)?;
        let state = desc.state();
        state
            .members
            .get(&id)
            .map(|entry| entry.refcount)
            .ok_or_else(|| Error::invalid_id(id))
    }

    // ========== Enumeration ==========

    /// Number of live members under a type
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist.
    pub fn nmembers(&self, ty: TypeId) -> Result<u64> {
        let desc = self.registry.descriptor(ty)?;
        let state = desc.state();
        Ok(state.members.len() as u64)
    }

    /// Visit every currently-live member of a type exactly once
    ///
    /// The member list is snapshotted before the first visitor call, so a
    /// visitor that mutates the member set (including deregistering the id
    /// it was handed) can neither be revisited nor skip an unrelated live
    /// sibling. Ids removed between capture and visit are silently skipped.
    ///
    /// The visitor's verdict controls the walk: `Ok(Visit::Continue)`
    /// proceeds, `Ok(Visit::Stop)` ends early with
    /// [`IterationOutcome::Stopped`], and `Err(_)` aborts the walk with the
    /// visitor's error as the overall status.
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist; otherwise whatever the
    /// visitor returns.
    pub fn iterate<F>(&self, ty: TypeId, mut visitor: F) -> Result<IterationOutcome>
    where
        F: FnMut(Id) -> Result<Visit>,
    {
        let desc = self.registry.descriptor(ty)?;
        let snapshot = {
            let state = desc.state();
            MemberSnapshot::capture(state.members.keys())
        };
        for id in &snapshot {
            // Revalidate: the visitor (or a concurrent clear) may have
            // removed this id since capture.
            if !desc.state().members.contains_key(&id) {
                continue;
            }
            match visitor(id)? {
                Visit::Continue => {}
                Visit::Stop => return Ok(IterationOutcome::Stopped),
            }
        }
        Ok(IterationOutcome::Completed)
    }

    /// First member of a type matching a predicate, with its object
    ///
    /// Walks a point-in-time snapshot like [`HandleTable::iterate`]; the
    /// predicate is invoked with no lock held.
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist.
    pub fn search<P>(&self, ty: TypeId, mut predicate: P) -> Result<Option<(Id, Object)>>
    where
        P: FnMut(Id, &Object) -> bool,
    {
        let desc = self.registry.descriptor(ty)?;
        let snapshot = {
            let state = desc.state();
            MemberSnapshot::capture(state.members.keys())
        };
        for id in &snapshot {
            let object = {
                let state = desc.state();
                state.members.get(&id).map(|entry| Arc::clone(&entry.object))
            };
            let Some(object) = object else { continue };
            if predicate(id, &object) {
                return Ok(Some((id, object)));
            }
        }
        Ok(None)
    }

    // ========== Bulk Removal ==========

    /// Remove every member of a user type, invoking each destructor
    ///
    /// Clear force-destroys: entries are removed regardless of their
    /// current refcount, without decrementing one-by-one. Destructors run
    /// after the member map has been drained, so `nmembers` is 0 afterward
    /// no matter what the callbacks do. With `force = false` a destructor
    /// failure is reported (after all removals have been attempted) as
    /// `CallbackFailed`; with `force = true` failures are logged only.
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist; `PermissionDenied` for
    /// builtin types; `CallbackFailed` as described above.
    pub fn clear_type(&self, ty: TypeId, force: bool) -> Result<()> {
        if ty.is_builtin() {
            return Err(Error::PermissionDenied(format!(
                "builtin type {} cannot be cleared by callers",
                ty
            )));
        }
        self.clear_type_any(ty, force)
    }

    /// Clear a type's members, builtin or user
    ///
    /// Internal path used by registry teardown; same semantics as
    /// [`HandleTable::clear_type`] minus the builtin check.
    pub(crate) fn clear_type_any(&self, ty: TypeId, force: bool) -> Result<()> {
        let desc = self.registry.descriptor(ty)?;
        let drained: Vec<(Id, Object)> = {
            let mut state = desc.state();
            state
                .members
                .drain()
                .map(|(id, entry)| (id, entry.object))
                .collect()
        };
        let attempted = drained.len();
        let mut failed = 0usize;
        if let Some(free) = desc.free().cloned() {
            for (id, object) in drained {
                if let Err(err) = free(object) {
                    warn!(%id, error = %err, "destructor failed during clear");
                    failed += 1;
                }
            }
        }
        if failed > 0 && !force {
            return Err(Error::CallbackFailed(format!(
                "{} of {} destructors failed while clearing {}",
                failed, attempted, ty
            )));
        }
        Ok(())
    }

    /// Sweep the whole table for registry teardown
    ///
    /// Clears and destroys every user type, then clears the builtin member
    /// sets. The sweep is best-effort complete: every type is processed
    /// even when destructors fail. With `force = false` the first failure
    /// is returned once the sweep finishes; with `force = true` failures
    /// are logged only.
    pub fn teardown(&self, force: bool) -> Result<()> {
        let mut first_err: Option<Error> = None;

        for ty in self.registry.user_types() {
            if let Err(err) = self.clear_type_any(ty, force) {
                first_err.get_or_insert(err);
            }
            // Members are gone even on callback failure, so destroy proceeds
            if let Err(err) = self.registry.destroy_type(ty) {
                first_err.get_or_insert(err);
            }
        }
        for builtin in idspace_core::BuiltinType::ALL {
            if let Err(err) = self.clear_type_any(builtin.as_type_id(), force) {
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) if !force => Err(err),
            _ => Ok(()),
        }
    }

    // ========== Internals ==========

    /// Descriptor for the type an id claims, mapping unknown types to the
    /// id-level invalid-handle error
    fn live_descriptor(&self, id: Id) -> Result<Arc<TypeDescriptor>> {
        if !id.is_plausible() {
            return Err(Error::invalid_id(id));
        }
        self.registry
            .descriptor(id.type_of())
            .map_err(|_| Error::invalid_id(id))
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}
