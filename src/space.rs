//! Main registry entry point for idspace.
//!
//! This module provides the `IdSpace` struct, the primary entry point for
//! all identifier operations.

use idspace_core::{FreeFunc, Id, IterationOutcome, Object, Result, TypeId, Visit};
use idspace_registry::HandleTable;
use tracing::debug;

/// The identifier registry.
///
/// An `IdSpace` is an explicitly constructed instance — there is no process
/// singleton. Construction seeds the builtin types ([`crate::BuiltinType`]);
/// [`IdSpace::close`] tears the registry down deterministically, clearing
/// and destroying every user type.
///
/// # Example
///
/// ```ignore
/// use idspace::prelude::*;
/// use std::sync::Arc;
///
/// let space = IdSpace::new();
///
/// // Register a user type with a destructor
/// let ty = space.register_type(0, Some(Arc::new(|_obj| Ok(()))))?;
///
/// // Register objects and work with their identifiers
/// let id = space.register(ty, Arc::new("payload".to_string()))?;
/// assert!(space.is_valid(id));
/// assert_eq!(space.get_type(id)?, ty);
///
/// // Last-reference release removes the handle and runs the destructor
/// space.dec_ref(id)?;
///
/// // Graceful teardown
/// space.close(false)?;
/// ```
pub struct IdSpace {
    table: HandleTable,
}

impl IdSpace {
    /// Create a registry seeded with the builtin types.
    pub fn new() -> Self {
        debug!("constructing identifier registry");
        Self {
            table: HandleTable::new(),
        }
    }

    /// The handle table backing this registry.
    ///
    /// Exposed for callers that want to hold a narrower capability than the
    /// whole facade.
    pub fn table(&self) -> &HandleTable {
        &self.table
    }

    // ========== Type Operations ==========

    /// Register a new user type.
    ///
    /// `reserved_hint` pre-sizes the member table; `free` is the destructor
    /// invoked whenever a member of this type is removed (absent means
    /// no-op). The new type starts with `type_refcount = 1` and no members.
    ///
    /// # Errors
    /// `ResourceExhausted` if the type-id space is saturated.
    pub fn register_type(
        &self,
        reserved_hint: usize,
        free: Option<FreeFunc>,
    ) -> Result<TypeId> {
        self.table.registry().register_type(reserved_hint, free)
    }

    /// True iff the tag names a builtin type or a live user type.
    pub fn type_exists(&self, ty: TypeId) -> bool {
        self.table.registry().type_exists(ty)
    }

    /// Increment a type's own reference count, returning the new count.
    pub fn inc_type_ref(&self, ty: TypeId) -> Result<u32> {
        self.table.registry().inc_type_ref(ty)
    }

    /// Decrement a type's own reference count, returning the new count.
    ///
    /// Decrementing an already-zero count fails with `InvalidState`.
    pub fn dec_type_ref(&self, ty: TypeId) -> Result<u32> {
        self.table.registry().dec_type_ref(ty)
    }

    /// Current type-level reference count.
    pub fn type_ref_count(&self, ty: TypeId) -> Result<u32> {
        self.table.registry().type_ref_count(ty)
    }

    /// Destroy a user type whose member set is empty.
    ///
    /// Fails with `InvalidState` while members remain (clear first) and
    /// `PermissionDenied` for builtin types.
    pub fn destroy_type(&self, ty: TypeId) -> Result<()> {
        self.table.registry().destroy_type(ty)
    }

    // ========== Handle Operations ==========

    /// Register an object under a type, returning a fresh identifier.
    pub fn register(&self, ty: TypeId, object: Object) -> Result<Id> {
        self.table.register(ty, object)
    }

    /// True iff the identifier resolves to a live handle; never errors.
    pub fn is_valid(&self, id: Id) -> bool {
        self.table.is_valid(id)
    }

    /// The type of a live identifier (validated).
    ///
    /// For the pure bit-level decode without liveness validation, use
    /// [`Id::type_of`].
    pub fn get_type(&self, id: Id) -> Result<TypeId> {
        self.table.type_of(id)
    }

    /// Increment a handle's reference count, returning the new count.
    pub fn inc_ref(&self, id: Id) -> Result<u32> {
        self.table.inc_ref(id)
    }

    /// Decrement a handle's reference count, returning the new count.
    ///
    /// Reaching 0 removes the handle and invokes the type's destructor.
    pub fn dec_ref(&self, id: Id) -> Result<u32> {
        self.table.dec_ref(id)
    }

    /// Current reference count of a live handle.
    pub fn ref_count(&self, id: Id) -> Result<u32> {
        self.table.ref_count(id)
    }

    /// The object associated with a live identifier; refcount unchanged.
    pub fn object_of(&self, id: Id) -> Result<Object> {
        self.table.object_of(id)
    }

    /// Type-checked object lookup.
    pub fn object_verify(&self, id: Id, ty: TypeId) -> Result<Object> {
        self.table.object_verify(id, ty)
    }

    /// Remove a handle without invoking its destructor, returning the object.
    pub fn remove(&self, id: Id) -> Result<Object> {
        self.table.remove(id)
    }

    // ========== Enumeration ==========

    /// Number of live members under a type.
    pub fn nmembers(&self, ty: TypeId) -> Result<u64> {
        self.table.nmembers(ty)
    }

    /// Visit every currently-live member of a type exactly once.
    ///
    /// See [`HandleTable::iterate`] for the snapshot semantics.
    pub fn iterate<F>(&self, ty: TypeId, visitor: F) -> Result<IterationOutcome>
    where
        F: FnMut(Id) -> Result<Visit>,
    {
        self.table.iterate(ty, visitor)
    }

    /// First member of a type matching a predicate, with its object.
    pub fn search<P>(&self, ty: TypeId, predicate: P) -> Result<Option<(Id, Object)>>
    where
        P: FnMut(Id, &Object) -> bool,
    {
        self.table.search(ty, predicate)
    }

    /// Remove every member of a user type, invoking each destructor.
    ///
    /// With `force = false` a destructor failure is reported (after all
    /// removals complete) as `CallbackFailed`; with `force = true` failures
    /// are logged only. `nmembers` is 0 afterward either way.
    pub fn clear_type(&self, ty: TypeId, force: bool) -> Result<()> {
        self.table.clear_type(ty, force)
    }

    // ========== Teardown ==========

    /// Tear down the registry.
    ///
    /// Clears and destroys every user type, then clears the builtin member
    /// sets. Teardown is best-effort complete: every type is swept even
    /// when destructors fail. With `force = false` the first failure is
    /// returned after the sweep finishes; with `force = true` failures are
    /// logged only.
    pub fn close(self, force: bool) -> Result<()> {
        debug!(force, "closing identifier registry");
        self.table.teardown(force)
    }
}

impl Default for IdSpace {
    fn default() -> Self {
        Self::new()
    }
}
