//! Type Registry: the leaf component owning type descriptors
//!
//! The Type Registry knows which identifier types exist (builtin and
//! user-registered), holds each type's destructor callback and type-level
//! reference count, and owns the per-type member state that the handle
//! table operates on.
//!
//! ## Locking
//!
//! The descriptor table is a `DashMap`, so descriptor lookup contends only
//! per shard. Each descriptor guards its mutable state (type refcount,
//! member map, sequence counter) with a single `parking_lot::Mutex` — the
//! per-type granularity required by the concurrency contract. Callers must
//! never invoke a caller-supplied callback while holding a type's state
//! lock; the handle table enforces that.
//!
//! ## Allocation
//!
//! User type tags are allocated from a monotonic counter starting at
//! `NTYPES`. Tags are never reused within the process lifetime, even after
//! `destroy_type`, so a stale identifier can never alias an object
//! registered under a later type.

use dashmap::DashMap;
use idspace_core::{Error, FreeFunc, Id, Object, Result, TypeId, MAX_TYPES, NTYPES};
use parking_lot::{Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A live handle under some type
///
/// The registry holds a non-owning `Arc` to the caller's object plus the
/// handle-level reference count. Created with `refcount = 1`; removed when
/// the count reaches 0 or the type is cleared.
pub(crate) struct HandleEntry {
    /// Shared reference to the caller-supplied object
    pub(crate) object: Object,
    /// Handle-level reference count, >= 1 while the entry exists
    pub(crate) refcount: u32,
}

/// Mutable per-type state, guarded by the descriptor's mutex
pub(crate) struct TypeState {
    /// Reference count on the type itself (independent of member count)
    pub(crate) refcount: u32,
    /// Live members of this type
    pub(crate) members: FxHashMap<Id, HandleEntry>,
    /// Next sequence number to hand out; monotonic, never reused
    pub(crate) next_seq: u64,
}

/// Descriptor for one identifier type
///
/// Immutable metadata (tag, destructor) lives directly on the descriptor;
/// everything mutable sits behind the state mutex.
pub struct TypeDescriptor {
    type_id: TypeId,
    free: Option<FreeFunc>,
    state: Mutex<TypeState>,
}

impl TypeDescriptor {
    fn new(type_id: TypeId, reserved_hint: usize, free: Option<FreeFunc>) -> Self {
        Self {
            type_id,
            free,
            state: Mutex::new(TypeState {
                refcount: 1,
                members: FxHashMap::with_capacity_and_hasher(reserved_hint, Default::default()),
                next_seq: 0,
            }),
        }
    }

    /// The tag this descriptor was registered under
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// True iff this descriptor is one of the builtin types
    pub fn is_builtin(&self) -> bool {
        self.type_id.is_builtin()
    }

    /// The destructor attached at registration time, if any
    pub(crate) fn free(&self) -> Option<&FreeFunc> {
        self.free.as_ref()
    }

    /// Lock and return the mutable per-type state
    pub(crate) fn state(&self) -> MutexGuard<'_, TypeState> {
        self.state.lock()
    }
}

/// The set of known identifier types
///
/// Construction seeds the builtin types; user types are added by
/// [`TypeRegistry::register_type`] and removed by
/// [`TypeRegistry::destroy_type`]. A type is "live" exactly while its
/// descriptor is present in this table — `type_exists` answers from
/// presence, not from member-set emptiness.
pub struct TypeRegistry {
    types: DashMap<TypeId, Arc<TypeDescriptor>>,
    next_user_tag: AtomicU32,
}

impl TypeRegistry {
    /// Create a registry seeded with the builtin types
    ///
    /// Builtin descriptors start with `type_refcount = 1`, no destructor,
    /// and an empty member set.
    pub fn new() -> Self {
        let types = DashMap::new();
        for builtin in idspace_core::BuiltinType::ALL {
            let ty = builtin.as_type_id();
            types.insert(ty, Arc::new(TypeDescriptor::new(ty, 0, None)));
        }
        Self {
            types,
            next_user_tag: AtomicU32::new(NTYPES),
        }
    }

    /// Register a new user type
    ///
    /// Allocates a fresh tag >= `NTYPES`, initializes the type refcount to 1
    /// and the member set to empty (pre-sized by `reserved_hint`). Tags are
    /// never reused, so the tag space ([`MAX_TYPES`] values) is a hard cap
    /// on registrations per process.
    ///
    /// # Errors
    /// `ResourceExhausted` once the tag space is saturated.
    pub fn register_type(
        &self,
        reserved_hint: usize,
        free: Option<FreeFunc>,
    ) -> Result<TypeId> {
        let tag = self.next_user_tag.fetch_add(1, Ordering::SeqCst);
        if tag >= MAX_TYPES {
            return Err(Error::ResourceExhausted(format!(
                "type-id space saturated ({} tags)",
                MAX_TYPES
            )));
        }
        let ty = TypeId::new(tag);
        self.types
            .insert(ty, Arc::new(TypeDescriptor::new(ty, reserved_hint, free)));
        debug!(%ty, "registered user type");
        Ok(ty)
    }

    /// True iff the tag names a builtin type or a live user type
    pub fn type_exists(&self, ty: TypeId) -> bool {
        self.types.contains_key(&ty)
    }

    /// Look up the descriptor for a type
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist.
    pub fn descriptor(&self, ty: TypeId) -> Result<Arc<TypeDescriptor>> {
        self.types
            .get(&ty)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::unknown_type(ty))
    }

    /// Increment the type-level reference count, returning the new count
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist; `PermissionDenied` for
    /// builtin types.
    pub fn inc_type_ref(&self, ty: TypeId) -> Result<u32> {
        let desc = self.user_descriptor(ty)?;
        let mut state = desc.state();
        state.refcount = state.refcount.checked_add(1).ok_or_else(|| {
            Error::ResourceExhausted(format!("type refcount overflow for {}", ty))
        })?;
        Ok(state.refcount)
    }

    /// Decrement the type-level reference count, returning the new count
    ///
    /// A count of 0 leaves the type registered; only `destroy_type` removes
    /// it. Decrementing an already-zero count is rejected, not clamped.
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist; `PermissionDenied` for
    /// builtin types; `InvalidState` when the count is already 0.
    pub fn dec_type_ref(&self, ty: TypeId) -> Result<u32> {
        let desc = self.user_descriptor(ty)?;
        let mut state = desc.state();
        if state.refcount == 0 {
            return Err(Error::InvalidState(format!(
                "type refcount for {} is already zero",
                ty
            )));
        }
        state.refcount -= 1;
        Ok(state.refcount)
    }

    /// Current type-level reference count
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist.
    pub fn type_ref_count(&self, ty: TypeId) -> Result<u32> {
        let desc = self.descriptor(ty)?;
        let state = desc.state();
        Ok(state.refcount)
    }

    /// Destroy a user type
    ///
    /// The member set must be empty (use `clear_type` first, or pass a
    /// force-clear through the facade). Removal is atomic with the
    /// emptiness check.
    ///
    /// # Errors
    /// `InvalidHandle` if the type does not exist; `PermissionDenied` for
    /// builtin types; `InvalidState` while members remain.
    pub fn destroy_type(&self, ty: TypeId) -> Result<()> {
        // Validate existence and builtin-ness before attempting removal
        self.user_descriptor(ty)?;
        let removed = self
            .types
            .remove_if(&ty, |_, desc| desc.state().members.is_empty());
        match removed {
            Some(_) => {
                debug!(%ty, "destroyed user type");
                Ok(())
            }
            None => {
                if self.types.contains_key(&ty) {
                    Err(Error::InvalidState(format!(
                        "type {} still has members",
                        ty
                    )))
                } else {
                    // Lost a race with another destroy
                    Err(Error::unknown_type(ty))
                }
            }
        }
    }

    /// Tags of all live user types (builtins excluded)
    pub fn user_types(&self) -> Vec<TypeId> {
        let mut tags: Vec<TypeId> = self
            .types
            .iter()
            .map(|entry| *entry.key())
            .filter(|ty| ty.is_user())
            .collect();
        tags.sort();
        tags
    }

    /// Descriptor lookup that additionally rejects builtin types
    fn user_descriptor(&self, ty: TypeId) -> Result<Arc<TypeDescriptor>> {
        let desc = self.descriptor(ty)?;
        if desc.is_builtin() {
            return Err(Error::PermissionDenied(format!(
                "builtin type {} cannot be mutated",
                ty
            )));
        }
        Ok(desc)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
