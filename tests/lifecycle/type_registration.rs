//! Type registration and type-level refcount behavior.

use crate::common::*;
use idspace::prelude::*;
use idspace::{MAX_TYPES, NTYPES};

#[test]
fn fresh_type_has_no_members() {
    let (space, ty, _) = space_with_counted_type();
    assert_eq!(space.nmembers(ty).unwrap(), 0);
    assert!(space.type_exists(ty));
}

#[test]
fn user_types_allocated_above_builtin_range() {
    let (space, ty, _) = space_with_counted_type();
    assert!(ty.raw() >= NTYPES);
    assert!(ty.raw() < MAX_TYPES);
    assert!(ty.is_user());
}

#[test]
fn type_exists_answers_from_presence_not_members() {
    // A type with refcount 0 and no members is still live while registered
    let (space, ty, _) = space_with_counted_type();
    space.dec_type_ref(ty).unwrap();
    assert_eq!(space.type_ref_count(ty).unwrap(), 0);
    assert!(space.type_exists(ty));
}

#[test]
fn type_refcount_dip_to_zero_and_back() {
    // register_type -> dec to 0 -> inc must restore the pre-decrement value
    let (space, ty, _) = space_with_counted_type();
    let before = space.type_ref_count(ty).unwrap();
    assert_eq!(space.dec_type_ref(ty).unwrap(), before - 1);
    assert_eq!(space.inc_type_ref(ty).unwrap(), before);
}

#[test]
fn type_refcount_never_wraps() {
    let (space, ty, _) = space_with_counted_type();
    space.dec_type_ref(ty).unwrap();
    let err = space.dec_type_ref(ty).unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(space.type_ref_count(ty).unwrap(), 0);
}

#[test]
fn builtin_types_reject_type_level_mutation() {
    init_tracing();
    let space = IdSpace::new();
    for builtin in BuiltinType::ALL {
        let ty = builtin.as_type_id();
        assert!(matches!(
            space.inc_type_ref(ty),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            space.dec_type_ref(ty),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            space.destroy_type(ty),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            space.clear_type(ty, false),
            Err(Error::PermissionDenied(_))
        ));
    }
}

#[test]
fn unknown_type_operations_fail_invalid_handle() {
    init_tracing();
    let space = IdSpace::new();
    let ghost = TypeId::new(MAX_TYPES - 1);
    assert!(!space.type_exists(ghost));
    assert!(matches!(space.nmembers(ghost), Err(Error::InvalidHandle(_))));
    assert!(matches!(
        space.inc_type_ref(ghost),
        Err(Error::InvalidHandle(_))
    ));
    assert!(matches!(
        space.destroy_type(ghost),
        Err(Error::InvalidHandle(_))
    ));
}

#[test]
fn destroyed_type_tag_is_not_reused() {
    init_tracing();
    let space = IdSpace::new();
    let a = space.register_type(0, None).unwrap();
    space.destroy_type(a).unwrap();
    assert!(!space.type_exists(a));
    let b = space.register_type(0, None).unwrap();
    assert_ne!(a, b);
}
