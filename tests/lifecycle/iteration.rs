//! Iteration and search over live members, including mutation mid-walk.

use crate::common::*;
use idspace::prelude::*;
use std::sync::Arc;

#[test]
fn visit_count_matches_nmembers_at_call_start() {
    let (space, ty, _) = space_with_counted_type();
    register_n(&space, ty, 7);
    let expected = space.nmembers(ty).unwrap();
    let mut visits = 0u64;
    let outcome = space
        .iterate(ty, |_| {
            visits += 1;
            Ok(Visit::Continue)
        })
        .unwrap();
    assert_eq!(outcome, IterationOutcome::Completed);
    assert_eq!(visits, expected);
}

#[test]
fn stop_verdict_ends_walk_early() {
    let (space, ty, _) = space_with_counted_type();
    register_n(&space, ty, 5);
    let mut visits = 0;
    let outcome = space
        .iterate(ty, |_| {
            visits += 1;
            Ok(if visits == 3 { Visit::Stop } else { Visit::Continue })
        })
        .unwrap();
    assert_eq!(outcome, IterationOutcome::Stopped);
    assert_eq!(visits, 3);
}

#[test]
fn visitor_error_becomes_overall_status() {
    let (space, ty, _) = space_with_counted_type();
    register_n(&space, ty, 3);
    let mut visits = 0;
    let err = space
        .iterate(ty, |_| {
            visits += 1;
            if visits == 2 {
                Err(Error::CallbackFailed("visitor bailed".to_string()))
            } else {
                Ok(Visit::Continue)
            }
        })
        .unwrap_err();
    assert!(matches!(err, Error::CallbackFailed(_)));
    assert_eq!(visits, 2);
}

#[test]
fn visitor_may_deregister_the_id_it_is_handed() {
    let (space, ty, counter) = space_with_counted_type();
    register_n(&space, ty, 4);
    let expected = space.nmembers(ty).unwrap();
    let mut visits = 0u64;
    space
        .iterate(ty, |id| {
            visits += 1;
            space.dec_ref(id).unwrap();
            Ok(Visit::Continue)
        })
        .unwrap();
    // No double-visit, no skip, no crash
    assert_eq!(visits, expected);
    assert_eq!(space.nmembers(ty).unwrap(), 0);
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[test]
fn members_registered_mid_walk_are_not_visited() {
    let (space, ty, _) = space_with_counted_type();
    register_n(&space, ty, 3);
    let mut visits = 0u64;
    space
        .iterate(ty, |_| {
            visits += 1;
            // Snapshot semantics: the walk never sees this newcomer
            space.register(ty, Arc::new(999u32)).unwrap();
            Ok(Visit::Continue)
        })
        .unwrap();
    assert_eq!(visits, 3);
    assert_eq!(space.nmembers(ty).unwrap(), 6);
}

#[test]
fn iterating_an_empty_type_is_a_clean_noop() {
    let (space, ty, _) = space_with_counted_type();
    let mut visits = 0;
    let outcome = space
        .iterate(ty, |_| {
            visits += 1;
            Ok(Visit::Continue)
        })
        .unwrap();
    assert_eq!(outcome, IterationOutcome::Completed);
    assert_eq!(visits, 0);
}

#[test]
fn search_finds_member_by_object_contents() {
    let (space, ty, _) = space_with_counted_type();
    space.register(ty, Arc::new("alpha".to_string())).unwrap();
    let wanted = space.register(ty, Arc::new("beta".to_string())).unwrap();
    let found = space
        .search(ty, |_, object| {
            object.downcast_ref::<String>().map(|s| s.as_str()) == Some("beta")
        })
        .unwrap();
    let (id, _) = found.unwrap();
    assert_eq!(id, wanted);
}

#[test]
fn search_returns_none_without_match() {
    let (space, ty, _) = space_with_counted_type();
    register_n(&space, ty, 3);
    assert!(space.search(ty, |_, _| false).unwrap().is_none());
}
