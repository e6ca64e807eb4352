//! Shared test utilities for the integration test suites.
//!
//! Import via `mod common;` from a suite's main.rs.

#![allow(dead_code)]

use idspace::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static INIT_TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Destructor that counts its invocations.
pub fn counting_free(counter: Arc<AtomicUsize>) -> FreeFunc {
    Arc::new(move |_object| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

/// Destructor that always reports failure.
pub fn failing_free() -> FreeFunc {
    Arc::new(|_object| Err(Error::CallbackFailed("destructor refused".to_string())))
}

/// A fresh registry with one user type whose destructor counts invocations.
pub fn space_with_counted_type() -> (IdSpace, TypeId, Arc<AtomicUsize>) {
    init_tracing();
    let space = IdSpace::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let ty = space
        .register_type(0, Some(counting_free(Arc::clone(&counter))))
        .expect("type registration");
    (space, ty, counter)
}

/// Register `n` small objects under `ty`, returning their ids.
pub fn register_n(space: &IdSpace, ty: TypeId, n: u32) -> Vec<Id> {
    (0..n)
        .map(|k| space.register(ty, Arc::new(k)).expect("register"))
        .collect()
}
