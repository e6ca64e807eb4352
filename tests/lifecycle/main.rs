//! Registry Lifecycle Integration Tests
//!
//! Exercises the full identifier lifecycle through the public facade:
//! type registration, handle refcounting, iteration, bulk clear, type
//! destruction, concurrency, and registry teardown.

#[path = "../common/mod.rs"]
mod common;

mod concurrent;
mod iteration;
mod type_registration;
