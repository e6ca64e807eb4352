//! Parallel access to a shared registry.

use crate::common::*;
use idspace::prelude::*;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: u32 = 200;

#[test]
fn parallel_registration_yields_distinct_ids() {
    init_tracing();
    let space = Arc::new(IdSpace::new());
    let ty = space.register_type(0, None).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let space = Arc::clone(&space);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|n| {
                        space
                            .register(ty, Arc::new((t as u32) << 16 | n))
                            .unwrap()
                    })
                    .collect::<Vec<Id>>()
            })
        })
        .collect();

    let mut all: Vec<Id> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = all.len() as u64;
    all.sort();
    all.dedup();
    assert_eq!(all.len() as u64, total);
    assert_eq!(space.nmembers(ty).unwrap(), total);
}

#[test]
fn parallel_release_destroys_each_member_exactly_once() {
    let (space, ty, counter) = space_with_counted_type();
    let space = Arc::new(space);
    let ids = register_n(&space, ty, (THREADS as u32) * PER_THREAD);

    let handles: Vec<_> = ids
        .chunks(PER_THREAD as usize)
        .map(|chunk| {
            let space = Arc::clone(&space);
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for id in chunk {
                    space.dec_ref(id).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(space.nmembers(ty).unwrap(), 0);
    assert_eq!(
        counter.load(Ordering::SeqCst),
        THREADS * PER_THREAD as usize
    );
}

#[test]
fn iteration_races_cleanly_with_registration() {
    init_tracing();
    let space = Arc::new(IdSpace::new());
    let ty = space.register_type(0, None).unwrap();
    register_n(&space, ty, 100);

    let writer = {
        let space = Arc::clone(&space);
        thread::spawn(move || {
            for n in 0..100u32 {
                space.register(ty, Arc::new(n)).unwrap();
            }
        })
    };

    // Each walk sees a consistent point-in-time member list: at least the
    // 100 pre-registered members, never a torn count
    for _ in 0..10 {
        let mut visits = 0u64;
        space
            .iterate(ty, |_| {
                visits += 1;
                Ok(Visit::Continue)
            })
            .unwrap();
        assert!(visits >= 100);
        assert!(visits <= 200);
    }
    writer.join().unwrap();
    assert_eq!(space.nmembers(ty).unwrap(), 200);
}

#[test]
fn clear_races_cleanly_with_refcount_traffic() {
    let (space, ty, _) = space_with_counted_type();
    let space = Arc::new(space);
    let ids = register_n(&space, ty, 500);

    let toucher = {
        let space = Arc::clone(&space);
        let ids = ids.clone();
        thread::spawn(move || {
            for id in ids {
                // The member may vanish mid-traffic; both outcomes are fine
                if space.inc_ref(id).is_ok() {
                    let _ = space.dec_ref(id);
                }
            }
        })
    };

    space.clear_type(ty, true).unwrap();
    toucher.join().unwrap();
    assert_eq!(space.nmembers(ty).unwrap(), 0);
}
