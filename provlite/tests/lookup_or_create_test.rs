// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lookup-or-create exclusion across threads and contexts

mod common;

use common::{FaultyBackend, FaultyOp, FixedIdentity};
use provlite::lock::SharedLock;
use provlite::{MemoryBackend, ObjectId, Outcome, ProvError, Provenance, Status};
use std::sync::Barrier;
use std::thread;
use tempfile::TempDir;

const RACERS: usize = 16;

fn assert_single_creation(outcomes: &[Outcome<ObjectId>]) {
    let created = outcomes
        .iter()
        .filter(|o| o.status == Status::ObjectCreated)
        .count();
    assert_eq!(created, 1, "exactly one caller creates the object");
    assert!(outcomes
        .iter()
        .all(|o| o.status == Status::ObjectCreated || o.status == Status::Ok));

    let id = outcomes[0].value;
    assert!(outcomes.iter().all(|o| o.value == id));
}

#[test]
fn test_creates_then_finds() {
    let temp_dir = TempDir::new().unwrap();
    let (prov, shared) = common::attached(&temp_dir);

    let created = prov
        .lookup_or_create_object("org", "model.bin", "file", ObjectId::NONE)
        .unwrap();
    assert_eq!(created.status, Status::ObjectCreated);

    let found = prov
        .lookup_or_create_object("org", "model.bin", "file", ObjectId::NONE)
        .unwrap();
    assert_eq!(found.status, Status::Ok);
    assert_eq!(found.value, created.value);
    assert_eq!(shared.object_count(), 1);
}

#[test]
fn test_finds_latest_of_several() {
    let temp_dir = TempDir::new().unwrap();
    let (prov, _shared) = common::attached(&temp_dir);
    prov.create_object("org", "x", "t", ObjectId::NONE).unwrap();
    let latest = prov.create_object("org", "x", "t", ObjectId::NONE).unwrap().value;

    let found = prov
        .lookup_or_create_object("org", "x", "t", ObjectId::NONE)
        .unwrap();
    assert_eq!(found, Outcome::ok(latest));
}

#[test]
fn test_threads_in_one_context_create_once() {
    let temp_dir = TempDir::new().unwrap();
    let (prov, shared) = common::attached(&temp_dir);
    let barrier = Barrier::new(RACERS);

    let outcomes: Vec<Outcome<ObjectId>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    prov.lookup_or_create_object("org", "shared", "file", ObjectId::NONE)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_single_creation(&outcomes);
    assert_eq!(shared.object_count(), 1);
}

#[test]
fn test_contexts_sharing_a_lock_create_once() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    let store = MemoryBackend::new();

    // Two contexts with separate lock handles stand in for two processes
    let contexts: Vec<Provenance> = (0..2)
        .map(|_| {
            let prov = common::context(&temp_dir);
            prov.attach(Box::new(store.clone())).unwrap();
            prov
        })
        .collect();
    assert_eq!(store.session_count(), 2);

    let barrier = Barrier::new(RACERS);
    let outcomes: Vec<Outcome<ObjectId>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS)
            .map(|i| {
                let prov = &contexts[i % contexts.len()];
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    prov.lookup_or_create_object("org", "cross", "file", ObjectId::NONE)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_single_creation(&outcomes);
    assert_eq!(store.object_count(), 1);
}

#[test]
fn test_many_keys_each_created_once() {
    let temp_dir = TempDir::new().unwrap();
    let (prov, shared) = common::attached(&temp_dir);
    let barrier = Barrier::new(RACERS);

    thread::scope(|scope| {
        for _ in 0..RACERS {
            scope.spawn(|| {
                barrier.wait();
                for key in 0..8 {
                    prov.lookup_or_create_object("org", &format!("key-{}", key), "t", ObjectId::NONE)
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(shared.object_count(), 8);
}

#[test]
fn test_lookup_failure_passes_through_and_releases_lock() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    let store = MemoryBackend::new();
    let prov = Provenance::with_config(common::config_in(&temp_dir))
        .with_identity(FixedIdentity::new());
    prov.attach(Box::new(FaultyBackend::new(
        store.clone(),
        FaultyOp::Lookup,
        ProvError::BackendInternal("index corrupted".to_string()),
    )))
    .unwrap();

    assert_eq!(
        prov.lookup_or_create_object("org", "x", "t", ObjectId::NONE),
        Err(ProvError::BackendInternal("index corrupted".to_string()))
    );
    assert_eq!(store.object_count(), 0, "no creation after a failed lookup");

    let lock = SharedLock::open(prov.config().lock_path()).unwrap();
    let guard = lock.try_acquire().unwrap();
    assert!(guard.is_some(), "lock released on the error path");
}

#[test]
fn test_create_failure_releases_lock() {
    let temp_dir = TempDir::new().unwrap();
    let (prov, shared) = common::attached(&temp_dir);

    assert_eq!(
        prov.lookup_or_create_object("org", "x", "t", ObjectId::new(321)),
        Err(ProvError::NotFound)
    );
    assert_eq!(shared.object_count(), 0);

    let lock = SharedLock::open(prov.config().lock_path()).unwrap();
    assert!(lock.try_acquire().unwrap().is_some());

    let retry = prov
        .lookup_or_create_object("org", "x", "t", ObjectId::NONE)
        .unwrap();
    assert_eq!(retry.status, Status::ObjectCreated);
}

#[cfg(unix)]
#[test]
fn test_waits_for_another_holder() {
    use std::sync::mpsc;
    use std::time::Duration;

    let temp_dir = TempDir::new().unwrap();
    let (prov, shared) = common::attached(&temp_dir);
    let outside = SharedLock::open(prov.config().lock_path()).unwrap();
    let held = outside.acquire().unwrap();

    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        let prov = &prov;
        scope.spawn(move || {
            let outcome = prov
                .lookup_or_create_object("org", "blocked", "t", ObjectId::NONE)
                .unwrap();
            tx.send(outcome).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(shared.object_count(), 0);

        drop(held);
        let outcome = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(outcome.status, Status::ObjectCreated);
    });
}
