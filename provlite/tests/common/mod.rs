// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared helpers for integration tests

#![allow(dead_code)]

use provlite::backend::{
    IdTimestampCallback, ObjectInfoCallback, ObjectPropertyCallback, RelationCallback,
    RelationPropertyCallback,
};
use provlite::{
    Backend, Direction, IdentityProvider, IterFlags, LookupFlags, MacAddress, MemoryBackend,
    ObjectId, ObjectInfo, Outcome, ProvConfig, ProvError, ProvResult, Provenance, RelationId,
    RelationType, SessionId, SessionInfo, Status, TraversalFlags,
};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use tempfile::TempDir;

pub const TEST_MAC: MacAddress = [0x02, 0x00, 0x00, 0xaa, 0xbb, 0xcc];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Identity with fixed, overridable answers
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    pub user: Option<String>,
    pub pid: u32,
    pub program: Option<PathBuf>,
    pub args: Vec<Vec<u8>>,
    pub mac: Option<MacAddress>,
}

impl FixedIdentity {
    pub fn new() -> Self {
        Self {
            user: Some("alice".to_string()),
            pid: 4242,
            program: Some(PathBuf::from("/usr/bin/prov-test")),
            args: vec![b"prov-test".to_vec(), b"--name".to_vec(), b"it's".to_vec()],
            mac: Some(TEST_MAC),
        }
    }

    pub fn without_user(mut self) -> Self {
        self.user = None;
        self
    }

    pub fn without_program(mut self) -> Self {
        self.program = None;
        self
    }

    pub fn without_mac(mut self) -> Self {
        self.mac = None;
        self
    }
}

impl IdentityProvider for FixedIdentity {
    fn user(&self) -> Option<String> {
        self.user.clone()
    }

    fn pid(&self) -> u32 {
        self.pid
    }

    fn program(&self) -> Option<PathBuf> {
        self.program.clone()
    }

    fn raw_args(&self) -> Vec<Vec<u8>> {
        self.args.clone()
    }

    fn hardware_address(&self) -> Option<MacAddress> {
        self.mac
    }
}

pub fn config_in(temp_dir: &TempDir) -> ProvConfig {
    ProvConfig::default().with_lock_dir(temp_dir.path())
}

/// Unattached context using a fixed identity and a private lock directory
pub fn context(temp_dir: &TempDir) -> Provenance {
    Provenance::with_config(config_in(temp_dir)).with_identity(FixedIdentity::new())
}

/// Attached context plus a handle sharing its store
pub fn attached(temp_dir: &TempDir) -> (Provenance, MemoryBackend) {
    init_logging();
    let backend = MemoryBackend::new();
    let shared = backend.clone();
    let prov = context(temp_dir);
    prov.attach(Box::new(backend)).expect("attach memory backend");
    (prov, shared)
}

/// Operations a [`FaultyBackend`] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultyOp {
    CreateSession,
    Lookup,
    Traversal,
}

/// Memory backend that fails one operation with a chosen error
pub struct FaultyBackend {
    inner: MemoryBackend,
    fault: Option<(FaultyOp, ProvError)>,
    session_gate: Option<SessionGate>,
}

/// Pauses `create_session` until the test lets it continue
#[derive(Clone)]
pub struct SessionGate {
    pub entered: Arc<Barrier>,
    pub release: Arc<Barrier>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Barrier::new(2)),
            release: Arc::new(Barrier::new(2)),
        }
    }
}

impl FaultyBackend {
    pub fn new(inner: MemoryBackend, op: FaultyOp, error: ProvError) -> Self {
        Self {
            inner,
            fault: Some((op, error)),
            session_gate: None,
        }
    }

    /// Healthy backend whose session creation waits on `gate`
    pub fn gated(inner: MemoryBackend, gate: SessionGate) -> Self {
        Self {
            inner,
            fault: None,
            session_gate: Some(gate),
        }
    }

    fn check(&self, op: FaultyOp) -> ProvResult<()> {
        match &self.fault {
            Some((faulty, error)) if *faulty == op => Err(error.clone()),
            _ => Ok(()),
        }
    }
}

impl Backend for FaultyBackend {
    fn create_session(
        &self,
        mac_address: Option<&str>,
        user: &str,
        pid: u32,
        program: &str,
        cmdline: &str,
    ) -> ProvResult<SessionId> {
        self.check(FaultyOp::CreateSession)?;
        if let Some(gate) = &self.session_gate {
            gate.entered.wait();
            gate.release.wait();
        }
        self.inner
            .create_session(mac_address, user, pid, program, cmdline)
    }

    fn create_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        container: ObjectId,
        session: SessionId,
    ) -> ProvResult<ObjectId> {
        self.inner
            .create_object(originator, name, object_type, container, session)
    }

    fn lookup_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
    ) -> ProvResult<ObjectId> {
        self.check(FaultyOp::Lookup)?;
        self.inner.lookup_object(originator, name, object_type)
    }

    fn lookup_object_ext(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        flags: LookupFlags,
        callback: &mut IdTimestampCallback<'_>,
    ) -> ProvResult<Status> {
        self.check(FaultyOp::Lookup)?;
        self.inner
            .lookup_object_ext(originator, name, object_type, flags, callback)
    }

    fn add_object_property(&self, id: ObjectId, key: &str, value: &str) -> ProvResult<()> {
        self.inner.add_object_property(id, key, value)
    }

    fn add_relation_property(&self, id: RelationId, key: &str, value: &str) -> ProvResult<()> {
        self.inner.add_relation_property(id, key, value)
    }

    fn add_relation(
        &self,
        from: ObjectId,
        to: ObjectId,
        relation_type: RelationType,
        container: ObjectId,
    ) -> ProvResult<Outcome<RelationId>> {
        self.inner.add_relation(from, to, relation_type, container)
    }

    fn get_session_info(&self, id: SessionId) -> ProvResult<SessionInfo> {
        self.inner.get_session_info(id)
    }

    fn get_object_info(&self, id: ObjectId) -> ProvResult<ObjectInfo> {
        self.inner.get_object_info(id)
    }

    fn get_all_objects(
        &self,
        flags: IterFlags,
        callback: &mut ObjectInfoCallback<'_>,
    ) -> ProvResult<Status> {
        self.inner.get_all_objects(flags, callback)
    }

    fn get_object_relations(
        &self,
        id: ObjectId,
        direction: Direction,
        flags: TraversalFlags,
        callback: &mut RelationCallback<'_>,
    ) -> ProvResult<Status> {
        self.check(FaultyOp::Traversal)?;
        self.inner.get_object_relations(id, direction, flags, callback)
    }

    fn get_object_properties(
        &self,
        id: ObjectId,
        key: Option<&str>,
        callback: &mut ObjectPropertyCallback<'_>,
    ) -> ProvResult<Status> {
        self.inner.get_object_properties(id, key, callback)
    }

    fn get_relation_properties(
        &self,
        id: RelationId,
        key: Option<&str>,
        callback: &mut RelationPropertyCallback<'_>,
    ) -> ProvResult<Status> {
        self.inner.get_relation_properties(id, key, callback)
    }

    fn lookup_object_by_property(
        &self,
        key: &str,
        value: &str,
        callback: &mut ObjectPropertyCallback<'_>,
    ) -> ProvResult<Status> {
        self.inner.lookup_object_by_property(key, value, callback)
    }

    fn delete_bundle(&self, id: ObjectId) -> ProvResult<()> {
        self.inner.delete_bundle(id)
    }

    fn get_bundle_objects(
        &self,
        id: ObjectId,
        callback: &mut ObjectInfoCallback<'_>,
    ) -> ProvResult<Status> {
        self.inner.get_bundle_objects(id, callback)
    }

    fn get_bundle_relations(
        &self,
        id: ObjectId,
        callback: &mut RelationCallback<'_>,
    ) -> ProvResult<Status> {
        self.inner.get_bundle_relations(id, callback)
    }

    fn destroy(&self) -> ProvResult<()> {
        self.inner.destroy()
    }
}
