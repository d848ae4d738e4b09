// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pluggable backend interface
//!
//! This module provides:
//! - The [`Backend`] capability trait every storage engine implements
//! - Callback type aliases for the streaming operations
//! - An in-memory reference backend ([`MemoryBackend`])
//!
//! Streaming operations call the supplied callback once per row. A callback
//! that returns an error stops the stream; the backend returns that error
//! as the result of the whole call.

pub mod memory;

pub use memory::MemoryBackend;

use crate::error::{Outcome, ProvResult, Status};
use crate::types::{
    Direction, IdTimestamp, IterFlags, LookupFlags, ObjectId, ObjectInfo, PropertyEntry,
    RelationEntry, RelationId, RelationType, SessionId, SessionInfo, TraversalFlags,
};

/// Receives `lookup_object_ext` matches
pub type IdTimestampCallback<'a> = dyn FnMut(&IdTimestamp) -> ProvResult<()> + 'a;

/// Receives object detail rows
pub type ObjectInfoCallback<'a> = dyn FnMut(&ObjectInfo) -> ProvResult<()> + 'a;

/// Receives relation rows
pub type RelationCallback<'a> = dyn FnMut(&RelationEntry) -> ProvResult<()> + 'a;

/// Receives object property rows
pub type ObjectPropertyCallback<'a> =
    dyn FnMut(&PropertyEntry<ObjectId>) -> ProvResult<()> + 'a;

/// Receives relation property rows
pub type RelationPropertyCallback<'a> =
    dyn FnMut(&PropertyEntry<RelationId>) -> ProvResult<()> + 'a;

/// Storage backend capability contract
///
/// Implementations own and serialize all entity data. The core validates
/// arguments before calling in and passes backend failures through as-is,
/// so backends report failures with the [`crate::ProvError`] variant that
/// describes them best.
pub trait Backend: Send + Sync {
    /// Record the session of the attaching process
    fn create_session(
        &self,
        mac_address: Option<&str>,
        user: &str,
        pid: u32,
        program: &str,
        cmdline: &str,
    ) -> ProvResult<SessionId>;

    /// Create an object; `container` may be `NONE`
    fn create_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        container: ObjectId,
        session: SessionId,
    ) -> ProvResult<ObjectId>;

    /// Most recently created match, or `NotFound`
    fn lookup_object(&self, originator: &str, name: &str, object_type: &str)
        -> ProvResult<ObjectId>;

    /// Stream every match; `NotFound` when there are none
    fn lookup_object_ext(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        flags: LookupFlags,
        callback: &mut IdTimestampCallback<'_>,
    ) -> ProvResult<Status>;

    fn add_object_property(&self, id: ObjectId, key: &str, value: &str) -> ProvResult<()>;

    fn add_relation_property(&self, id: RelationId, key: &str, value: &str) -> ProvResult<()>;

    /// Record an edge; an identical existing edge yields `DuplicateIgnored`
    /// together with its id
    fn add_relation(
        &self,
        from: ObjectId,
        to: ObjectId,
        relation_type: RelationType,
        container: ObjectId,
    ) -> ProvResult<Outcome<RelationId>>;

    fn get_session_info(&self, id: SessionId) -> ProvResult<SessionInfo>;

    fn get_object_info(&self, id: ObjectId) -> ProvResult<ObjectInfo>;

    fn get_all_objects(
        &self,
        flags: IterFlags,
        callback: &mut ObjectInfoCallback<'_>,
    ) -> ProvResult<Status>;

    /// Stream edges around `id`; `NoData` when there are none
    fn get_object_relations(
        &self,
        id: ObjectId,
        direction: Direction,
        flags: TraversalFlags,
        callback: &mut RelationCallback<'_>,
    ) -> ProvResult<Status>;

    /// Stream properties of an object, all keys when `key` is `None`
    fn get_object_properties(
        &self,
        id: ObjectId,
        key: Option<&str>,
        callback: &mut ObjectPropertyCallback<'_>,
    ) -> ProvResult<Status>;

    fn get_relation_properties(
        &self,
        id: RelationId,
        key: Option<&str>,
        callback: &mut RelationPropertyCallback<'_>,
    ) -> ProvResult<Status>;

    /// Stream objects carrying `key = value`; `NotFound` when there are none
    fn lookup_object_by_property(
        &self,
        key: &str,
        value: &str,
        callback: &mut ObjectPropertyCallback<'_>,
    ) -> ProvResult<Status>;

    /// Remove the bundle and everything it contains as one unit
    fn delete_bundle(&self, id: ObjectId) -> ProvResult<()>;

    fn get_bundle_objects(
        &self,
        id: ObjectId,
        callback: &mut ObjectInfoCallback<'_>,
    ) -> ProvResult<Status>;

    fn get_bundle_relations(
        &self,
        id: ObjectId,
        callback: &mut RelationCallback<'_>,
    ) -> ProvResult<Status>;

    /// Release every resource held by this backend handle
    fn destroy(&self) -> ProvResult<()>;
}
