// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Object, relation, and property operations

use super::{ensure_present, Provenance};
use crate::error::{Outcome, ProvError, ProvResult, Status};
use crate::types::{
    IdTimestamp, IterFlags, LookupFlags, ObjectId, ObjectInfo, PropertyEntry, RelationId,
    RelationType,
};
use log::debug;

impl Provenance {
    /// Create an object in the current session
    ///
    /// Succeeds with [`Status::ObjectCreated`]. `container` may be `NONE`;
    /// whether a given container exists is for the backend to decide.
    pub fn create_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        container: ObjectId,
    ) -> ProvResult<Outcome<ObjectId>> {
        let backend = self.backend()?;
        let id = backend.create_object(
            originator,
            name,
            object_type,
            container,
            self.current_session(),
        )?;
        debug!("Created object {} ({}:{}:{})", id, originator, name, object_type);
        Ok(Outcome::created(id))
    }

    /// Most recently created object with this originator, name, and type
    pub fn lookup_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
    ) -> ProvResult<ObjectId> {
        let backend = self.backend()?;
        backend.lookup_object(originator, name, object_type)
    }

    /// Stream every match as (id, creation time)
    ///
    /// With [`LookupFlags::NO_FAIL`] an empty match set succeeds with
    /// [`Status::NoData`] instead of failing with `NotFound`.
    pub fn lookup_object_ext<F>(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        flags: LookupFlags,
        mut callback: F,
    ) -> ProvResult<Status>
    where
        F: FnMut(&IdTimestamp) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        match backend.lookup_object_ext(originator, name, object_type, flags, &mut callback) {
            Err(ProvError::NotFound) if flags.contains(LookupFlags::NO_FAIL) => Ok(Status::NoData),
            other => other,
        }
    }

    /// Append a property to an object; existing values are kept
    pub fn add_object_property(&self, id: ObjectId, key: &str, value: &str) -> ProvResult<()> {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "object id")?;
        backend.add_object_property(id, key, value)
    }

    /// Append a property to a relation; existing values are kept
    pub fn add_relation_property(&self, id: RelationId, key: &str, value: &str) -> ProvResult<()> {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "relation id")?;
        backend.add_relation_property(id, key, value)
    }

    /// Record a `from -> to` dependency inside `container`
    ///
    /// An identical edge already on record succeeds with
    /// [`Status::DuplicateIgnored`] and the existing id, when the backend
    /// deduplicates.
    pub fn add_relation(
        &self,
        from: ObjectId,
        to: ObjectId,
        relation_type: RelationType,
        container: ObjectId,
    ) -> ProvResult<Outcome<RelationId>> {
        let backend = self.backend()?;
        ensure_present(from.is_none(), "relation source")?;
        ensure_present(to.is_none(), "relation target")?;
        ensure_present(container.is_none(), "relation container")?;

        let outcome = backend.add_relation(from, to, relation_type, container)?;
        debug!(
            "Relation {} -> {} type {} recorded as {} ({})",
            from, to, relation_type, outcome.value, outcome.status
        );
        Ok(outcome)
    }

    pub fn get_object_info(&self, id: ObjectId) -> ProvResult<ObjectInfo> {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "object id")?;
        backend.get_object_info(id)
    }

    /// Stream every object in the store
    pub fn get_all_objects<F>(&self, flags: IterFlags, mut callback: F) -> ProvResult<Status>
    where
        F: FnMut(&ObjectInfo) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        backend.get_all_objects(flags, &mut callback)
    }

    /// Stream an object's properties, restricted to `key` when given
    pub fn get_object_properties<F>(
        &self,
        id: ObjectId,
        key: Option<&str>,
        mut callback: F,
    ) -> ProvResult<Status>
    where
        F: FnMut(&PropertyEntry<ObjectId>) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "object id")?;
        backend.get_object_properties(id, key, &mut callback)
    }

    /// Stream a relation's properties, restricted to `key` when given
    pub fn get_relation_properties<F>(
        &self,
        id: RelationId,
        key: Option<&str>,
        mut callback: F,
    ) -> ProvResult<Status>
    where
        F: FnMut(&PropertyEntry<RelationId>) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "relation id")?;
        backend.get_relation_properties(id, key, &mut callback)
    }

    /// Stream objects carrying the property `key = value`
    pub fn lookup_object_by_property<F>(
        &self,
        key: &str,
        value: &str,
        mut callback: F,
    ) -> ProvResult<Status>
    where
        F: FnMut(&PropertyEntry<ObjectId>) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        backend.lookup_object_by_property(key, value, &mut callback)
    }
}
