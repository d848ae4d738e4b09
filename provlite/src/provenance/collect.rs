// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Collecting variants of the streaming operations
//!
//! Each helper drains one streaming call into a `Vec`. `NoData` yields an
//! empty vector; failures are returned unchanged.

use super::Provenance;
use crate::error::{ProvError, ProvResult};
use crate::types::{
    Direction, IdTimestamp, IterFlags, LookupFlags, ObjectId, ObjectInfo, PropertyEntry,
    RelationEntry, RelationId, TraversalFlags,
};

impl Provenance {
    pub fn lookup_object_matches(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        flags: LookupFlags,
    ) -> ProvResult<Vec<IdTimestamp>> {
        let mut rows = Vec::new();
        self.lookup_object_ext(originator, name, object_type, flags, |row| {
            rows.push(*row);
            Ok(())
        })?;
        Ok(rows)
    }

    pub fn all_objects(&self, flags: IterFlags) -> ProvResult<Vec<ObjectInfo>> {
        let mut rows = Vec::new();
        self.get_all_objects(flags, |info| {
            rows.push(info.clone());
            Ok(())
        })?;
        Ok(rows)
    }

    pub fn object_relations(
        &self,
        id: ObjectId,
        direction: Direction,
        flags: TraversalFlags,
    ) -> ProvResult<Vec<RelationEntry>> {
        let mut rows = Vec::new();
        self.get_object_relations(id, direction, flags, |entry| {
            rows.push(*entry);
            Ok(())
        })?;
        Ok(rows)
    }

    pub fn object_properties(
        &self,
        id: ObjectId,
        key: Option<&str>,
    ) -> ProvResult<Vec<PropertyEntry<ObjectId>>> {
        let mut rows = Vec::new();
        self.get_object_properties(id, key, |entry| {
            rows.push(entry.clone());
            Ok(())
        })?;
        Ok(rows)
    }

    pub fn relation_properties(
        &self,
        id: RelationId,
        key: Option<&str>,
    ) -> ProvResult<Vec<PropertyEntry<RelationId>>> {
        let mut rows = Vec::new();
        self.get_relation_properties(id, key, |entry| {
            rows.push(entry.clone());
            Ok(())
        })?;
        Ok(rows)
    }

    /// Ids of objects carrying `key = value`; empty when nothing matches
    pub fn objects_with_property(&self, key: &str, value: &str) -> ProvResult<Vec<ObjectId>> {
        let mut ids = Vec::new();
        let result = self.lookup_object_by_property(key, value, |entry| {
            ids.push(entry.id);
            Ok(())
        });
        match result {
            Ok(_) | Err(ProvError::NotFound) => Ok(ids),
            Err(e) => Err(e),
        }
    }

    pub fn bundle_objects(&self, id: ObjectId) -> ProvResult<Vec<ObjectInfo>> {
        let mut rows = Vec::new();
        self.get_bundle_objects(id, |info| {
            rows.push(info.clone());
            Ok(())
        })?;
        Ok(rows)
    }

    pub fn bundle_relations(&self, id: ObjectId) -> ProvResult<Vec<RelationEntry>> {
        let mut rows = Vec::new();
        self.get_bundle_relations(id, |entry| {
            rows.push(*entry);
            Ok(())
        })?;
        Ok(rows)
    }
}
