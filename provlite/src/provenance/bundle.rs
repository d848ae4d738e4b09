// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Bundle operations
//!
//! A bundle is any object used as a container. Its members are the objects
//! and relations whose container leads back to it, directly or through
//! other members.

use super::{ensure_present, Provenance};
use crate::error::{ProvError, ProvResult, Status};
use crate::types::{ObjectId, ObjectInfo, PropertyEntry, RelationEntry};
use log::info;
use serde_json::{json, Value};

impl Provenance {
    /// Delete a bundle together with everything it contains
    ///
    /// The backend performs the cascade as one unit; no partial progress is
    /// reported or observable.
    pub fn delete_bundle(&self, id: ObjectId) -> ProvResult<()> {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "bundle id")?;
        backend.delete_bundle(id)?;
        info!("Deleted bundle {}", id);
        Ok(())
    }

    /// Stream the objects of a bundle, in backend order
    pub fn get_bundle_objects<F>(&self, id: ObjectId, mut callback: F) -> ProvResult<Status>
    where
        F: FnMut(&ObjectInfo) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "bundle id")?;
        backend.get_bundle_objects(id, &mut callback)
    }

    /// Stream the relations of a bundle as `from`/`to` rows
    pub fn get_bundle_relations<F>(&self, id: ObjectId, mut callback: F) -> ProvResult<Status>
    where
        F: FnMut(&RelationEntry) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "bundle id")?;
        backend.get_bundle_relations(id, &mut callback)
    }

    /// Export a bundle, its members, and their properties as JSON
    pub fn export_bundle_json(&self, id: ObjectId) -> ProvResult<Value> {
        let bundle = self.get_object_info(id)?;
        let mut bundle_value = to_json(&bundle)?;
        bundle_value["properties"] = properties_json(&self.object_properties(id, None)?);

        let mut objects = Vec::new();
        for object in self.bundle_objects(id)? {
            let mut value = to_json(&object)?;
            value["properties"] = properties_json(&self.object_properties(object.id, None)?);
            objects.push(value);
        }

        let mut relations = Vec::new();
        for relation in self.bundle_relations(id)? {
            let properties = self.relation_properties(relation.id, None)?;
            relations.push(json!({
                "id": relation.id,
                "from": relation.query_object_id,
                "to": relation.other_object_id,
                "type": relation.relation_type,
                "container_id": relation.container_id,
                "properties": properties_json(&properties),
            }));
        }

        Ok(json!({
            "bundle": bundle_value,
            "objects": objects,
            "relations": relations,
        }))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ProvResult<Value> {
    serde_json::to_value(value).map_err(|e| ProvError::internal(e.to_string()))
}

fn properties_json<I>(entries: &[PropertyEntry<I>]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|p| json!({ "key": p.key, "value": p.value }))
            .collect(),
    )
}
