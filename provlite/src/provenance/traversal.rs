// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Ancestor and descendant traversal

use super::{ensure_present, Provenance};
use crate::error::{ProvResult, Status};
use crate::types::{Direction, ObjectId, RelationEntry, TraversalFlags};

impl Provenance {
    /// Stream the edges leading to an object's ancestors or descendants
    ///
    /// Hop depth and de-duplication follow `flags` and are carried out by
    /// the backend, in the backend's order. An object without edges in the
    /// requested direction succeeds with plain [`Status::Ok`] and never
    /// calls `callback`.
    pub fn get_object_relations<F>(
        &self,
        id: ObjectId,
        direction: Direction,
        flags: TraversalFlags,
        mut callback: F,
    ) -> ProvResult<Status>
    where
        F: FnMut(&RelationEntry) -> ProvResult<()>,
    {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "object id")?;

        match backend.get_object_relations(id, direction, flags, &mut callback)? {
            Status::NoData => Ok(Status::Ok),
            status => Ok(status),
        }
    }
}
