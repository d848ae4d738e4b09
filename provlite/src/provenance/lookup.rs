// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Atomic lookup-or-create
//!
//! One named lock covers every key, so unrelated keys serialize against
//! each other too. The lock guard is dropped on every return path.

use super::Provenance;
use crate::error::{Outcome, ProvError, ProvResult};
use crate::types::ObjectId;
use log::debug;

impl Provenance {
    /// Return the latest object with this key, creating it if there is none
    ///
    /// Across every thread and process sharing the lock, exactly one caller
    /// creates a missing object and gets [`crate::Status::ObjectCreated`];
    /// the others find it and get plain success. A lookup failure other
    /// than `NotFound` is returned as-is without attempting creation.
    pub fn lookup_or_create_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        container: ObjectId,
    ) -> ProvResult<Outcome<ObjectId>> {
        let shared_lock = self.shared_lock()?;
        let _held = shared_lock.acquire()?;

        match self.lookup_object(originator, name, object_type) {
            Ok(id) => {
                debug!("lookup-or-create found {} for {}:{}", id, originator, name);
                Ok(Outcome::ok(id))
            }
            Err(ProvError::NotFound) => {
                let created = self.create_object(originator, name, object_type, container)?;
                debug!(
                    "lookup-or-create created {} for {}:{}",
                    created.value, originator, name
                );
                Ok(created)
            }
            Err(e) => Err(e),
        }
    }
}
