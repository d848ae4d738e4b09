// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory backend implementation
//!
//! Non-durable reference store. Cloned handles share one store; each handle
//! is closed on its own by [`Backend::destroy`].

use super::{
    Backend, IdTimestampCallback, ObjectInfoCallback, ObjectPropertyCallback, RelationCallback,
    RelationPropertyCallback,
};
use crate::error::{Outcome, ProvError, ProvResult, Status};
use crate::types::{
    Direction, IdTimestamp, IterFlags, LookupFlags, ObjectId, ObjectInfo, PropertyEntry,
    RelationEntry, RelationId, RelationType, SessionId, SessionInfo, TraversalFlags,
};
use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct RelationRecord {
    id: RelationId,
    from: ObjectId,
    to: ObjectId,
    relation_type: RelationType,
    container: ObjectId,
}

impl RelationRecord {
    fn as_entry(&self) -> RelationEntry {
        RelationEntry {
            id: self.id,
            query_object_id: self.from,
            other_object_id: self.to,
            relation_type: self.relation_type,
            container_id: self.container,
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    last_session: u64,
    last_object: u64,
    last_relation: u64,
    sessions: BTreeMap<SessionId, SessionInfo>,
    objects: BTreeMap<ObjectId, ObjectInfo>,
    relations: BTreeMap<RelationId, RelationRecord>,
    object_properties: Vec<PropertyEntry<ObjectId>>,
    relation_properties: Vec<PropertyEntry<RelationId>>,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl Store {
    fn require_object(&self, id: ObjectId) -> ProvResult<&ObjectInfo> {
        self.objects.get(&id).ok_or(ProvError::NotFound)
    }

    /// Objects whose container chain reaches `bundle`, excluding the bundle
    fn bundle_members(&self, bundle: ObjectId) -> BTreeSet<ObjectId> {
        let mut members = BTreeSet::new();
        let mut frontier = VecDeque::from([bundle]);
        while let Some(container) = frontier.pop_front() {
            for info in self.objects.values() {
                if info.container_id == container
                    && info.id != bundle
                    && members.insert(info.id)
                {
                    frontier.push_back(info.id);
                }
            }
        }
        members
    }

    fn bundle_relations(&self, bundle: ObjectId, members: &BTreeSet<ObjectId>) -> Vec<RelationId> {
        self.relations
            .values()
            .filter(|r| r.container == bundle || members.contains(&r.container))
            .map(|r| r.id)
            .collect()
    }

    fn traverse(
        &self,
        id: ObjectId,
        direction: Direction,
        flags: TraversalFlags,
    ) -> Vec<RelationEntry> {
        let transitive = flags.contains(TraversalFlags::TRANSITIVE);
        let distinct = flags.contains(TraversalFlags::DISTINCT_OBJECTS);

        let mut rows = Vec::new();
        let mut expanded = HashSet::from([id]);
        // Under DISTINCT_OBJECTS the query object itself is never reported
        let mut reported = HashSet::from([id]);
        let mut frontier = VecDeque::from([id]);

        while let Some(current) = frontier.pop_front() {
            for relation in self.relations.values() {
                let other = match direction {
                    Direction::Ancestors if relation.from == current => relation.to,
                    Direction::Descendants if relation.to == current => relation.from,
                    _ => continue,
                };
                if distinct && !reported.insert(other) {
                    continue;
                }
                rows.push(RelationEntry {
                    id: relation.id,
                    query_object_id: current,
                    other_object_id: other,
                    relation_type: relation.relation_type,
                    container_id: relation.container,
                });
                if transitive && expanded.insert(other) {
                    frontier.push_back(other);
                }
            }
        }
        rows
    }
}

/// Feed snapshotted rows to a callback, stopping at its first error
fn stream<T, F>(
    rows: Vec<T>,
    callback: &mut F,
    when_empty: ProvResult<Status>,
) -> ProvResult<Status>
where
    F: FnMut(&T) -> ProvResult<()> + ?Sized,
{
    if rows.is_empty() {
        return when_empty;
    }
    for row in &rows {
        callback(row)?;
    }
    Ok(Status::Ok)
}

/// In-memory provenance store
#[derive(Debug)]
pub struct MemoryBackend {
    store: Arc<RwLock<Store>>,
    closed: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryBackend {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            closed: AtomicBool::new(false),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn object_count(&self) -> usize {
        self.store.read().objects.len()
    }

    pub fn relation_count(&self) -> usize {
        self.store.read().relations.len()
    }

    pub fn session_count(&self) -> usize {
        self.store.read().sessions.len()
    }

    fn ensure_open(&self) -> ProvResult<()> {
        if self.is_closed() {
            return Err(ProvError::DbConnection(
                "memory backend handle has been destroyed".to_string(),
            ));
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn create_session(
        &self,
        mac_address: Option<&str>,
        user: &str,
        pid: u32,
        program: &str,
        cmdline: &str,
    ) -> ProvResult<SessionId> {
        self.ensure_open()?;
        let mut store = self.store.write();
        let id = SessionId::new(next_id(&mut store.last_session));
        store.sessions.insert(
            id,
            SessionInfo {
                id,
                mac_address: mac_address.map(str::to_string),
                user: user.to_string(),
                pid,
                program: program.to_string(),
                cmdline: cmdline.to_string(),
                start_time: now(),
            },
        );
        Ok(id)
    }

    fn create_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        container: ObjectId,
        session: SessionId,
    ) -> ProvResult<ObjectId> {
        self.ensure_open()?;
        let mut store = self.store.write();
        if !container.is_none() {
            store.require_object(container)?;
        }
        let id = ObjectId::new(next_id(&mut store.last_object));
        store.objects.insert(
            id,
            ObjectInfo {
                id,
                creation_session: session,
                creation_time: now(),
                originator: originator.to_string(),
                name: name.to_string(),
                object_type: object_type.to_string(),
                container_id: container,
            },
        );
        Ok(id)
    }

    fn lookup_object(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
    ) -> ProvResult<ObjectId> {
        self.ensure_open()?;
        let store = self.store.read();
        store
            .objects
            .values()
            .rev()
            .find(|o| o.originator == originator && o.name == name && o.object_type == object_type)
            .map(|o| o.id)
            .ok_or(ProvError::NotFound)
    }

    fn lookup_object_ext(
        &self,
        originator: &str,
        name: &str,
        object_type: &str,
        flags: LookupFlags,
        callback: &mut IdTimestampCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let mut rows: Vec<IdTimestamp> = {
            let store = self.store.read();
            store
                .objects
                .values()
                .filter(|o| {
                    o.originator == originator && o.name == name && o.object_type == object_type
                })
                .map(|o| IdTimestamp {
                    id: o.id,
                    timestamp: o.creation_time,
                })
                .collect()
        };
        rows.sort_by_key(|row| (row.timestamp, row.id));
        if flags.contains(LookupFlags::NEWEST_FIRST) {
            rows.reverse();
        }
        stream(rows, callback, Err(ProvError::NotFound))
    }

    fn add_object_property(&self, id: ObjectId, key: &str, value: &str) -> ProvResult<()> {
        self.ensure_open()?;
        let mut store = self.store.write();
        store.require_object(id)?;
        store.object_properties.push(PropertyEntry {
            id,
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn add_relation_property(&self, id: RelationId, key: &str, value: &str) -> ProvResult<()> {
        self.ensure_open()?;
        let mut store = self.store.write();
        if !store.relations.contains_key(&id) {
            return Err(ProvError::NotFound);
        }
        store.relation_properties.push(PropertyEntry {
            id,
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn add_relation(
        &self,
        from: ObjectId,
        to: ObjectId,
        relation_type: RelationType,
        container: ObjectId,
    ) -> ProvResult<Outcome<RelationId>> {
        self.ensure_open()?;
        let mut store = self.store.write();
        store.require_object(from)?;
        store.require_object(to)?;
        store.require_object(container)?;

        let existing = store.relations.values().find(|r| {
            r.from == from
                && r.to == to
                && r.relation_type == relation_type
                && r.container == container
        });
        if let Some(existing) = existing {
            debug!("Relation {} -> {} already recorded as {}", from, to, existing.id);
            return Ok(Outcome::new(existing.id, Status::DuplicateIgnored));
        }

        let id = RelationId::new(next_id(&mut store.last_relation));
        store.relations.insert(
            id,
            RelationRecord {
                id,
                from,
                to,
                relation_type,
                container,
            },
        );
        Ok(Outcome::ok(id))
    }

    fn get_session_info(&self, id: SessionId) -> ProvResult<SessionInfo> {
        self.ensure_open()?;
        self.store
            .read()
            .sessions
            .get(&id)
            .cloned()
            .ok_or(ProvError::NotFound)
    }

    fn get_object_info(&self, id: ObjectId) -> ProvResult<ObjectInfo> {
        self.ensure_open()?;
        self.store.read().require_object(id).cloned()
    }

    fn get_all_objects(
        &self,
        flags: IterFlags,
        callback: &mut ObjectInfoCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let rows: Vec<ObjectInfo> = {
            let store = self.store.read();
            store
                .objects
                .values()
                .cloned()
                .map(|mut info| {
                    if flags.contains(IterFlags::NO_CREATION_SESSION) {
                        info.creation_session = SessionId::NONE;
                    }
                    info
                })
                .collect()
        };
        stream(rows, callback, Ok(Status::NoData))
    }

    fn get_object_relations(
        &self,
        id: ObjectId,
        direction: Direction,
        flags: TraversalFlags,
        callback: &mut RelationCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let rows = {
            let store = self.store.read();
            store.require_object(id)?;
            store.traverse(id, direction, flags)
        };
        stream(rows, callback, Ok(Status::NoData))
    }

    fn get_object_properties(
        &self,
        id: ObjectId,
        key: Option<&str>,
        callback: &mut ObjectPropertyCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let rows: Vec<PropertyEntry<ObjectId>> = {
            let store = self.store.read();
            store.require_object(id)?;
            store
                .object_properties
                .iter()
                .filter(|p| p.id == id && key.map_or(true, |k| p.key == k))
                .cloned()
                .collect()
        };
        stream(rows, callback, Ok(Status::NoData))
    }

    fn get_relation_properties(
        &self,
        id: RelationId,
        key: Option<&str>,
        callback: &mut RelationPropertyCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let rows: Vec<PropertyEntry<RelationId>> = {
            let store = self.store.read();
            if !store.relations.contains_key(&id) {
                return Err(ProvError::NotFound);
            }
            store
                .relation_properties
                .iter()
                .filter(|p| p.id == id && key.map_or(true, |k| p.key == k))
                .cloned()
                .collect()
        };
        stream(rows, callback, Ok(Status::NoData))
    }

    fn lookup_object_by_property(
        &self,
        key: &str,
        value: &str,
        callback: &mut ObjectPropertyCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let rows: Vec<PropertyEntry<ObjectId>> = {
            let store = self.store.read();
            store
                .object_properties
                .iter()
                .filter(|p| p.key == key && p.value == value)
                .cloned()
                .collect()
        };
        stream(rows, callback, Err(ProvError::NotFound))
    }

    fn delete_bundle(&self, id: ObjectId) -> ProvResult<()> {
        self.ensure_open()?;
        let mut store = self.store.write();
        store.require_object(id)?;

        let mut doomed = store.bundle_members(id);
        doomed.insert(id);
        let doomed_relations: HashSet<RelationId> = store
            .relations
            .values()
            .filter(|r| {
                doomed.contains(&r.container) || doomed.contains(&r.from) || doomed.contains(&r.to)
            })
            .map(|r| r.id)
            .collect();

        store.objects.retain(|oid, _| !doomed.contains(oid));
        store.relations.retain(|rid, _| !doomed_relations.contains(rid));
        store.object_properties.retain(|p| !doomed.contains(&p.id));
        store
            .relation_properties
            .retain(|p| !doomed_relations.contains(&p.id));

        debug!(
            "Deleted bundle {} with {} objects and {} relations",
            id,
            doomed.len(),
            doomed_relations.len()
        );
        Ok(())
    }

    fn get_bundle_objects(
        &self,
        id: ObjectId,
        callback: &mut ObjectInfoCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let rows: Vec<ObjectInfo> = {
            let store = self.store.read();
            store
                .bundle_members(id)
                .iter()
                .filter_map(|oid| store.objects.get(oid).cloned())
                .collect()
        };
        stream(rows, callback, Ok(Status::NoData))
    }

    fn get_bundle_relations(
        &self,
        id: ObjectId,
        callback: &mut RelationCallback<'_>,
    ) -> ProvResult<Status> {
        self.ensure_open()?;
        let rows: Vec<RelationEntry> = {
            let store = self.store.read();
            let members = store.bundle_members(id);
            store
                .bundle_relations(id, &members)
                .iter()
                .filter_map(|rid| store.relations.get(rid).map(RelationRecord::as_entry))
                .collect()
        };
        stream(rows, callback, Ok(Status::NoData))
    }

    fn destroy(&self) -> ProvResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Memory backend handle destroyed");
        }
        Ok(())
    }
}
