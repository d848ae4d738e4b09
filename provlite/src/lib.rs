// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! ProvLite - backend-agnostic provenance core
//!
//! Records a directed lineage graph (objects, typed relations, key/value
//! properties, bundles, and the session that created each fact) and hands
//! durable storage to a pluggable [`Backend`].
//!
//! # Quick Start
//!
//! ```no_run
//! use provlite::{MemoryBackend, ObjectId, Provenance, RelationType, Status};
//!
//! # fn main() -> provlite::ProvResult<()> {
//! let prov = Provenance::new();
//! prov.attach(Box::new(MemoryBackend::new()))?;
//!
//! let bundle = prov.create_object("org.example", "run-1", "bundle", ObjectId::NONE)?.value;
//! let input = prov.lookup_or_create_object("org.example", "in.csv", "file", bundle)?;
//! let output = prov.create_object("org.example", "out.csv", "file", bundle)?;
//! assert_eq!(output.status, Status::ObjectCreated);
//!
//! prov.add_relation(output.value, input.value, RelationType::WAS_DERIVED_FROM, bundle)?;
//! prov.detach()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Return codes
//!
//! Results carry refined successes ([`Status`]) and failures ([`ProvError`]),
//! both with stable signed codes; see [`return_code`] and [`error_string`].

pub mod backend;
pub mod config;
pub mod error;
pub mod lock;
pub mod provenance;
pub mod session;
pub mod types;

pub use backend::{Backend, MemoryBackend};
pub use config::ProvConfig;
pub use error::{error_string, is_ok, return_code, Outcome, ProvError, ProvResult, Status};
pub use provenance::{global, Provenance};
pub use session::{IdentityProvider, MacAddress, SystemIdentity};
pub use types::{
    Direction, IdTimestamp, IterFlags, LookupFlags, ObjectId, ObjectInfo, PropertyEntry,
    RelationEntry, RelationId, RelationType, SessionId, SessionInfo, TraversalFlags,
};
