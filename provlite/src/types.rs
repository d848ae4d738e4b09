// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Provenance data model
//!
//! Identifiers, flag sets, traversal direction, and the owned records that
//! backends hand back to callers.

use crate::error::ProvError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// No entity; never a valid reference
            pub const NONE: Self = Self(0);

            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            pub const fn is_none(self) -> bool {
                self.0 == 0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id_type!(
    /// Object identifier
    ObjectId
);
define_id_type!(
    /// Relation identifier
    RelationId
);
define_id_type!(
    /// Session identifier
    SessionId
);

/// Typed dependency kind carried by a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationType(pub i32);

impl RelationType {
    pub const ALTERNATE_OF: Self = Self(1);
    pub const DERIVED_BY_INSERTION_FROM: Self = Self(2);
    pub const DERIVED_BY_REMOVAL_FROM: Self = Self(3);
    pub const HAD_MEMBER: Self = Self(4);
    pub const HAD_DICTIONARY_MEMBER: Self = Self(5);
    pub const SPECIALIZATION_OF: Self = Self(6);
    pub const WAS_DERIVED_FROM: Self = Self(7);
    pub const WAS_GENERATED_BY: Self = Self(8);
    pub const WAS_INVALIDATED_BY: Self = Self(9);
    pub const WAS_ATTRIBUTED_TO: Self = Self(10);
    pub const USED: Self = Self(11);
    pub const WAS_INFORMED_BY: Self = Self(12);
    pub const WAS_STARTED_BY: Self = Self(13);
    pub const WAS_ENDED_BY: Self = Self(14);
    pub const HAD_PLAN: Self = Self(15);
    pub const ACTED_ON_BEHALF_OF: Self = Self(16);
    pub const WAS_ASSOCIATED_WITH: Self = Self(17);
    pub const WAS_INFLUENCED_BY: Self = Self(18);
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traversal direction relative to the query object
///
/// A relation `from -> to` records that `from` depends on `to`, so the
/// ancestors of an object are found along its outgoing edges and the
/// descendants along its incoming ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Ancestors = 0,
    Descendants = 1,
}

impl TryFrom<i32> for Direction {
    type Error = ProvError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Direction::Ancestors),
            1 => Ok(Direction::Descendants),
            other => Err(ProvError::invalid_argument(format!(
                "unknown traversal direction {}",
                other
            ))),
        }
    }
}

macro_rules! define_flags {
    ($(#[$doc:meta])* $name:ident { $($(#[$fdoc:meta])* $flag:ident = $bit:expr),* $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u32);

        impl $name {
            $($(#[$fdoc])* pub const $flag: Self = Self($bit);)*

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

define_flags!(
    /// Flags for `lookup_object_ext`
    LookupFlags {
        /// Report an empty match set as `NoData` instead of `NotFound`
        NO_FAIL = 1,
        /// Stream matches newest first
        NEWEST_FIRST = 2,
    }
);

define_flags!(
    /// Flags for `get_object_relations`
    TraversalFlags {
        /// Follow edges past the first hop
        TRANSITIVE = 1,
        /// Report each other-object at most once
        DISTINCT_OBJECTS = 2,
    }
);

define_flags!(
    /// Flags for `get_all_objects`
    IterFlags {
        /// Leave `creation_session` as `NONE` in streamed rows
        NO_CREATION_SESSION = 1,
    }
);

/// Session detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub mac_address: Option<String>,
    pub user: String,
    pub pid: u32,
    pub program: String,
    pub cmdline: String,
    /// Unix seconds
    pub start_time: i64,
}

/// Object detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub creation_session: SessionId,
    /// Unix seconds
    pub creation_time: i64,
    pub originator: String,
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub container_id: ObjectId,
}

/// One match of `lookup_object_ext`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTimestamp {
    pub id: ObjectId,
    pub timestamp: i64,
}

/// One streamed relation row
///
/// For traversal, `query_object_id` is the object whose edge was followed
/// and `other_object_id` the object on the far end. For bundle listings they
/// are the `from` and `to` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry {
    pub id: RelationId,
    pub query_object_id: ObjectId,
    pub other_object_id: ObjectId,
    pub relation_type: RelationType,
    pub container_id: ObjectId,
}

/// One streamed property row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntry<I> {
    pub id: I,
    pub key: String,
    pub value: String,
}
