// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Return code taxonomy
//!
//! Every public operation reports exactly one signed code:
//! - non-negative codes are successes, refined by [`Status`]
//! - negative codes are failures, described by [`ProvError`]
//!
//! Callers that only care about success test the sign with [`is_ok`];
//! callers that care about the refinement match on the exact [`Status`].

use crate::types::{ObjectId, ObjectInfo, RelationId, SessionId, SessionInfo};
use thiserror::Error;

/// Highest known success code
pub const LAST_SUCCESS_CODE: i32 = 3;

/// Lowest known error code
pub const LAST_ERROR_CODE: i32 = -17;

/// Success descriptions indexed by code
const STATUS_STRINGS: [&str; 4] = [
    "Success",
    "Success (duplicate ignored)",
    "Success (no data available)",
    "Success (object created)",
];

/// Error descriptions indexed by negated code
const ERROR_STRINGS: [&str; 18] = [
    "Success",
    "Invalid argument",
    "Insufficient resources",
    "Database connection error",
    "Not implemented",
    "Already initialized",
    "Not initialized",
    "Failed to prepare a statement",
    "Statement execution error",
    "Internal error",
    "Backend internal error",
    "Not found",
    "Already exists",
    "Platform error",
    "Invalid version",
    "Database returned a NULL value",
    "Key not found in the database",
    "Database returned a value of an invalid type",
];

/// Refined success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Status {
    /// Plain success
    #[default]
    Ok = 0,
    /// The write was a duplicate and nothing new was recorded
    DuplicateIgnored = 1,
    /// The operation succeeded but produced no rows
    NoData = 2,
    /// A new object was created
    ObjectCreated = 3,
}

impl Status {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Status::Ok),
            1 => Some(Status::DuplicateIgnored),
            2 => Some(Status::NoData),
            3 => Some(Status::ObjectCreated),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        STATUS_STRINGS[self.code() as usize]
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Failure codes
///
/// Variants carrying a message keep the backend's own wording; the code
/// returned by [`ProvError::code`] is what callers branch on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient resources")]
    InsufficientResources,

    #[error("Database connection error: {0}")]
    DbConnection(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Already initialized")]
    AlreadyInitialized,

    #[error("Not initialized")]
    NotInitialized,

    #[error("Failed to prepare a statement: {0}")]
    PrepareStatement(String),

    #[error("Statement execution error: {0}")]
    Statement(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Backend internal error: {0}")]
    BackendInternal(String),

    #[error("Not found")]
    NotFound,

    #[error("Already exists")]
    AlreadyExists,

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Invalid version")]
    InvalidVersion,

    #[error("Database returned a NULL value")]
    DbNull,

    #[error("Key not found in the database")]
    DbKeyNotFound,

    #[error("Database returned a value of an invalid type")]
    DbInvalidType,
}

impl ProvError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ProvError::InvalidArgument(msg.into())
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        ProvError::Platform(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ProvError::Internal(msg.into())
    }

    /// The stable negative code of this failure
    pub fn code(&self) -> i32 {
        match self {
            ProvError::InvalidArgument(_) => -1,
            ProvError::InsufficientResources => -2,
            ProvError::DbConnection(_) => -3,
            ProvError::NotImplemented(_) => -4,
            ProvError::AlreadyInitialized => -5,
            ProvError::NotInitialized => -6,
            ProvError::PrepareStatement(_) => -7,
            ProvError::Statement(_) => -8,
            ProvError::Internal(_) => -9,
            ProvError::BackendInternal(_) => -10,
            ProvError::NotFound => -11,
            ProvError::AlreadyExists => -12,
            ProvError::Platform(_) => -13,
            ProvError::InvalidVersion => -14,
            ProvError::DbNull => -15,
            ProvError::DbKeyNotFound => -16,
            ProvError::DbInvalidType => -17,
        }
    }

    /// Rebuild a failure from its numeric code
    ///
    /// Backends that speak in raw codes use this to surface their failures
    /// unchanged. Returns `None` for success codes and unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        let msg = || error_string(code).to_string();
        let err = match code {
            -1 => ProvError::InvalidArgument(msg()),
            -2 => ProvError::InsufficientResources,
            -3 => ProvError::DbConnection(msg()),
            -4 => ProvError::NotImplemented(msg()),
            -5 => ProvError::AlreadyInitialized,
            -6 => ProvError::NotInitialized,
            -7 => ProvError::PrepareStatement(msg()),
            -8 => ProvError::Statement(msg()),
            -9 => ProvError::Internal(msg()),
            -10 => ProvError::BackendInternal(msg()),
            -11 => ProvError::NotFound,
            -12 => ProvError::AlreadyExists,
            -13 => ProvError::Platform(msg()),
            -14 => ProvError::InvalidVersion,
            -15 => ProvError::DbNull,
            -16 => ProvError::DbKeyNotFound,
            -17 => ProvError::DbInvalidType,
            _ => return None,
        };
        Some(err)
    }
}

impl From<std::io::Error> for ProvError {
    fn from(e: std::io::Error) -> Self {
        ProvError::Platform(e.to_string())
    }
}

/// Result type for provenance operations
pub type ProvResult<T> = Result<T, ProvError>;

/// A value together with the refined success code that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub status: Status,
}

impl<T> Outcome<T> {
    pub fn new(value: T, status: Status) -> Self {
        Self { value, status }
    }

    pub fn ok(value: T) -> Self {
        Self::new(value, Status::Ok)
    }

    pub fn created(value: T) -> Self {
        Self::new(value, Status::ObjectCreated)
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Successful values that know which success code they stand for
pub trait Reported {
    fn status(&self) -> Status {
        Status::Ok
    }
}

impl Reported for () {}

impl Reported for Status {
    fn status(&self) -> Status {
        *self
    }
}

impl<T> Reported for Outcome<T> {
    fn status(&self) -> Status {
        self.status
    }
}

// Plain values carry no refinement
impl Reported for ObjectId {}
impl Reported for RelationId {}
impl Reported for SessionId {}
impl Reported for ObjectInfo {}
impl Reported for SessionInfo {}
impl Reported for serde_json::Value {}
impl<T> Reported for Vec<T> {}

/// Collapse a result into its signed return code
pub fn return_code<T: Reported>(result: &ProvResult<T>) -> i32 {
    match result {
        Ok(value) => value.status().code(),
        Err(e) => e.code(),
    }
}

/// Success test on a raw code
pub const fn is_ok(code: i32) -> bool {
    code >= 0
}

/// Describe any return code
///
/// Total over `i32`: codes outside the known ranges map to a fixed fallback.
pub fn error_string(code: i32) -> &'static str {
    if is_ok(code) {
        if code <= LAST_SUCCESS_CODE {
            return STATUS_STRINGS[code as usize];
        }
        "Success (unknown success code)"
    } else {
        if code >= LAST_ERROR_CODE {
            return ERROR_STRINGS[code.unsigned_abs() as usize];
        }
        "Unknown error"
    }
}
