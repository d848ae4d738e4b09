// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session bootstrap
//!
//! This module provides:
//! - Process identity discovery behind [`IdentityProvider`]
//! - Command line reconstruction from the raw argument vector
//! - Creation of the session record during attach

pub mod cmdline;
pub mod identity;

pub use identity::{format_mac, IdentityProvider, MacAddress, SystemIdentity};

use crate::backend::Backend;
use crate::error::{ProvError, ProvResult};
use crate::types::SessionId;
use log::{debug, warn};

/// Identity facts recorded in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub mac_address: Option<String>,
    pub user: String,
    pub pid: u32,
    pub program: String,
    pub cmdline: String,
}

impl ProcessIdentity {
    /// Gather identity from `provider`
    ///
    /// A missing user or executable path is a platform error; a missing
    /// hardware address only leaves the field empty.
    pub fn discover(provider: &dyn IdentityProvider) -> ProvResult<Self> {
        let user = provider
            .user()
            .ok_or_else(|| ProvError::platform("cannot determine the invoking user"))?;
        let program = provider
            .program()
            .ok_or_else(|| ProvError::platform("cannot determine the executable path"))?
            .to_string_lossy()
            .into_owned();
        let cmdline = cmdline::reconstruct(&provider.raw_args());

        let mac_address = provider.hardware_address().map(|mac| format_mac(&mac));
        if mac_address.is_none() {
            warn!("No hardware address found; session will not record one");
        }

        Ok(Self {
            mac_address,
            user,
            pid: provider.pid(),
            program,
            cmdline,
        })
    }
}

/// Discover identity and record it as a new session in `backend`
pub(crate) fn bootstrap(
    provider: &dyn IdentityProvider,
    backend: &dyn Backend,
) -> ProvResult<SessionId> {
    let identity = ProcessIdentity::discover(provider)?;
    debug!(
        "Creating session for user '{}' pid {} program '{}'",
        identity.user, identity.pid, identity.program
    );
    backend.create_session(
        identity.mac_address.as_deref(),
        &identity.user,
        identity.pid,
        &identity.program,
        &identity.cmdline,
    )
}
