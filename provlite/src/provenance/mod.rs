// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Provenance context and lifecycle
//!
//! A [`Provenance`] value owns the attachment state: one backend, one
//! session, one lookup-or-create lock handle. It moves through
//! `Uninitialized -> Attached -> Detached`; every data operation first checks
//! that it is attached and fails with `NotInitialized` otherwise.
//!
//! `attach` and `detach` are not reentrant. Callers must not run them
//! concurrently with each other or with data operations; the internal locks
//! only keep such misuse memory-safe, they do not make it well-defined.

mod bundle;
mod collect;
mod lookup;
mod objects;
mod traversal;

use crate::backend::Backend;
use crate::config::ProvConfig;
use crate::error::{ProvError, ProvResult};
use crate::lock::{self, SharedLock};
use crate::session::{self, IdentityProvider, SystemIdentity};
use crate::types::{SessionId, SessionInfo};
use log::{info, warn};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static GLOBAL: Lazy<Provenance> = Lazy::new(Provenance::new);

/// Process-wide context, configured from the environment on first use
pub fn global() -> &'static Provenance {
    &GLOBAL
}

/// Attachment state and entry point for every provenance operation
pub struct Provenance {
    config: ProvConfig,
    identity: Box<dyn IdentityProvider>,
    attached: AtomicBool,
    backend: RwLock<Option<Arc<dyn Backend>>>,
    session: AtomicU64,
    lookup_lock: Mutex<Option<Arc<SharedLock>>>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provenance")
            .field("config", &self.config)
            .field("attached", &self.is_attached())
            .field("session", &self.session.load(Ordering::Acquire))
            .finish()
    }
}

impl Provenance {
    /// Context configured from the environment
    pub fn new() -> Self {
        Self::with_config(ProvConfig::from_env())
    }

    pub fn with_config(config: ProvConfig) -> Self {
        Self {
            config,
            identity: Box::new(SystemIdentity),
            attached: AtomicBool::new(false),
            backend: RwLock::new(None),
            session: AtomicU64::new(SessionId::NONE.get()),
            lookup_lock: Mutex::new(None),
        }
    }

    /// Replace the identity source used by the session bootstrap
    pub fn with_identity(mut self, identity: impl IdentityProvider + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    pub fn config(&self) -> &ProvConfig {
        &self.config
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Attach to `backend` and record this process's session
    ///
    /// Sequence: lock subsystem, session bootstrap, lookup-or-create lock.
    /// Any failure empties the backend slot again before returning.
    pub fn attach(&self, backend: Box<dyn Backend>) -> ProvResult<()> {
        if self.is_attached() {
            return Err(ProvError::AlreadyInitialized);
        }

        let backend: Arc<dyn Backend> = Arc::from(backend);
        {
            let mut slot = self.backend.write();
            if slot.is_some() {
                return Err(ProvError::internal(
                    "backend slot occupied while not attached",
                ));
            }
            *slot = Some(Arc::clone(&backend));
        }

        match self.bring_up(backend.as_ref()) {
            Ok((session, shared_lock)) => {
                self.session.store(session.get(), Ordering::Release);
                *self.lookup_lock.lock() = Some(Arc::new(shared_lock));
                self.attached.store(true, Ordering::Release);
                info!("Attached provenance backend, session {}", session);
                Ok(())
            }
            Err(e) => {
                *self.backend.write() = None;
                warn!("Attach failed: {}", e);
                Err(e)
            }
        }
    }

    fn bring_up(&self, backend: &dyn Backend) -> ProvResult<(SessionId, SharedLock)> {
        lock::initialize(&self.config)?;
        let session = session::bootstrap(self.identity.as_ref(), backend)?;
        let shared_lock = SharedLock::from_config(&self.config)?;
        Ok((session, shared_lock))
    }

    /// Release the backend, the session, and the lookup-or-create lock handle
    ///
    /// The attached flag is cleared first so racing callers fail fast.
    pub fn detach(&self) -> ProvResult<()> {
        if !self.attached.swap(false, Ordering::AcqRel) {
            return Err(ProvError::NotInitialized);
        }

        let backend = self.backend.write().take();
        let destroyed = match backend {
            Some(backend) => backend.destroy(),
            None => Ok(()),
        };

        // Closing the handle releases this context's hold on the lock file
        self.lookup_lock.lock().take();
        self.session.store(SessionId::NONE.get(), Ordering::Release);

        match &destroyed {
            Ok(()) => info!("Detached provenance backend"),
            Err(e) => warn!("Backend reported an error while detaching: {}", e),
        }
        destroyed
    }

    /// The attached backend, or `NotInitialized`
    pub(crate) fn backend(&self) -> ProvResult<Arc<dyn Backend>> {
        if !self.is_attached() {
            return Err(ProvError::NotInitialized);
        }
        self.backend.read().clone().ok_or(ProvError::NotInitialized)
    }

    pub(crate) fn current_session(&self) -> SessionId {
        SessionId::new(self.session.load(Ordering::Acquire))
    }

    pub(crate) fn shared_lock(&self) -> ProvResult<Arc<SharedLock>> {
        if !self.is_attached() {
            return Err(ProvError::NotInitialized);
        }
        self.lookup_lock
            .lock()
            .clone()
            .ok_or(ProvError::NotInitialized)
    }

    /// Session created by the current attachment
    pub fn get_current_session(&self) -> ProvResult<SessionId> {
        self.backend()?;
        Ok(self.current_session())
    }

    pub fn get_session_info(&self, id: SessionId) -> ProvResult<SessionInfo> {
        let backend = self.backend()?;
        ensure_present(id.is_none(), "session id")?;
        backend.get_session_info(id)
    }
}

impl Drop for Provenance {
    fn drop(&mut self) {
        if self.is_attached() {
            let _ = self.detach();
        }
    }
}

fn ensure_present(is_none: bool, what: &str) -> ProvResult<()> {
    if is_none {
        return Err(ProvError::invalid_argument(format!("{} must not be NONE", what)));
    }
    Ok(())
}
