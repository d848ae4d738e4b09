// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Library configuration
//!
//! Only the cross-process lock is configurable; everything else about the
//! store belongs to the attached backend.

use crate::error::{ProvError, ProvResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding [`ProvConfig::lock_dir`]
pub const LOCK_DIR_ENV: &str = "PROVLITE_LOCK_DIR";

/// Environment variable overriding [`ProvConfig::lock_name`]
pub const LOCK_NAME_ENV: &str = "PROVLITE_LOCK_NAME";

/// Default name of the lookup-or-create lock
pub const DEFAULT_LOCK_NAME: &str = "provlite.lookup_or_create";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvConfig {
    /// Directory holding the named lock file
    pub lock_dir: PathBuf,
    /// Lock name shared by every process that must exclude each other
    pub lock_name: String,
}

impl Default for ProvConfig {
    fn default() -> Self {
        Self {
            lock_dir: std::env::temp_dir(),
            lock_name: DEFAULT_LOCK_NAME.to_string(),
        }
    }
}

impl ProvConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(LOCK_DIR_ENV).filter(|v| !v.is_empty()) {
            config.lock_dir = PathBuf::from(dir);
        }
        if let Ok(name) = std::env::var(LOCK_NAME_ENV) {
            if !name.is_empty() {
                config.lock_name = name;
            }
        }
        config
    }

    pub fn from_json_str(json: &str) -> ProvResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProvError::invalid_argument(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = dir.into();
        self
    }

    pub fn with_lock_name(mut self, name: impl Into<String>) -> Self {
        self.lock_name = name.into();
        self
    }

    pub fn validate(&self) -> ProvResult<()> {
        if self.lock_name.is_empty() {
            return Err(ProvError::invalid_argument("lock name must not be empty"));
        }
        if self.lock_name.contains(['/', '\\']) {
            return Err(ProvError::invalid_argument(format!(
                "lock name '{}' must not contain a path separator",
                self.lock_name
            )));
        }
        Ok(())
    }

    /// Full path of the lock file
    pub fn lock_path(&self) -> PathBuf {
        self.lock_dir.join(format!("{}.lock", self.lock_name))
    }
}
