// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Process identity discovery
//!
//! The bootstrap only consumes what an [`IdentityProvider`] reports, so the
//! OS-facing lookups live behind a trait and tests substitute fixed values.

use std::path::PathBuf;

/// Six-byte hardware address
pub type MacAddress = [u8; 6];

/// Source of the invoking process's identity
pub trait IdentityProvider: Send + Sync {
    /// Name of the invoking user
    fn user(&self) -> Option<String>;

    fn pid(&self) -> u32;

    /// Canonical path of the running executable
    fn program(&self) -> Option<PathBuf>;

    /// Raw argument vector, one byte string per argument
    fn raw_args(&self) -> Vec<Vec<u8>>;

    /// A stable hardware address, when one can be found
    fn hardware_address(&self) -> Option<MacAddress>;
}

/// Render a hardware address as lowercase colon-separated hex
pub fn format_mac(mac: &MacAddress) -> String {
    mac.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Identity of the current operating system process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentityProvider for SystemIdentity {
    fn user(&self) -> Option<String> {
        ["USER", "USERNAME"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|name| !name.is_empty())
    }

    fn pid(&self) -> u32 {
        std::process::id()
    }

    fn program(&self) -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        std::fs::canonicalize(exe).ok()
    }

    fn raw_args(&self) -> Vec<Vec<u8>> {
        std::env::args_os().map(os_bytes).collect()
    }

    fn hardware_address(&self) -> Option<MacAddress> {
        first_interface_address()
    }
}

#[cfg(unix)]
fn os_bytes(arg: std::ffi::OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    arg.into_vec()
}

#[cfg(not(unix))]
fn os_bytes(arg: std::ffi::OsString) -> Vec<u8> {
    arg.to_string_lossy().into_owned().into_bytes()
}

/// Parse `aa:bb:cc:dd:ee:ff`; all-zero addresses are rejected
pub fn parse_mac(text: &str) -> Option<MacAddress> {
    let mut mac = [0u8; 6];
    let mut parts = text.trim().split(':');
    for slot in mac.iter_mut() {
        *slot = u8::from_str_radix(parts.next()?, 16).ok()?;
    }
    if parts.next().is_some() || mac == [0u8; 6] {
        return None;
    }
    Some(mac)
}

/// First non-loopback interface address, by interface name
#[cfg(target_os = "linux")]
fn first_interface_address() -> Option<MacAddress> {
    let mut names: Vec<_> = std::fs::read_dir("/sys/class/net")
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .filter(|name| name != "lo")
        .collect();
    names.sort();

    names.into_iter().find_map(|name| {
        let path = std::path::Path::new("/sys/class/net").join(name).join("address");
        let text = std::fs::read_to_string(path).ok()?;
        parse_mac(&text)
    })
}

#[cfg(not(target_os = "linux"))]
fn first_interface_address() -> Option<MacAddress> {
    None
}
