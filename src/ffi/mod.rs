//! FFI Quarantine Zone - All unsafe code isolated here.
//!
//! # Safety Architecture
//!
//! This module contains ALL unsafe code in the statprobe crate. The rest of
//! the crate is built with `#![deny(unsafe_code)]` and only sees the safe
//! wrappers exported from here.
//!
//! ## Safety Rules
//!
//! - Every `unsafe` block has a `// SAFETY:` comment
//! - No raw pointers escape this module
//! - Native structures are written into byte buffers and decoded elsewhere;
//!   nothing here reinterprets bytes as a Rust struct
//! - errno is read immediately after a failing call, before any other call
//!
//! # Module Structure
//!
//! ```text
//! ffi/
//! ├── mod.rs      # This file - entry point selection
//! ├── buffer.rs   # Owned native buffer (uname)
//! ├── unix.rs     # uname, chmod, path and errno helpers
//! ├── linux.rs    # __xstat / stat on Linux
//! └── darwin.rs   # stat$INODE64 / stat on macOS
//! ```

// Allow unsafe in this module only - quarantine zone
#![allow(unsafe_code)]

pub mod buffer;

#[cfg(unix)]
mod unix;

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
mod linux;

#[cfg(all(
    target_os = "macos",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
mod darwin;

use crate::error::{Error, Result};
use crate::identity::RuntimeIdentity;
use crate::sys::{StatCalls, SystemInfo};
#[allow(unused_imports)]
use crate::identity::{Architecture, OsKind};

/// The real `uname`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSystemInfo;

impl SystemInfo for NativeSystemInfo {
    #[cfg(unix)]
    fn uname(&self, buf: &mut [u8]) -> std::result::Result<(), i32> {
        unix::uname(buf)
    }

    #[cfg(not(unix))]
    fn uname(&self, _buf: &mut [u8]) -> std::result::Result<(), i32> {
        Err(-1)
    }
}

/// Select the native `stat`/`chmod` implementation for `identity`.
///
/// Only the variant whose structure matches this build's target is
/// compiled in; any other identity (for example a 32-bit build running on
/// a 64-bit kernel) has no valid entry point.
///
/// # Errors
///
/// Returns [`Error::PlatformUnsupported`] if no variant matches.
pub fn native_calls(identity: RuntimeIdentity) -> Result<Box<dyn StatCalls>> {
    match (identity.os, identity.arch) {
        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        (OsKind::Linux, Architecture::Amd64) => Ok(Box::new(linux::LinuxStat::amd64())),
        #[cfg(all(target_os = "linux", target_arch = "aarch64"))]
        (OsKind::Linux, Architecture::Arm64) => Ok(Box::new(linux::LinuxStat::arm64())),
        #[cfg(all(target_os = "macos", target_arch = "x86_64"))]
        (OsKind::MacOs, Architecture::Amd64) => Ok(Box::new(darwin::StatInode64)),
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        (OsKind::MacOs, Architecture::Arm64) => Ok(Box::new(darwin::StatPlain)),
        _ => Err(Error::platform_unsupported(format!(
            "no native stat entry point for {identity} in this build"
        ))),
    }
}
