//! Capability traits for the native calls the probe depends on.
//!
//! The real implementations live in the crate-private FFI module, one per
//! (OS, architecture) pair. Tests and embedders can supply their own to run
//! the decoder without touching the filesystem.

use crate::error::Result;
use std::path::Path;

/// The system identification call.
pub trait SystemInfo: Send + Sync {
    /// Fill `buf` with a raw `struct utsname`.
    ///
    /// # Errors
    ///
    /// Returns the raw nonzero return code of the call.
    fn uname(&self, buf: &mut [u8]) -> std::result::Result<(), i32>;
}

/// The file-status and file-mode calls.
pub trait StatCalls: Send + Sync {
    /// Fill `buf` with the native status structure for `path`.
    ///
    /// `buf` is at least as long as the layout the implementation writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) carrying the errno read
    /// immediately after the failing call.
    fn stat_into(&self, path: &Path, buf: &mut [u8]) -> Result<()>;

    /// Change the mode bits of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) carrying the errno.
    fn chmod(&self, path: &Path, mode: u32) -> Result<()>;

    /// Name of the native entry point used for `stat_into`, for diagnostics.
    fn entry_point(&self) -> &'static str;
}
