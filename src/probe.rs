//! The file status facade.
//!
//! [`FileProbe`] binds a [`RuntimeIdentity`] to the native calls that match
//! it and to the layout used to decode their output. The free functions
//! [`stat`], [`change_mode`] and [`copy_mode`] use the process identity.
//!
//! # Example
//!
//! ```no_run
//! let status = statprobe::stat("/usr/bin/env")?;
//! println!("{} bytes, mode {:o}", status.size, status.mode);
//!
//! statprobe::change_mode("merged.dll", 0o755)?;
//! # Ok::<(), statprobe::Error>(())
//! ```

use crate::decode::decode_status;
use crate::error::Result;
use crate::identity::RuntimeIdentity;
use crate::layout::{layout_for, NativeLayout, MAX_LAYOUT_SIZE};
use crate::status::{FileMode, NormalizedStatus};
use crate::sys::StatCalls;
use std::fmt;
use std::path::Path;
use tracing::{debug, instrument};

/// Output buffer for one native `stat` call; aligned for any layout.
#[repr(C, align(8))]
struct StatBuffer([u8; MAX_LAYOUT_SIZE]);

impl StatBuffer {
    const fn new() -> Self {
        Self([0; MAX_LAYOUT_SIZE])
    }
}

/// Native file status and mode changes for one runtime identity.
pub struct FileProbe {
    identity: RuntimeIdentity,
    layout: &'static NativeLayout,
    calls: Box<dyn StatCalls>,
}

impl FileProbe {
    /// A probe for the running process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlatformUnsupported`](crate::Error::PlatformUnsupported)
    /// if this is not a supported Unix target, the identity cannot be
    /// recognized, or this build has no entry point for it; any identification
    /// error is passed through.
    #[instrument(level = "debug")]
    pub fn new() -> Result<Self> {
        crate::ensure_unix()?;
        let identity = RuntimeIdentity::current()?;
        let calls = crate::ffi::native_calls(identity)?;
        debug!(%identity, entry_point = calls.entry_point(), "native stat selected");
        Ok(Self::with_calls(identity, calls))
    }

    /// A probe with an explicit identity and native call implementation.
    ///
    /// The identity decides the decoding layout, so `calls` must write that
    /// layout.
    #[must_use]
    pub fn with_calls(identity: RuntimeIdentity, calls: Box<dyn StatCalls>) -> Self {
        Self {
            identity,
            layout: layout_for(identity.os, identity.arch),
            calls,
        }
    }

    /// The identity this probe decodes for.
    #[must_use]
    pub const fn identity(&self) -> RuntimeIdentity {
        self.identity
    }

    /// The native layout this probe decodes with.
    #[must_use]
    pub const fn layout(&self) -> &'static NativeLayout {
        self.layout
    }

    /// Status of the file at `path`, following symbolic links.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`](crate::Error::Io) with the native errno if the call fails
    /// - [`Error::InvalidInput`](crate::Error::InvalidInput) if `path` contains a NUL byte
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn stat(&self, path: impl AsRef<Path>) -> Result<NormalizedStatus> {
        let path = path.as_ref();
        let mut buffer = StatBuffer::new();
        let raw = &mut buffer.0[..self.layout.size];
        self.calls.stat_into(path, raw)?;
        decode_status(self.identity, raw)
    }

    /// Set the mode bits of the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`](crate::Error::Io) with the native errno if the call fails
    /// - [`Error::InvalidInput`](crate::Error::InvalidInput) if `path` contains a
    ///   NUL byte or `mode` does not fit the native mode type
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn change_mode(&self, path: impl AsRef<Path>, mode: u32) -> Result<()> {
        self.calls.chmod(path.as_ref(), mode)
    }

    /// Give `to` the permission bits of `from`, including setuid, setgid
    /// and sticky.
    ///
    /// # Errors
    ///
    /// Any error from [`FileProbe::stat`] on `from` or
    /// [`FileProbe::change_mode`] on `to`.
    pub fn copy_mode(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<FileMode> {
        let permissions = self.stat(from)?.permissions();
        self.change_mode(to, permissions.bits())?;
        Ok(permissions)
    }
}

impl fmt::Debug for FileProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileProbe")
            .field("identity", &self.identity)
            .field("layout", &self.layout.name)
            .field("entry_point", &self.calls.entry_point())
            .finish()
    }
}

/// Status of the file at `path` for the running process.
///
/// # Errors
///
/// See [`FileProbe::new`] and [`FileProbe::stat`].
pub fn stat(path: impl AsRef<Path>) -> Result<NormalizedStatus> {
    FileProbe::new()?.stat(path)
}

/// Set the mode bits of the file at `path`.
///
/// # Errors
///
/// See [`FileProbe::new`] and [`FileProbe::change_mode`].
pub fn change_mode(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    FileProbe::new()?.change_mode(path, mode)
}

/// Give `to` the permission bits of `from`.
///
/// # Errors
///
/// See [`FileProbe::new`] and [`FileProbe::copy_mode`].
pub fn copy_mode(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<FileMode> {
    FileProbe::new()?.copy_mode(from, to)
}
