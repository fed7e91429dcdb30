//! Runtime identification: which OS family and CPU architecture is this
//! process running on?
//!
//! The answer decides which native structure layout and which `stat` entry
//! point are valid, so it is computed from the kernel's own report (`uname`)
//! rather than from compile-time configuration, and cached for the life of
//! the process.
//!
//! # Example
//!
//! ```no_run
//! use statprobe::identity::{Architecture, OsKind, RuntimeIdentity};
//!
//! let identity = RuntimeIdentity::current()?;
//! match (identity.os, identity.arch) {
//!     (OsKind::MacOs, Architecture::Arm64) => println!("Apple Silicon"),
//!     (os, arch) => println!("{os} on {arch}"),
//! }
//! # Ok::<(), statprobe::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::ffi::buffer::NativeBuffer;
use crate::sys::SystemInfo;
use std::ffi::CStr;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Default size of the buffer handed to `uname`.
pub const DEFAULT_UNAME_BUFFER_LEN: usize = 8192;

/// Smallest buffer that holds the machine field on every supported OS
/// (five 256-byte fields on macOS).
pub const MIN_UNAME_BUFFER_LEN: usize = 5 * DARWIN_UTS_FIELD_LEN;

/// Index of the machine field in `struct utsname`.
const MACHINE_FIELD_INDEX: usize = 4;
const LINUX_UTS_FIELD_LEN: usize = 65;
const DARWIN_UTS_FIELD_LEN: usize = 256;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsKind {
    /// Linux (glibc or compatible).
    Linux,
    /// macOS / Darwin.
    MacOs,
}

impl OsKind {
    /// Length of each string field of `struct utsname` on this OS.
    #[must_use]
    pub const fn uts_field_len(self) -> usize {
        match self {
            Self::Linux => LINUX_UTS_FIELD_LEN,
            Self::MacOs => DARWIN_UTS_FIELD_LEN,
        }
    }

    fn from_sysname(sysname: &str) -> Option<Self> {
        match sysname {
            "Darwin" => Some(Self::MacOs),
            "Linux" => Some(Self::Linux),
            _ => None,
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "Linux"),
            Self::MacOs => write!(f, "macOS"),
        }
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// x86-64.
    Amd64,
    /// 64-bit ARM.
    Arm64,
}

impl Architecture {
    // Each OS spells ARM64 its own way; the other spelling is not accepted.
    fn from_machine(os: OsKind, machine: &str) -> Option<Self> {
        match (os, machine) {
            (OsKind::MacOs, "arm64") | (OsKind::Linux, "aarch64") => Some(Self::Arm64),
            (_, "x86_64") => Some(Self::Amd64),
            _ => None,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amd64 => write!(f, "x86-64"),
            Self::Arm64 => write!(f, "ARM64"),
        }
    }
}

/// The resolved (OS family, CPU architecture) pair of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeIdentity {
    /// Operating system family.
    pub os: OsKind,
    /// CPU architecture.
    pub arch: Architecture,
}

impl fmt::Display for RuntimeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.os, self.arch)
    }
}

static PROCESS_IDENTITY: IdentityCell = IdentityCell::new();

impl RuntimeIdentity {
    /// Create an identity from known parts.
    ///
    /// Useful for injecting a fixed identity into a [`FileProbe`](crate::probe::FileProbe).
    #[must_use]
    pub const fn new(os: OsKind, arch: Architecture) -> Self {
        Self { os, arch }
    }

    /// The identity of the running process.
    ///
    /// The first call issues `uname`; every later call returns the cached
    /// outcome, including a cached failure.
    ///
    /// # Errors
    ///
    /// - [`Error::PlatformUnsupported`] if the target is not Unix or the
    ///   reported OS name or machine is not recognized
    /// - [`Error::IdentificationFailed`] if `uname` itself fails
    pub fn current() -> Result<Self> {
        crate::ensure_unix()?;
        PROCESS_IDENTITY.get_or_detect(&crate::ffi::NativeSystemInfo)
    }

    /// Detect the identity with the given `uname` implementation, bypassing
    /// any cache.
    ///
    /// # Errors
    ///
    /// Same as [`RuntimeIdentity::current`], plus [`Error::InvalidInput`] if
    /// the configured buffer is too small.
    #[instrument(level = "debug", skip(system))]
    pub fn detect_with<S>(system: &S, config: &IdentifyConfig) -> Result<Self>
    where
        S: SystemInfo + ?Sized,
    {
        config.validate()?;

        // Freed on every return path below, including the error ones.
        let mut buffer = NativeBuffer::zeroed(config.buffer_len)?;
        system
            .uname(buffer.as_mut_slice())
            .map_err(Error::identification_failed)?;

        let identity = parse_uname(buffer.as_slice())?;
        debug!(%identity, "resolved runtime identity");
        Ok(identity)
    }
}

/// Parse a raw `struct utsname` buffer into a [`RuntimeIdentity`].
///
/// The OS name is read at offset 0; the machine name at
/// `4 * field_len`, where `field_len` is 65 on Linux and 256 on macOS.
///
/// # Errors
///
/// Returns [`Error::PlatformUnsupported`] if either string is unrecognized
/// or not NUL-terminated within the buffer.
pub fn parse_uname(buf: &[u8]) -> Result<RuntimeIdentity> {
    let sysname = c_str_at(buf, 0)
        .ok_or_else(|| Error::platform_unsupported("unterminated OS name from uname"))?;
    let os = OsKind::from_sysname(sysname)
        .ok_or_else(|| Error::platform_unsupported(format!("OS name {sysname:?}")))?;

    let machine_offset = MACHINE_FIELD_INDEX * os.uts_field_len();
    let machine = c_str_at(buf, machine_offset)
        .ok_or_else(|| Error::platform_unsupported(format!("unterminated machine name on {os}")))?;
    let arch = Architecture::from_machine(os, machine)
        .ok_or_else(|| Error::platform_unsupported(format!("machine {machine:?} on {os}")))?;

    Ok(RuntimeIdentity { os, arch })
}

fn c_str_at(buf: &[u8], offset: usize) -> Option<&str> {
    let tail = buf.get(offset..)?;
    CStr::from_bytes_until_nul(tail).ok()?.to_str().ok()
}

/// Configuration for runtime identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifyConfig {
    /// Size in bytes of the buffer handed to `uname`.
    pub buffer_len: usize,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            buffer_len: DEFAULT_UNAME_BUFFER_LEN,
        }
    }
}

impl IdentifyConfig {
    /// Set the `uname` buffer length.
    #[must_use]
    pub const fn with_buffer_len(mut self, buffer_len: usize) -> Self {
        self.buffer_len = buffer_len;
        self
    }

    /// Check that the buffer can hold every OS's `struct utsname` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `buffer_len` is below
    /// [`MIN_UNAME_BUFFER_LEN`].
    pub fn validate(&self) -> Result<()> {
        if self.buffer_len < MIN_UNAME_BUFFER_LEN {
            return Err(Error::invalid_input(format!(
                "uname buffer of {} bytes is smaller than the required {MIN_UNAME_BUFFER_LEN}",
                self.buffer_len
            )));
        }
        Ok(())
    }
}

/// A compute-once cache for a [`RuntimeIdentity`].
///
/// Concurrent first callers block until one of them finishes detection;
/// afterwards reads never block. The outcome is never recomputed.
#[derive(Debug, Default)]
pub struct IdentityCell {
    inner: OnceLock<Result<RuntimeIdentity>>,
}

impl IdentityCell {
    /// Create an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Return the cached identity, detecting it with `system` on first use.
    ///
    /// # Errors
    ///
    /// Returns the (cached) detection error.
    pub fn get_or_detect<S>(&self, system: &S) -> Result<RuntimeIdentity>
    where
        S: SystemInfo + ?Sized,
    {
        self.get_or_detect_with(system, &IdentifyConfig::default())
    }

    /// Like [`IdentityCell::get_or_detect`] with an explicit configuration.
    ///
    /// The configuration only matters for the call that performs detection.
    ///
    /// # Errors
    ///
    /// Returns the (cached) detection error.
    pub fn get_or_detect_with<S>(&self, system: &S, config: &IdentifyConfig) -> Result<RuntimeIdentity>
    where
        S: SystemInfo + ?Sized,
    {
        self.inner
            .get_or_init(|| RuntimeIdentity::detect_with(system, config))
            .clone()
    }

    /// The cached outcome, if detection already ran.
    #[must_use]
    pub fn get(&self) -> Option<&Result<RuntimeIdentity>> {
        self.inner.get()
    }
}
