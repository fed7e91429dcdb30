//! statprobe: Layout-Exact Native File Status
//!
//! statprobe obtains file metadata (`stat`) and changes file modes (`chmod`)
//! on Linux and macOS by calling the C library directly and decoding the
//! native `struct stat` byte by byte. It exists for tools that must read the
//! exact native record regardless of what the standard library exposes,
//! such as an assembly merger preserving the mode of its primary input on
//! the merged output.
//!
//! # Design
//!
//! - **Identify once**: the OS family and CPU architecture come from `uname`
//!   and are cached for the life of the process ([`identity`])
//! - **Explicit layouts**: every supported `struct stat` is described by
//!   offsets and widths ([`layout`]), never by reinterpreting memory
//! - **Pure decoding**: bytes in, [`NormalizedStatus`] out ([`decode`])
//! - **Zero unsafe in public API**: all FFI quarantined in an internal module
//!
//! # Supported Platforms
//!
//! | OS | Architecture | Entry point | Layout size |
//! |----|--------------|-------------|-------------|
//! | Linux | x86-64 | `__xstat` (ver 1) or `stat` | 144 |
//! | Linux | aarch64 | `__xstat` (ver 0) or `stat` | 128 |
//! | macOS | x86-64 | `stat$INODE64` | 144 |
//! | macOS | arm64 | `stat` | 144 |
//!
//! # Quick Start
//!
//! ```no_run
//! use statprobe::FileProbe;
//!
//! let probe = FileProbe::new()?;
//! let status = probe.stat("input.dll")?;
//! println!("{} on {}", status.file_type(), probe.identity());
//! probe.change_mode("merged.dll", status.permissions().bits())?;
//! # Ok::<(), statprobe::Error>(())
//! ```
//!
//! # Feature Flags
//!
//! - `xstat` (default) - Prefer glibc's versioned `__xstat` on Linux when
//!   the C library exports it
//!
//! # Error Handling
//!
//! All operations that can fail return [`Result<T, Error>`]. A failing
//! native call yields [`Error::Io`] with the errno captured right after the
//! call; an unrecognized platform yields [`Error::PlatformUnsupported`].
//!
//! # Thread Safety
//!
//! [`FileProbe`] is `Send + Sync`. The process identity is computed at most
//! once even under concurrent first use.

// SAFETY: This crate denies unsafe code at the library level.
// All unsafe FFI code is quarantined in src/ffi/, which is not exported.
// We use deny (not forbid) so it can be overridden in the ffi module.
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod decode;
pub mod error;
pub mod identity;
pub mod layout;
pub mod probe;
pub mod signing;
pub mod status;
pub mod sys;

// FFI module is internal only - not exported
mod ffi;

// Re-export main types for convenience
pub use decode::{decode_status, NativeStat};
pub use error::{Error, Result};
pub use identity::{Architecture, IdentifyConfig, IdentityCell, OsKind, RuntimeIdentity};
pub use layout::{layout_for, NativeLayout};
pub use probe::{change_mode, copy_mode, stat, FileProbe};
pub use signing::{SigningOptions, SigningOutcome, SigningStep};
pub use status::{FileMode, FileType, NormalizedStatus, Timespec};
pub use sys::{StatCalls, SystemInfo};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if this is a Unix target, the only kind the native calls exist on.
#[must_use]
pub const fn is_unix() -> bool {
    cfg!(unix)
}

/// Fail fast before any native call on a target without them.
pub(crate) fn ensure_unix() -> Result<()> {
    if is_unix() {
        Ok(())
    } else {
        Err(Error::platform_unsupported(
            "native file status requires a Unix target",
        ))
    }
}
