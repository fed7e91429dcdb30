//! Error types for statprobe.
//!
//! All errors implement `std::error::Error` and provide human-readable messages.
//! Native failures carry the raw errno so callers can branch on the exact
//! code instead of a translated category.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Primary error type for statprobe operations.
///
/// Each variant provides sufficient context for debugging while remaining
/// actionable for programmatic error handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The running OS, architecture, or build target has no known layout or
    /// native entry point.
    ///
    /// Retrying cannot change the running platform, so this is fatal to the
    /// calling operation.
    #[error("platform not supported: {detail}")]
    PlatformUnsupported {
        /// What was detected (or missing).
        detail: String,
    },

    /// The system identification call returned a nonzero status.
    #[error("uname failed with status {code}")]
    IdentificationFailed {
        /// The raw return code of `uname`.
        code: i32,
    },

    /// A native file call (`stat`, `chmod`) failed.
    ///
    /// Contains the errno captured immediately after the failing call.
    #[error("native call failed for {} (errno {code})", .path.display())]
    Io {
        /// The errno value, verbatim.
        code: i32,
        /// The path the call was made on.
        path: PathBuf,
    },

    /// Invalid input was provided to an API.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of what was invalid.
        reason: String,
    },

    /// Resource was not found.
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// The requested mode of operation is not supported.
    #[error("not supported: {feature}")]
    NotSupported {
        /// The unsupported feature.
        feature: String,
    },
}

/// Result type alias for statprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new `PlatformUnsupported` error.
    #[must_use]
    pub fn platform_unsupported(detail: impl Into<String>) -> Self {
        Self::PlatformUnsupported {
            detail: detail.into(),
        }
    }

    /// Create a new `IdentificationFailed` error from a `uname` return code.
    #[must_use]
    pub const fn identification_failed(code: i32) -> Self {
        Self::IdentificationFailed { code }
    }

    /// Create a new `Io` error from an errno value.
    #[must_use]
    pub fn io(code: i32, path: impl AsRef<Path>) -> Self {
        Self::Io {
            code,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a new `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a new `NotSupported` error.
    #[must_use]
    pub fn not_supported(feature: impl Into<String>) -> Self {
        Self::NotSupported {
            feature: feature.into(),
        }
    }

    /// Check if this error indicates an unsupported platform.
    #[must_use]
    pub const fn is_platform_unsupported(&self) -> bool {
        matches!(self, Self::PlatformUnsupported { .. })
    }

    /// Check if this is a native "no such file or directory" failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { code, .. } if *code == ENOENT)
    }

    /// Get the native error code if this is an `Io` or `IdentificationFailed` error.
    #[must_use]
    pub const fn error_code(&self) -> Option<i32> {
        match self {
            Self::Io { code, .. } | Self::IdentificationFailed { code } => Some(*code),
            _ => None,
        }
    }
}

// Same value on Linux and macOS.
const ENOENT: i32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }

    #[test]
    fn test_error_messages_are_readable() {
        let err = Error::platform_unsupported("OS name \"Plan9\"");
        let msg = err.to_string();
        assert!(msg.contains("Plan9"));
        assert!(msg.contains("not supported"));
    }

    #[test]
    fn test_io_error_includes_code_and_path() {
        let err = Error::io(13, "/etc/shadow");
        let msg = err.to_string();
        assert!(msg.contains("errno 13"));
        assert!(msg.contains("/etc/shadow"));
    }

    #[test]
    fn test_display_impl_not_generic() {
        let errors = vec![
            Error::platform_unsupported("test"),
            Error::identification_failed(-1),
            Error::io(2, "/tmp/x"),
            Error::invalid_input("test"),
            Error::not_found("test"),
            Error::not_supported("test"),
        ];

        for err in errors {
            let msg = err.to_string();
            assert!(msg.len() > 10, "Message too short: {msg}");
            assert!(!msg.eq_ignore_ascii_case("error"), "Generic message: {msg}");
        }
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::platform_unsupported("x").is_platform_unsupported());
        assert!(!Error::io(2, "x").is_platform_unsupported());

        assert!(Error::io(ENOENT, "x").is_not_found());
        assert!(!Error::io(13, "x").is_not_found());
        assert!(!Error::not_found("x").is_not_found());
    }

    #[test]
    fn test_error_code_extraction() {
        assert_eq!(Error::io(42, "x").error_code(), Some(42));
        assert_eq!(Error::identification_failed(-1).error_code(), Some(-1));
        assert_eq!(Error::invalid_input("x").error_code(), None);
    }

    #[test]
    fn test_error_equality_and_clone() {
        let e1 = Error::io(2, "/a");
        let e2 = e1.clone();
        assert_eq!(e1, e2);
        assert_ne!(e1, Error::io(2, "/b"));
    }

    #[test]
    fn test_error_debug() {
        let err = Error::identification_failed(-1);
        let debug = format!("{err:?}");
        assert!(debug.contains("IdentificationFailed"));
    }
}
