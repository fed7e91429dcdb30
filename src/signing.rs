//! Strong-name signing decision for a merged assembly.
//!
//! The merged output is either re-signed with the key pair read from a key
//! file, or has its strong-name identity stripped (public key cleared and
//! the strong-name-signed module flag removed) because no key was given.
//! Key containers and delay signing are rejected up front.
//!
//! # Example
//!
//! ```no_run
//! use statprobe::signing::{SigningOptions, SigningOutcome, SigningStep};
//!
//! let step = SigningStep::new(SigningOptions::new().with_key_file("build/key.snk"));
//! match step.perform()? {
//!     SigningOutcome::Sign { key_blob } => println!("signing with {} byte key", key_blob.len()),
//!     SigningOutcome::StripStrongName => println!("output will be unsigned"),
//! }
//! # Ok::<(), statprobe::Error>(())
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Signing options from the command line (`/keyfile:`, `/keycontainer:`,
/// `/delaysign`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningOptions {
    /// Strong-name key file (`.snk`).
    pub key_file: Option<PathBuf>,
    /// Name of a key container in the machine's crypto store.
    pub key_container: Option<String>,
    /// Reserve space for the signature without signing.
    pub delay_sign: bool,
}

impl SigningOptions {
    /// No key: the output will be unsigned.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign with the key pair in `path`.
    #[must_use]
    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    /// Sign with a named key container.
    #[must_use]
    pub fn with_key_container(mut self, name: impl Into<String>) -> Self {
        self.key_container = Some(name.into());
        self
    }

    /// Request delay signing.
    #[must_use]
    pub const fn with_delay_sign(mut self, delay_sign: bool) -> Self {
        self.delay_sign = delay_sign;
        self
    }
}

/// What the writer must do with the merged assembly's strong name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningOutcome {
    /// Sign with this key blob.
    Sign {
        /// Raw contents of the key file.
        key_blob: Vec<u8>,
    },
    /// Clear the public key and the strong-name-signed flag.
    StripStrongName,
}

impl SigningOutcome {
    /// Whether the output will carry a strong-name signature.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Sign { .. })
    }
}

/// The signing step of a merge.
#[derive(Debug, Clone)]
pub struct SigningStep {
    options: SigningOptions,
}

impl SigningStep {
    /// Create the step.
    #[must_use]
    pub const fn new(options: SigningOptions) -> Self {
        Self { options }
    }

    /// Decide how to sign.
    ///
    /// # Errors
    ///
    /// - [`Error::NotSupported`] for key containers and delay signing
    /// - [`Error::NotFound`] if the key file does not exist
    /// - [`Error::Io`] if the key file cannot be read
    #[instrument(level = "debug", skip(self))]
    pub fn perform(&self) -> Result<SigningOutcome> {
        if self.options.key_container.is_some() {
            return Err(Error::not_supported("signing with a key container"));
        }
        if self.options.delay_sign {
            return Err(Error::not_supported("delay signing"));
        }

        match &self.options.key_file {
            Some(path) => {
                let key_blob = read_key_file(path)?;
                debug!(path = %path.display(), len = key_blob.len(), "read strong-name key");
                Ok(SigningOutcome::Sign { key_blob })
            }
            None => {
                debug!("no key file, stripping strong name");
                Ok(SigningOutcome::StripStrongName)
            }
        }
    }
}

fn read_key_file(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::not_found(format!("key file {}", path.display())));
    }
    std::fs::read(path).map_err(|e| Error::io(e.raw_os_error().unwrap_or(0), path))
}
