//! `stat` on Linux.
//!
//! glibc's versioned entry point `__xstat(ver, path, buf)` is resolved at
//! runtime: glibc 2.33 stopped exporting it for new links, and musl never
//! had it. When it is missing (or the `xstat` feature is off) the plain
//! `stat` entry point is used; both write the same structure.

use super::unix::{check_out_buffer, chmod, last_errno, path_to_cstring};
use crate::error::{Error, Result};
use crate::layout::NativeLayout;
use crate::sys::StatCalls;
use libc::{c_char, c_int, c_void};
use std::mem::{align_of, size_of};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

type XstatFn = unsafe extern "C" fn(c_int, *const c_char, *mut libc::stat) -> c_int;

/// `_STAT_VER` for x86-64.
#[cfg(target_arch = "x86_64")]
const STAT_VER_AMD64: c_int = 1;
/// `_STAT_VER` for aarch64 (the kernel layout).
#[cfg(target_arch = "aarch64")]
const STAT_VER_ARM64: c_int = 0;

/// The Linux `stat` implementation for one architecture.
#[derive(Debug, Clone, Copy)]
pub struct LinuxStat {
    version: c_int,
    layout: &'static NativeLayout,
}

impl LinuxStat {
    #[cfg(target_arch = "x86_64")]
    pub const fn amd64() -> Self {
        Self {
            version: STAT_VER_AMD64,
            layout: &crate::layout::LINUX_AMD64,
        }
    }

    #[cfg(target_arch = "aarch64")]
    pub const fn arm64() -> Self {
        Self {
            version: STAT_VER_ARM64,
            layout: &crate::layout::LINUX_ARM64,
        }
    }
}

fn resolve_xstat() -> Option<XstatFn> {
    static XSTAT: OnceLock<Option<XstatFn>> = OnceLock::new();

    *XSTAT.get_or_init(|| {
        if !cfg!(feature = "xstat") {
            debug!("__xstat disabled, using stat");
            return None;
        }

        // SAFETY: dlsym only looks the name up; the name is NUL-terminated.
        let sym = unsafe { libc::dlsym(libc::RTLD_DEFAULT, b"__xstat\0".as_ptr().cast::<c_char>()) };
        if sym.is_null() {
            warn!("libc does not export __xstat, falling back to stat");
            return None;
        }

        // SAFETY: sym is non-null and names glibc's __xstat, whose C signature
        // is int __xstat(int, const char *, struct stat *) on every ABI that
        // exports it.
        Some(unsafe { std::mem::transmute::<*mut c_void, XstatFn>(sym) })
    })
}

impl StatCalls for LinuxStat {
    fn stat_into(&self, path: &Path, buf: &mut [u8]) -> Result<()> {
        let required = self.layout.size.max(size_of::<libc::stat>());
        check_out_buffer(buf, required, align_of::<libc::stat>())?;
        let c_path = path_to_cstring(path)?;
        let xstat = resolve_xstat();
        let out = buf.as_mut_ptr().cast::<libc::stat>();

        let rc = match xstat {
            // SAFETY: c_path is NUL-terminated and out points to at least
            // size_of::<stat>() suitably aligned writable bytes (checked above).
            Some(xstat) => unsafe { xstat(self.version, c_path.as_ptr(), out) },
            // SAFETY: as above.
            None => unsafe { libc::stat(c_path.as_ptr(), out) },
        };
        if rc != 0 {
            let code = last_errno();
            return Err(Error::io(code, path));
        }
        Ok(())
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        chmod(path, mode)
    }

    fn entry_point(&self) -> &'static str {
        if resolve_xstat().is_some() {
            "__xstat"
        } else {
            "stat"
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn native() -> LinuxStat {
        #[cfg(target_arch = "x86_64")]
        return LinuxStat::amd64();
        #[cfg(target_arch = "aarch64")]
        return LinuxStat::arm64();
    }

    #[repr(C, align(8))]
    struct Out([u8; 144]);

    #[test]
    fn test_layout_matches_libc() {
        assert_eq!(native().layout.size, size_of::<libc::stat>());
    }

    #[test]
    fn test_stat_root() {
        let mut out = Out([0; 144]);
        native().stat_into(Path::new("/"), &mut out.0).unwrap();
    }

    #[test]
    fn test_stat_missing_reports_enoent() {
        let mut out = Out([0; 144]);
        let err = native()
            .stat_into(Path::new("/nonexistent/statprobe"), &mut out.0)
            .unwrap_err();
        assert_eq!(err.error_code(), Some(libc::ENOENT));
    }

    #[test]
    fn test_stat_short_buffer_rejected() {
        let mut out = Out([0; 144]);
        let err = native()
            .stat_into(Path::new("/"), &mut out.0[..64])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }
}
