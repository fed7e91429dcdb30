//! `stat` on macOS.
//!
//! Intel Macs kept the 32-bit-inode `stat` for binary compatibility and
//! export the 64-bit-inode variant as `stat$INODE64`. Apple Silicon only has
//! the 64-bit-inode structure, under the plain name.

use super::unix::{check_out_buffer, chmod, last_errno, path_to_cstring};
use crate::error::{Error, Result};
use crate::layout::NativeLayout;
use crate::sys::StatCalls;
use libc::{c_char, c_int, c_void};
use std::path::Path;

extern "C" {
    #[cfg(target_arch = "x86_64")]
    #[link_name = "stat$INODE64"]
    fn stat_inode64(path: *const c_char, buf: *mut c_void) -> c_int;

    #[cfg(target_arch = "aarch64")]
    #[link_name = "stat"]
    fn stat_plain(path: *const c_char, buf: *mut c_void) -> c_int;
}

type RawStat = unsafe extern "C" fn(*const c_char, *mut c_void) -> c_int;

fn call(entry: RawStat, layout: &NativeLayout, path: &Path, buf: &mut [u8]) -> Result<()> {
    check_out_buffer(buf, layout.size, 8)?;
    let c_path = path_to_cstring(path)?;

    // SAFETY: c_path is NUL-terminated; buf holds at least layout.size
    // (144) bytes, 8-byte aligned, which is the size of the 64-bit-inode
    // struct stat both entry points write.
    let rc = unsafe { entry(c_path.as_ptr(), buf.as_mut_ptr().cast::<c_void>()) };
    if rc != 0 {
        let code = last_errno();
        return Err(Error::io(code, path));
    }
    Ok(())
}

/// `stat$INODE64` on Intel Macs.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatInode64;

#[cfg(target_arch = "x86_64")]
impl StatCalls for StatInode64 {
    fn stat_into(&self, path: &Path, buf: &mut [u8]) -> Result<()> {
        call(stat_inode64, &crate::layout::MACOS_AMD64, path, buf)
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        chmod(path, mode)
    }

    fn entry_point(&self) -> &'static str {
        "stat$INODE64"
    }
}

/// Plain `stat` on Apple Silicon.
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatPlain;

#[cfg(target_arch = "aarch64")]
impl StatCalls for StatPlain {
    fn stat_into(&self, path: &Path, buf: &mut [u8]) -> Result<()> {
        call(stat_plain, &crate::layout::MACOS_ARM64, path, buf)
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        chmod(path, mode)
    }

    fn entry_point(&self) -> &'static str {
        "stat"
    }
}
