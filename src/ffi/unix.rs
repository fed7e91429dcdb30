//! Calls shared by every supported Unix: `uname`, `chmod`, and the path and
//! errno plumbing around them.

use crate::error::{Error, Result};
use std::ffi::CString;
use std::mem::size_of;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Convert a path to the NUL-terminated form libc expects.
pub fn path_to_cstring(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        Error::invalid_input(format!("path {} contains a NUL byte", path.display()))
    })
}

/// The calling thread's errno. Must be called right after the failing call.
pub fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// `uname` into a caller-provided buffer.
///
/// Returns `Err(-1)` without calling into libc if `buf` cannot hold a
/// `struct utsname` for this target.
pub fn uname(buf: &mut [u8]) -> std::result::Result<(), i32> {
    if buf.len() < size_of::<libc::utsname>() {
        return Err(-1);
    }

    // SAFETY: buf is valid for writes of size_of::<utsname>() bytes (checked
    // above); utsname is only byte arrays, so any alignment is fine.
    let rc = unsafe { libc::uname(buf.as_mut_ptr().cast::<libc::utsname>()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(rc)
    }
}

/// `chmod(path, mode)`.
pub fn chmod(path: &Path, mode: u32) -> Result<()> {
    let c_path = path_to_cstring(path)?;
    #[allow(clippy::useless_conversion)]
    let native_mode = libc::mode_t::try_from(mode)
        .map_err(|_| Error::invalid_input(format!("mode {mode:#o} does not fit mode_t")))?;

    // SAFETY: c_path is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::chmod(c_path.as_ptr(), native_mode) };
    if rc != 0 {
        let code = last_errno();
        return Err(Error::io(code, path));
    }
    Ok(())
}

/// Reject buffers the native call could overrun or misalign.
pub fn check_out_buffer(buf: &[u8], required: usize, align: usize) -> Result<()> {
    if buf.len() < required {
        return Err(Error::invalid_input(format!(
            "status buffer of {} bytes is smaller than the native {required}",
            buf.len()
        )));
    }
    if buf.as_ptr() as usize % align != 0 {
        return Err(Error::invalid_input(format!(
            "status buffer is not {align}-byte aligned"
        )));
    }
    Ok(())
}
