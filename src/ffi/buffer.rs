//! Heap buffer handed to native calls that fill caller-provided memory.

use crate::error::{Error, Result};
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

/// Alignment of every native buffer; enough for any field the kernel writes.
pub const NATIVE_ALIGN: usize = 8;

/// An owned, zero-initialized, 8-byte-aligned byte buffer.
///
/// Released exactly once, in `Drop`, whichever way the owning scope exits.
pub struct NativeBuffer {
    ptr: NonNull<u8>,
    len: usize,
    layout: Layout,
}

// SAFETY: NativeBuffer uniquely owns its allocation; nothing else holds the
// pointer, so moving it to another thread is sound. Not Sync: shared access
// goes through &self methods only and those never write.
unsafe impl Send for NativeBuffer {}

impl NativeBuffer {
    /// Allocate `len` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` is zero or allocation fails.
    pub fn zeroed(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid_input("native buffer length cannot be zero"));
        }

        let layout = Layout::from_size_align(len, NATIVE_ALIGN)
            .map_err(|e| Error::invalid_input(format!("invalid buffer layout: {e}")))?;

        // SAFETY: layout has non-zero size (checked above) and a valid alignment.
        let ptr = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or_else(|| {
            Error::invalid_input(format!("allocation of {len} byte native buffer failed"))
        })?;

        Ok(Self { ptr, len, layout })
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false; zero-length buffers cannot be created.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read-only view of the bytes.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for len initialized (zeroed) bytes.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Mutable view of the bytes.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid for len bytes and &mut self gives exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated in `zeroed` with exactly this layout.
        unsafe {
            dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

impl std::fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed() {
        let buffer = NativeBuffer::zeroed(8192).unwrap();
        assert_eq!(buffer.len(), 8192);
        assert!(!buffer.is_empty());
        assert!(buffer.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_length_fails() {
        assert!(NativeBuffer::zeroed(0).is_err());
    }

    #[test]
    fn test_alignment() {
        let buffer = NativeBuffer::zeroed(13).unwrap();
        assert_eq!(buffer.as_slice().as_ptr() as usize % NATIVE_ALIGN, 0);
    }

    #[test]
    fn test_read_write() {
        let mut buffer = NativeBuffer::zeroed(16).unwrap();
        buffer.as_mut_slice()[3] = 42;
        assert_eq!(buffer.as_slice()[3], 42);
    }

    #[test]
    fn test_debug_format() {
        let buffer = NativeBuffer::zeroed(64).unwrap();
        let debug = format!("{buffer:?}");
        assert!(debug.contains("NativeBuffer"));
        assert!(debug.contains("64"));
    }
}
