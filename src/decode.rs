//! Decoding raw native `struct stat` buffers.
//!
//! Each (OS, architecture) pair has a plain data structure holding the
//! fields at their native widths, a decode function reading them from a
//! byte slice at the offsets in [`crate::layout`], and a widening conversion
//! into [`NormalizedStatus`]. Decoding is pure: bytes in, record out.

use crate::error::{Error, Result};
use crate::identity::{Architecture, OsKind, RuntimeIdentity};
use crate::layout::{
    layout_for, FieldSpec, FieldWidth, NativeLayout, TimespecSpec, LINUX_AMD64, LINUX_ARM64,
    MACOS_AMD64, MACOS_ARM64,
};
use crate::status::{NormalizedStatus, Timespec};

/// Bounds-checked native-endian reads at descriptor offsets.
struct FieldReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8], layout: &NativeLayout) -> Result<Self> {
        if bytes.len() < layout.size {
            return Err(Error::invalid_input(format!(
                "{} status buffer is {} bytes, expected {}",
                layout.name,
                bytes.len(),
                layout.size
            )));
        }
        Ok(Self { bytes })
    }

    fn array<const N: usize>(&self, field: FieldSpec) -> [u8; N] {
        debug_assert_eq!(field.width.size(), N);
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[field.offset..field.offset + N]);
        out
    }

    fn u16(&self, field: FieldSpec) -> u16 {
        u16::from_ne_bytes(self.array(field))
    }

    fn i32(&self, field: FieldSpec) -> i32 {
        i32::from_ne_bytes(self.array(field))
    }

    fn u32(&self, field: FieldSpec) -> u32 {
        u32::from_ne_bytes(self.array(field))
    }

    fn i64(&self, field: FieldSpec) -> i64 {
        i64::from_ne_bytes(self.array(field))
    }

    fn u64(&self, field: FieldSpec) -> u64 {
        u64::from_ne_bytes(self.array(field))
    }

    fn timespec(&self, spec: TimespecSpec) -> Timespec {
        Timespec::new(self.i64(spec.seconds()), self.u64(spec.nanoseconds()))
    }
}

/// glibc `struct stat` on x86-64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct LinuxAmd64Stat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_nlink: u64,
    pub st_mode: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_blksize: i64,
    pub st_blocks: i64,
    pub st_atim: Timespec,
    pub st_mtim: Timespec,
    pub st_ctim: Timespec,
}

impl LinuxAmd64Stat {
    /// Decode from a buffer of at least 144 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the buffer is too short.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let l = &LINUX_AMD64;
        let r = FieldReader::new(bytes, l)?;
        Ok(Self {
            st_dev: r.u64(l.dev),
            st_ino: r.u64(l.ino),
            st_nlink: r.u64(l.nlink),
            st_mode: r.u32(l.mode),
            st_uid: r.u32(l.uid),
            st_gid: r.u32(l.gid),
            st_rdev: r.u64(l.rdev),
            st_size: r.i64(l.file_size),
            st_blksize: r.i64(l.blksize),
            st_blocks: r.i64(l.blocks),
            st_atim: r.timespec(l.atime),
            st_mtim: r.timespec(l.mtime),
            st_ctim: r.timespec(l.ctime),
        })
    }
}

impl From<LinuxAmd64Stat> for NormalizedStatus {
    fn from(raw: LinuxAmd64Stat) -> Self {
        Self {
            dev: raw.st_dev,
            ino: raw.st_ino,
            mode: raw.st_mode,
            nlink: raw.st_nlink,
            uid: raw.st_uid,
            gid: raw.st_gid,
            rdev: raw.st_rdev,
            size: raw.st_size,
            atime: raw.st_atim,
            mtime: raw.st_mtim,
            ctime: raw.st_ctim,
            blksize: raw.st_blksize,
            blocks: raw.st_blocks,
        }
    }
}

/// glibc `struct stat` on aarch64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct LinuxArm64Stat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_mode: u32,
    pub st_nlink: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_blksize: i32,
    pub st_blocks: i64,
    pub st_atim: Timespec,
    pub st_mtim: Timespec,
    pub st_ctim: Timespec,
}

impl LinuxArm64Stat {
    /// Decode from a buffer of at least 128 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the buffer is too short.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let l = &LINUX_ARM64;
        let r = FieldReader::new(bytes, l)?;
        Ok(Self {
            st_dev: r.u64(l.dev),
            st_ino: r.u64(l.ino),
            st_mode: r.u32(l.mode),
            st_nlink: r.u32(l.nlink),
            st_uid: r.u32(l.uid),
            st_gid: r.u32(l.gid),
            st_rdev: r.u64(l.rdev),
            st_size: r.i64(l.file_size),
            st_blksize: r.i32(l.blksize),
            st_blocks: r.i64(l.blocks),
            st_atim: r.timespec(l.atime),
            st_mtim: r.timespec(l.mtime),
            st_ctim: r.timespec(l.ctime),
        })
    }
}

impl From<LinuxArm64Stat> for NormalizedStatus {
    fn from(raw: LinuxArm64Stat) -> Self {
        Self {
            dev: raw.st_dev,
            ino: raw.st_ino,
            mode: raw.st_mode,
            nlink: u64::from(raw.st_nlink),
            uid: raw.st_uid,
            gid: raw.st_gid,
            rdev: raw.st_rdev,
            size: raw.st_size,
            atime: raw.st_atim,
            mtime: raw.st_mtim,
            ctime: raw.st_ctim,
            blksize: i64::from(raw.st_blksize),
            blocks: raw.st_blocks,
        }
    }
}

/// macOS `struct stat` with 64-bit inodes (both architectures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct DarwinStat {
    pub st_dev: i32,
    pub st_mode: u16,
    pub st_nlink: u16,
    pub st_ino: u64,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: i32,
    pub st_atimespec: Timespec,
    pub st_mtimespec: Timespec,
    pub st_ctimespec: Timespec,
    pub st_birthtimespec: Timespec,
    pub st_size: i64,
    pub st_blocks: i64,
    pub st_blksize: i32,
    pub st_flags: u32,
    pub st_gen: u32,
}

impl DarwinStat {
    /// Decode from a buffer of at least 144 bytes using `layout`, which must
    /// be one of the macOS layouts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the buffer is too short or the
    /// layout has no macOS fields.
    pub fn decode(bytes: &[u8], layout: &NativeLayout) -> Result<Self> {
        let extras = layout.darwin.ok_or_else(|| {
            Error::invalid_input(format!("{} is not a macOS layout", layout.name))
        })?;
        let r = FieldReader::new(bytes, layout)?;
        Ok(Self {
            st_dev: r.i32(layout.dev),
            st_mode: r.u16(layout.mode),
            st_nlink: r.u16(layout.nlink),
            st_ino: r.u64(layout.ino),
            st_uid: r.u32(layout.uid),
            st_gid: r.u32(layout.gid),
            st_rdev: r.i32(layout.rdev),
            st_atimespec: r.timespec(layout.atime),
            st_mtimespec: r.timespec(layout.mtime),
            st_ctimespec: r.timespec(layout.ctime),
            st_birthtimespec: r.timespec(extras.birthtime),
            st_size: r.i64(layout.file_size),
            st_blocks: r.i64(layout.blocks),
            st_blksize: r.i32(layout.blksize),
            st_flags: r.u32(extras.flags),
            st_gen: r.u32(extras.generation),
        })
    }
}

impl From<DarwinStat> for NormalizedStatus {
    // dev_t is a signed 32-bit value; it is sign-extended, so a negative
    // device id keeps its bit pattern in the low half.
    #[allow(clippy::cast_sign_loss)]
    fn from(raw: DarwinStat) -> Self {
        Self {
            dev: i64::from(raw.st_dev) as u64,
            ino: raw.st_ino,
            mode: u32::from(raw.st_mode),
            nlink: u64::from(raw.st_nlink),
            uid: raw.st_uid,
            gid: raw.st_gid,
            rdev: i64::from(raw.st_rdev) as u64,
            size: raw.st_size,
            atime: raw.st_atimespec,
            mtime: raw.st_mtimespec,
            ctime: raw.st_ctimespec,
            blksize: i64::from(raw.st_blksize),
            blocks: raw.st_blocks,
        }
    }
}

/// A decoded native status, tagged by the layout it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeStat {
    /// Linux on x86-64.
    LinuxAmd64(LinuxAmd64Stat),
    /// Linux on aarch64.
    LinuxArm64(LinuxArm64Stat),
    /// macOS on Intel (`stat$INODE64`).
    MacOsAmd64(DarwinStat),
    /// macOS on Apple Silicon.
    MacOsArm64(DarwinStat),
}

impl NativeStat {
    /// Decode `bytes` with the layout belonging to `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `bytes` is shorter than the layout.
    pub fn decode(identity: RuntimeIdentity, bytes: &[u8]) -> Result<Self> {
        Ok(match (identity.os, identity.arch) {
            (OsKind::Linux, Architecture::Amd64) => Self::LinuxAmd64(LinuxAmd64Stat::decode(bytes)?),
            (OsKind::Linux, Architecture::Arm64) => Self::LinuxArm64(LinuxArm64Stat::decode(bytes)?),
            (OsKind::MacOs, Architecture::Amd64) => {
                Self::MacOsAmd64(DarwinStat::decode(bytes, &MACOS_AMD64)?)
            }
            (OsKind::MacOs, Architecture::Arm64) => {
                Self::MacOsArm64(DarwinStat::decode(bytes, &MACOS_ARM64)?)
            }
        })
    }

    /// The layout this value was decoded with.
    #[must_use]
    pub const fn layout(&self) -> &'static NativeLayout {
        match self {
            Self::LinuxAmd64(_) => layout_for(OsKind::Linux, Architecture::Amd64),
            Self::LinuxArm64(_) => layout_for(OsKind::Linux, Architecture::Arm64),
            Self::MacOsAmd64(_) => layout_for(OsKind::MacOs, Architecture::Amd64),
            Self::MacOsArm64(_) => layout_for(OsKind::MacOs, Architecture::Arm64),
        }
    }

    /// Widen into the OS-independent record.
    #[must_use]
    pub fn normalize(self) -> NormalizedStatus {
        match self {
            Self::LinuxAmd64(raw) => raw.into(),
            Self::LinuxArm64(raw) => raw.into(),
            Self::MacOsAmd64(raw) | Self::MacOsArm64(raw) => raw.into(),
        }
    }
}

/// Decode a raw buffer straight into a [`NormalizedStatus`].
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `bytes` is shorter than the layout.
pub fn decode_status(identity: RuntimeIdentity, bytes: &[u8]) -> Result<NormalizedStatus> {
    NativeStat::decode(identity, bytes).map(NativeStat::normalize)
}
