//! Byte layouts of the native `struct stat` for each supported
//! (OS, architecture) pair.
//!
//! None of these layouts is a portable contract: field order, widths and
//! padding all differ, and macOS kept two ABIs around for historical reasons.
//! The descriptors here are the single source of offsets for the decoder.

use crate::identity::{Architecture, OsKind};

/// Width and signedness of a native field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// Unsigned 16-bit.
    U16,
    /// Signed 32-bit.
    I32,
    /// Unsigned 32-bit.
    U32,
    /// Signed 64-bit.
    I64,
    /// Unsigned 64-bit.
    U64,
}

impl FieldWidth {
    /// Size of the field in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::I32 | Self::U32 => 4,
            Self::I64 | Self::U64 => 8,
        }
    }
}

/// Location of one field inside the native structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Byte offset from the start of the structure.
    pub offset: usize,
    /// Width of the field.
    pub width: FieldWidth,
}

impl FieldSpec {
    const fn new(offset: usize, width: FieldWidth) -> Self {
        Self { offset, width }
    }

    /// One past the last byte of the field.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.width.size()
    }
}

/// A `struct timespec`: signed 64-bit seconds followed by unsigned 64-bit
/// nanoseconds. Identical on all four layouts, only its position differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimespecSpec {
    /// Offset of `tv_sec`; `tv_nsec` follows 8 bytes later.
    pub offset: usize,
}

impl TimespecSpec {
    /// Size of a `struct timespec` in bytes.
    pub const SIZE: usize = 16;

    /// The `tv_sec` field.
    #[must_use]
    pub const fn seconds(&self) -> FieldSpec {
        FieldSpec::new(self.offset, FieldWidth::I64)
    }

    /// The `tv_nsec` field.
    #[must_use]
    pub const fn nanoseconds(&self) -> FieldSpec {
        FieldSpec::new(self.offset + 8, FieldWidth::U64)
    }
}

/// Descriptor of one native `struct stat` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeLayout {
    /// Short name for logs.
    pub name: &'static str,
    /// Total size of the structure in bytes.
    pub size: usize,
    /// `st_dev`
    pub dev: FieldSpec,
    /// `st_ino`
    pub ino: FieldSpec,
    /// `st_mode`
    pub mode: FieldSpec,
    /// `st_nlink`
    pub nlink: FieldSpec,
    /// `st_uid`
    pub uid: FieldSpec,
    /// `st_gid`
    pub gid: FieldSpec,
    /// `st_rdev`
    pub rdev: FieldSpec,
    /// `st_size`
    pub file_size: FieldSpec,
    /// `st_blksize`
    pub blksize: FieldSpec,
    /// `st_blocks`
    pub blocks: FieldSpec,
    /// `st_atim` / `st_atimespec`
    pub atime: TimespecSpec,
    /// `st_mtim` / `st_mtimespec`
    pub mtime: TimespecSpec,
    /// `st_ctim` / `st_ctimespec`
    pub ctime: TimespecSpec,
    /// Fields only macOS carries.
    pub darwin: Option<DarwinExtras>,
}

/// macOS-only trailing fields of `struct stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DarwinExtras {
    /// `st_birthtimespec`
    pub birthtime: TimespecSpec,
    /// `st_flags`
    pub flags: FieldSpec,
    /// `st_gen`
    pub generation: FieldSpec,
}

use FieldWidth::{I32, I64, U16, U32, U64};

/// glibc `struct stat` on x86-64.
pub const LINUX_AMD64: NativeLayout = NativeLayout {
    name: "linux-x86_64",
    size: 144,
    dev: FieldSpec::new(0, U64),
    ino: FieldSpec::new(8, U64),
    nlink: FieldSpec::new(16, U64),
    mode: FieldSpec::new(24, U32),
    uid: FieldSpec::new(28, U32),
    gid: FieldSpec::new(32, U32),
    rdev: FieldSpec::new(40, U64),
    file_size: FieldSpec::new(48, I64),
    blksize: FieldSpec::new(56, I64),
    blocks: FieldSpec::new(64, I64),
    atime: TimespecSpec { offset: 72 },
    mtime: TimespecSpec { offset: 88 },
    ctime: TimespecSpec { offset: 104 },
    darwin: None,
};

/// glibc `struct stat` on aarch64 (the generic kernel layout).
pub const LINUX_ARM64: NativeLayout = NativeLayout {
    name: "linux-aarch64",
    size: 128,
    dev: FieldSpec::new(0, U64),
    ino: FieldSpec::new(8, U64),
    mode: FieldSpec::new(16, U32),
    nlink: FieldSpec::new(20, U32),
    uid: FieldSpec::new(24, U32),
    gid: FieldSpec::new(28, U32),
    rdev: FieldSpec::new(32, U64),
    file_size: FieldSpec::new(48, I64),
    blksize: FieldSpec::new(56, I32),
    blocks: FieldSpec::new(64, I64),
    atime: TimespecSpec { offset: 72 },
    mtime: TimespecSpec { offset: 88 },
    ctime: TimespecSpec { offset: 104 },
    darwin: None,
};

const DARWIN_STAT64: NativeLayout = NativeLayout {
    name: "darwin-stat64",
    size: 144,
    dev: FieldSpec::new(0, I32),
    mode: FieldSpec::new(4, U16),
    nlink: FieldSpec::new(6, U16),
    ino: FieldSpec::new(8, U64),
    uid: FieldSpec::new(16, U32),
    gid: FieldSpec::new(20, U32),
    rdev: FieldSpec::new(24, I32),
    atime: TimespecSpec { offset: 32 },
    mtime: TimespecSpec { offset: 48 },
    ctime: TimespecSpec { offset: 64 },
    file_size: FieldSpec::new(96, I64),
    blocks: FieldSpec::new(104, I64),
    blksize: FieldSpec::new(112, I32),
    darwin: Some(DarwinExtras {
        birthtime: TimespecSpec { offset: 80 },
        flags: FieldSpec::new(116, U32),
        generation: FieldSpec::new(120, U32),
    }),
};

/// macOS 64-bit-inode `struct stat` on Intel (`stat$INODE64`).
pub const MACOS_AMD64: NativeLayout = NativeLayout {
    name: "macos-x86_64",
    ..DARWIN_STAT64
};

/// macOS `struct stat` on Apple Silicon (64-bit inodes are the only ABI).
pub const MACOS_ARM64: NativeLayout = NativeLayout {
    name: "macos-arm64",
    ..DARWIN_STAT64
};

/// Largest structure across all layouts.
pub const MAX_LAYOUT_SIZE: usize = 144;

/// The layout for an (OS, architecture) pair.
#[must_use]
pub const fn layout_for(os: OsKind, arch: Architecture) -> &'static NativeLayout {
    match (os, arch) {
        (OsKind::Linux, Architecture::Amd64) => &LINUX_AMD64,
        (OsKind::Linux, Architecture::Arm64) => &LINUX_ARM64,
        (OsKind::MacOs, Architecture::Amd64) => &MACOS_AMD64,
        (OsKind::MacOs, Architecture::Arm64) => &MACOS_ARM64,
    }
}

impl NativeLayout {
    /// All fields with their names, in declaration order of the descriptor.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, FieldSpec)> {
        let mut fields = vec![
            ("dev", self.dev),
            ("ino", self.ino),
            ("mode", self.mode),
            ("nlink", self.nlink),
            ("uid", self.uid),
            ("gid", self.gid),
            ("rdev", self.rdev),
            ("size", self.file_size),
            ("blksize", self.blksize),
            ("blocks", self.blocks),
            ("atime.sec", self.atime.seconds()),
            ("atime.nsec", self.atime.nanoseconds()),
            ("mtime.sec", self.mtime.seconds()),
            ("mtime.nsec", self.mtime.nanoseconds()),
            ("ctime.sec", self.ctime.seconds()),
            ("ctime.nsec", self.ctime.nanoseconds()),
        ];
        if let Some(extras) = self.darwin {
            fields.extend([
                ("birthtime.sec", extras.birthtime.seconds()),
                ("birthtime.nsec", extras.birthtime.nanoseconds()),
                ("flags", extras.flags),
                ("gen", extras.generation),
            ]);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [(OsKind, Architecture); 4] = [
        (OsKind::Linux, Architecture::Amd64),
        (OsKind::Linux, Architecture::Arm64),
        (OsKind::MacOs, Architecture::Amd64),
        (OsKind::MacOs, Architecture::Arm64),
    ];

    #[test]
    fn test_sizes() {
        assert_eq!(layout_for(OsKind::Linux, Architecture::Amd64).size, 144);
        assert_eq!(layout_for(OsKind::Linux, Architecture::Arm64).size, 128);
        assert_eq!(layout_for(OsKind::MacOs, Architecture::Amd64).size, 144);
        assert_eq!(layout_for(OsKind::MacOs, Architecture::Arm64).size, 144);
    }

    #[test]
    fn test_fields_fit_and_do_not_overlap() {
        for (os, arch) in ALL {
            let layout = layout_for(os, arch);
            let mut fields = layout.fields();
            fields.sort_by_key(|(_, f)| f.offset);

            for (name, field) in &fields {
                assert!(field.end() <= layout.size, "{} {name} past end", layout.name);
                assert_eq!(
                    field.offset % field.width.size(),
                    0,
                    "{} {name} misaligned",
                    layout.name
                );
            }
            for pair in fields.windows(2) {
                assert!(
                    pair[0].1.end() <= pair[1].1.offset,
                    "{} {} overlaps {}",
                    layout.name,
                    pair[0].0,
                    pair[1].0
                );
            }
        }
    }

    #[test]
    fn test_max_layout_size() {
        let max = ALL.iter().map(|&(os, arch)| layout_for(os, arch).size).max();
        assert_eq!(max, Some(MAX_LAYOUT_SIZE));
    }

    #[test]
    fn test_linux_orderings_differ() {
        // x86-64 puts nlink before mode; aarch64 the other way round.
        assert!(LINUX_AMD64.nlink.offset < LINUX_AMD64.mode.offset);
        assert!(LINUX_ARM64.mode.offset < LINUX_ARM64.nlink.offset);
        assert_eq!(LINUX_ARM64.blksize.width, FieldWidth::I32);
    }

    #[test]
    fn test_darwin_layouts_share_offsets() {
        assert_eq!(MACOS_AMD64.fields(), MACOS_ARM64.fields());
        assert_ne!(MACOS_AMD64.name, MACOS_ARM64.name);
        assert!(MACOS_AMD64.darwin.is_some());
        assert!(LINUX_AMD64.darwin.is_none());
    }

    #[test]
    fn test_timespec_fields() {
        let ts = TimespecSpec { offset: 72 };
        assert_eq!(ts.seconds(), FieldSpec::new(72, FieldWidth::I64));
        assert_eq!(ts.nanoseconds(), FieldSpec::new(80, FieldWidth::U64));
    }
}
