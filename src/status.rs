//! The OS-independent file status record.
//!
//! Every native layout is translated into [`NormalizedStatus`], whose
//! integer fields are wide enough for all of them.

use bitflags::bitflags;
use std::fmt;

/// A point in time as stored by the kernel: seconds and nanoseconds since
/// the Unix epoch, copied verbatim from the native `struct timespec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Timespec {
    /// Whole seconds (may be negative for pre-1970 times).
    pub seconds: i64,
    /// Nanoseconds within the second.
    pub nanoseconds: u64,
}

impl Timespec {
    /// Create a timespec.
    #[must_use]
    pub const fn new(seconds: i64, nanoseconds: u64) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }
}

/// Normalized result of a native `stat` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NormalizedStatus {
    /// Device containing the file.
    pub dev: u64,
    /// Inode number.
    pub ino: u64,
    /// File type and permission bits.
    pub mode: u32,
    /// Number of hard links.
    pub nlink: u64,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
    /// Device id, for character and block special files.
    pub rdev: u64,
    /// Size in bytes.
    pub size: i64,
    /// Last access.
    pub atime: Timespec,
    /// Last modification.
    pub mtime: Timespec,
    /// Last status change.
    pub ctime: Timespec,
    /// Preferred I/O block size.
    pub blksize: i64,
    /// Number of 512-byte blocks allocated.
    pub blocks: i64,
}

const S_IFMT: u32 = 0o170_000;

/// File type encoded in the high bits of `st_mode`.
///
/// The encoding is shared by Linux and macOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Named pipe.
    Fifo,
    /// Character device.
    CharDevice,
    /// Directory.
    Directory,
    /// Block device.
    BlockDevice,
    /// Regular file.
    Regular,
    /// Symbolic link.
    Symlink,
    /// Socket.
    Socket,
    /// Type bits that match none of the above.
    Unknown(u32),
}

impl FileType {
    /// Classify the type bits of a raw mode.
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            0o010_000 => Self::Fifo,
            0o020_000 => Self::CharDevice,
            0o040_000 => Self::Directory,
            0o060_000 => Self::BlockDevice,
            0o100_000 => Self::Regular,
            0o120_000 => Self::Symlink,
            0o140_000 => Self::Socket,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fifo => write!(f, "fifo"),
            Self::CharDevice => write!(f, "character device"),
            Self::Directory => write!(f, "directory"),
            Self::BlockDevice => write!(f, "block device"),
            Self::Regular => write!(f, "regular file"),
            Self::Symlink => write!(f, "symbolic link"),
            Self::Socket => write!(f, "socket"),
            Self::Unknown(bits) => write!(f, "unknown ({bits:#o})"),
        }
    }
}

bitflags! {
    /// Permission bits of a file mode, as accepted by `chmod`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileMode: u32 {
        /// Set user id on execution.
        const SET_UID = 0o4000;
        /// Set group id on execution.
        const SET_GID = 0o2000;
        /// Restricted deletion (sticky).
        const STICKY = 0o1000;
        /// Owner may read.
        const OWNER_READ = 0o400;
        /// Owner may write.
        const OWNER_WRITE = 0o200;
        /// Owner may execute.
        const OWNER_EXEC = 0o100;
        /// Group may read.
        const GROUP_READ = 0o040;
        /// Group may write.
        const GROUP_WRITE = 0o020;
        /// Group may execute.
        const GROUP_EXEC = 0o010;
        /// Others may read.
        const OTHER_READ = 0o004;
        /// Others may write.
        const OTHER_WRITE = 0o002;
        /// Others may execute.
        const OTHER_EXEC = 0o001;

        /// Read, write and execute for the owner.
        const OWNER_ALL = Self::OWNER_READ.bits() | Self::OWNER_WRITE.bits() | Self::OWNER_EXEC.bits();
        /// Execute for everyone.
        const ALL_EXEC = Self::OWNER_EXEC.bits() | Self::GROUP_EXEC.bits() | Self::OTHER_EXEC.bits();
    }
}

impl FileMode {
    /// Permission bits of a raw `st_mode`, discarding the type bits.
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        Self::from_bits_truncate(mode)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.bits())
    }
}

impl NormalizedStatus {
    /// The file type encoded in `mode`.
    #[must_use]
    pub const fn file_type(&self) -> FileType {
        FileType::from_mode(self.mode)
    }

    /// The permission bits of `mode`.
    #[must_use]
    pub const fn permissions(&self) -> FileMode {
        FileMode::from_mode(self.mode)
    }

    /// Whether this is a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type(), FileType::Directory)
    }

    /// Whether this is a regular file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.file_type(), FileType::Regular)
    }

    /// Whether this is a symbolic link.
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self.file_type(), FileType::Symlink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_mode() {
        assert_eq!(FileType::from_mode(0o100_644), FileType::Regular);
        assert_eq!(FileType::from_mode(0o040_755), FileType::Directory);
        assert_eq!(FileType::from_mode(0o120_777), FileType::Symlink);
        assert_eq!(FileType::from_mode(0o020_666), FileType::CharDevice);
        assert_eq!(FileType::from_mode(0o060_660), FileType::BlockDevice);
        assert_eq!(FileType::from_mode(0o010_600), FileType::Fifo);
        assert_eq!(FileType::from_mode(0o140_755), FileType::Socket);
        assert_eq!(FileType::from_mode(0o000_644), FileType::Unknown(0));
    }

    #[test]
    fn test_permissions_drop_type_bits() {
        let status = NormalizedStatus {
            mode: 0o100_755,
            ..Default::default()
        };
        assert_eq!(status.permissions().bits(), 0o755);
        assert!(status.permissions().contains(FileMode::OWNER_ALL));
        assert!(status.permissions().contains(FileMode::ALL_EXEC));
        assert!(!status.permissions().contains(FileMode::GROUP_WRITE));
    }

    #[test]
    fn test_special_bits() {
        let mode = FileMode::from_mode(0o104_755);
        assert!(mode.contains(FileMode::SET_UID));
        assert!(!mode.contains(FileMode::STICKY));
        assert_eq!(mode.to_string(), "4755");
    }

    #[test]
    fn test_predicates() {
        let dir = NormalizedStatus {
            mode: 0o040_700,
            ..Default::default()
        };
        assert!(dir.is_dir());
        assert!(!dir.is_file());
        assert!(!dir.is_symlink());
    }

    #[test]
    fn test_file_type_display() {
        assert_eq!(FileType::Regular.to_string(), "regular file");
        assert_eq!(FileType::Unknown(0o170_000).to_string(), "unknown (0o170000)");
    }

    #[test]
    fn test_timespec_ordering() {
        assert!(Timespec::new(1, 0) > Timespec::new(0, 999_999_999));
        assert!(Timespec::new(-1, 5) < Timespec::new(0, 0));
    }
}
