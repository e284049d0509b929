use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Block size reported for every entry.
pub const BLKSIZE: u32 = 512;

/// Nominal size of a directory entry.
pub const DIR_SIZE: u64 = 4096;

pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o755;
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o644;

/// Mask applied to every permission value before it is stored.
pub const PERMISSION_BITS: u32 = 0o7777;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Directory,
    RegularFile,
}

impl FileKind {
    pub fn nlink(self) -> u32 {
        match self {
            FileKind::Directory => 2,
            FileKind::RegularFile => 1,
        }
    }

    pub fn initial_size(self) -> u64 {
        match self {
            FileKind::Directory => DIR_SIZE,
            FileKind::RegularFile => 0,
        }
    }

    pub fn default_permissions(self) -> u32 {
        match self {
            FileKind::Directory => DEFAULT_DIR_PERMISSIONS,
            FileKind::RegularFile => DEFAULT_FILE_PERMISSIONS,
        }
    }

    pub fn is_dir(self) -> bool {
        self == FileKind::Directory
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Directory => f.write_str("Directory"),
            FileKind::RegularFile => f.write_str("RegularFile"),
        }
    }
}

impl FromStr for FileKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Directory" => Ok(FileKind::Directory),
            "RegularFile" => Ok(FileKind::RegularFile),
            other => Err(StoreError::InvalidArgument(format!(
                "unknown file_type {:?}, expected Directory or RegularFile",
                other
            ))),
        }
    }
}

/// Number of `blksize` blocks needed to hold `size` bytes.
pub fn blocks_for(size: u64, blksize: u32) -> u64 {
    size.div_ceil(u64::from(blksize.max(1)))
}

/// Metadata for one filesystem object.
///
/// Serialized field names match what the FUSE client deserializes, so `kind`
/// goes over the wire as `file_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub ino: u64,
    pub path: String,
    pub size: u64,
    #[serde(rename = "file_type")]
    pub kind: FileKind,
    pub permissions: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub atime: u64,
    pub mtime: u64,
    pub ctime: u64,
    pub blocks: u64,
    pub blksize: u32,
}

impl Entry {
    pub(crate) fn new(
        ino: u64,
        path: String,
        kind: FileKind,
        permissions: u32,
        uid: u32,
        gid: u32,
        now: u64,
    ) -> Self {
        let size = kind.initial_size();
        Self {
            ino,
            path,
            size,
            kind,
            permissions: permissions & PERMISSION_BITS,
            nlink: kind.nlink(),
            uid,
            gid,
            atime: now,
            mtime: now,
            ctime: now,
            blocks: blocks_for(size, BLKSIZE),
            blksize: BLKSIZE,
        }
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        self.size = size;
        self.blocks = blocks_for(size, self.blksize);
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}
