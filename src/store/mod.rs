//! The metadata store: inode allocation, path <-> inode resolution and the
//! containment and type rules every operation must preserve.
//!
//! All state lives in one `InodeTable` behind one `RwLock`. Reads share the
//! lock; create, remove and attribute changes take it exclusively for the
//! whole check-then-update, so the parent check, the emptiness check and the
//! inode counter always see the same snapshot the write is applied to. No
//! operation performs I/O or awaits while holding the lock.
//!
//! The store returns typed `StoreError`s and does not log; reporting belongs
//! to the caller.

pub mod entry;
pub mod handles;
pub mod inodes;
pub mod path;

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use self::entry::{Entry, FileKind, PERMISSION_BITS};
use self::handles::HandleAllocator;
use self::inodes::{InodeTable, ROOT_INO};
use self::path::{parent_of, ROOT};
use crate::config::MetafsConfig;
use crate::error::StoreError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Arguments for `MetadataStore::create_entry`. `None` means "not supplied";
/// an explicit zero is kept as zero.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub path: String,
    pub kind: FileKind,
    pub permissions: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub umask: Option<u32>,
}

impl NewEntry {
    pub fn new(path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            path: path.into(),
            kind,
            permissions: None,
            uid: None,
            gid: None,
            umask: None,
        }
    }
}

/// Attribute changes for `MetadataStore::set_attributes`.
#[derive(Debug, Clone, Default)]
pub struct SetAttributes {
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub size: Option<u64>,
}

impl SetAttributes {
    fn is_empty(&self) -> bool {
        self.mode.is_none() && self.uid.is_none() && self.gid.is_none() && self.size.is_none()
    }
}

/// Ordered copy of both indexes, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub filesystem: BTreeMap<String, Entry>,
    #[serde(rename = "inodeMap")]
    pub inode_map: BTreeMap<u64, String>,
}

pub struct MetadataStore {
    table: RwLock<InodeTable>,
    handles: HandleAllocator,
    default_uid: u32,
    default_gid: u32,
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn require_path(path: &str) -> StoreResult<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidArgument("path is required".into()));
    }
    Ok(())
}

/// Parse an inode number from its textual form. Any well-formed integer is
/// accepted; one outside the `u64` range names no inode.
pub fn parse_ino(raw: &str) -> StoreResult<u64> {
    let s = raw.trim();
    let digits = s.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::InvalidArgument(format!("invalid inode: {}", raw)));
    }
    if s.starts_with('-') {
        return Err(StoreError::NotFound(format!("inode {}", s)));
    }
    digits
        .parse()
        .map_err(|_| StoreError::NotFound(format!("inode {}", s)))
}

impl MetadataStore {
    /// A store holding only the root directory.
    pub fn new(default_uid: u32, default_gid: u32) -> Self {
        let root = Entry::new(
            ROOT_INO,
            ROOT.to_string(),
            FileKind::Directory,
            FileKind::Directory.default_permissions(),
            default_uid,
            default_gid,
            now_secs(),
        );
        Self {
            table: RwLock::new(InodeTable::new(root)),
            handles: HandleAllocator::new(),
            default_uid,
            default_gid,
        }
    }

    /// A store holding root plus the fixed demo entries:
    /// `/test.txt` (ino 2), `/documents` (ino 3), `/documents/readme.md` (ino 4).
    pub fn seeded(default_uid: u32, default_gid: u32) -> Self {
        let store = Self::new(default_uid, default_gid);
        {
            let mut table = store.table.write();
            let now = now_secs();
            let seed: [(&str, FileKind, u64); 3] = [
                ("/test.txt", FileKind::RegularFile, 12),
                ("/documents", FileKind::Directory, entry::DIR_SIZE),
                ("/documents/readme.md", FileKind::RegularFile, 256),
            ];
            for (path, kind, size) in seed {
                let ino = table.alloc_ino();
                let mut e = Entry::new(
                    ino,
                    path.to_string(),
                    kind,
                    kind.default_permissions(),
                    default_uid,
                    default_gid,
                    now,
                );
                e.set_size(size);
                table.insert(e);
            }
        }
        store
    }

    pub fn from_config(config: &MetafsConfig) -> Self {
        if config.seed {
            Self::seeded(config.default_uid, config.default_gid)
        } else {
            Self::new(config.default_uid, config.default_gid)
        }
    }

    pub fn resolve_inode(&self, ino: u64) -> StoreResult<String> {
        self.table
            .read()
            .get_path(ino)
            .map(str::to_string)
            .ok_or_else(|| StoreError::NotFound(format!("inode {}", ino)))
    }

    pub fn get_metadata(&self, path: &str) -> StoreResult<Entry> {
        require_path(path)?;
        self.table
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    pub fn create_entry(&self, new: NewEntry) -> StoreResult<Entry> {
        require_path(&new.path)?;
        path::validate_new(&new.path)?;

        let mut table = self.table.write();
        if table.contains(&new.path) {
            return Err(StoreError::AlreadyExists(new.path));
        }
        // Root always exists, so a missing parent can only be a non-root path.
        let parent = parent_of(&new.path).unwrap_or(ROOT);
        match table.get(parent) {
            None => return Err(StoreError::NotFound(parent.to_string())),
            Some(p) if !p.is_dir() => return Err(StoreError::NotDirectory(parent.to_string())),
            Some(_) => {}
        }

        let mode = new.permissions.unwrap_or_else(|| new.kind.default_permissions());
        let permissions = mode & !new.umask.unwrap_or(0) & PERMISSION_BITS;
        let ino = table.alloc_ino();
        let entry = Entry::new(
            ino,
            new.path,
            new.kind,
            permissions,
            new.uid.unwrap_or(self.default_uid),
            new.gid.unwrap_or(self.default_gid),
            now_secs(),
        );
        table.insert(entry.clone());
        Ok(entry)
    }

    /// Remove `path`, which must be of kind `expected`. Returns the removed entry.
    pub fn remove_entry(&self, path: &str, expected: FileKind) -> StoreResult<Entry> {
        require_path(path)?;

        let mut table = self.table.write();
        let actual = table
            .get(path)
            .map(|e| e.kind)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        match (expected, actual) {
            (FileKind::RegularFile, FileKind::Directory) => {
                return Err(StoreError::IsDirectory(path.to_string()))
            }
            (FileKind::Directory, FileKind::RegularFile) => {
                return Err(StoreError::NotDirectory(path.to_string()))
            }
            _ => {}
        }
        if actual.is_dir() {
            if path == ROOT {
                return Err(StoreError::RootBusy);
            }
            if table.child_count(path) > 0 {
                return Err(StoreError::NotEmpty(path.to_string()));
            }
        }

        table
            .remove_by_path(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    /// Issue a handle for a regular file. Flags are echoed back by the caller
    /// and not interpreted here.
    pub fn open_handle(&self, path: &str, _flags: i32) -> StoreResult<u64> {
        require_path(path)?;
        let table = self.table.read();
        match table.get(path) {
            None => Err(StoreError::NotFound(path.to_string())),
            Some(e) if e.is_dir() => Err(StoreError::IsDirectory(path.to_string())),
            Some(_) => Ok(self.handles.alloc()),
        }
    }

    /// Change ownership, permission bits or size. Kind, inode and link count
    /// never change.
    pub fn set_attributes(&self, path: &str, attrs: SetAttributes) -> StoreResult<Entry> {
        require_path(path)?;

        let mut table = self.table.write();
        let entry = table
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        if attrs.size.is_some() && entry.is_dir() {
            return Err(StoreError::IsDirectory(path.to_string()));
        }
        if attrs.is_empty() {
            return Ok(entry.clone());
        }

        let now = now_secs();
        if let Some(mode) = attrs.mode {
            entry.permissions = mode & PERMISSION_BITS;
        }
        if let Some(uid) = attrs.uid {
            entry.uid = uid;
        }
        if let Some(gid) = attrs.gid {
            entry.gid = gid;
        }
        if let Some(size) = attrs.size {
            entry.set_size(size);
            entry.mtime = now;
        }
        entry.ctime = now;
        Ok(entry.clone())
    }

    /// Immediate children of a directory, ordered by path.
    pub fn list_directory(&self, path: &str) -> StoreResult<Vec<Entry>> {
        require_path(path)?;
        let table = self.table.read();
        match table.get(path) {
            None => Err(StoreError::NotFound(path.to_string())),
            Some(e) if !e.is_dir() => Err(StoreError::NotDirectory(path.to_string())),
            Some(_) => Ok(table.children(path).cloned().collect()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let (filesystem, inode_map) = self.table.read().dump();
        Snapshot {
            filesystem,
            inode_map,
        }
    }

    /// Number of live entries, root included.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }
}
