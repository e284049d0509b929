//! Request and response bodies. Every request field is optional at the
//! serde level so a missing field surfaces as a store `InvalidArgument`
//! rather than a generic deserialization failure.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::entry::{Entry, FileKind};
use crate::store::{NewEntry, SetAttributes};

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

impl PathQuery {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveQuery {
    pub path: Option<String>,
    pub is_directory: Option<String>,
}

impl RemoveQuery {
    pub fn expected_kind(&self) -> FileKind {
        if self.is_directory.as_deref() == Some("true") {
            FileKind::Directory
        } else {
            FileKind::RegularFile
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRequest {
    pub path: Option<String>,
    pub file_type: Option<String>,
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub rdev: Option<u32>,
    pub umask: Option<u32>,
}

impl CreateRequest {
    pub fn into_new_entry(self) -> Result<NewEntry, StoreError> {
        let path = match self.path {
            Some(p) if !p.is_empty() => p,
            _ => return Err(StoreError::InvalidArgument("path is required".into())),
        };
        let kind: FileKind = self
            .file_type
            .as_deref()
            .ok_or_else(|| StoreError::InvalidArgument("file_type is required".into()))?
            .parse()?;
        Ok(NewEntry {
            path,
            kind,
            permissions: self.mode,
            uid: self.uid,
            gid: self.gid,
            umask: self.umask,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SetAttrRequest {
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub size: Option<u64>,
    pub flags: Option<u32>,
}

impl From<SetAttrRequest> for SetAttributes {
    fn from(req: SetAttrRequest) -> Self {
        SetAttributes {
            mode: req.mode,
            uid: req.uid,
            gid: req.gid,
            size: req.size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    pub path: Option<String>,
    pub flags: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenReply {
    pub file_handle: u64,
    pub flags: i32,
    pub path: String,
}

/// An entry plus the attributes the FUSE client expects on create and
/// setattr replies. Creation time mirrors `ctime`; BSD flags are not modeled.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryReply {
    #[serde(flatten)]
    pub entry: Entry,
    pub crtime: u64,
    pub flags: Option<u32>,
}

impl From<Entry> for EntryReply {
    fn from(entry: Entry) -> Self {
        Self {
            crtime: entry.ctime,
            flags: None,
            entry,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageReply {
    pub message: String,
}
