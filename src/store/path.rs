//! Path string helpers. Store paths are plain `/`-separated strings, not
//! `std::path::Path`, because they never touch the host filesystem.

use crate::error::StoreError;

pub const ROOT: &str = "/";

/// Parent of `path`: everything before the last `/`, or root when nothing
/// remains. Root has no parent.
pub fn parent_of(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) | None => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
    }
}

/// Check that `path` is a well-formed absolute path a new entry may take.
pub fn validate_new(path: &str) -> Result<(), StoreError> {
    if path.is_empty() {
        return Err(StoreError::InvalidArgument("path is required".into()));
    }
    if !path.starts_with('/') {
        return Err(StoreError::InvalidArgument(format!(
            "path must be absolute: {}",
            path
        )));
    }
    if path == ROOT {
        return Ok(());
    }
    for segment in path[1..].split('/') {
        match segment {
            "" => {
                return Err(StoreError::InvalidArgument(format!(
                    "empty path segment in {}",
                    path
                )))
            }
            "." | ".." => {
                return Err(StoreError::InvalidArgument(format!(
                    "relative segment in {}",
                    path
                )))
            }
            s if s.contains('\0') => {
                return Err(StoreError::InvalidArgument("path contains null byte".into()))
            }
            _ => {}
        }
    }
    Ok(())
}
