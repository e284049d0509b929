use thiserror::Error;

/// Failure classes callers react to. Several `StoreError` variants share a
/// kind; the variant itself says which condition occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    TypeMismatch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("file already exists: {0}")]
    AlreadyExists(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("root directory cannot be removed")]
    RootBusy,

    #[error("is a directory: {0}")]
    IsDirectory(String),

    #[error("not a directory: {0}")]
    NotDirectory(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::AlreadyExists(_) | StoreError::NotEmpty(_) | StoreError::RootBusy => {
                ErrorKind::Conflict
            }
            StoreError::IsDirectory(_) | StoreError::NotDirectory(_) => ErrorKind::TypeMismatch,
        }
    }
}

#[derive(Error, Debug)]
pub enum MetafsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MetafsError>;
