use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::name::EntryName;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while opening or walking a save container.
///
/// Every variant aborts the traversal that produced it; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The container path could not be opened at all.
    #[error("cannot open container {}", path.display())]
    ContainerOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path exists but is neither a save directory nor a save archive.
    #[error("unsupported container: {}", .0.display())]
    UnsupportedContainer(PathBuf),

    /// The container was readable but its layout is inconsistent.
    #[error("corrupt container: {0}")]
    Corrupt(String),

    /// Listing the children of a directory failed.
    #[error("cannot list {kind} of directory #{ino}")]
    List {
        ino: u32,
        kind: ListKind,
        #[source]
        source: Box<Error>,
    },

    /// A directory named by a listing could not be opened.
    #[error("cannot open sub-directory {name}")]
    OpenSubDir {
        name: EntryName,
        #[source]
        source: Box<Error>,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid entry name: {0}")]
    InvalidName(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("archive error")]
    Zip(#[from] zip::result::ZipError),
}

/// Which of the two per-directory listings an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    SubDirs,
    SubFiles,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::SubDirs => f.write_str("sub-directories"),
            ListKind::SubFiles => f.write_str("sub-files"),
        }
    }
}
