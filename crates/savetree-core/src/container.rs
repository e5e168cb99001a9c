//! The read-only surface a save container exposes to its callers.
//!
//! Handles are plain owned values: opening returns a new value, dropping it
//! releases it. A directory handle never borrows its parent, so a child may be
//! released before or after the parent without any ordering hazard.

use crate::error::Result;
use crate::name::EntryName;

/// Identifier of the root directory in every container.
pub const ROOT_INO: u32 = 1;

/// Deepest directory nesting a container may present. The root is depth 0.
pub const MAX_DEPTH: usize = 128;

/// One child of a directory: its name and the container's identifier for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub name: EntryName,
    pub ino: u32,
}

/// Ordered, read-only snapshot of one directory's sub-directories or
/// sub-files.
pub trait EntryList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Panics if `index >= self.len()`.
    fn get(&self, index: usize) -> Entry;
}

/// An open directory node.
pub trait SaveDir: Sized {
    type List: EntryList;

    fn ino(&self) -> u32;

    fn list_sub_dir(&self) -> Result<Self::List>;

    fn list_sub_file(&self) -> Result<Self::List>;

    fn open_sub_dir(&self, name: &EntryName) -> Result<Self>;
}

/// An open container: the owner of one directory tree.
pub trait SaveArchive {
    type Dir: SaveDir;

    /// Opens any directory by identifier. Unknown identifiers, and
    /// identifiers of files, fail with `Error::NotFound`.
    fn open_dir(&self, ino: u32) -> Result<Self::Dir>;

    fn open_root(&self) -> Result<Self::Dir> {
        self.open_dir(ROOT_INO)
    }
}

/// Owned entry list used by the bundled backends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries(Vec<Entry>);

impl Entries {
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|e| e.name.to_string()).collect()
    }
}

impl From<Vec<Entry>> for Entries {
    fn from(v: Vec<Entry>) -> Self {
        Self(v)
    }
}

impl EntryList for Entries {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Entry {
        self.0[index]
    }
}
