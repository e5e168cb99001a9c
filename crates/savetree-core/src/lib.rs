//! savetree-core: read-only directory enumeration for save-data containers
//!
//! This crate focuses on a small surface:
//! - The container interface (directories, entry lists, fixed-size names)
//! - Two backends: extracted save directories and zip archives
//! - A resource context that opens either kind from a path
//! - The tree listing itself (`+dir` / `-file`, one space per level)
//!
pub mod archive;
pub mod container;
pub mod enumerate;
pub mod error;
pub mod host;
pub mod name;
pub mod resource;

pub use container::{Entries, Entry, EntryList, MAX_DEPTH, ROOT_INO, SaveArchive, SaveDir};
pub use enumerate::{format_line, print_tree, tree_string, visit};
pub use error::{Error, ListKind, Result};
pub use name::{EntryName, NAME_LEN};
pub use resource::{Dir, Resource, ResourceConfig, SaveData};
