// Save trees packed into a zip archive
//
// The central directory is read once when the archive is opened and turned
// into an immutable node index. Handles only point into that index.
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, trace};
use zip::ZipArchive;

use crate::container::{Entries, Entry, MAX_DEPTH, ROOT_INO, SaveArchive, SaveDir};
use crate::error::{Error, Result};
use crate::name::EntryName;

#[derive(Debug)]
enum NodeKind {
    Dir { dirs: Vec<u32>, files: Vec<u32> },
    File,
}

#[derive(Debug)]
struct Node {
    name: EntryName,
    kind: NodeKind,
}

#[derive(Debug)]
struct Index {
    // ino N lives at nodes[N - 1]
    nodes: Vec<Node>,
    by_name: HashMap<(u32, EntryName), u32>,
}

impl Index {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: EntryName::default(),
                kind: NodeKind::Dir {
                    dirs: Vec::new(),
                    files: Vec::new(),
                },
            }],
            by_name: HashMap::new(),
        }
    }

    fn node(&self, ino: u32) -> Option<&Node> {
        let idx = ino.checked_sub(1)? as usize;
        self.nodes.get(idx)
    }

    fn insert(&mut self, parent: u32, name: EntryName, dir: bool) -> u32 {
        let kind = if dir {
            NodeKind::Dir {
                dirs: Vec::new(),
                files: Vec::new(),
            }
        } else {
            NodeKind::File
        };
        self.nodes.push(Node { name, kind });
        let ino = self.nodes.len() as u32;
        self.by_name.insert((parent, name), ino);
        if let NodeKind::Dir { dirs, files } = &mut self.nodes[parent as usize - 1].kind {
            if dir {
                dirs.push(ino);
            } else {
                files.push(ino);
            }
        }
        ino
    }

    fn is_dir(&self, ino: u32) -> bool {
        matches!(self.node(ino), Some(Node { kind: NodeKind::Dir { .. }, .. }))
    }

    fn get_or_make_dir(&mut self, parent: u32, name: EntryName, member: &str) -> Result<u32> {
        match self.by_name.get(&(parent, name)).copied() {
            Some(ino) if self.is_dir(ino) => Ok(ino),
            Some(_) => Err(Error::Corrupt(format!(
                "{}: {} is both a file and a directory",
                member, name
            ))),
            None => Ok(self.insert(parent, name, true)),
        }
    }

    fn add_member(&mut self, member: &str, is_dir: bool) -> Result<()> {
        let trimmed = if is_dir {
            member.strip_suffix('/').unwrap_or(member)
        } else {
            member
        };
        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() > MAX_DEPTH {
            return Err(Error::Corrupt(format!(
                "member nested {} levels deep, limit is {}",
                parts.len(),
                MAX_DEPTH
            )));
        }
        let mut parent = ROOT_INO;
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || *part == "." || *part == ".." {
                return Err(Error::Corrupt(format!("bad path component in {:?}", member)));
            }
            let name = EntryName::new(part)
                .map_err(|e| Error::Corrupt(format!("{}: {}", member, e)))?;
            let last = i + 1 == parts.len();
            if !last || is_dir {
                parent = self.get_or_make_dir(parent, name, member)?;
            } else if self.by_name.contains_key(&(parent, name)) {
                return Err(Error::Corrupt(format!("duplicate member {:?}", member)));
            } else {
                self.insert(parent, name, false);
            }
        }
        Ok(())
    }
}

/// A save container stored as a zip archive.
#[derive(Debug, Clone)]
pub struct ArchiveSave {
    index: Rc<Index>,
}

impl ArchiveSave {
    pub fn open(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|source| Error::ContainerOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut index = Index::new();
        for i in 0..zip.len() {
            let (name, is_dir) = {
                let member = zip.by_index_raw(i)?;
                (member.name().to_owned(), member.is_dir())
            };
            index.add_member(&name, is_dir)?;
        }
        debug!(members = zip.len(), nodes = index.nodes.len(), "indexed archive");
        Ok(Self {
            index: Rc::new(index),
        })
    }
}

impl SaveArchive for ArchiveSave {
    type Dir = ArchiveDir;

    fn open_dir(&self, ino: u32) -> Result<ArchiveDir> {
        if !self.index.is_dir(ino) {
            return Err(Error::NotFound(format!("no directory #{}", ino)));
        }
        Ok(ArchiveDir::new(self.index.clone(), ino))
    }
}

/// An open directory of an [`ArchiveSave`].
#[derive(Debug)]
pub struct ArchiveDir {
    index: Rc<Index>,
    ino: u32,
}

impl ArchiveDir {
    fn new(index: Rc<Index>, ino: u32) -> Self {
        trace!(ino, "open dir");
        Self { index, ino }
    }

    fn children(&self, want_dirs: bool) -> Result<Entries> {
        let Some(Node {
            kind: NodeKind::Dir { dirs, files },
            ..
        }) = self.index.node(self.ino)
        else {
            return Err(Error::NotFound(format!("no directory #{}", self.ino)));
        };
        let inos = if want_dirs { dirs } else { files };
        let mut out = Vec::with_capacity(inos.len());
        for &ino in inos {
            let node = self
                .index
                .node(ino)
                .ok_or_else(|| Error::Corrupt(format!("dangling entry #{}", ino)))?;
            out.push(Entry {
                name: node.name,
                ino,
            });
        }
        Ok(out.into())
    }
}

impl SaveDir for ArchiveDir {
    type List = Entries;

    fn ino(&self) -> u32 {
        self.ino
    }

    fn list_sub_dir(&self) -> Result<Entries> {
        self.children(true)
    }

    fn list_sub_file(&self) -> Result<Entries> {
        self.children(false)
    }

    fn open_sub_dir(&self, name: &EntryName) -> Result<ArchiveDir> {
        match self.index.by_name.get(&(self.ino, *name)) {
            Some(&ino) if self.index.is_dir(ino) => Ok(ArchiveDir::new(self.index.clone(), ino)),
            _ => Err(Error::NotFound(format!("{} in directory #{}", name, self.ino))),
        }
    }
}

impl Drop for ArchiveDir {
    fn drop(&mut self) {
        trace!(ino = self.ino, "release dir");
    }
}
