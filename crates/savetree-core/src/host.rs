// Extracted save trees living in a host directory
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::trace;
use walkdir::WalkDir;

use crate::container::{Entries, Entry, ROOT_INO, SaveArchive, SaveDir};
use crate::error::{Error, Result};
use crate::name::EntryName;

#[derive(Debug)]
struct HostInner {
    inos: RefCell<InoTable>,
}

// Identifiers are handed out on first sighting and stay fixed while the
// container is open. Slot 0 of `paths` is the root (ino 1).
#[derive(Debug, Default)]
struct InoTable {
    by_path: HashMap<PathBuf, u32>,
    paths: Vec<PathBuf>,
}

impl InoTable {
    fn assign(&mut self, path: &Path) -> u32 {
        if let Some(ino) = self.by_path.get(path) {
            return *ino;
        }
        self.paths.push(path.to_path_buf());
        let ino = self.paths.len() as u32;
        self.by_path.insert(path.to_path_buf(), ino);
        ino
    }

    fn path(&self, ino: u32) -> Option<&Path> {
        let idx = ino.checked_sub(1)? as usize;
        self.paths.get(idx).map(PathBuf::as_path)
    }
}

/// A save container backed by a directory on the host file system.
#[derive(Debug, Clone)]
pub struct HostSave {
    inner: Rc<HostInner>,
}

impl HostSave {
    pub fn open(root: &Path) -> Result<Self> {
        let meta = fs::metadata(root).map_err(|source| Error::ContainerOpen {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(Error::UnsupportedContainer(root.to_path_buf()));
        }
        let mut inos = InoTable::default();
        let ino = inos.assign(root);
        debug_assert_eq!(ino, ROOT_INO);
        trace!(root = %root.display(), "opened host save");
        Ok(Self {
            inner: Rc::new(HostInner {
                inos: RefCell::new(inos),
            }),
        })
    }
}

impl SaveArchive for HostSave {
    type Dir = HostDir;

    fn open_dir(&self, ino: u32) -> Result<HostDir> {
        let path = self
            .inner
            .inos
            .borrow()
            .path(ino)
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::NotFound(format!("no entry #{}", ino)))?;
        let is_dir = if ino == ROOT_INO {
            path.is_dir()
        } else {
            is_real_dir(&path)
        };
        if !is_dir {
            return Err(Error::NotFound(format!("#{} is not a directory", ino)));
        }
        Ok(HostDir::new(self.inner.clone(), path, ino))
    }
}

/// An open directory of a [`HostSave`].
#[derive(Debug)]
pub struct HostDir {
    save: Rc<HostInner>,
    path: PathBuf,
    ino: u32,
}

impl HostDir {
    fn new(save: Rc<HostInner>, path: PathBuf, ino: u32) -> Self {
        trace!(ino, "open dir");
        Self { save, path, ino }
    }

    fn list(&self, want_dirs: bool) -> Result<Entries> {
        let mut out = Vec::new();
        let walk = WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walk {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_dir() != want_dirs {
                continue;
            }
            let raw = entry.file_name();
            let name = raw.to_str().ok_or_else(|| {
                Error::InvalidName(format!("{} is not valid UTF-8", raw.to_string_lossy()))
            })?;
            let name = EntryName::new(name)?;
            let ino = self.save.inos.borrow_mut().assign(entry.path());
            out.push(Entry { name, ino });
        }
        Ok(out.into())
    }
}

impl SaveDir for HostDir {
    type List = Entries;

    fn ino(&self) -> u32 {
        self.ino
    }

    fn list_sub_dir(&self) -> Result<Entries> {
        self.list(true)
    }

    fn list_sub_file(&self) -> Result<Entries> {
        self.list(false)
    }

    fn open_sub_dir(&self, name: &EntryName) -> Result<HostDir> {
        let path = self.path.join(&*name.to_str_lossy());
        if !is_real_dir(&path) {
            return Err(Error::NotFound(format!("{} in directory #{}", name, self.ino)));
        }
        let ino = self.save.inos.borrow_mut().assign(&path);
        Ok(HostDir::new(self.save.clone(), path, ino))
    }
}

impl Drop for HostDir {
    fn drop(&mut self) {
        trace!(ino = self.ino, "release dir");
    }
}

// Symlinks are never followed, matching how listings classify them.
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
