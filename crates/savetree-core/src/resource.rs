use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::archive::{ArchiveDir, ArchiveSave};
use crate::container::{Entries, SaveArchive, SaveDir};
use crate::error::{Error, Result};
use crate::host::{HostDir, HostSave};
use crate::name::EntryName;

const ZIP_LOCAL_MAGIC: &[u8; 4] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8; 4] = b"PK\x05\x06";

#[derive(Debug, Clone, Default)]
pub struct ResourceConfig {
    /// Relative container paths are resolved against this directory.
    pub base_dir: Option<PathBuf>,
}

/// Process-wide context that containers are opened through.
#[derive(Debug)]
pub struct Resource {
    config: ResourceConfig,
}

impl Resource {
    pub fn new(config: ResourceConfig) -> Result<Self> {
        if let Some(base) = &config.base_dir
            && !base.is_dir()
        {
            return Err(Error::InvalidConfig(format!(
                "base directory {} does not exist",
                base.display()
            )));
        }
        debug!(?config, "resource created");
        Ok(Self { config })
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.config.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Opens a save container, picking the backend from what `path` is:
    /// a directory, or a zip archive.
    pub fn open_save(&self, path: impl AsRef<Path>) -> Result<SaveData> {
        let path = self.resolve(path.as_ref());
        let meta = fs::metadata(&path).map_err(|source| Error::ContainerOpen {
            path: path.clone(),
            source,
        })?;
        let save = if meta.is_dir() {
            SaveData::Host(HostSave::open(&path)?)
        } else if meta.is_file() && is_zip(&path)? {
            SaveData::Archive(ArchiveSave::open(&path)?)
        } else {
            return Err(Error::UnsupportedContainer(path));
        };
        info!(path = %path.display(), kind = save.kind(), "opened save");
        Ok(save)
    }
}

fn is_zip(path: &Path) -> Result<bool> {
    let mut file = fs::File::open(path).map_err(|source| Error::ContainerOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(&magic == ZIP_LOCAL_MAGIC || &magic == ZIP_EMPTY_MAGIC)
}

/// An open save container of either supported kind.
#[derive(Debug, Clone)]
pub enum SaveData {
    Host(HostSave),
    Archive(ArchiveSave),
}

impl SaveData {
    pub fn kind(&self) -> &'static str {
        match self {
            SaveData::Host(_) => "directory",
            SaveData::Archive(_) => "archive",
        }
    }
}

impl SaveArchive for SaveData {
    type Dir = Dir;

    fn open_dir(&self, ino: u32) -> Result<Dir> {
        match self {
            SaveData::Host(s) => s.open_dir(ino).map(Dir::Host),
            SaveData::Archive(s) => s.open_dir(ino).map(Dir::Archive),
        }
    }
}

/// Directory handle of a [`SaveData`].
#[derive(Debug)]
pub enum Dir {
    Host(HostDir),
    Archive(ArchiveDir),
}

impl SaveDir for Dir {
    type List = Entries;

    fn ino(&self) -> u32 {
        match self {
            Dir::Host(d) => d.ino(),
            Dir::Archive(d) => d.ino(),
        }
    }

    fn list_sub_dir(&self) -> Result<Entries> {
        match self {
            Dir::Host(d) => d.list_sub_dir(),
            Dir::Archive(d) => d.list_sub_dir(),
        }
    }

    fn list_sub_file(&self) -> Result<Entries> {
        match self {
            Dir::Host(d) => d.list_sub_file(),
            Dir::Archive(d) => d.list_sub_file(),
        }
    }

    fn open_sub_dir(&self, name: &EntryName) -> Result<Dir> {
        match self {
            Dir::Host(d) => d.open_sub_dir(name).map(Dir::Host),
            Dir::Archive(d) => d.open_sub_dir(name).map(Dir::Archive),
        }
    }
}
