//! Recursive tree listing.
//!
//! Output is one line per entry: `depth` spaces, then `+` for a directory or
//! `-` for a file, then the name. A directory's sub-directories (each with
//! its whole subtree) come before its files, in the order the container
//! lists them.

use std::io::Write;

use tracing::{debug, trace};

use crate::container::{EntryList, MAX_DEPTH, SaveArchive, SaveDir};
use crate::error::{Error, ListKind, Result};
use crate::name::EntryName;

pub const DIR_MARKER: char = '+';
pub const FILE_MARKER: char = '-';

pub fn format_line(depth: usize, marker: char, name: &EntryName) -> String {
    format!("{}{}{}\n", " ".repeat(depth), marker, name)
}

fn write_line<W: Write>(out: &mut W, depth: usize, marker: char, name: &EntryName) -> Result<()> {
    out.write_all(format_line(depth, marker, name).as_bytes())?;
    Ok(())
}

/// Prints the subtree under `dir`, which stays owned by the caller.
///
/// Every list and child handle opened here is released before returning,
/// on success and on error alike. The first failure stops the walk; nothing
/// after the failing entry is written. Directories nested deeper than
/// [`MAX_DEPTH`] fail with `Error::Corrupt` before anything is listed.
pub fn visit<D: SaveDir, W: Write>(depth: usize, dir: &D, out: &mut W) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::Corrupt(format!(
            "directory #{} nested deeper than {}",
            dir.ino(),
            MAX_DEPTH
        )));
    }
    let list = dir.list_sub_dir().map_err(|e| Error::List {
        ino: dir.ino(),
        kind: ListKind::SubDirs,
        source: Box::new(e),
    })?;
    trace!(ino = dir.ino(), kind = %ListKind::SubDirs, "open list");
    debug!(ino = dir.ino(), depth, dirs = list.len(), "listed sub-directories");
    for i in 0..list.len() {
        let entry = list.get(i);
        write_line(out, depth, DIR_MARKER, &entry.name)?;
        let child = dir.open_sub_dir(&entry.name).map_err(|e| Error::OpenSubDir {
            name: entry.name,
            source: Box::new(e),
        })?;
        visit(depth + 1, &child, out)?;
        drop(child);
    }
    trace!(ino = dir.ino(), kind = %ListKind::SubDirs, "release list");
    drop(list);

    let list = dir.list_sub_file().map_err(|e| Error::List {
        ino: dir.ino(),
        kind: ListKind::SubFiles,
        source: Box::new(e),
    })?;
    trace!(ino = dir.ino(), kind = %ListKind::SubFiles, "open list");
    debug!(ino = dir.ino(), depth, files = list.len(), "listed sub-files");
    for i in 0..list.len() {
        let entry = list.get(i);
        trace!(ino = entry.ino, "file");
        write_line(out, depth, FILE_MARKER, &entry.name)?;
    }
    trace!(ino = dir.ino(), kind = %ListKind::SubFiles, "release list");
    drop(list);
    Ok(())
}

/// Opens the root of `save`, prints its whole tree and releases the root.
pub fn print_tree<A: SaveArchive, W: Write>(save: &A, out: &mut W) -> Result<()> {
    let root = save.open_root()?;
    visit(0, &root, out)?;
    drop(root);
    out.flush()?;
    Ok(())
}

/// Same as [`print_tree`] but collects the lines into a string.
pub fn tree_string<A: SaveArchive>(save: &A) -> Result<String> {
    let mut buf = Vec::new();
    print_tree(save, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Corrupt(e.to_string()))
}
