use std::fs;
use std::io::{Cursor, Write as _};
use std::path::Path;

use savetree_core::archive::ArchiveSave;
use savetree_core::host::HostSave;
use savetree_core::{
    EntryList, EntryName, Error, MAX_DEPTH, ROOT_INO, Resource, ResourceConfig, SaveArchive,
    SaveData, SaveDir, tree_string,
};
use tempfile::tempdir;
use zip::CompressionMethod;
use zip::write::FileOptions;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = fs::File::create(path).unwrap();
    writeln!(&mut f, "data").unwrap();
}

fn zip_bytes(members: &[&str]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    for m in members {
        if m.ends_with('/') {
            zip.add_directory(*m, options).unwrap();
        } else {
            zip.start_file(*m, options).unwrap();
            zip.write_all(b"x").unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

fn archive(members: &[&str]) -> ArchiveSave {
    ArchiveSave::from_reader(Cursor::new(zip_bytes(members))).unwrap()
}

#[test]
fn host_directory_end_to_end() {
    let d = tempdir().unwrap();
    touch(&d.path().join("docs/readme"));
    touch(&d.path().join("notes"));
    let resource = Resource::new(ResourceConfig::default()).unwrap();
    let save = resource.open_save(d.path()).unwrap();
    assert!(matches!(save, SaveData::Host(_)));
    assert_eq!(tree_string(&save).unwrap(), "+docs\n -readme\n-notes\n");
}

#[test]
fn host_listing_is_sorted_by_name() {
    let d = tempdir().unwrap();
    for name in ["c", "a", "b"] {
        fs::create_dir(d.path().join(name)).unwrap();
    }
    touch(&d.path().join("b/z"));
    touch(&d.path().join("b/y"));
    let save = HostSave::open(d.path()).unwrap();
    assert_eq!(tree_string(&save).unwrap(), "+a\n+b\n -y\n -z\n+c\n");
}

#[test]
fn host_identifiers_are_stable() {
    let d = tempdir().unwrap();
    fs::create_dir(d.path().join("sub")).unwrap();
    touch(&d.path().join("file"));
    let save = HostSave::open(d.path()).unwrap();
    let root = save.open_root().unwrap();
    assert_eq!(root.ino(), ROOT_INO);

    let first = root.list_sub_dir().unwrap();
    let again = root.list_sub_dir().unwrap();
    assert_eq!(first.get(0).ino, again.get(0).ino);
    assert_ne!(first.get(0).ino, ROOT_INO);

    let sub = root.open_sub_dir(&first.get(0).name).unwrap();
    assert_eq!(sub.ino(), first.get(0).ino);
    let by_ino = save.open_dir(first.get(0).ino).unwrap();
    assert_eq!(by_ino.ino(), sub.ino());

    let files = root.list_sub_file().unwrap();
    assert_eq!(files.names(), vec!["file".to_string()]);
    assert!(matches!(save.open_dir(files.get(0).ino), Err(Error::NotFound(_))));
    assert!(matches!(save.open_dir(999), Err(Error::NotFound(_))));
    assert!(matches!(save.open_dir(0), Err(Error::NotFound(_))));
}

#[test]
fn host_list_is_a_snapshot() {
    let d = tempdir().unwrap();
    fs::create_dir(d.path().join("one")).unwrap();
    let save = HostSave::open(d.path()).unwrap();
    let root = save.open_root().unwrap();
    let list = root.list_sub_dir().unwrap();
    fs::create_dir(d.path().join("two")).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(root.list_sub_dir().unwrap().len(), 2);
}

#[test]
fn host_overlong_name_fails_listing() {
    let d = tempdir().unwrap();
    fs::create_dir(d.path().join("dir")).unwrap();
    touch(&d.path().join("dir/this_name_is_too_long"));
    let save = HostSave::open(d.path()).unwrap();
    match tree_string(&save) {
        Err(Error::List { source, .. }) => {
            assert!(matches!(*source, Error::InvalidName(_)))
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn host_missing_sub_dir_is_not_found() {
    let d = tempdir().unwrap();
    touch(&d.path().join("plain"));
    let save = HostSave::open(d.path()).unwrap();
    let root = save.open_root().unwrap();
    let name = EntryName::new("plain").unwrap();
    assert!(matches!(root.open_sub_dir(&name), Err(Error::NotFound(_))));
    let name = EntryName::new("ghost").unwrap();
    assert!(matches!(root.open_sub_dir(&name), Err(Error::NotFound(_))));
}

#[test]
fn archive_builds_implicit_directories() {
    let save = archive(&["notes", "docs/readme"]);
    assert_eq!(tree_string(&save).unwrap(), "+docs\n -readme\n-notes\n");
}

#[test]
fn archive_keeps_member_order() {
    let save = archive(&["b/x", "a/y", "c/", "b/w", "z", "m"]);
    assert_eq!(
        tree_string(&save).unwrap(),
        "+b\n -x\n -w\n+a\n -y\n+c\n-z\n-m\n"
    );
}

#[test]
fn archive_explicit_empty_directory() {
    let save = archive(&["empty/", "deep/a/b/", "deep/a/f"]);
    assert_eq!(
        tree_string(&save).unwrap(),
        "+empty\n+deep\n +a\n  +b\n  -f\n"
    );
}

#[test]
fn archive_open_dir_by_identifier() {
    let save = archive(&["docs/readme"]);
    let root = save.open_root().unwrap();
    let dirs = root.list_sub_dir().unwrap();
    let docs = dirs.get(0);
    assert_eq!(docs.name.to_string(), "docs");
    let opened = save.open_dir(docs.ino).unwrap();
    let files = opened.list_sub_file().unwrap();
    assert_eq!(files.names(), vec!["readme".to_string()]);
    assert!(matches!(save.open_dir(files.get(0).ino), Err(Error::NotFound(_))));
    let missing = EntryName::new("readme").unwrap();
    assert!(matches!(opened.open_sub_dir(&missing), Err(Error::NotFound(_))));
}

#[test]
fn archive_rejects_bad_layouts() {
    let bytes = zip_bytes(&["a", "a/b"]);
    assert!(matches!(
        ArchiveSave::from_reader(Cursor::new(bytes)),
        Err(Error::Corrupt(_))
    ));
    let bytes = zip_bytes(&["dir/0123456789abcdefg"]);
    assert!(matches!(
        ArchiveSave::from_reader(Cursor::new(bytes)),
        Err(Error::Corrupt(_))
    ));
    let bytes = zip_bytes(&["x/../y"]);
    assert!(matches!(
        ArchiveSave::from_reader(Cursor::new(bytes)),
        Err(Error::Corrupt(_))
    ));
}

#[test]
fn archive_rejects_nesting_past_limit() {
    let member = "a/".repeat(MAX_DEPTH) + "f";
    let bytes = zip_bytes(&[member.as_str()]);
    assert!(matches!(
        ArchiveSave::from_reader(Cursor::new(bytes)),
        Err(Error::Corrupt(_))
    ));

    let member = "a/".repeat(32000) + "f";
    let bytes = zip_bytes(&[member.as_str()]);
    assert!(matches!(
        ArchiveSave::from_reader(Cursor::new(bytes)),
        Err(Error::Corrupt(_))
    ));
}

#[test]
fn archive_lists_nesting_at_limit() {
    let member = "a/".repeat(MAX_DEPTH - 1) + "f";
    let save = archive(&[member.as_str()]);
    let out = tree_string(&save).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), MAX_DEPTH);
    assert_eq!(lines[0], "+a");
    assert_eq!(lines[MAX_DEPTH - 1], format!("{}-f", " ".repeat(MAX_DEPTH - 1)));
}

#[test]
fn resource_detects_zip_archives() {
    let d = tempdir().unwrap();
    let p = d.path().join("save.bin");
    fs::write(&p, zip_bytes(&["sys/cfg", "data"])).unwrap();
    let resource = Resource::new(ResourceConfig::default()).unwrap();
    let save = resource.open_save(&p).unwrap();
    assert_eq!(save.kind(), "archive");
    assert_eq!(tree_string(&save).unwrap(), "+sys\n -cfg\n-data\n");
}

#[test]
fn resource_rejects_unknown_and_missing() {
    let d = tempdir().unwrap();
    let plain = d.path().join("plain.sav");
    fs::write(&plain, b"not a container").unwrap();
    let tiny = d.path().join("tiny");
    fs::write(&tiny, b"PK").unwrap();
    let resource = Resource::new(ResourceConfig::default()).unwrap();
    assert!(matches!(
        resource.open_save(&plain),
        Err(Error::UnsupportedContainer(_))
    ));
    assert!(matches!(
        resource.open_save(&tiny),
        Err(Error::UnsupportedContainer(_))
    ));
    assert!(matches!(
        resource.open_save(d.path().join("missing")),
        Err(Error::ContainerOpen { .. })
    ));
}

#[test]
fn resource_resolves_against_base_dir() {
    let d = tempdir().unwrap();
    touch(&d.path().join("slot/file"));
    let resource = Resource::new(ResourceConfig {
        base_dir: Some(d.path().to_path_buf()),
    })
    .unwrap();
    let save = resource.open_save("slot").unwrap();
    assert_eq!(tree_string(&save).unwrap(), "-file\n");

    let bad = Resource::new(ResourceConfig {
        base_dir: Some(d.path().join("nope")),
    });
    assert!(matches!(bad, Err(Error::InvalidConfig(_))));
}
