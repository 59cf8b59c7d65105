use nsyncplaylist::scan;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"audio").unwrap();
}

fn set_age(path: &Path, days: u64) {
    let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

#[test]
fn test_recursive_scan_is_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("B/02.mp3"));
    touch(&root.join("B/01.FLAC"));
    touch(&root.join("A/cover.jpg"));
    touch(&root.join("A/notes.txt"));
    touch(&root.join("A/Disc 1/track.opus"));
    touch(&root.join("top.wav"));

    let files = scan(root, true, None);
    assert_eq!(
        files,
        vec![
            root.join("A/Disc 1/track.opus"),
            root.join("B/01.FLAC"),
            root.join("B/02.mp3"),
            root.join("top.wav"),
        ]
    );
}

#[test]
fn test_non_recursive_scan_keeps_direct_children() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("a.mp3"));
    touch(&root.join("sub/b.mp3"));

    assert_eq!(scan(root, false, None), vec![root.join("a.mp3")]);
}

#[test]
fn test_directory_with_audio_extension_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("weird.mp3")).unwrap();
    assert!(scan(dir.path(), true, None).is_empty());
}

#[test]
fn test_missing_root_gives_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    assert!(scan(&dir.path().join("missing"), true, None).is_empty());
}

#[test]
fn test_recency_filter_orders_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for (name, age) in [("old.mp3", 30), ("week.mp3", 7), ("new.mp3", 1), ("mid.mp3", 3)] {
        let path = root.join(name);
        touch(&path);
        set_age(&path, age);
    }

    let files = scan(root, true, Some(14));
    assert_eq!(
        files,
        vec![root.join("new.mp3"), root.join("mid.mp3"), root.join("week.mp3")]
    );
}

#[test]
fn test_recency_ties_are_broken_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let when = SystemTime::now() - Duration::from_secs(3600);
    for name in ["b.mp3", "a.mp3"] {
        let path = root.join(name);
        touch(&path);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(when)
            .unwrap();
    }

    assert_eq!(
        scan(root, true, Some(1)),
        vec![root.join("a.mp3"), root.join("b.mp3")]
    );
}
