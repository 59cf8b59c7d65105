use nsyncconfig::Source;
use nsyncplaylist::codec::{decode, stream_url};
use nsyncplaylist::{PlaylistError, PlaylistStore, PlaylistSync, SyncAction};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"data").unwrap();
}

fn source(name: &str, path: &Path) -> Source {
    Source {
        name: name.to_string(),
        path: path.to_path_buf(),
        recursive: true,
        recently_added_days: None,
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    music: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let music = dir.path().join("music");
    let output = dir.path().join("playlists");
    fs::create_dir_all(&music).unwrap();
    Fixture {
        music,
        output,
        _dir: dir,
    }
}

fn read_playlist(output: &Path, name: &str) -> String {
    fs::read_to_string(output.join(format!("{name}.m3u8"))).unwrap()
}

#[test]
fn test_first_sync_writes_expected_layout() {
    let fx = fixture();
    let album = fx.music.join("Album");
    touch(&album.join("track1.flac"));
    touch(&album.join("track2.flac"));
    touch(&album.join("cover.jpg"));

    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), true);
    let report = sync.sync(&source("music", &fx.music)).unwrap();
    assert!(report.updated());
    assert_eq!(report.total, 2);
    assert_eq!(report.added.len(), 2);
    assert!(report.removed.is_empty());

    let expected = format!(
        "#EXTM3U\n#EXTIMG:{}\n#EXTINF:-1,track1\n{}\n#EXTINF:-1,track2\n{}\n",
        stream_url(&album.join("cover.jpg")),
        stream_url(&album.join("track1.flac")),
        stream_url(&album.join("track2.flac")),
    );
    assert_eq!(read_playlist(&fx.output, "music"), expected);
}

#[test]
fn test_second_sync_is_a_no_op() {
    let fx = fixture();
    touch(&fx.music.join("A/1.mp3"));
    touch(&fx.music.join("B/2.mp3"));

    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), true);
    let src = source("music", &fx.music);
    sync.sync(&src).unwrap();
    let before = read_playlist(&fx.output, "music");

    let report = sync.sync(&src).unwrap();
    assert_eq!(report.action, SyncAction::Unchanged);
    assert!(!report.updated());
    assert_eq!(report.total, 2);
    assert_eq!(read_playlist(&fx.output, "music"), before);
}

#[test]
fn test_additions_are_appended() {
    let fx = fixture();
    touch(&fx.music.join("A/1.mp3"));

    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), false);
    let src = source("music", &fx.music);
    sync.sync(&src).unwrap();

    // Un commentaire ajouté à la main doit survivre à l'ajout
    let path = fx.output.join("music.m3u8");
    let mut edited = fs::read_to_string(&path).unwrap();
    edited.push_str("# kept");
    fs::write(&path, &edited).unwrap();

    touch(&fx.music.join("0/new.mp3"));
    let report = sync.sync(&src).unwrap();
    assert_eq!(report.action, SyncAction::Appended);
    assert_eq!(report.added, vec![fx.music.join("0/new.mp3")]);
    assert_eq!(report.total, 2);

    let text = read_playlist(&fx.output, "music");
    assert!(text.starts_with(&edited));
    assert!(text.contains("# kept\n#EXTINF:-1,new\n"));
    assert_eq!(
        decode(&text),
        vec![fx.music.join("A/1.mp3"), fx.music.join("0/new.mp3")]
    );
}

#[test]
fn test_appended_entries_get_their_own_artwork() {
    let fx = fixture();
    touch(&fx.music.join("A/1.mp3"));
    touch(&fx.music.join("A/cover.jpg"));

    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), true);
    let src = source("music", &fx.music);
    sync.sync(&src).unwrap();

    touch(&fx.music.join("A/2.mp3"));
    sync.sync(&src).unwrap();

    let text = read_playlist(&fx.output, "music");
    assert_eq!(text.matches("#EXTIMG:").count(), 2);
}

#[test]
fn test_removal_triggers_regeneration() {
    let fx = fixture();
    touch(&fx.music.join("A/1.mp3"));
    touch(&fx.music.join("A/2.mp3"));

    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), false);
    let src = source("music", &fx.music);
    sync.sync(&src).unwrap();

    fs::remove_file(fx.music.join("A/1.mp3")).unwrap();
    touch(&fx.music.join("A/3.mp3"));
    let report = sync.sync(&src).unwrap();

    assert_eq!(report.action, SyncAction::Regenerated);
    assert_eq!(report.removed, vec![fx.music.join("A/1.mp3")]);
    assert_eq!(report.added, vec![fx.music.join("A/3.mp3")]);
    assert_eq!(
        read_playlist(&fx.output, "music"),
        format!(
            "#EXTM3U\n#EXTINF:-1,2\n{}\n#EXTINF:-1,3\n{}\n",
            stream_url(&fx.music.join("A/2.mp3")),
            stream_url(&fx.music.join("A/3.mp3")),
        )
    );
}

#[test]
fn test_empty_source_without_playlist_writes_nothing() {
    let fx = fixture();
    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), true);
    let report = sync.sync(&source("music", &fx.music)).unwrap();

    assert!(!report.updated());
    assert!(!fx.output.join("music.m3u8").exists());
}

#[test]
fn test_sync_by_name() {
    let fx = fixture();
    touch(&fx.music.join("1.mp3"));
    let sources = vec![source("music", &fx.music)];
    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), false);

    let report = sync.sync_by_name(&sources, "music").unwrap();
    assert_eq!(report.playlist, "music");

    let err = sync.sync_by_name(&sources, "other").unwrap_err();
    assert!(matches!(err, PlaylistError::SourceNotFound(name) if name == "other"));
}

#[test]
fn test_sync_all_continues_after_failure() {
    let fx = fixture();
    touch(&fx.music.join("1.mp3"));
    let sources = vec![
        source("bad/name", &fx.music),
        source("music", &fx.music),
    ];
    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), false);

    assert_eq!(sync.sync_all(&sources), 1);
    assert_eq!(sync.sync_all(&sources), 0);
    assert!(fx.output.join("music.m3u8").exists());
}

#[test]
fn test_no_temporary_files_left_behind() {
    let fx = fixture();
    touch(&fx.music.join("1.mp3"));
    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), false);
    sync.sync(&source("music", &fx.music)).unwrap();

    let names: Vec<_> = fs::read_dir(&fx.output)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("music.m3u8")]);
    assert_eq!(
        PlaylistStore::new(&fx.output).list().unwrap(),
        vec!["music".to_string()]
    );
}

#[test]
fn test_concurrent_syncs_of_same_playlist() {
    let fx = fixture();
    for i in 0..20 {
        touch(&fx.music.join(format!("Album {}/{:02}.flac", i % 3, i)));
    }
    let sync = Arc::new(PlaylistSync::new(PlaylistStore::new(&fx.output), false));
    let src = source("music", &fx.music);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sync = Arc::clone(&sync);
            let src = src.clone();
            thread::spawn(move || sync.sync(&src).unwrap())
        })
        .collect();
    let updated = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|report| report.updated())
        .count();

    assert_eq!(updated, 1);
    let text = read_playlist(&fx.output, "music");
    assert_eq!(decode(&text).len(), 20);
    assert_eq!(text.matches("#EXTM3U").count(), 1);
}

#[test]
fn test_non_utf8_file_name_keeps_sync_idempotent() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fx = fixture();
    let track = fx.music.join(OsStr::from_bytes(b"caf\xE9.flac"));
    touch(&track);

    let sync = PlaylistSync::new(PlaylistStore::new(&fx.output), false);
    let src = source("music", &fx.music);
    assert_eq!(sync.sync(&src).unwrap().action, SyncAction::Appended);

    let report = sync.sync(&src).unwrap();
    assert_eq!(report.action, SyncAction::Unchanged);
    assert!(report.removed.is_empty());
    assert_eq!(decode(&read_playlist(&fx.output, "music")), vec![track]);
}
