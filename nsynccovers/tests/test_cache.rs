use nsynccovers::ArtworkCache;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn album(root: &TempDir, name: &str, cover: Option<&[u8]>) -> PathBuf {
    let dir = root.path().join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("track1.flac"), b"audio").unwrap();
    if let Some(data) = cover {
        fs::write(dir.join("cover.png"), data).unwrap();
    }
    dir
}

#[test]
fn test_lookup_reads_artwork() {
    let root = tempfile::tempdir().unwrap();
    let dir = album(&root, "Album", Some(b"png-bytes"));
    let cache = ArtworkCache::new(10);

    let artwork = cache.lookup(&dir).unwrap().unwrap();
    assert_eq!(&artwork.data[..], b"png-bytes");
    assert_eq!(artwork.mime, "image/png");
    assert_eq!(artwork.path, dir.join("cover.png"));
}

#[test]
fn test_second_lookup_is_served_from_memory() {
    let root = tempfile::tempdir().unwrap();
    let dir = album(&root, "Album", Some(b"first"));
    let cache = ArtworkCache::new(10);

    cache.lookup(&dir).unwrap();
    // Le fichier disparaît : le hit ne doit pas toucher au disque
    fs::remove_file(dir.join("cover.png")).unwrap();
    let artwork = cache.lookup(&dir).unwrap().unwrap();
    assert_eq!(&artwork.data[..], b"first");

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_negative_result_is_cached() {
    let root = tempfile::tempdir().unwrap();
    let dir = album(&root, "Bare", None);
    let cache = ArtworkCache::new(10);

    assert!(cache.lookup(&dir).unwrap().is_none());
    // Une image ajoutée après coup n'est pas vue tant que l'entrée vit
    fs::write(dir.join("cover.jpg"), b"late").unwrap();
    assert!(cache.lookup(&dir).unwrap().is_none());

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_lookup_for_file_uses_parent_directory() {
    let root = tempfile::tempdir().unwrap();
    let dir = album(&root, "Album", Some(b"img"));
    let cache = ArtworkCache::new(10);

    let artwork = cache.lookup_for_file(&dir.join("track1.flac")).unwrap();
    assert!(artwork.is_some());
    assert!(cache.lookup(&dir).unwrap().is_some());
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_eviction_removes_half_when_full() {
    let root = tempfile::tempdir().unwrap();
    let cache = ArtworkCache::new(4);

    let dirs: Vec<PathBuf> = (0..5)
        .map(|i| album(&root, &format!("Album{i}"), None))
        .collect();

    for dir in &dirs[..4] {
        cache.lookup(dir).unwrap();
    }
    assert_eq!(cache.len(), 4);

    cache.lookup(&dirs[4]).unwrap();
    let stats = cache.stats();
    assert_eq!(stats.evictions, 2);
    assert_eq!(stats.entries, 3);

    // La dernière entrée insérée survit toujours
    cache.lookup(&dirs[4]).unwrap();
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_ttl_expires_entries() {
    let root = tempfile::tempdir().unwrap();
    let dir = album(&root, "Album", None);
    let cache = ArtworkCache::with_ttl(10, Some(Duration::ZERO));

    assert!(cache.lookup(&dir).unwrap().is_none());
    fs::write(dir.join("cover.jpg"), b"new").unwrap();

    let artwork = cache.lookup(&dir).unwrap().unwrap();
    assert_eq!(&artwork.data[..], b"new");
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn test_concurrent_lookups() {
    let root = tempfile::tempdir().unwrap();
    let dir = album(&root, "Album", Some(b"shared"));
    let cache = Arc::new(ArtworkCache::new(10));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let dir = dir.clone();
            std::thread::spawn(move || cache.lookup(&dir).unwrap().unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(&handle.join().unwrap().data[..], b"shared");
    }
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().hits + cache.stats().misses, 8);
}
