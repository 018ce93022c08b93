//! キャッシュ機能テスト
//!
//! 検出結果キャッシュの動作を検証

use pill_ai_common::{Detection, RawDetections};
use pill_ai_rust::detector::{compute_file_hash, CacheFile, CACHE_FILE_NAME};
use pill_ai_rust::scanner::ImageInfo;
use tempfile::tempdir;

fn detections(shape: &str) -> RawDetections {
    RawDetections {
        shape: vec![Detection::new(shape, 0.9)],
        letter: vec![Detection::new("A", 0.8)],
        color: vec![Detection::new("white", 0.6)],
    }
}

fn image_info(path: std::path::PathBuf, name: &str) -> ImageInfo {
    ImageInfo {
        path,
        file_name: name.to_string(),
        width: 1,
        height: 1,
    }
}

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert("abc123".to_string(), "test.png".to_string(), 1024, detections("round"));
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    assert!(dir.path().join(CACHE_FILE_NAME).exists());

    // 再読み込み
    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);

    let cached = loaded.get("abc123").expect("キャッシュが見つからない");
    assert_eq!(cached, &detections("round"));
}

/// キャッシュヒット判定
#[test]
fn test_cache_hit() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    let hash = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    cache.insert(hash.to_string(), "cached.png".to_string(), 2048, detections("oval"));

    // キャッシュにある → ヒット
    assert!(cache.get(hash).is_some());

    // キャッシュにない → ミス
    assert!(cache.get("nonexistent_hash").is_none());
}

/// 画像の振り分け（ハッシュは内容で決まる）
#[test]
fn test_partition_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    let img1_path = dir.path().join("img1.png");
    let img2_path = dir.path().join("img2.png");
    std::fs::write(&img1_path, b"fake image 1").unwrap();
    std::fs::write(&img2_path, b"fake image 2").unwrap();

    let images = vec![
        image_info(img1_path.clone(), "img1.png"),
        image_info(img2_path, "img2.png"),
    ];

    // 空のキャッシュ → 全て未キャッシュ
    let mut cache = CacheFile::load(dir.path());
    let (cached, uncached) = cache.partition(&images);
    assert!(cached.is_empty());
    assert_eq!(uncached.len(), 2);
    assert_eq!(uncached[0].1.len(), 64);

    // 1枚目だけ登録
    let hash = compute_file_hash(&img1_path).unwrap();
    cache.insert(hash, "img1.png".to_string(), 12, detections("round"));

    let (cached, uncached) = cache.partition(&images);
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].0, 0);
    assert_eq!(cached[0].1.shape[0].label, "round");
    assert_eq!(uncached.len(), 1);
    assert_eq!(uncached[0].0, 1);
}

/// 同じ内容の画像は同じハッシュ
#[test]
fn test_hash_depends_on_content_only() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    std::fs::write(&a, b"same bytes").unwrap();
    std::fs::write(&b, b"same bytes").unwrap();

    assert_eq!(compute_file_hash(&a).unwrap(), compute_file_hash(&b).unwrap());
}

/// キャッシュの上書き
#[test]
fn test_cache_overwrite() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    let hash = "same_hash";

    cache.insert(hash.to_string(), "test.png".to_string(), 1000, detections("round"));
    cache.insert(hash.to_string(), "test.png".to_string(), 1000, detections("capsule"));

    // 最新の値が取得される
    let cached = cache.get(hash).expect("キャッシュが見つからない");
    assert_eq!(cached.shape[0].label, "capsule");
    assert_eq!(cache.len(), 1);
}

/// キャッシュファイルが破損している場合
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join(CACHE_FILE_NAME), "{ invalid json }").unwrap();

    // 破損したキャッシュは空として扱われる
    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// キャッシュの削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert("hash".to_string(), "x.png".to_string(), 100, detections("round"));
    cache.save(dir.path()).expect("保存失敗");

    assert!(CacheFile::clear(dir.path()).expect("削除失敗"));
    assert!(CacheFile::load(dir.path()).is_empty());
    assert!(!CacheFile::clear(dir.path()).expect("削除失敗"));
}
