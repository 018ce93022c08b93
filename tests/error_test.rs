//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use pill_ai_rust::catalog_loader;
use pill_ai_rust::error::PillAiError;
use pill_ai_rust::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, PillAiError::FolderNotFound(_)));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path(), false);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("pill.detections.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path(), false);
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// PillAiErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PillAiError::Config("テスト設定エラー".to_string()),
        PillAiError::FileNotFound("test.png".to_string()),
        PillAiError::FolderNotFound("/path/to/folder".to_string()),
        PillAiError::ImageLoad("broken.png".to_string()),
        PillAiError::Detection("検出失敗".to_string()),
        PillAiError::DetectionTimeout { file: "slow.png".to_string(), seconds: 30 },
        PillAiError::ExcelGeneration("Excel生成エラー".to_string()),
        PillAiError::NoImagesFound("フォルダ".to_string()),
        PillAiError::CatalogNotSelected,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// カタログ未選択エラーのメッセージ確認
#[test]
fn test_catalog_not_selected_message() {
    let err = PillAiError::CatalogNotSelected;
    let display = format!("{}", err);

    assert!(display.contains("カタログ"));
    assert!(display.contains("pill-ai config"));
    assert!(err.is_catalog_error());
}

/// タイムアウトのメッセージにファイル名と秒数が入る
#[test]
fn test_detection_timeout_message() {
    let err = PillAiError::DetectionTimeout { file: "slow.png".to_string(), seconds: 30 };
    let display = format!("{}", err);

    assert!(display.contains("slow.png"));
    assert!(display.contains("30"));
    assert!(!err.is_catalog_error());
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PillAiError = io_err.into();

    assert!(matches!(err, PillAiError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: PillAiError = json_err.into();

    assert!(matches!(err, PillAiError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = pill_ai_common::Error::EmptyCatalog;
    let err: PillAiError = common_err.into();

    assert!(matches!(err, PillAiError::Common(_)));
    assert_eq!(format!("{}", err), "カタログが空です");
    assert!(err.is_catalog_error());
}

/// カタログの列不足はカタログエラーになる
#[test]
fn test_catalog_short_row() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.csv");
    std::fs::write(&path, "name,shape,color,imprint\nA,round,white,a\nB,oval\n").unwrap();

    let err = catalog_loader::load_catalog(&path).unwrap_err();
    assert!(err.is_catalog_error());
    assert!(format!("{}", err).contains("3行目"));
}
