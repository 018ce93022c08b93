//! カタログファイル対話式選択モジュール

use crate::error::{PillAiError, Result};
use dialoguer::Select;
use std::path::{Path, PathBuf};

/// カタログを探すディレクトリ（作業ディレクトリからの相対パス）
pub const CATALOG_DIR: &str = "catalog";

const CATALOG_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// ディレクトリ内のカタログファイル一覧を取得（名前順）
pub fn list_available_catalogs(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut catalogs: Vec<(String, PathBuf)> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|e| CATALOG_EXTENSIONS.contains(&e.to_string_lossy().to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().to_string();
            Some((name, path))
        })
        .collect();

    catalogs.sort_by(|a, b| a.0.cmp(&b.0));
    catalogs
}

/// カタログパスを決定する
///
/// 指定・設定済みのパスがあればそれを使い、なければ `catalog/` から対話式で選ぶ。
pub fn resolve_catalog(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    select_catalog_interactive(Path::new(CATALOG_DIR))
}

/// 対話式でカタログを選択
pub fn select_catalog_interactive(dir: &Path) -> Result<PathBuf> {
    let catalogs = list_available_catalogs(dir);

    match catalogs.len() {
        0 => {
            println!("⚠ {}/ にカタログファイルがありません", dir.display());
            Err(PillAiError::CatalogNotSelected)
        }
        1 => {
            let (name, path) = &catalogs[0];
            println!("→ {} を使用", name);
            Ok(path.clone())
        }
        _ => {
            let items: Vec<&str> = catalogs.iter().map(|(name, _)| name.as_str()).collect();
            let selection = Select::new()
                .with_prompt("📋 参照カタログを選択してください")
                .items(&items)
                .default(0)
                .interact_opt()
                .map_err(|e| PillAiError::Config(format!("カタログ選択エラー: {}", e)))?;

            match selection {
                Some(index) => {
                    let (name, path) = &catalogs[index];
                    println!("→ {} を使用", name);
                    Ok(path.clone())
                }
                None => Err(PillAiError::CatalogNotSelected),
            }
        }
    }
}
