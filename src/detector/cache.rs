//! 検出結果キャッシュモジュール
//!
//! 画像のSHA-256ハッシュをキーにして検出器の生出力をキャッシュし、
//! 同じ画像の再検出をスキップする。
//! 閾値を変えて再評価できるよう、閾値適用前の結果だけを保存する。

use crate::error::Result;
use crate::scanner::ImageInfo;
use pill_ai_common::RawDetections;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const CACHE_FILE_NAME: &str = ".pill-detect-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// ファイルハッシュ → 検出結果のマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub file_name: String,
    pub file_size: u64,
    pub detections: RawDetections,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(folder: &Path) -> PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（壊れている場合は空で作り直す）
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(error = %e, "キャッシュを開けません");
                return Self::default();
            }
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, CacheFile>(reader) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                tracing::warn!("キャッシュバージョン不一致、再生成します");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "キャッシュが壊れています、再生成します");
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let file = File::create(Self::cache_path(folder))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（存在しなければ `false`）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    pub fn get(&self, hash: &str) -> Option<&RawDetections> {
        self.entries.get(hash).map(|e| &e.detections)
    }

    pub fn insert(&mut self, hash: String, file_name: String, file_size: u64, detections: RawDetections) {
        self.entries.insert(
            hash,
            CacheEntry {
                file_name,
                file_size,
                detections,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 画像をキャッシュ済み・未キャッシュに振り分ける（どちらも入力の位置で返す）
    ///
    /// 未キャッシュ側はハッシュ付き。ハッシュ計算に失敗した画像は空文字。
    pub fn partition(&self, images: &[ImageInfo]) -> (Vec<(usize, RawDetections)>, Vec<(usize, String)>) {
        let mut cached = Vec::new();
        let mut uncached = Vec::new();

        for (index, img) in images.iter().enumerate() {
            let hash = match compute_file_hash(&img.path) {
                Ok(h) => h,
                Err(e) => {
                    tracing::warn!(file = %img.file_name, error = %e, "ハッシュ計算に失敗");
                    uncached.push((index, String::new()));
                    continue;
                }
            };

            match self.get(&hash) {
                Some(detections) => cached.push((index, detections.clone())),
                None => uncached.push((index, hash)),
            }
        }

        (cached, uncached)
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// 画像ファイルのハッシュを計算（SHA-256、16進）
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
