//! サイドカーファイル検出器
//!
//! 事前に計算した検出結果を画像の隣の `<stem>.detections.json` から読む。

use super::{parse_output, FeatureDetector};
use crate::error::{PillAiError, Result};
use crate::scanner::ImageInfo;
use async_trait::async_trait;
use pill_ai_common::RawDetections;
use std::path::{Path, PathBuf};

pub const SIDECAR_SUFFIX: &str = ".detections.json";

/// 画像に対応するサイドカーファイルのパス
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    image_path.with_file_name(format!("{}{}", stem, SIDECAR_SUFFIX))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarDetector;

#[async_trait]
impl FeatureDetector for SidecarDetector {
    async fn detect(&self, image: &ImageInfo) -> Result<RawDetections> {
        let path = sidecar_path(&image.path);
        if !path.exists() {
            return Err(PillAiError::FileNotFound(path.display().to_string()));
        }

        let content = tokio::fs::read_to_string(&path).await?;
        parse_output(&content, image)
    }

    fn name(&self) -> &str {
        "sidecar"
    }
}
