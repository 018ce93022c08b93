use crate::error::{PillAiError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// 画像ファイルを開いてサイズを確認
    pub fn probe(path: &Path) -> Result<Self> {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| PillAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            width,
            height,
        })
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// フォルダ内の画像を列挙
///
/// 拡張子が画像でも読み込めないファイルは警告を出して読み飛ばす。
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(PillAiError::FolderNotFound(folder.display().to_string()));
    }

    let mut walker = WalkDir::new(folder);
    if !recursive {
        walker = walker.max_depth(1); // 直下のみ
    }

    let mut images = Vec::new();

    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(ext) = path.extension() else {
            continue;
        };
        if !is_image_extension(&ext.to_string_lossy()) {
            continue;
        }

        match ImageInfo::probe(path) {
            Ok(info) => images.push(info),
            Err(e) => tracing::warn!(error = %e, "画像として読み込めないためスキップ"),
        }
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}
