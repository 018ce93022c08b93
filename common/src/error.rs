//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 参照カタログが存在しない、または読み込めない
    #[error("カタログを読み込めません: {0}")]
    CatalogUnavailable(String),

    /// カタログは読み込めたが1件もエントリがない
    #[error("カタログが空です")]
    EmptyCatalog,

    #[error("パースエラー: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// カタログ起因のエラーか（リクエスト単位で打ち切る対象）
    pub fn is_catalog_error(&self) -> bool {
        matches!(self, Error::CatalogUnavailable(_) | Error::EmptyCatalog)
    }
}
