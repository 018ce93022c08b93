use thiserror::Error;

#[derive(Error, Debug)]
pub enum PillAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("検出器エラー: {0}")]
    Detection(String),

    #[error("検出器がタイムアウトしました（{seconds}秒）: {file}")]
    DetectionTimeout { file: String, seconds: u64 },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("カタログが指定されていません。`pill-ai config --set-catalog PATH` で設定するか --catalog で指定してください")]
    CatalogNotSelected,

    #[error(transparent)]
    Common(#[from] pill_ai_common::Error),
}

impl PillAiError {
    /// カタログ起因のエラーか（リクエスト全体を打ち切る）
    pub fn is_catalog_error(&self) -> bool {
        match self {
            PillAiError::CatalogNotSelected => true,
            PillAiError::Common(e) => e.is_catalog_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PillAiError>;
