use crate::error::{PillAiError, Result};
use pill_ai_common::{DetectionThresholds, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// カタログパスを上書きする環境変数
pub const CATALOG_ENV: &str = "PILL_AI_CATALOG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 参照カタログ（CSV / XLSX）
    pub catalog_path: Option<PathBuf>,
    /// 検出器コマンド（argv形式、画像パスは末尾に追加される）
    pub detector_command: Vec<String>,
    pub detector_timeout_seconds: u64,
    pub default_batch_size: usize,
    pub thresholds: DetectionThresholds,
    pub weights: ScoringWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            detector_command: Vec::new(),
            detector_timeout_seconds: 60,
            default_batch_size: 5,
            thresholds: DetectionThresholds::default(),
            weights: ScoringWeights::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PillAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("pill-ai").join("config.json"))
    }

    /// カタログパスを取得（環境変数を優先）
    pub fn catalog_path(&self) -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CATALOG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        self.catalog_path.clone()
    }

    pub fn set_catalog(&mut self, path: PathBuf) -> Result<()> {
        if !path.exists() {
            return Err(PillAiError::FileNotFound(path.display().to_string()));
        }
        self.catalog_path = Some(path);
        self.save()
    }

    /// 検出器コマンドを設定（空白区切り）
    pub fn set_detector(&mut self, command: &str) -> Result<()> {
        let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if argv.is_empty() {
            return Err(PillAiError::Config("検出器コマンドが空です".into()));
        }
        self.detector_command = argv;
        self.save()
    }
}
