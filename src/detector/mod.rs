//! 特徴検出器モジュール
//!
//! 画像から形状・刻印・色の生の検出結果を得る。
//! 検出そのものは外部（学習済みモデル）に任せ、ここでは呼び出しと出力の解釈だけを行う。

mod cache;
mod command;
mod sidecar;

pub use cache::{compute_file_hash, CacheFile, CACHE_FILE_NAME};
pub use command::CommandDetector;
pub use sidecar::{sidecar_path, SidecarDetector, SIDECAR_SUFFIX};

use crate::config::Config;
use crate::error::{PillAiError, Result};
use crate::scanner::ImageInfo;
use async_trait::async_trait;
use pill_ai_common::RawDetections;
use std::sync::Arc;

/// 1枚の画像から生の検出結果を得る
///
/// パイプラインはタイムアウト時に返された future を破棄する。
/// 子プロセスなどの資源は破棄時に解放されるように実装すること。
#[async_trait]
pub trait FeatureDetector: Send + Sync {
    async fn detect(&self, image: &ImageInfo) -> Result<RawDetections>;

    /// ログ表示用の名前
    fn name(&self) -> &str;
}

/// 設定から検出器を作る
///
/// 検出器コマンドが未設定ならサイドカーファイルを読む。
pub fn from_config(config: &Config) -> Arc<dyn FeatureDetector> {
    if config.detector_command.is_empty() {
        Arc::new(SidecarDetector)
    } else {
        Arc::new(CommandDetector::new(config.detector_command.clone()))
    }
}

/// 検出器の出力をパース（共通パーサーをラップ）
fn parse_output(output: &str, image: &ImageInfo) -> Result<RawDetections> {
    pill_ai_common::parse_detections(output)
        .map_err(|e| PillAiError::Detection(format!("{}: {}", image.file_name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults_to_sidecar() {
        let detector = from_config(&Config::default());
        assert_eq!(detector.name(), "sidecar");
    }

    #[test]
    fn test_from_config_uses_command() {
        let config = Config {
            detector_command: vec!["detect-pill".into()],
            ..Config::default()
        };
        let detector = from_config(&config);
        assert_eq!(detector.name(), "detect-pill");
    }
}
