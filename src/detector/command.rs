//! 外部コマンド検出器
//!
//! 設定された argv の末尾に画像パスを付けて実行し、標準出力のJSONを読む。
//! 待機中の future が破棄されると子プロセスは kill される。

use super::{parse_output, FeatureDetector};
use crate::error::{PillAiError, Result};
use crate::scanner::ImageInfo;
use async_trait::async_trait;
use pill_ai_common::RawDetections;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct CommandDetector {
    argv: Vec<String>,
}

impl CommandDetector {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

#[async_trait]
impl FeatureDetector for CommandDetector {
    async fn detect(&self, image: &ImageInfo) -> Result<RawDetections> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(PillAiError::Config("検出器コマンドが空です".into()));
        };

        tracing::debug!(program = %program, image = %image.path.display(), "running detector");

        let output = Command::new(program)
            .args(args)
            .arg(&image.path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PillAiError::Detection(format!("検出器実行エラー ({}): {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PillAiError::Detection(format!(
                "検出器が失敗しました (code {:?}): {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_output(&stdout, image)
    }

    fn name(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("command")
    }
}
