//! 一括識別パイプライン
//!
//! 画像ごとに 検出 → 閾値適用 → スコアリング を行う。
//! - 検出はバッチ単位で同時に走らせ、共通の期限で打ち切る
//! - 検出に失敗した画像は `error` 付きのレコードになり、他の画像は続行する
//! - スコアリングは純粋関数なので rayon で並列に行う
//! - カタログ起因のエラーだけはリクエスト全体を打ち切る

use crate::config::Config;
use crate::detector::{CacheFile, FeatureDetector};
use crate::error::{PillAiError, Result};
use crate::scanner::ImageInfo;
use indicatif::{ProgressBar, ProgressStyle};
use pill_ai_common::{
    Catalog, DetectionThresholds, IdentificationResult, Observation, RawDetections, ScoringEngine,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

/// 1画像分の出力レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyRecord {
    pub file_name: String,
    pub file_path: String,
    #[serde(flatten)]
    pub result: Option<IdentificationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IdentifyRecord {
    fn success(image: &ImageInfo, result: IdentificationResult) -> Self {
        Self {
            file_name: image.file_name.clone(),
            file_path: image.path.display().to_string(),
            result: Some(result),
            error: None,
        }
    }

    fn failure(image: &ImageInfo, error: String) -> Self {
        Self {
            file_name: image.file_name.clone(),
            file_path: image.path.display().to_string(),
            result: None,
            error: Some(error),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.result.as_ref().map(|r| !r.is_unknown()).unwrap_or(false)
    }
}

/// 一括識別のオプション
#[derive(Debug, Clone, Copy)]
pub struct IdentifyOptions<'a> {
    pub batch_size: usize,
    /// 検出結果キャッシュを置くフォルダ（`None` でキャッシュ無効）
    pub cache_folder: Option<&'a Path>,
    /// 進捗バーを表示する
    pub progress: bool,
}

impl Default for IdentifyOptions<'_> {
    fn default() -> Self {
        Self {
            batch_size: 5,
            cache_folder: None,
            progress: false,
        }
    }
}

/// 識別器（起動時に1回だけ作り、参照で使い回す）
pub struct Identifier {
    engine: ScoringEngine,
    detector: Arc<dyn FeatureDetector>,
    thresholds: DetectionThresholds,
    timeout: Duration,
}

impl Identifier {
    pub fn new(
        engine: ScoringEngine,
        detector: Arc<dyn FeatureDetector>,
        thresholds: DetectionThresholds,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            detector,
            thresholds,
            timeout,
        }
    }

    /// 設定から作成
    pub fn from_config(catalog: Arc<Catalog>, detector: Arc<dyn FeatureDetector>, config: &Config) -> Self {
        Self::new(
            ScoringEngine::new(catalog, config.weights),
            detector,
            config.thresholds,
            Duration::from_secs(config.detector_timeout_seconds.max(1)),
        )
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn thresholds(&self) -> &DetectionThresholds {
        &self.thresholds
    }

    /// 生の検出結果を1件識別
    pub fn identify_detections(&self, raw: &RawDetections) -> Result<IdentificationResult> {
        let observation = self.thresholds.apply(raw);
        Ok(pill_ai_common::identify(&self.engine, &observation)?)
    }

    /// 複数の検出結果を並列にスコアリング（入力順で返す）
    pub fn score_observations(&self, observations: &[Observation]) -> Result<Vec<IdentificationResult>> {
        let results = observations
            .par_iter()
            .map(|obs| pill_ai_common::identify(&self.engine, obs))
            .collect::<pill_ai_common::Result<Vec<_>>>()?;
        Ok(results)
    }

    /// 1画像の検出（タイムアウト付き）
    pub async fn detect_image(&self, image: &ImageInfo) -> Result<RawDetections> {
        let mut outcomes = self.detect_batch(std::slice::from_ref(image)).await;
        outcomes
            .pop()
            .unwrap_or_else(|| Err(PillAiError::Detection(image.file_name.clone())))
    }

    /// バッチ内の画像を同時に検出し、入力順に結果を返す
    ///
    /// 期限を過ぎたら残りのタスクを中断する。検出中の future はその場で破棄される。
    async fn detect_batch(&self, images: &[ImageInfo]) -> Vec<Result<RawDetections>> {
        let deadline = Instant::now() + self.timeout;

        let mut tasks = JoinSet::new();
        for (index, img) in images.iter().cloned().enumerate() {
            let detector = Arc::clone(&self.detector);
            tasks.spawn(async move { (index, detector.detect(&img).await) });
        }

        let mut finished: Vec<Option<Result<RawDetections>>> = images.iter().map(|_| None).collect();
        let mut timed_out = false;
        let mut join_failure = None;
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, result)))) => finished[index] = Some(result),
                Ok(Some(Err(join_error))) => {
                    tracing::warn!(error = %join_error, "detection task aborted");
                    join_failure = Some(join_error.to_string());
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    tasks.abort_all();
                    break;
                }
            }
        }
        drop(tasks);

        images
            .iter()
            .zip(finished)
            .map(|(img, outcome)| match outcome {
                Some(result) => result,
                None if timed_out => Err(PillAiError::DetectionTimeout {
                    file: img.file_name.clone(),
                    seconds: self.timeout.as_secs(),
                }),
                None => Err(PillAiError::Detection(format!(
                    "検出タスクが異常終了しました: {}",
                    join_failure.clone().unwrap_or_default()
                ))),
            })
            .collect()
    }

    /// 画像をまとめて識別
    ///
    /// 戻り値は入力と同じ順序・同じ件数。
    pub async fn identify_images(
        &self,
        images: &[ImageInfo],
        options: IdentifyOptions<'_>,
    ) -> Result<Vec<IdentifyRecord>> {
        if self.engine.catalog().is_empty() {
            return Err(pill_ai_common::Error::EmptyCatalog.into());
        }

        let mut cache = options.cache_folder.map(CacheFile::load);

        // 1. キャッシュ確認
        let mut detections: Vec<Option<std::result::Result<RawDetections, String>>> = vec![None; images.len()];
        let pending: Vec<(usize, String)> = match &cache {
            Some(cache) => {
                let (cached, uncached) = cache.partition(images);
                tracing::info!(cached = cached.len(), pending = uncached.len(), "cache checked");
                for (index, raw) in cached {
                    detections[index] = Some(Ok(raw));
                }
                uncached
            }
            None => (0..images.len()).map(|i| (i, String::new())).collect(),
        };

        // 2. 未キャッシュ分をバッチで検出
        let progress = options.progress.then(|| progress_bar(pending.len() as u64));

        for (batch_idx, batch) in pending.chunks(options.batch_size.max(1)).enumerate() {
            tracing::debug!(batch = batch_idx + 1, size = batch.len(), "detecting batch");

            let batch_images: Vec<ImageInfo> = batch.iter().map(|(i, _)| images[*i].clone()).collect();
            let outcomes = self.detect_batch(&batch_images).await;

            for ((index, hash), outcome) in batch.iter().zip(outcomes) {
                let img = &images[*index];
                match outcome {
                    Ok(raw) => {
                        if let (Some(cache), false) = (cache.as_mut(), hash.is_empty()) {
                            let file_size = std::fs::metadata(&img.path).map(|m| m.len()).unwrap_or(0);
                            cache.insert(hash.clone(), img.file_name.clone(), file_size, raw.clone());
                        }
                        detections[*index] = Some(Ok(raw));
                    }
                    Err(e) => {
                        tracing::warn!(file = %img.file_name, error = %e, "detection failed");
                        detections[*index] = Some(Err(e.to_string()));
                    }
                }
                if let Some(pb) = &progress {
                    pb.set_message(img.file_name.clone());
                    pb.inc(1);
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("検出完了");
        }

        if let (Some(cache), Some(folder)) = (&cache, options.cache_folder) {
            if let Err(e) = cache.save(folder) {
                tracing::warn!(error = %e, "キャッシュ保存に失敗");
            }
        }

        // 3. 閾値適用とスコアリング
        let observations: Vec<Observation> = detections
            .iter()
            .filter_map(|d| match d {
                Some(Ok(raw)) => Some(self.thresholds.apply(raw)),
                _ => None,
            })
            .collect();
        let mut scored = self.score_observations(&observations)?.into_iter();

        let records = images
            .iter()
            .zip(detections)
            .map(|(img, detection)| match detection {
                Some(Ok(_)) => match scored.next() {
                    Some(result) => IdentifyRecord::success(img, result),
                    None => IdentifyRecord::failure(img, "スコアリング結果がありません".into()),
                },
                Some(Err(message)) => IdentifyRecord::failure(img, message),
                None => IdentifyRecord::failure(img, "検出されませんでした".into()),
            })
            .collect();

        Ok(records)
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
