//! 特徴融合スコアリングエンジン
//!
//! 形状・色・刻印の3つの検出結果をカタログの各エントリと独立に照合し、
//! 符号付きスコアの合計が最大のエントリを選ぶ。
//!
//! ## スコア規則（デフォルト重み）
//! - 形状: 一致 `+0.4 × 形状信頼度` / 不一致・未検出 `-1.0`
//! - 色: 最上位の色ラベルがエントリの色に部分一致 `+0.3` / それ以外 `-0.2`
//! - 刻印: 検出集合と宣言集合が両方空でなければ
//!   `+0.3 × |検出 ∩ 宣言| / |宣言|`、どちらかが空なら `0`
//!
//! 各エントリのスコアは `(Observation, CatalogEntry)` の純粋関数で、
//! カタログは読み取り専用のまま複数のクエリから同時に使える。

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{Error, Result};
use crate::types::Observation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// 特徴ごとの加点・減点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// 形状一致時の係数（形状信頼度に掛ける）
    pub shape_match: f64,
    /// 形状不一致時の加算値
    pub shape_mismatch: f64,
    /// 色一致時の加算値
    pub color_match: f64,
    /// 色不一致時の加算値
    pub color_mismatch: f64,
    /// 刻印が全て一致したときの加算値
    pub letter_max: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            shape_match: 0.4,
            shape_mismatch: -1.0,
            color_match: 0.3,
            color_mismatch: -0.2,
            letter_max: 0.3,
        }
    }
}

/// 特徴ごとの一致フラグ（デバッグ用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFlags {
    pub shape: bool,
    pub color: bool,
    /// 刻印の照合を行った（検出側・エントリ側とも空でない）。一致数は問わない
    pub letter: bool,
}

/// 1エントリ分のスコア内訳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub shape_score: f64,
    pub color_score: f64,
    pub letter_score: f64,
    /// 3つの合計（負にもなる、クランプしない）
    pub total_score: f64,
    pub matches: MatchFlags,
}

/// クエリに前処理した検出結果（エントリごとに作り直さない）
struct PreparedObservation<'a> {
    shape: Option<String>,
    shape_confidence: f64,
    color: Option<String>,
    letters: &'a BTreeSet<String>,
}

impl<'a> PreparedObservation<'a> {
    fn new(observation: &Observation, letters: &'a BTreeSet<String>) -> Self {
        Self {
            shape: observation.detected_shape().map(str::to_lowercase),
            shape_confidence: observation.shape_confidence,
            color: observation
                .top_color()
                .map(str::to_lowercase)
                .filter(|c| !c.is_empty()),
            letters,
        }
    }

    fn score(&self, entry: &CatalogEntry, weights: &ScoringWeights) -> ScoreBreakdown {
        let mut matches = MatchFlags::default();

        let shape_score = match &self.shape {
            Some(shape) if *shape == entry.shape => {
                matches.shape = true;
                weights.shape_match * self.shape_confidence
            }
            _ => weights.shape_mismatch,
        };

        let color_score = match &self.color {
            Some(color) if entry.color.contains(color.as_str()) => {
                matches.color = true;
                weights.color_match
            }
            _ => weights.color_mismatch,
        };

        let letter_score = if !self.letters.is_empty() && !entry.imprint_set.is_empty() {
            let correct = self.letters.intersection(&entry.imprint_set).count();
            matches.letter = true;
            weights.letter_max * (correct as f64 / entry.imprint_set.len() as f64)
        } else {
            0.0
        };

        ScoreBreakdown {
            shape_score,
            color_score,
            letter_score,
            total_score: shape_score + color_score + letter_score,
            matches,
        }
    }
}

/// 1組の (検出結果, エントリ) のスコアを計算
pub fn score_entry(
    observation: &Observation,
    entry: &CatalogEntry,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let letters = observation.imprint_set();
    PreparedObservation::new(observation, &letters).score(entry, weights)
}

/// 合計スコア列から最大のものを選ぶ（同点は先頭優先）
///
/// 空の場合は `None`。NaNのスコアは選ばれない。
pub fn select_best(breakdowns: &[ScoreBreakdown]) -> Option<(usize, f64)> {
    if breakdowns.is_empty() {
        return None;
    }

    let mut best = (0, breakdowns[0].total_score);
    for (i, b) in breakdowns.iter().enumerate().skip(1) {
        if b.total_score > best.1 || (best.1.is_nan() && !b.total_score.is_nan()) {
            best = (i, b.total_score);
        }
    }
    Some(best)
}

/// スコアリング結果（全エントリ分の内訳と選ばれたエントリ）
#[derive(Debug, Clone)]
pub struct ScoringOutcome<'a> {
    /// カタログ順の内訳（エントリ数と同じ長さ）
    pub breakdowns: Vec<ScoreBreakdown>,
    /// 最大スコアのエントリ位置
    pub best_index: usize,
    /// 最大スコア
    pub max_score: f64,
    /// 最大スコアが正のときのみ `Some`
    pub winner: Option<&'a CatalogEntry>,
}

/// スコアリングエンジン
///
/// カタログは `Arc` で共有し、エンジン自体もクローンしてスレッド間で使える。
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Arc<Catalog>,
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(catalog: Arc<Catalog>, weights: ScoringWeights) -> Self {
        Self { catalog, weights }
    }

    /// デフォルト重みで作成
    pub fn with_default_weights(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, ScoringWeights::default())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// 全エントリのスコア内訳を計算（カタログ順）
    pub fn score_all(&self, observation: &Observation) -> Vec<ScoreBreakdown> {
        let letters = observation.imprint_set();
        let prepared = PreparedObservation::new(observation, &letters);
        self.catalog
            .entries()
            .iter()
            .map(|entry| prepared.score(entry, &self.weights))
            .collect()
    }

    /// 全エントリを採点して最大のものを選ぶ
    pub fn score(&self, observation: &Observation) -> Result<ScoringOutcome<'_>> {
        if self.catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let breakdowns = self.score_all(observation);
        let (best_index, max_score) = select_best(&breakdowns).ok_or(Error::EmptyCatalog)?;

        // NaNも「識別できない」側に倒す
        let winner = if max_score > 0.0 {
            self.catalog.entries().get(best_index)
        } else {
            None
        };

        Ok(ScoringOutcome {
            breakdowns,
            best_index,
            max_score,
            winner,
        })
    }
}
