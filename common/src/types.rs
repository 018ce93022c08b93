//! 識別処理の型定義
//!
//! CLIと共通ライブラリで共有される型:
//! - Observation: 1枚の画像から検出された特徴（形状・刻印・色）
//! - IdentificationResult: 最終出力（呼び出し側へ返すレコード）

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 該当製品なしの場合の製品名
pub const UNKNOWN_PRODUCT: &str = "unknown product";

/// 形状が検出されなかった場合の形状ラベル
pub const SHAPE_NOT_DETECTED: &str = "not detected";

/// 色の候補（ラベルと信頼度）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorCandidate {
    pub label: String,
    pub confidence: f64,
}

impl ColorCandidate {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// 1枚の画像に対する検出結果
///
/// リクエストごとに新しく作られ、リクエスト間で状態を持ち越さない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    /// 検出された形状ラベル（`None` は未検出）
    pub shape: Option<String>,
    /// 形状の信頼度 [0,1]
    pub shape_confidence: f64,
    /// 検出された刻印ラベル（生の値、重複あり）
    pub imprint_labels: Vec<String>,
    /// 色の候補（信頼度の高い順）
    pub color_ranking: Vec<ColorCandidate>,
}

impl Observation {
    /// 形状ラベルと信頼度を指定して作成
    pub fn new(
        shape: Option<&str>,
        shape_confidence: f64,
        imprint_labels: &[&str],
        color_ranking: &[(&str, f64)],
    ) -> Self {
        Self {
            shape: shape.map(str::to_string),
            shape_confidence,
            imprint_labels: imprint_labels.iter().map(|s| s.to_string()).collect(),
            color_ranking: color_ranking
                .iter()
                .map(|(label, conf)| ColorCandidate::new(*label, *conf))
                .collect(),
        }
    }

    /// 照合用の形状ラベル（未検出・空文字は `None`）
    pub fn detected_shape(&self) -> Option<&str> {
        self.shape.as_deref().filter(|s| !s.is_empty())
    }

    /// 出力用の形状ラベル（照合に使わない形状は `SHAPE_NOT_DETECTED`）
    pub fn shape_label(&self) -> &str {
        self.detected_shape().unwrap_or(SHAPE_NOT_DETECTED)
    }

    /// 小文字化した刻印集合
    pub fn imprint_set(&self) -> BTreeSet<String> {
        self.imprint_labels.iter().map(|s| s.to_lowercase()).collect()
    }

    /// 最上位の色ラベル（照合にはこれだけを使う）
    pub fn top_color(&self) -> Option<&str> {
        self.color_ranking.first().map(|c| c.label.as_str())
    }
}

/// 識別結果（外部に返すレコード）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationResult {
    /// 一致した製品名、または `UNKNOWN_PRODUCT`
    pub name: String,
    /// 検出された形状ラベル、または `SHAPE_NOT_DETECTED`
    pub shape: String,
    pub shape_confidence: f64,
    /// 検出された刻印ラベル（生の値）
    pub letter: Vec<String>,
    /// 最上位の色ラベルのみ
    pub color: String,
    /// 採用したエントリの合計スコア
    pub confidence: f64,
}

impl IdentificationResult {
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_PRODUCT
    }
}
