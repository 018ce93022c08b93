//! 検出器出力の型と閾値処理
//!
//! 検出器は特徴ごとに (ラベル, 信頼度) の列を返す。
//! 閾値を超えたものだけを残して `Observation` に変換する。

use crate::types::{ColorCandidate, Observation};
use serde::{Deserialize, Deserializer, Serialize};

/// 検出1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DetectionRepr")]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// 受け付ける表記:
/// `{"label": "round", "confidence": 0.9}` / `["round", 0.9]` / `"round"`
#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionRepr {
    Object {
        label: String,
        #[serde(default = "full_confidence")]
        confidence: f64,
    },
    Pair(String, f64),
    Label(String),
}

fn full_confidence() -> f64 {
    1.0
}

impl From<DetectionRepr> for Detection {
    fn from(repr: DetectionRepr) -> Self {
        match repr {
            DetectionRepr::Object { label, confidence } | DetectionRepr::Pair(label, confidence) => {
                Detection { label, confidence }
            }
            DetectionRepr::Label(label) => Detection {
                label,
                confidence: full_confidence(),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Detection>),
    One(Detection),
    Null(()),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Detection>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(d) => vec![d],
        OneOrMany::Null(()) => Vec::new(),
    })
}

/// 1枚の画像に対する検出器の生出力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDetections {
    #[serde(deserialize_with = "one_or_many")]
    pub shape: Vec<Detection>,
    #[serde(deserialize_with = "one_or_many")]
    pub letter: Vec<Detection>,
    #[serde(deserialize_with = "one_or_many")]
    pub color: Vec<Detection>,
}

/// 特徴ごとの信頼度閾値（この値を超えたものだけ採用）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    pub shape: f64,
    pub letter: f64,
    pub color: f64,
    /// 形状の信頼度を検出器の値のまま使う（falseなら1.0に固定）
    pub calibrated_shape_confidence: bool,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            shape: 0.5,
            letter: 0.5,
            color: 0.1,
            calibrated_shape_confidence: false,
        }
    }
}

fn passes(confidence: f64, threshold: f64) -> bool {
    confidence.is_finite() && confidence > threshold
}

impl DetectionThresholds {
    /// 生出力を閾値で絞り込んで `Observation` にする
    ///
    /// - 形状: 閾値超えのうち最も信頼度の高いもの（同点は先頭）
    /// - 刻印: 閾値超えの全ラベル（検出器の順序のまま）
    /// - 色: 閾値超えの全候補を信頼度の降順に安定ソート
    pub fn apply(&self, raw: &RawDetections) -> Observation {
        let mut best_shape: Option<&Detection> = None;
        for d in raw.shape.iter().filter(|d| passes(d.confidence, self.shape)) {
            if best_shape.map_or(true, |b| d.confidence > b.confidence) {
                best_shape = Some(d);
            }
        }

        let (shape, shape_confidence) = match best_shape {
            Some(d) if self.calibrated_shape_confidence => (Some(d.label.clone()), d.confidence),
            Some(d) => (Some(d.label.clone()), 1.0),
            None => (None, 0.0),
        };

        let imprint_labels = raw
            .letter
            .iter()
            .filter(|d| passes(d.confidence, self.letter))
            .map(|d| d.label.clone())
            .collect();

        let mut color_ranking: Vec<ColorCandidate> = raw
            .color
            .iter()
            .filter(|d| passes(d.confidence, self.color))
            .map(|d| ColorCandidate::new(d.label.clone(), d.confidence))
            .collect();
        color_ranking.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Observation {
            shape,
            shape_confidence,
            imprint_labels,
            color_ranking,
        }
    }
}
