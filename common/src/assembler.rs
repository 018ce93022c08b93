//! 識別結果の組み立て
//!
//! スコアリング結果と検出結果から外部向けレコードを作る。
//! 全エントリの内訳はログ（tracing）にのみ出力し、戻り値には含めない。

use crate::catalog::Catalog;
use crate::error::Result;
use crate::scoring::{ScoreBreakdown, ScoringEngine, ScoringOutcome};
use crate::types::{IdentificationResult, Observation, UNKNOWN_PRODUCT};

/// スコアリング結果から識別結果を組み立てる
pub fn assemble(observation: &Observation, outcome: &ScoringOutcome<'_>) -> IdentificationResult {
    let name = outcome
        .winner
        .map(|entry| entry.name.clone())
        .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());

    // 未検出のときは信頼度0として返す
    let shape_confidence = if observation.detected_shape().is_some() {
        observation.shape_confidence
    } else {
        0.0
    };

    IdentificationResult {
        name,
        shape: observation.shape_label().to_string(),
        shape_confidence,
        letter: observation.imprint_labels.clone(),
        color: observation.top_color().unwrap_or_default().to_string(),
        confidence: outcome.max_score,
    }
}

/// 全エントリのスコア内訳をログに出力
pub fn trace_breakdowns(catalog: &Catalog, breakdowns: &[ScoreBreakdown]) {
    for (index, (entry, b)) in catalog.entries().iter().zip(breakdowns).enumerate() {
        tracing::debug!(
            index,
            entry = %entry.name,
            shape = %entry.shape,
            color = %entry.color,
            shape_score = b.shape_score,
            color_score = b.color_score,
            letter_score = b.letter_score,
            total_score = b.total_score,
            shape_match = b.matches.shape,
            color_match = b.matches.color,
            letter_match = b.matches.letter,
            "score breakdown"
        );
    }
}

/// 検出結果を採点して識別結果を返す
pub fn identify(engine: &ScoringEngine, observation: &Observation) -> Result<IdentificationResult> {
    explain(engine, observation).map(|(result, _)| result)
}

/// 識別結果と、その判定に使ったスコアリング結果をまとめて返す（採点は1回だけ）
pub fn explain<'a>(
    engine: &'a ScoringEngine,
    observation: &Observation,
) -> Result<(IdentificationResult, ScoringOutcome<'a>)> {
    let outcome = engine.score(observation)?;
    trace_breakdowns(engine.catalog(), &outcome.breakdowns);

    let result = assemble(observation, &outcome);
    if result.is_unknown() {
        tracing::info!(max_score = outcome.max_score, "no confident match");
    } else {
        tracing::info!(name = %result.name, confidence = result.confidence, "matched");
    }
    Ok((result, outcome))
}
