//! 検出器出力パーサー
//!
//! 検出器（外部コマンド・サイドカーファイル）の出力からJSONを抽出し、
//! `RawDetections` にパースする。検出器はログを混ぜて出力することがある。

use crate::detection::RawDetections;
use crate::error::{Error, Result};

/// 出力からJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use pill_ai_common::extract_json;
///
/// let output = "loading model...\n{\"shape\": \"round\"}\n";
/// let json = extract_json(output).unwrap();
/// assert_eq!(json, "{\"shape\": \"round\"}");
/// ```
pub fn extract_json(output: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = output.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = output[start..].find("```") {
            let end = start + end_offset;
            return Ok(output[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = output.find('{') {
        if let Some(end) = output.rfind('}') {
            if end >= start {
                return Ok(&output[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 検出器の出力をパース
///
/// # Arguments
/// * `output` - 検出器の標準出力またはファイル内容
///
/// # Returns
/// * `Ok(RawDetections)` - パース成功
/// * `Err` - JSONが見つからないかパース失敗
pub fn parse_detections(output: &str) -> Result<RawDetections> {
    let json_str = extract_json(output)?;
    serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("検出結果 JSONパースエラー: {}", e)))
}
