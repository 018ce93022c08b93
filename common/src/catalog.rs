//! 参照カタログモジュール
//!
//! 既知の製品（形状・色・刻印）を保持する参照テーブル。
//! CSVまたは行データから読み込み、読み込み後は変更しない。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// ヘッダー行として扱う列名（先頭4列）
const HEADER_COLUMNS: [&str; 4] = ["name", "shape", "color", "imprint"];

/// 1行に最低限必要な列数（name, shape, color）
const MIN_COLUMNS: usize = 3;

/// カタログの1エントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 表示名（一意性は保証しない）
    pub name: String,
    /// 正規化済み形状（trim + 小文字）
    pub shape: String,
    /// 正規化済み色（trim + 小文字、部分一致で照合）
    pub color: String,
    /// 正規化済み刻印トークン集合
    ///
    /// 刻印欄が空のときは空文字トークン1つだけの集合になる。
    pub imprint_set: BTreeSet<String>,
}

impl CatalogEntry {
    /// 生のフィールド値から正規化して作成
    pub fn new(name: &str, shape: &str, color: &str, imprint: &str) -> Self {
        Self {
            name: name.to_string(),
            shape: shape.trim().to_lowercase(),
            color: color.trim().to_lowercase(),
            imprint_set: split_imprint(imprint),
        }
    }

    /// 刻印が宣言されているか（空文字トークンのみの場合は未宣言）
    pub fn declares_imprint(&self) -> bool {
        self.imprint_set.iter().any(|t| !t.is_empty())
    }
}

/// 刻印欄をカンマで分割してトークン集合にする
///
/// 空欄は `{""}` になる。照合結果に影響するためそのまま残す。
pub fn split_imprint(field: &str) -> BTreeSet<String> {
    field
        .trim()
        .to_lowercase()
        .split(',')
        .map(|token| token.trim().to_string())
        .collect()
}

/// 参照カタログ全体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// エントリ列から作成
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// CSVファイルから読み込み
    pub fn from_csv(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::CatalogUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_csv_str(&content)
    }

    /// CSV文字列から読み込み
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::CatalogUnavailable(format!("CSV解析エラー: {}", e)))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Self::from_rows(rows)
    }

    /// 行データ（セル文字列の列）から読み込み
    ///
    /// - 先頭行が `name, shape, color, imprint` ならヘッダーとして読み飛ばす
    /// - 空行は無視
    /// - 4列目がない行は刻印なしとして扱う
    /// - 3列未満の行は `CatalogUnavailable`
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut entries = Vec::new();
        let mut first_content_row = true;

        for (idx, row) in rows.into_iter().enumerate() {
            let row_num = idx + 1;

            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            if first_content_row {
                first_content_row = false;
                if is_header_row(&row) {
                    continue;
                }
            }

            if row.len() < MIN_COLUMNS {
                return Err(Error::CatalogUnavailable(format!(
                    "{}行目: 列が不足しています（{}列、最低{}列必要）",
                    row_num,
                    row.len(),
                    MIN_COLUMNS
                )));
            }

            let imprint = row.get(3).map(String::as_str).unwrap_or("");
            entries.push(CatalogEntry::new(&row[0], &row[1], &row[2], imprint));
        }

        Ok(Self { entries })
    }

    /// 全エントリを取得
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 名前で検索（最初に見つかったもの）
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// 形状の一覧を取得
    pub fn shapes(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.entries.iter().map(|e| e.shape.as_str()).collect();
        set.into_iter().collect()
    }
}

fn is_header_row(row: &[String]) -> bool {
    row.len() >= HEADER_COLUMNS.len()
        && row
            .iter()
            .zip(HEADER_COLUMNS.iter())
            .all(|(cell, header)| cell.trim().eq_ignore_ascii_case(header))
}
