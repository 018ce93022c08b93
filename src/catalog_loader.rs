//! カタログファイル読み込みモジュール
//!
//! 拡張子で形式を判定する:
//! - `.csv`: csv クレート
//! - `.xlsx` / `.xls`: calamine（先頭シートのみ）

use crate::error::Result;
use calamine::{open_workbook_auto, Data, Reader};
use pill_ai_common::{Catalog, Error as CommonError};
use std::path::Path;

/// カタログファイルを読み込む
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(CommonError::CatalogUnavailable(format!(
            "ファイルが見つかりません: {}",
            path.display()
        ))
        .into());
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let catalog = match ext.as_str() {
        "csv" => Catalog::from_csv(path)?,
        "xlsx" | "xls" => load_workbook(path)?,
        _ => {
            return Err(CommonError::CatalogUnavailable(format!(
                "未対応の形式です（csv/xlsx/xls）: {}",
                path.display()
            ))
            .into())
        }
    };

    tracing::info!(path = %path.display(), entries = catalog.len(), "catalog loaded");
    Ok(catalog)
}

fn load_workbook(path: &Path) -> Result<Catalog> {
    let unavailable = |msg: String| CommonError::CatalogUnavailable(format!("{}: {}", path.display(), msg));

    let mut workbook = open_workbook_auto(path).map_err(|e| unavailable(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unavailable("シートがありません".into()))?
        .map_err(|e| unavailable(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    Ok(Catalog::from_rows(rows)?)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
