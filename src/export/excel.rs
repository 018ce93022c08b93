//! Excel生成（CLI版）
//!
//! 共通ライブラリの一覧表生成を使い、ファイルに書き出す

use crate::error::{PillAiError, Result};
use crate::identify::IdentifyRecord;
use pill_ai_common::export::excel_core::{generate_report_buffer, ReportRow};
use std::path::Path;

impl ReportRow for IdentifyRecord {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn product_name(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.name.as_str())
    }

    fn shape(&self) -> &str {
        self.result.as_ref().map(|r| r.shape.as_str()).unwrap_or("")
    }

    fn shape_confidence(&self) -> f64 {
        self.result.as_ref().map(|r| r.shape_confidence).unwrap_or(0.0)
    }

    fn imprint(&self) -> String {
        self.result.as_ref().map(|r| r.letter.join(", ")).unwrap_or_default()
    }

    fn color(&self) -> &str {
        self.result.as_ref().map(|r| r.color.as_str()).unwrap_or("")
    }

    fn score(&self) -> f64 {
        self.result.as_ref().map(|r| r.confidence).unwrap_or(f64::NAN)
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn is_unknown(&self) -> bool {
        self.result.as_ref().map(|r| r.is_unknown()).unwrap_or(true)
    }
}

pub fn generate_excel(records: &[IdentifyRecord], output_path: &Path, title: &str) -> Result<()> {
    let buffer = generate_report_buffer(records, title).map_err(PillAiError::ExcelGeneration)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}
