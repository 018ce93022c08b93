pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use crate::identify::IdentifyRecord;
use std::path::{Path, PathBuf};

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.with_extension(extension)
    }
}

/// 識別結果JSONを書き出し
pub fn write_json(records: &[IdentifyRecord], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// 識別結果JSONを読み込み
pub fn read_json(input_path: &Path) -> Result<Vec<IdentifyRecord>> {
    let content = std::fs::read_to_string(input_path)?;
    Ok(serde_json::from_str(&content)?)
}

/// 指定形式で書き出し、出力したパスを返す
pub fn export_results(
    records: &[IdentifyRecord],
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Json | ExportFormat::Both) {
        let path = output_path_for_format(output, title, "json");
        write_json(records, &path)?;
        println!("✔ JSON出力: {}", path.display());
        written.push(path);
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for_format(output, title, "xlsx");
        println!("- Excelを生成中...");
        excel::generate_excel(records, &path, title)?;
        println!("✔ Excel出力: {}", path.display());
        written.push(path);
    }

    Ok(written)
}
