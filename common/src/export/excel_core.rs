//! Excel生成（共通ライブラリ）
//!
//! 識別結果を1画像1行の一覧表としてExcelに書き出す

use rust_xlsxwriter::*;

/// 一覧表の列見出し
pub const REPORT_COLUMNS: [&str; 8] = [
    "ファイル名",
    "製品名",
    "形状",
    "形状信頼度",
    "刻印",
    "色",
    "スコア",
    "エラー",
];

/// 列幅（文字数）
const COLUMN_WIDTHS: [f64; 8] = [28.0, 24.0, 14.0, 10.0, 18.0, 12.0, 10.0, 36.0];

/// 一覧表1行分のデータ（CLI側の型で実装する）
pub trait ReportRow {
    fn file_name(&self) -> &str;
    /// 識別に失敗した行は `None`
    fn product_name(&self) -> Option<&str>;
    fn shape(&self) -> &str;
    fn shape_confidence(&self) -> f64;
    fn imprint(&self) -> String;
    fn color(&self) -> &str;
    fn score(&self) -> f64;
    fn error(&self) -> Option<&str>;
    /// 該当製品なしか（強調表示に使う）
    fn is_unknown(&self) -> bool;
}

impl ReportRow for crate::types::IdentificationResult {
    fn file_name(&self) -> &str { "" }
    fn product_name(&self) -> Option<&str> { Some(&self.name) }
    fn shape(&self) -> &str { &self.shape }
    fn shape_confidence(&self) -> f64 { self.shape_confidence }
    fn imprint(&self) -> String { self.letter.join(", ") }
    fn color(&self) -> &str { &self.color }
    fn score(&self) -> f64 { self.confidence }
    fn error(&self) -> Option<&str> { None }
    fn is_unknown(&self) -> bool { crate::types::IdentificationResult::is_unknown(self) }
}

/// Excelをバッファに生成
///
/// # Arguments
/// * `rows` - 識別結果（ReportRowトレイトを実装した型）
/// * `title` - 1行目に書くタイトル（作成日時を後ろに付ける）
pub fn generate_report_buffer<T: ReportRow>(rows: &[T], title: &str) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(12.0);

    let header_format = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_font_color(Color::RGB(0x555555))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_font_size(11.0)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let number_format = value_format.clone().set_num_format("0.000");

    let unknown_format = value_format
        .clone()
        .set_font_color(Color::RGB(0x999999))
        .set_italic();

    let error_format = value_format.clone().set_font_color(Color::RGB(0xC00000));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("識別結果")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    worksheet
        .write_string_with_format(0, 0, format!("{} ({})", title, generated_at), &title_format)
        .map_err(|e| format!("タイトル書き込みエラー: {}", e))?;

    for (col, header) in REPORT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(2, col as u16, *header, &header_format)
            .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = 3 + i as u32;

        worksheet
            .write_string_with_format(r, 0, row.file_name(), &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;

        if let Some(error) = row.error() {
            worksheet
                .write_string_with_format(r, 7, error, &error_format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }

        let Some(name) = row.product_name() else {
            continue;
        };

        let name_format = if row.is_unknown() { &unknown_format } else { &value_format };
        worksheet
            .write_string_with_format(r, 1, name, name_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_string_with_format(r, 2, row.shape(), &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_number_with_format(r, 3, row.shape_confidence(), &number_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_string_with_format(r, 4, row.imprint(), &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_string_with_format(r, 5, row.color(), &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;

        // NaNはセルに書けないので空欄にする
        let score = row.score();
        if score.is_finite() {
            worksheet
                .write_number_with_format(r, 6, score, &number_format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
