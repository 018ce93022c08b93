use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pill-ai")]
#[command(about = "錠剤画像の検出結果からカタログ製品を識別するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 参照カタログ（CSV/XLSX）。省略時は設定 → catalog/ から選択
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像フォルダを識別して結果JSONを出力
    Identify {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（デフォルト: 入力フォルダ/result.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// バッチサイズ（同時に検出する枚数、省略時は設定値）
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// キャッシュを使用（再検出をスキップ）
        #[arg(long)]
        use_cache: bool,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// Excel一覧表も出力
        #[arg(long)]
        excel: bool,
    },

    /// 検出結果JSONを1件スコアリング
    Score {
        /// 検出結果JSONファイル
        #[arg(required = true)]
        detections: PathBuf,

        /// 全エントリのスコア内訳を表示
        #[arg(long)]
        explain: bool,
    },

    /// カタログを検証して一覧表示
    Catalog {
        /// カタログファイル（省略時は --catalog / 設定値）
        path: Option<PathBuf>,
    },

    /// 識別結果JSONからExcel/JSONを出力
    Export {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ドキュメントタイトル
        #[arg(short, long, default_value = "錠剤識別結果")]
        title: String,
    },

    /// 設定を表示/編集
    Config {
        /// 参照カタログを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 検出器コマンドを設定（空白区切り、画像パスは末尾に付く）
        #[arg(long)]
        set_detector: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    #[default]
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("both".parse::<ExportFormat>().unwrap(), ExportFormat::Both);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_parse_identify_command() {
        let cli = Cli::try_parse_from([
            "pill-ai", "--catalog", "c.csv", "identify", "pills", "-b", "3", "--use-cache", "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.catalog, Some(PathBuf::from("c.csv")));
        match cli.command {
            Commands::Identify { folder, batch_size, use_cache, recursive, .. } => {
                assert_eq!(folder, PathBuf::from("pills"));
                assert_eq!(batch_size, Some(3));
                assert!(use_cache);
                assert!(!recursive);
            }
            _ => panic!("Expected Identify"),
        }
    }

    #[test]
    fn test_parse_score_explain() {
        let cli = Cli::try_parse_from(["pill-ai", "score", "d.json", "--explain"]).unwrap();
        assert!(matches!(cli.command, Commands::Score { explain: true, .. }));
    }
}
