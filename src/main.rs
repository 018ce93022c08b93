use clap::Parser;
use pill_ai_rust::{catalog_loader, catalog_selector, cli, config, detector, error, export, identify, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use identify::{Identifier, IdentifyOptions};
use pill_ai_common::{Catalog, RawDetections};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

/// カタログを決定して読み込む（--catalog → 環境変数/設定 → 対話選択）
fn load_catalog(explicit: Option<PathBuf>, config: &Config) -> Result<Arc<Catalog>> {
    let path = catalog_selector::resolve_catalog(explicit.or_else(|| config.catalog_path()))?;
    let catalog = catalog_loader::load_catalog(&path)?;
    if catalog.is_empty() {
        return Err(pill_ai_common::Error::EmptyCatalog.into());
    }
    Ok(Arc::new(catalog))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Identify { folder, output, batch_size, use_cache, recursive, excel } => {
            println!("💊 pill-ai - 錠剤識別\n");

            // 1. カタログ読み込み
            println!("[1/4] カタログを読み込み中...");
            let catalog = load_catalog(cli.catalog, &config)?;
            println!("✔ {}件のエントリ\n", catalog.len());

            // 2. 画像スキャン
            println!("[2/4] 画像をスキャン中...");
            let images = scanner::scan_folder(&folder, recursive)?;
            println!("✔ {}枚の画像を検出\n", images.len());

            if images.is_empty() {
                return Err(error::PillAiError::NoImagesFound(folder.display().to_string()));
            }

            // 3. 検出と照合
            let detector = detector::from_config(&config);
            println!(
                "[3/4] 特徴検出・照合中... (検出器: {}){}",
                detector.name(),
                if use_cache { " (キャッシュ有効)" } else { "" }
            );
            let identifier = Identifier::from_config(catalog, detector, &config);
            let options = IdentifyOptions {
                batch_size: batch_size.unwrap_or(config.default_batch_size),
                cache_folder: use_cache.then_some(folder.as_path()),
                progress: true,
            };
            let records = identifier.identify_images(&images, options).await?;

            let matched = records.iter().filter(|r| r.is_matched()).count();
            let failed = records.iter().filter(|r| r.error.is_some()).count();
            println!("✔ 照合完了: 一致 {} / 該当なし {} / 失敗 {}\n", matched, records.len() - matched - failed, failed);

            // 4. 結果保存
            println!("[4/4] 結果を保存中...");
            let output = output.unwrap_or_else(|| folder.join("result.json"));
            export::write_json(&records, &output)?;
            println!("✔ 結果を保存: {}", output.display());

            if excel {
                let excel_path = output.with_extension("xlsx");
                export::excel::generate_excel(&records, &excel_path, "錠剤識別結果")?;
                println!("✔ Excel出力: {}", excel_path.display());
            }

            println!("\n✅ 識別完了");
        }

        Commands::Score { detections, explain } => {
            let catalog = load_catalog(cli.catalog, &config)?;
            let content = std::fs::read_to_string(&detections)?;
            let raw: RawDetections = pill_ai_common::parse_detections(&content)?;

            let engine = pill_ai_common::ScoringEngine::new(catalog, config.weights);
            let observation = config.thresholds.apply(&raw);
            let (result, outcome) = pill_ai_common::explain(&engine, &observation)?;

            if explain {
                println!("スコア内訳:");
                for (i, (entry, b)) in engine.catalog().entries().iter().zip(&outcome.breakdowns).enumerate() {
                    let marker = if i == outcome.best_index { "*" } else { " " };
                    println!(
                        "{} {:<24} 形状 {:+.3}  色 {:+.3}  刻印 {:+.3}  合計 {:+.3}",
                        marker, entry.name, b.shape_score, b.color_score, b.letter_score, b.total_score
                    );
                }
                println!();
            }

            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Catalog { path } => {
            let catalog = load_catalog(path.or(cli.catalog), &config)?;
            println!("カタログ: {}件", catalog.len());
            for entry in catalog.entries() {
                let imprint: Vec<&str> = entry.imprint_set.iter().map(String::as_str).collect();
                println!("  {} | {} | {} | {}", entry.name, entry.shape, entry.color, imprint.join(","));
            }
            println!("形状: {}", catalog.shapes().join(", "));
        }

        Commands::Export { input, format, output, title } => {
            println!("📄 pill-ai - エクスポート\n");

            let records = export::read_json(&input)?;
            let output = output.unwrap_or_else(|| {
                input.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
            });

            export::export_results(&records, &format, &output, &title)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Config { set_catalog, set_detector, show } => {
            let mut config = config;

            if let Some(path) = set_catalog {
                config.set_catalog(path)?;
                println!("✔ カタログを設定しました");
            }

            if let Some(command) = set_detector {
                config.set_detector(&command)?;
                println!("✔ 検出器を設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!(
                    "  検出器: {}",
                    if config.detector_command.is_empty() {
                        "サイドカーファイル (*.detections.json)".to_string()
                    } else {
                        config.detector_command.join(" ")
                    }
                );
                println!("  タイムアウト: {}秒", config.detector_timeout_seconds);
                println!("  バッチサイズ: {}", config.default_batch_size);
                println!(
                    "  閾値: 形状 {} / 刻印 {} / 色 {}",
                    config.thresholds.shape, config.thresholds.letter, config.thresholds.color
                );
                println!(
                    "  重み: 形状 {}/{} 色 {}/{} 刻印 {}",
                    config.weights.shape_match,
                    config.weights.shape_mismatch,
                    config.weights.color_match,
                    config.weights.color_mismatch,
                    config.weights.letter_max
                );
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = detector::CacheFile::cache_path(&target);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = detector::CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match detector::CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
