//! pill-ai-rust
//!
//! 錠剤画像 → 特徴検出 → カタログ照合 → 結果出力 のCLIライブラリ。
//! 照合ロジックそのものは `pill_ai_common` にある。

pub mod catalog_loader;
pub mod catalog_selector;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod export;
pub mod identify;
pub mod scanner;
