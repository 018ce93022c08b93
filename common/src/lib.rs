//! Pill AI Common Library
//!
//! 錠剤識別の共有型・参照カタログ・スコアリングエンジン

pub mod types;
pub mod catalog;
pub mod detection;
pub mod scoring;
pub mod assembler;
pub mod error;
pub mod parser;
pub mod export;

pub use types::{ColorCandidate, IdentificationResult, Observation, SHAPE_NOT_DETECTED, UNKNOWN_PRODUCT};
pub use catalog::{split_imprint, Catalog, CatalogEntry};
pub use detection::{Detection, DetectionThresholds, RawDetections};
pub use scoring::{score_entry, select_best, MatchFlags, ScoreBreakdown, ScoringEngine, ScoringOutcome, ScoringWeights};
pub use assembler::{assemble, explain, identify, trace_breakdowns};
pub use error::{Error, Result};
pub use parser::{extract_json, parse_detections};
