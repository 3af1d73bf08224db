//! Wire Sequence Common Library
//!
//! 抽出側と照合側で共有される型・色モデル・照合ロジック（画像処理を含まない）

pub mod color;
pub mod compare;
pub mod error;
pub mod parser;
pub mod report;
pub mod types;

pub use color::ColorMetric;
pub use compare::{compare_ends, compare_sequences, EndComparison, Tolerance};
pub use error::{Error, Result};
pub use parser::{parse_sequences, parse_sequences_str};
pub use report::{describe, summarize, SUCCESS_DETAILS};
pub use types::{
    ColorSample, ComparisonOutcome, Confidence, Discrepancy, DiscrepancyKind, EndLabel,
    EndSummary, Sequence, SequenceSet, WireType,
};
