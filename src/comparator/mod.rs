//! 基準シーケンスとの照合
//!
//! 基準の検証 → 撮影画像の抽出（基準の本数を期待値にする） → 端面ごとの照合。

use crate::config::Config;
use crate::error::{Result, WireSeqError};
use crate::extractor::{self, Extraction};
use image::RgbImage;
use serde_json::Value;
use tracing::info;
use wire_sequence_common::{
    compare_ends, parse_sequences, summarize, ComparisonOutcome, Confidence, Sequence, WireType,
};

/// 照合結果と説明文
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub wire_type: WireType,
    pub outcome: ComparisonOutcome,
    pub details: String,
    /// 画像から照合した場合の抽出結果
    pub extraction: Option<Extraction>,
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        self.outcome.is_match
    }

    pub fn confidence(&self) -> Confidence {
        self.extraction
            .as_ref()
            .map(Extraction::confidence)
            .unwrap_or_default()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.extraction
            .as_ref()
            .map(Extraction::warning_messages)
            .unwrap_or_default()
    }
}

/// 保存済み基準を読み込み、宣言本数と照らし合わせる
pub fn load_reference(
    value: &Value,
    wire_type: WireType,
    wire_counts: &[usize],
) -> Result<Vec<Sequence>> {
    if wire_counts.len() != wire_type.end_count() {
        return Err(WireSeqError::InvalidInput(format!(
            "{} wire expects {} wire count(s), got {}",
            wire_type,
            wire_type.end_count(),
            wire_counts.len()
        )));
    }

    let reference = parse_sequences(value, wire_type)
        .map_err(|e| WireSeqError::InvalidReference(e.to_string()))?;

    for ((end, sequence), &count) in wire_type.ends().iter().zip(&reference).zip(wire_counts) {
        if sequence.len() != count {
            return Err(WireSeqError::InvalidReference(format!(
                "{} end has {} wire(s) but {} declared",
                end,
                sequence.len(),
                count
            )));
        }
    }

    Ok(reference)
}

/// 既に抽出済みのシーケンスと照合
pub fn compare_with_sequences(
    reference: &[Sequence],
    observed: &[Sequence],
    wire_type: WireType,
    config: &Config,
) -> Result<Verdict> {
    check_end_count(reference.len(), wire_type, "reference")?;
    check_end_count(observed.len(), wire_type, "observed")?;

    let outcome = compare_ends(
        wire_type.ends(),
        reference,
        observed,
        &config.comparison.tolerance(),
    );
    let details = summarize(&outcome, wire_type);

    info!(
        %wire_type,
        matched = outcome.is_match,
        discrepancies = outcome.discrepancies.len(),
        "compared wire sequence"
    );

    Ok(Verdict {
        wire_type,
        outcome,
        details,
        extraction: None,
    })
}

/// 撮影画像（front, back の順）から抽出して照合
///
/// 抽出に失敗した場合は照合結果を出さずにエラーを返す。
pub fn compare_with_images(
    reference: &[Sequence],
    images: &[RgbImage],
    wire_type: WireType,
    config: &Config,
) -> Result<Verdict> {
    let expected: Vec<usize> = reference.iter().map(Sequence::len).collect();
    let extraction = extractor::extract(images, wire_type, Some(&expected), &config.extraction)?;
    with_extraction(reference, extraction, config)
}

/// Base64画像から抽出して照合
pub fn compare_with_encoded(
    reference: &[Sequence],
    encoded: &[String],
    wire_type: WireType,
    config: &Config,
) -> Result<Verdict> {
    let expected: Vec<usize> = reference.iter().map(Sequence::len).collect();
    let extraction =
        extractor::extract_encoded(encoded, wire_type, Some(&expected), &config.extraction)?;
    with_extraction(reference, extraction, config)
}

fn with_extraction(reference: &[Sequence], extraction: Extraction, config: &Config) -> Result<Verdict> {
    let observed = extraction.sequences();
    let mut verdict = compare_with_sequences(reference, &observed, extraction.wire_type, config)?;
    verdict.extraction = Some(extraction);
    Ok(verdict)
}

fn check_end_count(count: usize, wire_type: WireType, side: &str) -> Result<()> {
    if count != wire_type.end_count() {
        return Err(WireSeqError::InvalidInput(format!(
            "{} wire expects {} {} sequence(s), got {}",
            wire_type,
            wire_type.end_count(),
            side,
            count
        )));
    }
    Ok(())
}
