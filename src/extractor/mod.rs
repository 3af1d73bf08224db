//! 色順序抽出
//!
//! ## 処理フロー
//! 1. 行帯の決定（画像中央付近の横長の帯）
//! 2. 列ごとの平均色から色の切れ目を検出し、領域に分割
//! 3. 背景色を推定し、束の左右の範囲を決める
//! 4. 領域ごとに左右マージンを除いて平均色を取る
//! 5. 左→右の順でSequenceにする
//!
//! 並び順は常に画像のx軸昇順。

pub mod backdrop;
pub mod band;
pub mod sample;
pub mod segment;

pub use segment::WireRegion;

use crate::config::ExtractionParams;
use crate::decoder;
use crate::error::{Result, WireSeqError};
use image::RgbImage;
use std::fmt;
use tracing::{debug, warn};
use wire_sequence_common::{Confidence, EndLabel, Sequence, SequenceSet, WireType};

/// 抽出時の注意事項
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionWarning {
    /// マージンを取れない細い領域があった
    NarrowRegion { position: usize },
    /// 境界ノイズが多い
    NoisyBoundaries { slivers: usize, wires: usize },
    /// 束の内側に背景色が見えた（背景と同色のワイヤーかもしれない）
    BackdropGap { position: usize },
    /// 検出本数が期待本数と違う
    CountMismatch { expected: usize, detected: usize },
}

impl ExtractionWarning {
    /// 信頼度を下げる注意事項か
    pub fn degrades_confidence(&self) -> bool {
        !matches!(self, ExtractionWarning::CountMismatch { .. })
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::NarrowRegion { position } => {
                write!(f, "narrow_region: wire {} too narrow for border margin", position)
            }
            ExtractionWarning::NoisyBoundaries { slivers, wires } => write!(
                f,
                "noisy_boundaries: {} sliver(s) for {} wire(s)",
                slivers, wires
            ),
            ExtractionWarning::BackdropGap { position } => write!(
                f,
                "backdrop_gap: backdrop color seen before wire {}",
                position
            ),
            ExtractionWarning::CountMismatch { expected, detected } => write!(
                f,
                "count_mismatch: expected {} wire(s), detected {}",
                expected, detected
            ),
        }
    }
}

/// 1端面の抽出結果
#[derive(Debug, Clone, PartialEq)]
pub struct EndExtraction {
    pub end: EndLabel,
    pub sequence: Sequence,
    pub confidence: Confidence,
    pub warnings: Vec<ExtractionWarning>,
    /// sequenceと同じ順の列範囲
    pub regions: Vec<WireRegion>,
}

/// 抽出結果（端面順）
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub wire_type: WireType,
    pub ends: Vec<EndExtraction>,
}

impl Extraction {
    pub fn sequences(&self) -> Vec<Sequence> {
        self.ends.iter().map(|e| e.sequence.clone()).collect()
    }

    pub fn sequence_set(&self) -> Result<SequenceSet> {
        Ok(SequenceSet::from_ends(self.wire_type, self.sequences())?)
    }

    pub fn confidence(&self) -> Confidence {
        self.ends
            .iter()
            .fold(Confidence::High, |acc, e| acc.combine(e.confidence))
    }

    /// `"front: ..."` 形式の注意事項一覧
    pub fn warning_messages(&self) -> Vec<String> {
        self.ends
            .iter()
            .flat_map(|e| e.warnings.iter().map(move |w| format!("{}: {}", e.end, w)))
            .collect()
    }
}

/// 1枚の画像から色順序を抽出
pub fn extract_end(
    image: &RgbImage,
    end: EndLabel,
    expected: Option<usize>,
    params: &ExtractionParams,
) -> Result<EndExtraction> {
    if image.width() == 0 || image.height() == 0 {
        return Err(WireSeqError::Decode(format!("{} image has no pixels", end)));
    }

    let band = band::locate(image.height(), params);
    let profile = band::column_profile(image, band);
    let segmentation = segment::segment(&profile, params);

    debug!(
        %end,
        width = image.width(),
        band_top = band.top,
        band_bottom = band.bottom,
        edges = segmentation.edge_columns,
        wires = segmentation.wires.len(),
        slivers = segmentation.slivers,
        background = segmentation.background,
        gaps = segmentation.gaps.len(),
        backdrop = ?segmentation.backdrop,
        "segmented wire band"
    );

    if segmentation.wires.is_empty() {
        return Err(WireSeqError::NoWireDetected { end });
    }

    let mut warnings = Vec::new();

    if segmentation.is_noisy(params) {
        if params.reject_ambiguous {
            return Err(WireSeqError::AmbiguousSegmentation {
                end,
                slivers: segmentation.slivers,
                wires: segmentation.wires.len(),
            });
        }
        warnings.push(ExtractionWarning::NoisyBoundaries {
            slivers: segmentation.slivers,
            wires: segmentation.wires.len(),
        });
    }

    warnings.extend(
        segmentation
            .gaps
            .iter()
            .map(|&position| ExtractionWarning::BackdropGap { position }),
    );

    let mut sequence = Sequence::new();
    for (position, region) in segmentation.wires.iter().enumerate() {
        let sampled = sample::sample_region(image, band, *region, params.border_margin);
        if sampled.narrow {
            warnings.push(ExtractionWarning::NarrowRegion { position });
        }
        sequence.push(sampled.color);
    }

    if let Some(expected) = expected {
        if expected != sequence.len() {
            warn!(%end, expected, detected = sequence.len(), "wire count differs from expected");
            warnings.push(ExtractionWarning::CountMismatch {
                expected,
                detected: sequence.len(),
            });
        }
    }

    let confidence = if warnings.iter().any(ExtractionWarning::degrades_confidence) {
        warn!(%end, warnings = warnings.len(), "low confidence extraction");
        Confidence::Low
    } else {
        Confidence::High
    };

    Ok(EndExtraction {
        end,
        sequence,
        confidence,
        warnings,
        regions: segmentation.wires,
    })
}

/// デコード済み画像（front, back の順）から抽出
pub fn extract(
    images: &[RgbImage],
    wire_type: WireType,
    expected: Option<&[usize]>,
    params: &ExtractionParams,
) -> Result<Extraction> {
    check_image_count(images.len(), wire_type)?;
    check_expected(expected, wire_type)?;

    let ends = wire_type
        .ends()
        .iter()
        .zip(images)
        .enumerate()
        .map(|(index, (&end, image))| {
            let expected_count = expected.map(|counts| counts[index]);
            extract_end(image, end, expected_count, params)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Extraction { wire_type, ends })
}

/// Base64画像から抽出（枚数はデコード前に検証）
pub fn extract_encoded(
    encoded: &[String],
    wire_type: WireType,
    expected: Option<&[usize]>,
    params: &ExtractionParams,
) -> Result<Extraction> {
    check_image_count(encoded.len(), wire_type)?;

    let images = encoded
        .iter()
        .map(|e| decoder::decode_image(e))
        .collect::<Result<Vec<_>>>()?;

    extract(&images, wire_type, expected, params)
}

fn check_image_count(count: usize, wire_type: WireType) -> Result<()> {
    if count != wire_type.end_count() {
        return Err(WireSeqError::InvalidInput(format!(
            "{} wire expects {} image(s), got {}",
            wire_type,
            wire_type.end_count(),
            count
        )));
    }
    Ok(())
}

fn check_expected(expected: Option<&[usize]>, wire_type: WireType) -> Result<()> {
    match expected {
        Some(counts) if counts.len() != wire_type.end_count() => {
            Err(WireSeqError::InvalidInput(format!(
                "{} wire expects {} wire count(s), got {}",
                wire_type,
                wire_type.end_count(),
                counts.len()
            )))
        }
        _ => Ok(()),
    }
}
