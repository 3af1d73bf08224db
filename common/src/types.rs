//! 色順序の型定義
//!
//! CLIと照合処理で共有される型:
//! - ColorSample: 1本のワイヤーの代表色
//! - Sequence: 1つの端面で検出されたワイヤー色の並び（左→右）
//! - SequenceSet: 抽出結果（片端/両端）
//! - Discrepancy / ComparisonOutcome: 照合結果

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ワイヤー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    /// 片端
    #[serde(alias = "singlewire")]
    Single,
    /// 両端（front/back）
    #[serde(alias = "doublewire")]
    Double,
}

impl WireType {
    /// 端面ラベル（撮影順）
    pub fn ends(&self) -> &'static [EndLabel] {
        match self {
            WireType::Single => &[EndLabel::Front],
            WireType::Double => &[EndLabel::Front, EndLabel::Back],
        }
    }

    /// 必要な画像枚数
    pub fn end_count(&self) -> usize {
        self.ends().len()
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Single => write!(f, "single"),
            WireType::Double => write!(f, "double"),
        }
    }
}

impl FromStr for WireType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "singlewire" => Ok(WireType::Single),
            "double" | "doublewire" => Ok(WireType::Double),
            _ => Err(format!("Unknown wire type: {}. Use single or double", s)),
        }
    }
}

/// 端面ラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndLabel {
    Front,
    Back,
}

impl fmt::Display for EndLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndLabel::Front => write!(f, "front"),
            EndLabel::Back => write!(f, "back"),
        }
    }
}

/// 1本のワイヤーの代表色 `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSample(pub [u8; 3]);

impl ColorSample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

impl From<[u8; 3]> for ColorSample {
    fn from(rgb: [u8; 3]) -> Self {
        Self(rgb)
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0[0], self.0[1], self.0[2])
    }
}

/// ワイヤー色の並び（画像の左→右）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(pub Vec<ColorSample>);

impl Sequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<ColorSample> {
        self.0.get(position).copied()
    }

    pub fn push(&mut self, sample: ColorSample) {
        self.0.push(sample);
    }

    pub fn samples(&self) -> &[ColorSample] {
        &self.0
    }
}

impl From<Vec<ColorSample>> for Sequence {
    fn from(samples: Vec<ColorSample>) -> Self {
        Self(samples)
    }
}

impl From<Vec<[u8; 3]>> for Sequence {
    fn from(samples: Vec<[u8; 3]>) -> Self {
        Self(samples.into_iter().map(ColorSample).collect())
    }
}

impl FromIterator<ColorSample> for Sequence {
    fn from_iter<I: IntoIterator<Item = ColorSample>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 抽出結果（ワイヤー種別ごとの形）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SequenceSet {
    Single {
        sequence: Sequence,
    },
    Double {
        sequence_front: Sequence,
        sequence_back: Sequence,
    },
}

impl SequenceSet {
    /// 端面ごとのSequenceから組み立てる
    pub fn from_ends(wire_type: WireType, ends: Vec<Sequence>) -> Result<Self> {
        let count = ends.len();
        let mut iter = ends.into_iter();
        match (wire_type, iter.next(), iter.next(), iter.next()) {
            (WireType::Single, Some(sequence), None, None) => Ok(SequenceSet::Single { sequence }),
            (WireType::Double, Some(sequence_front), Some(sequence_back), None) => {
                Ok(SequenceSet::Double {
                    sequence_front,
                    sequence_back,
                })
            }
            _ => Err(Error::InvalidShape(format!(
                "{} wire expects {} end sequence(s), got {}",
                wire_type,
                wire_type.end_count(),
                count
            ))),
        }
    }

    pub fn wire_type(&self) -> WireType {
        match self {
            SequenceSet::Single { .. } => WireType::Single,
            SequenceSet::Double { .. } => WireType::Double,
        }
    }

    /// 端面順（front, back）のSequence
    pub fn into_ends(self) -> Vec<Sequence> {
        match self {
            SequenceSet::Single { sequence } => vec![sequence],
            SequenceSet::Double {
                sequence_front,
                sequence_back,
            } => vec![sequence_front, sequence_back],
        }
    }
}

/// 抽出結果の信頼度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    High,
    Low,
}

impl Confidence {
    /// どちらかが低ければ低
    pub fn combine(self, other: Confidence) -> Confidence {
        if self == Confidence::Low || other == Confidence::Low {
            Confidence::Low
        } else {
            Confidence::High
        }
    }
}

/// 不一致の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// 許容差を超える色違い
    ColorMismatch,
    /// 基準にあるワイヤーが撮影側にない
    Missing,
    /// 撮影側に余分なワイヤーがある
    Extra,
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscrepancyKind::ColorMismatch => write!(f, "color_mismatch"),
            DiscrepancyKind::Missing => write!(f, "missing"),
            DiscrepancyKind::Extra => write!(f, "extra"),
        }
    }
}

/// 1箇所の不一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub end: EndLabel,
    /// `missing`/`color_mismatch`は基準側、`extra`は撮影側のインデックス
    pub position: usize,
    pub kind: DiscrepancyKind,
    pub expected: Option<ColorSample>,
    pub observed: Option<ColorSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

/// 端面ごとの照合サマリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndSummary {
    pub end: EndLabel,
    pub expected_wires: usize,
    pub observed_wires: usize,
    #[serde(rename = "match")]
    pub is_match: bool,
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub discrepancies: Vec<Discrepancy>,
    pub ends: Vec<EndSummary>,
}

impl ComparisonOutcome {
    /// 指定端面の不一致
    pub fn discrepancies_for(&self, end: EndLabel) -> impl Iterator<Item = &Discrepancy> {
        self.discrepancies.iter().filter(move |d| d.end == end)
    }
}
