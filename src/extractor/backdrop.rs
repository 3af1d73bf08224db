//! 背景色の推定と束の範囲
//!
//! 束は撮影範囲の一部にしか写らないので、左右両端の候補領域が同じ色なら
//! それを背景とみなし、背景色の領域を外側から削って束の範囲を決める。

use super::segment::{Candidate, WireRegion};
use crate::config::ExtractionParams;
use wire_sequence_common::color::{brightness, channel_distance};

/// 背景を除いた束
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub wires: Vec<WireRegion>,
    pub background: usize,
    pub gaps: Vec<usize>,
}

/// 背景色を推定する
///
/// - 設定 `backdrop` があればそれを使う
/// - 候補領域が1つだけ（一様な画像）なら、暗いときだけ背景（ワイヤー無し）
/// - 2つ以上なら、左端と右端の色が `boundary_threshold` 以内で揃っているときその平均
///
/// 左右の端が違う色なら束が画面いっぱいに写っているとみなし、背景なし。
pub fn estimate(candidates: &[Candidate], params: &ExtractionParams) -> Option<[f32; 3]> {
    if let Some(color) = params.backdrop {
        return Some(color.map(f32::from));
    }

    match candidates {
        [] => None,
        [only] => (brightness(only.color) < params.background_value as f32).then_some(only.color),
        [first, .., last] => (channel_distance(first.color, last.color) <= params.boundary_threshold)
            .then(|| {
                [
                    (first.color[0] + last.color[0]) / 2.0,
                    (first.color[1] + last.color[1]) / 2.0,
                    (first.color[2] + last.color[2]) / 2.0,
                ]
            }),
    }
}

/// 背景色の領域を除いてワイヤーを残す
///
/// 外側の背景は束の外。束の内側に背景色が見えた箇所は隙間として記録する。
pub fn isolate(
    candidates: &[Candidate],
    backdrop: Option<[f32; 3]>,
    params: &ExtractionParams,
) -> Bundle {
    let is_backdrop = |c: &Candidate| {
        backdrop.is_some_and(|b| channel_distance(b, c.color) <= params.boundary_threshold)
    };

    let first = candidates.iter().position(|c| !is_backdrop(c));
    let last = candidates.iter().rposition(|c| !is_backdrop(c));
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Bundle {
                background: candidates.len(),
                ..Default::default()
            }
        }
    };

    let mut bundle = Bundle {
        background: first + (candidates.len() - 1 - last),
        ..Default::default()
    };
    for candidate in &candidates[first..=last] {
        if is_backdrop(candidate) {
            bundle.background += 1;
            bundle.gaps.push(bundle.wires.len());
        } else {
            bundle.wires.push(candidate.region);
        }
    }

    bundle
}
