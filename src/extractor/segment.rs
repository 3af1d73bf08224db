//! 列プロファイルの色境界検出と領域分割
//!
//! 列xとx-edge_spanの平均色距離が閾値を超えたら切れ目列。切れ目でない列の
//! 連続区間のうち、細すぎる区間（境界ノイズ）を除いたものが候補領域。
//! 候補領域から背景色のものを除いた残りがワイヤー（[`super::backdrop`]）。

use super::backdrop;
use crate::config::ExtractionParams;
use wire_sequence_common::color::channel_distance;

/// ワイヤー1本の列範囲（両端含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireRegion {
    pub start: u32,
    pub end: u32,
}

impl WireRegion {
    pub fn width(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// 候補領域とその平均色
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub region: WireRegion,
    pub color: [f32; 3],
}

/// 分割結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// 左→右
    pub wires: Vec<WireRegion>,
    /// 細すぎて捨てた区間数
    pub slivers: usize,
    /// 背景として捨てた区間数（束の外側と隙間）
    pub background: usize,
    /// 束の内側に背景色が見えた位置（直後のワイヤーの番号）
    pub gaps: Vec<usize>,
    /// 切れ目列の数
    pub edge_columns: usize,
    /// 推定した背景色
    pub backdrop: Option<[f32; 3]>,
}

impl Segmentation {
    /// ノイズがワイヤー数に対して多すぎるか
    pub fn is_noisy(&self, params: &ExtractionParams) -> bool {
        self.slivers as f32 > params.max_slivers_per_wire * self.wires.len() as f32
    }
}

/// 切れ目列の判定
pub fn edge_columns(profile: &[[f32; 3]], params: &ExtractionParams) -> Vec<bool> {
    let span = params.edge_span.max(1) as usize;

    (0..profile.len())
        .map(|x| {
            let previous = profile[x.saturating_sub(span)];
            channel_distance(previous, profile[x]) > params.boundary_threshold
        })
        .collect()
}

/// 切れ目で区切った候補領域（左→右）と、捨てた細い区間の数
pub fn candidates(profile: &[[f32; 3]], edges: &[bool], params: &ExtractionParams) -> (Vec<Candidate>, usize) {
    let mut found = Vec::new();
    let mut slivers = 0;

    let mut run_start: Option<usize> = None;
    for x in 0..=edges.len() {
        let is_edge = edges.get(x).copied().unwrap_or(true);
        match (run_start, is_edge) {
            (None, false) => run_start = Some(x),
            (Some(start), true) => {
                match candidate(profile, start, x - 1, params) {
                    Some(c) => found.push(c),
                    None => slivers += 1,
                }
                run_start = None;
            }
            _ => {}
        }
    }

    (found, slivers)
}

/// プロファイルをワイヤー領域に分割
pub fn segment(profile: &[[f32; 3]], params: &ExtractionParams) -> Segmentation {
    let edges = edge_columns(profile, params);
    let (candidates, slivers) = candidates(profile, &edges, params);

    let estimated = backdrop::estimate(&candidates, params);
    let bundle = backdrop::isolate(&candidates, estimated, params);

    Segmentation {
        wires: bundle.wires,
        slivers,
        background: bundle.background,
        gaps: bundle.gaps,
        edge_columns: edges.iter().filter(|&&e| e).count(),
        backdrop: estimated,
    }
}

fn candidate(
    profile: &[[f32; 3]],
    start: usize,
    end: usize,
    params: &ExtractionParams,
) -> Option<Candidate> {
    let width = end - start + 1;
    if width < params.min_region_width as usize {
        return None;
    }

    let mut mean = [0f32; 3];
    for column in &profile[start..=end] {
        mean[0] += column[0];
        mean[1] += column[1];
        mean[2] += column[2];
    }
    let n = width as f32;

    Some(Candidate {
        region: WireRegion {
            start: start as u32,
            end: end as u32,
        },
        color: [mean[0] / n, mean[1] / n, mean[2] / n],
    })
}
