//! シーケンス照合
//!
//! 位置対応は常にインデックス同士。長さが異なる場合だけ、最初に食い違った
//! 位置に不足/余剰をまとめて置き、残りを再びインデックス同士で比較する。
//! 探索（編集距離など）は行わない。

use crate::color::ColorMetric;
use crate::types::{
    ColorSample, ComparisonOutcome, Discrepancy, DiscrepancyKind, EndLabel, EndSummary, Sequence,
};
use serde::{Deserialize, Serialize};

/// 色一致の許容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// この距離以下なら一致（境界を含む）
    pub max_distance: f32,
    pub metric: ColorMetric,
}

impl Tolerance {
    pub fn new(max_distance: f32, metric: ColorMetric) -> Self {
        Self {
            max_distance,
            metric,
        }
    }

    pub fn rgb(max_distance: f32) -> Self {
        Self::new(max_distance, ColorMetric::Rgb)
    }

    /// 2色が一致するか（距離 <= 許容差）
    pub fn matches(&self, a: ColorSample, b: ColorSample) -> bool {
        self.metric.distance(a, b) <= self.max_distance
    }
}

/// 1端面の照合結果
#[derive(Debug, Clone, PartialEq)]
pub struct EndComparison {
    pub summary: EndSummary,
    pub discrepancies: Vec<Discrepancy>,
}

/// 1端面のシーケンスを照合
pub fn compare_sequences(
    end: EndLabel,
    reference: &Sequence,
    observed: &Sequence,
    tolerance: &Tolerance,
) -> EndComparison {
    let expected_len = reference.len();
    let observed_len = observed.len();
    let mut discrepancies = Vec::new();

    if expected_len == observed_len {
        for position in 0..expected_len {
            check_pair(end, position, position, reference, observed, tolerance, &mut discrepancies);
        }
    } else {
        let shared = expected_len.min(observed_len);
        let anchor = (0..shared)
            .find(|&i| !pair_matches(reference, observed, i, i, tolerance))
            .unwrap_or(shared);
        let gap = expected_len.abs_diff(observed_len);

        if expected_len > observed_len {
            for position in anchor..anchor + gap {
                discrepancies.push(Discrepancy {
                    end,
                    position,
                    kind: DiscrepancyKind::Missing,
                    expected: reference.get(position),
                    observed: None,
                    distance: None,
                });
            }
            for offset in 0..observed_len - anchor {
                check_pair(
                    end,
                    anchor + gap + offset,
                    anchor + offset,
                    reference,
                    observed,
                    tolerance,
                    &mut discrepancies,
                );
            }
        } else {
            for position in anchor..anchor + gap {
                discrepancies.push(Discrepancy {
                    end,
                    position,
                    kind: DiscrepancyKind::Extra,
                    expected: None,
                    observed: observed.get(position),
                    distance: None,
                });
            }
            for offset in 0..expected_len - anchor {
                check_pair(
                    end,
                    anchor + offset,
                    anchor + gap + offset,
                    reference,
                    observed,
                    tolerance,
                    &mut discrepancies,
                );
            }
        }
    }

    EndComparison {
        summary: EndSummary {
            end,
            expected_wires: expected_len,
            observed_wires: observed_len,
            is_match: expected_len == observed_len && discrepancies.is_empty(),
        },
        discrepancies,
    }
}

/// 端面ごとに照合して結果をまとめる
///
/// 全端面が一致した場合のみ一致。`ends`・`reference`・`observed` は同じ順序。
pub fn compare_ends(
    ends: &[EndLabel],
    reference: &[Sequence],
    observed: &[Sequence],
    tolerance: &Tolerance,
) -> ComparisonOutcome {
    let empty = Sequence::new();
    let mut summaries = Vec::with_capacity(ends.len());
    let mut discrepancies = Vec::new();

    for (index, &end) in ends.iter().enumerate() {
        let expected = reference.get(index).unwrap_or(&empty);
        let actual = observed.get(index).unwrap_or(&empty);
        let result = compare_sequences(end, expected, actual, tolerance);
        summaries.push(result.summary);
        discrepancies.extend(result.discrepancies);
    }

    ComparisonOutcome {
        is_match: summaries.iter().all(|s| s.is_match),
        discrepancies,
        ends: summaries,
    }
}

fn pair_matches(
    reference: &Sequence,
    observed: &Sequence,
    reference_index: usize,
    observed_index: usize,
    tolerance: &Tolerance,
) -> bool {
    match (reference.get(reference_index), observed.get(observed_index)) {
        (Some(expected), Some(actual)) => tolerance.matches(expected, actual),
        _ => false,
    }
}

fn check_pair(
    end: EndLabel,
    reference_index: usize,
    observed_index: usize,
    reference: &Sequence,
    observed: &Sequence,
    tolerance: &Tolerance,
    discrepancies: &mut Vec<Discrepancy>,
) {
    if let (Some(expected), Some(actual)) =
        (reference.get(reference_index), observed.get(observed_index))
    {
        let distance = tolerance.metric.distance(expected, actual);
        if distance > tolerance.max_distance {
            discrepancies.push(Discrepancy {
                end,
                position: reference_index,
                kind: DiscrepancyKind::ColorMismatch,
                expected: Some(expected),
                observed: Some(actual),
                distance: Some(distance),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];
    const GREEN: [u8; 3] = [0, 255, 0];
    const BLUE: [u8; 3] = [0, 0, 255];
    const YELLOW: [u8; 3] = [255, 255, 0];

    fn seq(values: &[[u8; 3]]) -> Sequence {
        Sequence::from(values.to_vec())
    }

    fn tol() -> Tolerance {
        Tolerance::rgb(30.0)
    }

    #[test]
    fn test_identical_sequences_match() {
        let reference = seq(&[RED, GREEN, BLUE]);
        let result = compare_sequences(EndLabel::Front, &reference, &reference.clone(), &tol());
        assert!(result.summary.is_match);
        assert!(result.discrepancies.is_empty());
    }

    #[test]
    fn test_middle_wire_missing() {
        let result = compare_sequences(
            EndLabel::Front,
            &seq(&[RED, GREEN, BLUE]),
            &seq(&[RED, BLUE]),
            &tol(),
        );
        assert!(!result.summary.is_match);
        assert_eq!(result.discrepancies.len(), 1);
        let d = &result.discrepancies[0];
        assert_eq!(d.kind, DiscrepancyKind::Missing);
        assert_eq!(d.position, 1);
        assert_eq!(d.expected, Some(ColorSample(GREEN)));
        assert_eq!(d.observed, None);
    }

    #[test]
    fn test_last_wire_missing() {
        let result = compare_sequences(
            EndLabel::Front,
            &seq(&[RED, GREEN, BLUE]),
            &seq(&[RED, GREEN]),
            &tol(),
        );
        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(result.discrepancies[0].position, 2);
        assert_eq!(result.discrepancies[0].kind, DiscrepancyKind::Missing);
    }

    #[test]
    fn test_extra_wire_inserted() {
        let result = compare_sequences(
            EndLabel::Front,
            &seq(&[RED, BLUE]),
            &seq(&[RED, YELLOW, BLUE]),
            &tol(),
        );
        assert_eq!(result.discrepancies.len(), 1);
        let d = &result.discrepancies[0];
        assert_eq!(d.kind, DiscrepancyKind::Extra);
        assert_eq!(d.position, 1);
        assert_eq!(d.expected, None);
        assert_eq!(d.observed, Some(ColorSample(YELLOW)));
    }

    #[test]
    fn test_missing_then_tail_mismatch() {
        let result = compare_sequences(
            EndLabel::Front,
            &seq(&[RED, GREEN, BLUE, YELLOW]),
            &seq(&[RED, BLUE, GREEN]),
            &tol(),
        );
        let kinds: Vec<_> = result.discrepancies.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiscrepancyKind::Missing, DiscrepancyKind::ColorMismatch]);
        assert_eq!(result.discrepancies[1].position, 3);
    }

    #[test]
    fn test_equal_length_shift_cascades() {
        // 1本抜けて末尾に別のワイヤーが来ると、以降は全て色違いになる
        let result = compare_sequences(
            EndLabel::Front,
            &seq(&[RED, GREEN, BLUE, YELLOW]),
            &seq(&[RED, BLUE, YELLOW, GREEN]),
            &tol(),
        );
        assert_eq!(result.discrepancies.len(), 3);
        assert!(result
            .discrepancies
            .iter()
            .all(|d| d.kind == DiscrepancyKind::ColorMismatch));
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let tolerance = Tolerance::rgb(30.0);
        let base = ColorSample::new(100, 100, 100);
        assert!(tolerance.matches(base, ColorSample::new(130, 100, 100)));
        assert!(!tolerance.matches(base, ColorSample::new(131, 100, 100)));
    }

    #[test]
    fn test_tolerance_half_and_double() {
        let tolerance = Tolerance::rgb(40.0);
        let base = ColorSample::new(50, 50, 50);
        assert!(tolerance.matches(base, ColorSample::new(70, 50, 50)));
        assert!(!tolerance.matches(base, ColorSample::new(130, 50, 50)));
    }

    #[test]
    fn test_lighting_variance_within_tolerance() {
        let result = compare_sequences(
            EndLabel::Front,
            &seq(&[RED, GREEN]),
            &seq(&[RED, [10, 250, 5]]),
            &Tolerance::rgb(13.0),
        );
        assert!(result.summary.is_match);
    }

    #[test]
    fn test_color_mismatch_symmetry() {
        let a = seq(&[RED, GREEN, BLUE]);
        let b = seq(&[RED, YELLOW, [0, 0, 200]]);
        let ab = compare_sequences(EndLabel::Front, &a, &b, &tol());
        let ba = compare_sequences(EndLabel::Front, &b, &a, &tol());
        assert_eq!(ab.discrepancies.len(), ba.discrepancies.len());
        assert_eq!(ab.discrepancies.len(), 2);
    }

    #[test]
    fn test_compare_ends_back_only() {
        let reference = vec![seq(&[RED, GREEN]), seq(&[BLUE, YELLOW])];
        let observed = vec![seq(&[RED, GREEN]), seq(&[BLUE, RED])];
        let outcome = compare_ends(
            &[EndLabel::Front, EndLabel::Back],
            &reference,
            &observed,
            &tol(),
        );
        assert!(!outcome.is_match);
        assert!(outcome.ends[0].is_match);
        assert!(!outcome.ends[1].is_match);
        assert_eq!(outcome.discrepancies.len(), 1);
        assert!(outcome.discrepancies.iter().all(|d| d.end == EndLabel::Back));
        assert_eq!(outcome.discrepancies_for(EndLabel::Front).count(), 0);
    }

    #[test]
    fn test_cie76_metric() {
        let tolerance = Tolerance::new(5.0, ColorMetric::Cie76);
        assert!(tolerance.matches(ColorSample(RED), ColorSample::new(253, 1, 1)));
        assert!(!tolerance.matches(ColorSample(RED), ColorSample(GREEN)));
    }
}
