//! 照合結果の説明文
//!
//! 検査画面にそのまま表示される文字列を組み立てる。

use crate::types::{ComparisonOutcome, Discrepancy, DiscrepancyKind, WireType};

/// 一致時の表示
pub const SUCCESS_DETAILS: &str = "SUCCESSFUL";

/// 照合結果を1行1件の説明文にする
///
/// 両端ワイヤーでは各行に `FRONT:` / `BACK:` を付ける。
pub fn summarize(outcome: &ComparisonOutcome, wire_type: WireType) -> String {
    if outcome.is_match {
        return SUCCESS_DETAILS.to_string();
    }

    outcome
        .discrepancies
        .iter()
        .map(|d| describe(d, wire_type))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 不一致1件の説明
pub fn describe(discrepancy: &Discrepancy, wire_type: WireType) -> String {
    let head = prefix(discrepancy.end.to_string(), wire_type);
    let position = discrepancy.position;

    match discrepancy.kind {
        DiscrepancyKind::ColorMismatch => {
            let mut line = format!("{}WIRE MISMATCH AT POSITION {}", head, position);
            if let (Some(expected), Some(observed)) = (discrepancy.expected, discrepancy.observed) {
                line.push_str(&format!(" (expected {}, observed {}", expected, observed));
                if let Some(distance) = discrepancy.distance {
                    line.push_str(&format!(", distance {:.1}", distance));
                }
                line.push(')');
            }
            line
        }
        DiscrepancyKind::Missing => match discrepancy.expected {
            Some(expected) => format!(
                "{}MISSING WIRE AT POSITION {} (expected {})",
                head, position, expected
            ),
            None => format!("{}MISSING WIRE AT POSITION {}", head, position),
        },
        DiscrepancyKind::Extra => match discrepancy.observed {
            Some(observed) => format!(
                "{}UNEXPECTED EXTRA WIRE AT POSITION {} (observed {})",
                head, position, observed
            ),
            None => format!("{}UNEXPECTED EXTRA WIRE AT POSITION {}", head, position),
        },
    }
}

fn prefix(end: String, wire_type: WireType) -> String {
    match wire_type {
        WireType::Single => String::new(),
        WireType::Double => format!("{}: ", end.to_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorSample, EndLabel, EndSummary};

    fn outcome(discrepancies: Vec<Discrepancy>) -> ComparisonOutcome {
        ComparisonOutcome {
            is_match: discrepancies.is_empty(),
            discrepancies,
            ends: vec![EndSummary {
                end: EndLabel::Front,
                expected_wires: 3,
                observed_wires: 2,
                is_match: false,
            }],
        }
    }

    #[test]
    fn test_summarize_match() {
        let result = ComparisonOutcome {
            is_match: true,
            discrepancies: vec![],
            ends: vec![],
        };
        assert_eq!(summarize(&result, WireType::Single), "SUCCESSFUL");
    }

    #[test]
    fn test_describe_missing_single() {
        let result = outcome(vec![Discrepancy {
            end: EndLabel::Front,
            position: 1,
            kind: DiscrepancyKind::Missing,
            expected: Some(ColorSample::new(0, 255, 0)),
            observed: None,
            distance: None,
        }]);
        assert_eq!(
            summarize(&result, WireType::Single),
            "MISSING WIRE AT POSITION 1 (expected [0, 255, 0])"
        );
    }

    #[test]
    fn test_describe_mismatch_double_has_prefix() {
        let d = Discrepancy {
            end: EndLabel::Back,
            position: 0,
            kind: DiscrepancyKind::ColorMismatch,
            expected: Some(ColorSample::new(255, 0, 0)),
            observed: Some(ColorSample::new(0, 0, 255)),
            distance: Some(360.62),
        };
        let line = describe(&d, WireType::Double);
        assert!(line.starts_with("BACK: WIRE MISMATCH AT POSITION 0"));
        assert!(line.contains("distance 360.6"));
    }

    #[test]
    fn test_describe_extra() {
        let d = Discrepancy {
            end: EndLabel::Front,
            position: 3,
            kind: DiscrepancyKind::Extra,
            expected: None,
            observed: Some(ColorSample::new(1, 2, 3)),
            distance: None,
        };
        assert_eq!(
            describe(&d, WireType::Single),
            "UNEXPECTED EXTRA WIRE AT POSITION 3 (observed [1, 2, 3])"
        );
    }

    #[test]
    fn test_summarize_joins_lines() {
        let missing = Discrepancy {
            end: EndLabel::Front,
            position: 2,
            kind: DiscrepancyKind::Missing,
            expected: None,
            observed: None,
            distance: None,
        };
        let result = outcome(vec![missing.clone(), missing]);
        assert_eq!(summarize(&result, WireType::Single).lines().count(), 2);
    }
}
