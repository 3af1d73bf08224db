//! 保存済みシーケンスのパーサー
//!
//! 受け付ける形（それ以外はエラー）:
//! 1. `[[r,g,b], ...]` 片端
//! 2. `[[[r,g,b], ...], [[r,g,b], ...]]` 端面ごとの配列
//! 3. `["[[r,g,b],...]", ...]` 端面ごとのJSON文字列（アプリの保存形式）
//! 4. 上記いずれかを含むJSON文字列
//! 5. `SequenceSet` オブジェクト（抽出結果をそのまま保存したもの）

use crate::error::{Error, Result};
use crate::types::{ColorSample, Sequence, SequenceSet, WireType};
use serde::Deserialize;
use serde_json::Value;

/// 文字列に包まれたJSONを展開する深さの上限
const MAX_ENCODING_DEPTH: usize = 2;

/// 端面ごとのSequenceを取り出す
///
/// # Arguments
/// * `value` - 保存されていたJSON値
/// * `wire_type` - 期待するワイヤー種別（端面数の検証に使う）
///
/// # Returns
/// * `Ok(Vec<Sequence>)` - front, back の順
/// * `Err(Error::InvalidShape)` - 形が合わない場合
pub fn parse_sequences(value: &Value, wire_type: WireType) -> Result<Vec<Sequence>> {
    let ends = parse_value(value, wire_type, 0)?;

    if ends.len() != wire_type.end_count() {
        return Err(Error::InvalidShape(format!(
            "{} wire expects {} end sequence(s), got {}",
            wire_type,
            wire_type.end_count(),
            ends.len()
        )));
    }

    if let Some(index) = ends.iter().position(Sequence::is_empty) {
        return Err(Error::InvalidShape(format!(
            "{} end sequence is empty",
            wire_type.ends()[index]
        )));
    }

    Ok(ends)
}

/// JSON文字列からパース
pub fn parse_sequences_str(text: &str, wire_type: WireType) -> Result<Vec<Sequence>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::InvalidShape(format!("not valid JSON: {}", e)))?;
    parse_sequences(&value, wire_type)
}

fn parse_value(value: &Value, wire_type: WireType, depth: usize) -> Result<Vec<Sequence>> {
    match value {
        Value::String(text) => {
            if depth >= MAX_ENCODING_DEPTH {
                return Err(Error::InvalidShape("sequence nested in too many strings".into()));
            }
            let inner: Value = serde_json::from_str(text)
                .map_err(|e| Error::InvalidShape(format!("encoded sequence is not JSON: {}", e)))?;
            parse_value(&inner, wire_type, depth + 1)
        }
        Value::Object(_) => {
            let set = SequenceSet::deserialize(value)
                .map_err(|e| Error::InvalidShape(format!("sequence record: {}", e)))?;
            if set.wire_type() != wire_type {
                return Err(Error::InvalidShape(format!(
                    "stored {} wire sequence used as {} wire",
                    set.wire_type(),
                    wire_type
                )));
            }
            Ok(set.into_ends())
        }
        Value::Array(items) if items.is_empty() => {
            Err(Error::InvalidShape("sequence array is empty".into()))
        }
        Value::Array(items) if items.iter().all(Value::is_string) => {
            if depth >= MAX_ENCODING_DEPTH {
                return Err(Error::InvalidShape("sequence nested in too many strings".into()));
            }
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let text = item.as_str().unwrap_or_default();
                    serde_json::from_str::<Vec<ColorSample>>(text)
                        .map(Sequence::from)
                        .map_err(|e| {
                            Error::InvalidShape(format!("encoded end {}: {}", index, e))
                        })
                })
                .collect()
        }
        Value::Array(items) if items.iter().all(is_nested_array) => {
            let ends = Vec::<Vec<ColorSample>>::deserialize(value)
                .map_err(|e| Error::InvalidShape(format!("end sequences: {}", e)))?;
            Ok(ends.into_iter().map(Sequence::from).collect())
        }
        Value::Array(_) => {
            let sequence = Vec::<ColorSample>::deserialize(value)
                .map_err(|e| Error::InvalidShape(format!("sequence: {}", e)))?;
            Ok(vec![Sequence::from(sequence)])
        }
        other => Err(Error::InvalidShape(format!(
            "expected an array, string or object, got {}",
            json_kind(other)
        ))),
    }
}

/// 要素が全て配列の配列（= 端面ごとの配列）
fn is_nested_array(item: &Value) -> bool {
    matches!(item, Value::Array(inner) if inner.iter().all(Value::is_array))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rgb(values: &[[u8; 3]]) -> Sequence {
        Sequence::from(values.to_vec())
    }

    // =============================================
    // 正常系
    // =============================================

    #[test]
    fn test_parse_single_plain_array() {
        let value = json!([[255, 0, 0], [0, 255, 0]]);
        let ends = parse_sequences(&value, WireType::Single).unwrap();
        assert_eq!(ends, vec![rgb(&[[255, 0, 0], [0, 255, 0]])]);
    }

    #[test]
    fn test_parse_double_nested_array() {
        let value = json!([[[255, 0, 0]], [[0, 0, 255], [0, 255, 0]]]);
        let ends = parse_sequences(&value, WireType::Double).unwrap();
        assert_eq!(ends.len(), 2);
        assert_eq!(ends[1].len(), 2);
    }

    #[test]
    fn test_parse_stored_string_per_end() {
        let value = json!(["[[255,0,0],[0,255,0]]", "[[0,0,255]]"]);
        let ends = parse_sequences(&value, WireType::Double).unwrap();
        assert_eq!(ends[0], rgb(&[[255, 0, 0], [0, 255, 0]]));
        assert_eq!(ends[1], rgb(&[[0, 0, 255]]));
    }

    #[test]
    fn test_parse_whole_reference_as_string() {
        let value = json!("[\"[[1,2,3]]\"]");
        let ends = parse_sequences(&value, WireType::Single).unwrap();
        assert_eq!(ends, vec![rgb(&[[1, 2, 3]])]);
    }

    #[test]
    fn test_parse_sequence_set_record() {
        let value = json!({
            "type": "double",
            "sequence_front": [[1, 2, 3]],
            "sequence_back": [[4, 5, 6]],
            "confidence": "high"
        });
        let ends = parse_sequences(&value, WireType::Double).unwrap();
        assert_eq!(ends[1], rgb(&[[4, 5, 6]]));
    }

    #[test]
    fn test_parse_sequences_str() {
        let ends = parse_sequences_str("[[9, 9, 9]]", WireType::Single).unwrap();
        assert_eq!(ends[0].len(), 1);
    }

    // =============================================
    // 異常系
    // =============================================

    #[test]
    fn test_reject_wrong_end_count() {
        let value = json!([[255, 0, 0]]);
        let err = parse_sequences(&value, WireType::Double).unwrap_err();
        assert!(err.to_string().contains("expects 2"));
    }

    #[test]
    fn test_reject_out_of_range_channel() {
        let value = json!([[300, 0, 0]]);
        assert!(parse_sequences(&value, WireType::Single).is_err());
    }

    #[test]
    fn test_reject_short_triplet() {
        let value = json!([[255, 0]]);
        assert!(parse_sequences(&value, WireType::Single).is_err());
    }

    #[test]
    fn test_reject_empty_sequences() {
        assert!(parse_sequences(&json!([]), WireType::Single).is_err());
        assert!(parse_sequences(&json!([[]]), WireType::Single).is_err());
        assert!(parse_sequences(&json!(["[]", "[[1,2,3]]"]), WireType::Double).is_err());
    }

    #[test]
    fn test_reject_mismatched_record_type() {
        let value = json!({"type": "single", "sequence": [[1, 2, 3]]});
        assert!(parse_sequences(&value, WireType::Double).is_err());
    }

    #[test]
    fn test_reject_scalars_and_garbage_strings() {
        assert!(parse_sequences(&json!(42), WireType::Single).is_err());
        assert!(parse_sequences(&json!(null), WireType::Single).is_err());
        assert!(parse_sequences(&json!("not json"), WireType::Single).is_err());
    }

    #[test]
    fn test_reject_deep_string_nesting() {
        let inner = serde_json::to_string(&json!("[[1,2,3]]")).unwrap();
        let value = Value::String(serde_json::to_string(&Value::String(inner)).unwrap());
        assert!(parse_sequences(&value, WireType::Single).is_err());
    }
}
