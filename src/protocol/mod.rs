//! JSONリクエスト/レスポンス
//!
//! - 単発: `extract` / `compare` コマンドが標準入力の1ドキュメントを処理
//! - 行単位: `serve` が1行1リクエスト（`"op"` で種別指定）を処理
//!
//! 失敗時は `{"error": ..., "kind": ...}` を返す。部分的な結果は返さない。

use crate::comparator::{self, Verdict};
use crate::config::Config;
use crate::error::{Result, WireSeqError};
use crate::extractor::{self, Extraction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::debug;
use wire_sequence_common::{
    parse_sequences, Confidence, Discrepancy, EndSummary, SequenceSet, WireType,
};

/// リクエスト種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Extract,
    Compare,
}

impl FromStr for Op {
    type Err = WireSeqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "extract" => Ok(Op::Extract),
            "compare" => Ok(Op::Compare),
            other => Err(WireSeqError::InvalidInput(format!(
                "unknown op: {}. Use extract or compare",
                other
            ))),
        }
    }
}

/// 抽出リクエスト
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtractRequest {
    #[serde(alias = "input")]
    pub images: Vec<String>,
    pub wire_type: WireType,
    /// 分かっていれば端面ごとの期待本数（診断用）
    #[serde(default)]
    pub wire_counts: Option<Vec<usize>>,
}

/// 照合リクエスト
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompareRequest {
    pub wire_counts: Vec<usize>,
    pub reference_sequence: Value,
    pub wire_type: WireType,
    #[serde(default, alias = "input")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub observed_sequence: Option<Value>,
}

/// 抽出レスポンス
#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub sequences: SequenceSet,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// 照合レスポンス
#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub details: String,
    pub discrepancies: Vec<Discrepancy>,
    pub ends: Vec<EndSummary>,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<Verdict> for CompareResponse {
    fn from(verdict: Verdict) -> Self {
        let confidence = verdict.confidence();
        let warnings = verdict.warning_messages();
        Self {
            is_match: verdict.outcome.is_match,
            details: verdict.details,
            discrepancies: verdict.outcome.discrepancies,
            ends: verdict.outcome.ends,
            confidence,
            warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Extract(ExtractResponse),
    Compare(CompareResponse),
}

impl ExtractResponse {
    pub fn from_extraction(extraction: &Extraction) -> Result<Self> {
        Ok(Self {
            sequences: extraction.sequence_set()?,
            confidence: extraction.confidence(),
            warnings: extraction.warning_messages(),
        })
    }
}

pub fn handle_extract(request: &ExtractRequest, config: &Config) -> Result<ExtractResponse> {
    let extraction = extractor::extract_encoded(
        &request.images,
        request.wire_type,
        request.wire_counts.as_deref(),
        &config.extraction,
    )?;

    ExtractResponse::from_extraction(&extraction)
}

pub fn handle_compare(request: &CompareRequest, config: &Config) -> Result<CompareResponse> {
    let reference = comparator::load_reference(
        &request.reference_sequence,
        request.wire_type,
        &request.wire_counts,
    )?;

    let verdict = match (&request.images, &request.observed_sequence) {
        (Some(images), None) => {
            comparator::compare_with_encoded(&reference, images, request.wire_type, config)?
        }
        (None, Some(observed)) => {
            let observed = parse_sequences(observed, request.wire_type)
                .map_err(|e| WireSeqError::InvalidInput(format!("observed sequence: {}", e)))?;
            comparator::compare_with_sequences(&reference, &observed, request.wire_type, config)?
        }
        _ => {
            return Err(WireSeqError::InvalidInput(
                "exactly one of images or observedSequence is required".into(),
            ))
        }
    };

    Ok(verdict.into())
}

/// JSON本文（`op` を含まない）を処理
pub fn respond(op: Op, body: Value, config: &Config) -> Result<Response> {
    match op {
        Op::Extract => {
            let request: ExtractRequest = parse_request(body)?;
            handle_extract(&request, config).map(Response::Extract)
        }
        Op::Compare => {
            let request: CompareRequest = parse_request(body)?;
            handle_compare(&request, config).map(Response::Compare)
        }
    }
}

/// 単発コマンド用: JSON文字列を処理して応答1行を返す
pub fn respond_text(op: Op, text: &str, config: &Config) -> Result<String> {
    let body: Value = serde_json::from_str(text)
        .map_err(|e| WireSeqError::InvalidInput(format!("request is not JSON: {}", e)))?;
    let response = respond(op, body, config)?;
    Ok(serde_json::to_string(&response)?)
}

/// 行単位プロトコル: `{"op": "...", ...}` を1行処理
pub fn handle_line(line: &str, config: &Config) -> String {
    match dispatch_line(line, config) {
        Ok(response) => response,
        Err(err) => error_line(&err),
    }
}

fn dispatch_line(line: &str, config: &Config) -> Result<String> {
    let mut body: Value = serde_json::from_str(line)
        .map_err(|e| WireSeqError::InvalidInput(format!("request is not JSON: {}", e)))?;

    let op = body
        .as_object_mut()
        .ok_or_else(|| WireSeqError::InvalidInput("request must be a JSON object".into()))?
        .remove("op")
        .ok_or_else(|| WireSeqError::InvalidInput("request has no op field".into()))?;
    let op: Op = op
        .as_str()
        .ok_or_else(|| WireSeqError::InvalidInput("op must be a string".into()))?
        .parse()?;

    let response = respond(op, body, config)?;
    Ok(serde_json::to_string(&response)?)
}

/// エラーエンベロープ1行
pub fn error_line(err: &WireSeqError) -> String {
    json!({
        "error": err.to_string(),
        "kind": err.kind(),
        "recapture": err.is_recapture(),
    })
    .to_string()
}

/// 標準入出力ループ（空行は読み飛ばす）
///
/// 処理したリクエスト数を返す。
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W, config: &Config) -> Result<usize> {
    let mut handled = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&line, config);
        writeln!(writer, "{}", response)?;
        writer.flush()?;
        handled += 1;
        debug!(handled, "request handled");
    }

    Ok(handled)
}

fn parse_request<T: for<'de> Deserialize<'de>>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| WireSeqError::InvalidInput(format!("malformed request: {}", e)))
}
