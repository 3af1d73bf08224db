//! 一括処理
//!
//! `serve` と同じ形式のJSON Linesファイルを並列処理し、入力と同じ順で出力する。
//! 各リクエストは独立しているので共有状態はない。

use crate::config::Config;
use crate::error::{Result, WireSeqError};
use crate::protocol;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::{BufRead, Write};

/// 一括処理の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub failed: usize,
}

/// 空行を除いたリクエストを並列に処理し、応答行を返す
pub fn process_lines(lines: &[String], config: &Config, progress: &ProgressBar) -> Vec<String> {
    lines
        .par_iter()
        .map(|line| {
            let response = protocol::handle_line(line, config);
            progress.inc(1);
            response
        })
        .collect()
}

pub fn run<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    config: &Config,
    show_progress: bool,
) -> Result<BatchSummary> {
    let lines: Vec<String> = reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let progress = if show_progress {
        let bar = ProgressBar::new(lines.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| WireSeqError::Config(e.to_string()))?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let responses = process_lines(&lines, config, &progress);
    progress.finish_and_clear();

    let mut summary = BatchSummary {
        total: responses.len(),
        failed: 0,
    };
    for response in &responses {
        if is_error_line(response) {
            summary.failed += 1;
        }
        writeln!(writer, "{}", response)?;
    }
    writer.flush()?;

    Ok(summary)
}

fn is_error_line(response: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(response)
        .map(|v| v.get("error").is_some())
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn compare_line(observed: [u8; 3]) -> String {
        json!({
            "op": "compare",
            "wireCounts": [1],
            "referenceSequence": [[255, 0, 0]],
            "observedSequence": [observed],
            "wireType": "single"
        })
        .to_string()
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let input = [
            compare_line([255, 0, 0]),
            compare_line([0, 0, 255]),
            "oops".to_string(),
            compare_line([250, 5, 0]),
        ]
        .join("\n");

        let mut output = Vec::new();
        let summary = run(Cursor::new(input), &mut output, &Config::default(), false).unwrap();
        assert_eq!(summary, BatchSummary { total: 4, failed: 1 });

        let text = String::from_utf8(output).unwrap();
        let results: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(results[0]["match"], json!(true));
        assert_eq!(results[1]["match"], json!(false));
        assert!(results[2]["error"].is_string());
        assert_eq!(results[3]["match"], json!(true));
    }

    #[test]
    fn test_batch_empty_input() {
        let mut output = Vec::new();
        let summary = run(Cursor::new(""), &mut output, &Config::default(), false).unwrap();
        assert_eq!(summary.total, 0);
        assert!(output.is_empty());
    }
}
