//! 画像デコード
//!
//! 受け取った文字列（Data URL付きでも可）をBase64デコードし、RGB画像にする。

use crate::error::{Result, WireSeqError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::RgbImage;
use std::path::Path;

/// Data URLの前置き（`data:image/png;base64,`）を取り除く
///
/// 前置きが無ければそのまま返す。
pub fn strip_data_uri(encoded: &str) -> Result<&str> {
    let trimmed = encoded.trim();
    if !trimmed.starts_with("data:") {
        return Ok(trimmed);
    }

    trimmed
        .split_once(',')
        .map(|(_, data)| data)
        .ok_or_else(|| WireSeqError::Decode("data URI has no payload".into()))
}

/// Base64文字列をバイト列にする
///
/// 空白は無視し、欠けた `=` パディングは補う。
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let payload = strip_data_uri(encoded)?;
    let mut cleaned: String = payload
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(WireSeqError::Decode("image payload is empty".into()));
    }

    let remainder = cleaned.len() % 4;
    if remainder != 0 {
        cleaned.push_str(&"=".repeat(4 - remainder));
    }

    STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| WireSeqError::Decode(format!("invalid base64: {}", e)))
}

/// エンコード済み画像（PNG/JPEG）をRGB画像にする
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| WireSeqError::Decode(format!("unreadable image: {}", e)))?
        .to_rgb8();

    if image.width() == 0 || image.height() == 0 {
        return Err(WireSeqError::Decode("image has no pixels".into()));
    }

    Ok(image)
}

/// Base64文字列から直接デコード
pub fn decode_image(encoded: &str) -> Result<RgbImage> {
    let bytes = decode_base64(encoded)?;
    decode_bytes(&bytes)
}

/// 画像ファイルを読み込む
pub fn load_file(path: &Path) -> Result<RgbImage> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes)
}
