//! テスト用の合成画像

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub const RED: [u8; 3] = [255, 0, 0];
pub const GREEN: [u8; 3] = [0, 255, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];
pub const YELLOW: [u8; 3] = [255, 255, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];
/// 明るい撮影台
pub const LIGHT: [u8; 3] = [235, 235, 235];
/// アース線などの暗いワイヤー
pub const DARK: [u8; 3] = [20, 20, 20];

const MARGIN: u32 = 10;
const WIRE_WIDTH: u32 = 20;
const HEIGHT: u32 = 30;

/// 黒背景の中央に幅20pxのワイヤーを左から並べた画像
pub fn wire_image(colors: &[[u8; 3]]) -> RgbImage {
    wire_image_on(BLACK, colors)
}

/// 指定した背景色の中央にワイヤーを並べた画像
pub fn wire_image_on(backdrop: [u8; 3], colors: &[[u8; 3]]) -> RgbImage {
    let width = MARGIN * 2 + WIRE_WIDTH * colors.len() as u32;
    RgbImage::from_fn(width, HEIGHT, |x, _| {
        if x < MARGIN || x >= width - MARGIN {
            return Rgb(backdrop);
        }
        let index = ((x - MARGIN) / WIRE_WIDTH) as usize;
        Rgb(colors[index])
    })
}

/// 画面いっぱいにワイヤーを並べた画像（背景なし）
pub fn full_frame(colors: &[[u8; 3]]) -> RgbImage {
    let width = WIRE_WIDTH * colors.len() as u32;
    RgbImage::from_fn(width, HEIGHT, |x, _| Rgb(colors[(x / WIRE_WIDTH) as usize]))
}

pub fn png_base64(image: &RgbImage) -> String {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encode");
    STANDARD.encode(bytes)
}

/// Data URL付きのBase64
pub fn data_uri(image: &RgbImage) -> String {
    format!("data:image/png;base64,{}", png_base64(image))
}

pub fn encoded_wires(colors: &[[u8; 3]]) -> String {
    png_base64(&wire_image(colors))
}
