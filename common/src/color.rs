//! 色モデルユーティリティ
//!
//! 照合で使う色距離:
//! - `rgb`: 8bit RGB空間のユークリッド距離
//! - `cie76`: L*a*b*（D65）でのΔE*ab

use crate::types::ColorSample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// D65白色点
const WHITE_X: f32 = 0.950_47;
const WHITE_Y: f32 = 1.0;
const WHITE_Z: f32 = 1.088_83;

/// 色距離の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMetric {
    #[default]
    Rgb,
    Cie76,
}

impl ColorMetric {
    pub fn distance(&self, a: ColorSample, b: ColorSample) -> f32 {
        match self {
            ColorMetric::Rgb => rgb_distance(a, b),
            ColorMetric::Cie76 => delta_e76(a, b),
        }
    }
}

impl FromStr for ColorMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgb" | "euclidean" => Ok(ColorMetric::Rgb),
            "cie76" | "lab" | "delta-e" => Ok(ColorMetric::Cie76),
            _ => Err(format!("Unknown metric: {}. Use rgb or cie76", s)),
        }
    }
}

impl fmt::Display for ColorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMetric::Rgb => write!(f, "rgb"),
            ColorMetric::Cie76 => write!(f, "cie76"),
        }
    }
}

/// RGBユークリッド距離
pub fn rgb_distance(a: ColorSample, b: ColorSample) -> f32 {
    channel_distance(
        [a.r() as f32, a.g() as f32, a.b() as f32],
        [b.r() as f32, b.g() as f32, b.b() as f32],
    )
}

/// 平均色（小数）同士のユークリッド距離
pub fn channel_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    (dr * dr + dg * dg + db * db).sqrt()
}

/// HSVのV（最大チャンネル）
pub fn brightness(rgb: [f32; 3]) -> f32 {
    rgb[0].max(rgb[1]).max(rgb[2])
}

/// sRGB → L*a*b*（D65）
pub fn srgb_to_lab(sample: ColorSample) -> [f32; 3] {
    let r = linearize(sample.r());
    let g = linearize(sample.g());
    let b = linearize(sample.b());

    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y / WHITE_Y);
    let fz = lab_f(z / WHITE_Z);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// CIE76 色差
pub fn delta_e76(a: ColorSample, b: ColorSample) -> f32 {
    channel_distance(srgb_to_lab(a), srgb_to_lab(b))
}

fn linearize(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_distance() {
        let a = ColorSample::new(0, 0, 0);
        let b = ColorSample::new(3, 4, 0);
        assert_eq!(rgb_distance(a, b), 5.0);
        assert_eq!(rgb_distance(b, a), 5.0);
        assert_eq!(rgb_distance(a, a), 0.0);
    }

    #[test]
    fn test_lab_reference_points() {
        let white = srgb_to_lab(ColorSample::new(255, 255, 255));
        let black = srgb_to_lab(ColorSample::new(0, 0, 0));
        assert!((white[0] - 100.0).abs() < 0.1);
        assert!(white[1].abs() < 0.1);
        assert!(white[2].abs() < 0.1);
        assert!(black[0].abs() < 0.01);
    }

    #[test]
    fn test_delta_e76_orders_colors() {
        let red = ColorSample::new(255, 0, 0);
        let dark_red = ColorSample::new(245, 5, 5);
        let green = ColorSample::new(0, 255, 0);
        assert!(delta_e76(red, dark_red) < delta_e76(red, green));
        assert_eq!(delta_e76(red, red), 0.0);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("RGB".parse::<ColorMetric>().unwrap(), ColorMetric::Rgb);
        assert_eq!("lab".parse::<ColorMetric>().unwrap(), ColorMetric::Cie76);
        assert!("hsv".parse::<ColorMetric>().is_err());
    }

    #[test]
    fn test_brightness() {
        assert_eq!(brightness([10.0, 200.0, 30.0]), 200.0);
    }
}
