//! 束が写る行帯と列プロファイル

use crate::config::ExtractionParams;
use image::RgbImage;

/// 解析対象の行帯 `[top, bottom)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub top: u32,
    pub bottom: u32,
}

impl Band {
    pub fn rows(&self) -> u32 {
        self.bottom - self.top
    }
}

/// 画像高さと設定から行帯を決める（最低1行）
pub fn locate(height: u32, params: &ExtractionParams) -> Band {
    let h = height.max(1);
    let top = ((rows_at(h, params.band_top) + ROW_EPSILON).floor() as u32).min(h - 1);
    let bottom = ((rows_at(h, params.band_bottom) - ROW_EPSILON).ceil() as u32).min(h);
    let bottom = bottom.max(top + 1);
    Band { top, bottom }
}

const ROW_EPSILON: f64 = 1e-9;

/// 割合を行位置にする（f32の表現誤差は10^-6単位で丸める）
fn rows_at(height: u32, fraction: f32) -> f64 {
    let fraction = (f64::from(fraction) * 1e6).round() / 1e6;
    f64::from(height) * fraction
}

/// 各列の行帯内平均色
pub fn column_profile(image: &RgbImage, band: Band) -> Vec<[f32; 3]> {
    let rows = band.rows() as f32;

    (0..image.width())
        .map(|x| {
            let mut sum = [0u32; 3];
            for y in band.top..band.bottom {
                let px = image.get_pixel(x, y);
                sum[0] += px[0] as u32;
                sum[1] += px[1] as u32;
                sum[2] += px[2] as u32;
            }
            [
                sum[0] as f32 / rows,
                sum[1] as f32 / rows,
                sum[2] as f32 / rows,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_locate_default_band() {
        let band = locate(100, &ExtractionParams::default());
        assert_eq!(band, Band { top: 40, bottom: 60 });
        assert_eq!(band.rows(), 20);
    }

    #[test]
    fn test_locate_exact_fractions() {
        let params = ExtractionParams::default();
        assert_eq!(locate(10, &params), Band { top: 4, bottom: 6 });
        assert_eq!(locate(1000, &params), Band { top: 400, bottom: 600 });
        assert_eq!(locate(4000, &params), Band { top: 1600, bottom: 2400 });
        // 割り切れない高さは外側へ広げる
        assert_eq!(locate(7, &params), Band { top: 2, bottom: 5 });
    }

    #[test]
    fn test_locate_tiny_image() {
        let band = locate(1, &ExtractionParams::default());
        assert_eq!(band, Band { top: 0, bottom: 1 });
    }

    #[test]
    fn test_locate_full_height() {
        let params = ExtractionParams {
            band_top: 0.0,
            band_bottom: 1.0,
            ..Default::default()
        };
        assert_eq!(locate(7, &params), Band { top: 0, bottom: 7 });
    }

    #[test]
    fn test_profile_ignores_rows_outside_band() {
        let mut image = RgbImage::from_pixel(2, 10, Rgb([0, 0, 0]));
        for x in 0..2 {
            for y in 4..6 {
                image.put_pixel(x, y, Rgb([100, 50, 0]));
            }
        }
        let profile = column_profile(&image, Band { top: 4, bottom: 6 });
        assert_eq!(profile, vec![[100.0, 50.0, 0.0], [100.0, 50.0, 0.0]]);
    }
}
