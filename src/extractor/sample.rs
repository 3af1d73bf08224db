//! ワイヤー領域の代表色

use super::band::Band;
use super::segment::WireRegion;
use image::RgbImage;
use wire_sequence_common::ColorSample;

/// 代表色と、マージンを取れなかったかどうか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSample {
    pub color: ColorSample,
    pub narrow: bool,
}

/// 行帯×領域（左右 `margin` 列を除く）の平均色
///
/// マージンを除くと何も残らない場合は中央の1列を使い、`narrow` を立てる。
pub fn sample_region(image: &RgbImage, band: Band, region: WireRegion, margin: u32) -> RegionSample {
    let inner_start = region.start.saturating_add(margin);
    let inner_end = region.end.saturating_sub(margin);

    let (start, end, narrow) = if inner_start <= inner_end {
        (inner_start, inner_end, false)
    } else {
        let center = region.start + (region.end - region.start) / 2;
        (center, center, true)
    };

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for y in band.top..band.bottom {
        for x in start..=end {
            let px = image.get_pixel(x, y);
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
            count += 1;
        }
    }

    let mean = |total: u64| ((total as f64 / count as f64).round()).clamp(0.0, 255.0) as u8;

    RegionSample {
        color: ColorSample::new(mean(sum[0]), mean(sum[1]), mean(sum[2])),
        narrow,
    }
}
