use image::{GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Default gamma exponent
pub const DEFAULT_GAMMA: f32 = 1.2;

/// Enhance a grayscale image for OCR.
///
/// Stretches intensities to the full 0-255 range, applies power-law gamma
/// correction, then binarizes at the Otsu level. The output contains only
/// the values 0 and 255.
pub fn apply(gray: &GrayImage, gamma: f32) -> GrayImage {
    let normalized = normalize(gray);
    let corrected = gamma_correct(&normalized, gamma);

    let level = otsu_level(&corrected);
    threshold(&corrected, level, ThresholdType::Binary)
}

/// Min-max normalization to span the full 0-255 range.
/// Uniform images pass through unchanged.
fn normalize(gray: &GrayImage) -> GrayImage {
    let (min_val, max_val) = find_min_max(gray);

    if max_val <= min_val {
        return gray.clone();
    }

    let range = (max_val - min_val) as f32;
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0];
        let stretched = ((pixel - min_val) as f32 / range * 255.0) as u8;
        Luma([stretched])
    })
}

/// Power-law gamma correction: `out = 255 * (in/255)^gamma`, truncated to
/// u8. Applied through a 256-entry lookup table.
fn gamma_correct(gray: &GrayImage, gamma: f32) -> GrayImage {
    let lut: [u8; 256] = std::array::from_fn(|v| {
        (255.0 * (v as f32 / 255.0).powf(gamma)) as u8
    });

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([lut[gray.get_pixel(x, y).0[0] as usize]])
    })
}

fn find_min_max(img: &GrayImage) -> (u8, u8) {
    let mut min = 255u8;
    let mut max = 0u8;

    for pixel in img.pixels() {
        let val = pixel.0[0];
        min = min.min(val);
        max = max.max(val);
    }

    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_strictly_binary() {
        let img = GrayImage::from_fn(64, 64, |x, y| Luma([((x * 3 + y * 2) % 256) as u8]));
        let result = apply(&img, DEFAULT_GAMMA);

        for pixel in result.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "Expected binary pixel, got {}",
                pixel.0[0]
            );
        }
    }

    #[test]
    fn test_normalize_stretches_histogram() {
        // Low-contrast image spanning 50..=200
        let img = GrayImage::from_fn(10, 10, |x, _| Luma([50 + (x as u8 * 15).min(150)]));

        let result = normalize(&img);
        let (min, max) = find_min_max(&result);
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn test_normalize_handles_uniform_image() {
        let img = GrayImage::from_pixel(10, 10, Luma([128]));
        let result = normalize(&img);
        assert_eq!(result.get_pixel(0, 0).0[0], 128);
    }

    #[test]
    fn test_gamma_darkens_midtones_for_exponent_above_one() {
        let img = GrayImage::from_pixel(4, 4, Luma([128]));
        let result = gamma_correct(&img, 1.2);
        // 255 * (128/255)^1.2 = ~111
        let out = result.get_pixel(0, 0).0[0];
        assert!(out < 128, "expected darker midtone, got {}", out);
        assert_eq!(out, 111);
    }

    #[test]
    fn test_gamma_fixes_endpoints() {
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let result = gamma_correct(&img, 1.2);
        assert_eq!(result.get_pixel(0, 0).0[0], 0);
        // 255 * 1.0^gamma truncates back to 255 within float error
        assert!(result.get_pixel(1, 0).0[0] >= 254);
    }

    #[test]
    fn test_dark_text_on_light_background_separates() {
        let mut img = GrayImage::from_pixel(50, 20, Luma([230]));
        for x in 10..40 {
            img.put_pixel(x, 10, Luma([30]));
        }

        let result = apply(&img, DEFAULT_GAMMA);
        assert_eq!(result.get_pixel(25, 10).0[0], 0);
        assert_eq!(result.get_pixel(25, 5).0[0], 255);
    }
}
