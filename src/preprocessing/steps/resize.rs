use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Default working bounds for the resized frame
pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;

/// Uniform scale factor that fits `(width, height)` within the bounds
/// while preserving aspect ratio.
///
/// The factor exceeds 1.0 when the source is smaller than the bounds, in
/// which case the image is enlarged rather than passed through unchanged.
pub fn fit_scale(width: u32, height: u32, max_width: u32, max_height: u32) -> f64 {
    let wr = max_width as f64 / width as f64;
    let hr = max_height as f64 / height as f64;
    wr.min(hr)
}

/// Resize the image so it fits within `max_width` x `max_height`.
///
/// Target dimensions are `round(dim * scale)`, resized exactly with a
/// bilinear filter.
pub fn apply(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let scale = fit_scale(width, height, max_width, max_height);

    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);

    if (new_width, new_height) == (width, height) {
        return image;
    }

    image.resize_exact(new_width, new_height, FilterType::Triangle)
}
