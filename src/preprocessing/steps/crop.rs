use image::{DynamicImage, GrayImage};
use imageproc::rect::Rect;

/// Result of the crop stage: the (possibly cropped) color frame kept for
/// the debug artifact, and its grayscale conversion consumed downstream.
pub struct Cropped {
    pub frame: DynamicImage,
    pub gray: GrayImage,
    pub rect: Option<Rect>,
}

/// Slice the frame to the located bounding rectangle and convert to
/// grayscale.
///
/// Without a rectangle the full frame is used, which tolerates receipts
/// that are already isolated in the source photo. No de-skewing happens
/// here; a receipt photographed at an angle stays at that angle.
pub fn apply(image: &DynamicImage, rect: Option<Rect>) -> Cropped {
    let frame = match rect {
        Some(r) => image.crop_imm(r.left() as u32, r.top() as u32, r.width(), r.height()),
        None => image.clone(),
    };
    let gray = frame.to_luma8();

    Cropped { frame, gray, rect }
}
