use image::{GrayImage, Rgb, RgbImage};
use receipt_ocr_server::preprocessing::{Pipeline, PipelineOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Scenario {
    _dir: TempDir,
    source: PathBuf,
    crop_out: PathBuf,
    enhance_out: PathBuf,
}

impl Scenario {
    fn new(image: &RgbImage) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = dir.path().join("receipt.png");
        image.save(&source).expect("Failed to write source image");

        Self {
            source,
            crop_out: dir.path().join("cropped.png"),
            enhance_out: dir.path().join("enhanced.png"),
            _dir: dir,
        }
    }
}

/// A dark photo backdrop with a bright receipt rectangle and a few printed
/// lines inside it.
fn receipt_photo(width: u32, height: u32, rx: u32, ry: u32, rw: u32, rh: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let on_receipt = x >= rx && x < rx + rw && y >= ry && y < ry + rh;
        if !on_receipt {
            return Rgb([15, 15, 20]);
        }

        // Sparse "text" lines on the receipt
        let local_y = y - ry;
        let local_x = x - rx;
        let on_text = local_y % 120 >= 40
            && local_y % 120 < 52
            && local_x > rw / 10
            && local_x < rw - rw / 10;
        if on_text {
            Rgb([40, 40, 40])
        } else {
            Rgb([235, 232, 228])
        }
    })
}

fn assert_strictly_binary(image: &GrayImage) {
    for pixel in image.pixels() {
        assert!(
            pixel.0[0] == 0 || pixel.0[0] == 255,
            "Expected binary pixel, got {}",
            pixel.0[0]
        );
    }
}

fn file_has_content(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

#[test]
fn full_photo_is_cropped_to_the_receipt() {
    // 3000x2000 photo, receipt occupying the central 60% of each dimension
    let photo = receipt_photo(3000, 2000, 600, 400, 1800, 1200);
    let scenario = Scenario::new(&photo);

    let pipeline = Pipeline::new();
    let result = pipeline
        .process(&scenario.source, &scenario.crop_out, &scenario.enhance_out)
        .expect("pipeline should succeed");

    assert!(result.cropped, "receipt boundary should be located");

    // Resize factor is min(1920/3000, 1080/2000) = 0.54, so the located
    // rectangle is about 972x648. Edge tracing lands within a few pixels.
    let (w, h) = result.image.dimensions();
    assert!((w as i64 - 972).abs() <= 10, "width = {}", w);
    assert!((h as i64 - 648).abs() <= 10, "height = {}", h);

    assert_strictly_binary(&result.image);

    assert!(file_has_content(&scenario.crop_out), "crop artifact missing");
    assert!(
        file_has_content(&scenario.enhance_out),
        "enhanced artifact missing"
    );
}

#[test]
fn pre_cropped_receipt_falls_back_to_full_frame() {
    // Flat 800x1200 image with no strong rectangular edges
    let flat = RgbImage::from_pixel(800, 1200, Rgb([210, 208, 205]));
    let scenario = Scenario::new(&flat);

    let pipeline = Pipeline::new();
    let result = pipeline
        .process(&scenario.source, &scenario.crop_out, &scenario.enhance_out)
        .expect("pipeline should succeed");

    assert!(!result.cropped, "no boundary should be located");

    // min(1920/800, 1080/1200) = 0.9 -> full resized frame
    assert_eq!(result.image.dimensions(), (720, 1080));

    // No crop artifact without a located boundary; enhanced always written
    assert!(!scenario.crop_out.exists());
    assert!(file_has_content(&scenario.enhance_out));
}

#[test]
fn enhanced_output_is_strictly_binary() {
    let photo = receipt_photo(1200, 900, 200, 150, 800, 600);
    let scenario = Scenario::new(&photo);

    let result = Pipeline::new()
        .process(&scenario.source, &scenario.crop_out, &scenario.enhance_out)
        .expect("pipeline should succeed");

    assert_strictly_binary(&result.image);
}

#[test]
fn pipeline_is_deterministic() {
    let photo = receipt_photo(1600, 1200, 300, 200, 1000, 800);
    let first = Scenario::new(&photo);
    let second = Scenario::new(&photo);

    let pipeline = Pipeline::new();
    let a = pipeline
        .process(&first.source, &first.crop_out, &first.enhance_out)
        .expect("first run should succeed");
    let b = pipeline
        .process(&second.source, &second.crop_out, &second.enhance_out)
        .expect("second run should succeed");

    assert_eq!(a.cropped, b.cropped);
    assert_eq!(a.image.dimensions(), b.image.dimensions());
    assert_eq!(a.image.as_raw(), b.image.as_raw());
}

#[test]
fn raised_area_threshold_rejects_the_receipt() {
    let photo = receipt_photo(1200, 900, 200, 150, 800, 600);
    let scenario = Scenario::new(&photo);

    // Resized receipt area is far below this threshold
    let pipeline = Pipeline::with_options(PipelineOptions {
        min_contour_area: 5_000_000.0,
        ..PipelineOptions::default()
    });
    let result = pipeline
        .process(&scenario.source, &scenario.crop_out, &scenario.enhance_out)
        .expect("pipeline should succeed");

    assert!(!result.cropped);
    // 1200x900 scaled by min(1.6, 1.2) = 1.2
    assert_eq!(result.image.dimensions(), (1440, 1080));
}
