use crate::error::ScanError;
use crate::preprocessing::steps;
use image::GrayImage;
use std::path::Path;
use std::time::Instant;

/// Tunable parameters for a pipeline run
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub min_contour_area: f64,
    pub gamma: f32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_width: steps::resize::DEFAULT_MAX_WIDTH,
            max_height: steps::resize::DEFAULT_MAX_HEIGHT,
            min_contour_area: steps::locate::DEFAULT_MIN_CONTOUR_AREA,
            gamma: steps::enhance::DEFAULT_GAMMA,
        }
    }
}

/// Output of a pipeline run
pub struct ProcessedReceipt {
    /// Binarized grayscale raster handed to OCR
    pub image: GrayImage,
    /// Whether a receipt boundary was located and cropped to
    pub cropped: bool,
}

/// Receipt preprocessing pipeline.
///
/// Sequences decode, resize, boundary location, crop/grayscale and contrast
/// enhancement. The steps themselves are pure; this orchestrator owns the
/// decode and every artifact write.
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_options(PipelineOptions::default())
    }

    pub fn with_options(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Process a receipt photo into a binarized raster ready for OCR.
    ///
    /// The cropped intermediate is written to `crop_out` only when a
    /// boundary was located; the enhanced result is always written to
    /// `enhance_out`. Artifact writes are informational: a failed write is
    /// logged and the in-memory result is still returned.
    pub fn process(
        &self,
        source: &Path,
        crop_out: &Path,
        enhance_out: &Path,
    ) -> Result<ProcessedReceipt, ScanError> {
        let start = Instant::now();

        let decoded = image::open(source)
            .map_err(|e| ScanError::DecodeError(format!("{}: {}", source.display(), e)))?;
        tracing::debug!(
            width = decoded.width(),
            height = decoded.height(),
            "decoded source image"
        );

        let resized = steps::resize::apply(decoded, self.options.max_width, self.options.max_height);
        tracing::debug!(
            width = resized.width(),
            height = resized.height(),
            "resized to working bounds"
        );

        let located = steps::locate::apply(&resized, self.options.min_contour_area);
        let rect = located.map(|quad| quad.bounding_rect(resized.width(), resized.height()));
        if rect.is_none() {
            tracing::debug!("no boundary found, assuming receipt fills the frame");
        }

        let cropped = steps::crop::apply(&resized, rect);
        if cropped.rect.is_some() {
            write_artifact(&cropped.frame, crop_out, "cropped");
        }

        let enhanced = steps::enhance::apply(&cropped.gray, self.options.gamma);
        write_artifact(&image::DynamicImage::ImageLuma8(enhanced.clone()), enhance_out, "enhanced");

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            cropped = cropped.rect.is_some(),
            "preprocessing complete"
        );

        Ok(ProcessedReceipt {
            image: enhanced,
            cropped: cropped.rect.is_some(),
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a debug artifact, logging instead of failing on I/O errors.
fn write_artifact(image: &image::DynamicImage, path: &Path, label: &str) {
    match image.save(path) {
        Ok(()) => tracing::debug!("{} artifact saved to {}", label, path.display()),
        Err(e) => tracing::warn!(
            "failed to write {} artifact to {}: {}",
            label,
            path.display(),
            e
        ),
    }
}
