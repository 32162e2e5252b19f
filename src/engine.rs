use crate::error::ScanError;
use image::DynamicImage;

/// OCR processing result
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
}

/// Trait that all OCR engines must implement.
///
/// The preprocessing pipeline hands engines a fully enhanced raster; an
/// engine's only job is turning that image into text. Implementations are
/// constructed once at startup and injected into the server state.
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text in an image
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, ScanError>;
}
