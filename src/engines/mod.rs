//! OCR engine implementations
//!
//! Implementations of the [`OcrEngine`](crate::engine::OcrEngine) trait,
//! conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::ScanError;
use std::sync::Arc;

/// Construct the OCR engine configured at build time.
#[allow(unused_variables)]
pub fn build(config: &Config) -> Result<Arc<dyn OcrEngine>, ScanError> {
    #[cfg(feature = "engine-ocrs")]
    {
        tracing::info!("Initializing ocrs engine...");
        let engine = ocrs::OcrsEngine::new(config)?;
        return Ok(Arc::new(engine));
    }

    #[cfg(not(feature = "engine-ocrs"))]
    {
        Err(ScanError::InitializationError(
            "No OCR engine available. Build with --features engine-ocrs".to_string(),
        ))
    }
}
