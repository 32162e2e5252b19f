use crate::preprocessing::pipeline::PipelineOptions;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub max_width: u32,
    pub max_height: u32,
    pub min_contour_area: f64,
    pub gamma: f32,
    /// Where to persist per-request artifacts; `None` means discard them
    /// once the request completes.
    pub artifact_dir: Option<PathBuf>,
}

impl Config {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            min_contour_area: self.min_contour_area,
            gamma: self.gamma,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_file_size: 50 * 1024 * 1024,
            max_width: 1920,
            max_height: 1080,
            min_contour_area: 10_000.0,
            gamma: 1.2,
            artifact_dir: None,
        }
    }
}
