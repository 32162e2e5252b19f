//! Image preprocessing module for receipt OCR
//!
//! Normalizes a photographed receipt into a binarized grayscale raster that
//! OCR engines handle well: resize to working bounds, locate the receipt
//! boundary, crop, then enhance contrast.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PipelineOptions, ProcessedReceipt};
