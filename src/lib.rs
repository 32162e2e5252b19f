//! Receipt OCR server: geometric normalization and contrast enhancement for
//! photographed receipts, followed by text extraction through a pluggable
//! OCR engine.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod preprocessing;
pub mod server;
