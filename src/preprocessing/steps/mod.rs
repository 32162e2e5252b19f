//! Individual preprocessing steps
//!
//! Each step is a pure image transform; the pipeline owns all file I/O.

pub mod crop;
pub mod enhance;
pub mod locate;
pub mod resize;
