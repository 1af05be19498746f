use crate::annotations::detection::Detection;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DetectionError {
    #[error("Failed to run detection, image dimensions must be positive ({width}x{height}).")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Defines a trait that all cell detectors must follow.
///
/// A detector only ever sees the size of the image, never its pixels. Every returned box lies
/// inside `(0, 0, width, height)`.
pub trait CellDetector {
    fn detect(&self, width: u32, height: u32) -> Result<Vec<Detection>, DetectionError>;
}
