//! Error types for dome projection
//!
//! Only configuration-level problems and out-of-range queries surface as errors.
//! Rays that miss the mirror or dome are recorded in the validity mask instead.

use thiserror::Error;

/// Errors produced while building or querying a dome projection
#[derive(Debug, Error)]
pub enum DomeError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Degenerate projector calibration: {0}")]
    DegenerateCalibration(String),

    #[error(
        "Image for screen {screen} is {}x{} but the screen is configured for {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    ImageDimensionMismatch {
        screen: usize,
        /// Configured (width, height)
        expected: (u32, u32),
        /// Supplied (width, height)
        actual: (u32, u32),
    },

    #[error("No viewing direction for projector point ({u:.2}, {v:.2})")]
    NoViewingDirection { u: f64, v: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, DomeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = DomeError::ImageDimensionMismatch {
            screen: 2,
            expected: (280, 200),
            actual: (640, 480),
        };
        assert_eq!(
            err.to_string(),
            "Image for screen 2 is 640x480 but the screen is configured for 280x200"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DomeError = io.into();
        assert!(matches!(err, DomeError::Io(_)));
    }
}
