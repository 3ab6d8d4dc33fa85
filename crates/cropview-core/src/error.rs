use thiserror::Error;

/// Errors raised by the crop view engine.
///
/// All of these are caller contract violations. Clamping a gesture that
/// overshoots the valid region is normal operation and never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CropError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageSize { width: f64, height: f64 },

    #[error("Usable crop region is empty (bounds {width}x{height})")]
    EmptyCropRegion { width: f64, height: f64 },

    #[error("Crop view has not been laid out; call perform_initial_setup first")]
    NotLaidOut,

    #[error("No relayout pending; call prepare_for_rotation first")]
    NoPendingRelayout,

    #[error("Image crop frame {0} lies outside the image")]
    FrameOutsideImage(String),
}

pub type Result<T> = std::result::Result<T, CropError>;
