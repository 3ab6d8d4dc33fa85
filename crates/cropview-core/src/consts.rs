//! Tunable constants for the crop-box geometry engine.

/// Padding between the display bounds and the usable crop region, per side.
pub const DEFAULT_PADDING: f64 = 14.0;

/// Smallest width or height the crop box may be dragged down to.
pub const DEFAULT_MINIMUM_BOX_SIZE: f64 = 42.0;

/// Half the side of the square hit area around each crop-box corner and the
/// half-thickness of the band along each edge.
pub const DEFAULT_HIT_TOLERANCE: f64 = 32.0;

/// Maximum zoom, as a multiple of the scale that fits the whole image.
pub const DEFAULT_MAXIMUM_ZOOM_FACTOR: f64 = 15.0;

/// Viewport-space distance under which two layouts count as identical when
/// deciding whether the crop view can be reset.
pub const LAYOUT_EPSILON: f64 = 0.5;

/// Relative scale difference under which two layouts count as identical.
pub const SCALE_EPSILON: f64 = 1e-3;

/// Ratio difference under which two aspect ratios count as identical.
pub const RATIO_EPSILON: f64 = 1e-6;

/// Slack below which the crop box is treated as filling an axis of the
/// usable region.
pub const SLACK_EPSILON: f64 = 1e-6;
