//! Cropview Core - crop-box geometry engine
//!
//! This crate holds the state and geometry behind an interactive image
//! cropper: a draggable crop box over a zoomable, pannable image that can be
//! turned in 90° steps, with aspect-ratio locking, a circular style, reset to
//! a snapshot, and notifications when the edit becomes resettable.
//!
//! Rendering, gestures and animation belong to the host. The host feeds
//! viewport-space points and requests into [`CropView`] and draws from the
//! geometry it reads back.
//!
//! ```ignore
//! let mut view = CropView::new(Size::new(4032.0, 3024.0), CroppingStyle::Rectangular)?;
//! view.set_bounds(Rect::new(0.0, 0.0, 390.0, 700.0));
//! view.perform_initial_setup()?;
//! view.set_aspect_ratio(AspectRatio::new(1.0, 1.0), true);
//! let region = view.image_crop_frame();
//! ```

pub mod config;
pub mod consts;
pub mod cropbox;
pub mod error;
pub mod export;
pub mod geometry;
pub mod restore;
pub mod rotation;
pub mod session;
pub mod view;
pub mod viewport;

pub use config::{CropConfig, CroppingStyle, InteractionRules, RenderHints};
pub use cropbox::{ActiveDrag, DragHandle, DragState};
pub use error::{CropError, Result};
pub use export::crop_image;
pub use geometry::{
    image_coordinate, rotated_size, viewport_coordinate, Angle, AspectRatio, EdgeInsets, Point,
    Rect, Size, ViewportState,
};
pub use restore::{LayoutState, RestorePoint};
pub use rotation::RelayoutCapture;
pub use session::CropViewDelegate;
pub use view::{CropView, Transition};
