//! Discrete 90° rotation and display relayout.
//!
//! # Quarter turns
//!
//! [`CropView::rotate`] keeps the selected image region. Before the turn it
//! records where the crop box sits inside the usable region (as fractions of
//! the free space) and how much of the region it fills; after the turn the
//! same image region is laid out at the turned placement with the same fill.
//! Because nothing is rescaled to "fit" on the way, four turns in one
//! direction land back on the starting layout.
//!
//! # Display relayout
//!
//! When the host's own display rotates, the bounds change shape. The host
//! calls [`CropView::prepare_for_rotation`] before updating the bounds and
//! [`CropView::perform_relayout_for_rotation`] afterwards; the captured image
//! region is then fitted into the new usable region.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cropbox::DragState;
use crate::error::{CropError, Result};
use crate::geometry::{AspectRatio, Rect};
use crate::view::{CropView, Transition};
use crate::viewport::{self, Placement};

/// Image region captured by [`CropView::prepare_for_rotation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelayoutCapture {
    pub image_crop_frame: Rect,
}

/// What a quarter turn carries over.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RotationCapture {
    image_crop_frame: Rect,
    placement: Placement,
    fill: f64,
}

impl RotationCapture {
    fn of(view: &CropView) -> Self {
        let crop_box = view.crop_box_frame();
        let usable = view.usable_region();
        Self {
            image_crop_frame: view.image_crop_frame(),
            placement: Placement::of(&crop_box, &usable),
            fill: viewport::fill_fraction(&crop_box, &usable),
        }
    }
}

impl CropView {
    /// Turn the image a quarter turn.
    ///
    /// A set aspect ratio is swapped so it keeps describing the crop box.
    pub fn rotate(&mut self, clockwise: bool, animated: bool) -> Result<Transition> {
        self.ensure_laid_out()?;
        let from = self.state;
        let capture = RotationCapture::of(self);

        self.drag = DragState::Idle;
        self.state.angle = self.state.angle.rotated(clockwise);
        self.state.aspect_ratio = self.state.aspect_ratio.map(AspectRatio::swapped);
        self.apply_image_region(
            &capture.image_crop_frame,
            capture.fill,
            capture.placement.rotated(clockwise),
        );
        self.refresh_session();

        debug!(
            clockwise,
            angle = self.state.angle.degrees(),
            crop_box = ?self.state.crop_box,
            "rotated"
        );
        Ok(Transition {
            from,
            to: self.state,
            animated,
        })
    }

    /// Capture the selected image region ahead of a display rotation.
    ///
    /// Until [`CropView::perform_relayout_for_rotation`] runs, bounds and
    /// inset changes are recorded without relaying out.
    pub fn prepare_for_rotation(&mut self) -> Result<()> {
        self.ensure_laid_out()?;
        self.drag = DragState::Idle;
        self.relayout = Some(RelayoutCapture {
            image_crop_frame: self.image_crop_frame(),
        });
        debug!("relayout prepared");
        Ok(())
    }

    pub fn is_relayout_pending(&self) -> bool {
        self.relayout.is_some()
    }

    /// Fit the region captured by [`CropView::prepare_for_rotation`] into
    /// the current usable region, centred and as large as possible.
    ///
    /// The returned transition is never flagged animated: the host runs this
    /// inside its own rotation animation.
    pub fn perform_relayout_for_rotation(&mut self) -> Result<Transition> {
        let capture = self.relayout.ok_or(CropError::NoPendingRelayout)?;
        let from = self.state;
        self.rebuild_snapshot()?;
        self.relayout = None;

        self.apply_image_region(&capture.image_crop_frame, 1.0, Placement::CENTER);
        self.refresh_session();

        debug!(usable = ?self.usable_region(), "relayout for rotation");
        Ok(Transition {
            from,
            to: self.state,
            animated: false,
        })
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::CroppingStyle;
    use crate::geometry::Size;
    use proptest::prelude::*;

    fn laid_out(width: f64, height: f64) -> CropView {
        let mut view = CropView::new(Size::new(width, height), CroppingStyle::Rectangular).unwrap();
        view.set_bounds(Rect::new(0.0, 0.0, 828.0, 628.0));
        view.perform_initial_setup().unwrap();
        view
    }

    proptest! {
        #[test]
        fn prop_four_rotations_restore_layout(
            width in 600.0f64..3000.0,
            height in 600.0f64..3000.0,
            x in 0.0f64..0.5,
            y in 0.0f64..0.5,
            w in 0.2f64..0.5,
            h in 0.2f64..0.5,
            clockwise in any::<bool>(),
        ) {
            let mut view = laid_out(width, height);
            let region = Rect::new(x * width, y * height, w * width, h * height);
            view.set_image_crop_frame(region).unwrap();
            let before = *view.layout();

            for _ in 0..4 {
                view.rotate(clockwise, false).unwrap();
            }

            prop_assert_eq!(view.angle(), before.angle);
            prop_assert!(view.crop_box_frame().approx_eq(&before.crop_box, 1e-3));
            prop_assert!(view.image_crop_frame().approx_eq(&region, 1e-3));
        }

        #[test]
        fn prop_rotation_keeps_coverage(
            width in 200.0f64..3000.0,
            height in 200.0f64..3000.0,
            turns in 1usize..4,
        ) {
            let mut view = laid_out(width, height);
            for _ in 0..turns {
                view.rotate(true, false).unwrap();
            }
            let frame = view.crop_box_frame();
            prop_assert!(view.image_view_frame().contains_rect(&frame, 1e-6));
            prop_assert!(view.usable_region().contains_rect(&frame, 1e-6));
            prop_assert!(frame.width >= 42.0 - 1e-6);
            prop_assert!(frame.height >= 42.0 - 1e-6);
        }
    }
}
