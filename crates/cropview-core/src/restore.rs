//! Reset snapshot and restore points.
//!
//! The snapshot is the layout a reset returns to. It is never stored as a
//! fixed value: it is derived from a [`RestorePoint`] (angle, optional image
//! region, aspect ratio) and rebuilt whenever the display region changes, so
//! a reset after a bounds change still fits the new bounds.
//!
//! Whether the crop view "can be reset" is likewise derived, by comparing the
//! current [`LayoutState`] with the snapshot.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{LAYOUT_EPSILON, RATIO_EPSILON, SCALE_EPSILON};
use crate::cropbox::DragState;
use crate::error::Result;
use crate::geometry::{Angle, AspectRatio, Rect, ViewportState};
use crate::view::{CropView, Transition};
use crate::viewport;

/// The full mutable layout of a crop view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutState {
    pub crop_box: Rect,
    pub viewport: ViewportState,
    pub angle: Angle,
    pub aspect_ratio: Option<AspectRatio>,
}

impl LayoutState {
    /// Whether two layouts differ by more than rounding noise.
    ///
    /// Any angle or aspect ratio difference counts. Geometry is compared
    /// within [`LAYOUT_EPSILON`] viewport units and the scale within
    /// [`SCALE_EPSILON`] relative.
    pub fn differs_from(&self, other: &LayoutState) -> bool {
        let scale_delta = (self.viewport.scale - other.viewport.scale).abs();
        self.angle != other.angle
            || !ratios_match(self.aspect_ratio, other.aspect_ratio)
            || scale_delta > SCALE_EPSILON * other.viewport.scale.abs()
            || !self.crop_box.approx_eq(&other.crop_box, LAYOUT_EPSILON)
            || self
                .viewport
                .content_offset
                .distance_to(other.viewport.content_offset)
                > LAYOUT_EPSILON
    }
}

/// What a reset returns to.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RestorePoint {
    pub angle: Angle,
    /// Selected region in image pixels; `None` selects the whole image (or
    /// the largest centred region of `aspect_ratio`).
    pub image_crop_frame: Option<Rect>,
    /// Ratio of the crop box as displayed at `angle`.
    pub aspect_ratio: Option<AspectRatio>,
}

fn ratios_match(a: Option<AspectRatio>, b: Option<AspectRatio>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.approx_eq(b, RATIO_EPSILON),
        _ => false,
    }
}

impl CropView {
    /// Set the restore point that defines the reset snapshot.
    ///
    /// Before setup it is also the initial layout. After setup only the
    /// snapshot changes, which may change [`CropView::can_be_reset`].
    pub fn set_restore_point(&mut self, point: RestorePoint) -> Result<()> {
        let mut point = point;
        if let Some(forced) = self.rules().forced_ratio {
            point.aspect_ratio = Some(forced);
        }
        if !self.is_laid_out() {
            self.basis = Some(point);
            return Ok(());
        }

        self.snapshot = self.layout_default(&point)?;
        self.basis = Some(point);
        self.refresh_session();
        debug!(angle = point.angle.degrees(), "restore point updated");
        Ok(())
    }

    pub fn restore_point(&self) -> Option<&RestorePoint> {
        self.basis.as_ref()
    }

    /// Return to the snapshot.
    ///
    /// When resetting the aspect ratio is disabled (or the style is
    /// circular), the current ratio survives the reset: the snapshot is
    /// re-derived with it, mapped back to the snapshot's orientation.
    pub fn reset_to_default(&mut self, animated: bool) -> Result<Transition> {
        self.ensure_laid_out()?;
        let from = self.state;

        if !self.rules().reset_aspect_ratio {
            let mut basis = self.basis.unwrap_or_default();
            let parity_differs =
                (self.state.angle.quarter_turns() + basis.angle.quarter_turns()) % 2 == 1;
            let ratio = self
                .state
                .aspect_ratio
                .map(|r| if parity_differs { r.swapped() } else { r });
            if !ratios_match(ratio, basis.aspect_ratio) {
                basis.aspect_ratio = ratio;
                basis.image_crop_frame = None;
            }
            self.snapshot = self.layout_default(&basis)?;
            self.basis = Some(basis);
        }

        self.state = self.snapshot;
        self.drag = DragState::Idle;
        self.relayout = None;
        self.refresh_session();

        debug!(angle = self.state.angle.degrees(), "reset to default");
        Ok(Transition {
            from,
            to: self.state,
            animated,
        })
    }

    /// Centre the image on the crop box at the smallest covering zoom. The
    /// crop box itself does not move.
    pub fn move_cropped_content_to_center(&mut self, animated: bool) -> Result<Transition> {
        self.ensure_laid_out()?;
        let from = self.state;
        self.drag = DragState::Idle;
        self.state.viewport = viewport::center_on(&self.state.viewport, &self.state.crop_box);
        self.refresh_session();
        Ok(Transition {
            from,
            to: self.state,
            animated,
        })
    }
}
