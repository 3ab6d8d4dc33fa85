//! The crop view engine.
//!
//! [`CropView`] owns the single mutable state tuple (crop box, viewport,
//! angle, aspect ratio) for one image. The host drives it from its
//! interaction loop and re-renders from the geometry it reads back.
//!
//! # Lifecycle
//!
//! 1. [`CropView::new`] with the image size and cropping style.
//! 2. [`CropView::set_bounds`] once the host knows its display region.
//! 3. [`CropView::perform_initial_setup`] to lay out the image and take the
//!    reset snapshot.
//! 4. Drags, aspect ratio changes, rotations and resets.
//!
//! Operations that produce a new layout in one step return a [`Transition`];
//! the engine never animates, the host interpolates between `from` and `to`
//! when `animated` is set.
//!
//! Rotation and relayout live in [`crate::rotation`], reset and restore in
//! [`crate::restore`].

use std::rc::Weak;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{CropConfig, CroppingStyle, InteractionRules, RenderHints};
use crate::consts::SLACK_EPSILON;
use crate::cropbox::{self, ActiveDrag, DragHandle, DragState};
use crate::error::{CropError, Result};
use crate::geometry::{
    image_coordinate, rotated_size, Angle, AspectRatio, EdgeInsets, Point, Rect, Size,
    ViewportState,
};
use crate::restore::{LayoutState, RestorePoint};
use crate::rotation::RelayoutCapture;
use crate::session::{CropViewDelegate, EditSession};
use crate::viewport::{self, Placement};

/// Start and end layouts of a one-step operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: LayoutState,
    pub to: LayoutState,
    /// The host asked for the change to be animated.
    pub animated: bool,
}

/// Crop-box geometry engine for a single image.
#[derive(Debug)]
pub struct CropView {
    image: Size,
    style: CroppingStyle,
    config: CropConfig,
    hints: RenderHints,
    bounds: Rect,
    pub(crate) state: LayoutState,
    pub(crate) snapshot: LayoutState,
    /// What the snapshot is derived from.
    pub(crate) basis: Option<RestorePoint>,
    pub(crate) drag: DragState,
    pub(crate) relayout: Option<RelayoutCapture>,
    session: EditSession,
    laid_out: bool,
}

impl CropView {
    /// Create a crop view with the default configuration.
    pub fn new(image: Size, style: CroppingStyle) -> Result<Self> {
        Self::with_config(image, style, CropConfig::default())
    }

    pub fn with_config(image: Size, style: CroppingStyle, config: CropConfig) -> Result<Self> {
        if image.is_empty() {
            return Err(CropError::InvalidImageSize {
                width: image.width,
                height: image.height,
            });
        }

        let state = LayoutState {
            crop_box: Rect::default(),
            viewport: ViewportState::default(),
            angle: Angle::ZERO,
            aspect_ratio: config.rules(style).forced_ratio,
        };

        Ok(Self {
            image,
            style,
            config,
            hints: RenderHints::default(),
            bounds: Rect::default(),
            state,
            snapshot: state,
            basis: None,
            drag: DragState::Idle,
            relayout: None,
            session: EditSession::default(),
            laid_out: false,
        })
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn cropping_style(&self) -> CroppingStyle {
        self.style
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn rules(&self) -> InteractionRules {
        self.config.rules(self.style)
    }

    pub fn render_hints(&self) -> &RenderHints {
        &self.hints
    }

    /// Rendering hints for the host's renderer. Changing them never moves
    /// anything.
    pub fn render_hints_mut(&mut self) -> &mut RenderHints {
        &mut self.hints
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Display bounds minus padding and host insets.
    pub fn usable_region(&self) -> Rect {
        self.bounds.inset(self.config.reserved_insets())
    }

    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    pub fn crop_box_frame(&self) -> Rect {
        self.state.crop_box
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.state.viewport
    }

    /// Frame of the whole displayed image in viewport space.
    pub fn image_view_frame(&self) -> Rect {
        self.state.viewport.image_frame()
    }

    pub fn angle(&self) -> Angle {
        self.state.angle
    }

    /// The locked or applied aspect ratio; `None` means the image's own.
    pub fn aspect_ratio(&self) -> Option<AspectRatio> {
        self.state.aspect_ratio
    }

    pub fn layout(&self) -> &LayoutState {
        &self.state
    }

    /// The layout a reset returns to.
    pub fn snapshot(&self) -> &LayoutState {
        &self.snapshot
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn can_be_reset(&self) -> bool {
        self.session.is_resettable()
    }

    pub fn crop_box_aspect_ratio_is_portrait(&self) -> bool {
        self.state.crop_box.size().is_portrait()
    }

    /// The crop box in image pixel coordinates, clamped to the image.
    ///
    /// Before initial setup this is the whole image.
    pub fn image_crop_frame(&self) -> Rect {
        let image_rect = Rect::from_size(self.image);
        if !self.laid_out {
            return image_rect;
        }
        let b = self.state.crop_box;
        let v = &self.state.viewport;
        let a = image_coordinate(b.origin(), v, self.state.angle);
        let c = image_coordinate(Point::new(b.max_x(), b.max_y()), v, self.state.angle);
        Rect::from_corners(a, c).clamped_to(&image_rect)
    }

    pub fn set_delegate(&mut self, delegate: Option<Weak<dyn CropViewDelegate>>) {
        self.session.set_delegate(delegate);
    }

    /// Turning resizing off ends any resize drag in progress.
    pub fn set_crop_box_resize_enabled(&mut self, enabled: bool) {
        self.config.crop_box_resize_enabled = enabled;
        if !enabled && self.drag.active().is_some_and(|d| d.handle != DragHandle::Move) {
            self.drag = DragState::Idle;
        }
    }

    pub fn set_aspect_ratio_lock_enabled(&mut self, enabled: bool) {
        self.config.aspect_ratio_lock_enabled = enabled;
    }

    pub fn set_reset_aspect_ratio_enabled(&mut self, enabled: bool) {
        self.config.reset_aspect_ratio_enabled = enabled;
    }

    /// Reserve space for accessory UI. After setup the current selection is
    /// refitted into the new usable region.
    pub fn set_crop_region_insets(&mut self, insets: EdgeInsets) {
        self.config.crop_region_insets = insets;
        self.relayout_for_region_change();
    }

    /// Set the display region in viewport coordinates.
    ///
    /// After setup the current selection is refitted into the new region,
    /// unless a two-phase rotation relayout is pending, in which case
    /// [`CropView::perform_relayout_for_rotation`] does it.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.relayout_for_region_change();
    }

    /// Lay out the image in the current bounds and take the reset snapshot.
    ///
    /// A restore point set earlier, or an aspect ratio set earlier, is
    /// applied here.
    pub fn perform_initial_setup(&mut self) -> Result<LayoutState> {
        let rules = self.rules();
        let mut basis = self.basis.unwrap_or(RestorePoint {
            aspect_ratio: self.state.aspect_ratio,
            ..RestorePoint::default()
        });
        if rules.forced_ratio.is_some() {
            basis.aspect_ratio = rules.forced_ratio;
        }

        let layout = self.layout_default(&basis)?;
        self.basis = Some(basis);
        self.state = layout;
        self.snapshot = layout;
        self.drag = DragState::Idle;
        self.relayout = None;
        self.laid_out = true;
        self.refresh_session();

        debug!(
            crop_box = ?layout.crop_box,
            scale = layout.viewport.scale,
            angle = layout.angle.degrees(),
            "initial layout"
        );
        Ok(layout)
    }

    /// The handle a touch at `point` would grab, if any.
    pub fn hit_test(&self, point: Point) -> Option<DragHandle> {
        if !self.laid_out {
            return None;
        }
        cropbox::hit_test(
            &self.state.crop_box,
            point,
            self.config.hit_tolerance,
            &self.rules(),
        )
    }

    /// Start a drag. With `handle == None` the handle is hit-tested at
    /// `point`. Returns the grabbed handle, or `None` when nothing can be
    /// dragged there.
    pub fn begin_drag(&mut self, handle: Option<DragHandle>, point: Point) -> Option<DragHandle> {
        if !self.laid_out {
            warn!("begin_drag before initial setup");
            return None;
        }
        let rules = self.rules();
        let handle = match handle {
            Some(handle) => handle,
            None => self.hit_test(point)?,
        };
        if !rules.permits(handle) {
            debug!(?handle, "drag handle not permitted");
            return None;
        }

        let origin_frame = self.state.crop_box;
        let lock_ratio = rules.aspect_locked.then(|| {
            rules
                .forced_ratio
                .or(self.state.aspect_ratio)
                .map(AspectRatio::value)
                .unwrap_or_else(|| origin_frame.size().aspect())
        });

        self.drag = DragState::Dragging(ActiveDrag {
            handle,
            start_point: point,
            origin_frame,
            lock_ratio,
        });
        debug!(?handle, ?point, "drag began");
        Some(handle)
    }

    /// Move the active drag to `point`. Returns the new crop box, or `None`
    /// without an active drag.
    pub fn update_drag(&mut self, point: Point) -> Option<Rect> {
        let Some(active) = self.drag.active().copied() else {
            warn!("update_drag without an active drag");
            return None;
        };
        let frame = cropbox::drag_frame(
            &active,
            point,
            &self.drag_bounds(),
            self.config.minimum_box_size,
        );
        self.state.crop_box = frame;
        self.refresh_session();
        Some(frame)
    }

    /// Finish the active drag and re-fit the viewport.
    pub fn end_drag(&mut self) -> Option<LayoutState> {
        if !self.drag.is_dragging() {
            warn!("end_drag without an active drag");
            return None;
        }
        self.drag = DragState::Idle;
        self.refit();
        self.refresh_session();
        debug!(crop_box = ?self.state.crop_box, "drag ended");
        Some(self.state)
    }

    /// Abandon the active drag. Updates already applied stay applied.
    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Apply an aspect ratio, or the image's own with `None`.
    ///
    /// The crop box becomes the largest box of that ratio centred in the
    /// usable region and the viewport is refitted around the content that
    /// was at the centre of the old box. Before setup the ratio is stored and
    /// `None` is returned; with circular style the request is ignored. A
    /// ratio whose box would have a side below the minimum size is refused.
    pub fn set_aspect_ratio(
        &mut self,
        ratio: Option<AspectRatio>,
        animated: bool,
    ) -> Option<Transition> {
        if self.rules().forced_ratio.is_some() {
            debug!("aspect ratio is fixed by the cropping style");
            return None;
        }
        if !self.laid_out {
            self.state.aspect_ratio = ratio;
            return None;
        }
        if let Some(ratio) = ratio.filter(|r| !self.ratio_fits(r.value())) {
            warn!(
                ratio = ratio.value(),
                usable = ?self.usable_region(),
                "aspect ratio too extreme for the minimum crop box"
            );
            return None;
        }

        let from = self.state;
        let target = ratio
            .map(AspectRatio::value)
            .unwrap_or_else(|| self.rotated_image_size().aspect());
        let anchor = self
            .state
            .viewport
            .to_rotated_image(self.state.crop_box.center());

        self.drag = DragState::Idle;
        self.state.aspect_ratio = ratio;
        let usable = self.usable_region();
        self.state.crop_box = usable.aspect_fit(target);
        if ratio.is_none() {
            self.state.crop_box = viewport::grow_to_minimum(
                &self.state.crop_box,
                &usable,
                self.config.minimum_box_size,
            );
        }
        self.state.viewport = viewport::refit_about(
            &self.state.viewport,
            &self.state.crop_box,
            anchor,
            self.state.viewport.scale,
            self.maximum_scale(),
        );
        self.refresh_session();

        debug!(ratio = target, crop_box = ?self.state.crop_box, "aspect ratio applied");
        Some(Transition {
            from,
            to: self.state,
            animated,
        })
    }

    /// Pan the image under the crop box by `delta` viewport units.
    pub fn pan_content(&mut self, delta: Point) -> Result<ViewportState> {
        self.ensure_laid_out()?;
        self.state.viewport = viewport::pan(&self.state.viewport, &self.state.crop_box, delta);
        self.refresh_session();
        Ok(self.state.viewport)
    }

    /// Zoom the image to `scale` about the viewport point `focus`.
    pub fn zoom_content(&mut self, scale: f64, focus: Point) -> Result<ViewportState> {
        self.ensure_laid_out()?;
        self.state.viewport =
            viewport::zoom(&self.state.viewport, &self.state.crop_box, scale, focus);
        self.refresh_session();
        Ok(self.state.viewport)
    }

    /// Select an image-space region directly. It is fitted into the usable
    /// region, centred.
    ///
    /// While the aspect ratio is locked the region is first narrowed about
    /// its centre to the ratio in force.
    pub fn set_image_crop_frame(&mut self, frame: Rect) -> Result<LayoutState> {
        self.ensure_laid_out()?;
        let mut region = frame
            .intersection(&Rect::from_size(self.image))
            .ok_or_else(|| CropError::FrameOutsideImage(format!("{frame:?}")))?;
        let rules = self.rules();
        let locked = rules
            .forced_ratio
            .or_else(|| self.state.aspect_ratio.filter(|_| rules.aspect_locked));
        if let Some(ratio) = locked {
            // The ratio describes the displayed box; the region is unrotated.
            let ratio = if self.state.angle.swaps_axes() {
                ratio.swapped()
            } else {
                ratio
            };
            region = region.aspect_fit(ratio.value());
        }
        self.drag = DragState::Idle;
        self.apply_image_region(&region, 1.0, Placement::CENTER);
        self.refresh_session();
        Ok(self.state)
    }

    pub(crate) fn ensure_laid_out(&self) -> Result<()> {
        if self.laid_out {
            Ok(())
        } else {
            Err(CropError::NotLaidOut)
        }
    }

    pub(crate) fn rotated_image_size(&self) -> Size {
        rotated_size(self.image, self.state.angle)
    }

    /// Maximum zoom for the current orientation and usable region.
    pub(crate) fn maximum_scale(&self) -> f64 {
        self.maximum_scale_for(self.rotated_image_size(), &self.usable_region())
    }

    fn maximum_scale_for(&self, rotated: Size, usable: &Rect) -> f64 {
        viewport::fit_scale(rotated, usable.size()) * self.config.maximum_zoom_factor
    }

    /// Where a dragged crop box may go: the usable region, limited to the
    /// part covered by the image.
    fn drag_bounds(&self) -> Rect {
        let usable = self.usable_region();
        usable
            .intersection(&self.state.viewport.image_frame())
            .unwrap_or(usable)
    }

    pub(crate) fn refit(&mut self) {
        self.state.viewport =
            viewport::refit(&self.state.viewport, &self.state.crop_box, self.maximum_scale());
    }

    /// Whether the largest box of `ratio` in the usable region keeps both
    /// sides at the minimum size, or at the region's extent when that is
    /// smaller.
    pub(crate) fn ratio_fits(&self, ratio: f64) -> bool {
        let usable = self.usable_region();
        if usable.is_empty() {
            return true;
        }
        let minimum = self.config.minimum_box_size;
        let fitted = usable.aspect_fit(ratio);
        fitted.width + SLACK_EPSILON >= minimum.min(usable.width)
            && fitted.height + SLACK_EPSILON >= minimum.min(usable.height)
    }

    /// Fit an image-space region into the usable region at the current angle.
    ///
    /// The crop box is kept at the minimum size. A set ratio whose box can no
    /// longer reach it is dropped. The box grows proportionally first; only a
    /// forced ratio is never grown per axis.
    pub(crate) fn apply_image_region(&mut self, region: &Rect, fill: f64, placement: Placement) {
        let rotated = self.rotated_image_size();
        let usable = self.usable_region();
        let minimum = self.config.minimum_box_size;
        let maximum_scale = self.maximum_scale_for(rotated, &usable);
        let forced = self.rules().forced_ratio.is_some();
        if let Some(ratio) = self.state.aspect_ratio {
            if !forced && !self.ratio_fits(ratio.value()) {
                warn!(ratio = ratio.value(), "dropping aspect ratio below the minimum crop box");
                self.state.aspect_ratio = None;
            }
        }

        let rotated_region = self.state.angle.rotate_rect_into(*region, self.image);
        let shortest = rotated_region.width.min(rotated_region.height)
            * viewport::fit_scale(rotated_region.size(), usable.size());
        let fill = if shortest > 0.0 {
            fill.max(minimum / shortest).min(1.0)
        } else {
            fill
        };
        let mut layout = viewport::layout_region(
            &rotated_region,
            rotated,
            &usable,
            fill,
            placement,
            maximum_scale,
        );
        if !forced {
            layout = viewport::with_minimum_size(layout, &usable, minimum, maximum_scale);
        }
        self.state.crop_box = layout.crop_box;
        self.state.viewport = layout.viewport;
    }

    /// The default layout described by `basis` in the current bounds.
    pub(crate) fn layout_default(&self, basis: &RestorePoint) -> Result<LayoutState> {
        let usable = self.usable_region();
        if usable.is_empty() {
            return Err(CropError::EmptyCropRegion {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }

        let angle = basis.angle;
        let forced = self.rules().forced_ratio.is_some();
        let aspect_ratio = match basis.aspect_ratio {
            Some(ratio) if !forced && !self.ratio_fits(ratio.value()) => {
                warn!(ratio = ratio.value(), "ignoring aspect ratio below the minimum crop box");
                None
            }
            other => other,
        };
        let rotated = rotated_size(self.image, angle);
        let region = match basis
            .image_crop_frame
            .and_then(|frame| frame.intersection(&Rect::from_size(self.image)))
        {
            Some(frame) => angle.rotate_rect_into(frame, self.image),
            None => {
                let full = Rect::from_size(rotated);
                match aspect_ratio {
                    Some(ratio) => full.aspect_fit(ratio.value()),
                    None => full,
                }
            }
        };

        let maximum_scale = self.maximum_scale_for(rotated, &usable);
        let mut layout = viewport::layout_region(
            &region,
            rotated,
            &usable,
            1.0,
            Placement::CENTER,
            maximum_scale,
        );
        if !forced {
            layout = viewport::with_minimum_size(
                layout,
                &usable,
                self.config.minimum_box_size,
                maximum_scale,
            );
        }
        Ok(LayoutState {
            crop_box: layout.crop_box,
            viewport: layout.viewport,
            angle,
            aspect_ratio,
        })
    }

    /// Recompute the snapshot for the current bounds.
    pub(crate) fn rebuild_snapshot(&mut self) -> Result<()> {
        let basis = self.basis.unwrap_or_default();
        self.snapshot = self.layout_default(&basis)?;
        Ok(())
    }

    pub(crate) fn refresh_session(&mut self) {
        let differs = self.state.differs_from(&self.snapshot);
        self.session.observe(differs);
    }

    fn relayout_for_region_change(&mut self) {
        if !self.laid_out || self.relayout.is_some() {
            return;
        }
        if let Err(err) = self.rebuild_snapshot() {
            warn!(%err, "skipping relayout");
            return;
        }
        let region = self.image_crop_frame();
        self.drag = DragState::Idle;
        self.apply_image_region(&region, 1.0, Placement::CENTER);
        self.refresh_session();
        debug!(usable = ?self.usable_region(), "relayout after region change");
    }
}
