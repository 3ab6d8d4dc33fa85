//! Viewport controller: zoom scale and content offset.
//!
//! The image is displayed through a zoomable, pannable canvas. Every function
//! here takes the current crop box and returns a new [`ViewportState`] in
//! which the image still covers the whole crop box. Nothing in this module
//! mutates state; the crop view decides when to apply the result.
//!
//! # Re-fit
//!
//! A re-fit raises the scale to at least [`minimum_scale_for`] the crop box,
//! keeps a chosen rotated-image point (normally the one under the crop box
//! centre) under the crop box centre, then clamps the offset so the image
//! frame contains the crop box.

use serde::{Deserialize, Serialize};

use crate::consts::SLACK_EPSILON;
use crate::geometry::{Point, Rect, Size, ViewportState};

/// Where a box sits inside a larger region, as a fraction of the free space
/// on each axis. `0.0` is flush left/top, `1.0` flush right/bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

impl Placement {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// Placement of `frame` inside `region`. Axes without free space count
    /// as centred.
    pub fn of(frame: &Rect, region: &Rect) -> Self {
        let axis = |offset: f64, slack: f64| {
            if slack > SLACK_EPSILON {
                (offset / slack).clamp(0.0, 1.0)
            } else {
                0.5
            }
        };
        Self {
            x: axis(frame.x - region.x, region.width - frame.width),
            y: axis(frame.y - region.y, region.height - frame.height),
        }
    }

    /// The same placement after a quarter turn of the content.
    pub fn rotated(self, clockwise: bool) -> Self {
        if clockwise {
            Self {
                x: 1.0 - self.y,
                y: self.x,
            }
        } else {
            Self {
                x: self.y,
                y: 1.0 - self.x,
            }
        }
    }
}

/// A crop box together with the viewport that displays its region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLayout {
    pub crop_box: Rect,
    pub viewport: ViewportState,
}

/// Smallest scale at which an image of `rotated_image` size covers `crop`.
pub fn minimum_scale_for(crop: Size, rotated_image: Size) -> f64 {
    (crop.width / rotated_image.width).max(crop.height / rotated_image.height)
}

/// Scale at which the whole image fits inside `region`.
pub fn fit_scale(rotated_image: Size, region: Size) -> f64 {
    (region.width / rotated_image.width).min(region.height / rotated_image.height)
}

/// How much of the largest same-shaped box that fits `region` the crop box
/// occupies, in `(0, 1]`.
pub fn fill_fraction(crop_box: &Rect, region: &Rect) -> f64 {
    let fit = (region.width / crop_box.width).min(region.height / crop_box.height);
    (1.0 / fit).min(1.0)
}

/// Re-fit the viewport to the crop box, keeping the box centre's image point.
pub fn refit(viewport: &ViewportState, crop_box: &Rect, maximum_scale: f64) -> ViewportState {
    let anchor = viewport.to_rotated_image(crop_box.center());
    refit_about(viewport, crop_box, anchor, viewport.scale, maximum_scale)
}

/// Re-fit the viewport so that the rotated-image point `anchor` lands on the
/// crop box centre at (approximately) `scale`.
///
/// The scale is clamped into `[minimum, maximum]` and the offset is clamped
/// so the image frame contains the crop box.
pub fn refit_about(
    viewport: &ViewportState,
    crop_box: &Rect,
    anchor: Point,
    scale: f64,
    maximum_scale: f64,
) -> ViewportState {
    let rotated = viewport.rotated_image_size();
    let minimum = minimum_scale_for(crop_box.size(), rotated);
    let maximum = maximum_scale.max(minimum);
    let scale = scale.max(minimum).min(maximum);
    let center = crop_box.center();
    let offset = Point::new(anchor.x * scale - center.x, anchor.y * scale - center.y);
    let content_size = rotated.scaled(scale);

    ViewportState {
        scale,
        content_offset: clamp_offset(offset, crop_box, content_size),
        content_size,
        minimum_scale: minimum,
        maximum_scale: maximum,
    }
}

/// Shift the content by `delta` (in viewport units), as when the user drags
/// the image beneath a fixed crop box.
pub fn pan(viewport: &ViewportState, crop_box: &Rect, delta: Point) -> ViewportState {
    let offset = Point::new(
        viewport.content_offset.x - delta.x,
        viewport.content_offset.y - delta.y,
    );
    ViewportState {
        content_offset: clamp_offset(offset, crop_box, viewport.content_size),
        ..*viewport
    }
}

/// Zoom to `scale`, keeping the content under the viewport point `focus`
/// fixed when possible.
pub fn zoom(viewport: &ViewportState, crop_box: &Rect, scale: f64, focus: Point) -> ViewportState {
    let rotated = viewport.rotated_image_size();
    let minimum = minimum_scale_for(crop_box.size(), rotated);
    let scale = scale.max(minimum).min(viewport.maximum_scale.max(minimum));
    let anchor = viewport.to_rotated_image(focus);
    let offset = Point::new(anchor.x * scale - focus.x, anchor.y * scale - focus.y);
    let content_size = rotated.scaled(scale);

    ViewportState {
        scale,
        content_offset: clamp_offset(offset, crop_box, content_size),
        content_size,
        minimum_scale: minimum,
        maximum_scale: viewport.maximum_scale.max(minimum),
    }
}

/// Minimum covering scale with the image centred on the crop box.
pub fn center_on(viewport: &ViewportState, crop_box: &Rect) -> ViewportState {
    let rotated = viewport.rotated_image_size();
    let anchor = Point::new(rotated.width * 0.5, rotated.height * 0.5);
    let minimum = minimum_scale_for(crop_box.size(), rotated);
    refit_about(viewport, crop_box, anchor, minimum, viewport.maximum_scale)
}

/// Lay out a rotated-image-space `region` inside `usable`.
///
/// The region is scaled to `fill` times the largest scale at which it fits
/// (capped at `maximum_scale`) and positioned by `placement`. The returned
/// viewport maps the region exactly onto the returned crop box.
pub fn layout_region(
    region: &Rect,
    rotated_image: Size,
    usable: &Rect,
    fill: f64,
    placement: Placement,
    maximum_scale: f64,
) -> RegionLayout {
    let fit = fit_scale(region.size(), usable.size());
    let scale = (fit * fill).min(maximum_scale);
    let size = region.size().scaled(scale);
    let crop_box = Rect::new(
        usable.x + (usable.width - size.width) * placement.x,
        usable.y + (usable.height - size.height) * placement.y,
        size.width,
        size.height,
    );
    let content_size = rotated_image.scaled(scale);
    let offset = Point::new(region.x * scale - crop_box.x, region.y * scale - crop_box.y);

    RegionLayout {
        crop_box,
        viewport: ViewportState {
            scale,
            content_offset: clamp_offset(offset, &crop_box, content_size),
            content_size,
            minimum_scale: minimum_scale_for(size, rotated_image),
            maximum_scale: maximum_scale.max(scale),
        },
    }
}

/// Grow `crop_box` about its centre so each side is at least `minimum`, or
/// the full extent of `region` when that is smaller. The result is shifted
/// back inside `region`.
pub fn grow_to_minimum(crop_box: &Rect, region: &Rect, minimum: f64) -> Rect {
    let size = crop_box.size();
    let grown = Size::new(
        size.width.max(minimum.min(region.width)),
        size.height.max(minimum.min(region.height)),
    );
    if grown == size {
        return *crop_box;
    }
    let center = crop_box.center();
    let x = (center.x - grown.width * 0.5)
        .min(region.max_x() - grown.width)
        .max(region.min_x());
    let y = (center.y - grown.height * 0.5)
        .min(region.max_y() - grown.height)
        .max(region.min_y());
    Rect::new(x, y, grown.width, grown.height)
}

/// [`grow_to_minimum`] applied to a laid-out region, re-fitting the viewport
/// when the crop box grew.
pub fn with_minimum_size(
    layout: RegionLayout,
    region: &Rect,
    minimum: f64,
    maximum_scale: f64,
) -> RegionLayout {
    let crop_box = grow_to_minimum(&layout.crop_box, region, minimum);
    if crop_box == layout.crop_box {
        return layout;
    }
    RegionLayout {
        crop_box,
        viewport: refit(&layout.viewport, &crop_box, maximum_scale),
    }
}

/// Clamp an offset so that the image frame `(-offset, content)` contains the
/// crop box.
fn clamp_offset(offset: Point, crop_box: &Rect, content: Size) -> Point {
    Point::new(
        offset
            .x
            .max(-crop_box.min_x())
            .min(content.width - crop_box.max_x()),
        offset
            .y
            .max(-crop_box.min_y())
            .min(content.height - crop_box.max_y()),
    )
}
