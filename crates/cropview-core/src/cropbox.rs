//! Crop box handles, hit-testing and drag geometry.
//!
//! A drag is `Idle -> Dragging -> Idle`. While dragging, every update is
//! applied to the frame captured when the drag began (the *origin frame*)
//! using the total displacement since the drag began, so a burst of updates
//! never accumulates rounding error and an abandoned drag leaves exactly the
//! last applied frame behind.
//!
//! # Clamping order
//!
//! 1. Only the edges implied by the handle move.
//! 2. Width and height stay at or above the minimum box size.
//! 3. The box stays inside the drag bounds (usable region ∩ image frame).
//! 4. With an aspect lock the box is scaled uniformly about an anchor: the
//!    opposite corner for corner handles, the opposite edge plus the top edge
//!    (left/right) or left edge (top/bottom) for edge handles.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::InteractionRules;
use crate::geometry::{Point, Rect};

/// The part of the crop box a drag is manipulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragHandle {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// Move the whole box without resizing it.
    Move,
}

impl DragHandle {
    pub const CORNERS: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub const EDGES: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }

    pub fn is_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom | Self::Left | Self::Right)
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    fn moves_horizontally(self) -> bool {
        self.moves_left() || self.moves_right()
    }

    fn moves_vertically(self) -> bool {
        self.moves_top() || self.moves_bottom()
    }

    /// The handle's reference point on `frame`: a corner, an edge midpoint,
    /// or the centre for [`DragHandle::Move`].
    pub fn anchor_point(self, frame: &Rect) -> Point {
        let x = if self.moves_left() {
            frame.min_x()
        } else if self.moves_right() {
            frame.max_x()
        } else {
            frame.center().x
        };
        let y = if self.moves_top() {
            frame.min_y()
        } else if self.moves_bottom() {
            frame.max_y()
        } else {
            frame.center().y
        };
        Point::new(x, y)
    }
}

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveDrag {
    pub handle: DragHandle,
    /// Touch-down point in viewport space.
    pub start_point: Point,
    /// Crop box at touch-down.
    pub origin_frame: Rect,
    /// Width / height to hold while resizing, when the ratio is locked.
    pub lock_ratio: Option<f64>,
}

/// Crop box drag state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        match self {
            DragState::Dragging(drag) => Some(drag),
            DragState::Idle => None,
        }
    }
}

/// Find the handle under `point`.
///
/// Corners win over edges, edges over the interior. Handles the rules do not
/// permit are skipped, so a touch near a disabled corner still moves the box
/// when it lands inside it.
pub fn hit_test(
    frame: &Rect,
    point: Point,
    tolerance: f64,
    rules: &InteractionRules,
) -> Option<DragHandle> {
    let near = |target: Point| {
        (point.x - target.x).abs() <= tolerance && (point.y - target.y).abs() <= tolerance
    };

    if let Some(corner) = DragHandle::CORNERS
        .into_iter()
        .filter(|h| rules.permits(*h))
        .find(|h| near(h.anchor_point(frame)))
    {
        return Some(corner);
    }

    let within_x = point.x >= frame.min_x() && point.x <= frame.max_x();
    let within_y = point.y >= frame.min_y() && point.y <= frame.max_y();
    let edge = DragHandle::EDGES
        .into_iter()
        .filter(|h| rules.permits(*h))
        .find(|h| match h {
            DragHandle::Top => within_x && (point.y - frame.min_y()).abs() <= tolerance,
            DragHandle::Bottom => within_x && (point.y - frame.max_y()).abs() <= tolerance,
            DragHandle::Left => within_y && (point.x - frame.min_x()).abs() <= tolerance,
            DragHandle::Right => within_y && (point.x - frame.max_x()).abs() <= tolerance,
            _ => false,
        });
    if edge.is_some() {
        return edge;
    }

    frame.contains_point(point).then_some(DragHandle::Move)
}

/// Compute the crop box for a drag that has moved to `point`.
///
/// `bounds` is the region the box must stay inside and `minimum` the smallest
/// allowed width and height.
pub fn drag_frame(drag: &ActiveDrag, point: Point, bounds: &Rect, minimum: f64) -> Rect {
    let delta = point.delta_from(drag.start_point);
    let frame = match (drag.handle, drag.lock_ratio) {
        (DragHandle::Move, _) => move_frame(&drag.origin_frame, delta, bounds),
        (handle, None) => resize_free(&drag.origin_frame, handle, delta, bounds, minimum),
        (handle, Some(ratio)) => {
            resize_locked(&drag.origin_frame, handle, delta, bounds, minimum, ratio)
        }
    };
    trace!(handle = ?drag.handle, ?delta, ?frame, "drag update");
    frame
}

fn move_frame(origin: &Rect, delta: Point, bounds: &Rect) -> Rect {
    let x = (origin.x + delta.x)
        .max(bounds.min_x())
        .min(bounds.max_x() - origin.width);
    let y = (origin.y + delta.y)
        .max(bounds.min_y())
        .min(bounds.max_y() - origin.height);
    Rect::new(x, y, origin.width, origin.height)
}

fn resize_free(origin: &Rect, handle: DragHandle, delta: Point, bounds: &Rect, minimum: f64) -> Rect {
    let mut left = origin.min_x();
    let mut right = origin.max_x();
    let mut top = origin.min_y();
    let mut bottom = origin.max_y();

    // Bounds win over the minimum size when both cannot hold.
    if handle.moves_left() {
        left = (left + delta.x).min(right - minimum).max(bounds.min_x());
    }
    if handle.moves_right() {
        right = (right + delta.x).max(left + minimum).min(bounds.max_x());
    }
    if handle.moves_top() {
        top = (top + delta.y).min(bottom - minimum).max(bounds.min_y());
    }
    if handle.moves_bottom() {
        bottom = (bottom + delta.y).max(top + minimum).min(bounds.max_y());
    }

    Rect::new(left, top, right - left, bottom - top)
}

fn resize_locked(
    origin: &Rect,
    handle: DragHandle,
    delta: Point,
    bounds: &Rect,
    minimum: f64,
    ratio: f64,
) -> Rect {
    // The fixed edges and the direction the box grows away from them.
    let (anchor_x, grows_right) = if handle.moves_left() {
        (origin.max_x(), false)
    } else {
        (origin.min_x(), true)
    };
    let (anchor_y, grows_down) = if handle.moves_top() {
        (origin.max_y(), false)
    } else {
        (origin.min_y(), true)
    };

    let growth_x = if handle.moves_left() { -delta.x } else { delta.x };
    let growth_y = if handle.moves_top() { -delta.y } else { delta.y };

    let desired_width = match (handle.moves_horizontally(), handle.moves_vertically()) {
        (true, false) => origin.width + growth_x,
        (false, true) => (origin.height + growth_y) * ratio,
        _ => {
            let scale = ((origin.width + growth_x) / origin.width
                + (origin.height + growth_y) / origin.height)
                * 0.5;
            origin.width * scale
        }
    };

    let available_width = if grows_right {
        bounds.max_x() - anchor_x
    } else {
        anchor_x - bounds.min_x()
    };
    let available_height = if grows_down {
        bounds.max_y() - anchor_y
    } else {
        anchor_y - bounds.min_y()
    };

    let max_width = available_width.min(available_height * ratio);
    let min_width = minimum.max(minimum * ratio);
    let width = desired_width.max(min_width).min(max_width);
    let height = width / ratio;

    let x = if grows_right { anchor_x } else { anchor_x - width };
    let y = if grows_down { anchor_y } else { anchor_y - height };
    Rect::new(x, y, width, height)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn handle_strategy() -> impl Strategy<Value = DragHandle> {
        prop_oneof![
            Just(DragHandle::Top),
            Just(DragHandle::Bottom),
            Just(DragHandle::Left),
            Just(DragHandle::Right),
            Just(DragHandle::TopLeft),
            Just(DragHandle::TopRight),
            Just(DragHandle::BottomLeft),
            Just(DragHandle::BottomRight),
            Just(DragHandle::Move),
        ]
    }

    /// A frame inside a 1000x1000 bounds with both sides >= 42.
    fn frame_strategy() -> impl Strategy<Value = Rect> {
        (42.0f64..=1000.0, 42.0f64..=1000.0, 0.0f64..=1.0, 0.0f64..=1.0)
            .prop_map(|(w, h, fx, fy)| Rect::new((1000.0 - w) * fx, (1000.0 - h) * fy, w, h))
    }

    proptest! {
        /// Property: any free drag keeps the box inside bounds and above minimum size.
        #[test]
        fn prop_free_drag_contained(
            handle in handle_strategy(),
            origin in frame_strategy(),
            (dx, dy) in (-3000.0f64..3000.0, -3000.0f64..3000.0),
        ) {
            let bounds = Rect::new(0.0, 0.0, 1000.0, 1000.0);
            let drag = ActiveDrag {
                handle,
                start_point: handle.anchor_point(&origin),
                origin_frame: origin,
                lock_ratio: None,
            };
            let end = Point::new(drag.start_point.x + dx, drag.start_point.y + dy);
            let frame = drag_frame(&drag, end, &bounds, 42.0);
            prop_assert!(bounds.contains_rect(&frame, 1e-9), "{:?}", frame);
            prop_assert!(frame.width >= 42.0 - 1e-9);
            prop_assert!(frame.height >= 42.0 - 1e-9);
        }

        /// Property: a locked drag keeps the ratio and stays inside bounds.
        #[test]
        fn prop_locked_drag_keeps_ratio(
            handle in handle_strategy(),
            (w, ratio) in (100.0f64..=500.0, 0.5f64..=2.0),
            (fx, fy) in (0.0f64..=1.0, 0.0f64..=1.0),
            (dx, dy) in (-3000.0f64..3000.0, -3000.0f64..3000.0),
        ) {
            let bounds = Rect::new(0.0, 0.0, 1000.0, 1000.0);
            let size = (w, w / ratio);
            let origin = Rect::new((1000.0 - size.0) * fx, (1000.0 - size.1) * fy, size.0, size.1);
            let drag = ActiveDrag {
                handle,
                start_point: handle.anchor_point(&origin),
                origin_frame: origin,
                lock_ratio: Some(ratio),
            };
            let end = Point::new(drag.start_point.x + dx, drag.start_point.y + dy);
            let frame = drag_frame(&drag, end, &bounds, 42.0);
            prop_assert!(bounds.contains_rect(&frame, 1e-6), "{:?}", frame);
            prop_assert!((frame.width / frame.height - ratio).abs() < 1e-9);
            prop_assert!(frame.width >= 42.0 - 1e-9 && frame.height >= 42.0 - 1e-9);
        }
    }
}
