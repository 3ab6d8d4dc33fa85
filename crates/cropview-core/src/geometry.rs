//! Geometry primitives shared by every part of the engine.
//!
//! Three coordinate spaces are in play:
//!
//! - **Image space**: raw pixel coordinates of the unrotated image,
//!   `[0, width] × [0, height]`.
//! - **Rotated-image space**: the same pixels after the current quarter-turn
//!   rotation has been applied. Its size is [`rotated_size`] of the image.
//! - **Viewport space**: on-screen coordinates of the crop view, in which the
//!   crop box and the display bounds live.
//!
//! Rotated-image space maps to viewport space through a [`ViewportState`]
//! (uniform scale, then a translation by `-content_offset`). Image space maps to
//! rotated-image space through an [`Angle`] using exact quarter-turn matrices.
//!
//! Origin is top-left and y grows downwards in every space.

use serde::{Deserialize, Serialize};

/// A point in any of the engine's coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        let d = self.delta_from(other);
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    pub fn scaled(self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    pub fn swapped(self) -> Size {
        Size::new(self.height, self.width)
    }

    /// True when either dimension is zero, negative or not finite.
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite())
    }

    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Size::new(width as f64, height as f64)
    }
}

/// Insets reserved on each side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// The same inset on every side.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Component-wise sum.
    pub fn plus(self, other: EdgeInsets) -> EdgeInsets {
        EdgeInsets::new(
            self.top + other.top,
            self.left + other.left,
            self.bottom + other.bottom,
            self.right + other.right,
        )
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// A rectangle at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// The rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// A rectangle of `size` centred on `center`.
    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width * 0.5,
            center.y - size.height * 0.5,
            size.width,
            size.height,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Shrink by the given insets. Dimensions never go below zero.
    pub fn inset(&self, insets: EdgeInsets) -> Rect {
        Rect::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.left - insets.right).max(0.0),
            (self.height - insets.top - insets.bottom).max(0.0),
        )
    }

    /// Overlap of two rectangles, or `None` when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.min_x().max(other.min_x());
        let top = self.min_y().max(other.min_y());
        let right = self.max_x().min(other.max_x());
        let bottom = self.max_y().min(other.max_y());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Whether `other` lies inside `self`, allowing `epsilon` of overshoot.
    pub fn contains_rect(&self, other: &Rect, epsilon: f64) -> bool {
        other.min_x() >= self.min_x() - epsilon
            && other.min_y() >= self.min_y() - epsilon
            && other.max_x() <= self.max_x() + epsilon
            && other.max_y() <= self.max_y() + epsilon
    }

    /// Clamp the rectangle into `bounds`, shrinking it when it is larger.
    pub fn clamped_to(&self, bounds: &Rect) -> Rect {
        let left = self.min_x().clamp(bounds.min_x(), bounds.max_x());
        let top = self.min_y().clamp(bounds.min_y(), bounds.max_y());
        let right = self.max_x().clamp(left, bounds.max_x());
        let bottom = self.max_y().clamp(top, bounds.max_y());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// The largest rectangle with `width / height == ratio` that fits inside
    /// `self`, centred on `self`'s centre.
    pub fn aspect_fit(&self, ratio: f64) -> Rect {
        let size = if self.width / self.height > ratio {
            Size::new(self.height * ratio, self.height)
        } else {
            Size::new(self.width, self.width / ratio)
        };
        Rect::centered_at(self.center(), size)
    }

    /// Edge-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Rect, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

/// A width:height ratio with both components strictly positive.
///
/// An unset ratio is modelled as `Option::<AspectRatio>::None` and means
/// "match the image's native ratio in its current orientation".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub const SQUARE: Self = Self {
        width: 1.0,
        height: 1.0,
    };

    /// Build a ratio. Zero, negative or non-finite components yield `None`,
    /// which callers treat as "unset".
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite();
        valid.then_some(Self { width, height })
    }

    /// Width divided by height.
    pub fn value(self) -> f64 {
        self.width / self.height
    }

    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }

    /// Ratios compare by value, so 4:3 equals 8:6.
    pub fn approx_eq(self, other: AspectRatio, epsilon: f64) -> bool {
        (self.value() - other.value()).abs() <= epsilon
    }
}

/// Rotation of the canvas in quarter turns.
///
/// Stored as non-positive degrees in `{0, -90, -180, -270}`: a
/// counter-clockwise turn subtracts 90, a clockwise turn adds 90, and the
/// result wraps back into `[-270, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Angle(i32);

impl Angle {
    pub const ZERO: Self = Self(0);

    /// Snap any degree value to the nearest quarter turn and wrap it.
    pub fn from_degrees(degrees: i32) -> Self {
        let quarters = (degrees as f64 / 90.0).round() as i32;
        Self(((quarters * 90) % 360 - 360) % 360)
    }

    pub fn degrees(self) -> i32 {
        self.0
    }

    /// Number of counter-clockwise quarter turns, `0..=3`.
    pub fn quarter_turns(self) -> u8 {
        (-self.0 / 90) as u8
    }

    /// The angle after one more quarter turn.
    pub fn rotated(self, clockwise: bool) -> Self {
        Self::from_degrees(self.0 + if clockwise { 90 } else { -90 })
    }

    /// Whether this angle swaps the image's width and height.
    pub fn swaps_axes(self) -> bool {
        self.quarter_turns() % 2 == 1
    }

    /// Map an image-space point into rotated-image space.
    ///
    /// `image` is the unrotated image size.
    pub fn rotate_point_into(self, point: Point, image: Size) -> Point {
        let (w, h) = (image.width, image.height);
        match self.quarter_turns() {
            1 => Point::new(point.y, w - point.x),
            2 => Point::new(w - point.x, h - point.y),
            3 => Point::new(h - point.y, point.x),
            _ => point,
        }
    }

    /// Inverse of [`Angle::rotate_point_into`].
    pub fn rotate_point_out_of(self, point: Point, image: Size) -> Point {
        let (w, h) = (image.width, image.height);
        match self.quarter_turns() {
            1 => Point::new(w - point.y, point.x),
            2 => Point::new(w - point.x, h - point.y),
            3 => Point::new(point.y, h - point.x),
            _ => point,
        }
    }

    /// Map an image-space rectangle into rotated-image space.
    pub fn rotate_rect_into(self, rect: Rect, image: Size) -> Rect {
        Rect::from_corners(
            self.rotate_point_into(rect.origin(), image),
            self.rotate_point_into(Point::new(rect.max_x(), rect.max_y()), image),
        )
    }

    /// Map a rotated-image-space rectangle back into image space.
    pub fn rotate_rect_out_of(self, rect: Rect, image: Size) -> Rect {
        Rect::from_corners(
            self.rotate_point_out_of(rect.origin(), image),
            self.rotate_point_out_of(Point::new(rect.max_x(), rect.max_y()), image),
        )
    }
}

impl From<i32> for Angle {
    fn from(degrees: i32) -> Self {
        Angle::from_degrees(degrees)
    }
}

impl From<Angle> for i32 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

/// How the rotated image is displayed through the viewport.
///
/// `content_offset` translates viewport space into content space:
/// `content = viewport + content_offset`, where content space is
/// rotated-image space multiplied by `scale`. The on-screen image frame is
/// therefore `(-content_offset, content_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub scale: f64,
    pub content_offset: Point,
    pub content_size: Size,
    /// Smallest scale at which the image still covers the crop box.
    pub minimum_scale: f64,
    pub maximum_scale: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            content_offset: Point::ZERO,
            content_size: Size::default(),
            minimum_scale: 1.0,
            maximum_scale: 1.0,
        }
    }
}

impl ViewportState {
    /// The rotated image size this viewport displays.
    pub fn rotated_image_size(&self) -> Size {
        self.content_size.scaled(1.0 / self.scale)
    }

    /// Frame of the whole (rotated, scaled) image in viewport space.
    pub fn image_frame(&self) -> Rect {
        Rect::new(
            -self.content_offset.x,
            -self.content_offset.y,
            self.content_size.width,
            self.content_size.height,
        )
    }

    /// Viewport point to rotated-image point.
    pub fn to_rotated_image(&self, point: Point) -> Point {
        Point::new(
            (point.x + self.content_offset.x) / self.scale,
            (point.y + self.content_offset.y) / self.scale,
        )
    }

    /// Rotated-image point to viewport point.
    pub fn from_rotated_image(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale - self.content_offset.x,
            point.y * self.scale - self.content_offset.y,
        )
    }
}

/// Size of `size` after rotating it by `angle`.
pub fn rotated_size(size: Size, angle: Angle) -> Size {
    if angle.swaps_axes() {
        size.swapped()
    } else {
        size
    }
}

/// Map a viewport-space point to image pixel coordinates.
pub fn image_coordinate(point: Point, viewport: &ViewportState, angle: Angle) -> Point {
    let image = rotated_size(viewport.rotated_image_size(), angle);
    angle.rotate_point_out_of(viewport.to_rotated_image(point), image)
}

/// Map an image pixel coordinate to viewport space.
pub fn viewport_coordinate(point: Point, viewport: &ViewportState, angle: Angle) -> Point {
    let image = rotated_size(viewport.rotated_image_size(), angle);
    viewport.from_rotated_image(angle.rotate_point_into(point, image))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn viewport(scale: f64, offset: Point, rotated: Size) -> ViewportState {
        ViewportState {
            scale,
            content_offset: offset,
            content_size: rotated.scaled(scale),
            minimum_scale: scale,
            maximum_scale: scale * 15.0,
        }
    }

    #[test]
    fn test_angle_wraps_into_non_positive_range() {
        assert_eq!(Angle::from_degrees(0).degrees(), 0);
        assert_eq!(Angle::from_degrees(90).degrees(), -270);
        assert_eq!(Angle::from_degrees(-90).degrees(), -90);
        assert_eq!(Angle::from_degrees(-360).degrees(), 0);
        assert_eq!(Angle::from_degrees(450).degrees(), -270);
        assert_eq!(Angle::from_degrees(-540).degrees(), -180);
    }

    #[test]
    fn test_angle_snaps_to_quarter_turns() {
        assert_eq!(Angle::from_degrees(-100).degrees(), -90);
        assert_eq!(Angle::from_degrees(40).degrees(), 0);
    }

    #[test]
    fn test_angle_rotation_steps() {
        let a = Angle::ZERO.rotated(false);
        assert_eq!(a.degrees(), -90);
        assert_eq!(a.rotated(true), Angle::ZERO);
        assert_eq!(Angle::ZERO.rotated(true).degrees(), -270);

        let mut b = Angle::ZERO;
        for _ in 0..4 {
            b = b.rotated(false);
        }
        assert_eq!(b, Angle::ZERO);
    }

    #[test]
    fn test_rotated_size() {
        let size = Size::new(1000.0, 800.0);
        assert_eq!(rotated_size(size, Angle::ZERO), size);
        assert_eq!(rotated_size(size, Angle::from_degrees(-90)), Size::new(800.0, 1000.0));
        assert_eq!(rotated_size(size, Angle::from_degrees(-180)), size);
        assert_eq!(rotated_size(size, Angle::from_degrees(-270)), Size::new(800.0, 1000.0));
    }

    #[test]
    fn test_quarter_turn_corners() {
        let image = Size::new(100.0, 50.0);
        let top_right = Point::new(100.0, 0.0);

        // Counter-clockwise: the top-right corner becomes top-left.
        let ccw = Angle::from_degrees(-90);
        assert_eq!(ccw.rotate_point_into(top_right, image), Point::new(0.0, 0.0));

        // Clockwise: the top-left corner becomes top-right.
        let cw = Angle::from_degrees(-270);
        assert_eq!(cw.rotate_point_into(Point::ZERO, image), Point::new(50.0, 0.0));

        let half = Angle::from_degrees(-180);
        assert_eq!(half.rotate_point_into(Point::ZERO, image), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_rotate_rect_round_trip() {
        let image = Size::new(1000.0, 800.0);
        let rect = Rect::new(100.0, 50.0, 400.0, 300.0);
        for degrees in [0, -90, -180, -270] {
            let angle = Angle::from_degrees(degrees);
            let rotated = angle.rotate_rect_into(rect, image);
            assert!(Rect::from_size(rotated_size(image, angle)).contains_rect(&rotated, EPSILON));
            let back = angle.rotate_rect_out_of(rotated, image);
            assert!(back.approx_eq(&rect, EPSILON), "angle {degrees}: {back:?}");
        }
    }

    #[test]
    fn test_coordinate_round_trip() {
        let image = Size::new(640.0, 480.0);
        for degrees in [0, -90, -180, -270] {
            let angle = Angle::from_degrees(degrees);
            let v = viewport(0.75, Point::new(-20.0, 13.5), rotated_size(image, angle));
            let p = Point::new(123.25, 87.5);
            let img = image_coordinate(p, &v, angle);
            let back = viewport_coordinate(img, &v, angle);
            assert!(back.distance_to(p) < 1e-9, "angle {degrees}: {back:?}");
        }
    }

    #[test]
    fn test_image_coordinate_identity_viewport() {
        let v = viewport(2.0, Point::new(-10.0, -10.0), Size::new(100.0, 100.0));
        let p = image_coordinate(Point::new(10.0, 10.0), &v, Angle::ZERO);
        assert!(p.distance_to(Point::ZERO) < EPSILON);
        let p = image_coordinate(Point::new(210.0, 110.0), &v, Angle::ZERO);
        assert!(p.distance_to(Point::new(100.0, 50.0)) < EPSILON);
    }

    #[test]
    fn test_aspect_fit_landscape_and_portrait() {
        let region = Rect::new(14.0, 14.0, 1000.0, 1000.0);
        let wide = region.aspect_fit(4.0 / 3.0);
        assert!((wide.width - 1000.0).abs() < EPSILON);
        assert!((wide.height - 750.0).abs() < EPSILON);
        assert!(wide.center().distance_to(region.center()) < EPSILON);

        let tall = region.aspect_fit(0.5);
        assert!((tall.width - 500.0).abs() < EPSILON);
        assert!((tall.height - 1000.0).abs() < EPSILON);
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 60.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 60.0, 50.0, 40.0)));
        assert_eq!(a.intersection(&Rect::new(200.0, 0.0, 10.0, 10.0)), None);
    }

    #[test]
    fn test_rect_inset_never_negative() {
        let r = Rect::new(0.0, 0.0, 20.0, 20.0).inset(EdgeInsets::uniform(14.0));
        assert_eq!(r.width, 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_clamped_to_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = Rect::new(-5.0, 90.0, 20.0, 20.0).clamped_to(&bounds);
        assert_eq!(r, Rect::new(0.0, 90.0, 15.0, 10.0));
    }

    #[test]
    fn test_aspect_ratio_rejects_non_positive() {
        assert!(AspectRatio::new(0.0, 3.0).is_none());
        assert!(AspectRatio::new(4.0, -1.0).is_none());
        assert!(AspectRatio::new(f64::NAN, 1.0).is_none());
        let r = AspectRatio::new(4.0, 3.0).unwrap();
        assert!(r.approx_eq(AspectRatio::new(8.0, 6.0).unwrap(), EPSILON));
        assert!(r.swapped().is_portrait());
    }

    #[test]
    fn test_angle_serde_normalizes() {
        let angle: Angle = serde_json::from_str("90").unwrap();
        assert_eq!(angle.degrees(), -270);
        assert_eq!(serde_json::to_string(&Angle::from_degrees(-180)).unwrap(), "-180");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn angle_strategy() -> impl Strategy<Value = Angle> {
        prop_oneof![Just(0), Just(-90), Just(-180), Just(-270)].prop_map(Angle::from_degrees)
    }

    proptest! {
        /// Property: viewport -> image -> viewport is the identity.
        #[test]
        fn prop_coordinate_round_trip(
            (w, h) in (1.0f64..5000.0, 1.0f64..5000.0),
            scale in 0.01f64..20.0,
            (ox, oy) in (-2000.0f64..2000.0, -2000.0f64..2000.0),
            (px, py) in (0.0f64..2000.0, 0.0f64..2000.0),
            angle in angle_strategy(),
        ) {
            let rotated = rotated_size(Size::new(w, h), angle);
            let v = ViewportState {
                scale,
                content_offset: Point::new(ox, oy),
                content_size: rotated.scaled(scale),
                minimum_scale: scale,
                maximum_scale: scale,
            };
            let p = Point::new(px, py);
            let back = viewport_coordinate(image_coordinate(p, &v, angle), &v, angle);
            let tolerance = 1e-9 * (1.0 + px.abs().max(py.abs()) + ox.abs().max(oy.abs()));
            prop_assert!(back.distance_to(p) <= tolerance * 10.0, "{:?} vs {:?}", back, p);
        }

        /// Property: rotating a point in and out of rotated space is the identity.
        #[test]
        fn prop_rotation_inverse(
            (w, h) in (1.0f64..5000.0, 1.0f64..5000.0),
            (fx, fy) in (0.0f64..=1.0, 0.0f64..=1.0),
            angle in angle_strategy(),
        ) {
            let image = Size::new(w, h);
            let p = Point::new(fx * w, fy * h);
            let back = angle.rotate_point_out_of(angle.rotate_point_into(p, image), image);
            prop_assert!(back.distance_to(p) < 1e-6);
        }

        /// Property: image points stay inside the rotated image bounds.
        #[test]
        fn prop_rotation_stays_in_bounds(
            (w, h) in (1.0f64..5000.0, 1.0f64..5000.0),
            (fx, fy) in (0.0f64..=1.0, 0.0f64..=1.0),
            angle in angle_strategy(),
        ) {
            let image = Size::new(w, h);
            let bounds = Rect::from_size(rotated_size(image, angle));
            let p = angle.rotate_point_into(Point::new(fx * w, fy * h), image);
            prop_assert!(bounds.contains_rect(&Rect::from_origin_size(p, Size::default()), 1e-6));
        }
    }
}
