//! Apply a crop selection to real pixels.
//!
//! The engine itself only produces geometry. Hosts that also hold the decoded
//! image can turn [`CropView::image_crop_frame`](crate::CropView::image_crop_frame)
//! and [`CropView::angle`](crate::CropView::angle) into output pixels here.
//!
//! # Behavior
//!
//! - The frame is rounded to whole pixels and clamped to the image
//! - Minimum output dimension is 1x1 pixels
//! - The crop happens in image space, the quarter turns are applied after
//! - A circular crop keeps the pixels inside the inscribed ellipse and makes
//!   the rest transparent

use image::{DynamicImage, GenericImageView, Rgba};
use tracing::debug;

use crate::geometry::{Angle, Rect};

/// Whole-pixel crop rectangle `(left, top, width, height)` for `frame`
/// inside an image of `width` x `height`.
pub fn pixel_rect(frame: &Rect, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let left = (frame.min_x().max(0.0).round() as u32).min(width.saturating_sub(1));
    let top = (frame.min_y().max(0.0).round() as u32).min(height.saturating_sub(1));
    let right = (frame.max_x().max(0.0).round() as u32).min(width);
    let bottom = (frame.max_y().max(0.0).round() as u32).min(height);

    let out_width = right.saturating_sub(left).max(1);
    let out_height = bottom.saturating_sub(top).max(1);
    (left, top, out_width, out_height)
}

/// Crop `image` to `frame` (image pixels) and turn the result by `angle`.
pub fn crop_image(image: &DynamicImage, frame: &Rect, angle: Angle, circular: bool) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (left, top, out_width, out_height) = pixel_rect(frame, width, height);

    let cropped = if left == 0 && top == 0 && out_width == width && out_height == height {
        image.clone()
    } else {
        image.crop_imm(left, top, out_width, out_height)
    };

    // Angles count counter-clockwise turns; the image crate's rotations are
    // clockwise.
    let turned = match angle.quarter_turns() {
        1 => cropped.rotate270(),
        2 => cropped.rotate180(),
        3 => cropped.rotate90(),
        _ => cropped,
    };

    debug!(
        left,
        top,
        out_width,
        out_height,
        angle = angle.degrees(),
        circular,
        "exported crop"
    );

    if circular {
        clip_to_ellipse(&turned)
    } else {
        turned
    }
}

fn clip_to_ellipse(image: &DynamicImage) -> DynamicImage {
    let mut rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let rx = width as f64 / 2.0;
    let ry = height as f64 / 2.0;

    for (x, y, pixel) in rgba.enumerate_pixels_mut() {
        // Sample at pixel centres.
        let dx = (x as f64 + 0.5 - rx) / rx;
        let dy = (y as f64 + 0.5 - ry) / ry;
        if dx * dx + dy * dy > 1.0 {
            *pixel = Rgba([pixel[0], pixel[1], pixel[2], 0]);
        }
    }
    DynamicImage::ImageRgba8(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    /// Red channel encodes the column, green the row.
    fn gradient(width: u32, height: u32) -> DynamicImage {
        let buffer: RgbImage =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([x as u8 * 10, y as u8 * 10, 0]));
        DynamicImage::ImageRgb8(buffer)
    }

    #[test]
    fn test_full_frame_is_copy() {
        let image = gradient(4, 2);
        let out = crop_image(&image, &Rect::new(0.0, 0.0, 4.0, 2.0), Angle::ZERO, false);
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(out.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_crop_region() {
        let image = gradient(10, 10);
        let out = crop_image(&image, &Rect::new(2.0, 3.0, 4.0, 5.0), Angle::ZERO, false);
        assert_eq!(out.dimensions(), (4, 5));
        assert_eq!(out.get_pixel(0, 0).0, [20, 30, 0, 255]);
    }

    #[test]
    fn test_frame_is_clamped_with_minimum_size() {
        assert_eq!(pixel_rect(&Rect::new(-5.0, -5.0, 20.0, 20.0), 10, 10), (0, 0, 10, 10));
        assert_eq!(pixel_rect(&Rect::new(9.8, 3.0, 0.1, 0.1), 10, 10), (9, 3, 1, 1));
    }

    #[test]
    fn test_quarter_turns() {
        let image = gradient(4, 2);
        let frame = Rect::new(0.0, 0.0, 4.0, 2.0);

        // -90 is a counter-clockwise turn: the top-right pixel ends up top-left.
        let ccw = crop_image(&image, &frame, Angle::from_degrees(-90), false);
        assert_eq!(ccw.dimensions(), (2, 4));
        assert_eq!(ccw.get_pixel(0, 0).0, [30, 0, 0, 255]);

        let half = crop_image(&image, &frame, Angle::from_degrees(-180), false);
        assert_eq!(half.dimensions(), (4, 2));
        assert_eq!(half.get_pixel(0, 0).0, [30, 10, 0, 255]);

        // -270 is a clockwise turn: the bottom-left pixel ends up top-left.
        let cw = crop_image(&image, &frame, Angle::from_degrees(-270), false);
        assert_eq!(cw.dimensions(), (2, 4));
        assert_eq!(cw.get_pixel(0, 0).0, [0, 10, 0, 255]);
    }

    #[test]
    fn test_circular_clip() {
        let image = gradient(20, 20);
        let out = crop_image(&image, &Rect::new(0.0, 0.0, 20.0, 20.0), Angle::ZERO, true);
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(19, 19).0[3], 0);
        assert_eq!(out.get_pixel(10, 10).0[3], 255);
        assert_eq!(out.get_pixel(10, 0).0[3], 255);
    }
}
