//! WASM-compatible wrapper types for crop geometry.
//!
//! Rectangles cross the boundary as [`JsRect`] with plain number getters.
//! Drag handles cross it as kebab-case strings (`"top-left"`, `"right"`,
//! `"move"`, ...).

use cropview_core::{DragHandle, Rect};
use wasm_bindgen::prelude::*;

/// A rectangle in viewport or image coordinates.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl JsRect {
    #[wasm_bindgen(constructor)]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> JsRect {
        JsRect {
            x,
            y,
            width,
            height,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl From<Rect> for JsRect {
    fn from(rect: Rect) -> Self {
        JsRect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

impl From<JsRect> for Rect {
    fn from(rect: JsRect) -> Self {
        Rect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Parse a handle name. Unknown names yield `None`.
pub(crate) fn handle_from_name(name: &str) -> Option<DragHandle> {
    let handle = match name {
        "top-left" => DragHandle::TopLeft,
        "top" => DragHandle::Top,
        "top-right" => DragHandle::TopRight,
        "left" => DragHandle::Left,
        "move" => DragHandle::Move,
        "right" => DragHandle::Right,
        "bottom-left" => DragHandle::BottomLeft,
        "bottom" => DragHandle::Bottom,
        "bottom-right" => DragHandle::BottomRight,
        _ => return None,
    };
    Some(handle)
}

pub(crate) fn handle_name(handle: DragHandle) -> &'static str {
    match handle {
        DragHandle::TopLeft => "top-left",
        DragHandle::Top => "top",
        DragHandle::TopRight => "top-right",
        DragHandle::Left => "left",
        DragHandle::Move => "move",
        DragHandle::Right => "right",
        DragHandle::BottomLeft => "bottom-left",
        DragHandle::Bottom => "bottom",
        DragHandle::BottomRight => "bottom-right",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_rect_conversion() {
        let rect = Rect::new(1.0, 2.0, 30.0, 40.0);
        let js: JsRect = rect.into();
        assert_eq!(js.x(), 1.0);
        assert_eq!(js.height(), 40.0);
        assert_eq!(Rect::from(js), rect);
    }

    #[test]
    fn test_handle_names() {
        let all = DragHandle::CORNERS
            .into_iter()
            .chain(DragHandle::EDGES)
            .chain([DragHandle::Move]);
        for handle in all {
            assert_eq!(handle_from_name(handle_name(handle)), Some(handle));
        }
        assert_eq!(handle_from_name("middle"), None);
    }
}
