//! WASM bindings for the crop view engine.
//!
//! [`JsCropView`] wraps a core `CropView` and mirrors its API with plain
//! numbers. Layouts and transitions are returned as plain JS objects through
//! `serde-wasm-bindgen`.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const view = new JsCropView(4032, 3024, false);
//! view.set_bounds(0, 0, canvas.width, canvas.height);
//! view.perform_initial_setup();
//! view.set_delegate(() => resetButton.enabled = true, () => resetButton.enabled = false);
//!
//! canvas.onpointerdown = (e) => view.begin_drag(undefined, e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => { const box = view.update_drag(e.offsetX, e.offsetY); };
//! canvas.onpointerup = () => view.end_drag();
//! ```

use std::rc::{Rc, Weak};

use cropview_core::{
    AspectRatio, CropConfig, CropView, CropViewDelegate, CroppingStyle, EdgeInsets, Point, Rect,
    RestorePoint, Size,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::{handle_from_name, handle_name, JsRect};

/// Forwards "resettable" transitions to JavaScript callbacks.
struct JsDelegate {
    on_resettable: Option<js_sys::Function>,
    on_non_resettable: Option<js_sys::Function>,
}

impl JsDelegate {
    fn notify(callback: Option<&js_sys::Function>) {
        if let Some(callback) = callback {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                web_sys::console::warn_2(&"crop view delegate threw".into(), &err);
            }
        }
    }
}

impl CropViewDelegate for JsDelegate {
    fn crop_view_did_become_resettable(&self) {
        Self::notify(self.on_resettable.as_ref());
    }

    fn crop_view_did_become_non_resettable(&self) {
        Self::notify(self.on_non_resettable.as_ref());
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(err: cropview_core::CropError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Crop view for JavaScript hosts.
#[wasm_bindgen]
pub struct JsCropView {
    inner: CropView,
    /// The core holds the delegate weakly; this keeps it alive.
    delegate: Option<Rc<JsDelegate>>,
}

#[wasm_bindgen]
impl JsCropView {
    /// Create a crop view for an image of `width` x `height` pixels.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, circular: bool) -> Result<JsCropView, JsValue> {
        let inner = CropView::new(Size::new(width, height), style(circular)).map_err(js_error)?;
        Ok(JsCropView {
            inner,
            delegate: None,
        })
    }

    /// Create a crop view with a configuration object. Missing fields take
    /// their defaults.
    pub fn with_config(
        width: f64,
        height: f64,
        circular: bool,
        config: JsValue,
    ) -> Result<JsCropView, JsValue> {
        let config: CropConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid crop config: {}", e)))?;
        let inner = CropView::with_config(Size::new(width, height), style(circular), config)
            .map_err(js_error)?;
        Ok(JsCropView {
            inner,
            delegate: None,
        })
    }

    /// Register callbacks for "can be reset" transitions. Passing nothing
    /// for both removes the delegate.
    pub fn set_delegate(
        &mut self,
        on_resettable: Option<js_sys::Function>,
        on_non_resettable: Option<js_sys::Function>,
    ) {
        if on_resettable.is_none() && on_non_resettable.is_none() {
            self.delegate = None;
            self.inner.set_delegate(None);
            return;
        }
        let delegate = Rc::new(JsDelegate {
            on_resettable,
            on_non_resettable,
        });
        let weak: Weak<JsDelegate> = Rc::downgrade(&delegate);
        let weak: Weak<dyn CropViewDelegate> = weak;
        self.inner.set_delegate(Some(weak));
        self.delegate = Some(delegate);
    }

    pub fn set_bounds(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner.set_bounds(Rect::new(x, y, width, height));
    }

    pub fn set_crop_region_insets(&mut self, top: f64, left: f64, bottom: f64, right: f64) {
        self.inner
            .set_crop_region_insets(EdgeInsets::new(top, left, bottom, right));
    }

    pub fn perform_initial_setup(&mut self) -> Result<(), JsValue> {
        self.inner.perform_initial_setup().map_err(js_error)?;
        Ok(())
    }

    /// Name of the handle under the point, if any.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<String> {
        self.inner
            .hit_test(Point::new(x, y))
            .map(|h| handle_name(h).to_string())
    }

    /// Start a drag on a named handle, or on whatever is under the point
    /// when `handle` is omitted. Returns the grabbed handle's name.
    pub fn begin_drag(
        &mut self,
        handle: Option<String>,
        x: f64,
        y: f64,
    ) -> Result<Option<String>, JsValue> {
        let handle = match handle.as_deref() {
            Some(name) => Some(
                handle_from_name(name)
                    .ok_or_else(|| JsValue::from_str(&format!("Unknown drag handle: {}", name)))?,
            ),
            None => None,
        };
        Ok(self
            .inner
            .begin_drag(handle, Point::new(x, y))
            .map(|h| handle_name(h).to_string()))
    }

    pub fn update_drag(&mut self, x: f64, y: f64) -> Option<JsRect> {
        self.inner.update_drag(Point::new(x, y)).map(JsRect::from)
    }

    /// Finish the drag. Returns false when no drag was active.
    pub fn end_drag(&mut self) -> bool {
        self.inner.end_drag().is_some()
    }

    pub fn cancel_drag(&mut self) {
        self.inner.cancel_drag();
    }

    /// Apply a `width:height` aspect ratio. Non-positive components clear
    /// it. Returns the transition, or `null` when nothing was laid out.
    pub fn set_aspect_ratio(
        &mut self,
        width: f64,
        height: f64,
        animated: bool,
    ) -> Result<JsValue, JsValue> {
        to_js(&self.inner.set_aspect_ratio(AspectRatio::new(width, height), animated))
    }

    pub fn clear_aspect_ratio(&mut self, animated: bool) -> Result<JsValue, JsValue> {
        to_js(&self.inner.set_aspect_ratio(None, animated))
    }

    pub fn rotate(&mut self, clockwise: bool, animated: bool) -> Result<JsValue, JsValue> {
        let transition = self.inner.rotate(clockwise, animated).map_err(js_error)?;
        to_js(&transition)
    }

    pub fn reset_to_default(&mut self, animated: bool) -> Result<JsValue, JsValue> {
        let transition = self.inner.reset_to_default(animated).map_err(js_error)?;
        to_js(&transition)
    }

    pub fn move_cropped_content_to_center(&mut self, animated: bool) -> Result<JsValue, JsValue> {
        let transition = self
            .inner
            .move_cropped_content_to_center(animated)
            .map_err(js_error)?;
        to_js(&transition)
    }

    pub fn prepare_for_rotation(&mut self) -> Result<(), JsValue> {
        self.inner.prepare_for_rotation().map_err(js_error)
    }

    pub fn perform_relayout_for_rotation(&mut self) -> Result<JsValue, JsValue> {
        let transition = self
            .inner
            .perform_relayout_for_rotation()
            .map_err(js_error)?;
        to_js(&transition)
    }

    pub fn pan_content(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.inner
            .pan_content(Point::new(dx, dy))
            .map_err(js_error)?;
        Ok(())
    }

    pub fn zoom_content(&mut self, scale: f64, focus_x: f64, focus_y: f64) -> Result<(), JsValue> {
        self.inner
            .zoom_content(scale, Point::new(focus_x, focus_y))
            .map_err(js_error)?;
        Ok(())
    }

    pub fn set_image_crop_frame(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), JsValue> {
        self.inner
            .set_image_crop_frame(Rect::new(x, y, width, height))
            .map_err(js_error)?;
        Ok(())
    }

    /// Set the restore point from `{ angle, image_crop_frame, aspect_ratio }`.
    pub fn set_restore_point(&mut self, point: JsValue) -> Result<(), JsValue> {
        let point: RestorePoint = serde_wasm_bindgen::from_value(point)
            .map_err(|e| JsValue::from_str(&format!("Invalid restore point: {}", e)))?;
        self.inner.set_restore_point(point).map_err(js_error)
    }

    pub fn crop_box_frame(&self) -> JsRect {
        self.inner.crop_box_frame().into()
    }

    pub fn image_view_frame(&self) -> JsRect {
        self.inner.image_view_frame().into()
    }

    pub fn image_crop_frame(&self) -> JsRect {
        self.inner.image_crop_frame().into()
    }

    /// Rotation in degrees, one of 0, -90, -180, -270.
    #[wasm_bindgen(getter)]
    pub fn angle(&self) -> i32 {
        self.inner.angle().degrees()
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.viewport().scale
    }

    #[wasm_bindgen(getter)]
    pub fn can_be_reset(&self) -> bool {
        self.inner.can_be_reset()
    }

    #[wasm_bindgen(getter)]
    pub fn crop_box_aspect_ratio_is_portrait(&self) -> bool {
        self.inner.crop_box_aspect_ratio_is_portrait()
    }

    #[wasm_bindgen(getter)]
    pub fn is_laid_out(&self) -> bool {
        self.inner.is_laid_out()
    }

    #[wasm_bindgen(getter)]
    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    pub fn layout(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.layout())
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.snapshot())
    }

    pub fn set_crop_box_resize_enabled(&mut self, enabled: bool) {
        self.inner.set_crop_box_resize_enabled(enabled);
    }

    pub fn set_aspect_ratio_lock_enabled(&mut self, enabled: bool) {
        self.inner.set_aspect_ratio_lock_enabled(enabled);
    }

    pub fn set_reset_aspect_ratio_enabled(&mut self, enabled: bool) {
        self.inner.set_reset_aspect_ratio_enabled(enabled);
    }

    pub fn set_simple_render_mode(&mut self, enabled: bool) {
        self.inner.render_hints_mut().simple_render_mode = enabled;
    }

    pub fn set_internal_layout_disabled(&mut self, disabled: bool) {
        self.inner.render_hints_mut().internal_layout_disabled = disabled;
    }

    pub fn set_cropping_views_hidden(&mut self, hidden: bool) {
        self.inner.render_hints_mut().cropping_views_hidden = hidden;
    }

    pub fn set_grid_overlay_hidden(&mut self, hidden: bool) {
        self.inner.render_hints_mut().grid_overlay_hidden = hidden;
    }

    pub fn set_background_image_hidden(&mut self, hidden: bool) {
        self.inner.render_hints_mut().background_image_hidden = hidden;
    }

    pub fn render_hints(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.render_hints())
    }
}

fn style(circular: bool) -> CroppingStyle {
    if circular {
        CroppingStyle::Circular
    } else {
        CroppingStyle::Rectangular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laid_out() -> JsCropView {
        let mut view = JsCropView::new(1000.0, 1000.0, false).unwrap();
        view.set_bounds(0.0, 0.0, 1028.0, 1028.0);
        view.perform_initial_setup().unwrap();
        view
    }

    #[test]
    fn test_setup_and_frames() {
        let view = laid_out();
        assert!(view.is_laid_out());
        let frame = view.crop_box_frame();
        assert_eq!(frame.x(), 14.0);
        assert_eq!(frame.width(), 1000.0);
        assert_eq!(view.image_crop_frame().width(), 1000.0);
        assert_eq!(view.angle(), 0);
        assert!(!view.can_be_reset());
    }

    #[test]
    fn test_drag_by_hit_test() {
        let mut view = laid_out();
        assert_eq!(view.hit_test(20.0, 20.0).as_deref(), Some("top-left"));
        assert_eq!(
            view.begin_drag(None, 20.0, 20.0).unwrap().as_deref(),
            Some("top-left")
        );
        let frame = view.update_drag(120.0, 20.0).unwrap();
        assert_eq!(frame.x(), 114.0);
        assert!(view.end_drag());
        assert!(view.can_be_reset());
        assert!(!view.end_drag());
    }

    #[test]
    fn test_named_handle_drag() {
        let mut view = laid_out();
        view.begin_drag(Some("bottom".to_string()), 500.0, 1014.0)
            .unwrap();
        let frame = view.update_drag(500.0, 914.0).unwrap();
        assert_eq!(frame.height(), 900.0);
        view.cancel_drag();
        assert!(view.update_drag(0.0, 0.0).is_none());
    }

    #[test]
    fn test_pending_relayout_holds_crop_box() {
        let mut view = laid_out();
        let before = view.crop_box_frame();
        view.prepare_for_rotation().unwrap();
        view.set_bounds(0.0, 0.0, 828.0, 628.0);
        assert_eq!(view.crop_box_frame(), before);
        assert!(view.inner.is_relayout_pending());
    }

    #[test]
    fn test_circular_view() {
        let mut view = JsCropView::new(2000.0, 1000.0, true).unwrap();
        view.set_bounds(0.0, 0.0, 1028.0, 1028.0);
        view.perform_initial_setup().unwrap();
        let frame = view.crop_box_frame();
        assert_eq!(frame.width(), frame.height());
        assert!(!view.crop_box_aspect_ratio_is_portrait());
    }

    #[test]
    fn test_config_flags() {
        let mut view = laid_out();
        view.set_crop_box_resize_enabled(false);
        assert_eq!(
            view.begin_drag(None, 20.0, 20.0).unwrap().as_deref(),
            Some("move")
        );
        view.set_grid_overlay_hidden(true);
        view.set_simple_render_mode(true);
        assert!(view.inner.render_hints().grid_overlay_hidden);

        view.set_delegate(None, None);
        assert!(!view.has_delegate());
    }
}
