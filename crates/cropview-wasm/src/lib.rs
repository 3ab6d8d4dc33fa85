//! Cropview WASM - WebAssembly bindings for the crop view engine
//!
//! This crate exposes the cropview-core geometry engine to JavaScript and
//! TypeScript hosts that render the crop UI themselves.
//!
//! # Module Structure
//!
//! - `view` - The `JsCropView` engine wrapper and JS delegate callbacks
//! - `types` - WASM-compatible wrapper types for rectangles and handles
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropView } from '@cropview/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const view = new JsCropView(image.width, image.height, false);
//! view.set_bounds(0, 0, canvas.width, canvas.height);
//! view.perform_initial_setup();
//! const region = view.image_crop_frame();
//! ```

use wasm_bindgen::prelude::*;

mod types;
mod view;

// Re-export public types
pub use types::JsRect;
pub use view::JsCropView;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
