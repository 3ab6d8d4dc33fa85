//! Crop view configuration and the interaction rules derived from it.
//!
//! The flags interact: circular style forces a square, locked ratio and turns
//! off edge handles; `crop_box_resize_enabled` turns off every resize handle;
//! reset only restores the ratio when `reset_aspect_ratio_enabled` is set and
//! the style is not circular. [`CropConfig::rules`] resolves all of this once
//! so mutation sites consult a single [`InteractionRules`] value.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_HIT_TOLERANCE, DEFAULT_MAXIMUM_ZOOM_FACTOR, DEFAULT_MINIMUM_BOX_SIZE, DEFAULT_PADDING,
};
use crate::cropbox::DragHandle;
use crate::geometry::{AspectRatio, EdgeInsets};

/// Shape of the crop region. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CroppingStyle {
    /// The regular, rectangular crop box.
    #[default]
    Rectangular,
    /// A fixed-ratio circular crop region, inscribed in a square box.
    Circular,
}

/// Host-adjustable settings of a crop view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// When false only whole-box moves are allowed.
    pub crop_box_resize_enabled: bool,
    /// Keep the crop box at its current (or configured) ratio while resizing.
    pub aspect_ratio_lock_enabled: bool,
    /// Whether a reset also restores the aspect ratio.
    pub reset_aspect_ratio_enabled: bool,
    /// Insets reserved for accessory UI around the crop region.
    pub crop_region_insets: EdgeInsets,
    /// Fixed padding between the display bounds and the crop region.
    pub padding: f64,
    pub minimum_box_size: f64,
    pub hit_tolerance: f64,
    /// Maximum zoom relative to the scale that fits the whole image.
    pub maximum_zoom_factor: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            crop_box_resize_enabled: true,
            aspect_ratio_lock_enabled: false,
            reset_aspect_ratio_enabled: true,
            crop_region_insets: EdgeInsets::ZERO,
            padding: DEFAULT_PADDING,
            minimum_box_size: DEFAULT_MINIMUM_BOX_SIZE,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
            maximum_zoom_factor: DEFAULT_MAXIMUM_ZOOM_FACTOR,
        }
    }
}

impl CropConfig {
    /// Resolve the flag cross-effects for a cropping style.
    pub fn rules(&self, style: CroppingStyle) -> InteractionRules {
        let circular = style == CroppingStyle::Circular;
        InteractionRules {
            resize_enabled: self.crop_box_resize_enabled,
            edge_handles_enabled: !circular,
            aspect_locked: circular || self.aspect_ratio_lock_enabled,
            reset_aspect_ratio: self.reset_aspect_ratio_enabled && !circular,
            forced_ratio: circular.then_some(AspectRatio::SQUARE),
        }
    }

    /// Padding plus host insets: everything reserved around the crop region.
    pub fn reserved_insets(&self) -> EdgeInsets {
        EdgeInsets::uniform(self.padding).plus(self.crop_region_insets)
    }
}

/// Effective interaction rules at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRules {
    pub resize_enabled: bool,
    pub edge_handles_enabled: bool,
    pub aspect_locked: bool,
    pub reset_aspect_ratio: bool,
    /// A ratio imposed by the style that the host cannot change.
    pub forced_ratio: Option<AspectRatio>,
}

impl InteractionRules {
    /// Whether a drag may start on `handle`.
    pub fn permits(&self, handle: DragHandle) -> bool {
        match handle {
            DragHandle::Move => true,
            h if h.is_corner() => self.resize_enabled,
            _ => self.resize_enabled && self.edge_handles_enabled,
        }
    }
}

/// Rendering hints passed through to the host's renderer.
///
/// None of these has any effect on geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderHints {
    /// Skip expensive effects such as translucency during large transitions.
    pub simple_render_mode: bool,
    /// The host is laying views out manually.
    pub internal_layout_disabled: bool,
    pub cropping_views_hidden: bool,
    pub grid_overlay_hidden: bool,
    pub background_image_hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CropConfig::default();
        assert!(config.crop_box_resize_enabled);
        assert!(!config.aspect_ratio_lock_enabled);
        assert!(config.reset_aspect_ratio_enabled);
        assert_eq!(config.padding, 14.0);
        assert_eq!(config.minimum_box_size, 42.0);
    }

    #[test]
    fn test_rectangular_rules() {
        let rules = CropConfig::default().rules(CroppingStyle::Rectangular);
        assert!(rules.permits(DragHandle::Top));
        assert!(rules.permits(DragHandle::BottomRight));
        assert!(!rules.aspect_locked);
        assert!(rules.reset_aspect_ratio);
        assert!(rules.forced_ratio.is_none());
    }

    #[test]
    fn test_circular_rules() {
        let rules = CropConfig::default().rules(CroppingStyle::Circular);
        assert!(!rules.permits(DragHandle::Left));
        assert!(rules.permits(DragHandle::TopLeft));
        assert!(rules.permits(DragHandle::Move));
        assert!(rules.aspect_locked);
        assert!(!rules.reset_aspect_ratio);
        assert_eq!(rules.forced_ratio, Some(AspectRatio::SQUARE));
    }

    #[test]
    fn test_resize_disabled_only_permits_move() {
        let mut config = CropConfig::default();
        config.crop_box_resize_enabled = false;
        let rules = config.rules(CroppingStyle::Rectangular);
        assert!(rules.permits(DragHandle::Move));
        for handle in DragHandle::CORNERS.into_iter().chain(DragHandle::EDGES) {
            assert!(!rules.permits(handle), "{handle:?}");
        }
    }

    #[test]
    fn test_reserved_insets() {
        let mut config = CropConfig::default();
        config.crop_region_insets = EdgeInsets::new(0.0, 0.0, 44.0, 0.0);
        let insets = config.reserved_insets();
        assert_eq!(insets.bottom, 58.0);
        assert_eq!(insets.top, 14.0);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: CropConfig =
            serde_json::from_str(r#"{ "aspect_ratio_lock_enabled": true, "padding": 0.0 }"#)
                .unwrap();
        assert!(config.aspect_ratio_lock_enabled);
        assert_eq!(config.padding, 0.0);
        assert!(config.crop_box_resize_enabled);
        assert_eq!(config.maximum_zoom_factor, 15.0);
    }

    #[test]
    fn test_render_hints_default_off() {
        let hints = RenderHints::default();
        assert!(!hints.simple_render_mode);
        assert!(!hints.grid_overlay_hidden);
    }
}
