//! Interaction configuration
//!
//! Loaded from TOML. Every section and field falls back to its default, so
//! a config file only needs to name what it changes:
//!
//! ```toml
//! [gesture]
//! long_press_ms = 500
//! drag_threshold_px = 10.0
//! double_tap_ms = 300
//! rotation_sensitivity = 0.01
//!
//! [selection]
//! proximity_radius_px = 60.0   # 0 disables the near-miss tolerance
//! indicator_radius_factor = 0.3
//!
//! [surface]
//! acquired_after_frames = 300
//! on_tracking_loss = "pause"
//!
//! [[models]]
//! name = "marble_coffee_table"
//! source = "./marble_coffee_table.glb"
//! scale = [0.005, 0.005, 0.005]
//! ```

use std::path::Path;
use std::time::Duration;

use furnish_scene::ModelSpec;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Gesture timing and motion thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold time before a single press resolves as a long press
    pub long_press_ms: u64,
    /// Per-axis motion that drops an armed press
    pub drag_threshold_px: f32,
    /// Maximum gap between two taps that still counts as a double tap
    pub double_tap_ms: u64,
    /// Yaw change per pixel of two-point midpoint motion, in radians
    pub rotation_sensitivity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            drag_threshold_px: 10.0,
            double_tap_ms: 300,
            rotation_sensitivity: 0.01,
        }
    }
}

impl GestureConfig {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn double_tap(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }
}

/// Selection feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Screen distance from a selected object's projected position strictly within
    /// which a long press on empty space keeps the selection. 0 disables.
    pub proximity_radius_px: f32,
    /// Indicator radius as a fraction of the larger footprint dimension
    pub indicator_radius_factor: f32,
    /// Inner to outer radius of the indicator ring
    pub indicator_ring_ratio: f32,
    /// Attach the three-segment dimension overlay to the selection
    pub dimension_overlay: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            proximity_radius_px: 60.0,
            indicator_radius_factor: 0.3,
            indicator_ring_ratio: 0.857,
            dimension_overlay: true,
        }
    }
}

impl SelectionConfig {
    /// Near-miss tolerance radius, if enabled
    pub fn proximity_radius(&self) -> Option<f32> {
        (self.proximity_radius_px > 0.0).then_some(self.proximity_radius_px)
    }
}

/// What a frame without a surface does to the detection counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingLossPolicy {
    /// Keep the count; brief losses do not restart acquisition
    #[default]
    Pause,
    /// Start counting again from zero
    Reset,
}

/// Surface tracking and reticle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Detections needed before the surface counts as acquired
    pub acquired_after_frames: u32,
    pub on_tracking_loss: TrackingLossPolicy,
    pub reticle_inner_radius: f32,
    pub reticle_outer_radius: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            acquired_after_frames: 300,
            on_tracking_loss: TrackingLossPolicy::Pause,
            reticle_inner_radius: 0.15,
            reticle_outer_radius: 0.2,
        }
    }
}

/// Complete interaction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub gesture: GestureConfig,
    pub selection: SelectionConfig,
    pub surface: SurfaceConfig,
    /// Placeable models, in menu order
    pub models: Vec<ModelSpec>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            selection: SelectionConfig::default(),
            surface: SurfaceConfig::default(),
            models: default_models(),
        }
    }
}

/// The furniture shipped with the app
pub fn default_models() -> Vec<ModelSpec> {
    [
        ("dylan_armchair_yolk_yellow", 0.01),
        ("ivan_armchair_mineral_blue", 0.01),
        ("marble_coffee_table", 0.005),
        ("flippa_functional_coffee_table_w._storagewalnut", 0.01),
        ("frame_armchairpetrol_velvet_with_gold_frame", 0.01),
        ("elnaz_nesting_side_tables_brass__green_marble", 0.01),
    ]
    .into_iter()
    .map(|(name, scale)| ModelSpec::new(name, format!("./{}.glb", name), scale))
    .collect()
}

impl InteractionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading interaction config from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the interaction core cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.gesture.long_press_ms == 0 {
            return invalid("gesture.long_press_ms must be positive");
        }
        if self.gesture.double_tap_ms == 0 {
            return invalid("gesture.double_tap_ms must be positive");
        }
        if !(self.gesture.drag_threshold_px >= 0.0) {
            return invalid("gesture.drag_threshold_px must not be negative");
        }
        if !self.gesture.rotation_sensitivity.is_finite() {
            return invalid("gesture.rotation_sensitivity must be finite");
        }
        if !(self.selection.proximity_radius_px >= 0.0) {
            return invalid("selection.proximity_radius_px must not be negative");
        }
        if !(self.selection.indicator_radius_factor > 0.0) {
            return invalid("selection.indicator_radius_factor must be positive");
        }
        if !(self.selection.indicator_ring_ratio > 0.0 && self.selection.indicator_ring_ratio < 1.0) {
            return invalid("selection.indicator_ring_ratio must lie in (0, 1)");
        }
        if !(self.surface.reticle_inner_radius > 0.0
            && self.surface.reticle_inner_radius < self.surface.reticle_outer_radius)
        {
            return invalid("surface reticle radii must satisfy 0 < inner < outer");
        }
        if self.models.is_empty() {
            return invalid("at least one model is required");
        }
        if let Some(model) = self.models.iter().find(|m| m.scale.iter().any(|s| !(*s > 0.0))) {
            return Err(ConfigError::Invalid(format!(
                "model '{}' has a non-positive scale",
                model.name
            )));
        }

        Ok(())
    }
}
