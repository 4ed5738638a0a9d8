use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of points every path is resampled to before comparison.
pub const DEFAULT_RESAMPLE_POINTS: usize = 128;
/// Boundary pixels for flood fill are darker than this average brightness.
pub const DEFAULT_BOUNDARY_BRIGHTNESS: u8 = 64;
/// Outline pixels counted by the trace tool are darker than this.
pub const DEFAULT_TRACE_BRIGHTNESS: u8 = 96;
/// Share of filled pixels that must match the target color.
pub const DEFAULT_COLOR_OK_RATIO: f32 = 0.9;
/// One animation frame, in milliseconds, at speed multiplier 1.
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;

/// Engine-wide tunables.
///
/// The brightness and ratio thresholds have no derivation behind them; they are
/// kept configurable with the historical values as defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to the defaults below
pub struct EngineConfig {
    pub resample_points: usize,
    pub boundary_brightness: u8,
    pub trace_brightness: u8,
    pub color_ok_ratio: f32,
    pub frame_interval_ms: f64,
    /// Strokes with fewer points are discarded on gesture end.
    pub min_stroke_points: usize,
    /// How far a pointer may drift between down and up and still count as a tap.
    pub tap_slop_px: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resample_points: DEFAULT_RESAMPLE_POINTS,
            boundary_brightness: DEFAULT_BOUNDARY_BRIGHTNESS,
            trace_brightness: DEFAULT_TRACE_BRIGHTNESS,
            color_ok_ratio: DEFAULT_COLOR_OK_RATIO,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            min_stroke_points: 1,
            tap_slop_px: 8.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resample_points < 2 {
            return Err(ConfigError::Invalid(format!(
                "resample_points must be at least 2, got {}",
                self.resample_points
            )));
        }
        if !(0.0..=1.0).contains(&self.color_ok_ratio) {
            return Err(ConfigError::Invalid(format!(
                "color_ok_ratio must be within [0, 1], got {}",
                self.color_ok_ratio
            )));
        }
        if !(self.frame_interval_ms.is_finite() && self.frame_interval_ms > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "frame_interval_ms must be positive, got {}",
                self.frame_interval_ms
            )));
        }
        if self.min_stroke_points == 0 {
            return Err(ConfigError::Invalid("min_stroke_points must be at least 1".into()));
        }
        if !(self.tap_slop_px.is_finite() && self.tap_slop_px >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tap_slop_px must be non-negative, got {}",
                self.tap_slop_px
            )));
        }
        Ok(())
    }
}
