use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// A single input sample.
///
/// Pressure and timestamp are optional and only carried along for
/// interpolation weighting; all geometry works on `x`/`y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<f64>,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pressure: None,
            timestamp_ms: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: f64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub fn pos(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    /// Euclidean distance, ignoring pressure and time.
    pub fn distance(&self, other: &Point) -> f32 {
        self.pos().distance(other.pos())
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }

    /// Linear interpolation between two samples. Optional channels are only
    /// interpolated when both ends carry them.
    pub fn lerp(&self, other: &Point, t: f32) -> Self {
        let pressure = match (self.pressure, other.pressure) {
            (Some(a), Some(b)) => Some(a + (b - a) * t),
            _ => None,
        };
        let timestamp_ms = match (self.timestamp_ms, other.timestamp_ms) {
            (Some(a), Some(b)) => Some(a + (b - a) * t as f64),
            _ => None,
        };
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            pressure,
            timestamp_ms,
        }
    }
}

impl From<Pos2> for Point {
    fn from(pos: Pos2) -> Self {
        Self::new(pos.x, pos.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Sum of consecutive-point distances.
pub fn path_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}
