mod constraints;

pub use constraints::Constraints;

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Every tool the canvas can route pointer input to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Pencil,
    Brush,
    Eraser,
    Fill,
    Text,
    Tap,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pencil => "pencil",
            Self::Brush => "brush",
            Self::Eraser => "eraser",
            Self::Fill => "fill",
            Self::Text => "text",
            Self::Tap => "tap",
        }
    }

    /// Tools whose pointer gestures accumulate a stroke.
    pub fn draws_strokes(&self) -> bool {
        matches!(self, Self::Pencil | Self::Brush | Self::Eraser)
    }
}

/// The learner's current tool, color and stroke width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: Color32,
    pub width_px: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pencil,
            color: Color32::BLACK,
            width_px: 4.0,
        }
    }
}

impl ToolSettings {
    /// Pull the settings inside what `constraints` allows.
    ///
    /// Used when a step is loaded so the learner starts from a legal state.
    pub fn conform_to(&mut self, constraints: &Constraints) {
        if let Some(tool) = constraints.allowed_tool {
            self.tool = tool;
        }
        if let Some(color) = constraints.locked_color {
            self.color = color;
        }
        if let Some([min, max]) = constraints.size_range_px {
            self.width_px = self.width_px.clamp(min, max.max(min));
        }
    }
}
