use egui::Color32;
use serde::{Deserialize, Serialize};

use super::{ToolKind, ToolSettings};

/// Per-step restrictions on what the learner may use.
///
/// Violations are dropped at the input layer; the evaluators never see them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Constraints {
    pub allowed_tool: Option<ToolKind>,
    /// Inclusive `[min, max]` stroke width.
    pub size_range_px: Option<[f32; 2]>,
    pub locked_color: Option<Color32>,
    /// The tool chosen when the step loads may not be changed.
    pub tool_locked: bool,
}

impl Constraints {
    pub fn allows_tool(&self, tool: ToolKind) -> bool {
        self.allowed_tool.is_none_or(|allowed| allowed == tool)
    }

    pub fn allows_width(&self, width_px: f32) -> bool {
        match self.size_range_px {
            Some([min, max]) => width_px >= min && width_px <= max,
            None => width_px.is_finite() && width_px > 0.0,
        }
    }

    pub fn allows_color(&self, color: Color32) -> bool {
        self.locked_color.is_none_or(|locked| locked == color)
    }

    /// Whether switching from `current` to `requested` is permitted.
    pub fn allows_tool_change(&self, current: ToolKind, requested: ToolKind) -> bool {
        if self.tool_locked && current != requested {
            return false;
        }
        self.allows_tool(requested)
    }

    /// Whether input produced with `settings` may reach the document.
    pub fn admits(&self, settings: &ToolSettings) -> bool {
        self.allows_tool(settings.tool)
            && self.allows_color(settings.color)
            && (!settings.tool.draws_strokes() || self.allows_width(settings.width_px))
    }
}
