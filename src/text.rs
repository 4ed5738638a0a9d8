use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::arena::TextId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color32,
    pub size_px: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            size_px: 24.0,
            bold: false,
            italic: false,
        }
    }
}

/// A text annotation placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub id: TextId,
    pub content: String,
    pub position: Pos2,
    pub style: TextStyle,
}

impl TextItem {
    pub fn new(id: TextId, content: impl Into<String>, position: Pos2, style: TextStyle) -> Self {
        Self {
            id,
            content: content.into(),
            position,
            style,
        }
    }

    /// Rough hit box: no font metrics are available to the engine, so each
    /// character is assumed to be 0.6em wide.
    pub fn hit_test(&self, pos: Pos2) -> bool {
        let chars = self.content.chars().count().max(1) as f32;
        let width = chars * self.style.size_px * 0.6;
        let rect = egui::Rect::from_min_size(self.position, egui::vec2(width, self.style.size_px));
        rect.contains(pos)
    }
}
