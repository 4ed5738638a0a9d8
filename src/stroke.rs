use egui::{Color32, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::point::{self, Point};
use crate::tool::{ToolKind, ToolSettings};

// Immutable stroke, shared between the document and the commands that own it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
    color: Color32,
    width_px: f32,
    tool: ToolKind,
}

// Mutable stroke for the gesture in flight
#[derive(Debug, Clone)]
pub struct MutableStroke {
    points: Vec<Point>,
    color: Color32,
    width_px: f32,
    tool: ToolKind,
}

// Define a reference-counted type alias for Stroke
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    /// Returns `None` for an empty point list; a committed stroke always has
    /// at least one point.
    pub fn new(points: Vec<Point>, color: Color32, width_px: f32, tool: ToolKind) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self {
            points,
            color,
            width_px,
            tool,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width_px(&self) -> f32 {
        self.width_px
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn length(&self) -> f32 {
        point::path_length(&self.points)
    }

    /// Bounding box padded by half the stroke width.
    pub fn rect(&self) -> Rect {
        let mut rect = Rect::NOTHING;
        for p in &self.points {
            rect.extend_with(p.pos());
        }
        rect.expand(self.width_px / 2.0)
    }
}

impl MutableStroke {
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            points: Vec::new(),
            color: settings.color,
            width_px: settings.width_px,
            tool: settings.tool,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    // Get a reference to the points for preview
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Freeze into an immutable stroke. `None` when nothing was recorded.
    pub fn freeze(self) -> Option<StrokeRef> {
        Stroke::new(self.points, self.color, self.width_px, self.tool).map(Arc::new)
    }
}
