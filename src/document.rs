use image::RgbaImage;

use crate::arena::{Arena, StrokeId, TextId};
use crate::stroke::StrokeRef;
use crate::text::TextItem;

/// Everything a learner has put on the canvas.
///
/// Only [`Command`](crate::command::Command)s mutate a document; this type
/// exposes read access publicly and mutation to the command module.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    strokes: Arena<StrokeId, StrokeRef>,
    texts: Arena<TextId, TextItem>,
    fill: RgbaImage,
}

impl DocumentState {
    /// An empty document with a fully transparent fill bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            strokes: Arena::new(),
            texts: Arena::new(),
            fill: RgbaImage::new(width, height),
        }
    }

    /// A blank document of the same size.
    pub fn cleared(&self) -> Self {
        Self::new(self.fill.width(), self.fill.height())
    }

    pub fn size(&self) -> (u32, u32) {
        self.fill.dimensions()
    }

    pub fn strokes(&self) -> &Arena<StrokeId, StrokeRef> {
        &self.strokes
    }

    pub fn stroke(&self, id: StrokeId) -> Option<&StrokeRef> {
        self.strokes.get(id)
    }

    pub fn texts(&self) -> &Arena<TextId, TextItem> {
        &self.texts
    }

    pub fn text(&self, id: TextId) -> Option<&TextItem> {
        self.texts.get(id)
    }

    /// Topmost text item under `pos`, newest first.
    pub fn text_at(&self, pos: egui::Pos2) -> Option<&TextItem> {
        self.texts
            .values()
            .rev()
            .find(|item| item.hit_test(pos))
    }

    pub fn fill(&self) -> &RgbaImage {
        &self.fill
    }

    pub fn is_blank(&self) -> bool {
        self.strokes.is_empty() && self.texts.is_empty() && self.fill.pixels().all(|p| p.0[3] == 0)
    }

    pub(crate) fn strokes_mut(&mut self) -> &mut Arena<StrokeId, StrokeRef> {
        &mut self.strokes
    }

    pub(crate) fn texts_mut(&mut self) -> &mut Arena<TextId, TextItem> {
        &mut self.texts
    }

    pub(crate) fn fill_mut(&mut self) -> &mut RgbaImage {
        &mut self.fill
    }
}
