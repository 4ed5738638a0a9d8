use egui::{Color32, Pos2};

use super::{CommandError, CommandResult};
use crate::arena::{StrokeId, TextId};
use crate::document::DocumentState;
use crate::fill::{FillPatch, fill_pixel};
use crate::stroke::StrokeRef;
use crate::text::{TextItem, TextStyle};

/// A reversible mutation of a [`DocumentState`].
///
/// Every variant carries what it needs to be applied and reverted without
/// looking anything else up: a fill keeps the pixels it overwrote and a clear
/// keeps the whole document it wiped.
#[derive(Clone, PartialEq)]
pub enum Command {
    /// Commit a finished stroke into its reserved slot
    AddStroke { id: StrokeId, stroke: StrokeRef },

    /// Place a new text annotation
    AddText { item: TextItem },

    /// Drag a text annotation
    MoveText { id: TextId, from: Pos2, to: Pos2 },

    /// Replace the content of a text annotation
    EditText { id: TextId, from: String, to: String },

    /// Restyle a text annotation
    StyleText { id: TextId, from: TextStyle, to: TextStyle },

    /// Paint a flood-filled region of the fill bitmap
    Fill {
        patch: FillPatch,
        color: Color32,
        opacity: f32,
    },

    /// Wipe strokes, texts and the fill bitmap
    Clear { previous: Box<DocumentState> },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::AddStroke { id, stroke } => f
                .debug_struct("AddStroke")
                .field("id", id)
                .field("points", &stroke.points().len())
                .field("tool", &stroke.tool())
                .finish(),
            Command::AddText { item } => f
                .debug_struct("AddText")
                .field("id", &item.id)
                .field("content", &item.content)
                .finish(),
            Command::MoveText { id, from, to } => f
                .debug_struct("MoveText")
                .field("id", id)
                .field("from", from)
                .field("to", to)
                .finish(),
            Command::EditText { id, from, to } => f
                .debug_struct("EditText")
                .field("id", id)
                .field("from", from)
                .field("to", to)
                .finish(),
            Command::StyleText { id, from, to } => f
                .debug_struct("StyleText")
                .field("id", id)
                .field("from", from)
                .field("to", to)
                .finish(),
            Command::Fill { patch, color, opacity } => f
                .debug_struct("Fill")
                .field("pixels", &patch.len())
                .field("color", color)
                .field("opacity", opacity)
                .finish(),
            Command::Clear { previous } => f
                .debug_struct("Clear")
                .field("strokes", &previous.strokes().len())
                .field("texts", &previous.texts().len())
                .finish(),
        }
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddStroke { .. } => "add-stroke",
            Command::AddText { .. } => "add-text",
            Command::MoveText { .. } => "move-text",
            Command::EditText { .. } => "edit-text",
            Command::StyleText { .. } => "style-text",
            Command::Fill { .. } => "fill",
            Command::Clear { .. } => "clear",
        }
    }

    /// Apply the command to `doc`.
    pub fn execute(&self, doc: &mut DocumentState) -> CommandResult {
        match self {
            Command::AddStroke { id, stroke } => {
                if doc.strokes().contains(*id) {
                    return Err(CommandError::StrokeSlot(*id));
                }
                doc.strokes_mut().insert(*id, stroke.clone());
            }

            Command::AddText { item } => {
                if doc.texts().contains(item.id) {
                    return Err(CommandError::DuplicateText(item.id));
                }
                doc.texts_mut().insert(item.id, item.clone());
            }

            Command::MoveText { id, to, .. } => {
                text_mut(doc, *id)?.position = *to;
            }

            Command::EditText { id, to, .. } => {
                text_mut(doc, *id)?.content = to.clone();
            }

            Command::StyleText { id, to, .. } => {
                text_mut(doc, *id)?.style = *to;
            }

            Command::Fill { patch, color, opacity } => {
                if !patch.fits(doc.fill()) {
                    return Err(CommandError::FillSizeMismatch);
                }
                patch.paint(doc.fill_mut(), fill_pixel(*color, *opacity));
            }

            Command::Clear { previous } => {
                *doc = previous.cleared();
            }
        }
        Ok(())
    }

    /// Revert a previously executed command.
    pub fn undo(&self, doc: &mut DocumentState) -> CommandResult {
        match self {
            Command::AddStroke { id, .. } => {
                if doc.strokes_mut().remove(*id).is_none() {
                    return Err(CommandError::StrokeSlot(*id));
                }
            }

            Command::AddText { item } => {
                if doc.texts_mut().remove(item.id).is_none() {
                    return Err(CommandError::MissingText(item.id));
                }
            }

            Command::MoveText { id, from, .. } => {
                text_mut(doc, *id)?.position = *from;
            }

            Command::EditText { id, from, .. } => {
                text_mut(doc, *id)?.content = from.clone();
            }

            Command::StyleText { id, from, .. } => {
                text_mut(doc, *id)?.style = *from;
            }

            Command::Fill { patch, .. } => {
                if !patch.fits(doc.fill()) {
                    return Err(CommandError::FillSizeMismatch);
                }
                patch.restore(doc.fill_mut());
            }

            Command::Clear { previous } => {
                *doc = (**previous).clone();
            }
        }
        Ok(())
    }
}

fn text_mut(doc: &mut DocumentState, id: TextId) -> CommandResult<&mut TextItem> {
    doc.texts_mut().get_mut(id).ok_or(CommandError::MissingText(id))
}
