mod commands;
mod history;

use std::fmt;

use crate::arena::{StrokeId, TextId};

pub use commands::Command;
pub use history::CommandHistory;

/// Result type for command operations
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Errors that can occur during command execution.
///
/// Commands check the document before touching it, so a failed command leaves
/// the document exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The command refers to a text item that is not in the document
    MissingText(TextId),
    /// The command would replace a text item that already exists
    DuplicateText(TextId),
    /// The command refers to a stroke slot in the wrong state
    StrokeSlot(StrokeId),
    /// A fill patch was captured from a bitmap of a different size
    FillSizeMismatch,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingText(id) => write!(f, "No text item {}", id.0),
            Self::DuplicateText(id) => write!(f, "Text item {} already exists", id.0),
            Self::StrokeSlot(id) => write!(f, "Stroke slot {} is in an unexpected state", id.0),
            Self::FillSizeMismatch => write!(f, "Fill patch does not match the fill bitmap"),
        }
    }
}

impl std::error::Error for CommandError {}
