use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::document::DocumentState;
use crate::evaluation::EvaluationResult;
use crate::ghost::GhostOutcome;
use crate::state::CanvasMode;
use crate::util::time;

/// How the document came to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChange {
    /// A new command was executed; carries the command name
    Applied(&'static str),
    Undone(&'static str),
    Redone(&'static str),
}

/// An immutable copy of a document taken after it changed.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub document_id: Uuid,
    /// Number of changes the document has seen
    pub revision: u64,
    /// Milliseconds since the UNIX epoch
    pub taken_at_ms: f64,
    pub state: Arc<DocumentState>,
}

impl DocumentSnapshot {
    pub fn capture(document_id: Uuid, revision: u64, state: &DocumentState) -> Self {
        Self {
            document_id,
            revision,
            taken_at_ms: time::current_time_ms(),
            state: Arc::new(state.clone()),
        }
    }
}

/// Serializable summary of a snapshot, for hosts that persist progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub document_id: Uuid,
    pub revision: u64,
    pub taken_at_ms: f64,
    pub strokes: usize,
    pub texts: usize,
}

impl From<&DocumentSnapshot> for SnapshotSummary {
    fn from(snapshot: &DocumentSnapshot) -> Self {
        Self {
            document_id: snapshot.document_id,
            revision: snapshot.revision,
            taken_at_ms: snapshot.taken_at_ms,
            strokes: snapshot.state.strokes().len(),
            texts: snapshot.state.texts().len(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CanvasEvent {
    /// The document was mutated
    DocumentChanged {
        change: DocumentChange,
        snapshot: DocumentSnapshot,
    },

    /// The interaction state changed
    StateChanged { old: CanvasMode, new: CanvasMode },

    /// An attempt at the loaded step was scored
    Evaluated {
        step_id: Option<String>,
        exercise: &'static str,
        result: EvaluationResult,
    },

    /// A ghost playback ended
    GhostFinished { generation: u64, outcome: GhostOutcome },
}
