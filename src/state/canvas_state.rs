//! The interaction state machine of a canvas.
//!
//! ```text
//!              pointer down                   play ghost
//!   ┌────────────────────────┐     ┌──────────────────────────┐
//!   │                        ▼     │                          ▼
//! ┌─┴──────┐          ┌──────────────┐ ◄─┐            ┌──────────────┐
//! │  Idle  │ ◄────────┤GestureActive │   │            │ PlayingGhost │
//! └────────┘  pointer └──────────────┘   │            └──────┬───────┘
//!      ▲      up/leave                   │                   │
//!      └─────────────────────────────────┴───────────────────┘
//!                                       finished / cancelled
//! ```
//!
//! A ghost that is playing is cancelled (back to `Idle`) before a gesture may
//! start; a gesture must end before a ghost may start.
use egui::{Pos2, Vec2};

use crate::arena::TextId;
use crate::point::Point;
use crate::stroke::MutableStroke;

/// The pointer interaction in flight.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// Drawing with a stroke tool
    Stroke(MutableStroke),
    /// Tapping a dot; the tap lands where the pointer is released
    Tap { down: Point },
    /// Dragging a text annotation
    TextDrag {
        id: TextId,
        origin: Pos2,
        grab_offset: Vec2,
        current: Pos2,
    },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stroke(_) => "stroke",
            Self::Tap { .. } => "tap",
            Self::TextDrag { .. } => "text-drag",
        }
    }
}

/// The possible states of a canvas.
#[derive(Debug, Clone, Default)]
pub enum CanvasState {
    /// No gesture or playback in progress
    #[default]
    Idle,
    /// A pointer gesture is open; document mutations are deferred
    GestureActive(Gesture),
    /// A guide path is being replayed
    PlayingGhost { generation: u64 },
}

/// Data-free view of [`CanvasState`], used for transition checks and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
    Idle,
    GestureActive,
    PlayingGhost,
}

impl CanvasMode {
    /// Validates whether a transition to `next` is allowed
    pub fn can_transition_to(self, next: CanvasMode) -> bool {
        match (self, next) {
            // From Idle, we can start a gesture or a playback
            (CanvasMode::Idle, CanvasMode::GestureActive) => true,
            (CanvasMode::Idle, CanvasMode::PlayingGhost) => true,

            // Gestures and playbacks only ever end
            (CanvasMode::GestureActive, CanvasMode::Idle) => true,
            (CanvasMode::PlayingGhost, CanvasMode::Idle) => true,

            // A new playback may supersede a running one
            (CanvasMode::PlayingGhost, CanvasMode::PlayingGhost) => true,

            _ => false,
        }
    }
}

impl CanvasState {
    pub fn mode(&self) -> CanvasMode {
        match self {
            Self::Idle => CanvasMode::Idle,
            Self::GestureActive(_) => CanvasMode::GestureActive,
            Self::PlayingGhost { .. } => CanvasMode::PlayingGhost,
        }
    }

    /// Returns true if the canvas is idle
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true while a pointer gesture is open
    pub fn is_gesture_active(&self) -> bool {
        matches!(self, Self::GestureActive(_))
    }

    pub fn is_playing_ghost(&self) -> bool {
        matches!(self, Self::PlayingGhost { .. })
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        match self {
            Self::GestureActive(gesture) => Some(gesture),
            _ => None,
        }
    }

    pub fn gesture_mut(&mut self) -> Option<&mut Gesture> {
        match self {
            Self::GestureActive(gesture) => Some(gesture),
            _ => None,
        }
    }
}
