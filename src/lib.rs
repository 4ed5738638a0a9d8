#![warn(clippy::all, rust_2018_idioms)]

pub mod arena;
pub mod canvas;
pub mod color;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod evaluation;
pub mod event;
pub mod fill;
pub mod ghost;
pub mod input;
pub mod point;
pub mod resample;
pub mod state;
pub mod step;
pub mod stroke;
pub mod text;
pub mod tool;
pub mod util;

pub use arena::{StrokeId, TextId};
pub use canvas::{CanvasDocument, DeferredAction, Dispatch};
pub use color::{HslColor, HslTolerance};
pub use command::{Command, CommandHistory};
pub use config::EngineConfig;
pub use document::DocumentState;
pub use error::{ConfigError, StepError};
pub use evaluation::{EvaluationResult, StrokeRubric, evaluate_area_fill, evaluate_stroke_path};
pub use event::{CanvasEvent, CanvasListener, EventBus};
pub use fill::flood_fill;
pub use ghost::{FrameScheduler, GhostOptions, GhostOutcome, GhostPlayback, GhostPlayer, GhostSurface};
pub use input::InputEvent;
pub use point::Point;
pub use resample::resample;
pub use state::{CanvasMode, CanvasState};
pub use step::StepSpec;
pub use stroke::{Stroke, StrokeRef};
pub use tool::{Constraints, ToolKind, ToolSettings};
