mod canvas_state;

pub use canvas_state::{CanvasMode, CanvasState, Gesture};
