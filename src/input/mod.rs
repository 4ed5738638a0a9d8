use egui::{Event, PointerButton, Pos2, Rect};

use crate::point::Point;

/// Pointer input in canvas coordinates, as the canvas consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button (or touch) pressed
    PointerDown { point: Point },
    /// Pointer moved, pressed or not
    PointerMove { point: Point },
    /// Primary button released
    PointerUp { point: Point },
    /// Pointer left the canvas; ends a gesture like a release
    PointerLeave { point: Point },
    /// Pointer capture was lost without a position
    PointerCancel,
}

impl InputEvent {
    pub fn point(&self) -> Option<Point> {
        match self {
            Self::PointerDown { point }
            | Self::PointerMove { point }
            | Self::PointerUp { point }
            | Self::PointerLeave { point } => Some(*point),
            Self::PointerCancel => None,
        }
    }
}

/// Converts raw egui events into canvas [`InputEvent`]s.
///
/// Positions are translated into the canvas rect and stamped with the frame
/// time. Events outside the canvas only matter while the pointer is down, in
/// which case the first one ends the gesture with a `PointerLeave`.
#[derive(Debug, Clone)]
pub struct InputHandler {
    canvas_rect: Rect,
    pointer_down: bool,
    last_point: Option<Point>,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            canvas_rect,
            pointer_down: false,
            last_point: None,
        }
    }

    /// Update the screen rect the canvas is painted into
    pub fn set_canvas_rect(&mut self, canvas_rect: Rect) {
        self.canvas_rect = canvas_rect;
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    fn to_canvas(&self, pos: Pos2, time_ms: f64) -> Point {
        let local = pos - self.canvas_rect.min;
        Point::new(local.x, local.y).with_timestamp(time_ms)
    }

    /// Convert one egui event. `time_ms` is the host's frame time.
    pub fn process_event(&mut self, event: &Event, time_ms: f64) -> Option<InputEvent> {
        match event {
            Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                ..
            } => {
                let point = self.to_canvas(*pos, time_ms);
                if *pressed {
                    if !self.canvas_rect.contains(*pos) {
                        return None;
                    }
                    self.pointer_down = true;
                    self.last_point = Some(point);
                    Some(InputEvent::PointerDown { point })
                } else if self.pointer_down {
                    self.pointer_down = false;
                    Some(InputEvent::PointerUp { point })
                } else {
                    None
                }
            }
            Event::PointerMoved(pos) => {
                let point = self.to_canvas(*pos, time_ms);
                if self.pointer_down && !self.canvas_rect.contains(*pos) {
                    self.pointer_down = false;
                    return Some(InputEvent::PointerLeave { point });
                }
                self.last_point = Some(point);
                Some(InputEvent::PointerMove { point })
            }
            Event::PointerGone if self.pointer_down => {
                self.pointer_down = false;
                Some(match self.last_point {
                    Some(point) => InputEvent::PointerLeave { point },
                    None => InputEvent::PointerCancel,
                })
            }
            _ => None,
        }
    }

    /// Convert every event of one frame, preserving order.
    pub fn process_events(&mut self, events: &[Event], time_ms: f64) -> Vec<InputEvent> {
        events
            .iter()
            .filter_map(|event| self.process_event(event, time_ms))
            .collect()
    }
}
