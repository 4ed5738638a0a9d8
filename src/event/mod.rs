mod bus;
mod events;

pub use bus::EventBus;
pub use events::*;

/// Receives notifications from a [`CanvasDocument`](crate::canvas::CanvasDocument).
pub trait CanvasListener: Send {
    fn on_event(&mut self, event: &CanvasEvent);
}

impl<F> CanvasListener for F
where
    F: FnMut(&CanvasEvent) + Send,
{
    fn on_event(&mut self, event: &CanvasEvent) {
        self(event)
    }
}
