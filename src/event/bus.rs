use parking_lot::Mutex;

use crate::event::{CanvasEvent, CanvasListener};

/// Broadcasts canvas events to registered listeners, in subscription order.
pub struct EventBus {
    listeners: Mutex<Vec<Box<dyn CanvasListener>>>,
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        // Listeners belong to one canvas; a clone starts without any
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &format!("<{} listeners>", self.listeners.lock().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe a listener to receive events
    pub fn subscribe(&self, listener: Box<dyn CanvasListener>) {
        self.listeners.lock().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Emit an event to all registered listeners
    pub fn emit(&self, event: CanvasEvent) {
        for listener in self.listeners.lock().iter_mut() {
            listener.on_event(&event);
        }
    }
}
