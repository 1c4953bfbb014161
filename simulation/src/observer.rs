//! Event delivery to subscribers outside the simulation.

use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;
use wave_defence_core::Event;

/// Receives every event the simulation produces, in production order.
pub trait EventObserver: Send {
    /// Handles a single event.
    fn on_event(&mut self, event: &Event);
}

impl EventObserver for Sender<Event> {
    fn on_event(&mut self, event: &Event) {
        // A dropped receiver just stops listening.
        let _ = self.send(event.clone());
    }
}

/// Shared in-memory recorder of events.
///
/// Clones share the same buffer, so one clone can be subscribed while another
/// is kept to inspect what was recorded.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventObserver for EventLog {
    fn on_event(&mut self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
