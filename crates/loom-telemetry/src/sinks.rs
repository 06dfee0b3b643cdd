//! Pluggable event sinks.

use std::sync::{Arc, Mutex, PoisonError};

use crate::events::{ClothEvent, EventKind};

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &ClothEvent);

    /// Called when the owner shuts down. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// Clones share the same buffer, so a clone kept outside the bus can
/// inspect what the bus delivered.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<ClothEvent>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected events.
    pub fn events(&self) -> Vec<ClothEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of collected events with the given label.
    pub fn count(&self, label: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.label() == label)
            .count()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &ClothEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Forwards events to `tracing`. Failures log at `warn`, everything else
/// at `debug`, except tick completions which log at `trace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &ClothEvent) {
        match &event.kind {
            EventKind::SetupFailed { reason } => {
                tracing::warn!(frame = event.frame, %reason, "cloth setup failed");
            }
            EventKind::AttachmentMissed { bone } => {
                tracing::warn!(frame = event.frame, %bone, "attachment bone missing");
            }
            EventKind::TickCompleted { dt, attached, wall_time } => {
                tracing::trace!(frame = event.frame, dt, attached, wall_time, "tick");
            }
            kind => {
                tracing::debug!(frame = event.frame, event = ?kind, label = event.label(), "cloth_event");
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
