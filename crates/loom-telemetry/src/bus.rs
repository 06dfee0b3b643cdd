//! Event bus — broadcast-style event dispatch with pluggable sinks.
//!
//! Producers queue events through an `mpsc` channel; sinks see them on
//! [`EventBus::flush`].

use std::sync::mpsc;

use crate::events::ClothEvent;
use crate::sinks::EventSink;

/// Broadcast event bus for cloth telemetry.
pub struct EventBus {
    sender: mpsc::Sender<ClothEvent>,
    receiver: mpsc::Receiver<ClothEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus is a no-op.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Creates a bus with one sink already registered.
    pub fn with_sink(sink: impl EventSink + 'static) -> Self {
        let mut bus = Self::new();
        bus.add_sink(Box::new(sink));
        bus
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event. No-op while disabled.
    pub fn emit(&self, event: ClothEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives as long as the bus.
        let _ = self.sender.send(event);
    }

    /// Dispatches every queued event to every sink, in emission order.
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
    }

    /// Flushes, then lets every sink finalize.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
