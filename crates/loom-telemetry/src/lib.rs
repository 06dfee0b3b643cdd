//! # loom-telemetry
//!
//! Event bus for cloth telemetry. Cloth components emit structured
//! events (rebuilds, setup failures, ticks, strokes) consumed by
//! pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{ClothEvent, EventKind};
pub use sinks::{EventSink, TracingSink, VecSink};
