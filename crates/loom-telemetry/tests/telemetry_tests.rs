//! Integration tests for loom-telemetry.

use loom_telemetry::bus::EventBus;
use loom_telemetry::events::{ClothEvent, EventKind};
use loom_telemetry::sinks::{EventSink, TracingSink, VecSink};

#[test]
fn emit_and_flush() {
    let sink = VecSink::new();
    let mut bus = EventBus::with_sink(sink.clone());

    bus.emit(ClothEvent::new(0, EventKind::StrokeBegin));
    bus.emit(ClothEvent::new(0, EventKind::StrokeEnd { applications: 4 }));
    assert!(sink.is_empty());

    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::StrokeBegin);
    assert_eq!(events[1].kind, EventKind::StrokeEnd { applications: 4 });
}

#[test]
fn disabled_bus_drops_events() {
    let sink = VecSink::new();
    let mut bus = EventBus::with_sink(sink.clone());
    bus.set_enabled(false);
    bus.emit(ClothEvent::new(0, EventKind::StrokeBegin));
    bus.flush();
    assert!(sink.is_empty());
}

#[test]
fn multiple_sinks_each_receive() {
    let a = VecSink::new();
    let b = VecSink::new();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    bus.add_sink(Box::new(TracingSink::new()));
    assert_eq!(bus.sink_count(), 3);

    bus.emit(ClothEvent::new(
        3,
        EventKind::SetupFailed {
            reason: "empty mesh".into(),
        },
    ));
    bus.finish();
    assert_eq!(a.len(), 1);
    assert_eq!(b.count("setup_failed"), 1);
}

#[test]
fn event_serialization() {
    let event = ClothEvent::new(
        5,
        EventKind::ClothRebuilt {
            particles: 4,
            vertices: 6,
            triangles: 2,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: ClothEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn labels_are_distinct() {
    let kinds = [
        EventKind::ClothRebuilt {
            particles: 0,
            vertices: 0,
            triangles: 0,
        },
        EventKind::SetupFailed { reason: String::new() },
        EventKind::TickCompleted {
            dt: 0.0,
            attached: 0,
            wall_time: 0.0,
        },
        EventKind::AttachmentMissed { bone: "Root".into() },
        EventKind::StrokeBegin,
        EventKind::StrokeEnd { applications: 0 },
        EventKind::WeightsLoaded { entries: 0, skipped: 0 },
    ];
    let mut labels: Vec<&str> = kinds
        .into_iter()
        .map(|k| ClothEvent::new(0, k).label())
        .collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 7);
}

#[test]
fn tracing_sink_handles_all_kinds_without_subscriber() {
    let mut sink = TracingSink::new();
    sink.handle(&ClothEvent::new(1, EventKind::AttachmentMissed { bone: "Hip".into() }));
    sink.handle(&ClothEvent::new(
        1,
        EventKind::TickCompleted {
            dt: 0.016,
            attached: 2,
            wall_time: 0.0001,
        },
    ));
    sink.handle(&ClothEvent::new(1, EventKind::WeightsLoaded { entries: 3, skipped: 1 }));
    assert_eq!(sink.name(), "tracing_sink");
}
