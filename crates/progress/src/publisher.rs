use std::sync::Mutex;

use async_trait::async_trait;

use crate::event::ProgressEvent;

/// Injected progress sink (§4.7, §9: "the engine is oblivious to
/// transport"). Delivery is best-effort; implementations must not block the
/// graph or propagate errors back into it.
#[async_trait]
pub trait ProgressPublisher: Send + Sync {
    async fn publish(&self, event: ProgressEvent);
}

/// Discards every event. Used by tests and by callers that don't care about
/// progress streaming.
pub struct NoopProgressPublisher;

#[async_trait]
impl ProgressPublisher for NoopProgressPublisher {
    async fn publish(&self, _event: ProgressEvent) {}
}

/// Records every event in graph order, for the demonstration binary and for
/// tests that assert on ordering guarantees (§5 "progress events are
/// delivered in graph order").
#[derive(Default)]
pub struct RecordingProgressPublisher {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgressPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("progress lock poisoned").clone()
    }
}

#[async_trait]
impl ProgressPublisher for RecordingProgressPublisher {
    async fn publish(&self, event: ProgressEvent) {
        self.events.lock().expect("progress lock poisoned").push(event);
    }
}
