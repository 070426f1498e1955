use std::collections::HashMap;

use engine::EventRecorder;

/// Emits every event as a structured log line under the `events` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingRecorder;

impl EventRecorder for TracingRecorder {
    fn record(&self, name: &str, tags: HashMap<String, String>) {
        tracing::info!(target: "events", event = name, tags = ?tags, "event recorded");
    }
}
