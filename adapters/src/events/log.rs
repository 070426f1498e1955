use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use corelib::time::now_ms;
use engine::EventRecorder;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub tags: HashMap<String, String>,
    /// Wall clock at append time (ms since epoch).
    pub at_ms: u64,
}

/// Append-only, thread-safe event log.
///
/// Concurrent writers land in lock-acquisition order, which is consistent
/// with the order their `record` calls completed in. Reads are snapshots.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Number of events recorded under `name`.
    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name == name).count()
    }
}

impl EventRecorder for EventLog {
    fn record(&self, name: &str, tags: HashMap<String, String>) {
        let mut g = self.events.lock();
        g.push(RecordedEvent {
            name: name.to_string(),
            tags,
            at_ms: now_ms(),
        });
    }
}
