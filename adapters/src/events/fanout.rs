use std::collections::HashMap;
use std::sync::Arc;

use engine::EventRecorder;

/// Forwards each event to every wrapped recorder, in order.
#[derive(Clone, Default)]
pub struct FanoutRecorder {
    sinks: Vec<Arc<dyn EventRecorder>>,
}

impl FanoutRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventRecorder>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventRecorder for FanoutRecorder {
    fn record(&self, name: &str, tags: HashMap<String, String>) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.record(name, tags.clone());
            }
            last.record(name, tags);
        }
    }
}
