pub mod fanout;
pub mod log;
pub mod tracing_recorder;

pub use fanout::FanoutRecorder;
pub use log::{EventLog, RecordedEvent};
pub use tracing_recorder::TracingRecorder;
