use thiserror::Error;

/// Failure of a single remote fetch.
///
/// Cloneable so the same terminal error can be delivered to every open
/// subscription.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("failed to decode quote: {0}")]
    Decode(String),

    #[error("upstream returned no quote")]
    Empty,
}
