use std::future::Future;
use std::time::{Duration, Instant};

/// Await `fut`, logging a `performance` warning if it took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed = ?elapsed,
            budget = ?max,
            "slow operation detected"
        );
    }
    out
}
