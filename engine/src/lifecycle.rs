//! Poll loop lifecycle.
//!
//! Tracks whether a poll loop is active and which one. Every started loop gets
//! a fresh generation number, so a loop that was stopped and is still winding
//! down can never clobber the state of a loop started after it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Externally visible lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// No poll loop.
    #[default]
    Idle,
    /// A poll loop is active and delivering.
    Running,
    /// Cancellation was signalled; the loop has not exited yet.
    Stopping,
}

/// Handle on the most recently started loop.
#[derive(Debug)]
struct ActiveLoop {
    generation: u64,
    interval: Duration,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub(crate) struct LifecycleState {
    phase: Lifecycle,
    active: Option<ActiveLoop>,
    next_generation: u64,
}

impl LifecycleState {
    pub(crate) fn phase(&self) -> Lifecycle {
        self.phase
    }

    /// Interval of the running loop, if any.
    pub(crate) fn interval(&self) -> Option<Duration> {
        match self.phase {
            Lifecycle::Running => self.active.as_ref().map(|a| a.interval),
            _ => None,
        }
    }

    /// Register a new loop. Returns `None` when one is already running.
    ///
    /// Starting while a previous loop is still `Stopping` is allowed: the old
    /// loop keeps its (already cancelled) token and will exit on its own.
    pub(crate) fn begin(&mut self, interval: Duration) -> Option<(u64, CancellationToken)> {
        if self.phase == Lifecycle::Running {
            return None;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let cancel = CancellationToken::new();

        self.active = Some(ActiveLoop {
            generation,
            interval,
            cancel: cancel.clone(),
        });
        self.phase = Lifecycle::Running;

        Some((generation, cancel))
    }

    /// Signal the running loop to stop. Returns false if nothing was running.
    pub(crate) fn request_stop(&mut self) -> bool {
        if self.phase != Lifecycle::Running {
            return false;
        }

        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
        self.phase = Lifecycle::Stopping;
        true
    }

    /// True while `generation` is the running loop and has not been cancelled.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.phase == Lifecycle::Running
            && self
                .active
                .as_ref()
                .is_some_and(|a| a.generation == generation)
    }

    /// Called by a loop on exit. Only the latest generation settles the
    /// state back to `Idle`; returns whether it did.
    pub(crate) fn finish(&mut self, generation: u64) -> bool {
        let owns = self
            .active
            .as_ref()
            .is_some_and(|a| a.generation == generation);

        if owns {
            if let Some(active) = self.active.take() {
                active.cancel.cancel();
            }
            self.phase = Lifecycle::Idle;
        }
        owns
    }
}
