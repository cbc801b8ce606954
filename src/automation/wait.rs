//! Cooperative waits
//!
//! A wait never blocks. It is polled once per tick against that tick's
//! snapshot and suspends until its condition or deadline is reached. Each
//! wait measures its own deadline from the tick it was first polled; no
//! deadline is shared between waits.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::automation::error::WorkflowError;
use crate::automation::step::{Step, StepResult, TickContext};
use crate::host::Snapshot;

/// Suspends until a predicate over the snapshot holds or a timeout elapses
#[derive(Debug, Clone)]
pub struct PollWait {
    waiting_for: &'static str,
    timeout: Duration,
    started: Option<Instant>,
    last_frame: Option<u64>,
}

impl PollWait {
    /// # Arguments
    /// * `waiting_for` - Short description used in logs and the timeout error
    /// * `timeout` - Bound measured from the first poll
    pub fn new(waiting_for: &'static str, timeout: Duration) -> Self {
        Self {
            waiting_for,
            timeout,
            started: None,
            last_frame: None,
        }
    }

    /// Tests the predicate once for this tick
    ///
    /// Order per tick: cancellation, then the predicate, then the deadline.
    /// Polling twice in the same tick does not re-test the predicate.
    pub fn poll(
        &mut self,
        cx: &TickContext<'_>,
        predicate: impl FnOnce(&Snapshot) -> bool,
    ) -> StepResult<()> {
        let started = *self.started.get_or_insert(cx.now());
        cx.checkpoint()?;

        if self.last_frame == Some(cx.frame()) {
            return Ok(Step::Suspend);
        }
        self.last_frame = Some(cx.frame());

        if predicate(cx.snapshot()) {
            return Ok(Step::Done(()));
        }

        let elapsed = cx.now().saturating_duration_since(started);
        if elapsed >= self.timeout {
            debug!(waiting_for = self.waiting_for, ?elapsed, "wait timed out");
            return Err(WorkflowError::Timeout {
                waiting_for: self.waiting_for,
                timeout: self.timeout,
            });
        }

        Ok(Step::Suspend)
    }
}

/// Fixed settle delay; still a suspension point for cancellation
#[derive(Debug, Clone)]
pub struct Delay {
    duration: Duration,
    started: Option<Instant>,
}

impl Delay {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
        }
    }

    pub fn poll(&mut self, cx: &TickContext<'_>) -> StepResult<()> {
        let started = *self.started.get_or_insert(cx.now());
        cx.checkpoint()?;

        if cx.now().saturating_duration_since(started) >= self.duration {
            Ok(Step::Done(()))
        } else {
            Ok(Step::Suspend)
        }
    }
}

/// Suspends exactly one tick
///
/// Used inside atomic input sequences, so it does not observe cancellation.
#[derive(Debug, Clone, Default)]
pub struct Yield {
    yielded: bool,
}

impl Yield {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self) -> Step<()> {
        if self.yielded {
            Step::Done(())
        } else {
            self.yielded = true;
            Step::Suspend
        }
    }
}
