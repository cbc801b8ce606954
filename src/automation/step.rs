//! Resumable steps and the per-tick context they run in
//!
//! Every primitive and workflow is an explicit state machine. Calling its
//! `poll`/`resume` advances it as far as it can go in the current tick and
//! returns either [`Step::Suspend`] (call again next tick) or
//! [`Step::Done`] with a value. Failures travel in the outer `Result` so the
//! `?` operator propagates them through nested machines.

use std::fmt;
use std::time::Instant;

use crate::app::state::OperationKind;
use crate::automation::error::WorkflowError;
use crate::config::Settings;
use crate::host::Snapshot;
use crate::input::InputDriver;

/// Progress of a resumable computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T> {
    /// Yield to the host loop; resume on the next tick
    Suspend,
    Done(T),
}

impl<T> Step<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done(_))
    }
}

pub type StepResult<T> = Result<Step<T>, WorkflowError>;

/// Unwraps a finished step or returns `Ok(Step::Suspend)` from the caller
macro_rules! ready {
    ($e:expr) => {
        match $e {
            $crate::automation::step::Step::Done(value) => value,
            $crate::automation::step::Step::Suspend => {
                return Ok($crate::automation::step::Step::Suspend);
            }
        }
    };
}

pub(crate) use ready;

/// Everything a step may touch during one tick
pub struct TickContext<'a> {
    snapshot: &'a Snapshot,
    pub input: &'a mut dyn InputDriver,
    settings: &'a Settings,
    now: Instant,
    frame: u64,
    cancel_requested: bool,
}

impl<'a> TickContext<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        input: &'a mut dyn InputDriver,
        settings: &'a Settings,
        now: Instant,
        frame: u64,
        cancel_requested: bool,
    ) -> Self {
        Self {
            snapshot,
            input,
            settings,
            now,
            frame,
            cancel_requested,
        }
    }

    /// This tick's snapshot
    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Monotonic tick counter, one per host frame
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Suspension-point cancellation check
    pub fn checkpoint(&self) -> Result<(), WorkflowError> {
        if self.cancel_requested {
            Err(WorkflowError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickContext")
            .field("frame", &self.frame)
            .field("cancel_requested", &self.cancel_requested)
            .finish_non_exhaustive()
    }
}

/// A user-triggered workflow, resumed once per tick by the sequencer
pub trait Workflow: fmt::Debug {
    fn kind(&self) -> OperationKind;

    /// Advances the workflow; `Ok(Step::Done(()))` is success
    fn resume(&mut self, cx: &mut TickContext<'_>) -> StepResult<()>;

    /// Lifts anything still held down
    ///
    /// Called once after the workflow leaves Running, whatever the reason,
    /// including a fault that unwound out of `resume`.
    fn release_resources(&mut self, _input: &mut dyn InputDriver) {}
}
