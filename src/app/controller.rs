//! Operation sequencer and coordination layer
//!
//! The sequencer owns the single operation slot. The host calls it once per
//! frame; it turns activation edges into operations, resumes the running
//! workflow against a fresh snapshot, and makes sure anything the workflow
//! holds is released when it stops.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::app::state::{Operation, OperationKind, OperationStatus, StateEvent, StateMachine};
use crate::automation::{Step, TickContext, WorkflowError};
use crate::config::Settings;
use crate::host::StateProvider;
use crate::input::{EdgeDetector, InputDriver, Signals};

/// Runs at most one workflow, advancing it one step per host tick
#[derive(Debug)]
pub struct OperationSequencer {
    settings: Settings,
    operation: Operation,
    edges: EdgeDetector,
    cancel_requested: bool,
    frame: u64,
}

impl OperationSequencer {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            operation: Operation::Idle,
            edges: EdgeDetector::new(),
            cancel_requested: false,
            frame: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn status(&self) -> OperationStatus {
        self.operation.status()
    }

    pub fn is_running(&self) -> bool {
        self.operation.is_running()
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    fn apply(&mut self, event: StateEvent) {
        let current = std::mem::take(&mut self.operation);
        self.operation = StateMachine::process_event(current, event);
    }

    /// Starts an operation unless one is already running
    ///
    /// # Returns
    /// true if a new operation was started
    pub fn activate(&mut self, kind: OperationKind) -> bool {
        if !self.settings.enabled {
            debug!(%kind, "activation ignored, automation disabled");
            return false;
        }
        if let Some(running) = self.operation.kind().filter(|_| self.is_running()) {
            info!(%kind, %running, "activation ignored, operation already running");
            return false;
        }

        self.apply(StateEvent::Activate(kind));
        self.cancel_requested = false;
        info!(%kind, "operation started");
        true
    }

    /// Marks the running operation for cancellation
    ///
    /// Takes effect at the operation's next suspension point. Ignored when
    /// nothing is running.
    pub fn request_cancel(&mut self) -> bool {
        if !self.is_running() {
            debug!("cancel ignored, nothing running");
            return false;
        }
        if !self.cancel_requested {
            info!("cancellation requested");
            self.cancel_requested = true;
        }
        true
    }

    /// Applies one frame's activation edges; cancel is handled first
    pub fn handle_signals(&mut self, edges: Signals) {
        if edges.contains(Signals::CANCEL) {
            self.request_cancel();
        }
        if edges.contains(Signals::START_SORT) {
            self.activate(OperationKind::SortCurrency);
        }
        if edges.contains(Signals::START_USE_ALL) {
            self.activate(OperationKind::UseAllBeasts);
        }
        if edges.contains(Signals::START_RELEASE_FILTERED) {
            self.activate(OperationKind::ReleaseFiltered);
        }
    }

    /// Edge-detects raw key levels, applies them, then ticks
    pub fn on_frame<H>(&mut self, host: &mut H, levels: Signals, now: Instant) -> OperationStatus
    where
        H: StateProvider + InputDriver,
    {
        let edges = self.edges.update(levels);
        if !edges.is_empty() {
            debug!(?edges, "activation edges");
        }
        self.handle_signals(edges);
        self.tick(host, now)
    }

    /// Resumes the running workflow by one step
    ///
    /// Takes exactly one snapshot when something is running and none
    /// otherwise. A panic inside the workflow is caught here and recorded as
    /// an `UnexpectedFault`.
    pub fn tick<H>(&mut self, host: &mut H, now: Instant) -> OperationStatus
    where
        H: StateProvider + InputDriver,
    {
        self.frame += 1;

        let Operation::Running { kind, workflow } = &mut self.operation else {
            return self.operation.status();
        };
        let kind = *kind;

        let snapshot = host.snapshot();
        let outcome = {
            let mut cx = TickContext::new(
                &snapshot,
                host,
                &self.settings,
                now,
                self.frame,
                self.cancel_requested,
            );
            match panic::catch_unwind(AssertUnwindSafe(|| workflow.resume(&mut cx))) {
                Ok(Ok(Step::Suspend)) => None,
                Ok(Ok(Step::Done(()))) => Some(Ok(())),
                Ok(Err(err)) => Some(Err(err)),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(%kind, %message, "workflow panicked");
                    Some(Err(WorkflowError::UnexpectedFault(message)))
                }
            }
        };

        let Some(outcome) = outcome else {
            return OperationStatus::Running(kind);
        };

        workflow.release_resources(host);
        self.finish(kind, outcome);
        self.operation.status()
    }

    fn finish(&mut self, kind: OperationKind, outcome: Result<(), WorkflowError>) {
        match &outcome {
            Ok(()) => info!(%kind, "operation completed"),
            Err(WorkflowError::Cancelled) => info!(%kind, "operation cancelled by user"),
            Err(err) => error!(%kind, error = %err, "operation failed"),
        }
        self.apply(StateEvent::Finished(outcome));
        self.cancel_requested = false;
    }

    /// Drops the current operation after a host reload
    ///
    /// Releases anything the running workflow still holds and returns to Idle.
    pub fn reset(&mut self, input: &mut dyn InputDriver) {
        if let Operation::Running { kind, workflow } = &mut self.operation {
            warn!(%kind, "resetting while running");
            workflow.release_resources(input);
        }
        self.apply(StateEvent::Reset);
        self.cancel_requested = false;
        self.edges = EdgeDetector::new();
        info!("sequencer reset");
    }
}

impl Drop for OperationSequencer {
    fn drop(&mut self) {
        if let Some(kind) = self.operation.kind().filter(|_| self.is_running()) {
            warn!(%kind, "sequencer dropped while an operation was running");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
