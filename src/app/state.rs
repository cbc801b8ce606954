//! Operation state management
//!
//! Defines the operation lifecycle and its transitions. At most one
//! operation is Running; terminal states stay visible until the next
//! activation replaces them.

use std::fmt;

use tracing::debug;

use crate::automation::{ReleaseFiltered, SortCurrency, UseAllBeasts, Workflow, WorkflowError};

/// The three user-triggered workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    SortCurrency,
    UseAllBeasts,
    ReleaseFiltered,
}

impl OperationKind {
    /// Fresh workflow instance for this kind
    pub fn workflow(self) -> Box<dyn Workflow> {
        match self {
            OperationKind::SortCurrency => Box::new(SortCurrency::new()),
            OperationKind::UseAllBeasts => Box::new(UseAllBeasts::new()),
            OperationKind::ReleaseFiltered => Box::new(ReleaseFiltered::new()),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::SortCurrency => "sort currency",
            OperationKind::UseAllBeasts => "use all beasts",
            OperationKind::ReleaseFiltered => "release filtered beasts",
        };
        f.write_str(name)
    }
}

/// Lifecycle of the current operation
#[derive(Debug, Default)]
pub enum Operation {
    /// Nothing has run since start-up or the last reset
    #[default]
    Idle,
    /// A workflow is in flight and resumed once per tick
    Running {
        kind: OperationKind,
        workflow: Box<dyn Workflow>,
    },
    Cancelled {
        kind: OperationKind,
    },
    Completed {
        kind: OperationKind,
        outcome: Result<(), WorkflowError>,
    },
}

impl Operation {
    pub fn is_running(&self) -> bool {
        matches!(self, Operation::Running { .. })
    }

    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            Operation::Idle => None,
            Operation::Running { kind, .. }
            | Operation::Cancelled { kind }
            | Operation::Completed { kind, .. } => Some(*kind),
        }
    }

    /// Copyable summary of the state
    pub fn status(&self) -> OperationStatus {
        match self {
            Operation::Idle => OperationStatus::Idle,
            Operation::Running { kind, .. } => OperationStatus::Running(*kind),
            Operation::Cancelled { kind } => OperationStatus::Cancelled(*kind),
            Operation::Completed {
                kind,
                outcome: Ok(()),
            } => OperationStatus::Succeeded(*kind),
            Operation::Completed {
                kind,
                outcome: Err(_),
            } => OperationStatus::Failed(*kind),
        }
    }

    /// Failure recorded by a completed operation
    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Operation::Completed {
                outcome: Err(err), ..
            } => Some(err),
            _ => None,
        }
    }
}

/// Operation state without the workflow itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Idle,
    Running(OperationKind),
    Cancelled(OperationKind),
    Succeeded(OperationKind),
    Failed(OperationKind),
}

impl OperationStatus {
    /// True once an operation has left Running
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Cancelled(_)
                | OperationStatus::Succeeded(_)
                | OperationStatus::Failed(_)
        )
    }
}

/// Possible state transition events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// A start signal fired
    Activate(OperationKind),
    /// The running workflow finished with this result
    Finished(Result<(), WorkflowError>),
    /// Host reload; forget everything
    Reset,
}

/// State machine for operation transitions
pub struct StateMachine;

impl StateMachine {
    /// Processes a state event and returns the new state
    ///
    /// # Arguments
    /// * `current` - Current operation, consumed
    /// * `event` - Event to process
    ///
    /// # Returns
    /// New operation after processing the event. Events that do not apply
    /// leave the operation untouched.
    pub fn process_event(current: Operation, event: StateEvent) -> Operation {
        match (current, event) {
            (running @ Operation::Running { .. }, StateEvent::Activate(requested)) => {
                debug!(%requested, "activation ignored while running");
                running
            }

            (_, StateEvent::Activate(kind)) => Operation::Running {
                kind,
                workflow: kind.workflow(),
            },

            (
                Operation::Running { kind, .. },
                StateEvent::Finished(Err(WorkflowError::Cancelled)),
            ) => Operation::Cancelled { kind },

            (Operation::Running { kind, .. }, StateEvent::Finished(outcome)) => {
                Operation::Completed { kind, outcome }
            }

            (_, StateEvent::Reset) => Operation::Idle,

            // Finished outside Running: nothing to finish
            (state, StateEvent::Finished(_)) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(kind: OperationKind) -> Operation {
        StateMachine::process_event(Operation::Idle, StateEvent::Activate(kind))
    }

    #[test]
    fn default_state_is_idle() {
        let state = Operation::default();
        assert_eq!(state.status(), OperationStatus::Idle);
        assert!(state.kind().is_none());
    }

    #[test]
    fn activation_starts_matching_workflow() {
        let state = running(OperationKind::UseAllBeasts);
        assert!(state.is_running());
        if let Operation::Running { workflow, .. } = &state {
            assert_eq!(workflow.kind(), OperationKind::UseAllBeasts);
        }
    }

    #[test]
    fn activation_while_running_is_ignored() {
        let state = running(OperationKind::SortCurrency);
        let state = StateMachine::process_event(
            state,
            StateEvent::Activate(OperationKind::ReleaseFiltered),
        );
        assert_eq!(state.status(), OperationStatus::Running(OperationKind::SortCurrency));
    }

    #[test]
    fn finishing_records_outcome() {
        let state = StateMachine::process_event(
            running(OperationKind::SortCurrency),
            StateEvent::Finished(Ok(())),
        );
        assert_eq!(state.status(), OperationStatus::Succeeded(OperationKind::SortCurrency));

        let state = StateMachine::process_event(
            running(OperationKind::SortCurrency),
            StateEvent::Finished(Err(WorkflowError::TargetNotFound)),
        );
        assert_eq!(state.status(), OperationStatus::Failed(OperationKind::SortCurrency));
        assert_eq!(state.error(), Some(&WorkflowError::TargetNotFound));
    }

    #[test]
    fn cancelled_result_maps_to_cancelled_state() {
        let state = StateMachine::process_event(
            running(OperationKind::ReleaseFiltered),
            StateEvent::Finished(Err(WorkflowError::Cancelled)),
        );
        assert_eq!(state.status(), OperationStatus::Cancelled(OperationKind::ReleaseFiltered));
        assert!(state.status().is_terminal());
    }

    #[test]
    fn terminal_state_is_replaced_by_next_activation() {
        let done = StateMachine::process_event(
            running(OperationKind::SortCurrency),
            StateEvent::Finished(Ok(())),
        );
        let state =
            StateMachine::process_event(done, StateEvent::Activate(OperationKind::UseAllBeasts));
        assert_eq!(state.status(), OperationStatus::Running(OperationKind::UseAllBeasts));
    }

    #[test]
    fn reset_returns_to_idle_and_stray_finish_is_ignored() {
        let state =
            StateMachine::process_event(running(OperationKind::SortCurrency), StateEvent::Reset);
        assert_eq!(state.status(), OperationStatus::Idle);

        let state = StateMachine::process_event(state, StateEvent::Finished(Ok(())));
        assert_eq!(state.status(), OperationStatus::Idle);
    }
}
