use std::time::Duration;

use thiserror::Error;

/// Reasons a primitive or workflow step can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// A required panel or tab could not be opened or resolved
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("no source units available")]
    NoSourceAvailable,
    #[error("target not found")]
    TargetNotFound,
    #[error("no inventory capacity available")]
    NoCapacityAvailable,
    /// A wait did not observe its condition in time
    #[error("timed out after {timeout:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: &'static str,
        timeout: Duration,
    },
    #[error("cancelled by user")]
    Cancelled,
    /// A fault caught at the operation boundary
    #[error("unexpected fault: {0}")]
    UnexpectedFault(String),
}

impl WorkflowError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkflowError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WorkflowError::Timeout { .. })
    }
}
