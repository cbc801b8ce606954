//! Cooperative automation: steps, waits, input primitives and workflows
//!
//! Nothing in here blocks or sleeps. Each piece is a state machine resumed
//! once per host tick by the [`OperationSequencer`](crate::app::OperationSequencer).

pub mod actions;
pub mod error;
pub mod panels;
pub mod release_filtered;
pub mod scan;
pub mod sort_currency;
pub mod step;
pub mod use_all;
pub mod wait;

pub use actions::{Click, KeyTap, ModifierClick};
pub use error::WorkflowError;
pub use release_filtered::ReleaseFiltered;
pub use sort_currency::SortCurrency;
pub use step::{Step, StepResult, TickContext, Workflow};
pub use use_all::UseAllBeasts;
pub use wait::{Delay, PollWait, Yield};
