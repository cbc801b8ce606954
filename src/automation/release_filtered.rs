//! Release captured targets one at a time from the top of the list
//!
//! The release modifier is held for the whole loop and lifted exactly once,
//! whether the loop empties the list, fails, is cancelled or faults.

use tracing::{debug, error, info};

use crate::app::state::OperationKind;
use crate::automation::actions::Click;
use crate::automation::error::WorkflowError;
use crate::automation::panels::OpenBestiary;
use crate::automation::step::{Step, StepResult, TickContext, Workflow, ready};
use crate::automation::wait::{Delay, PollWait};
use crate::input::{InputDriver, KeyHold};

#[derive(Debug)]
enum ReleasePhase {
    Start,
    OpenBestiary(OpenBestiary),
    HoldModifier,
    Next,
    Release { click: Click, target: u64 },
    Confirm { wait: PollWait, target: u64 },
    Settle(Delay),
}

#[derive(Debug)]
pub struct ReleaseFiltered {
    phase: ReleasePhase,
    hold: Option<KeyHold>,
    released: u32,
}

impl ReleaseFiltered {
    pub fn new() -> Self {
        Self {
            phase: ReleasePhase::Start,
            hold: None,
            released: 0,
        }
    }

    pub fn released(&self) -> u32 {
        self.released
    }

    fn advance(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        loop {
            match &mut self.phase {
                ReleasePhase::Start => {
                    cx.checkpoint()?;
                    let key = cx.settings().bindings.open_bestiary;
                    self.phase = ReleasePhase::OpenBestiary(OpenBestiary::new(key));
                }
                ReleasePhase::OpenBestiary(bestiary) => {
                    ready!(bestiary.poll(cx)?);
                    self.phase = ReleasePhase::HoldModifier;
                }
                ReleasePhase::HoldModifier => {
                    cx.checkpoint()?;
                    let key = cx.settings().bindings.release_modifier;
                    info!(?key, "holding release modifier");
                    self.hold = Some(KeyHold::acquire(key, cx.input));
                    self.phase = ReleasePhase::Next;
                }
                ReleasePhase::Next => {
                    cx.checkpoint()?;
                    let snapshot = cx.snapshot();
                    let Some(first) = snapshot.targets.first() else {
                        info!(released = self.released, "no more targets to release");
                        return Ok(Step::Done(()));
                    };
                    if !first.is_valid {
                        error!(target = first.id, "first target is no longer valid");
                        return Err(WorkflowError::TargetNotFound);
                    }
                    let Some(handle) = first.release_handle else {
                        error!(target = first.id, "release button not found");
                        return Err(WorkflowError::TargetNotFound);
                    };
                    debug!(target = first.id, name = %first.display_name, "releasing");
                    self.phase = ReleasePhase::Release {
                        click: Click::left(snapshot, handle),
                        target: first.id,
                    };
                }
                ReleasePhase::Release { click, target } => {
                    ready!(click.poll(cx)?);
                    let target = *target;
                    self.phase = ReleasePhase::Confirm {
                        wait: PollWait::new("target released", cx.settings().wait_timeout),
                        target,
                    };
                }
                ReleasePhase::Confirm { wait, target } => {
                    let target = *target;
                    ready!(wait.poll(cx, |s| {
                        s.targets.first().is_none_or(|entry| entry.id != target)
                    })?);
                    self.released += 1;
                    self.phase = ReleasePhase::Settle(Delay::new(cx.settings().click_delay));
                }
                ReleasePhase::Settle(delay) => {
                    ready!(delay.poll(cx)?);
                    self.phase = ReleasePhase::Next;
                }
            }
        }
    }
}

impl Default for ReleaseFiltered {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow for ReleaseFiltered {
    fn kind(&self) -> OperationKind {
        OperationKind::ReleaseFiltered
    }

    fn resume(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        let result = self.advance(cx);
        if !matches!(result, Ok(Step::Suspend)) {
            self.release_resources(cx.input);
        }
        result
    }

    fn release_resources(&mut self, input: &mut dyn InputDriver) {
        if let Some(hold) = self.hold.as_mut() {
            if hold.is_held() {
                hold.release(input);
                debug!("released modifier");
            }
        }
    }
}
