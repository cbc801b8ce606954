//! Use every product item in the inventory
//!
//! Fail-soft: a unit that cannot be used is logged and skipped. Only
//! cancellation stops the pass early.

use std::collections::VecDeque;

use tracing::{debug, error, info, warn};

use crate::app::state::OperationKind;
use crate::automation::actions::Click;
use crate::automation::error::WorkflowError;
use crate::automation::panels::{EnsurePanel, inventory_layout};
use crate::automation::scan::{is_product, log_item_names, product_slots};
use crate::automation::step::{Step, StepResult, TickContext, Workflow, ready};
use crate::automation::wait::{Delay, PollWait};
use crate::domain::inventory::ItemId;
use crate::host::{Snapshot, UiPath};

#[derive(Debug)]
enum UseStep {
    Use(Click),
    Confirm(PollWait),
    Settle(Delay),
}

/// Right-clicks one item and waits for it to leave the inventory
#[derive(Debug)]
struct UseUnit {
    item: ItemId,
    step: UseStep,
}

impl UseUnit {
    /// Re-validates the item against the live snapshot
    fn new(snapshot: &Snapshot, item: ItemId) -> Result<Self, WorkflowError> {
        let slot = snapshot
            .inventory
            .find(item)
            .filter(|slot| is_product(snapshot, slot.item_id))
            .ok_or(WorkflowError::TargetNotFound)?;
        let layout = inventory_layout(snapshot)?;
        Ok(Self {
            item,
            step: UseStep::Use(Click::right(snapshot, layout.slot_rect(slot))),
        })
    }

    fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        let item = self.item;
        loop {
            match &mut self.step {
                UseStep::Use(click) => {
                    ready!(click.poll(cx)?);
                    self.step = UseStep::Confirm(PollWait::new(
                        "item consumed",
                        cx.settings().wait_timeout,
                    ));
                }
                UseStep::Confirm(wait) => {
                    ready!(wait.poll(cx, |s| s.inventory.find(item).is_none())?);
                    self.step = UseStep::Settle(Delay::new(cx.settings().click_delay));
                }
                UseStep::Settle(delay) => {
                    ready!(delay.poll(cx)?);
                    return Ok(Step::Done(()));
                }
            }
        }
    }
}

#[derive(Debug)]
enum UsePhase {
    Start,
    OpenInventory(EnsurePanel),
    Discover,
    Next,
    Use(UseUnit),
}

/// Uses each discovered product item once
#[derive(Debug)]
pub struct UseAllBeasts {
    phase: UsePhase,
    pending: VecDeque<ItemId>,
    current: Option<ItemId>,
    used: u32,
    failed: u32,
}

impl UseAllBeasts {
    pub fn new() -> Self {
        Self {
            phase: UsePhase::Start,
            pending: VecDeque::new(),
            current: None,
            used: 0,
            failed: 0,
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    /// Records a per-unit failure; cancellation is passed back up
    fn unit_failed(&mut self, err: WorkflowError) -> Result<(), WorkflowError> {
        if err.is_cancelled() {
            return Err(err);
        }
        self.failed += 1;
        warn!(item = ?self.current, error = %err, "failed to use item, continuing");
        Ok(())
    }
}

impl Default for UseAllBeasts {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow for UseAllBeasts {
    fn kind(&self) -> OperationKind {
        OperationKind::UseAllBeasts
    }

    fn resume(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        loop {
            match &mut self.phase {
                UsePhase::Start => {
                    cx.checkpoint()?;
                    let key = cx.settings().bindings.open_inventory;
                    self.phase =
                        UsePhase::OpenInventory(EnsurePanel::new(UiPath::InventoryPanel, key));
                }
                UsePhase::OpenInventory(panel) => {
                    ready!(panel.poll(cx)?);
                    self.phase = UsePhase::Discover;
                }
                UsePhase::Discover => {
                    let snapshot = cx.snapshot();
                    if cx.settings().debug_item_names {
                        log_item_names(snapshot);
                    }
                    self.pending = product_slots(snapshot)
                        .into_iter()
                        .map(|slot| slot.item_id)
                        .collect();
                    info!(count = self.pending.len(), "found items to use");
                    if self.pending.is_empty() {
                        error!("no usable items found in inventory");
                        return Err(WorkflowError::NoSourceAvailable);
                    }
                    self.phase = UsePhase::Next;
                }
                UsePhase::Next => {
                    cx.checkpoint()?;
                    let Some(item) = self.pending.pop_front() else {
                        info!(used = self.used, failed = self.failed, "use-all completed");
                        return Ok(Step::Done(()));
                    };
                    self.current = Some(item);
                    debug!(?item, "using item");
                    match UseUnit::new(cx.snapshot(), item) {
                        Ok(unit) => self.phase = UsePhase::Use(unit),
                        Err(err) => self.unit_failed(err)?,
                    }
                }
                UsePhase::Use(unit) => {
                    match unit.poll(cx) {
                        Ok(Step::Suspend) => return Ok(Step::Suspend),
                        Ok(Step::Done(())) => self.used += 1,
                        Err(err) => self.unit_failed(err)?,
                    }
                    self.phase = UsePhase::Next;
                }
            }
        }
    }
}
