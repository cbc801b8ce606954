//! Apply every source unit to the first captured target
//!
//! Each unit goes through a fixed eight-step conversion: pick the source up,
//! confirm it is on the cursor, resolve the target, apply, confirm the new
//! item on the cursor, find a free cell, place it, confirm the placement.
//! The first failing step aborts the whole operation.

use tracing::{debug, error, info};

use crate::app::state::OperationKind;
use crate::automation::actions::Click;
use crate::automation::error::WorkflowError;
use crate::automation::panels::{EnsurePanel, OpenBestiary, inventory_layout};
use crate::automation::scan::{
    holds_new_item, holds_source, is_placed, log_item_names, source_slots, total_units,
};
use crate::automation::step::{Step, StepResult, TickContext, Workflow, ready};
use crate::automation::wait::{PollWait, Yield};
use crate::domain::grid::{GridOccupancy, IMPRINT_YIELD, capacity_allows, find_free_slot};
use crate::domain::inventory::{ItemId, ItemSlot};
use crate::host::{Snapshot, UiPath};

#[derive(Debug)]
enum ConvertStep {
    PickUp(Click),
    ConfirmPickedUp(PollWait),
    ApplyToTarget(Click),
    ConfirmProduct(PollWait),
    Place(Click),
    Settle(Yield),
    ConfirmPlaced(PollWait),
}

/// One pass of the conversion protocol for a single source unit
#[derive(Debug)]
struct ConvertUnit {
    source: ItemId,
    step: ConvertStep,
}

impl ConvertUnit {
    fn new(snapshot: &Snapshot, slot: &ItemSlot) -> Result<Self, WorkflowError> {
        let layout = inventory_layout(snapshot)?;
        debug!(x = slot.x, y = slot.y, "step 1: right-clicking source");
        Ok(Self {
            source: slot.item_id,
            step: ConvertStep::PickUp(Click::right(snapshot, layout.slot_rect(slot))),
        })
    }

    fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        let source = self.source;
        let settings = cx.settings();
        loop {
            match &mut self.step {
                ConvertStep::PickUp(click) => {
                    ready!(click.poll(cx)?);
                    cx.checkpoint()?;
                    debug!("step 2: waiting for source on cursor");
                    self.step = ConvertStep::ConfirmPickedUp(PollWait::new(
                        "source on cursor",
                        settings.wait_timeout,
                    ));
                }
                ConvertStep::ConfirmPickedUp(wait) => {
                    ready!(wait.poll(cx, |s| holds_source(s, settings, source))?);
                    cx.checkpoint()?;

                    debug!("step 3: resolving target");
                    let snapshot = cx.snapshot();
                    let target = snapshot
                        .targets
                        .primary()
                        .ok_or(WorkflowError::TargetNotFound)?;
                    debug!(target = %target.display_name, "step 4: applying to target");
                    self.step = ConvertStep::ApplyToTarget(Click::left(snapshot, target.rect));
                }
                ConvertStep::ApplyToTarget(click) => {
                    ready!(click.poll(cx)?);
                    cx.checkpoint()?;
                    debug!("step 5: waiting for new item on cursor");
                    self.step = ConvertStep::ConfirmProduct(PollWait::new(
                        "new item on cursor",
                        settings.wait_timeout,
                    ));
                }
                ConvertStep::ConfirmProduct(wait) => {
                    ready!(wait.poll(cx, |s| holds_new_item(s, source))?);
                    cx.checkpoint()?;

                    let snapshot = cx.snapshot();
                    let layout = inventory_layout(snapshot)?;
                    let pos = find_free_slot(&snapshot.inventory)
                        .ok_or(WorkflowError::NoCapacityAvailable)?;
                    let cell = layout
                        .cell_rect(pos)
                        .map_err(|err| WorkflowError::PreconditionFailed(err.to_string()))?;
                    debug!(x = pos.x, y = pos.y, "step 7: placing item");
                    self.step = ConvertStep::Place(Click::left(snapshot, cell));
                }
                ConvertStep::Place(click) => {
                    ready!(click.poll(cx)?);
                    self.step = ConvertStep::Settle(Yield::new());
                }
                ConvertStep::Settle(tick) => {
                    ready!(tick.poll());
                    debug!("step 8: confirming placement");
                    self.step = ConvertStep::ConfirmPlaced(PollWait::new(
                        "item placed",
                        settings.wait_timeout,
                    ));
                }
                ConvertStep::ConfirmPlaced(wait) => {
                    ready!(wait.poll(cx, is_placed)?);
                    return Ok(Step::Done(()));
                }
            }
        }
    }
}

#[derive(Debug)]
enum SortPhase {
    Start,
    OpenInventory(EnsurePanel),
    OpenBestiary(OpenBestiary),
    Discover,
    NextUnit,
    Convert(ConvertUnit),
}

/// Converts source units until none remain, no target remains, or the
/// inventory can no longer take the product
#[derive(Debug)]
pub struct SortCurrency {
    phase: SortPhase,
    converted: u32,
}

impl SortCurrency {
    pub fn new() -> Self {
        Self {
            phase: SortPhase::Start,
            converted: 0,
        }
    }

    /// Units converted so far
    pub fn converted(&self) -> u32 {
        self.converted
    }

    fn discover(cx: &TickContext<'_>) -> Result<(), WorkflowError> {
        let snapshot = cx.snapshot();
        let settings = cx.settings();
        inventory_layout(snapshot)?;

        if settings.debug_item_names {
            log_item_names(snapshot);
        }

        let sources = source_slots(snapshot, settings);
        info!(stacks = sources.len(), "found source stacks in inventory");
        if sources.is_empty() {
            error!("no source units found in inventory");
            return Err(WorkflowError::NoSourceAvailable);
        }

        if snapshot.targets.primary().is_none() {
            error!("no captured target available");
            return Err(WorkflowError::TargetNotFound);
        }

        let total = total_units(&sources);
        let free = GridOccupancy::from_snapshot(&snapshot.inventory).free_count();
        if !capacity_allows(free, total, IMPRINT_YIELD) {
            error!(free, total, "no free inventory space available");
            return Err(WorkflowError::NoCapacityAvailable);
        }

        info!(total, free, "ready to process source units");
        Ok(())
    }

    /// Picks the next unit, or None when the loop should end
    fn next_unit(cx: &TickContext<'_>) -> Result<Option<ConvertUnit>, WorkflowError> {
        let snapshot = cx.snapshot();
        let sources = source_slots(snapshot, cx.settings());

        let Some(slot) = sources.first() else {
            info!("no more source units in inventory");
            return Ok(None);
        };
        if snapshot.targets.primary().is_none() {
            info!("no captured targets left to apply to");
            return Ok(None);
        }

        let total = total_units(&sources);
        let free = GridOccupancy::from_snapshot(&snapshot.inventory).free_count();
        if !capacity_allows(free, total, IMPRINT_YIELD) {
            info!(total, "inventory full with more than one unit remaining");
            return Ok(None);
        }
        if free == 0 {
            debug!("last unit, processing without a free cell");
        }

        debug!(x = slot.x, y = slot.y, stack = slot.stack_count, "processing stack");
        ConvertUnit::new(snapshot, slot).map(Some)
    }
}

impl Default for SortCurrency {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow for SortCurrency {
    fn kind(&self) -> OperationKind {
        OperationKind::SortCurrency
    }

    fn resume(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        loop {
            match &mut self.phase {
                SortPhase::Start => {
                    cx.checkpoint()?;
                    let key = cx.settings().bindings.open_inventory;
                    self.phase =
                        SortPhase::OpenInventory(EnsurePanel::new(UiPath::InventoryPanel, key));
                }
                SortPhase::OpenInventory(panel) => {
                    ready!(panel.poll(cx)?);
                    let key = cx.settings().bindings.open_bestiary;
                    self.phase = SortPhase::OpenBestiary(OpenBestiary::new(key));
                }
                SortPhase::OpenBestiary(bestiary) => {
                    ready!(bestiary.poll(cx)?);
                    self.phase = SortPhase::Discover;
                }
                SortPhase::Discover => {
                    Self::discover(cx)?;
                    self.phase = SortPhase::NextUnit;
                }
                SortPhase::NextUnit => {
                    cx.checkpoint()?;
                    match Self::next_unit(cx)? {
                        Some(unit) => self.phase = SortPhase::Convert(unit),
                        None => {
                            info!(converted = self.converted, "sort completed");
                            return Ok(Step::Done(()));
                        }
                    }
                }
                SortPhase::Convert(unit) => {
                    ready!(unit.poll(cx)?);
                    self.converted += 1;
                    debug!(converted = self.converted, "source unit processed");
                    self.phase = SortPhase::NextUnit;
                }
            }
        }
    }
}
