//! Panel preconditions shared by the workflows

use tracing::{debug, info};

use crate::automation::actions::{Click, KeyTap};
use crate::automation::error::WorkflowError;
use crate::automation::step::{Step, StepResult, TickContext, ready};
use crate::automation::wait::PollWait;
use crate::domain::core::Rect;
use crate::domain::grid::InventoryLayout;
use crate::host::{Snapshot, UiPath};
use crate::input::VirtualKey;

/// Turns a wait timeout into the precondition failure for `path`
fn opened_or_failed(path: UiPath, result: StepResult<()>) -> StepResult<()> {
    match result {
        Err(err) if err.is_timeout() => Err(WorkflowError::PreconditionFailed(format!(
            "failed to open {}",
            path.label()
        ))),
        other => other,
    }
}

#[derive(Debug)]
enum EnsurePhase {
    Check,
    Open(KeyTap),
    Confirm(PollWait),
}

/// Opens a panel with its shortcut key unless it is already visible
#[derive(Debug)]
pub struct EnsurePanel {
    path: UiPath,
    key: VirtualKey,
    phase: EnsurePhase,
}

impl EnsurePanel {
    pub fn new(path: UiPath, key: VirtualKey) -> Self {
        Self {
            path,
            key,
            phase: EnsurePhase::Check,
        }
    }

    pub fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        let path = self.path;
        loop {
            match &mut self.phase {
                EnsurePhase::Check => {
                    if cx.snapshot().is_visible(path) {
                        debug!(panel = path.label(), "already visible");
                        return Ok(Step::Done(()));
                    }
                    cx.checkpoint()?;
                    info!(panel = path.label(), "not visible, attempting to open");
                    self.phase = EnsurePhase::Open(KeyTap::new(self.key));
                }
                EnsurePhase::Open(tap) => {
                    ready!(tap.poll(cx)?);
                    let wait = PollWait::new(path.label(), cx.settings().click_delay);
                    self.phase = EnsurePhase::Confirm(wait);
                }
                EnsurePhase::Confirm(wait) => {
                    let result = wait.poll(cx, |snapshot| snapshot.is_visible(path));
                    ready!(opened_or_failed(path, result)?);
                    info!(panel = path.label(), "opened");
                    return Ok(Step::Done(()));
                }
            }
        }
    }
}

#[derive(Debug)]
enum BestiaryPhase {
    Check,
    Challenges(EnsurePanel),
    SelectTab(Click),
    Confirm(PollWait),
}

/// Brings up the captured-beasts page of the bestiary
///
/// Opens the challenges panel if needed, clicks the bestiary tab when it is
/// showing, then waits for the captured-beasts page.
#[derive(Debug)]
pub struct OpenBestiary {
    key: VirtualKey,
    phase: BestiaryPhase,
}

impl OpenBestiary {
    pub fn new(key: VirtualKey) -> Self {
        Self {
            key,
            phase: BestiaryPhase::Check,
        }
    }

    pub fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        loop {
            match &mut self.phase {
                BestiaryPhase::Check => {
                    if cx.snapshot().is_visible(UiPath::CapturedBeastsTab) {
                        debug!("bestiary tab already visible");
                        return Ok(Step::Done(()));
                    }
                    self.phase = BestiaryPhase::Challenges(EnsurePanel::new(
                        UiPath::ChallengesPanel,
                        self.key,
                    ));
                }
                BestiaryPhase::Challenges(panel) => {
                    ready!(panel.poll(cx)?);
                    let snapshot = cx.snapshot();
                    if snapshot.is_visible(UiPath::CapturedBeastsTab) {
                        return Ok(Step::Done(()));
                    }
                    cx.checkpoint()?;
                    self.phase = match visible_rect(snapshot, UiPath::BestiaryTab) {
                        Some(tab) => BestiaryPhase::SelectTab(Click::left(snapshot, tab)),
                        None => BestiaryPhase::Confirm(PollWait::new(
                            UiPath::CapturedBeastsTab.label(),
                            cx.settings().click_delay,
                        )),
                    };
                }
                BestiaryPhase::SelectTab(click) => {
                    ready!(click.poll(cx)?);
                    self.phase = BestiaryPhase::Confirm(PollWait::new(
                        UiPath::CapturedBeastsTab.label(),
                        cx.settings().click_delay,
                    ));
                }
                BestiaryPhase::Confirm(wait) => {
                    let result =
                        wait.poll(cx, |snapshot| snapshot.is_visible(UiPath::CapturedBeastsTab));
                    ready!(opened_or_failed(UiPath::CapturedBeastsTab, result)?);
                    info!("bestiary tab opened");
                    return Ok(Step::Done(()));
                }
            }
        }
    }
}

/// Grid layout of the player's inventory in this snapshot
///
/// Fails with `PreconditionFailed` when the element does not resolve or is
/// too small to hold the grid.
pub fn inventory_layout(snapshot: &Snapshot) -> Result<InventoryLayout, WorkflowError> {
    let element = snapshot.resolve(UiPath::PlayerInventory).ok_or_else(|| {
        WorkflowError::PreconditionFailed("player inventory not found".to_string())
    })?;
    InventoryLayout::new(element.rect)
        .map_err(|err| WorkflowError::PreconditionFailed(err.to_string()))
}

/// Client rectangle of a visible element
pub fn visible_rect(snapshot: &Snapshot, path: UiPath) -> Option<Rect> {
    snapshot
        .resolve(path)
        .filter(|element| element.visible)
        .map(|element| element.rect)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::Settings;
    use crate::host::UiElement;
    use crate::input::InputEvent;
    use crate::testing::RecordingDriver;

    fn run(
        snapshots: impl Fn(usize) -> Snapshot,
        mut poll: impl FnMut(&mut TickContext<'_>) -> StepResult<()>,
    ) -> (Result<(), WorkflowError>, RecordingDriver) {
        let base = Instant::now();
        let settings = Settings::default();
        let mut driver = RecordingDriver::default();
        for tick in 0..50 {
            let snapshot = snapshots(tick);
            let mut cx = TickContext::new(
                &snapshot,
                &mut driver,
                &settings,
                base + Duration::from_millis(tick as u64 * 16),
                tick as u64,
                false,
            );
            match poll(&mut cx) {
                Ok(Step::Suspend) => continue,
                Ok(Step::Done(())) => return (Ok(()), driver),
                Err(err) => return (Err(err), driver),
            }
        }
        panic!("step did not finish");
    }

    fn panel() -> UiElement {
        UiElement::visible(Rect::new(0, 0, 100, 100))
    }

    #[test]
    fn visible_panel_needs_no_input() {
        let mut step = EnsurePanel::new(UiPath::InventoryPanel, VirtualKey::I);
        let (result, driver) = run(
            |_| Snapshot::new().with_element(UiPath::InventoryPanel, panel()),
            |cx| step.poll(cx),
        );
        assert_eq!(result, Ok(()));
        assert!(driver.events().is_empty());
    }

    #[test]
    fn hidden_panel_is_opened_with_its_key() {
        let mut step = EnsurePanel::new(UiPath::InventoryPanel, VirtualKey::I);
        // Panel appears once the key has been tapped
        let (result, driver) = run(
            |tick| {
                if tick >= 2 {
                    Snapshot::new().with_element(UiPath::InventoryPanel, panel())
                } else {
                    Snapshot::new()
                }
            },
            |cx| step.poll(cx),
        );
        assert_eq!(result, Ok(()));
        assert_eq!(
            driver.events(),
            &[InputEvent::KeyDown(VirtualKey::I), InputEvent::KeyUp(VirtualKey::I)]
        );
    }

    #[test]
    fn panel_that_never_opens_fails_precondition() {
        let mut step = EnsurePanel::new(UiPath::InventoryPanel, VirtualKey::I);
        let (result, _) = run(|_| Snapshot::new(), |cx| step.poll(cx));
        assert_eq!(
            result,
            Err(WorkflowError::PreconditionFailed(
                "failed to open inventory panel".to_string()
            ))
        );
    }

    #[test]
    fn bestiary_clicks_tab_inside_open_challenges_panel() {
        let tab = Rect::new(200, 100, 40, 20);
        let mut step = OpenBestiary::new(VirtualKey::N);
        let (result, driver) = run(
            |tick| {
                let snapshot = Snapshot::new()
                    .with_element(UiPath::ChallengesPanel, panel())
                    .with_element(UiPath::BestiaryTab, UiElement::visible(tab));
                if tick >= 4 {
                    snapshot.with_element(UiPath::CapturedBeastsTab, panel())
                } else {
                    snapshot
                }
            },
            |cx| step.poll(cx),
        );
        assert_eq!(result, Ok(()));
        assert_eq!(driver.events()[0], InputEvent::PointerMoved(tab.center()));
        assert!(!driver
            .events()
            .iter()
            .any(|e| matches!(e, InputEvent::KeyDown(_))));
    }

    #[test]
    fn missing_player_inventory_is_a_precondition_failure() {
        let err = inventory_layout(&Snapshot::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionFailed(_)));

        let snapshot = Snapshot::new().with_element(
            UiPath::PlayerInventory,
            UiElement::visible(Rect::new(100, 400, 600, 250)),
        );
        assert_eq!(inventory_layout(&snapshot).unwrap().cell_size(), (50, 50));
    }
}
