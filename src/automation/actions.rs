//! Input action primitives
//!
//! Clicks are emulated as discrete events spread over ticks: move the
//! pointer, let it settle, press, wait one tick, release. Once the press has
//! been issued the release always follows on the next poll; cancellation is
//! only observed while settling, before anything is pressed.

use std::time::Duration;

use tracing::debug;

use crate::automation::step::{Step, StepResult, TickContext, ready};
use crate::automation::wait::PollWait;
use crate::domain::core::{Point, Rect};
use crate::host::Snapshot;
use crate::input::{InputDriver, KeyHold, MouseButton, VirtualKey};

/// Longest time to wait for the pointer to reach its target
pub const SETTLE_TIMEOUT: Duration = Duration::from_millis(100);
/// Pointer counts as arrived when closer than this
pub const SETTLE_DISTANCE: f64 = 2.0;

/// Screen-space centroid of a client rectangle
pub fn click_point(snapshot: &Snapshot, rect: Rect) -> Point {
    snapshot.to_screen(rect.center())
}

/// Moves the pointer and waits, best effort, for it to arrive
#[derive(Debug, Clone)]
struct PointerApproach {
    target: Point,
    settle: Option<PollWait>,
}

impl PointerApproach {
    fn new(target: Point) -> Self {
        Self {
            target,
            settle: None,
        }
    }

    fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        if self.settle.is_none() {
            cx.input.set_pointer(self.target);
        }
        let wait = self
            .settle
            .get_or_insert_with(|| PollWait::new("pointer settle", SETTLE_TIMEOUT));

        let target = self.target;
        match wait.poll(cx, |snapshot| snapshot.pointer.distance(target) < SETTLE_DISTANCE) {
            Ok(step) => Ok(step),
            Err(err) if err.is_timeout() => {
                debug!(x = target.x, y = target.y, "pointer did not settle, clicking anyway");
                Ok(Step::Done(()))
            }
            Err(err) => Err(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickPhase {
    Approach,
    Press,
    Release,
    Finished,
}

/// Single click with either button
#[derive(Debug, Clone)]
pub struct Click {
    button: MouseButton,
    approach: PointerApproach,
    phase: ClickPhase,
}

impl Click {
    /// Click at a screen point
    pub fn new(button: MouseButton, target: Point) -> Self {
        Self {
            button,
            approach: PointerApproach::new(target),
            phase: ClickPhase::Approach,
        }
    }

    /// Left click on the centroid of a client rectangle
    pub fn left(snapshot: &Snapshot, rect: Rect) -> Self {
        Self::new(MouseButton::Left, click_point(snapshot, rect))
    }

    /// Right click on the centroid of a client rectangle
    pub fn right(snapshot: &Snapshot, rect: Rect) -> Self {
        Self::new(MouseButton::Right, click_point(snapshot, rect))
    }

    pub fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        loop {
            match self.phase {
                ClickPhase::Approach => {
                    ready!(self.approach.poll(cx)?);
                    self.phase = ClickPhase::Press;
                }
                ClickPhase::Press => {
                    cx.input.button_down(self.button);
                    self.phase = ClickPhase::Release;
                    return Ok(Step::Suspend);
                }
                ClickPhase::Release => {
                    cx.input.button_up(self.button);
                    self.phase = ClickPhase::Finished;
                    return Ok(Step::Done(()));
                }
                ClickPhase::Finished => return Ok(Step::Done(())),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierClickPhase {
    Approach,
    HoldModifier,
    Press,
    Release,
    LiftModifier,
    Finished,
}

/// Click performed while a modifier key is held
///
/// The modifier is held through a [`KeyHold`]; if the sequence is abandoned
/// part-way, [`ModifierClick::release_resources`] lifts it.
#[derive(Debug)]
pub struct ModifierClick {
    button: MouseButton,
    modifier: VirtualKey,
    approach: PointerApproach,
    hold: Option<KeyHold>,
    phase: ModifierClickPhase,
}

impl ModifierClick {
    pub fn new(modifier: VirtualKey, button: MouseButton, target: Point) -> Self {
        Self {
            button,
            modifier,
            approach: PointerApproach::new(target),
            hold: None,
            phase: ModifierClickPhase::Approach,
        }
    }

    pub fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        loop {
            match self.phase {
                ModifierClickPhase::Approach => {
                    ready!(self.approach.poll(cx)?);
                    self.phase = ModifierClickPhase::HoldModifier;
                }
                ModifierClickPhase::HoldModifier => {
                    self.hold = Some(KeyHold::acquire(self.modifier, cx.input));
                    self.phase = ModifierClickPhase::Press;
                    return Ok(Step::Suspend);
                }
                ModifierClickPhase::Press => {
                    cx.input.button_down(self.button);
                    self.phase = ModifierClickPhase::Release;
                    return Ok(Step::Suspend);
                }
                ModifierClickPhase::Release => {
                    cx.input.button_up(self.button);
                    self.phase = ModifierClickPhase::LiftModifier;
                    return Ok(Step::Suspend);
                }
                ModifierClickPhase::LiftModifier => {
                    self.release_resources(cx.input);
                    self.phase = ModifierClickPhase::Finished;
                    return Ok(Step::Done(()));
                }
                ModifierClickPhase::Finished => return Ok(Step::Done(())),
            }
        }
    }

    /// Lifts the modifier if this click still holds it
    pub fn release_resources(&mut self, input: &mut dyn InputDriver) {
        if let Some(hold) = self.hold.as_mut() {
            hold.release(input);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyTapPhase {
    Press,
    Release,
    Finished,
}

/// Key press and release one tick apart, followed by one settle tick
#[derive(Debug, Clone)]
pub struct KeyTap {
    key: VirtualKey,
    phase: KeyTapPhase,
}

impl KeyTap {
    pub fn new(key: VirtualKey) -> Self {
        Self {
            key,
            phase: KeyTapPhase::Press,
        }
    }

    pub fn poll(&mut self, cx: &mut TickContext<'_>) -> StepResult<()> {
        match self.phase {
            KeyTapPhase::Press => {
                cx.input.key_down(self.key);
                self.phase = KeyTapPhase::Release;
                Ok(Step::Suspend)
            }
            KeyTapPhase::Release => {
                cx.input.key_up(self.key);
                self.phase = KeyTapPhase::Finished;
                Ok(Step::Suspend)
            }
            KeyTapPhase::Finished => Ok(Step::Done(())),
        }
    }
}
