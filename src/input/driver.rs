//! Synthetic input sink
//!
//! The driver is fire-and-forget: calls do not report success, and the
//! workflows assume an event has taken effect by the next tick. Anything that
//! must be confirmed is confirmed by observing a later snapshot.

use crate::domain::core::Point;
use crate::input::hotkeys::VirtualKey;

/// Pointer buttons used by the workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Accepts synthetic pointer and keyboard events
pub trait InputDriver {
    fn set_pointer(&mut self, pos: Point);
    fn key_down(&mut self, key: VirtualKey);
    fn key_up(&mut self, key: VirtualKey);
    fn button_down(&mut self, button: MouseButton);
    fn button_up(&mut self, button: MouseButton);
}

/// One issued input event, as recorded by test and simulation drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMoved(Point),
    KeyDown(VirtualKey),
    KeyUp(VirtualKey),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
}

/// Scoped ownership of a held-down key
///
/// `acquire` presses the key; `release` lifts it at most once no matter how
/// many exit paths call it. A hold dropped while still pressed is reported,
/// since the driver is no longer reachable to lift the key.
#[derive(Debug)]
pub struct KeyHold {
    key: VirtualKey,
    held: bool,
}

impl KeyHold {
    /// Presses the key and returns the hold
    pub fn acquire(key: VirtualKey, input: &mut dyn InputDriver) -> Self {
        input.key_down(key);
        Self { key, held: true }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Lifts the key if it is still held
    pub fn release(&mut self, input: &mut dyn InputDriver) {
        if self.held {
            input.key_up(self.key);
            self.held = false;
        }
    }
}

impl Drop for KeyHold {
    fn drop(&mut self) {
        if self.held {
            tracing::error!(key = ?self.key, "key hold dropped while still pressed");
        }
    }
}
