//! Win32 input backend
//!
//! Pointer moves go through `SetCursorPos`; buttons and keys are injected
//! with `SendInput`. Injection is fire-and-forget: a call the system blocks
//! is logged and otherwise ignored, and the workflows notice the missing
//! effect through their confirmation waits.

use tracing::warn;
use windows::Win32::UI::Input::KeyboardAndMouse::*;
use windows::Win32::UI::WindowsAndMessaging::SetCursorPos;

use crate::domain::core::Point;
use crate::input::{HotkeyBindings, InputDriver, MouseButton, Signals, VirtualKey};

/// Injects input into whatever window has focus
#[derive(Debug, Default)]
pub struct SendInputDriver;

impl SendInputDriver {
    pub fn new() -> Self {
        Self
    }
}

fn mouse_input(flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dwFlags: flags,
                ..Default::default()
            },
        },
    }
}

fn key_input(key: VirtualKey, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(key.code()),
                dwFlags: flags,
                ..Default::default()
            },
        },
    }
}

fn send(input: INPUT) {
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent != 1 {
        warn!("SendInput was blocked");
    }
}

fn button_flags(button: MouseButton, down: bool) -> MOUSE_EVENT_FLAGS {
    match (button, down) {
        (MouseButton::Left, true) => MOUSEEVENTF_LEFTDOWN,
        (MouseButton::Left, false) => MOUSEEVENTF_LEFTUP,
        (MouseButton::Right, true) => MOUSEEVENTF_RIGHTDOWN,
        (MouseButton::Right, false) => MOUSEEVENTF_RIGHTUP,
    }
}

impl InputDriver for SendInputDriver {
    fn set_pointer(&mut self, pos: Point) {
        if let Err(err) = unsafe { SetCursorPos(pos.x, pos.y) } {
            warn!(x = pos.x, y = pos.y, %err, "SetCursorPos failed");
        }
    }

    fn key_down(&mut self, key: VirtualKey) {
        send(key_input(key, KEYBD_EVENT_FLAGS(0)));
    }

    fn key_up(&mut self, key: VirtualKey) {
        send(key_input(key, KEYEVENTF_KEYUP));
    }

    fn button_down(&mut self, button: MouseButton) {
        send(mouse_input(button_flags(button, true)));
    }

    fn button_up(&mut self, button: MouseButton) {
        send(mouse_input(button_flags(button, false)));
    }
}

/// Current physical state of a key
pub fn is_key_down(key: VirtualKey) -> bool {
    let state = unsafe { GetAsyncKeyState(i32::from(key.code())) };
    (state as u16 & 0x8000) != 0
}

/// Raw activation levels for one frame
pub fn poll_signal_levels(bindings: &HotkeyBindings) -> Signals {
    bindings.sample(is_key_down)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_input_carries_code_and_flags() {
        let input = key_input(VirtualKey::LControl, KEYEVENTF_KEYUP);
        assert_eq!(input.r#type, INPUT_KEYBOARD);
        let ki = unsafe { input.Anonymous.ki };
        assert_eq!(ki.wVk, VIRTUAL_KEY(0xA2));
        assert_eq!(ki.dwFlags, KEYEVENTF_KEYUP);
    }

    #[test]
    fn button_flags_match_direction() {
        assert_eq!(button_flags(MouseButton::Left, true), MOUSEEVENTF_LEFTDOWN);
        assert_eq!(button_flags(MouseButton::Right, false), MOUSEEVENTF_RIGHTUP);
    }
}
