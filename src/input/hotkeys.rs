//! Hotkey bindings and edge-triggered activation signals
//!
//! The host reports raw key levels once per frame. Each activation signal
//! fires only on its rising edge, so holding F7 starts one operation rather
//! than one per frame.

use bitflags::bitflags;

/// Virtual key codes used by the bindings and the workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKey {
    Control = 0x11,
    I = 0x49,
    N = 0x4E,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    LControl = 0xA2,
}

impl VirtualKey {
    /// Windows virtual-key code
    pub fn code(self) -> u16 {
        self as u16
    }
}

bitflags! {
    /// Activation signals sampled in one frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Signals: u8 {
        const START_SORT = 1 << 0;
        const CANCEL = 1 << 1;
        const START_USE_ALL = 1 << 2;
        const START_RELEASE_FILTERED = 1 << 3;
    }
}

/// Key bindings for the control surface and the panel shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBindings {
    pub start_sort: VirtualKey,
    pub cancel: VirtualKey,
    pub start_use_all: VirtualKey,
    pub start_release_filtered: VirtualKey,
    /// Opens the inventory panel
    pub open_inventory: VirtualKey,
    /// Opens the challenges panel that hosts the bestiary
    pub open_bestiary: VirtualKey,
    /// Held for the whole release loop
    pub release_modifier: VirtualKey,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            start_sort: VirtualKey::F7,
            cancel: VirtualKey::F8,
            start_use_all: VirtualKey::F9,
            start_release_filtered: VirtualKey::F10,
            open_inventory: VirtualKey::I,
            open_bestiary: VirtualKey::N,
            release_modifier: VirtualKey::LControl,
        }
    }
}

impl HotkeyBindings {
    /// Builds the signal levels from a key-state query
    pub fn sample(&self, mut is_down: impl FnMut(VirtualKey) -> bool) -> Signals {
        let mut levels = Signals::empty();
        levels.set(Signals::START_SORT, is_down(self.start_sort));
        levels.set(Signals::CANCEL, is_down(self.cancel));
        levels.set(Signals::START_USE_ALL, is_down(self.start_use_all));
        levels.set(
            Signals::START_RELEASE_FILTERED,
            is_down(self.start_release_filtered),
        );
        levels
    }
}

/// Turns per-frame key levels into rising edges
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    previous: Signals,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the signals that went from up to down since the last frame
    pub fn update(&mut self, levels: Signals) -> Signals {
        let edges = levels & !self.previous;
        self.previous = levels;
        edges
    }
}
