//! One tick's read-only view of the host application
//!
//! A snapshot is an owned copy. The sequencer fetches exactly one per tick
//! and drops it when the tick ends, so no workflow can act on state older
//! than the current frame.

use std::collections::HashMap;

use crate::domain::core::{Point, Rect};
use crate::domain::inventory::{CursorState, InventorySnapshot, ItemId, TargetList};

/// Addressable UI elements
///
/// Each path names a whole chain of nested host handles. The provider walks
/// the chain and either yields the element or omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiPath {
    InventoryPanel,
    /// Grid area of the player's main inventory inside the panel
    PlayerInventory,
    ChallengesPanel,
    /// Bestiary tab button inside the challenges panel
    BestiaryTab,
    /// Captured-beasts page of the bestiary tab
    CapturedBeastsTab,
}

impl UiPath {
    /// Human-readable name for logs and errors
    pub fn label(self) -> &'static str {
        match self {
            UiPath::InventoryPanel => "inventory panel",
            UiPath::PlayerInventory => "player inventory",
            UiPath::ChallengesPanel => "challenges panel",
            UiPath::BestiaryTab => "bestiary tab",
            UiPath::CapturedBeastsTab => "captured beasts tab",
        }
    }
}

/// Resolved UI element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiElement {
    /// Client rectangle
    pub rect: Rect,
    pub visible: bool,
}

impl UiElement {
    pub fn visible(rect: Rect) -> Self {
        Self { rect, visible: true }
    }

    pub fn hidden(rect: Rect) -> Self {
        Self {
            rect,
            visible: false,
        }
    }
}

/// State of the host application in one frame
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    elements: HashMap<UiPath, UiElement>,
    names: HashMap<ItemId, String>,
    pub inventory: InventorySnapshot,
    pub cursor: CursorState,
    /// Pointer position in screen coordinates
    pub pointer: Point,
    pub targets: TargetList,
    /// Screen position of the client area's top-left corner
    pub window_origin: Point,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an element; None when any segment of its path is missing
    pub fn resolve(&self, path: UiPath) -> Option<&UiElement> {
        self.elements.get(&path)
    }

    /// True only when the element resolves and is visible
    pub fn is_visible(&self, path: UiPath) -> bool {
        self.resolve(path).is_some_and(|element| element.visible)
    }

    /// Display name of an item, if the host could resolve it
    pub fn display_name(&self, item_id: ItemId) -> Option<&str> {
        self.names.get(&item_id).map(String::as_str)
    }

    /// Converts a client point to screen coordinates
    pub fn to_screen(&self, client: Point) -> Point {
        client.offset(self.window_origin)
    }

    pub fn set_element(&mut self, path: UiPath, element: UiElement) {
        self.elements.insert(path, element);
    }

    pub fn set_name(&mut self, item_id: ItemId, name: impl Into<String>) {
        self.names.insert(item_id, name.into());
    }

    pub fn with_element(mut self, path: UiPath, element: UiElement) -> Self {
        self.set_element(path, element);
        self
    }

    pub fn with_name(mut self, item_id: ItemId, name: impl Into<String>) -> Self {
        self.set_name(item_id, name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_hidden_elements_are_not_visible() {
        let snapshot = Snapshot::new()
            .with_element(UiPath::InventoryPanel, UiElement::visible(Rect::new(0, 0, 10, 10)))
            .with_element(UiPath::ChallengesPanel, UiElement::hidden(Rect::new(0, 0, 10, 10)));

        assert!(snapshot.is_visible(UiPath::InventoryPanel));
        assert!(!snapshot.is_visible(UiPath::ChallengesPanel));
        assert!(snapshot.resolve(UiPath::ChallengesPanel).is_some());
        assert!(!snapshot.is_visible(UiPath::CapturedBeastsTab));
        assert!(snapshot.resolve(UiPath::CapturedBeastsTab).is_none());
    }

    #[test]
    fn names_and_screen_offset() {
        let mut snapshot = Snapshot::new().with_name(ItemId(4), "Bestiary Orb");
        snapshot.window_origin = Point::new(8, 31);

        assert_eq!(snapshot.display_name(ItemId(4)), Some("Bestiary Orb"));
        assert_eq!(snapshot.display_name(ItemId(5)), None);
        assert_eq!(snapshot.to_screen(Point::new(100, 100)), Point::new(108, 131));
    }
}
