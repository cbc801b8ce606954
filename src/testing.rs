//! Testing harnesses for workflows and the sequencer
//!
//! Provides an input recorder and a scripted host application so workflows
//! can be driven tick by tick without a real game client.
//!
//! # Features
//!
//! - Deterministic, synchronous execution on a simulated frame clock
//! - Every issued input event is logged in order
//! - The simulated host reacts to clicks and key taps the way the game does
//!   for the supported workflows
//! - Fault injection: an inert mode and a one-shot panic on press
//!
//! # Example
//!
//! ```
//! use beast_sorter::app::{OperationKind, OperationSequencer, OperationStatus};
//! use beast_sorter::config::Settings;
//! use beast_sorter::testing::{FrameClock, SimulatedHost, run_to_completion};
//!
//! let mut host = SimulatedHost::new().with_panels_open();
//! host.add_item("Bestiary Orb", 0, 0, 2);
//! host.add_target("Vivid Vulture");
//! host.add_target("Craicic Chimeral");
//!
//! let mut sequencer = OperationSequencer::new(Settings::default());
//! sequencer.activate(OperationKind::SortCurrency);
//! let status = run_to_completion(&mut sequencer, &mut host, &mut FrameClock::new(), 2_000);
//!
//! assert_eq!(status, OperationStatus::Succeeded(OperationKind::SortCurrency));
//! assert_eq!(host.count_named("Imprinted Bestiary Orb"), 2);
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::app::{OperationSequencer, OperationStatus};
use crate::domain::classify::{PRODUCT_ITEM_NAME, is_product_item, is_source_item};
use crate::domain::core::{Point, Rect};
use crate::domain::grid::{GRID_COLS, GRID_ROWS, GridOccupancy, GridPos, InventoryLayout};
use crate::domain::inventory::{
    CursorState, InventorySnapshot, ItemId, ItemSlot, TargetEntry, TargetList,
};
use crate::host::{Snapshot, StateProvider, UiElement, UiPath};
use crate::input::{InputDriver, InputEvent, MouseButton, VirtualKey};

/// Simulated frame length
pub const FRAME: Duration = Duration::from_millis(16);

/// Input driver that only records what it is asked to do
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    events: Vec<InputEvent>,
}

impl RecordingDriver {
    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of times an exact event was issued
    pub fn count(&self, event: InputEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    /// Target of the most recent pointer move
    pub fn last_pointer(&self) -> Option<Point> {
        self.events.iter().rev().find_map(|event| match event {
            InputEvent::PointerMoved(pos) => Some(*pos),
            _ => None,
        })
    }
}

impl InputDriver for RecordingDriver {
    fn set_pointer(&mut self, pos: Point) {
        self.events.push(InputEvent::PointerMoved(pos));
    }

    fn key_down(&mut self, key: VirtualKey) {
        self.events.push(InputEvent::KeyDown(key));
    }

    fn key_up(&mut self, key: VirtualKey) {
        self.events.push(InputEvent::KeyUp(key));
    }

    fn button_down(&mut self, button: MouseButton) {
        self.events.push(InputEvent::ButtonDown(button));
    }

    fn button_up(&mut self, button: MouseButton) {
        self.events.push(InputEvent::ButtonUp(button));
    }
}

/// Monotonic clock advancing one frame per call
#[derive(Debug, Clone)]
pub struct FrameClock {
    base: Instant,
    frames: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            frames: 0,
        }
    }

    /// Time of the next frame
    pub fn next(&mut self) -> Instant {
        self.frames += 1;
        self.base + FRAME * self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Ticks the sequencer until it leaves Running or `max_ticks` is reached
pub fn run_to_completion(
    sequencer: &mut OperationSequencer,
    host: &mut SimulatedHost,
    clock: &mut FrameClock,
    max_ticks: usize,
) -> OperationStatus {
    let mut status = sequencer.status();
    for _ in 0..max_ticks {
        status = sequencer.tick(host, clock.next());
        if !matches!(status, OperationStatus::Running(_)) {
            break;
        }
    }
    status
}

/// Scripted stand-in for the game client
///
/// Panels open on their shortcut keys, the bestiary tab opens when clicked,
/// and clicks on inventory cells and bestiary entries change the inventory,
/// cursor and target list the way the workflows expect. Changes are visible
/// in the next snapshot.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    pub inventory_open: bool,
    pub challenges_open: bool,
    pub captured_tab_open: bool,
    pub cursor: CursorState,
    pub pointer: Point,
    pub window_origin: Point,
    /// Client rectangle of the player inventory grid
    pub inventory_area: Rect,
    /// Client rectangle of the bestiary tab button
    pub bestiary_tab: Rect,
    /// When set, input is recorded but has no effect
    pub inert: bool,
    slots: Vec<ItemSlot>,
    names: HashMap<ItemId, String>,
    targets: Vec<TargetEntry>,
    modifier_held: bool,
    panic_on_left_press: bool,
    next_item: u64,
    next_target: u64,
    events: Vec<InputEvent>,
    snapshots: usize,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self {
            inventory_open: false,
            challenges_open: false,
            captured_tab_open: false,
            cursor: CursorState::Free,
            pointer: Point::new(0, 0),
            window_origin: Point::new(0, 0),
            inventory_area: Rect::new(100, 400, 600, 250),
            bestiary_tab: Rect::new(300, 60, 80, 24),
            inert: false,
            slots: Vec::new(),
            names: HashMap::new(),
            targets: Vec::new(),
            modifier_held: false,
            panic_on_left_press: false,
            next_item: 1,
            next_target: 1,
            events: Vec::new(),
            snapshots: 0,
        }
    }

    /// Inventory, challenges panel and captured-beasts tab already showing
    pub fn with_panels_open(mut self) -> Self {
        self.inventory_open = true;
        self.challenges_open = true;
        self.captured_tab_open = true;
        self
    }

    /// Adds a 1x1 item stack and returns its id
    pub fn add_item(&mut self, name: &str, x: i32, y: i32, stack: u32) -> ItemId {
        self.add_sized_item(name, x, y, 1, 1, stack)
    }

    pub fn add_sized_item(
        &mut self,
        name: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        stack: u32,
    ) -> ItemId {
        let id = self.new_item_id(name);
        self.slots
            .push(ItemSlot::new(x, y, id, stack).with_size(width, height));
        id
    }

    /// Occupies every free cell with a 1x1 item of the given name
    pub fn fill_free_cells(&mut self, name: &str) {
        let occupancy = GridOccupancy::from_snapshot(&self.inventory());
        for y in 0..GRID_ROWS {
            for x in 0..GRID_COLS {
                if !occupancy.is_occupied(GridPos::new(x, y)) {
                    self.add_item(name, x as i32, y as i32, 1);
                }
            }
        }
    }

    /// Appends a bestiary entry with a release button and returns its id
    pub fn add_target(&mut self, name: &str) -> u64 {
        let id = self.next_target;
        self.next_target += 1;
        self.targets.push(TargetEntry {
            id,
            display_name: name.to_string(),
            rect: Rect::new(0, 0, 0, 0),
            release_handle: None,
            is_valid: true,
        });
        self.layout_targets();
        id
    }

    /// Mutable access to a target entry, for corrupting it in tests
    pub fn target_mut(&mut self, index: usize) -> Option<&mut TargetEntry> {
        self.targets.get_mut(index)
    }

    /// Panics inside the next left-button press
    pub fn panic_on_next_left_press(&mut self) {
        self.panic_on_left_press = true;
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Number of times an exact event was issued
    pub fn count(&self, event: InputEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    pub fn snapshots_taken(&self) -> usize {
        self.snapshots
    }

    pub fn modifier_held(&self) -> bool {
        self.modifier_held
    }

    pub fn slots(&self) -> &[ItemSlot] {
        &self.slots
    }

    pub fn targets(&self) -> &[TargetEntry] {
        &self.targets
    }

    pub fn stack_of(&self, id: ItemId) -> Option<u32> {
        self.slots
            .iter()
            .find(|slot| slot.item_id == id)
            .map(|slot| slot.stack_count)
    }

    /// Items in the inventory whose name matches exactly
    pub fn count_named(&self, name: &str) -> usize {
        self.slots
            .iter()
            .filter(|slot| self.names.get(&slot.item_id).is_some_and(|n| n == name))
            .count()
    }

    fn new_item_id(&mut self, name: &str) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        self.names.insert(id, name.to_string());
        id
    }

    fn inventory(&self) -> InventorySnapshot {
        InventorySnapshot::new(self.slots.clone())
    }

    fn layout_targets(&mut self) {
        for (i, entry) in self.targets.iter_mut().enumerate() {
            let y = 120 + i as i32 * 40;
            entry.rect = Rect::new(760, y, 240, 36);
            entry.release_handle = Some(Rect::new(960, y + 6, 24, 24));
        }
    }

    fn name_of(&self, id: ItemId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    fn bestiary_showing(&self) -> bool {
        self.challenges_open && self.captured_tab_open
    }

    fn layout(&self) -> Option<InventoryLayout> {
        InventoryLayout::new(self.inventory_area).ok()
    }

    /// Index of the slot covering a client point
    fn slot_at(&self, client: Point) -> Option<usize> {
        let cell = self.layout()?.cell_at(client)?;
        let cell = Point::new(cell.x as i32, cell.y as i32);
        self.slots
            .iter()
            .position(|slot| slot.is_valid && slot.footprint().contains_point(cell))
    }

    fn right_click(&mut self, client: Point) {
        if !self.inventory_open || self.cursor != CursorState::Free {
            return;
        }
        let Some(index) = self.slot_at(client) else {
            return;
        };
        let id = self.slots[index].item_id;
        let name = self.name_of(id).unwrap_or_default();
        if is_source_item(name) {
            self.cursor = CursorState::HoldingItem(id);
        } else if is_product_item(name) {
            self.slots.remove(index);
        }
    }

    fn left_click(&mut self, client: Point) {
        let held = self.cursor.held_item();

        if let Some(source) = held.filter(|id| self.slots.iter().any(|s| s.item_id == *id)) {
            let hit = if self.bestiary_showing() {
                self.targets
                    .iter()
                    .position(|t| t.is_valid && t.rect.contains_point(client))
            } else {
                None
            };
            if let Some(target) = hit {
                self.apply(source, target);
            }
            return;
        }

        if let Some(product) = held {
            let Some(cell) = self.layout().and_then(|layout| layout.cell_at(client)) else {
                return;
            };
            if self.inventory_open
                && !GridOccupancy::from_snapshot(&self.inventory()).is_occupied(cell)
            {
                self.slots
                    .push(ItemSlot::new(cell.x as i32, cell.y as i32, product, 1));
                self.cursor = CursorState::Free;
            }
            return;
        }

        if self.challenges_open && self.bestiary_tab.contains_point(client) {
            self.captured_tab_open = true;
            return;
        }

        if self.modifier_held && self.bestiary_showing() {
            let hit = self.targets.iter().position(|t| {
                t.release_handle
                    .is_some_and(|handle| handle.contains_point(client))
            });
            if let Some(index) = hit {
                self.targets.remove(index);
                self.layout_targets();
            }
        }
    }

    /// Consumes one source unit on a target and puts the product on the cursor
    fn apply(&mut self, source: ItemId, target: usize) {
        if let Some(index) = self.slots.iter().position(|s| s.item_id == source) {
            let slot = &mut self.slots[index];
            slot.stack_count = slot.stack_count.saturating_sub(1);
            if slot.stack_count == 0 {
                self.slots.remove(index);
            }
        }
        self.targets.remove(target);
        self.layout_targets();
        let product = self.new_item_id(PRODUCT_ITEM_NAME);
        self.cursor = CursorState::HoldingItem(product);
    }

    fn client_pointer(&self) -> Point {
        Point::new(
            self.pointer.x - self.window_origin.x,
            self.pointer.y - self.window_origin.y,
        )
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl StateProvider for SimulatedHost {
    fn snapshot(&mut self) -> Snapshot {
        self.snapshots += 1;

        let panel = |open: bool, rect: Rect| {
            if open {
                UiElement::visible(rect)
            } else {
                UiElement::hidden(rect)
            }
        };

        let mut snapshot = Snapshot::new()
            .with_element(
                UiPath::InventoryPanel,
                panel(self.inventory_open, Rect::new(80, 380, 640, 300)),
            )
            .with_element(
                UiPath::PlayerInventory,
                panel(self.inventory_open, self.inventory_area),
            )
            .with_element(
                UiPath::ChallengesPanel,
                panel(self.challenges_open, Rect::new(40, 40, 980, 600)),
            )
            .with_element(
                UiPath::BestiaryTab,
                panel(self.challenges_open, self.bestiary_tab),
            )
            .with_element(
                UiPath::CapturedBeastsTab,
                panel(self.bestiary_showing(), Rect::new(740, 100, 280, 500)),
            );

        for (id, name) in &self.names {
            snapshot.set_name(*id, name.clone());
        }
        snapshot.inventory = self.inventory();
        snapshot.cursor = self.cursor;
        snapshot.pointer = self.pointer;
        snapshot.window_origin = self.window_origin;
        if self.bestiary_showing() {
            snapshot.targets = TargetList::new(self.targets.clone());
        }
        snapshot
    }
}

impl InputDriver for SimulatedHost {
    fn set_pointer(&mut self, pos: Point) {
        self.events.push(InputEvent::PointerMoved(pos));
        if !self.inert {
            self.pointer = pos;
        }
    }

    fn key_down(&mut self, key: VirtualKey) {
        self.events.push(InputEvent::KeyDown(key));
        if matches!(key, VirtualKey::LControl | VirtualKey::Control) {
            self.modifier_held = true;
        }
    }

    fn key_up(&mut self, key: VirtualKey) {
        self.events.push(InputEvent::KeyUp(key));
        if matches!(key, VirtualKey::LControl | VirtualKey::Control) {
            self.modifier_held = false;
        }
        if self.inert {
            return;
        }
        match key {
            VirtualKey::I => self.inventory_open = !self.inventory_open,
            VirtualKey::N => self.challenges_open = !self.challenges_open,
            _ => {}
        }
    }

    fn button_down(&mut self, button: MouseButton) {
        self.events.push(InputEvent::ButtonDown(button));
        if button == MouseButton::Left && self.panic_on_left_press {
            self.panic_on_left_press = false;
            panic!("simulated host fault on left press");
        }
    }

    fn button_up(&mut self, button: MouseButton) {
        self.events.push(InputEvent::ButtonUp(button));
        if self.inert {
            return;
        }
        let client = self.client_pointer();
        match button {
            MouseButton::Right => self.right_click(client),
            MouseButton::Left => self.left_click(client),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_taps_toggle_panels() {
        let mut host = SimulatedHost::new();
        assert!(!host.snapshot().is_visible(UiPath::InventoryPanel));

        host.key_down(VirtualKey::I);
        host.key_up(VirtualKey::I);
        assert!(host.snapshot().is_visible(UiPath::InventoryPanel));
        assert!(host.snapshot().is_visible(UiPath::PlayerInventory));
    }

    #[test]
    fn apply_and_place_round_trip() {
        let mut host = SimulatedHost::new().with_panels_open();
        let orb = host.add_item("Bestiary Orb", 0, 0, 2);
        host.add_target("Vivid Vulture");

        // Pick up the orb at cell (0,0)
        host.set_pointer(Point::new(125, 425));
        host.button_down(MouseButton::Right);
        host.button_up(MouseButton::Right);
        assert_eq!(host.cursor, CursorState::HoldingItem(orb));

        // Apply it to the first target
        let target = host.targets()[0].rect.center();
        host.set_pointer(target);
        host.button_down(MouseButton::Left);
        host.button_up(MouseButton::Left);
        assert_eq!(host.stack_of(orb), Some(1));
        assert!(host.targets().is_empty());
        let product = host.cursor.held_item().unwrap();
        assert_ne!(product, orb);

        // Place it at cell (1,0)
        host.set_pointer(Point::new(175, 425));
        host.button_down(MouseButton::Left);
        host.button_up(MouseButton::Left);
        assert_eq!(host.cursor, CursorState::Free);
        assert_eq!(host.count_named("Imprinted Bestiary Orb"), 1);
    }

    #[test]
    fn release_needs_modifier() {
        let mut host = SimulatedHost::new().with_panels_open();
        host.add_target("Vivid Vulture");
        let handle = host.targets()[0].release_handle.unwrap().center();

        host.set_pointer(handle);
        host.button_down(MouseButton::Left);
        host.button_up(MouseButton::Left);
        assert_eq!(host.targets().len(), 1);

        host.key_down(VirtualKey::LControl);
        host.button_down(MouseButton::Left);
        host.button_up(MouseButton::Left);
        host.key_up(VirtualKey::LControl);
        assert!(host.targets().is_empty());
    }

    #[test]
    fn fill_leaves_no_free_cells() {
        let mut host = SimulatedHost::new();
        host.add_sized_item("Chest", 0, 0, 2, 2, 1);
        host.fill_free_cells("Scroll");
        assert_eq!(GridOccupancy::from_snapshot(&host.inventory()).free_count(), 0);
        assert_eq!(host.slots().len(), 1 + 60 - 4);
    }
}
