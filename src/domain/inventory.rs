//! Inventory, cursor and target-list state as seen in one snapshot
//!
//! These are plain values copied out of the host every tick. Nothing here
//! holds a reference into the host application, so a value can never go
//! stale behind the caller's back; it is simply dropped at the end of the tick.

use crate::domain::core::Rect;

/// Opaque identity of an item entity in the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// One occupied region of the inventory grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSlot {
    /// Grid column of the top-left cell
    pub x: i32,
    /// Grid row of the top-left cell
    pub y: i32,
    /// Footprint width in cells
    pub width: i32,
    /// Footprint height in cells
    pub height: i32,
    pub item_id: ItemId,
    /// Units in the stack; non-stackable items report 1
    pub stack_count: u32,
    pub is_valid: bool,
}

impl ItemSlot {
    /// Creates a valid single-cell slot
    pub fn new(x: i32, y: i32, item_id: ItemId, stack_count: u32) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
            item_id,
            stack_count,
            is_valid: true,
        }
    }

    /// Sets the footprint size in cells
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Footprint in grid cell coordinates, not clipped
    pub fn footprint(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Ordered list of the player's inventory slots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    slots: Vec<ItemSlot>,
}

impl InventorySnapshot {
    pub fn new(slots: Vec<ItemSlot>) -> Self {
        Self { slots }
    }

    /// Slots in container iteration order
    pub fn slots(&self) -> &[ItemSlot] {
        &self.slots
    }

    /// Finds a valid slot holding the given item
    pub fn find(&self, item_id: ItemId) -> Option<&ItemSlot> {
        self.slots.iter().find(|slot| slot.is_valid && slot.item_id == item_id)
    }
}

/// What the host's pointer is currently carrying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorState {
    #[default]
    Free,
    HoldingItem(ItemId),
    HoldingForSell,
}

impl CursorState {
    /// Item on the cursor, if any
    pub fn held_item(&self) -> Option<ItemId> {
        match self {
            CursorState::HoldingItem(id) => Some(*id),
            _ => None,
        }
    }
}

/// One entry of the bestiary target list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub id: u64,
    pub display_name: String,
    /// Bounds of the entry itself, clicked when applying an item
    pub rect: Rect,
    /// Bounds of the entry's release button, if the host exposes one
    pub release_handle: Option<Rect>,
    pub is_valid: bool,
}

/// Ordered target list; index 0 is the conventional target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    entries: Vec<TargetEntry>,
}

impl TargetList {
    pub fn new(entries: Vec<TargetEntry>) -> Self {
        Self { entries }
    }

    /// Entry at index 0, valid or not
    pub fn first(&self) -> Option<&TargetEntry> {
        self.entries.first()
    }

    /// Entry at index 0 if it is valid
    pub fn primary(&self) -> Option<&TargetEntry> {
        self.first().filter(|entry| entry.is_valid)
    }
}
