//! Inventory and cursor queries shared by the workflows

use tracing::info;

use crate::config::Settings;
use crate::domain::classify::{is_product_item, is_source_item};
use crate::domain::inventory::{CursorState, ItemId, ItemSlot};
use crate::host::Snapshot;

/// True when the item resolves to a source unit and detection is on
pub fn is_source(snapshot: &Snapshot, settings: &Settings, item_id: ItemId) -> bool {
    settings.detect_source_items && snapshot.display_name(item_id).is_some_and(is_source_item)
}

pub fn is_product(snapshot: &Snapshot, item_id: ItemId) -> bool {
    snapshot.display_name(item_id).is_some_and(is_product_item)
}

/// Valid, non-empty source stacks in container order
pub fn source_slots<'s>(snapshot: &'s Snapshot, settings: &Settings) -> Vec<&'s ItemSlot> {
    snapshot
        .inventory
        .slots()
        .iter()
        .filter(|slot| slot.is_valid && slot.stack_count > 0)
        .filter(|slot| is_source(snapshot, settings, slot.item_id))
        .collect()
}

/// Valid product items in container order
pub fn product_slots(snapshot: &Snapshot) -> Vec<&ItemSlot> {
    snapshot
        .inventory
        .slots()
        .iter()
        .filter(|slot| slot.is_valid && is_product(snapshot, slot.item_id))
        .collect()
}

/// Sum of stack sizes
pub fn total_units(slots: &[&ItemSlot]) -> u32 {
    slots
        .iter()
        .fold(0u32, |acc, slot| acc.saturating_add(slot.stack_count))
}

/// Cursor carries the given source, or anything named like a source
pub fn holds_source(snapshot: &Snapshot, settings: &Settings, source: ItemId) -> bool {
    snapshot
        .cursor
        .held_item()
        .is_some_and(|held| held == source || is_source(snapshot, settings, held))
}

/// Cursor carries an item that is not the source just applied
pub fn holds_new_item(snapshot: &Snapshot, source: ItemId) -> bool {
    snapshot.cursor.held_item().is_some_and(|held| {
        held != source && !snapshot.display_name(held).is_some_and(is_source_item)
    })
}

/// Cursor no longer carries a source or product
pub fn is_placed(snapshot: &Snapshot) -> bool {
    match snapshot.cursor {
        CursorState::Free | CursorState::HoldingForSell => true,
        CursorState::HoldingItem(held) => !snapshot
            .display_name(held)
            .is_some_and(|name| is_source_item(name) || is_product_item(name)),
    }
}

/// Logs every resolved inventory name
pub fn log_item_names(snapshot: &Snapshot) {
    for slot in snapshot.inventory.slots() {
        let name = snapshot.display_name(slot.item_id).unwrap_or("<unresolved>");
        info!(
            x = slot.x,
            y = slot.y,
            stack = slot.stack_count,
            valid = slot.is_valid,
            "item: {name}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::InventorySnapshot;

    fn snapshot() -> Snapshot {
        let mut stale = ItemSlot::new(4, 0, ItemId(4), 2);
        stale.is_valid = false;
        let mut snapshot = Snapshot::new()
            .with_name(ItemId(1), "Bestiary Orb")
            .with_name(ItemId(2), "Imprinted Bestiary Orb")
            .with_name(ItemId(3), "Chaos Orb")
            .with_name(ItemId(4), "bestiary orb")
            .with_name(ItemId(5), "Bestiary Orb");
        snapshot.inventory = InventorySnapshot::new(vec![
            ItemSlot::new(0, 0, ItemId(1), 3),
            ItemSlot::new(1, 0, ItemId(2), 1),
            ItemSlot::new(2, 0, ItemId(3), 10),
            stale,
            ItemSlot::new(5, 0, ItemId(5), 0),
            ItemSlot::new(6, 0, ItemId(9), 1),
        ]);
        snapshot
    }

    #[test]
    fn sources_exclude_products_stale_and_empty_stacks() {
        let snapshot = snapshot();
        let settings = Settings::default();
        let sources = source_slots(&snapshot, &settings);
        assert_eq!(
            sources.iter().map(|s| s.item_id).collect::<Vec<_>>(),
            vec![ItemId(1)]
        );
        assert_eq!(total_units(&sources), 3);

        let products = product_slots(&snapshot);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].item_id, ItemId(2));
    }

    #[test]
    fn detection_switch_hides_sources() {
        let snapshot = snapshot();
        let settings = Settings {
            detect_source_items: false,
            ..Settings::default()
        };
        assert!(source_slots(&snapshot, &settings).is_empty());
        assert_eq!(product_slots(&snapshot).len(), 1);
    }

    #[test]
    fn cursor_predicates() {
        let mut snapshot = snapshot();
        let settings = Settings::default();

        snapshot.cursor = CursorState::HoldingItem(ItemId(1));
        assert!(holds_source(&snapshot, &settings, ItemId(1)));
        assert!(!holds_new_item(&snapshot, ItemId(1)));
        assert!(!is_placed(&snapshot));

        snapshot.cursor = CursorState::HoldingItem(ItemId(2));
        assert!(holds_new_item(&snapshot, ItemId(1)));
        assert!(!is_placed(&snapshot));

        snapshot.cursor = CursorState::HoldingItem(ItemId(3));
        assert!(is_placed(&snapshot));

        snapshot.cursor = CursorState::Free;
        assert!(is_placed(&snapshot));
        assert!(!holds_source(&snapshot, &settings, ItemId(1)));
    }
}
