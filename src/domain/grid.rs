//! Inventory grid geometry and free-slot allocation
//!
//! The player inventory is a fixed 12×5 grid. This module rasterizes item
//! footprints into an occupancy matrix, finds the first free cell in
//! row-major order, and maps grid cells to screen rectangles using the
//! inventory panel's bounds.
//!
//! Occupancy is always derived from the snapshot passed in. Nothing is cached
//! between calls, because the host can move items between any two ticks.

use crate::domain::core::{Point, Rect};
use crate::domain::inventory::{InventorySnapshot, ItemSlot};
use thiserror::Error;

/// Number of inventory columns
pub const GRID_COLS: usize = 12;
/// Number of inventory rows
pub const GRID_ROWS: usize = 5;

/// Errors that can occur when building an inventory layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Panel bounds cannot hold a grid cell of at least one pixel
    #[error("inventory panel {width}x{height} is too small for a {cols}x{rows} grid")]
    PanelTooSmall {
        width: i32,
        height: i32,
        cols: usize,
        rows: usize,
    },
    /// Grid position outside [0, 12) x [0, 5)
    #[error("cell ({x}, {y}) is outside the inventory grid")]
    InvalidCoordinates { x: usize, y: usize },
}

/// A cell of the inventory grid, x is the column and y the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Boolean occupancy matrix derived from one inventory snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOccupancy {
    cells: [[bool; GRID_COLS]; GRID_ROWS],
}

impl GridOccupancy {
    /// Rasterizes every valid item's footprint onto the grid
    ///
    /// Footprints reaching past the grid edges are clipped rather than
    /// rejected; the in-bounds part still occupies its cells.
    pub fn from_snapshot(snapshot: &InventorySnapshot) -> Self {
        let mut cells = [[false; GRID_COLS]; GRID_ROWS];
        let bounds = Rect::new(0, 0, GRID_COLS as i32, GRID_ROWS as i32);

        for slot in snapshot.slots().iter().filter(|slot| slot.is_valid) {
            let Some(clipped) = slot.footprint().clip_to(&bounds) else {
                continue;
            };
            for y in clipped.y..clipped.bottom() {
                for x in clipped.x..clipped.right() {
                    cells[y as usize][x as usize] = true;
                }
            }
        }

        Self { cells }
    }

    /// Returns true if the cell is covered by a valid item
    ///
    /// Out-of-range positions report occupied so callers never place there.
    pub fn is_occupied(&self, pos: GridPos) -> bool {
        match self.cells.get(pos.y).and_then(|row| row.get(pos.x)) {
            Some(occupied) => *occupied,
            None => true,
        }
    }

    /// First free cell scanning rows top to bottom, columns left to right
    pub fn first_free(&self) -> Option<GridPos> {
        (0..GRID_ROWS)
            .flat_map(|y| (0..GRID_COLS).map(move |x| GridPos::new(x, y)))
            .find(|pos| !self.is_occupied(*pos))
    }

    /// Number of unoccupied cells
    pub fn free_count(&self) -> usize {
        self.cells.iter().flatten().filter(|occupied| !**occupied).count()
    }
}

/// Finds the row-major first free inventory cell
///
/// Deterministic and side-effect free: identical snapshots give identical answers.
pub fn find_free_slot(snapshot: &InventorySnapshot) -> Option<GridPos> {
    GridOccupancy::from_snapshot(snapshot).first_free()
}

/// Source units consumed and product units created by one application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionYield {
    pub consumed: u32,
    pub produced: u32,
}

/// One orb in, one imprinted orb out
pub const IMPRINT_YIELD: ConversionYield = ConversionYield {
    consumed: 1,
    produced: 1,
};

/// Decides whether another conversion fits in the inventory
///
/// With free cells available the answer is always yes. With none, the
/// conversion may still proceed when it consumes the final source units and
/// produces no more units than it consumes: emptying the last stack frees the
/// cell the product needs. Yields that produce more than they consume never
/// qualify for that exception.
pub fn capacity_allows(
    free_cells: usize,
    remaining_units: u32,
    conversion: ConversionYield,
) -> bool {
    if free_cells > 0 {
        return true;
    }
    remaining_units > 0
        && remaining_units <= conversion.consumed
        && conversion.produced <= conversion.consumed
}

/// Maps inventory grid cells to screen rectangles
///
/// Built from the player-inventory element's client rectangle each time a
/// click target is needed, so it follows the panel if the host moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryLayout {
    /// Client area covered by the grid
    area: Rect,
    cell_width: i32,
    cell_height: i32,
}

impl InventoryLayout {
    /// Creates a layout for the given panel bounds
    ///
    /// # Returns
    /// A layout or GridError if the panel cannot hold a 12x5 grid
    pub fn new(area: Rect) -> Result<Self, GridError> {
        let cell_width = area.w / GRID_COLS as i32;
        let cell_height = area.h / GRID_ROWS as i32;

        if cell_width <= 0 || cell_height <= 0 {
            return Err(GridError::PanelTooSmall {
                width: area.w,
                height: area.h,
                cols: GRID_COLS,
                rows: GRID_ROWS,
            });
        }

        Ok(Self {
            area,
            cell_width,
            cell_height,
        })
    }

    /// Returns the pixel dimensions of each cell as (width, height)
    pub fn cell_size(&self) -> (i32, i32) {
        (self.cell_width, self.cell_height)
    }

    /// Converts a grid position to its screen rectangle
    pub fn cell_rect(&self, pos: GridPos) -> Result<Rect, GridError> {
        if pos.x >= GRID_COLS || pos.y >= GRID_ROWS {
            return Err(GridError::InvalidCoordinates { x: pos.x, y: pos.y });
        }

        let x = self.area.x + pos.x as i32 * self.cell_width;
        let y = self.area.y + pos.y as i32 * self.cell_height;
        Ok(Rect::new(x, y, self.cell_width, self.cell_height))
    }

    /// Screen rectangle covered by an item's full footprint
    pub fn slot_rect(&self, slot: &ItemSlot) -> Rect {
        Rect::new(
            self.area.x.saturating_add(slot.x.saturating_mul(self.cell_width)),
            self.area.y.saturating_add(slot.y.saturating_mul(self.cell_height)),
            slot.width.saturating_mul(self.cell_width),
            slot.height.saturating_mul(self.cell_height),
        )
    }

    /// Grid cell under a client point, if the point lies on the grid
    pub fn cell_at(&self, point: Point) -> Option<GridPos> {
        let grid = Rect::new(
            self.area.x,
            self.area.y,
            self.cell_width * GRID_COLS as i32,
            self.cell_height * GRID_ROWS as i32,
        );
        if !grid.contains_point(point) {
            return None;
        }

        let x = (point.x - self.area.x) / self.cell_width;
        let y = (point.y - self.area.y) / self.cell_height;
        Some(GridPos::new(x as usize, y as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::ItemId;

    fn slot(x: i32, y: i32, w: i32, h: i32) -> ItemSlot {
        ItemSlot::new(x, y, ItemId((x * 100 + y) as u64), 1).with_size(w, h)
    }

    fn snapshot(slots: Vec<ItemSlot>) -> InventorySnapshot {
        InventorySnapshot::new(slots)
    }

    #[test]
    fn empty_grid_starts_at_origin() {
        assert_eq!(find_free_slot(&snapshot(vec![])), Some(GridPos::new(0, 0)));
    }

    #[test]
    fn skips_large_item_and_neighbour() {
        let inv = snapshot(vec![slot(0, 0, 2, 2), slot(2, 0, 1, 1)]);
        assert_eq!(find_free_slot(&inv), Some(GridPos::new(3, 0)));
    }

    #[test]
    fn scan_is_row_major() {
        // Row 0 full; (0,1) must win over (5,0)-style column-first answers
        let inv = snapshot(vec![slot(0, 0, 12, 1)]);
        assert_eq!(find_free_slot(&inv), Some(GridPos::new(0, 1)));

        let inv = snapshot(vec![slot(0, 0, 12, 1), slot(0, 1, 1, 4)]);
        assert_eq!(find_free_slot(&inv), Some(GridPos::new(1, 1)));
    }

    #[test]
    fn full_grid_has_no_slot() {
        let inv = snapshot(vec![slot(0, 0, 12, 5)]);
        assert_eq!(find_free_slot(&inv), None);
        assert_eq!(GridOccupancy::from_snapshot(&inv).free_count(), 0);
    }

    #[test]
    fn oversized_footprints_are_clipped_not_rejected() {
        // Hangs off the right and bottom edges
        let inv = snapshot(vec![slot(10, 3, 4, 4)]);
        let occupancy = GridOccupancy::from_snapshot(&inv);
        assert!(occupancy.is_occupied(GridPos::new(11, 4)));
        assert!(occupancy.is_occupied(GridPos::new(10, 3)));
        assert_eq!(occupancy.free_count(), 60 - 4);

        // Starts off the top-left corner
        let inv = snapshot(vec![slot(-1, -1, 2, 2)]);
        let occupancy = GridOccupancy::from_snapshot(&inv);
        assert!(occupancy.is_occupied(GridPos::new(0, 0)));
        assert_eq!(occupancy.free_count(), 59);
        assert_eq!(occupancy.first_free(), Some(GridPos::new(1, 0)));
    }

    #[test]
    fn footprints_at_the_integer_limits_do_not_occupy() {
        let inv = snapshot(vec![
            ItemSlot::new(i32::MAX - 1, 0, ItemId(1), 1).with_size(5, 1),
            ItemSlot::new(0, i32::MAX, ItemId(2), 1).with_size(1, i32::MAX),
            ItemSlot::new(i32::MIN, i32::MIN, ItemId(3), 1).with_size(3, 3),
        ]);
        assert_eq!(GridOccupancy::from_snapshot(&inv).free_count(), 60);
        assert_eq!(find_free_slot(&inv), Some(GridPos::new(0, 0)));
    }

    #[test]
    fn invalid_items_do_not_occupy() {
        let mut stale = slot(0, 0, 1, 1);
        stale.is_valid = false;
        assert_eq!(find_free_slot(&snapshot(vec![stale])), Some(GridPos::new(0, 0)));
    }

    #[test]
    fn result_is_first_unoccupied_for_every_single_hole() {
        // Fill the grid except one cell and check the hole is always found
        for hole_y in 0..GRID_ROWS {
            for hole_x in 0..GRID_COLS {
                let mut slots = Vec::new();
                for y in 0..GRID_ROWS {
                    for x in 0..GRID_COLS {
                        if (x, y) != (hole_x, hole_y) {
                            slots.push(slot(x as i32, y as i32, 1, 1));
                        }
                    }
                }
                let inv = snapshot(slots);
                assert_eq!(find_free_slot(&inv), Some(GridPos::new(hole_x, hole_y)));
                assert_eq!(find_free_slot(&inv), find_free_slot(&inv));
            }
        }
    }

    #[test]
    fn capacity_rule_exempts_only_the_final_unit() {
        assert!(capacity_allows(3, 10, IMPRINT_YIELD));
        assert!(capacity_allows(0, 1, IMPRINT_YIELD));
        assert!(!capacity_allows(0, 2, IMPRINT_YIELD));
        assert!(!capacity_allows(0, 0, IMPRINT_YIELD));

        let doubling = ConversionYield {
            consumed: 1,
            produced: 2,
        };
        assert!(!capacity_allows(0, 1, doubling));
    }

    #[test]
    fn layout_maps_cells_both_ways() {
        let layout = InventoryLayout::new(Rect::new(100, 400, 600, 250)).unwrap();
        assert_eq!(layout.cell_size(), (50, 50));
        assert_eq!(
            layout.cell_rect(GridPos::new(3, 1)).unwrap(),
            Rect::new(250, 450, 50, 50)
        );
        assert_eq!(layout.cell_at(Point::new(275, 475)), Some(GridPos::new(3, 1)));
        assert_eq!(layout.cell_at(Point::new(99, 400)), None);
        assert_eq!(layout.cell_at(Point::new(700, 400)), None);

        let big = slot(2, 0, 2, 3);
        assert_eq!(layout.slot_rect(&big), Rect::new(200, 400, 100, 150));
    }

    #[test]
    fn layout_rejects_bad_input() {
        assert!(matches!(
            InventoryLayout::new(Rect::new(0, 0, 11, 100)),
            Err(GridError::PanelTooSmall { .. })
        ));
        let layout = InventoryLayout::new(Rect::new(0, 0, 120, 50)).unwrap();
        assert_eq!(
            layout.cell_rect(GridPos::new(12, 0)),
            Err(GridError::InvalidCoordinates { x: 12, y: 0 })
        );
    }
}
