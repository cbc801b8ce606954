//! Geometry shared by the grid allocator, the click primitives and snapshots
//!
//! Pixel values are client coordinates unless a field says otherwise. Item
//! footprints reuse [`Rect`] in grid-cell units.

/// A position in pixels or cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translates by `by`, e.g. client to screen via the window origin
    pub fn offset(&self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }

    /// Euclidean distance
    pub fn distance(&self, other: Point) -> f64 {
        f64::from(self.x - other.x).hypot(f64::from(self.y - other.y))
    }
}

/// Axis-aligned box with an inclusive top-left and exclusive far edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive x bound, saturating at the i32 range
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive y bound, saturating at the i32 range
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Centroid, rounded toward the top-left
    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.w / 2),
            self.y.saturating_add(self.h / 2),
        )
    }

    pub fn contains_point(&self, p: Point) -> bool {
        (self.x..self.right()).contains(&p.x) && (self.y..self.bottom()).contains(&p.y)
    }

    /// Part of `self` inside `bounds`; None when nothing is left
    pub fn clip_to(&self, bounds: &Rect) -> Option<Rect> {
        let x = self.x.max(bounds.x);
        let y = self.y.max(bounds.y);
        let w = self.right().min(bounds.right()).saturating_sub(x);
        let h = self.bottom().min(bounds.bottom()).saturating_sub(y);
        (w > 0 && h > 0).then(|| Rect::new(x, y, w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_center() {
        let cell = Rect::new(100, 400, 50, 50);
        assert_eq!((cell.right(), cell.bottom()), (150, 450));
        assert_eq!(cell.center(), Point::new(125, 425));
        // Odd sizes round toward the origin
        assert_eq!(Rect::new(0, 0, 5, 3).center(), Point::new(2, 1));
    }

    #[test]
    fn far_edges_are_exclusive() {
        let handle = Rect::new(960, 126, 24, 24);
        assert!(handle.contains_point(Point::new(960, 126)));
        assert!(handle.contains_point(Point::new(983, 149)));
        assert!(!handle.contains_point(Point::new(984, 140)));
        assert!(!handle.contains_point(Point::new(970, 150)));
    }

    #[test]
    fn clipping_keeps_the_overlap() {
        let grid = Rect::new(0, 0, 12, 5);
        assert_eq!(Rect::new(10, 3, 4, 4).clip_to(&grid), Some(Rect::new(10, 3, 2, 2)));
        assert_eq!(Rect::new(-1, -1, 2, 2).clip_to(&grid), Some(Rect::new(0, 0, 1, 1)));
        assert_eq!(Rect::new(12, 0, 1, 1).clip_to(&grid), None);
    }

    #[test]
    fn extreme_coordinates_saturate() {
        let far = Rect::new(i32::MAX - 1, i32::MAX - 1, 5, 5);
        assert_eq!((far.right(), far.bottom()), (i32::MAX, i32::MAX));
        assert_eq!(far.clip_to(&Rect::new(0, 0, 12, 5)), None);

        let wide = Rect::new(i32::MIN, 0, i32::MAX, 1);
        assert_eq!(wide.right(), -1);
        assert_eq!(wide.clip_to(&Rect::new(0, 0, 12, 5)), None);
    }

    #[test]
    fn point_distance_and_offset() {
        assert_eq!(Point::new(0, 0).distance(Point::new(3, 4)), 5.0);
        assert_eq!(Point::new(3, 4).offset(Point::new(10, -4)), Point::new(13, 0));
    }
}
