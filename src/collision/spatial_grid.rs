// Uniform spatial hash for broad-phase collision detection.

use std::collections::HashMap;

use crate::collision::Aabb;

/// Bodies covering more cells than this skip the grid and are paired with
/// everything instead (screen-sized walls, scroll bounds).
const MAX_CELLS_PER_BODY: i64 = 64;

/// Above this many retained cells the map is dropped and rebuilt, so bodies
/// that wander far away don't keep their old cells allocated forever.
const MAX_RETAINED_CELLS: usize = 4096;

/// An unbounded uniform grid keyed by integer cell coordinates.
///
/// Cell vectors survive [`SpatialGrid::clear`] so the steady-state frame
/// loop does not allocate.
#[derive(Debug)]
pub struct SpatialGrid {
    inv_cell_size: f64,
    cells: HashMap<(i32, i32), Vec<usize>>,
    oversized: Vec<usize>,
    /// Bounds indexed by body slot, `None` for slots not inserted this pass.
    bounds: Vec<Option<Aabb>>,
    inserted: Vec<usize>,
}

impl SpatialGrid {
    /// `cell_size` must be positive; the engine config validates it.
    pub fn new(cell_size: f64) -> Self {
        SpatialGrid {
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
            bounds: Vec::new(),
            inserted: Vec::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, value: f64) -> i32 {
        // Float-to-int casts saturate, so far-away coordinates clamp to the edge cells.
        (value * self.inv_cell_size).floor() as i32
    }

    fn cell_range(&self, aabb: &Aabb) -> (i32, i32, i32, i32) {
        (
            self.cell_coord(aabb.min.x),
            self.cell_coord(aabb.min.y),
            self.cell_coord(aabb.max.x),
            self.cell_coord(aabb.max.y),
        )
    }

    /// Empties every cell while keeping their storage.
    pub fn clear(&mut self) {
        if self.cells.len() > MAX_RETAINED_CELLS {
            self.cells.clear();
        } else {
            for indices in self.cells.values_mut() {
                indices.clear();
            }
        }
        self.oversized.clear();
        for &index in &self.inserted {
            self.bounds[index] = None;
        }
        self.inserted.clear();
    }

    /// Inserts a body's world-space bounds under its arena slot index.
    pub fn insert(&mut self, body_index: usize, aabb: Aabb) {
        if self.bounds.len() <= body_index {
            self.bounds.resize(body_index + 1, None);
        }
        self.bounds[body_index] = Some(aabb);
        self.inserted.push(body_index);

        let (min_col, min_row, max_col, max_row) = self.cell_range(&aabb);
        let span = (i64::from(max_col) - i64::from(min_col) + 1)
            * (i64::from(max_row) - i64::from(min_row) + 1);
        if span > MAX_CELLS_PER_BODY {
            self.oversized.push(body_index);
            return;
        }

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                self.cells.entry((col, row)).or_default().push(body_index);
            }
        }
    }

    pub fn bounds(&self, body_index: usize) -> Option<&Aabb> {
        self.bounds.get(body_index).and_then(Option::as_ref)
    }

    /// Writes every pair of inserted bodies whose bounds overlap into `pairs`,
    /// as `(low, high)` slot indices in ascending order without duplicates.
    pub fn query_pairs(&self, pairs: &mut Vec<(usize, usize)>) {
        pairs.clear();

        for indices in self.cells.values() {
            for (i, &a) in indices.iter().enumerate() {
                for &b in &indices[i + 1..] {
                    pairs.push((a.min(b), a.max(b)));
                }
            }
        }
        for &big in &self.oversized {
            for &other in &self.inserted {
                if other != big {
                    pairs.push((big.min(other), big.max(other)));
                }
            }
        }

        // Cell iteration order is unspecified; sorting makes the output deterministic.
        pairs.sort_unstable();
        pairs.dedup();
        pairs.retain(|&(a, b)| match (self.bounds(a), self.bounds(b)) {
            (Some(box_a), Some(box_b)) => box_a.overlaps(box_b),
            _ => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    fn aabb(min: (f64, f64), max: (f64, f64)) -> Aabb {
        Aabb::new(Vec2::new(min.0, min.1), Vec2::new(max.0, max.1))
    }

    #[test]
    fn test_cell_coords() {
        let grid = SpatialGrid::new(5.0);
        assert_eq!(grid.cell_coord(0.0), 0);
        assert_eq!(grid.cell_coord(4.9), 0);
        assert_eq!(grid.cell_coord(5.0), 1);
        assert_eq!(grid.cell_coord(-0.1), -1);
        assert_eq!(grid.cell_coord(-5.0), -1);
        assert_eq!(grid.cell_coord(-5.1), -2);
        assert_eq!(grid.cell_coord(f64::MAX), i32::MAX);
    }

    #[test]
    fn test_insert_and_clear() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(0, aabb((1.0, 1.0), (4.0, 4.0)));
        grid.insert(1, aabb((4.0, 4.0), (6.0, 6.0)));

        assert_eq!(grid.cells[&(0, 0)], vec![0, 1]);
        assert_eq!(grid.cells[&(1, 0)], vec![1]);
        assert_eq!(grid.cells[&(0, 1)], vec![1]);
        assert_eq!(grid.cells[&(1, 1)], vec![1]);
        assert!(grid.bounds(1).is_some());

        grid.clear();
        assert!(grid.cells.values().all(Vec::is_empty));
        assert!(grid.bounds(0).is_none());
        assert!(grid.bounds(1).is_none());
    }

    #[test]
    fn test_query_pairs() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(0, aabb((1.0, 1.0), (2.0, 2.0)));
        grid.insert(1, aabb((1.5, 1.5), (4.0, 4.0)));
        // Shares cell (0,0) with body 0 but the boxes don't touch.
        grid.insert(2, aabb((3.0, 0.0), (3.5, 0.5)));
        // Spans four cells and overlaps bodies 1 and 4.
        grid.insert(3, aabb((3.5, 3.5), (6.0, 6.0)));
        grid.insert(4, aabb((5.5, 5.5), (7.0, 7.0)));
        grid.insert(5, aabb((20.0, 20.0), (21.0, 21.0)));

        let mut pairs = Vec::new();
        grid.query_pairs(&mut pairs);
        assert_eq!(pairs, vec![(0, 1), (1, 3), (3, 4)]);
    }

    #[test]
    fn test_oversized_bodies_pair_with_everything_they_touch() {
        let mut grid = SpatialGrid::new(1.0);
        // A floor spanning 100 cells.
        grid.insert(7, aabb((-50.0, -1.0), (50.0, 0.0)));
        grid.insert(2, aabb((3.0, -0.5), (4.0, 0.5)));
        grid.insert(9, aabb((3.0, 10.0), (4.0, 11.0)));
        assert_eq!(grid.oversized, vec![7]);

        let mut pairs = Vec::new();
        grid.query_pairs(&mut pairs);
        assert_eq!(pairs, vec![(2, 7)]);
    }

    #[test]
    fn test_pairs_are_deduplicated_across_cells() {
        let mut grid = SpatialGrid::new(1.0);
        // Both boxes cover the same 3x3 block of cells.
        grid.insert(0, aabb((0.0, 0.0), (2.5, 2.5)));
        grid.insert(1, aabb((0.5, 0.5), (2.0, 2.0)));
        let mut pairs = Vec::new();
        grid.query_pairs(&mut pairs);
        assert_eq!(pairs, vec![(0, 1)]);
    }
}
