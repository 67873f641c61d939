//! Occupancy grid: binary wall/empty cells queried from continuous
//! coordinates.

use serde::{Deserialize, Serialize};

/// Read-only view of an occupancy grid.
///
/// Cells outside `0..cols × 0..rows` count as walls for every query made
/// through [`is_blocked`](Occupancy::is_blocked): the grid boundary acts as an
/// implicit wall.
pub trait Occupancy {
    fn cols(&self) -> usize;
    fn rows(&self) -> usize;
    /// Side length of a cell in world units (pixels).
    fn cell_size(&self) -> f64;
    /// Wall test for an in-bounds cell. Out-of-bounds indices return `true`.
    fn is_wall(&self, cell_x: i64, cell_y: i64) -> bool;

    /// Cell containing a world-space point (floor division, so negative
    /// coordinates land in negative cells).
    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        let s = self.cell_size();
        ((x / s).floor() as i64, (y / s).floor() as i64)
    }

    fn in_bounds(&self, cell_x: i64, cell_y: i64) -> bool {
        cell_x >= 0
            && cell_y >= 0
            && (cell_x as usize) < self.cols()
            && (cell_y as usize) < self.rows()
    }

    /// Wall or outside the grid at a world-space point.
    fn is_blocked(&self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return true;
        }
        let (cx, cy) = self.cell_of(x, y);
        !self.in_bounds(cx, cy) || self.is_wall(cx, cy)
    }

    fn width(&self) -> f64 {
        self.cols() as f64 * self.cell_size()
    }

    fn height(&self) -> f64 {
        self.rows() as f64 * self.cell_size()
    }
}

/// Row-major boolean grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallGrid {
    cols: usize,
    rows: usize,
    cell_size: f64,
    cells: Vec<bool>,
}

impl WallGrid {
    /// All-empty grid.
    pub fn new(cols: usize, rows: usize, cell_size: f64) -> Self {
        Self {
            cols,
            rows,
            cell_size,
            cells: vec![false; cols * rows],
        }
    }

    fn index(&self, cell_x: i64, cell_y: i64) -> Option<usize> {
        if self.in_bounds(cell_x, cell_y) {
            Some(cell_y as usize * self.cols + cell_x as usize)
        } else {
            None
        }
    }

    /// Set one cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell_x: i64, cell_y: i64, wall: bool) {
        if let Some(i) = self.index(cell_x, cell_y) {
            self.cells[i] = wall;
        }
    }

    /// Draw or erase the cell under a world-space point (editor brush).
    pub fn set_wall_at(&mut self, x: f64, y: f64, wall: bool) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let (cx, cy) = self.cell_of(x, y);
        self.set(cx, cy, wall);
    }

    /// Set every cell in `rows × cols` (half-open ranges, clipped to the grid).
    pub fn fill(&mut self, rows: std::ops::Range<i64>, cols: std::ops::Range<i64>, wall: bool) {
        for y in rows {
            for x in cols.clone() {
                self.set(x, y, wall);
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Centre of a cell in world coordinates.
    pub fn cell_center(&self, cell_x: i64, cell_y: i64) -> (f64, f64) {
        (
            (cell_x as f64 + 0.5) * self.cell_size,
            (cell_y as f64 + 0.5) * self.cell_size,
        )
    }

    /// Iterator over the coordinates of every wall cell.
    pub fn walls(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.cells.iter().enumerate().filter(|(_, c)| **c).map(move |(i, _)| {
            ((i % self.cols) as i64, (i / self.cols) as i64)
        })
    }
}

impl Occupancy for WallGrid {
    fn cols(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn is_wall(&self, cell_x: i64, cell_y: i64) -> bool {
        match self.index(cell_x, cell_y) {
            Some(i) => self.cells[i],
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_lookup_uses_floor_division() {
        let g = WallGrid::new(10, 10, 10.0);
        assert_eq!(g.cell_of(0.0, 0.0), (0, 0));
        assert_eq!(g.cell_of(9.99, 10.0), (0, 1));
        assert_eq!(g.cell_of(-0.5, 5.0), (-1, 0));
    }

    #[test]
    fn outside_grid_is_blocked() {
        let g = WallGrid::new(10, 10, 10.0);
        assert!(!g.is_blocked(50.0, 50.0));
        assert!(g.is_blocked(-1.0, 50.0));
        assert!(g.is_blocked(50.0, 100.0));
        assert!(g.is_blocked(f64::NAN, 5.0));
        assert!(g.is_wall(10, 0));
    }

    #[test]
    fn editing_walls() {
        let mut g = WallGrid::new(10, 10, 10.0);
        g.set_wall_at(35.0, 42.0, true);
        assert!(g.is_wall(3, 4));
        assert!(g.is_blocked(31.0, 49.0));
        g.set_wall_at(35.0, 42.0, false);
        assert!(!g.is_wall(3, 4));

        // ignored, not a panic
        g.set_wall_at(-20.0, 500.0, true);
        assert_eq!(g.wall_count(), 0);
    }

    #[test]
    fn fill_clips_to_grid() {
        let mut g = WallGrid::new(5, 5, 1.0);
        g.fill(-2..2, 3..9, true);
        // rows 0..2, cols 3..5
        assert_eq!(g.wall_count(), 4);
        assert_eq!(g.walls().collect::<Vec<_>>(), vec![(3, 0), (4, 0), (3, 1), (4, 1)]);
    }
}
