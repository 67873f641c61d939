//! Preset track layouts.
//!
//! Each preset fills a [`WallGrid`] with walls. Sizes are in cells; the
//! layouts scale with the grid and assume roughly the default 124 × 100.

use serde::{Deserialize, Serialize};

use crate::grid::WallGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackPreset {
    /// Rectangular loop with a gate opening in the left wall.
    #[default]
    Rectangle,
    /// Horizontal corridor whose walls follow a sine wave.
    STrack,
    /// Ring around the grid centre, walls thickened by one cell.
    FigureEight,
    /// Corridor that narrows and widens in a zig-zag.
    ZigZag,
    /// Rectangle plus pillars and bars.
    BorderMaze,
}

impl TrackPreset {
    pub fn all() -> [TrackPreset; 5] {
        [
            TrackPreset::Rectangle,
            TrackPreset::STrack,
            TrackPreset::FigureEight,
            TrackPreset::ZigZag,
            TrackPreset::BorderMaze,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackPreset::Rectangle => "Rectangle",
            TrackPreset::STrack => "S-Track",
            TrackPreset::FigureEight => "Figure 8",
            TrackPreset::ZigZag => "ZigZag",
            TrackPreset::BorderMaze => "Border Maze",
        }
    }

    /// Preset by 0-based index (hotkeys 1..5).
    pub fn from_index(index: usize) -> Option<TrackPreset> {
        Self::all().get(index).copied()
    }

    pub fn build(self, cols: usize, rows: usize, cell_size: f64) -> WallGrid {
        let mut g = WallGrid::new(cols, rows, cell_size);
        let (c, r) = (cols as i64, rows as i64);
        match self {
            TrackPreset::Rectangle => rectangle(&mut g, c, r, 2),
            TrackPreset::STrack => s_track(&mut g, c, r),
            TrackPreset::FigureEight => figure_eight(&mut g, c, r),
            TrackPreset::ZigZag => zigzag(&mut g, c, r),
            TrackPreset::BorderMaze => border_maze(&mut g, c, r),
        }
        g
    }
}

fn rectangle(g: &mut WallGrid, cols: i64, rows: i64, t: i64) {
    g.fill(5..rows - 5, 5..5 + t, true);
    g.fill(5..rows - 5, cols - 5 - t..cols - 5, true);
    g.fill(5..5 + t, 5..cols - 5, true);
    g.fill(rows - 5 - t..rows - 5, 5..cols - 5, true);
    // gate
    g.fill(rows / 2 - 2..rows / 2 + 2, 5..5 + t, false);
}

fn s_track(g: &mut WallGrid, cols: i64, rows: i64) {
    for x in 10..cols - 10 {
        let y_top = (10.0 + 10.0 * (x as f64 / 8.0).sin()) as i64;
        let y_bot = rows - y_top - 1;
        g.fill(y_top..y_top + 2, x..x + 1, true);
        g.fill(y_bot - 2..y_bot, x..x + 1, true);
    }
}

fn figure_eight(g: &mut WallGrid, cols: i64, rows: i64) {
    let (cx, cy) = (cols / 2, rows / 2);
    let r = (cols.min(rows) / 4) as f64;
    let samples = 1500;
    let mut ring = WallGrid::new(cols as usize, rows as usize, 1.0);
    for i in 0..samples {
        let a = std::f64::consts::TAU * i as f64 / (samples - 1) as f64;
        let x1 = (cx as f64 - r * a.cos()) as i64;
        let y1 = (cy as f64 - r * a.sin()) as i64;
        let x2 = (cx as f64 + r * a.cos()) as i64;
        let y2 = (cy as f64 + r * a.sin()) as i64;
        ring.set(x1, y1, true);
        ring.set(x2, y2, true);
    }
    // thicken with a plus-shaped kernel
    for (x, y) in ring.walls() {
        for (dx, dy) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
            g.set(x + dx, y + dy, true);
        }
    }
}

fn zigzag(g: &mut WallGrid, cols: i64, rows: i64) {
    let mut x = 8;
    let mut y = 8;
    let mut dy = 1;
    for _ in 0..(cols - 16).max(0) {
        let top = y;
        let bot = rows - y - 1;
        g.fill(top..top + 2, x..x + 1, true);
        g.fill(bot - 2..bot, x..x + 1, true);
        x += 1;
        y += dy;
        if y < 6 || y > rows / 2 - 6 {
            dy = -dy;
        }
    }
}

fn border_maze(g: &mut WallGrid, cols: i64, rows: i64) {
    rectangle(g, cols, rows, 2);
    for i in (10..rows - 10).step_by(8) {
        g.fill(i..i + 2, cols / 3..cols / 3 + 1, true);
        g.fill(i..i + 2, 2 * cols / 3..2 * cols / 3 + 1, true);
    }
    for j in (12..cols - 12).step_by(10) {
        g.fill(rows / 3..rows / 3 + 1, j..j + 2, true);
        g.fill(2 * rows / 3..2 * rows / 3 + 1, j..j + 2, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Occupancy;

    const COLS: usize = 124;
    const ROWS: usize = 100;

    #[test]
    fn every_preset_has_walls_and_keeps_size() {
        for preset in TrackPreset::all() {
            let g = preset.build(COLS, ROWS, 10.0);
            assert_eq!((g.cols(), g.rows()), (COLS, ROWS));
            assert!(g.wall_count() > 50, "{} has {} walls", preset.name(), g.wall_count());
        }
    }

    #[test]
    fn rectangle_has_gate_in_left_wall() {
        let g = TrackPreset::Rectangle.build(COLS, ROWS, 10.0);
        assert!(g.is_wall(5, 10));
        assert!(g.is_wall(6, 10));
        assert!(!g.is_wall(5, 50));
        assert!(!g.is_wall(6, 49));
        // default start (248, 500) sits inside the loop on free floor
        assert!(!g.is_blocked(248.0, 500.0));
    }

    #[test]
    fn figure_eight_is_symmetric() {
        let g = TrackPreset::FigureEight.build(COLS, ROWS, 10.0);
        assert!(g.wall_count() > 100);
        // the ring crosses the centre row at cx ± r
        let (cx, cy, r) = (62_i64, 50_i64, 25_i64);
        assert!(g.is_wall(cx - r, cy));
        assert!(g.is_wall(cx + r, cy));
    }

    #[test]
    fn from_index_matches_order() {
        assert_eq!(TrackPreset::from_index(0), Some(TrackPreset::Rectangle));
        assert_eq!(TrackPreset::from_index(4), Some(TrackPreset::BorderMaze));
        assert_eq!(TrackPreset::from_index(5), None);
    }

    #[test]
    fn tiny_grids_do_not_panic() {
        for preset in TrackPreset::all() {
            let g = preset.build(6, 6, 10.0);
            assert_eq!(g.cols(), 6);
        }
    }
}
