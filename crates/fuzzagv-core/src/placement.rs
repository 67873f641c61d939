//! Random spawn placement on free floor.

use rand::Rng;

use fuzzagv_logic::grid::{Occupancy, WallGrid};
use fuzzagv_logic::vehicle::Pose;

/// Random tries before falling back to a scan of the grid.
const MAX_ATTEMPTS: usize = 256;

/// A cell is a spawn candidate when it and its 8 neighbours are free.
fn is_open(grid: &WallGrid, cx: i64, cy: i64) -> bool {
    (-1..=1).all(|dy| (-1..=1).all(|dx| !grid.is_wall(cx + dx, cy + dy)))
}

/// Pose at the centre of a random open cell with a random heading, or `None`
/// if the grid has no open cell at all.
pub fn random_free_pose(grid: &WallGrid, rng: &mut impl Rng) -> Option<Pose> {
    if grid.cols() < 3 || grid.rows() < 3 {
        return None;
    }
    let heading = rng.gen_range(-180.0..180.0);
    for _ in 0..MAX_ATTEMPTS {
        let cx = rng.gen_range(1..grid.cols() as i64 - 1);
        let cy = rng.gen_range(1..grid.rows() as i64 - 1);
        if is_open(grid, cx, cy) {
            let (x, y) = grid.cell_center(cx, cy);
            return Some(Pose::new(x, y, heading));
        }
    }
    // Crowded grid: take the first open cell in row-major order.
    (1..grid.rows() as i64 - 1)
        .flat_map(|cy| (1..grid.cols() as i64 - 1).map(move |cx| (cx, cy)))
        .find(|&(cx, cy)| is_open(grid, cx, cy))
        .map(|(cx, cy)| {
            let (x, y) = grid.cell_center(cx, cy);
            Pose::new(x, y, heading)
        })
}
