/// Enemy pursuit: greedy single-cell step toward the target.
///
/// Each axis is considered independently from the enemy's current cell;
/// when both apply the result is diagonal. A cell can be entered if it is
/// on the grid and passable, or if it is the target itself (that's a capture).
/// The final cell is always re-checked, so a diagonal step can't cut a
/// wall corner onto an impassable tile; it falls back to the X step.

use super::grid::Grid;

fn can_enter(grid: &Grid, cell: (usize, usize), target: (usize, usize)) -> bool {
    cell == target || grid.get(cell.0, cell.1).is_ok_and(|t| t.is_passable())
}

fn axis_step(from: usize, to: usize) -> i64 {
    (to as i64 - from as i64).signum()
}

/// Next cell for an enemy at `enemy` chasing `target`, or `None` to stay.
pub fn greedy_step(grid: &Grid, enemy: (usize, usize), target: (usize, usize)) -> Option<(usize, usize)> {
    let (ex, ey) = enemy;
    if enemy == target { return None; }

    let sx = axis_step(ex, target.0);
    let sy = axis_step(ey, target.1);

    let x_cell = (sx != 0).then(|| grid.offset(ex, ey, sx, 0).ok()).flatten()
        .filter(|c| can_enter(grid, *c, target));
    let y_cell = (sy != 0).then(|| grid.offset(ex, ey, 0, sy).ok()).flatten()
        .filter(|c| can_enter(grid, *c, target));

    match (x_cell, y_cell) {
        (Some((nx, _)), Some((_, ny))) => {
            if can_enter(grid, (nx, ny), target) {
                Some((nx, ny))
            } else {
                x_cell
            }
        }
        (Some(c), None) | (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}
