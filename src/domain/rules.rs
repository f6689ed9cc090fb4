/// Movement and visibility rules, as truth tables.
///
/// Pure functions over the grid, no side effects.
/// These encode "what is legal" without performing the action.
///
/// ## Movement Truth Table
///
/// ┌──────────────────────┬──────────────────┐
/// │ Condition            │ Result           │
/// ├──────────────────────┼──────────────────┤
/// │ Dest out of bounds   │ RejectedBoundary │
/// │ Dest tile is wall    │ RejectedWall     │
/// │ Otherwise            │ Accepted         │
/// └──────────────────────┴──────────────────┘
///
/// ## Visibility
///
/// ┌──────────────────────────────────────┬──────────┐
/// │ Condition                            │ Visible? │
/// ├──────────────────────────────────────┼──────────┤
/// │ level 1                              │ YES      │
/// │ |dx| <= d/2 and |dy| <= d/2          │ YES      │
/// │ Otherwise                            │ NO (fog) │
/// └──────────────────────────────────────┴──────────┘
///
/// `d` is the player's visibility diameter; `d/2` is integer division,
/// so a diameter of 7 shows a 7×7 window centred on the player.

use super::entity::MoveDir;
use super::grid::{Grid, Position};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveResult {
    Accepted,
    RejectedWall,
    RejectedBoundary,
}

impl MoveResult {
    pub fn is_accepted(self) -> bool {
        self == MoveResult::Accepted
    }
}

/// Where a one-cell step from `from` would land, and whether it is legal.
/// On rejection the returned position is `from`.
pub fn try_step(grid: &Grid, from: Position, dir: MoveDir) -> (Position, MoveResult) {
    let (dx, dy) = dir.delta();
    match grid.offset(from, dx, dy) {
        None => (from, MoveResult::RejectedBoundary),
        Some(to) if !grid.is_path(to) => (from, MoveResult::RejectedWall),
        Some(to) => (to, MoveResult::Accepted),
    }
}

/// Is cell (x, y) inside the player's view?
pub fn is_visible(level_number: u8, player: Position, diameter: usize, x: usize, y: usize) -> bool {
    if level_number == 1 {
        return true;
    }
    let radius = diameter / 2;
    player.x.abs_diff(x) <= radius && player.y.abs_diff(y) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;

    fn map() -> Grid {
        grid_from(&[
            "##.##",
            "#...#",
            "#.#.#",
            "#...#",
            "##.##",
        ])
    }

    #[test]
    fn step_into_path() {
        let g = map();
        let (to, r) = try_step(&g, Position::new(1, 1), MoveDir::Right);
        assert_eq!(r, MoveResult::Accepted);
        assert_eq!(to, Position::new(2, 1));
    }

    #[test]
    fn step_into_wall_stays() {
        let g = map();
        let (to, r) = try_step(&g, Position::new(1, 1), MoveDir::Left);
        assert_eq!(r, MoveResult::RejectedWall);
        assert_eq!(to, Position::new(1, 1));
    }

    #[test]
    fn step_off_the_edge_stays() {
        let g = map();
        let (to, r) = try_step(&g, Position::new(2, 4), MoveDir::Down);
        assert_eq!(r, MoveResult::RejectedBoundary);
        assert_eq!(to, Position::new(2, 4));

        let (to, r) = try_step(&g, Position::new(2, 0), MoveDir::Up);
        assert_eq!(r, MoveResult::RejectedBoundary);
        assert_eq!(to, Position::new(2, 0));
    }

    #[test]
    fn level_one_sees_everything() {
        assert!(is_visible(1, Position::new(0, 0), 7, 18, 18));
    }

    #[test]
    fn dark_levels_see_a_window() {
        let p = Position::new(9, 9);
        assert!(is_visible(2, p, 7, 12, 6));
        assert!(!is_visible(2, p, 7, 13, 9));
        assert!(!is_visible(3, p, 7, 9, 5));
        assert!(is_visible(3, p, 11, 14, 4));
        assert!(!is_visible(3, p, 11, 15, 9));
    }
}
