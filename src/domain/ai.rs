/// Ghost AI: two interchangeable motion policies.
///
///   1. **RandomWalk**: step to a uniformly chosen passable neighbour.
///      Stays put when boxed in. This is the default.
///   2. **Sweep**: patrol back and forth along one axis. On hitting a wall
///      or the edge, flip direction and wait one tick.
///
/// A session picks one policy up front (config `ghost.policy`); the two
/// are never mixed within a run.

use rand::Rng;

use super::entity::Ghost;
use super::grid::{Grid, Position};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GhostPolicy {
    #[default]
    RandomWalk,
    Sweep,
}

impl GhostPolicy {
    pub fn parse(s: &str) -> Option<GhostPolicy> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random_walk" | "random" => Some(GhostPolicy::RandomWalk),
            "sweep" => Some(GhostPolicy::Sweep),
            _ => None,
        }
    }
}

/// Advance the ghost one tick. Returns true if its position changed.
pub fn step_ghost<R: Rng + ?Sized>(
    ghost: &mut Ghost,
    grid: &Grid,
    policy: GhostPolicy,
    rng: &mut R,
) -> bool {
    match policy {
        GhostPolicy::RandomWalk => random_walk(ghost, grid, rng),
        GhostPolicy::Sweep => sweep(ghost, grid),
    }
}

// ── Random walk ──

pub fn random_walk<R: Rng + ?Sized>(ghost: &mut Ghost, grid: &Grid, rng: &mut R) -> bool {
    let options = grid.path_neighbors(ghost.pos);
    if options.is_empty() {
        return false;
    }
    ghost.pos = options[rng.gen_range(0..options.len())];
    true
}

// ── Sweep ──

pub fn sweep(ghost: &mut Ghost, grid: &Grid) -> bool {
    let step: i32 = if ghost.positive { 1 } else { -1 };
    let (dx, dy) = if ghost.vertical { (0, step) } else { (step, 0) };

    match grid.offset(ghost.pos, dx, dy) {
        Some(next) if grid.is_path(next) => {
            ghost.pos = next;
            true
        }
        _ => {
            ghost.positive = !ghost.positive;
            false
        }
    }
}

// ── Placement helper ──

/// Uniformly sample a passable cell; used to relocate a ghost.
/// Falls back to the first passable cell if sampling keeps missing.
pub fn random_path_position<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Position> {
    let size = grid.size();
    for _ in 0..size * size * 8 {
        let p = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        if grid.is_path(p) {
            return Some(p);
        }
    }
    grid.path_cells().next()
}

/// Drop the ghost on a random passable cell. False if the grid has none.
pub fn reset_position<R: Rng + ?Sized>(ghost: &mut Ghost, grid: &Grid, rng: &mut R) -> bool {
    match random_path_position(grid, rng) {
        Some(p) => {
            ghost.pos = p;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::domain::grid::tests::grid_from;

    fn corridor() -> Grid {
        grid_from(&[
            "#####",
            "#...#",
            "#####",
            "#####",
            "#####",
        ])
    }

    #[test]
    fn policy_names() {
        assert_eq!(GhostPolicy::parse("sweep"), Some(GhostPolicy::Sweep));
        assert_eq!(GhostPolicy::parse("Random_Walk"), Some(GhostPolicy::RandomWalk));
        assert_eq!(GhostPolicy::parse("chase"), None);
    }

    #[test]
    fn random_walk_only_lands_on_paths() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ghost = Ghost::new(Position::new(1, 1));
        for _ in 0..200 {
            let before = ghost.pos;
            assert!(random_walk(&mut ghost, &g, &mut rng));
            assert!(g.is_path(ghost.pos));
            let dist = before.x.abs_diff(ghost.pos.x) + before.y.abs_diff(ghost.pos.y);
            assert_eq!(dist, 1);
        }
    }

    #[test]
    fn random_walk_stays_when_boxed_in() {
        let g = grid_from(&[
            "#####",
            "#####",
            "##.##",
            "#####",
            "#####",
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ghost = Ghost::new(Position::new(2, 2));
        assert!(!random_walk(&mut ghost, &g, &mut rng));
        assert_eq!(ghost.pos, Position::new(2, 2));
    }

    #[test]
    fn sweep_bounces_between_walls() {
        let g = corridor();
        let mut ghost = Ghost::new(Position::new(1, 1));
        let mut xs = vec![];
        for _ in 0..8 {
            sweep(&mut ghost, &g);
            xs.push(ghost.pos.x);
        }
        // right, right, turn, left, left, turn, right, right
        assert_eq!(xs, vec![2, 3, 3, 2, 1, 1, 2, 3]);
    }

    #[test]
    fn vertical_sweep_turns_at_edge() {
        let g = grid_from(&[
            "#.###",
            "#.###",
            "#.###",
            "#####",
            "#####",
        ]);
        let mut ghost = Ghost::new(Position::new(1, 1)).with_axis(true);
        ghost.positive = false;
        assert!(sweep(&mut ghost, &g));
        assert_eq!(ghost.pos, Position::new(1, 0));
        assert!(!sweep(&mut ghost, &g)); // top edge
        assert!(ghost.positive);
        assert!(sweep(&mut ghost, &g));
        assert_eq!(ghost.pos, Position::new(1, 1));
    }

    #[test]
    fn reset_moves_ghost_off_walls() {
        let grid = corridor();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut ghost = Ghost::new(Position::new(0, 0));
        assert!(reset_position(&mut ghost, &grid, &mut rng));
        assert!(grid.is_path(ghost.pos));

        let solid = grid_from(&["#####"; 5]);
        let mut stuck = Ghost::new(Position::new(1, 1));
        assert!(!reset_position(&mut stuck, &solid, &mut rng));
        assert_eq!(stuck.pos, Position::new(1, 1));
    }

    #[test]
    fn random_position_is_passable() {
        let g = corridor();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let p = random_path_position(&g, &mut rng).unwrap();
            assert!(g.is_path(p));
        }
    }
}
