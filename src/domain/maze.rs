/// Maze generation: stick-flip wall carving over a pillar lattice.
///
/// ## Lattice
///
/// Border cells are walls. Interior cells at (even row, even col) are
/// permanent wall pillars; every other interior cell starts as path.
///
/// ## Carving
///
/// Pillars are visited row-major. Each pillar "flips its stick": one of
/// the four cells next to it is turned into a wall, joining the pillar to
/// a neighbour. Directions are drawn uniformly, with two restrictions:
///
///   - `Up` is only drawn on the first pillar row; later rows resample it
///     at once so they never reach back into finished rows.
///   - a carve succeeds only if the target is still path and inside the
///     carve window (`Up` needs row > 2, `Left` needs col > 2).
///
/// `Right` and `Down` always have an uncarved target when a pillar is
/// visited, so the draw loop terminates; it is still capped, with a
/// deterministic scan as the fallback.
///
/// ## Entrance / exit
///
/// Entrance is fixed at the middle of the bottom row. The exit is a random
/// column of the top row. Nothing guarantees the exit is reachable: the
/// result carries `exit_accessible` and the caller decides whether to
/// regenerate (see `generate_solvable`).

use rand::Rng;
use tracing::{debug, warn};

use super::grid::{check_size, Grid, Position, Result};
use super::tile::Tile;

/// Upper bound on direction draws for one pillar before falling back.
const MAX_CARVE_DRAWS: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CarveDir {
    Up,
    Right,
    Down,
    Left,
}

impl CarveDir {
    const ALL: [CarveDir; 4] = [CarveDir::Up, CarveDir::Right, CarveDir::Down, CarveDir::Left];
}

/// A generated (or restored) maze with its fixed openings.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Maze {
    pub grid: Grid,
    pub entrance: Position,
    pub exit: Position,
    pub exit_accessible: bool,
}

impl Maze {
    /// Entrance position for a maze of the given size.
    pub fn entrance_for(size: usize) -> Position {
        Position::new(size / 2, size - 1)
    }
}

/// Generate one maze. The exit may be unreachable.
pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Maze> {
    check_size(size)?;

    let mut grid = lattice(size)?;
    carve(&mut grid, rng);

    let entrance = Maze::entrance_for(size);
    grid.set(entrance.x, entrance.y, Tile::Path);

    let exit = Position::new(rng.gen_range(1..=size - 2), 0);
    grid.set(exit.x, exit.y, Tile::Path);

    let exit_accessible = exit_reachable(&grid, entrance);
    debug!(size, exit_x = exit.x, exit_accessible, "maze generated");

    Ok(Maze { grid, entrance, exit, exit_accessible })
}

/// Generate until the exit is reachable, at most `attempts` times.
/// Returns the last maze even if none was solvable.
pub fn generate_solvable<R: Rng + ?Sized>(size: usize, attempts: u32, rng: &mut R) -> Result<Maze> {
    let attempts = attempts.max(1);
    let mut maze = generate(size, rng)?;
    for attempt in 1..attempts {
        if maze.exit_accessible {
            debug!(attempt, "solvable maze found");
            return Ok(maze);
        }
        maze = generate(size, rng)?;
    }
    if !maze.exit_accessible {
        warn!(attempts, "no solvable maze within attempt budget");
    }
    Ok(maze)
}

/// Depth-first search from `start` through path cells.
/// Succeeds as soon as any cell on the top row is reached.
pub fn exit_reachable(grid: &Grid, start: Position) -> bool {
    if !grid.is_path(start) {
        return false;
    }
    let size = grid.size();
    let mut visited = vec![vec![false; size]; size];
    let mut stack = vec![start];
    visited[start.y][start.x] = true;

    while let Some(pos) = stack.pop() {
        if pos.y == 0 {
            return true;
        }
        for next in grid.path_neighbors(pos) {
            if !visited[next.y][next.x] {
                visited[next.y][next.x] = true;
                stack.push(next);
            }
        }
    }
    false
}

// ── Internals ──

fn lattice(size: usize) -> Result<Grid> {
    let mut grid = Grid::filled(size, Tile::Path)?;
    for y in 0..size {
        for x in 0..size {
            let border = y == 0 || y == size - 1 || x == 0 || x == size - 1;
            if border || (y % 2 == 0 && x % 2 == 0) {
                grid.set(x, y, Tile::Wall);
            }
        }
    }
    Ok(grid)
}

fn carve<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    let size = grid.size();
    for row in (2..size - 2).step_by(2) {
        for col in (2..size - 2).step_by(2) {
            carve_pillar(grid, row, col, rng);
        }
    }
}

fn carve_pillar<R: Rng + ?Sized>(grid: &mut Grid, row: usize, col: usize, rng: &mut R) {
    for _ in 0..MAX_CARVE_DRAWS {
        let dir = CarveDir::ALL[rng.gen_range(0..4)];
        if row > 2 && dir == CarveDir::Up {
            continue;
        }
        if try_carve(grid, row, col, dir) {
            return;
        }
    }

    warn!(row, col, "carve draw cap hit, scanning directions");
    for dir in [CarveDir::Right, CarveDir::Down, CarveDir::Left] {
        if try_carve(grid, row, col, dir) {
            return;
        }
    }
}

fn try_carve(grid: &mut Grid, row: usize, col: usize, dir: CarveDir) -> bool {
    let size = grid.size();
    let (x, y) = match dir {
        CarveDir::Up if row > 2 => (col, row - 1),
        CarveDir::Right if col < size - 2 => (col + 1, row),
        CarveDir::Down if row < size - 2 => (col, row + 1),
        CarveDir::Left if col > 2 => (col - 1, row),
        _ => return false,
    };
    if grid.tile_at(x, y).is_passable() {
        grid.set(x, y, Tile::Wall);
        true
    } else {
        false
    }
}
