/// Entity placement: drop key, flashlight and ghost onto free path cells.
///
/// A cell is free when it is path, is not the entrance or exit, and is not
/// in the caller's exclusion list. Placement is sequential: each call must
/// be given every earlier placement as an exclusion, so later entities
/// avoid earlier ones (never the other way round).
///
/// Positions are rejection-sampled uniformly. After `size² × 8` misses the
/// sampler gives up and takes the first free cell in row-major order.

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use crate::domain::grid::{Grid, Position};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no free path cell left for the {0}")]
    NoFreeCell(&'static str),
}

/// Pick a free cell for `what` (used in logs and errors only).
pub fn place<R: Rng + ?Sized>(
    grid: &Grid,
    entrance: Position,
    exit: Position,
    exclusions: &[Position],
    what: &'static str,
    rng: &mut R,
) -> Result<Position, PlacementError> {
    let is_free = |p: Position| {
        grid.is_path(p) && p != entrance && p != exit && !exclusions.contains(&p)
    };

    let size = grid.size();
    for _ in 0..size * size * 8 {
        let x = rng.gen_range(0..size);
        let y = rng.gen_range(0..size);
        let p = Position::new(x, y);
        if is_free(p) {
            return Ok(p);
        }
    }

    warn!(what, "placement sampling exhausted, scanning");
    grid.path_cells()
        .find(|&p| is_free(p))
        .ok_or(PlacementError::NoFreeCell(what))
}
