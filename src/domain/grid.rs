/// Square wall/path grid and integer positions.
///
/// Coordinates: `x` = column, `y` = row, both 0-indexed from the top-left.
/// Storage is row-major: `cells[y][x]`.
///
/// Out-of-bounds queries behave like walls, so callers never index
/// past the edge while probing neighbours.

use thiserror::Error;

use super::tile::Tile;

/// Smallest maze that still has one interior pillar.
pub const MIN_SIZE: usize = 5;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid maze size {0}: must be odd and at least {MIN_SIZE}")]
    InvalidSize(usize),

    #[error("invalid maze dimensions: {rows} rows, row {row} has {cols} columns")]
    InvalidDimensions { rows: usize, row: usize, cols: usize },

    #[error("invalid cell value {value} at ({x}, {y})")]
    InvalidCell { x: usize, y: usize, value: u8 },
}

pub type Result<T> = std::result::Result<T, GridError>;

/// Reject sizes the carving lattice cannot handle.
pub fn check_size(size: usize) -> Result<()> {
    if size < MIN_SIZE || size % 2 == 0 {
        return Err(GridError::InvalidSize(size));
    }
    Ok(())
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Tile>>,
}

impl Grid {
    /// A `size`×`size` grid with every cell set to `tile`.
    pub fn filled(size: usize, tile: Tile) -> Result<Self> {
        check_size(size)?;
        Ok(Grid { size, cells: vec![vec![tile; size]; size] })
    }

    /// Wrap an existing row-major grid. Must be square with a valid size.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self> {
        let size = rows.len();
        check_size(size)?;
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(GridError::InvalidDimensions { rows: size, row, cols: r.len() });
        }
        Ok(Grid { size, cells: rows })
    }

    /// Decode the save-file representation (0 = path, 1 = wall).
    pub fn from_codes(codes: &[Vec<u8>]) -> Result<Self> {
        let mut rows = Vec::with_capacity(codes.len());
        for (y, row) in codes.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (x, &value) in row.iter().enumerate() {
                let tile = Tile::from_code(value)
                    .ok_or(GridError::InvalidCell { x, y, value })?;
                out.push(tile);
            }
            rows.push(out);
        }
        Grid::from_rows(rows)
    }

    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells.iter()
            .map(|row| row.iter().map(|t| t.code()).collect())
            .collect()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.cells
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// Tile at (x, y). Out of bounds = wall.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        if x < self.size && y < self.size {
            self.cells[y][x]
        } else {
            Tile::Wall
        }
    }

    #[inline]
    pub fn is_path(&self, pos: Position) -> bool {
        self.tile_at(pos.x, pos.y).is_passable()
    }

    /// Set a tile. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.size && y < self.size {
            self.cells[y][x] = tile;
        }
    }

    /// Step from `pos` by (dx, dy). None if the target leaves the grid.
    pub fn offset(&self, pos: Position, dx: i32, dy: i32) -> Option<Position> {
        let nx = pos.x as i64 + dx as i64;
        let ny = pos.y as i64 + dy as i64;
        if self.in_bounds(nx, ny) {
            Some(Position::new(nx as usize, ny as usize))
        } else {
            None
        }
    }

    /// Passable orthogonal neighbours, in up, down, left, right order.
    pub fn path_neighbors(&self, pos: Position) -> Vec<Position> {
        const DIRS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
        DIRS.iter()
            .filter_map(|&(dx, dy)| self.offset(pos, dx, dy))
            .filter(|&p| self.is_path(p))
            .collect()
    }

    /// All passable cells, row-major.
    pub fn path_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |y| {
            (0..self.size)
                .filter(move |&x| self.cells[y][x].is_passable())
                .map(move |x| Position::new(x, y))
        })
    }
}
