/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Path,
    Wall,
}

impl Tile {
    /// Can an entity occupy this cell?
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Path)
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Save-file encoding: 0 = path, 1 = wall.
    pub fn code(self) -> u8 {
        match self {
            Tile::Path => 0,
            Tile::Wall => 1,
        }
    }

    /// Decode a save-file cell. Anything other than 0/1 is rejected.
    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Path),
            1 => Some(Tile::Wall),
            _ => None,
        }
    }
}
