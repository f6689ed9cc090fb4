/// Level state: one maze plus everything living in it.
///
/// ## Difficulty ladder
///
///   Level 1: key only, full visibility.
///   Level 2: key + flashlight, dark (7×7 view, 11×11 with flashlight).
///   Level 3: key + flashlight + ghost.
///
/// ## Placement order
///
/// key → flashlight → ghost. Each placement excludes the ones before it.
/// The player always starts on the entrance.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{GhostConfig, MazeConfig};
use crate::domain::entity::{Ghost, Item, ItemKind, ItemSlot, Player};
use crate::domain::grid::{Grid, GridError, Position};
use crate::domain::maze::{self, Maze};
use crate::sim::placement::{self, PlacementError};

/// Number of levels in the game.
pub const LEVEL_COUNT: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("invalid level number {0} (expected 1-{LEVEL_COUNT})")]
    InvalidNumber(u8),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Level {
    pub number: u8,
    pub maze: Maze,
    pub player: Player,
    pub key: ItemSlot,
    pub flashlight: ItemSlot,
    pub ghost: Option<Ghost>,
    pub completed: bool,
}

/// Is `number` a playable level number?
pub fn is_valid_number(number: u8) -> bool {
    (1..=LEVEL_COUNT as u8).contains(&number)
}

impl Level {
    /// Generate a fresh level: maze, player at the entrance, items, ghost.
    pub fn new<R: Rng + ?Sized>(
        number: u8,
        maze_cfg: &MazeConfig,
        ghost_cfg: &GhostConfig,
        rng: &mut R,
    ) -> Result<Self, LevelError> {
        if !is_valid_number(number) {
            return Err(LevelError::InvalidNumber(number));
        }
        let maze = build_maze(maze_cfg, rng)?;
        let mut level = Level {
            number,
            player: Player::new(number, maze.entrance),
            maze,
            key: ItemSlot::Absent,
            flashlight: ItemSlot::Absent,
            ghost: None,
            completed: false,
        };
        level.populate(ghost_cfg, rng)?;
        info!(level = number, exit_accessible = level.maze.exit_accessible, "level created");
        Ok(level)
    }

    /// Start the level over on a freshly generated maze.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        maze_cfg: &MazeConfig,
        ghost_cfg: &GhostConfig,
        rng: &mut R,
    ) -> Result<(), LevelError> {
        self.maze = build_maze(maze_cfg, rng)?;
        self.player = Player::new(self.number, self.maze.entrance);
        self.key = ItemSlot::Absent;
        self.flashlight = ItemSlot::Absent;
        self.ghost = None;
        self.completed = false;
        self.populate(ghost_cfg, rng)?;
        info!(level = self.number, "level reset");
        Ok(())
    }

    fn populate<R: Rng + ?Sized>(&mut self, ghost_cfg: &GhostConfig, rng: &mut R) -> Result<(), LevelError> {
        let grid = &self.maze.grid;
        let (entrance, exit) = (self.maze.entrance, self.maze.exit);
        let mut taken: Vec<Position> = Vec::with_capacity(3);

        let key = placement::place(grid, entrance, exit, &taken, "key", rng)?;
        taken.push(key);
        self.key = ItemSlot::Present(Item::new(ItemKind::Key, key));

        if self.has_flashlight() {
            let pos = placement::place(grid, entrance, exit, &taken, "flashlight", rng)?;
            taken.push(pos);
            self.flashlight = ItemSlot::Present(Item::new(ItemKind::Flashlight, pos));
        }

        if self.has_ghost() {
            let pos = placement::place(grid, entrance, exit, &taken, "ghost", rng)?;
            self.ghost = Some(Ghost::new(pos).with_axis(ghost_cfg.vertical));
        }

        debug!(level = self.number, ?taken, ghost = ?self.ghost.as_ref().map(|g| g.pos), "entities placed");
        Ok(())
    }

    /// Does this level carry a flashlight?
    pub fn has_flashlight(&self) -> bool {
        self.number >= 2
    }

    /// Does this level carry a ghost?
    pub fn has_ghost(&self) -> bool {
        self.number >= 3
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.maze.grid
    }

    #[inline]
    pub fn entrance(&self) -> Position {
        self.maze.entrance
    }

    #[inline]
    pub fn exit(&self) -> Position {
        self.maze.exit
    }

    /// Flip `completed` on. Returns false if it was already set.
    pub fn mark_completed(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}

fn build_maze<R: Rng + ?Sized>(cfg: &MazeConfig, rng: &mut R) -> Result<Maze, GridError> {
    if cfg.require_solvable {
        maze::generate_solvable(cfg.size, cfg.solvable_attempts, rng)
    } else {
        maze::generate(cfg.size, rng)
    }
}
