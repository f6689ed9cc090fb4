/// GameSession: the complete state of a running game.
///
/// ## Contents
///
///   - `level`    : the active level attempt, if any.
///   - `progress` : one completion flag per level. Persists across
///                  attempts and gates which levels can be started.
///   - `rng`      : the session's only PRNG. Generation, placement and
///                  ghost random walk all draw from it, so a fixed seed
///                  replays the whole game.
///
/// ## Unlock gate
///
/// Level 1 is always playable. Level N > 1 is playable once level N-1
/// has been completed (`progress[N-2]`).
///
/// ## Phases
///
/// ┌─────────┐ start_level ┌────────────┐ exit + key ┌───────────┐
/// │ NoLevel │ ──────────▶ │ InProgress │ ─────────▶ │ Completed │
/// └─────────┘             └────────────┘            └───────────┘
///      ▲                        │ reset_level ▲            │
///      └──── abandon_level ─────┴─────────────┘────────────┘

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;

use crate::config::{GameConfig, GhostConfig, MazeConfig};
use crate::sim::level::{self, Level, LevelError, LEVEL_COUNT};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    NoLevel,
    InProgress,
    Completed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("level {0} does not exist")]
    InvalidLevel(u8),

    #[error("level {0} is locked: complete level {prev} first", prev = .0.saturating_sub(1))]
    Locked(u8),

    #[error("no level in progress")]
    NoActiveLevel,

    #[error(transparent)]
    Level(#[from] LevelError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

pub struct GameSession {
    // ── Active attempt ──
    pub level: Option<Level>,

    // ── Cross-level progress ──
    pub progress: [bool; LEVEL_COUNT],

    // ── Resume flags (mirrored into the save file) ──
    /// A suspended attempt was saved and should be resumed directly.
    pub resumed: bool,
    pub level_in_progress: bool,

    // ── Settings ──
    pub maze_cfg: MazeConfig,
    pub ghost_cfg: GhostConfig,

    pub(crate) rng: ChaCha8Rng,
}

// ── Construction ──

impl GameSession {
    /// New session; seeded from config, or from entropy if no seed is set.
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        GameSession::with_rng(config, rng)
    }

    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        GameSession::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, rng: ChaCha8Rng) -> Self {
        GameSession {
            level: None,
            progress: [false; LEVEL_COUNT],
            resumed: false,
            level_in_progress: false,
            maze_cfg: config.maze.clone(),
            ghost_cfg: config.ghost.clone(),
            rng,
        }
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

// ── Level lifecycle ──

impl GameSession {
    pub fn phase(&self) -> Phase {
        match &self.level {
            None => Phase::NoLevel,
            Some(l) if l.completed => Phase::Completed,
            Some(_) => Phase::InProgress,
        }
    }

    /// Can level `number` be started?
    pub fn is_unlocked(&self, number: u8) -> bool {
        if !level::is_valid_number(number) {
            return false;
        }
        number == 1 || self.progress[number as usize - 2]
    }

    pub fn is_completed(&self, number: u8) -> bool {
        level::is_valid_number(number) && self.progress[number as usize - 1]
    }

    pub fn all_completed(&self) -> bool {
        self.progress.iter().all(|&done| done)
    }

    /// Generate a new attempt at `number`. Fails without side effects
    /// if the level does not exist or is still locked.
    pub fn start_level(&mut self, number: u8) -> Result<()> {
        if !level::is_valid_number(number) {
            return Err(SessionError::InvalidLevel(number));
        }
        if !self.is_unlocked(number) {
            return Err(SessionError::Locked(number));
        }
        let lvl = Level::new(number, &self.maze_cfg, &self.ghost_cfg, &mut self.rng)?;
        self.level = Some(lvl);
        self.level_in_progress = true;
        self.resumed = false;
        info!(level = number, "level started");
        Ok(())
    }

    /// Regenerate the active level from scratch.
    pub fn reset_level(&mut self) -> Result<()> {
        let lvl = self.level.as_mut().ok_or(SessionError::NoActiveLevel)?;
        lvl.reset(&self.maze_cfg, &self.ghost_cfg, &mut self.rng)?;
        self.level_in_progress = true;
        Ok(())
    }

    /// Drop the active level (back to the menu). Progress is kept.
    pub fn abandon_level(&mut self) {
        if let Some(l) = self.level.take() {
            info!(level = l.number, "level closed");
        }
        self.level_in_progress = false;
        self.resumed = false;
    }

    /// Record a completed level in the progress flags.
    pub(crate) fn record_completion(&mut self, number: u8) {
        if level::is_valid_number(number) {
            self.progress[number as usize - 1] = true;
        }
        self.level_in_progress = false;
    }
}
