/// Save and load game state as a single JSON document.
///
/// ## Document layout
///
/// ```json
/// {
///   "levelCompleted": [true, false, false],
///   "currentLevel": {
///     "levelNumber": 2,
///     "maze": [[1, 1, 0, ...], ...],        // 0 = path, 1 = wall
///     "entrance": [9, 18],
///     "exit": [4, 0],
///     "exitAccessible": true,
///     "player": {
///       "playerX": 9, "playerY": 17, "visibilityDiameter": 7,
///       "inventory": [{"type": "key", "x": 3, "y": 5, "collected": true}]
///     },
///     "key": null,                           // null = already collected
///     "flashlight": {"type": "flashlight", "x": 7, "y": 1, "collected": false},
///     "ghost": {                             // level 3 only
///       "ghostX": 5, "ghostY": 9,
///       "movingVertically": false, "movingPositiveDirection": true
///     },
///     "completed": false
///   },
///   "resumedGame": true,
///   "isLevelInProgress": true
/// }
/// ```
///
/// ## Item slots
///
///   `"key": {...}`  → Present
///   `"key": null`   → Collected
///   no `"key"`      → Absent
///
/// `levelCompleted` is required, except that `{}` (what `clear` writes)
/// reads as a fresh game.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::ai;
use crate::domain::entity::{Ghost, Inventory, Item, ItemKind, ItemSlot, Player};
use crate::domain::grid::{Grid, GridError, Position};
use crate::domain::maze::Maze;
use crate::sim::level::{self, Level, LEVEL_COUNT};
use crate::sim::world::GameSession;

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed save document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid maze in save: {0}")]
    Grid(#[from] GridError),

    #[error("invalid level number {0} in save")]
    InvalidLevel(u8),

    #[error("{what} at ({x}, {y}) is outside the maze")]
    OutOfBounds { what: &'static str, x: usize, y: usize },

    #[error("unknown item type {0:?}")]
    UnknownItem(String),
}

pub type Result<T> = std::result::Result<T, SaveError>;

// ══════════════════════════════════════════════════════════════
// Document types
// ══════════════════════════════════════════════════════════════

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    pub level_completed: Vec<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_level: Option<LevelDoc>,
    #[serde(default)]
    pub resumed_game: bool,
    #[serde(default)]
    pub is_level_in_progress: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelDoc {
    pub level_number: u8,
    pub maze: Vec<Vec<u8>>,
    pub entrance: [usize; 2],
    pub exit: [usize; 2],
    pub exit_accessible: bool,
    pub player: PlayerDoc,
    /// Outer None = field missing; inner None = `null`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub key: Option<Option<ItemDoc>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub flashlight: Option<Option<ItemDoc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghost: Option<GhostDoc>,
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlayerDoc {
    #[serde(rename = "playerX")]
    pub x: usize,
    #[serde(rename = "playerY")]
    pub y: usize,
    #[serde(rename = "visibilityDiameter")]
    pub visibility_diameter: usize,
    #[serde(default)]
    pub inventory: Vec<ItemDoc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ItemDoc {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: usize,
    pub y: usize,
    pub collected: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostDoc {
    #[serde(rename = "ghostX")]
    pub x: usize,
    #[serde(rename = "ghostY")]
    pub y: usize,
    /// Sweep axis and sign. Missing in older saves: taken from config.
    #[serde(rename = "movingVertically", default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<bool>,
    #[serde(rename = "movingPositiveDirection", default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<bool>,
}

/// Keeps `null` distinct from a missing field.
fn present<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ══════════════════════════════════════════════════════════════
// Capture (session → document)
// ══════════════════════════════════════════════════════════════

pub fn capture(session: &GameSession) -> SaveDocument {
    SaveDocument {
        level_completed: session.progress.to_vec(),
        current_level: session.level.as_ref().map(capture_level),
        resumed_game: session.resumed,
        is_level_in_progress: session.level_in_progress,
    }
}

fn capture_level(l: &Level) -> LevelDoc {
    LevelDoc {
        level_number: l.number,
        maze: l.grid().to_codes(),
        entrance: pos_doc(l.maze.entrance),
        exit: pos_doc(l.maze.exit),
        exit_accessible: l.maze.exit_accessible,
        player: PlayerDoc {
            x: l.player.pos.x,
            y: l.player.pos.y,
            visibility_diameter: l.player.visibility(),
            inventory: l.player.inventory.items().iter().map(item_doc).collect(),
        },
        key: slot_doc(&l.key),
        flashlight: slot_doc(&l.flashlight),
        ghost: l.ghost.as_ref().map(|g| GhostDoc {
            x: g.pos.x,
            y: g.pos.y,
            vertical: Some(g.vertical),
            positive: Some(g.positive),
        }),
        completed: l.completed,
    }
}

fn pos_doc(p: Position) -> [usize; 2] {
    [p.x, p.y]
}

fn item_doc(item: &Item) -> ItemDoc {
    ItemDoc {
        kind: item.kind.as_str().to_string(),
        x: item.pos.x,
        y: item.pos.y,
        collected: item.collected,
    }
}

fn slot_doc(slot: &ItemSlot) -> Option<Option<ItemDoc>> {
    match slot {
        ItemSlot::Present(item) => Some(Some(item_doc(item))),
        ItemSlot::Collected => Some(None),
        ItemSlot::Absent => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Restore (document → session)
// ══════════════════════════════════════════════════════════════

/// Rebuild a session. Settings and seed come from `config`.
pub fn restore(config: &GameConfig, doc: &SaveDocument) -> Result<GameSession> {
    let mut session = GameSession::new(config);

    if doc.level_completed.len() > LEVEL_COUNT {
        warn!(entries = doc.level_completed.len(), "extra levelCompleted entries ignored");
    }
    for (flag, &done) in session.progress.iter_mut().zip(&doc.level_completed) {
        *flag = done;
    }

    if let Some(ld) = &doc.current_level {
        let vertical = session.ghost_cfg.vertical;
        let level = restore_level(ld, vertical, session.rng_mut())?;
        session.level = Some(level);
    }
    session.resumed = doc.resumed_game;
    session.level_in_progress = doc.is_level_in_progress && session.level.is_some();
    Ok(session)
}

fn restore_level<R: Rng + ?Sized>(ld: &LevelDoc, vertical: bool, rng: &mut R) -> Result<Level> {
    if !level::is_valid_number(ld.level_number) {
        return Err(SaveError::InvalidLevel(ld.level_number));
    }
    let grid = Grid::from_codes(&ld.maze)?;

    let entrance = checked(&grid, "entrance", ld.entrance[0], ld.entrance[1])?;
    let exit = checked(&grid, "exit", ld.exit[0], ld.exit[1])?;
    let player_pos = checked(&grid, "player", ld.player.x, ld.player.y)?;

    let items = ld.player.inventory.iter()
        .map(|d| restore_item(&grid, d))
        .collect::<Result<Vec<_>>>()?;
    let player = Player::restore(player_pos, ld.player.visibility_diameter, Inventory::from_items(items));

    let key = restore_slot(&grid, ld.key.as_ref())?;
    let flashlight = restore_slot(&grid, ld.flashlight.as_ref())?;

    let mut ghost = match ld.ghost {
        Some(_) if ld.level_number < 3 => {
            warn!(level = ld.level_number, "ghost in a level without one; dropped");
            None
        }
        Some(g) => {
            let mut restored = Ghost::new(checked(&grid, "ghost", g.x, g.y)?)
                .with_axis(g.vertical.unwrap_or(vertical));
            restored.positive = g.positive.unwrap_or(true);
            Some(restored)
        }
        None => None,
    };
    if ld.level_number >= 3 && ghost.is_none() {
        warn!("level 3 save has no ghost; placing one");
        ghost = Some(Ghost::new(Position::default()).with_axis(vertical));
    }
    if let Some(g) = ghost.as_mut() {
        if !grid.is_path(g.pos) {
            if ai::reset_position(g, &grid, rng) {
                info!(x = g.pos.x, y = g.pos.y, "ghost relocated onto a path cell");
            } else {
                warn!("saved maze has no path cell for the ghost");
            }
        }
    }

    Ok(Level {
        number: ld.level_number,
        maze: Maze { grid, entrance, exit, exit_accessible: ld.exit_accessible },
        player,
        key,
        flashlight,
        ghost,
        completed: ld.completed,
    })
}

fn checked(grid: &Grid, what: &'static str, x: usize, y: usize) -> Result<Position> {
    if x < grid.size() && y < grid.size() {
        Ok(Position::new(x, y))
    } else {
        Err(SaveError::OutOfBounds { what, x, y })
    }
}

fn restore_item(grid: &Grid, d: &ItemDoc) -> Result<Item> {
    let kind = ItemKind::parse(&d.kind).ok_or_else(|| SaveError::UnknownItem(d.kind.clone()))?;
    let pos = checked(grid, kind.as_str(), d.x, d.y)?;
    Ok(Item { kind, pos, collected: d.collected })
}

fn restore_slot(grid: &Grid, field: Option<&Option<ItemDoc>>) -> Result<ItemSlot> {
    Ok(match field {
        None => ItemSlot::Absent,
        Some(None) => ItemSlot::Collected,
        Some(Some(d)) => {
            let item = restore_item(grid, d)?;
            if item.collected { ItemSlot::Collected } else { ItemSlot::Present(item) }
        }
    })
}

// ══════════════════════════════════════════════════════════════
// Text and file I/O
// ══════════════════════════════════════════════════════════════

pub fn to_json_string(session: &GameSession) -> Result<String> {
    Ok(serde_json::to_string_pretty(&capture(session))?)
}

pub fn from_json_str(config: &GameConfig, text: &str) -> Result<GameSession> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.as_object().is_some_and(|o| o.is_empty()) {
        return Ok(GameSession::new(config));
    }
    let doc: SaveDocument = serde_json::from_value(value)?;
    restore(config, &doc)
}

/// Full save: progress plus the active level.
pub fn write_session(path: &Path, session: &GameSession) -> Result<()> {
    write(path, &to_json_string(session)?)?;
    info!(path = %path.display(), level = ?session.level.as_ref().map(|l| l.number), "game saved");
    Ok(())
}

pub fn read_session(path: &Path, config: &GameConfig) -> Result<GameSession> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| SaveError::Io { path: path.to_path_buf(), source })?;
    let session = from_json_str(config, &text)?;
    info!(path = %path.display(), "game loaded");
    Ok(session)
}

/// Progress-only save: just `levelCompleted`.
pub fn write_progress(path: &Path, session: &GameSession) -> Result<()> {
    let doc = SaveDocument { level_completed: session.progress.to_vec(), ..SaveDocument::default() };
    write(path, &serde_json::to_string_pretty(&doc)?)
}

/// Wipe the save: writes `{}`.
pub fn clear(path: &Path) -> Result<()> {
    write(path, "{}")?;
    info!(path = %path.display(), "save cleared");
    Ok(())
}

fn write(path: &Path, text: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|source| SaveError::Io { path: dir.to_path_buf(), source })?;
    }
    std::fs::write(path, text).map_err(|source| SaveError::Io { path: path.to_path_buf(), source })
}
