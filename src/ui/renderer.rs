/// Presentation layer: prints the maze and turn messages to the terminal.
///
/// Output is line-oriented (one frame per turn), so there is no screen
/// buffer to diff. Each frame is queued with `queue!` into a `BufWriter`
/// and flushed once.
///
/// ## Glyphs (first match wins)
///
/// ┌──────────────────────────────┬───────┐
/// │ Cell                         │ Glyph │
/// ├──────────────────────────────┼───────┤
/// │ outside the player's view    │ *     │
/// │ player                       │ P     │
/// │ ghost                        │ G     │
/// │ key (not yet collected)      │ K     │
/// │ flashlight (not collected)   │ F     │
/// │ wall                         │ ■     │
/// │ path                         │ .     │
/// └──────────────────────────────┴───────┘

use std::io::{self, BufWriter, Write};

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use crate::domain::entity::ItemKind;
use crate::domain::grid::Position;
use crate::domain::rules;
use crate::sim::event::GameEvent;
use crate::sim::level::Level;
use crate::sim::world::GameSession;

// ── Glyph ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Fog,
    Player,
    Ghost,
    Key,
    Flashlight,
    Wall,
    Path,
}

impl Glyph {
    pub fn ch(self) -> char {
        match self {
            Glyph::Fog => '*',
            Glyph::Player => 'P',
            Glyph::Ghost => 'G',
            Glyph::Key => 'K',
            Glyph::Flashlight => 'F',
            Glyph::Wall => '■',
            Glyph::Path => '.',
        }
    }

    fn color(self) -> Color {
        match self {
            Glyph::Fog => Color::DarkGrey,
            Glyph::Player => Color::Cyan,
            Glyph::Ghost => Color::Red,
            Glyph::Key => Color::Yellow,
            Glyph::Flashlight => Color::Green,
            Glyph::Wall => Color::Grey,
            Glyph::Path => Color::DarkGrey,
        }
    }
}

/// What to draw at (x, y).
pub fn glyph_at(level: &Level, x: usize, y: usize) -> Glyph {
    let player = &level.player;
    if !rules::is_visible(level.number, player.pos, player.visibility(), x, y) {
        return Glyph::Fog;
    }

    let here = Position::new(x, y);
    if player.pos == here {
        Glyph::Player
    } else if level.ghost.as_ref().is_some_and(|g| g.pos == here) {
        Glyph::Ghost
    } else if level.key.is_at(here) {
        Glyph::Key
    } else if level.has_flashlight() && level.flashlight.is_at(here) {
        Glyph::Flashlight
    } else if level.grid().tile_at(x, y).is_wall() {
        Glyph::Wall
    } else {
        Glyph::Path
    }
}

/// The maze as plain text rows, glyphs separated by spaces.
pub fn render_plain(level: &Level) -> Vec<String> {
    let size = level.grid().size();
    (0..size)
        .map(|y| {
            (0..size)
                .map(|x| glyph_at(level, x, y).ch().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

// ── Messages ──

/// Player-facing text for an event. None for events that need no message.
pub fn event_message(event: &GameEvent) -> Option<String> {
    let text = match event {
        GameEvent::PlayerMoved { .. } | GameEvent::GhostMoved { .. } => return None,
        GameEvent::MoveRejected { .. } => "You can't go that way.".to_string(),
        GameEvent::ItemCollected { kind: ItemKind::Key, .. } => "You found the key!".to_string(),
        GameEvent::ItemCollected { kind: ItemKind::Flashlight, .. } => {
            "You found the flashlight!".to_string()
        }
        GameEvent::VisionExpanded { diameter } => format!("Your view widens to {diameter}×{diameter}."),
        GameEvent::GhostCaught { .. } => {
            "The ghost caught you! Sent back to the entrance.".to_string()
        }
        GameEvent::NeedKey => "You need the key to exit. Find it first!".to_string(),
        GameEvent::LevelCompleted { level } => format!("Level {level} complete!"),
        GameEvent::AllLevelsCompleted => "You have completed all levels! Congratulations!".to_string(),
    };
    Some(text)
}

pub const INSTRUCTIONS: &[&str] = &[
    "Navigate the maze to reach the exit on the top edge.",
    "Move with up/down/left/right or w/s/a/d, one step per line.",
    "You must collect the key (K) to leave a level.",
    "Levels 2 and 3 are dark: the flashlight (F) widens your view.",
    "Level 3 has a ghost (G). If it reaches you, you go back to the start.",
    "Other commands: save, inventory (i), reset, help (?), quit (q).",
];

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { writer: BufWriter::with_capacity(8192, io::stdout()) }
    }

    /// Draw the maze plus a one-line status bar.
    pub fn draw_level(&mut self, session: &GameSession) -> io::Result<()> {
        let Some(level) = session.level.as_ref() else {
            return Ok(());
        };
        let size = level.grid().size();
        let w = &mut self.writer;

        queue!(w, Print("\r\n"))?;
        for y in 0..size {
            for x in 0..size {
                let g = glyph_at(level, x, y);
                queue!(w, SetForegroundColor(g.color()), Print(g.ch()), Print(' '))?;
            }
            queue!(w, ResetColor, Print("\r\n"))?;
        }

        let status = format!(
            "Level {} | key: {} | view: {} | exit reachable: {}\r\n",
            level.number,
            if level.player.has_key() { "yes" } else { "no" },
            level.player.visibility(),
            if level.maze.exit_accessible { "yes" } else { "no" },
        );
        queue!(w, SetForegroundColor(Color::White), Print(status), ResetColor)?;
        w.flush()
    }

    pub fn draw_inventory(&mut self, level: &Level) -> io::Result<()> {
        let items = level.player.inventory.items();
        if items.is_empty() {
            return self.message("Your inventory is empty.");
        }
        self.message("Inventory:")?;
        for item in items {
            self.message(&format!("  - {}", item.kind))?;
        }
        Ok(())
    }

    pub fn draw_events(&mut self, events: &[GameEvent]) -> io::Result<()> {
        for text in events.iter().filter_map(event_message) {
            queue!(self.writer, SetForegroundColor(Color::Yellow), Print(text), ResetColor, Print("\r\n"))?;
        }
        self.writer.flush()
    }

    pub fn message(&mut self, text: &str) -> io::Result<()> {
        queue!(self.writer, Print(text), Print("\r\n"))?;
        self.writer.flush()
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        queue!(self.writer, SetForegroundColor(Color::Red), Print(text), ResetColor, Print("\r\n"))?;
        self.writer.flush()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}
