/// Line-based input.
///
/// The game is turn-based: every turn is one line of text. This module
/// turns lines into commands and never touches game state, so a bad
/// token costs nothing.
///
/// ## In-level commands
///
/// ┌──────────────────────┬────────────┐
/// │ Token                │ Command    │
/// ├──────────────────────┼────────────┤
/// │ up / w               │ Move(Up)   │
/// │ down / s             │ Move(Down) │
/// │ left / a             │ Move(Left) │
/// │ right / d            │ Move(Right)│
/// │ save                 │ Save       │
/// │ inventory / i        │ Inventory  │
/// │ reset                │ Reset      │
/// │ help / ?             │ Help       │
/// │ quit / q             │ Quit       │
/// └──────────────────────┴────────────┘
///
/// Tokens are trimmed and case-insensitive.

use std::io::{self, BufRead, Write};

use crate::domain::entity::MoveDir;
use crate::sim::level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(MoveDir),
    Save,
    Inventory,
    Reset,
    Help,
    Quit,
}

impl Command {
    /// None for anything unrecognised.
    pub fn parse(line: &str) -> Option<Command> {
        let token = line.trim();
        if let Some(dir) = MoveDir::parse(token) {
            return Some(Command::Move(dir));
        }
        match token.to_ascii_lowercase().as_str() {
            "save" => Some(Command::Save),
            "inventory" | "i" => Some(Command::Inventory),
            "reset" => Some(Command::Reset),
            "help" | "?" => Some(Command::Help),
            "quit" | "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Main menu entries, numbered as shown on screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuChoice {
    Start,
    Save,
    Load,
    Instructions,
    Clear,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::Start,
        MenuChoice::Save,
        MenuChoice::Load,
        MenuChoice::Instructions,
        MenuChoice::Clear,
        MenuChoice::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Start => "Start Game",
            MenuChoice::Save => "Save Game",
            MenuChoice::Load => "Load Game",
            MenuChoice::Instructions => "View Instructions",
            MenuChoice::Clear => "Clear Saved Game",
            MenuChoice::Exit => "Exit",
        }
    }

    pub fn parse(line: &str) -> Option<MenuChoice> {
        let n: usize = line.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| MenuChoice::ALL.get(i).copied())
    }
}

/// A level number in range, or None.
pub fn parse_level(line: &str) -> Option<u8> {
    line.trim().parse::<u8>().ok().filter(|&n| level::is_valid_number(n))
}

/// y / yes → Some(true), n / no → Some(false).
pub fn parse_yes_no(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompted line reader over any buffered source.
pub struct LineReader<R> {
    source: R,
    buf: String,
}

impl LineReader<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        LineReader::new(io::stdin().lock())
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(source: R) -> Self {
        LineReader { source, buf: String::with_capacity(64) }
    }

    /// Print `prompt`, then read one line. None at end of input.
    pub fn prompt(&mut self, prompt: &str) -> io::Result<Option<&str>> {
        let mut out = io::stdout();
        write!(out, "{prompt}")?;
        out.flush()?;
        self.next_line()
    }

    pub fn next_line(&mut self) -> io::Result<Option<&str>> {
        self.buf.clear();
        if self.source.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf.trim_end_matches(['\r', '\n'])))
    }
}
