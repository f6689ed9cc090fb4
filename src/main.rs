/// Entry point: main menu and the turn loop.

use std::error::Error;
use std::io::BufRead;

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use keymaze::config::{self, GameConfig};
use keymaze::sim::event::GameEvent;
use keymaze::sim::level::LEVEL_COUNT;
use keymaze::sim::save;
use keymaze::sim::world::{GameSession, Phase, SessionError};
use keymaze::ui::input::{self, Command, LineReader, MenuChoice};
use keymaze::ui::renderer::{self, Renderer};

type AppResult<T> = Result<T, Box<dyn Error>>;

/// Where control goes after a play session.
enum Flow {
    Menu,
    Exit,
}

fn main() {
    let _log_guard = init_logging();
    let config = GameConfig::load();
    info!(?config, "configuration loaded");

    let mut session = GameSession::new(&config);
    let mut renderer = Renderer::new();
    let mut reader = LineReader::stdin();

    if let Err(e) = run(&mut session, &mut renderer, &mut reader, &config) {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thank you for playing! Exiting...");
}

/// File-only logging, so log lines never mix with the maze on stdout.
/// Returns None (logging off) if the log directory can't be created.
fn init_logging() -> Option<WorkerGuard> {
    let log_dir = config::data_dir().join("logs");
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Logging disabled: cannot create {}: {e}", log_dir.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::never(&log_dir, "keymaze.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    info!(dir = %log_dir.display(), "logging initialized");
    Some(guard)
}

// ══════════════════════════════════════════════════════════════
// Main menu
// ══════════════════════════════════════════════════════════════

fn run<R: BufRead>(
    session: &mut GameSession,
    renderer: &mut Renderer,
    reader: &mut LineReader<R>,
    config: &GameConfig,
) -> AppResult<()> {
    renderer.message("Welcome to the Maze Game!")?;

    loop {
        renderer.message("")?;
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            renderer.message(&format!("{}. {}", i + 1, choice.label()))?;
        }
        let choice = match reader.prompt("Enter your choice: ")? {
            Some(line) => MenuChoice::parse(line),
            None => return Ok(()),
        };

        match choice {
            Some(MenuChoice::Start) => {
                if let Flow::Exit = start_game(session, renderer, reader, config)? {
                    return Ok(());
                }
            }
            Some(MenuChoice::Save) => save_game(session, renderer, config)?,
            Some(MenuChoice::Load) => load_game(session, renderer, config)?,
            Some(MenuChoice::Instructions) => show_instructions(renderer)?,
            Some(MenuChoice::Clear) => match save::clear(&config.save_file) {
                Ok(()) => renderer.message("Saved game cleared.")?,
                Err(e) => renderer.error(&format!("Failed to clear the saved game: {e}"))?,
            },
            Some(MenuChoice::Exit) => return Ok(()),
            None => renderer.error("Invalid choice. Please try again.")?,
        }
    }
}

fn show_instructions(renderer: &mut Renderer) -> AppResult<()> {
    renderer.message("Instructions:")?;
    for line in renderer::INSTRUCTIONS {
        renderer.message(line)?;
    }
    Ok(())
}

fn save_game(session: &mut GameSession, renderer: &mut Renderer, config: &GameConfig) -> AppResult<()> {
    session.resumed = session.phase() == Phase::InProgress;
    match save::write_session(&config.save_file, session) {
        Ok(()) => renderer.message("Game saved successfully!")?,
        Err(e) => {
            warn!("save failed: {e}");
            renderer.error(&format!("Unable to save the game: {e}"))?;
        }
    }
    Ok(())
}

fn load_game(session: &mut GameSession, renderer: &mut Renderer, config: &GameConfig) -> AppResult<()> {
    if !config.save_file.exists() {
        renderer.message("No saved game found. Start a new game from level 1.")?;
        return Ok(());
    }
    match save::read_session(&config.save_file, config) {
        Ok(loaded) => {
            *session = loaded;
            renderer.message("Game loaded successfully.")?;
            if let Some(l) = session.level.as_ref().filter(|_| session.phase() == Phase::InProgress) {
                renderer.message(&format!("Choose Start Game to resume level {}.", l.number))?;
            }
        }
        Err(e) => {
            warn!("load failed: {e}");
            renderer.error(&format!("Unable to load the game: {e}"))?;
        }
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Level selection
// ══════════════════════════════════════════════════════════════

fn start_game<R: BufRead>(
    session: &mut GameSession,
    renderer: &mut Renderer,
    reader: &mut LineReader<R>,
    config: &GameConfig,
) -> AppResult<Flow> {
    if session.phase() == Phase::InProgress {
        if let Some(l) = session.level.as_ref() {
            renderer.message(&format!("Resuming level {}...", l.number))?;
        }
        session.resumed = false;
        return play(session, renderer, reader, config);
    }

    let number = loop {
        let line = match reader.prompt("Choose difficulty level (1: Easy, 2: Medium, 3: Hard): ")? {
            Some(line) => line,
            None => return Ok(Flow::Exit),
        };
        match input::parse_level(line) {
            Some(n) => break n,
            None => renderer.error("Invalid input. Please enter a number (1, 2, or 3).")?,
        }
    };

    match session.start_level(number) {
        Ok(()) => play(session, renderer, reader, config),
        Err(SessionError::Locked(n)) => {
            renderer.error(&format!(
                "Level {n} is unavailable: complete level {} first.",
                n.saturating_sub(1),
            ))?;
            Ok(Flow::Menu)
        }
        Err(e) => Err(e.into()),
    }
}

// ══════════════════════════════════════════════════════════════
// Turn loop
// ══════════════════════════════════════════════════════════════

fn play<R: BufRead>(
    session: &mut GameSession,
    renderer: &mut Renderer,
    reader: &mut LineReader<R>,
    config: &GameConfig,
) -> AppResult<Flow> {
    loop {
        renderer.draw_level(session)?;

        let command = match reader.prompt("Enter your move (up/w, down/s, left/a, right/d) or a command: ")? {
            Some(line) => Command::parse(line),
            None => return Ok(Flow::Exit),
        };

        match command {
            Some(Command::Move(dir)) => {
                let Some(turn) = session.apply_move(dir) else {
                    return Ok(Flow::Menu);
                };
                renderer.draw_events(&turn.events)?;

                if turn.events.contains(&GameEvent::AllLevelsCompleted) {
                    session.abandon_level();
                    return Ok(Flow::Menu);
                }
                if let Some(finished) = completed_level(&turn.events) {
                    return next_level(session, renderer, reader, config, finished);
                }
            }
            Some(Command::Save) => save_game(session, renderer, config)?,
            Some(Command::Inventory) => {
                if let Some(l) = session.level.as_ref() {
                    renderer.draw_inventory(l)?;
                }
            }
            Some(Command::Reset) => {
                session.reset_level()?;
                renderer.message("Level reset: new maze, back to the entrance.")?;
            }
            Some(Command::Help) => show_instructions(renderer)?,
            Some(Command::Quit) => {
                renderer.message("Returning to main menu...")?;
                return Ok(Flow::Menu);
            }
            None => renderer.error("Invalid move. Please enter 'w', 'a', 's', 'd', or 'help'.")?,
        }
    }
}

fn completed_level(events: &[GameEvent]) -> Option<u8> {
    events.iter().find_map(|e| match e {
        GameEvent::LevelCompleted { level } => Some(*level),
        _ => None,
    })
}

/// Offer the next level after finishing `finished`.
fn next_level<R: BufRead>(
    session: &mut GameSession,
    renderer: &mut Renderer,
    reader: &mut LineReader<R>,
    config: &GameConfig,
    finished: u8,
) -> AppResult<Flow> {
    let next = finished + 1;
    if next as usize > LEVEL_COUNT {
        session.abandon_level();
        return Ok(Flow::Menu);
    }
    loop {
        let answer = match reader.prompt(&format!("Continue to level {next}? (y/n) "))? {
            Some(line) => input::parse_yes_no(line),
            None => return Ok(Flow::Exit),
        };
        match answer {
            Some(true) => {
                session.start_level(next)?;
                renderer.message(&format!("Starting level {next}"))?;
                return play(session, renderer, reader, config);
            }
            Some(false) => {
                session.abandon_level();
                renderer.message("Returning to main menu...")?;
                return Ok(Flow::Menu);
            }
            None => renderer.error("Invalid input. Please enter 'y' or 'n'.")?,
        }
    }
}
