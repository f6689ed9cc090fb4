/// Game settings from `config.toml`.
///
/// The first `config.toml` found next to the executable, in the CWD or in
/// `~/.local/share/keymaze` wins. Every key is optional; out-of-range values
/// are logged and replaced by their defaults.
///
/// ```toml
/// [maze]
/// size = 19
/// require_solvable = true
/// solvable_attempts = 50
///
/// [ghost]
/// policy = "random_walk"   # or "sweep"
/// vertical = false         # sweep axis
///
/// [general]
/// seed = 1234              # omit for a random game
/// save_file = "gamePanelState.json"
/// ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::domain::ai::GhostPolicy;
use crate::domain::grid::check_size;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub maze: MazeConfig,
    pub ghost: GhostConfig,
    /// Fixed PRNG seed; None = seed from entropy.
    pub seed: Option<u64>,
    pub save_file: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeConfig {
    pub size: usize,
    pub require_solvable: bool,
    pub solvable_attempts: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GhostConfig {
    pub policy: GhostPolicy,
    pub vertical: bool,
}

impl Default for MazeConfig {
    fn default() -> Self {
        MazeConfig {
            size: default_size(),
            require_solvable: default_require_solvable(),
            solvable_attempts: default_solvable_attempts(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    maze: TomlMaze,
    #[serde(default)]
    ghost: TomlGhost,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlMaze {
    #[serde(default = "default_size")]
    size: usize,
    #[serde(default = "default_require_solvable")]
    require_solvable: bool,
    #[serde(default = "default_solvable_attempts")]
    solvable_attempts: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGhost {
    #[serde(default = "default_policy")]
    policy: String,
    #[serde(default)]
    vertical: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_save_file")]
    save_file: String,
}

// ── Defaults ──

fn default_size() -> usize { 19 }
fn default_require_solvable() -> bool { true }
fn default_solvable_attempts() -> u32 { 50 }
fn default_policy() -> String { "random_walk".into() }
fn default_save_file() -> String { "gamePanelState.json".into() }

impl Default for TomlMaze {
    fn default() -> Self {
        TomlMaze {
            size: default_size(),
            require_solvable: default_require_solvable(),
            solvable_attempts: default_solvable_attempts(),
        }
    }
}

impl Default for TomlGhost {
    fn default() -> Self {
        TomlGhost { policy: default_policy(), vertical: false }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { seed: None, save_file: default_save_file() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Read settings from disk. Never fails: a missing or broken file
    /// yields defaults. A relative `save_file` is anchored at `data_dir()`.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        let mut cfg = GameConfig::from_toml(toml_cfg);

        if cfg.save_file.is_relative() {
            cfg.save_file = data_dir().join(&cfg.save_file);
        }
        cfg
    }

    /// Parse config text. Invalid values are replaced by defaults.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg))
    }

    fn from_toml(t: TomlConfig) -> Self {
        let size = match check_size(t.maze.size) {
            Ok(()) => t.maze.size,
            Err(e) => {
                warn!("config.toml: {e}; using {}", default_size());
                default_size()
            }
        };

        let policy = GhostPolicy::parse(&t.ghost.policy).unwrap_or_else(|| {
            warn!(policy = %t.ghost.policy, "config.toml: unknown ghost policy; using random_walk");
            GhostPolicy::RandomWalk
        });

        GameConfig {
            maze: MazeConfig {
                size,
                require_solvable: t.maze.require_solvable,
                solvable_attempts: t.maze.solvable_attempts.max(1),
            },
            ghost: GhostConfig { policy, vertical: t.ghost.vertical },
            seed: t.general.seed,
            save_file: PathBuf::from(t.general.save_file),
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/keymaze)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/keymaze");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Writable directory for saves and logs.
/// Exe dir if writable, else `~/.local/share/keymaze`, else CWD.
pub fn data_dir() -> PathBuf {
    // Portable install: next to the binary
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            if is_writable(parent) {
                return parent.to_path_buf();
            }
        }
    }

    // Installed system-wide: per-user data dir
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/keymaze");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn is_writable(dir: &Path) -> bool {
    let marker = dir.join(".write_test_keymaze");
    if std::fs::write(&marker, "").is_ok() {
        let _ = std::fs::remove_file(&marker);
        true
    } else {
        false
    }
}

/// First readable config.toml among `search_dirs`.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            // First file found wins, even if it fails to parse
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
