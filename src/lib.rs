//! keymaze: a turn-based maze crawler.
//!
//! `domain` holds the pure rules (grid, carving, entities, ghost AI),
//! `sim` the stateful session (levels, turns, saves), `ui` the terminal
//! front-end used by the binary.

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
