pub mod ai;
pub mod entity;
pub mod grid;
pub mod maze;
pub mod rules;
pub mod tile;
