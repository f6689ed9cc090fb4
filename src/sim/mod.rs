pub mod event;
pub mod level;
pub mod placement;
pub mod save;
pub mod step;
pub mod world;
