/// Events emitted during a turn.
/// The presentation layer turns these into messages.

use crate::domain::entity::{ItemKind, MoveDir};
use crate::domain::grid::Position;
use crate::domain::rules::MoveResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { dir: MoveDir, to: Position },
    MoveRejected { dir: MoveDir, reason: MoveResult },
    ItemCollected { kind: ItemKind, at: Position },
    VisionExpanded { diameter: usize },
    GhostMoved { to: Position },
    GhostCaught { sent_to: Position },
    NeedKey,
    LevelCompleted { level: u8 },
    AllLevelsCompleted,
}
