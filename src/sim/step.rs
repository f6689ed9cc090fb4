/// The step function: advances the active level by one turn.
///
/// Processing order:
///   1. Player movement (tentative step, rolled back on wall / edge)
///   2. Item pickup (key, then flashlight)
///   3. Ghost movement (level 3 only)
///   4. Ghost contact → player back to the entrance
///   5. Exit check (completes the level if the key is held)
///
/// A rejected move ends the turn after step 1: nothing else moves.
/// Turns on a completed level, or with no level, are ignored.

use rand::Rng;
use tracing::{debug, info};

use crate::domain::ai::{self, GhostPolicy};
use crate::domain::entity::{ItemKind, MoveDir};
use crate::domain::rules::{self, MoveResult};
use crate::sim::event::GameEvent;
use crate::sim::level::Level;
use crate::sim::world::{GameSession, Phase};

/// Outcome of one accepted-or-rejected move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub result: MoveResult,
    pub events: Vec<GameEvent>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Apply one move. None if there is no level in progress.
pub fn step(session: &mut GameSession, dir: MoveDir) -> Option<TurnOutcome> {
    if session.phase() != Phase::InProgress {
        return None;
    }

    let GameSession { level, rng, ghost_cfg, .. } = session;
    let level = level.as_mut()?;

    let mut events = Vec::new();
    let result = resolve_player_movement(level, dir, &mut events);
    if !result.is_accepted() {
        return Some(TurnOutcome { result, events });
    }

    resolve_item_pickup(level, &mut events);
    resolve_ghost(level, ghost_cfg.policy, rng, &mut events);

    if let Some(number) = resolve_exit(level, &mut events) {
        session.record_completion(number);
        info!(level = number, "level completed");
        events.push(GameEvent::LevelCompleted { level: number });
        if session.all_completed() {
            info!("all levels completed");
            events.push(GameEvent::AllLevelsCompleted);
        }
    }

    Some(TurnOutcome { result, events })
}

impl GameSession {
    /// Method form of [`step`].
    pub fn apply_move(&mut self, dir: MoveDir) -> Option<TurnOutcome> {
        step(self, dir)
    }
}

// ══════════════════════════════════════════════════════════════
// Player movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(level: &mut Level, dir: MoveDir, events: &mut Vec<GameEvent>) -> MoveResult {
    let (to, result) = rules::try_step(level.grid(), level.player.pos, dir);

    if result.is_accepted() {
        level.player.pos = to;
        debug!(%dir, x = to.x, y = to.y, "player moved");
        events.push(GameEvent::PlayerMoved { dir, to });
    } else {
        debug!(%dir, ?result, "move rejected");
        events.push(GameEvent::MoveRejected { dir, reason: result });
    }
    result
}

// ══════════════════════════════════════════════════════════════
// Items
// ══════════════════════════════════════════════════════════════

fn resolve_item_pickup(level: &mut Level, events: &mut Vec<GameEvent>) {
    let pos = level.player.pos;

    if level.key.is_at(pos) {
        if let Some(key) = level.key.take() {
            level.player.collect(key);
            info!(x = pos.x, y = pos.y, "key collected");
            events.push(GameEvent::ItemCollected { kind: ItemKind::Key, at: pos });
        }
    }

    if level.has_flashlight() && level.flashlight.is_at(pos) {
        if let Some(light) = level.flashlight.take() {
            let before = level.player.visibility();
            level.player.collect(light);
            info!(x = pos.x, y = pos.y, "flashlight collected");
            events.push(GameEvent::ItemCollected { kind: ItemKind::Flashlight, at: pos });
            let after = level.player.visibility();
            if after > before {
                events.push(GameEvent::VisionExpanded { diameter: after });
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Ghost
// ══════════════════════════════════════════════════════════════

fn resolve_ghost<R: Rng + ?Sized>(
    level: &mut Level,
    policy: GhostPolicy,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    if !level.has_ghost() {
        return;
    }
    let Some(ghost) = level.ghost.as_mut() else { return };

    if ai::step_ghost(ghost, &level.maze.grid, policy, rng) {
        events.push(GameEvent::GhostMoved { to: ghost.pos });
    }

    if ghost.pos == level.player.pos {
        let entrance = level.maze.entrance;
        level.player.pos = entrance;
        info!(x = ghost.pos.x, y = ghost.pos.y, "ghost caught the player");
        events.push(GameEvent::GhostCaught { sent_to: entrance });
    }
}

// ══════════════════════════════════════════════════════════════
// Exit
// ══════════════════════════════════════════════════════════════

/// Some(level number) if this turn completed the level.
fn resolve_exit(level: &mut Level, events: &mut Vec<GameEvent>) -> Option<u8> {
    if level.player.pos != level.exit() {
        return None;
    }
    if !level.player.has_key() {
        events.push(GameEvent::NeedKey);
        return None;
    }
    if !level.mark_completed() {
        return None;
    }
    level.player.inventory.clear();
    Some(level.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{
        Ghost, Item, ItemSlot, Player, FLASHLIGHT_VISIBILITY,
    };
    use crate::domain::grid::tests::grid_from;
    use crate::domain::grid::Position;
    use crate::domain::maze::Maze;

    // Map legend: '#' wall, '.' path.
    // Exit is the gap in the top row, entrance the gap in the bottom row.
    const MAP: [&str; 7] = [
        "###.###",
        "#.....#",
        "#.###.#",
        "#.....#",
        "#.#.#.#",
        "#.....#",
        "###.###",
    ];

    fn level(number: u8) -> Level {
        let grid = grid_from(&MAP);
        let entrance = Position::new(3, 6);
        let exit = Position::new(3, 0);
        Level {
            number,
            maze: Maze { grid, entrance, exit, exit_accessible: true },
            player: Player::new(number, entrance),
            key: ItemSlot::Present(Item::new(ItemKind::Key, Position::new(1, 3))),
            flashlight: if number >= 2 {
                ItemSlot::Present(Item::new(ItemKind::Flashlight, Position::new(5, 3)))
            } else {
                ItemSlot::Absent
            },
            ghost: if number >= 3 { Some(Ghost::new(Position::new(1, 1))) } else { None },
            completed: false,
        }
    }

    fn session_with(lvl: Level) -> GameSession {
        let mut s = GameSession::with_seed(&GameConfig::default(), 1);
        s.level = Some(lvl);
        s.level_in_progress = true;
        s
    }

    fn walk(s: &mut GameSession, dirs: &[MoveDir]) -> Vec<GameEvent> {
        let mut all = vec![];
        for &d in dirs {
            let t = step(s, d).expect("level in progress");
            assert_eq!(t.result, MoveResult::Accepted, "move {d} from {:?}", s.level.as_ref().unwrap().player.pos);
            all.extend(t.events);
        }
        all
    }

    fn pos(s: &GameSession) -> Position {
        s.level.as_ref().unwrap().player.pos
    }

    use crate::domain::entity::MoveDir::{Down, Left, Right, Up};

    #[test]
    fn wall_move_is_rejected_in_place() {
        let mut s = session_with(level(1));
        walk(&mut s, &[Up]); // (3,5)
        let t = step(&mut s, Up).unwrap();
        assert_eq!(t.result, MoveResult::Accepted); // (3,4) is path
        let t = step(&mut s, Left).unwrap();
        assert_eq!(t.result, MoveResult::RejectedWall);
        assert_eq!(pos(&s), Position::new(3, 4));
        assert_eq!(t.events, vec![GameEvent::MoveRejected { dir: Left, reason: MoveResult::RejectedWall }]);
    }

    #[test]
    fn boundary_move_is_rejected_in_place() {
        let mut s = session_with(level(1));
        let t = step(&mut s, Down).unwrap();
        assert_eq!(t.result, MoveResult::RejectedBoundary);
        assert_eq!(pos(&s), Position::new(3, 6));
    }

    #[test]
    fn key_pickup_moves_item_to_inventory() {
        let mut s = session_with(level(1));
        let events = walk(&mut s, &[Up, Left, Left, Up, Up]);
        assert_eq!(pos(&s), Position::new(1, 3));
        assert!(events.contains(&GameEvent::ItemCollected { kind: ItemKind::Key, at: Position::new(1, 3) }));

        let l = s.level.as_ref().unwrap();
        assert_eq!(l.key, ItemSlot::Collected);
        assert_eq!(l.player.inventory.len(), 1);
        assert!(l.player.inventory.items()[0].collected);
    }

    #[test]
    fn flashlight_widens_view_once() {
        let mut s = session_with(level(2));
        let events = walk(&mut s, &[Up, Right, Right, Up, Up]);
        assert_eq!(pos(&s), Position::new(5, 3));
        assert!(events.contains(&GameEvent::VisionExpanded { diameter: FLASHLIGHT_VISIBILITY }));
        {
            let l = s.level.as_ref().unwrap();
            assert_eq!(l.flashlight, ItemSlot::Collected);
            assert_eq!(l.player.visibility(), FLASHLIGHT_VISIBILITY);
        }

        // Step off and back on: nothing more happens.
        let events = walk(&mut s, &[Down, Up]);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ItemCollected { .. })));
        let l = s.level.as_ref().unwrap();
        assert_eq!(l.player.inventory.len(), 1);
        assert_eq!(l.player.visibility(), FLASHLIGHT_VISIBILITY);
    }

    #[test]
    fn level_one_ignores_flashlight_slot() {
        let mut lvl = level(1);
        lvl.flashlight = ItemSlot::Present(Item::new(ItemKind::Flashlight, Position::new(3, 5)));
        let mut s = session_with(lvl);
        walk(&mut s, &[Up]);
        let l = s.level.as_ref().unwrap();
        assert!(matches!(l.flashlight, ItemSlot::Present(_)));
        assert!(l.player.inventory.is_empty());
    }

    #[test]
    fn exit_without_key_changes_nothing() {
        let mut s = session_with(level(1));
        let events = walk(&mut s, &[Up, Up, Up, Right, Right, Up, Up, Left, Left, Up]);
        assert_eq!(pos(&s), Position::new(3, 0));
        assert!(events.contains(&GameEvent::NeedKey));
        assert!(!s.level.as_ref().unwrap().completed);
        assert!(!s.progress[0]);
        assert_eq!(s.phase(), Phase::InProgress);
    }

    #[test]
    fn exit_with_key_completes_once() {
        let mut s = session_with(level(1));
        walk(&mut s, &[Up, Left, Left, Up, Up]); // key at (1,3)
        let events = walk(&mut s, &[Up, Up, Right, Right, Up]);
        assert_eq!(pos(&s), Position::new(3, 0));
        assert!(events.contains(&GameEvent::LevelCompleted { level: 1 }));
        assert!(!events.contains(&GameEvent::AllLevelsCompleted));

        let l = s.level.as_ref().unwrap();
        assert!(l.completed);
        assert!(l.player.inventory.is_empty());
        assert_eq!(s.progress, [true, false, false]);
        assert_eq!(s.phase(), Phase::Completed);

        // Completed level takes no more turns.
        assert!(step(&mut s, Down).is_none());
    }

    #[test]
    fn finishing_the_last_level_reports_game_complete() {
        let mut lvl = level(3);
        lvl.ghost = Some(Ghost::new(Position::new(5, 5)));
        let mut s = session_with(lvl);
        s.ghost_cfg.policy = GhostPolicy::Sweep;
        s.progress = [true, true, false];
        // Sweep ghost trails along row 5 and never reaches the player.
        walk(&mut s, &[Up, Left, Left, Up, Up]); // key at (1,3)
        let events = walk(&mut s, &[Up, Up, Right, Right, Up]);
        assert!(events.contains(&GameEvent::LevelCompleted { level: 3 }));
        assert!(events.contains(&GameEvent::AllLevelsCompleted));
        assert!(s.all_completed());
    }

    #[test]
    fn ghost_contact_sends_player_home_keeping_items() {
        let mut lvl = level(3);
        // Sweep ghost parked where it bounces between (4,5) and (5,5).
        lvl.ghost = Some(Ghost::new(Position::new(5, 5)));
        let mut s = session_with(lvl);
        s.ghost_cfg.policy = GhostPolicy::Sweep;

        // Turn 1: player (3,6)->(3,5); ghost blocked at (6,5) wall, flips.
        let t = step(&mut s, Up).unwrap();
        assert!(!t.events.iter().any(|e| matches!(e, GameEvent::GhostCaught { .. })));
        assert_eq!(s.level.as_ref().unwrap().ghost.as_ref().unwrap().pos, Position::new(5, 5));

        // Turn 2: player (3,5)->(4,5); ghost (5,5)->(4,5): contact.
        let t = step(&mut s, Right).unwrap();
        assert!(t.events.contains(&GameEvent::GhostCaught { sent_to: Position::new(3, 6) }));
        assert_eq!(pos(&s), Position::new(3, 6));
        assert!(!s.level.as_ref().unwrap().completed);
    }

    #[test]
    fn ghost_collision_keeps_inventory() {
        let mut lvl = level(3);
        let key = lvl.key.take().unwrap();
        lvl.player.collect(key);
        lvl.ghost = Some(Ghost::new(Position::new(5, 5)));
        let mut s = session_with(lvl);
        s.ghost_cfg.policy = GhostPolicy::Sweep;
        walk(&mut s, &[Up, Right]);
        let l = s.level.as_ref().unwrap();
        assert_eq!(l.player.pos, l.entrance());
        assert!(l.player.has_key());
        assert_eq!(s.progress, [false, false, false]);
    }

    #[test]
    fn ghost_stays_put_on_rejected_turn() {
        let mut lvl = level(3);
        lvl.ghost = Some(Ghost::new(Position::new(1, 1)));
        let mut s = session_with(lvl);
        let before = s.level.as_ref().unwrap().ghost.clone();
        let t = step(&mut s, Left).unwrap();
        assert_eq!(t.result, MoveResult::RejectedWall);
        assert_eq!(s.level.as_ref().unwrap().ghost, before);
    }

    #[test]
    fn random_walk_ghost_stays_on_paths() {
        let mut s = session_with(level(3));
        for i in 0..40 {
            let dir = if i % 2 == 0 { Up } else { Down };
            step(&mut s, dir).unwrap();
            let l = s.level.as_ref().unwrap();
            assert!(l.grid().is_path(l.ghost.as_ref().unwrap().pos));
        }
    }

    #[test]
    fn no_level_no_turn() {
        let mut s = GameSession::with_seed(&GameConfig::default(), 1);
        assert!(step(&mut s, Up).is_none());
        assert!(s.apply_move(Down).is_none());
    }
}
