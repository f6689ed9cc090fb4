/// Entities: Player, Item (key / flashlight), Ghost.
/// Entities hold state only; legality of moves lives in `rules`,
/// ghost motion lives in `ai`.

use std::fmt;

use super::grid::Position;

/// Full-maze view used on level 1.
pub const FULL_VISIBILITY: usize = 19;
/// Starting view on levels 2 and 3.
pub const DARK_VISIBILITY: usize = 7;
/// View after picking up the flashlight.
pub const FLASHLIGHT_VISIBILITY: usize = 11;

/// Movement direction for one turn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    pub const ALL: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

    /// (dx, dy) for one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left  => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up    => (0, -1),
            MoveDir::Down  => (0, 1),
        }
    }

    /// Parse a direction token: full word or WASD, case-insensitive.
    pub fn parse(token: &str) -> Option<MoveDir> {
        match token.trim().to_ascii_lowercase().as_str() {
            "up" | "w"    => Some(MoveDir::Up),
            "down" | "s"  => Some(MoveDir::Down),
            "left" | "a"  => Some(MoveDir::Left),
            "right" | "d" => Some(MoveDir::Right),
            _ => None,
        }
    }
}

impl fmt::Display for MoveDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveDir::Left => "left",
            MoveDir::Right => "right",
            MoveDir::Up => "up",
            MoveDir::Down => "down",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemKind {
    Key,
    Flashlight,
}

impl ItemKind {
    /// Save-file tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Key => "key",
            ItemKind::Flashlight => "flashlight",
        }
    }

    pub fn parse(s: &str) -> Option<ItemKind> {
        match s {
            "key" => Some(ItemKind::Key),
            "flashlight" => Some(ItemKind::Flashlight),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Position,
    pub collected: bool,
}

impl Item {
    pub fn new(kind: ItemKind, pos: Position) -> Self {
        Item { kind, pos, collected: false }
    }
}

/// Where a level's item currently lives.
///
///   - `Present`: lying in the maze, waiting to be picked up.
///   - `Collected`: picked up; the item itself is in the player's inventory.
///   - `Absent`: this level never had one (or the save didn't say).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum ItemSlot {
    Present(Item),
    Collected,
    #[default]
    Absent,
}

impl ItemSlot {
    pub fn item(&self) -> Option<&Item> {
        match self {
            ItemSlot::Present(item) => Some(item),
            _ => None,
        }
    }

    /// Is an uncollected item lying at `pos`?
    pub fn is_at(&self, pos: Position) -> bool {
        self.item().map_or(false, |i| i.pos == pos)
    }

    /// Take the item out of the maze, leaving `Collected` behind.
    pub fn take(&mut self) -> Option<Item> {
        match std::mem::replace(self, ItemSlot::Collected) {
            ItemSlot::Present(item) => Some(item),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Collected items in pickup order.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory { items: Vec::new() }
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Inventory { items }
    }

    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn has(&self, kind: ItemKind) -> bool {
        self.items.iter().any(|i| i.kind == kind)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Player {
    pub pos: Position,
    pub inventory: Inventory,
    visibility: usize,
}

impl Player {
    /// A fresh player for `level_number`, standing at `pos`.
    pub fn new(level_number: u8, pos: Position) -> Self {
        let visibility = if level_number == 1 { FULL_VISIBILITY } else { DARK_VISIBILITY };
        Player { pos, inventory: Inventory::new(), visibility }
    }

    /// Rebuild a player from saved state.
    pub fn restore(pos: Position, visibility: usize, inventory: Inventory) -> Self {
        Player { pos, inventory, visibility }
    }

    pub fn visibility(&self) -> usize {
        self.visibility
    }

    /// Widen the view. Never narrows it.
    pub fn expand_visibility(&mut self, diameter: usize) {
        self.visibility = self.visibility.max(diameter);
    }

    pub fn has_key(&self) -> bool {
        self.inventory.has(ItemKind::Key)
    }

    pub fn has_flashlight(&self) -> bool {
        self.inventory.has(ItemKind::Flashlight)
    }

    /// Put an item in the inventory. Flashlight widens the view.
    pub fn collect(&mut self, mut item: Item) {
        item.collected = true;
        if item.kind == ItemKind::Flashlight {
            self.expand_visibility(FLASHLIGHT_VISIBILITY);
        }
        self.inventory.add(item);
    }
}

/// Level-3 hazard. Holds no grid reference; movement takes the grid per call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Ghost {
    pub pos: Position,
    /// Sweep axis: true = up/down, false = left/right.
    pub vertical: bool,
    /// Sweep sign: true = towards larger coordinates.
    pub positive: bool,
}

impl Ghost {
    pub fn new(pos: Position) -> Self {
        Ghost { pos, vertical: false, positive: true }
    }

    pub fn with_axis(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_tokens() {
        assert_eq!(MoveDir::parse("W"), Some(MoveDir::Up));
        assert_eq!(MoveDir::parse(" down "), Some(MoveDir::Down));
        assert_eq!(MoveDir::parse("a"), Some(MoveDir::Left));
        assert_eq!(MoveDir::parse("Right"), Some(MoveDir::Right));
        assert_eq!(MoveDir::parse("north"), None);
        assert_eq!(MoveDir::parse(""), None);
    }

    #[test]
    fn starting_visibility_by_level() {
        let p = Position::new(0, 0);
        assert_eq!(Player::new(1, p).visibility(), FULL_VISIBILITY);
        assert_eq!(Player::new(2, p).visibility(), DARK_VISIBILITY);
        assert_eq!(Player::new(3, p).visibility(), DARK_VISIBILITY);
    }

    #[test]
    fn flashlight_expands_but_never_shrinks() {
        let mut p = Player::new(2, Position::new(1, 1));
        p.collect(Item::new(ItemKind::Flashlight, Position::new(1, 1)));
        assert_eq!(p.visibility(), FLASHLIGHT_VISIBILITY);
        assert!(p.has_flashlight());

        let mut lvl1 = Player::new(1, Position::new(1, 1));
        lvl1.collect(Item::new(ItemKind::Flashlight, Position::new(1, 1)));
        assert_eq!(lvl1.visibility(), FULL_VISIBILITY);
    }

    #[test]
    fn collect_marks_item_and_keeps_order() {
        let mut p = Player::new(2, Position::new(0, 0));
        p.collect(Item::new(ItemKind::Key, Position::new(3, 3)));
        p.collect(Item::new(ItemKind::Flashlight, Position::new(5, 5)));
        let kinds: Vec<_> = p.inventory.items().iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Key, ItemKind::Flashlight]);
        assert!(p.inventory.items().iter().all(|i| i.collected));
        assert!(p.has_key());
    }

    #[test]
    fn slot_take_leaves_collected() {
        let mut slot = ItemSlot::Present(Item::new(ItemKind::Key, Position::new(2, 2)));
        assert!(slot.is_at(Position::new(2, 2)));
        let item = slot.take().unwrap();
        assert_eq!(item.kind, ItemKind::Key);
        assert_eq!(slot, ItemSlot::Collected);
        assert!(slot.take().is_none());
        assert_eq!(slot, ItemSlot::Collected);

        let mut absent = ItemSlot::Absent;
        assert!(absent.take().is_none());
        assert_eq!(absent, ItemSlot::Absent);
    }
}
