/// Player commands, decoupled from whatever device produced them.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    Interact,
    Quit,
}

/// Interaction reaches this many cells along each axis...
pub const INTERACT_RADIUS: i64 = 2;
/// ...and at most this squared distance.
pub const INTERACT_MAX_SQ: i64 = 8;
