/// Tile kinds and their properties.
/// Properties are queried via methods on the kind, never by comparing
/// whole tiles, so display attributes can't leak into classification.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TileKind {
    Empty,
    Wall,
    Barrier,
    Vegetation,
    Enemy,
    Coin,
    Special, // Freezes the enemy when the player interacts nearby
    Player,
}

impl TileKind {
    /// Can plain movement enter this cell?
    pub fn is_passable(self) -> bool {
        matches!(self, TileKind::Empty | TileKind::Vegetation)
    }

    /// Parse a map-file character. Unknown characters are `None`
    /// (the loader treats them as empty floor).
    pub fn from_symbol(ch: char) -> Option<TileKind> {
        let kind = match ch {
            '▤' | '=' => TileKind::Wall,
            '#' => TileKind::Barrier,
            '♣' => TileKind::Vegetation,
            '☠' | 'E' => TileKind::Enemy,
            '🪙' | '$' => TileKind::Coin,
            '*' => TileKind::Special,
            '☺' | 'P' => TileKind::Player,
            ' ' => TileKind::Empty,
            _ => return None,
        };
        Some(kind)
    }

    /// Map-file glyph.
    pub fn symbol(self) -> char {
        match self {
            TileKind::Empty => ' ',
            TileKind::Wall => '▤',
            TileKind::Barrier => '#',
            TileKind::Vegetation => '♣',
            TileKind::Enemy => '☠',
            TileKind::Coin => '🪙',
            TileKind::Special => '*',
            TileKind::Player => '☺',
        }
    }
}

/// Display variant. Mutable, never consulted by game rules.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tint {
    #[default]
    Normal,
    Frozen,
}

#[derive(Clone, Copy, Debug)]
pub struct Tile {
    pub kind: TileKind,
    pub tint: Tint,
}

impl Tile {
    pub const EMPTY: Tile = Tile::new(TileKind::Empty);

    pub const fn new(kind: TileKind) -> Self {
        Tile { kind, tint: Tint::Normal }
    }

    #[inline]
    pub fn is(self, kind: TileKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn is_passable(self) -> bool {
        self.kind.is_passable()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::EMPTY
    }
}
