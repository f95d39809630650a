/// Value types shared by the board, the game and the agents.
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Column labels used when printing the board and parsing human input.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

// handles are never reused within a process, so two players built from the same
// attributes are still different players
static NEXT_PLAYER_ID: AtomicUsize = AtomicUsize::new(0);

/// Has the round ended or is it still being played?
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameState {
    Playing,
    Ended,
}

/// Opaque identity of a player. Board cells store these instead of owning players.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct PlayerId(usize);

impl PlayerId {
    /// Allocate a handle that no other player in this process has.
    pub fn fresh() -> PlayerId {
        PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape a player's marks are drawn with.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cross,
    Circle,
    Triangle,
    Square,
}

impl Symbol {
    /// Single character used for terminal output.
    pub fn glyph(self) -> char {
        match self {
            Symbol::Cross => 'x',
            Symbol::Circle => 'o',
            Symbol::Triangle => '^',
            Symbol::Square => '#',
        }
    }

    /// Symbol handed to the player in the given slot when none was configured.
    pub fn for_slot(slot: usize) -> Symbol {
        match slot % 4 {
            0 => Symbol::Circle,
            1 => Symbol::Cross,
            2 => Symbol::Triangle,
            _ => Symbol::Square,
        }
    }
}

/// RGB color of a player, as shown in score boards.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const RED: Color = Color(255, 0, 0);
    pub const BLUE: Color = Color(0, 0, 255);

    /// Palette used for players that were configured without a color.
    pub const PALETTE: [Color; 4] = [
        Color(255, 99, 132),
        Color(54, 162, 235),
        Color(255, 206, 86),
        Color(75, 192, 192),
    ];
}

/// A participant in a match. Identity is the `id`; every other field is display
/// data or score.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    pub name: String,
    pub symbol: Symbol,
    pub color: Color,
    // rounds won since the last hard reset
    pub points: u32,
    pub is_ai: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, symbol: Symbol, color: Color) -> Player {
        Player {
            id: PlayerId::fresh(),
            name: name.into(),
            symbol,
            color,
            points: 0,
            is_ai: false,
        }
    }

    /// Same as `new`, flagged as computer controlled.
    pub fn ai(name: impl Into<String>, symbol: Symbol, color: Color) -> Player {
        Player {
            is_ai: true,
            ..Player::new(name, symbol, color)
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }
}

/// Represents a single cell of a game board.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cell {
    Empty,
    Full(PlayerId),
}

/// A grid coordinate: `x` is the column, `y` the row, both zero based.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Move {
    pub x: i32,
    pub y: i32,
}

impl Move {
    /// Returned by agents when the board has no empty cell left. Never apply it.
    pub const NONE: Move = Move { x: -1, y: -1 };

    pub fn new(x: i32, y: i32) -> Move {
        Move { x, y }
    }

    /// Are the coordinates inside a `width` x `height` board?
    pub fn is_valid(self, width: usize, height: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < width && (self.y as usize) < height
    }

    pub fn is_none(self) -> bool {
        self == Move::NONE
    }
}

impl fmt::Display for Move {
    /// Column letter followed by row number, the same notation humans type in.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match ALPHABET.chars().nth(self.x.max(0) as usize) {
            Some(col) if !self.is_none() => write!(f, "{}{}", col, self.y),
            _ => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

#[test]
fn test_player_ids_are_unique() {
    let a = Player::new("same", Symbol::Cross, Color::RED);
    let b = Player::new("same", Symbol::Cross, Color::RED);
    assert!(a.id() != b.id());
    assert!(a.clone().id() == a.id());
}

#[test]
fn test_move_is_valid() {
    assert!(Move::new(0, 0).is_valid(3, 3));
    assert!(Move::new(2, 1).is_valid(3, 2));
    assert!(!Move::new(3, 0).is_valid(3, 3));
    assert!(!Move::new(0, 2).is_valid(3, 2));
    assert!(!Move::new(-1, 0).is_valid(3, 3));
    assert!(!Move::NONE.is_valid(3, 3));
    assert!(Move::NONE.is_none());
}

#[test]
fn test_move_display() {
    assert_eq!(Move::new(1, 2).to_string(), "b2");
    assert_eq!(Move::NONE.to_string(), "(-1, -1)");
}
