/// N-in-a-row board on a `width` x `height` grid.
use std::fmt;

use crate::board_game::Cell::{Empty, Full};
use crate::board_game::{Cell, Move, Player, PlayerId, ALPHABET};

/// Step vectors scanned from every occupied cell. The reverse directions are not
/// needed because every cell is tried as the start of a line.
const WIN_DIRECTIONS: [(isize, isize); 4] = [
    (1, 0),  // →
    (0, 1),  // ↓
    (1, 1),  // ↘
    (1, -1), // ↗
];

/// Store the size and state of the board.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    // as configured; see effective_to_win() for the value actually used
    to_win: usize,
    // column-major: cell (x, y) lives at x * height + y
    cells: Vec<Cell>,
}

impl fmt::Debug for Board {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let mut board_repr = String::new();
        for y in 0..self.height {
            if y > 0 {
                board_repr.push('/');
            }
            for x in 0..self.width {
                board_repr.push(match self.cells[self.index(x, y)] {
                    Empty => '.',
                    Full(_) => '*',
                });
            }
        }
        write!(
            formatter,
            "Board {{ {}x{}, to_win: {}, cells: [{}] }}",
            self.width, self.height, self.to_win, board_repr,
        )
    }
}

impl Board {
    /// Return a new empty board. `to_win` is not validated here, it is clamped
    /// whenever a win is checked.
    pub fn new(width: usize, height: usize, to_win: usize) -> Board {
        Board {
            width,
            height,
            to_win,
            cells: vec![Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The alignment length this board was built with, possibly out of range.
    pub fn to_win(&self) -> usize {
        self.to_win
    }

    /// Alignment length used for win detection: `to_win`, or the smaller board
    /// dimension when `to_win` is zero or does not fit on the board.
    pub fn effective_to_win(&self) -> usize {
        let min_dim = self.width.min(self.height);
        if self.to_win == 0 || self.to_win > min_dim {
            min_dim
        } else {
            self.to_win
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Convert signed coordinates to an index, or None if they are off the board.
    fn checked_index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.index(x, y))
    }

    /// Contents of the cell at (x, y), or None if the coordinates are off the board.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.checked_index(x as isize, y as isize)
            .map(|idx| self.cells[idx])
    }

    /// Owner of the cell at (x, y), if it is on the board and occupied.
    pub fn owner(&self, x: i32, y: i32) -> Option<PlayerId> {
        match self.get(x, y) {
            Some(Full(player)) => Some(player),
            _ => None,
        }
    }

    /// Place `player`'s mark at (x, y). Returns false, leaving the board untouched,
    /// if the cell is off the board or already taken.
    pub fn play(&mut self, player: PlayerId, x: i32, y: i32) -> bool {
        let idx = match self.checked_index(x as isize, y as isize) {
            Some(idx) => idx,
            None => return false,
        };
        match self.cells[idx] {
            Empty => {
                self.cells[idx] = Full(player);
                true
            }
            Full(_) => false,
        }
    }

    /// Return the owner of the first complete line found, scanning columns left to
    /// right, rows top to bottom, then the four directions in order.
    pub fn check_win(&self) -> Option<PlayerId> {
        let target = self.effective_to_win();

        for x in 0..self.width {
            for y in 0..self.height {
                let player = match self.cells[self.index(x, y)] {
                    Empty => continue,
                    Full(player) => player,
                };
                let (x, y) = (x as isize, y as isize);
                let found = WIN_DIRECTIONS
                    .iter()
                    .any(|&dir| self.player_fills_line(player, x, y, dir, target));
                if found {
                    return Some(player);
                }
            }
        }

        None
    }

    /// Are the `target` cells starting at (x, y) and stepping by `dir` all owned by
    /// `player`? The start cell is assumed to already be owned.
    fn player_fills_line(
        &self,
        player: PlayerId,
        x: isize,
        y: isize,
        (dx, dy): (isize, isize),
        target: usize,
    ) -> bool {
        if target == 0 {
            return false;
        }
        for step in 1..target as isize {
            match self.checked_index(x + dx * step, y + dy * step) {
                Some(idx) if self.cells[idx] == Full(player) => (),
                _ => return false,
            }
        }
        true
    }

    /// True when no empty cell remains. This does not look for a winner, so check
    /// `check_win` first.
    pub fn check_draw(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Empty)
    }

    /// Every empty cell, columns left to right and rows top to bottom within each
    /// column. Search agents rely on this order being stable.
    pub fn available_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(self.cells.len());
        for x in 0..self.width {
            for y in 0..self.height {
                if self.cells[self.index(x, y)] == Empty {
                    moves.push(Move::new(x as i32, y as i32));
                }
            }
        }
        moves
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != Empty).count()
    }

    /// Empty every cell, keeping dimensions and `to_win`.
    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = Empty;
        }
    }

    /// Board drawn with the column and row labels:
    ///
    ///   abc
    /// 0 o..
    /// 1 .x.
    /// 2 ...
    ///
    /// Marks are looked up in `players`; handles not in the list show as '?'.
    pub fn render(&self, players: &[Player]) -> String {
        if self.width > ALPHABET.len() {
            return String::from("The board is too wide to print with column labels\n");
        }
        let row_label_width = self.height.saturating_sub(1).to_string().len() + 1;
        let mut out = format!(
            "\n{:w$}{}\n",
            "",
            &ALPHABET[..self.width],
            w = row_label_width
        );
        for y in 0..self.height {
            out.push_str(&format!("{:<w$}", y, w = row_label_width));
            for x in 0..self.width {
                out.push(match self.cells[self.index(x, y)] {
                    Empty => '.',
                    Full(id) => players
                        .iter()
                        .find(|p| p.id() == id)
                        .map(|p| p.symbol.glyph())
                        .unwrap_or('?'),
                });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
fn two_players() -> (PlayerId, PlayerId) {
    (PlayerId::fresh(), PlayerId::fresh())
}

#[test]
fn test_play_and_available_moves() {
    let (p1, _) = two_players();
    let mut board = Board::new(3, 3, 3);
    assert!(board.play(p1, 1, 1));
    assert_eq!(board.owner(1, 1), Some(p1));
    assert_eq!(board.available_moves().len(), 8);
    assert_eq!(board.occupied_count(), 1);
}

#[test]
fn test_play_rejects_taken_and_out_of_range() {
    let (p1, p2) = two_players();
    let mut board = Board::new(3, 3, 3);
    assert!(board.play(p1, 0, 0));
    let before = board.clone();

    assert!(!board.play(p2, 0, 0));
    assert!(!board.play(p1, 3, 0));
    assert!(!board.play(p1, 0, 3));
    assert!(!board.play(p1, -1, 0));
    assert!(!board.play(p1, 0, -1));
    assert_eq!(board, before);
    assert_eq!(board.owner(0, 0), Some(p1));
}

#[test]
fn test_check_win_row() {
    let (p1, _) = two_players();
    let mut board = Board::new(3, 3, 3);
    board.play(p1, 0, 0);
    board.play(p1, 1, 0);
    assert_eq!(board.check_win(), None);
    board.play(p1, 2, 0);
    assert_eq!(board.check_win(), Some(p1));
}

#[test]
fn test_check_win_column_and_diagonals() {
    let (p1, p2) = two_players();

    let mut board = Board::new(3, 3, 3);
    for y in 0..3 {
        board.play(p2, 1, y);
    }
    assert_eq!(board.check_win(), Some(p2));

    // ↘
    let mut board = Board::new(3, 3, 3);
    for i in 0..3 {
        board.play(p1, i, i);
    }
    assert_eq!(board.check_win(), Some(p1));

    // ↗
    let mut board = Board::new(3, 3, 3);
    for i in 0..3 {
        board.play(p1, i, 2 - i);
    }
    assert_eq!(board.check_win(), Some(p1));
}

#[test]
fn test_draw_without_winner() {
    let (p1, p2) = two_players();
    let mut board = Board::new(3, 3, 3);
    let moves = [
        (p1, 0, 0),
        (p2, 1, 0),
        (p1, 2, 0),
        (p1, 0, 1),
        (p2, 1, 1),
        (p1, 2, 1),
        (p2, 0, 2),
        (p1, 1, 2),
        (p2, 2, 2),
    ];
    for (i, &(player, x, y)) in moves.iter().enumerate() {
        assert!(!board.check_draw(), "board full after only {} moves", i);
        assert!(board.play(player, x, y));
    }
    assert_eq!(board.check_win(), None);
    assert!(board.check_draw());
    assert!(board.available_moves().is_empty());
}

#[test]
fn test_n_in_a_row_on_wide_board() {
    let (p1, p2) = two_players();
    let mut board = Board::new(5, 4, 4);
    for x in 0..3 {
        board.play(p1, x, 3);
    }
    board.play(p2, 3, 3);
    assert_eq!(board.check_win(), None);
    for x in 1..5 {
        board.play(p1, x, 0);
    }
    assert_eq!(board.check_win(), Some(p1));
}

#[test]
fn test_effective_to_win_is_clamped() {
    assert_eq!(Board::new(3, 3, 3).effective_to_win(), 3);
    assert_eq!(Board::new(5, 4, 0).effective_to_win(), 4);
    assert_eq!(Board::new(5, 4, 9).effective_to_win(), 4);
    assert_eq!(Board::new(5, 4, 2).effective_to_win(), 2);

    let (p1, _) = two_players();
    let mut board = Board::new(4, 3, 7);
    assert_eq!(board.to_win(), 7);
    for y in 0..3 {
        board.play(p1, 2, y);
    }
    assert_eq!(board.check_win(), Some(p1));
}

#[test]
fn test_clone_is_independent() {
    let (p1, p2) = two_players();
    let mut board = Board::new(3, 3, 3);
    board.play(p1, 0, 0);

    let mut copy = board.clone();
    assert_eq!(copy, board);

    copy.play(p2, 1, 1);
    assert_eq!(board.get(1, 1), Some(Cell::Empty));
    board.play(p2, 2, 2);
    assert_eq!(copy.get(2, 2), Some(Cell::Empty));
    assert_eq!(copy.owner(0, 0), Some(p1));
}

#[test]
fn test_clear_keeps_shape() {
    let (p1, _) = two_players();
    let mut board = Board::new(4, 3, 0);
    board.play(p1, 3, 2);
    board.clear();
    assert_eq!(board.available_moves().len(), 12);
    assert_eq!((board.width(), board.height(), board.to_win()), (4, 3, 0));
}

#[test]
fn test_available_moves_are_column_major() {
    let board = Board::new(2, 3, 2);
    let moves: Vec<(i32, i32)> = board.available_moves().iter().map(|m| (m.x, m.y)).collect();
    assert_eq!(moves, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
}

#[test]
fn test_degenerate_boards_do_not_panic() {
    let (p1, _) = two_players();
    let mut board = Board::new(0, 0, 3);
    assert!(!board.play(p1, 0, 0));
    assert_eq!(board.check_win(), None);
    assert!(board.check_draw());
    assert!(board.available_moves().is_empty());

    let mut board = Board::new(1, 1, 1);
    assert!(board.play(p1, 0, 0));
    assert_eq!(board.check_win(), Some(p1));
}

#[test]
fn test_render() {
    use crate::board_game::{Color, Symbol};

    let o = Player::new("o", Symbol::Circle, Color::RED);
    let x = Player::new("x", Symbol::Cross, Color::BLUE);
    let mut board = Board::new(3, 2, 3);
    board.play(o.id(), 0, 0);
    board.play(x.id(), 2, 1);
    assert_eq!(board.render(&[o, x]), "\n  abc\n0 o..\n1 ..x\n");
}
