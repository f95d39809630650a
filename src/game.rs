/// Turn order, round lifecycle and scores on top of a `Board`.
use tracing::{debug, info, warn};

use crate::board_game::{Color, GameState, Player, PlayerId, Symbol};
use crate::tictactoe::Board;

pub const DEFAULT_BOARD_WIDTH: usize = 3;
pub const DEFAULT_BOARD_HEIGHT: usize = 3;
pub const DEFAULT_TO_WIN: usize = 3;

/// The standard two-player setup used whenever no players are supplied.
pub fn default_players() -> Vec<Player> {
    vec![
        Player::new("Player 1", Symbol::Circle, Color::RED),
        Player::new("Player 2", Symbol::Cross, Color::BLUE),
    ]
}

/// One board, the players taking turns on it, and whose turn it is.
#[derive(Clone, Debug)]
pub struct Game {
    state: GameState,
    board: Board,
    // never empty
    players: Vec<Player>,
    current: PlayerId,
    // None while playing, and after a draw
    winner: Option<PlayerId>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// Classic 3x3 game between the two default players.
    pub fn new() -> Game {
        Game::with_config(
            DEFAULT_BOARD_WIDTH,
            DEFAULT_BOARD_HEIGHT,
            DEFAULT_TO_WIN,
            Vec::new(),
        )
    }

    /// Game on a custom board. An empty `players` list means the default players.
    pub fn with_config(width: usize, height: usize, to_win: usize, players: Vec<Player>) -> Game {
        let players = if players.is_empty() {
            default_players()
        } else {
            players
        };
        let current = players[0].id();
        let mut game = Game {
            state: GameState::Playing,
            board: Board::new(width, height, to_win),
            players,
            current,
            winner: None,
        };
        game.reset_points();
        game
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn is_ended(&self) -> bool {
        self.state == GameState::Ended
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    /// Whose turn it is.
    pub fn current(&self) -> PlayerId {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.player(self.current)
    }

    /// Hand the turn to `id`, whether or not it is in the match.
    #[cfg(test)]
    fn set_current(&mut self, id: PlayerId) {
        self.current = id;
    }

    /// Winner of the round, None while playing or after a draw.
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn winner_player(&self) -> Option<&Player> {
        self.winner.and_then(|id| self.player(id))
    }

    /// Play the current player's mark at (x, y). Returns false and changes nothing
    /// if the board rejects the move. Otherwise the round either ends (win or
    /// draw) or the turn passes to the next player.
    pub fn play_move(&mut self, x: i32, y: i32) -> bool {
        if !self.board.play(self.current, x, y) {
            debug!(player = %self.current, x, y, "move rejected");
            return false;
        }
        debug!(player = %self.current, x, y, "move played");

        if self.check_win() || self.check_draw() {
            return true;
        }

        self.next_player();
        true
    }

    /// If the board has a complete line, end the round and credit its owner.
    pub fn check_win(&mut self) -> bool {
        let winner = match self.board.check_win() {
            Some(winner) => winner,
            None => return false,
        };

        self.winner = Some(winner);
        self.state = GameState::Ended;
        match self.players.iter_mut().find(|p| p.id() == winner) {
            Some(player) => {
                player.points += 1;
                info!(winner = %player.name, points = player.points, "round won");
            }
            None => warn!(winner = %winner, "round won by a player outside the match"),
        }
        true
    }

    /// If the board is full, end the round as a draw. Call `check_win` first.
    pub fn check_draw(&mut self) -> bool {
        if !self.board.check_draw() {
            return false;
        }

        self.winner = None;
        self.state = GameState::Ended;
        info!("round drawn");
        true
    }

    /// Pass the turn to the next player in list order, wrapping around.
    pub fn next_player(&mut self) {
        let count = self.players.len();
        match self.players.iter().position(|p| p.id() == self.current) {
            Some(i) => self.current = self.players[(i + 1) % count].id(),
            None => {
                warn!(
                    current = %self.current,
                    "current player is not in the match, restarting from the first player"
                );
                self.current = self.players[0].id();
            }
        }
    }

    /// Start a new round on the same board, keeping the scores.
    pub fn reset(&mut self) {
        self.board.clear();
        self.current = self.players[0].id();
        self.winner = None;
        self.state = GameState::Playing;
        info!("round reset");
    }

    /// Start a brand new default match.
    pub fn reset_hard(&mut self) {
        self.reset_hard_with_players(
            DEFAULT_BOARD_WIDTH,
            DEFAULT_BOARD_HEIGHT,
            DEFAULT_TO_WIN,
            Vec::new(),
        );
    }

    /// Start a brand new match: new board, new players (the defaults if `players`
    /// is empty), every score back to zero.
    pub fn reset_hard_with_players(
        &mut self,
        width: usize,
        height: usize,
        to_win: usize,
        players: Vec<Player>,
    ) {
        *self = Game::with_config(width, height, to_win, players);
        info!(width, height, to_win, "match reset");
    }

    /// Zero every player's score without touching the board or the turn.
    pub fn reset_points(&mut self) {
        for player in self.players.iter_mut() {
            player.points = 0;
        }
    }
}

#[test]
fn test_new_game() {
    let game = Game::new();
    assert!(game.is_playing());
    assert_eq!(game.players().len(), 2);
    assert_eq!(game.current(), game.players()[0].id());
    assert_eq!(game.winner(), None);
    assert_eq!(game.board().available_moves().len(), 9);
}

#[test]
fn test_play_move_switches_player() {
    let mut game = Game::new();
    let first = game.current();
    assert!(game.play_move(0, 0));
    assert_eq!(game.current(), game.players()[1].id());
    assert!(game.current() != first);
}

#[test]
fn test_play_move_rejected_keeps_turn() {
    let mut game = Game::new();
    assert!(game.play_move(0, 0));
    let second = game.current();

    assert!(!game.play_move(0, 0));
    assert_eq!(game.current(), second);
    assert!(!game.play_move(5, 5));
    assert_eq!(game.current(), second);
    assert_eq!(game.board().occupied_count(), 1);
}

#[test]
fn test_diagonal_win_via_play_move() {
    let mut game = Game::new();
    let p1 = game.players()[0].id();
    for &(x, y) in &[(0, 0), (0, 1), (1, 1), (0, 2), (2, 2)] {
        assert!(game.play_move(x, y));
    }
    assert_eq!(game.winner(), Some(p1));
    assert!(game.is_ended());
    assert_eq!(game.players()[0].points, 1);
    assert_eq!(game.players()[1].points, 0);
    // the winner keeps the turn
    assert_eq!(game.current(), p1);
}

#[test]
fn test_draw_via_play_move() {
    let mut game = Game::new();
    // o x o / o x o / x o x, alternating from o
    for &(x, y) in &[
        (0, 0),
        (1, 0),
        (2, 0),
        (1, 1),
        (0, 1),
        (0, 2),
        (2, 1),
        (2, 2),
        (1, 2),
    ] {
        assert!(game.play_move(x, y));
    }
    assert!(game.is_ended());
    assert_eq!(game.winner(), None);
    assert!(game.players().iter().all(|p| p.points == 0));
}

#[test]
fn test_check_win_on_board_played_directly() {
    let mut game = Game::new();
    let p = game.players()[0].id();
    game.board.play(p, 0, 0);
    game.board.play(p, 1, 0);
    game.board.play(p, 2, 0);
    assert!(game.check_win());
    assert_eq!(game.winner(), Some(p));
    assert!(game.is_ended());
}

#[test]
fn test_next_player_wraps_around() {
    let mut game = Game::with_config(
        4,
        4,
        3,
        vec![
            Player::new("a", Symbol::Circle, Color::RED),
            Player::new("b", Symbol::Cross, Color::BLUE),
            Player::new("c", Symbol::Triangle, Color::RED),
        ],
    );
    let ids: Vec<PlayerId> = game.players().iter().map(|p| p.id()).collect();
    game.next_player();
    assert_eq!(game.current(), ids[1]);
    game.next_player();
    assert_eq!(game.current(), ids[2]);
    game.next_player();
    assert_eq!(game.current(), ids[0]);
}

#[test]
fn test_next_player_fallback() {
    let mut game = Game::new();
    game.set_current(PlayerId::fresh());
    game.next_player();
    assert_eq!(game.current(), game.players()[0].id());
}

#[test]
fn test_reset_keeps_points() {
    let mut game = Game::new();
    game.players[0].points = 3;
    game.play_move(0, 0);
    game.play_move(1, 1);
    game.reset();
    assert_eq!(game.players()[0].points, 3);
    assert_eq!(game.board().available_moves().len(), 9);
    assert_eq!(game.current(), game.players()[0].id());
    assert!(game.is_playing());
}

#[test]
fn test_reset_after_win() {
    let mut game = Game::new();
    for &(x, y) in &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)] {
        game.play_move(x, y);
    }
    assert!(game.is_ended());
    game.reset();
    assert!(game.is_playing());
    assert_eq!(game.winner(), None);
    assert_eq!(game.players()[0].points, 1);
}

#[test]
fn test_reset_hard() {
    let mut game = Game::new();
    game.players[0].points = 5;
    game.play_move(0, 0);
    game.reset_hard();
    assert!(game.is_playing());
    assert_eq!(game.winner(), None);
    assert!(game.players().iter().all(|p| p.points == 0));
    assert_eq!(game.board().available_moves().len(), 9);
}

#[test]
fn test_reset_hard_with_players() {
    let mut game = Game::new();
    let mut players = vec![
        Player::new("a", Symbol::Square, Color::RED),
        Player::new("b", Symbol::Cross, Color::BLUE),
    ];
    players[1].points = 7;
    let first = players[0].id();

    game.reset_hard_with_players(5, 4, 4, players);
    assert_eq!(game.board().width(), 5);
    assert_eq!(game.board().height(), 4);
    assert_eq!(game.board().to_win(), 4);
    assert_eq!(game.current(), first);
    assert!(game.players().iter().all(|p| p.points == 0));
}

#[test]
fn test_reset_points() {
    let mut game = Game::new();
    game.players[0].points = 2;
    game.players[1].points = 4;
    game.play_move(1, 1);
    let current = game.current();
    game.reset_points();
    assert!(game.players().iter().all(|p| p.points == 0));
    assert_eq!(game.board().occupied_count(), 1);
    assert_eq!(game.current(), current);
}
