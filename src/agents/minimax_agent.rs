/// Exhaustive minimax agent for two-player games.
use std::time::Instant;

use scoped_threadpool::Pool;
use tracing::{debug, trace};

use crate::agents::{BoardGameAgent, RandomAgent};
use crate::board_game::{Move, Player, PlayerId};
use crate::tictactoe::Board;

// terminal values, from the searching player's point of view
const WIN_SCORE: i32 = 1;
const DRAW_SCORE: i32 = 0;
const LOSE_SCORE: i32 = -1;

// starting bounds, strictly outside the range of terminal values
const NO_SCORE_LOW: i32 = -9999;
const NO_SCORE_HIGH: i32 = 9999;

/// Scores positions by searching every line of play down to a win, loss or draw.
/// Only terminal positions are scored, there is no evaluation of unfinished games,
/// so this is meant for small boards.
#[derive(Clone, Debug)]
pub struct MinimaxAgent {
    // number of worker threads scoring the top-level moves; 1 searches inline
    threads: usize,
    // used whenever the match does not have exactly two players
    fallback: RandomAgent,
}

impl Default for MinimaxAgent {
    fn default() -> Self {
        MinimaxAgent::new()
    }
}

impl BoardGameAgent for MinimaxAgent {
    fn next_move(&mut self, board: &Board, me: PlayerId, players: &[Player]) -> Move {
        if players.len() != 2 {
            debug!(
                players = players.len(),
                "minimax needs exactly two players, choosing at random"
            );
            return self.fallback.next_move(board, me, players);
        }
        match players.iter().map(Player::id).find(|&id| id != me) {
            Some(opponent) => self.best_move(board, me, opponent),
            None => self.fallback.next_move(board, me, players),
        }
    }
}

impl MinimaxAgent {
    pub fn new() -> MinimaxAgent {
        MinimaxAgent::with_fallback(RandomAgent::new())
    }

    /// Agent that uses `fallback` for matches that are not one-on-one.
    pub fn with_fallback(fallback: RandomAgent) -> MinimaxAgent {
        MinimaxAgent {
            threads: 1,
            fallback,
        }
    }

    /// Score the top-level moves on `threads` workers. 0 means one per CPU.
    pub fn with_threads(mut self, threads: usize) -> MinimaxAgent {
        self.threads = match threads {
            0 => num_cpus::get(),
            n => n,
        };
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// The best move for `me` against `opponent`, or `Move::NONE` on a full board.
    /// Among equally scored moves the first one in `available_moves()` order wins.
    pub fn best_move(&self, board: &Board, me: PlayerId, opponent: PlayerId) -> Move {
        let now = Instant::now();
        let moves = board.available_moves();

        let results = if self.threads > 1 && moves.len() > 1 {
            self.score_moves_parallel(board, &moves, me, opponent)
        } else {
            moves
                .iter()
                .map(|&move_| {
                    let mut search = Search::new(me, opponent);
                    let score = search.score_move(board, move_);
                    (score, search.nodes)
                })
                .collect()
        };

        let mut best_score = NO_SCORE_LOW;
        let mut best_move = Move::NONE;
        let mut total_nodes = 0;
        for (&move_, &(score, nodes)) in moves.iter().zip(results.iter()) {
            trace!(%move_, score, nodes, "evaluated move");
            total_nodes += nodes;
            // strict: ties keep the earlier move
            if score > best_score {
                best_score = score;
                best_move = move_;
            }
        }

        debug!(
            player = %me,
            chosen = %best_move,
            score = best_score,
            nodes = total_nodes,
            took = ?now.elapsed(),
            "minimax chose move"
        );
        best_move
    }

    /// Score every move on its own clone of the board, one pool job per move.
    /// Results come back in the same order as `moves`.
    fn score_moves_parallel(
        &self,
        board: &Board,
        moves: &[Move],
        me: PlayerId,
        opponent: PlayerId,
    ) -> Vec<(i32, usize)> {
        let mut results = vec![(NO_SCORE_LOW, 0); moves.len()];
        let mut pool = Pool::new(self.threads as u32);
        pool.scoped(|scoped| {
            for (slot, &move_) in results.iter_mut().zip(moves.iter()) {
                scoped.execute(move || {
                    let mut search = Search::new(me, opponent);
                    *slot = (search.score_move(board, move_), search.nodes);
                });
            }
        });
        results
    }
}

/// State of one depth-first search: who is who, and how many positions were seen.
struct Search {
    me: PlayerId,
    opponent: PlayerId,
    nodes: usize,
}

impl Search {
    fn new(me: PlayerId, opponent: PlayerId) -> Search {
        Search {
            me,
            opponent,
            nodes: 0,
        }
    }

    /// Play `move_` for us on a copy of `board` and score the result with the
    /// opponent to move.
    fn score_move(&mut self, board: &Board, move_: Move) -> i32 {
        let mut theoretical_board = board.clone();
        theoretical_board.play(self.me, move_.x, move_.y);
        self.minimax(&theoretical_board, false)
    }

    /// Value of `board` for us: the best child on our turn, the worst child on the
    /// opponent's turn, and the outcome itself once the game is over.
    fn minimax(&mut self, board: &Board, maximizing: bool) -> i32 {
        self.nodes += 1;

        match board.check_win() {
            Some(winner) if winner == self.me => return WIN_SCORE,
            Some(_) => return LOSE_SCORE,
            None => (),
        }
        if board.check_draw() {
            return DRAW_SCORE;
        }

        let (player, mut best) = if maximizing {
            (self.me, NO_SCORE_LOW)
        } else {
            (self.opponent, NO_SCORE_HIGH)
        };

        for move_ in board.available_moves() {
            let mut theoretical_board = board.clone();
            theoretical_board.play(player, move_.x, move_.y);
            let score = self.minimax(&theoretical_board, !maximizing);
            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }

        best
    }
}

#[cfg(test)]
fn test_players() -> (Player, Player) {
    use crate::board_game::{Color, Symbol};
    (
        Player::ai("AI", Symbol::Circle, Color::RED),
        Player::new("Human", Symbol::Cross, Color::BLUE),
    )
}

#[cfg(test)]
fn board_from(rows: &[&str], ai: PlayerId, human: PlayerId) -> Board {
    let mut board = Board::new(rows[0].len(), rows.len(), 3);
    for (y, row) in rows.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            match c {
                'o' => assert!(board.play(ai, x as i32, y as i32)),
                'x' => assert!(board.play(human, x as i32, y as i32)),
                _ => (),
            }
        }
    }
    board
}

#[test]
fn test_minimax_returns_valid_move() {
    let (ai, human) = test_players();
    let board = Board::new(3, 3, 3);
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai.clone(), human.clone()]);
    assert!(move_.is_valid(3, 3));
    assert_eq!(board.owner(move_.x, move_.y), None);
}

#[test]
fn test_minimax_takes_the_win() {
    let (ai, human) = test_players();
    let board = board_from(&["oo.", "xx.", "..."], ai.id(), human.id());
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai, human]);
    assert_eq!(move_, Move::new(2, 0));
}

#[test]
fn test_minimax_blocks_the_loss() {
    let (ai, human) = test_players();
    let board = board_from(&["xx.", ".o.", "..."], ai.id(), human.id());
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai, human]);
    assert_eq!(move_, Move::new(2, 0));
}

#[test]
fn test_minimax_endgame() {
    let (ai, human) = test_players();
    // (1,2) blocks x's middle column and draws, (2,2) lets x complete it
    let board = board_from(&["oxo", "oxx", "x.."], ai.id(), human.id());
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai.clone(), human.clone()]);
    assert_eq!(move_, Move::new(1, 2));

    // one cell left
    let board = board_from(&["oxo", "xxo", "o.x"], ai.id(), human.id());
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai, human]);
    assert_eq!(move_, Move::new(1, 2));
}

#[test]
fn test_minimax_ties_keep_first_move() {
    let (ai, human) = test_players();
    // every move wins at once, so the first cell in column-major order is kept
    let board = Board::new(3, 3, 1);
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai.clone(), human.clone()]);
    assert_eq!(move_, Move::new(0, 0));

    // every move loses to x's open row, so again the first empty cell is kept
    let board = board_from(&["xx.", "xx.", "o.."], ai.id(), human.id());
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai, human]);
    assert_eq!(move_, Move::new(1, 2));
}

#[test]
fn test_minimax_full_board() {
    let (ai, human) = test_players();
    let board = board_from(&["oxo", "oxx", "xoo"], ai.id(), human.id());
    let move_ = MinimaxAgent::new().next_move(&board, ai.id(), &[ai, human]);
    assert!(move_.is_none());
}

#[test]
fn test_minimax_falls_back_with_three_players() {
    use crate::board_game::{Color, Symbol};

    let (ai, human) = test_players();
    let third = Player::new("Third", Symbol::Triangle, Color::RED);
    let board = Board::new(4, 4, 3);
    let players = [ai.clone(), human, third];
    let move_ = MinimaxAgent::with_fallback(RandomAgent::seeded(1)).next_move(
        &board,
        ai.id(),
        &players,
    );
    assert!(move_.is_valid(4, 4));
}

#[test]
fn test_parallel_search_matches_sequential() {
    let (ai, human) = test_players();
    let board = board_from(&["o..", ".x.", "..."], ai.id(), human.id());
    let sequential = MinimaxAgent::new().best_move(&board, ai.id(), human.id());
    let parallel = MinimaxAgent::new()
        .with_threads(4)
        .best_move(&board, ai.id(), human.id());
    assert_eq!(sequential, parallel);
    assert!(MinimaxAgent::new().with_threads(0).threads() >= 1);
}
