/// Computer players.
mod minimax_agent;
pub use minimax_agent::MinimaxAgent;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board_game::{Move, Player, PlayerId};
use crate::tictactoe::Board;

/// An agent that will choose a move given the state of the board. Self is mutable
/// because agents may carry a random source.
pub trait BoardGameAgent {
    /// Pick a move for `me` among `board.available_moves()`, or `Move::NONE` if the
    /// board is full. `players` is every participant, `me` included.
    fn next_move(&mut self, board: &Board, me: PlayerId, players: &[Player]) -> Move;
}

/*
 * ------------
 * Random Agent
 * ------------
 */

/// Agent that makes uniformly random moves.
#[derive(Clone, Debug, Default)]
pub struct RandomAgent {
    // None means the thread-local generator
    rng: Option<StdRng>,
}

impl BoardGameAgent for RandomAgent {
    fn next_move(&mut self, board: &Board, _me: PlayerId, _players: &[Player]) -> Move {
        self.random_move(board)
    }
}

impl RandomAgent {
    pub fn new() -> RandomAgent {
        RandomAgent { rng: None }
    }

    /// Agent whose choices are reproducible for a given seed.
    pub fn seeded(seed: u64) -> RandomAgent {
        RandomAgent {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn random_move(&mut self, board: &Board) -> Move {
        let valid_moves = board.available_moves();
        let choice = match self.rng.as_mut() {
            Some(rng) => valid_moves.choose(rng),
            None => valid_moves.choose(&mut thread_rng()),
        };
        choice.copied().unwrap_or(Move::NONE)
    }
}

/*
 * -----------------
 * Agent selection
 * -----------------
 */

/// Which strategy drives a computer player.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Random,
    Minimax,
}

impl AgentKind {
    /// Build the agent. `seed` makes random choices reproducible; `threads` only
    /// matters for minimax (0 means one per CPU).
    pub fn build(self, seed: Option<u64>, threads: usize) -> Agent {
        let random = match seed {
            Some(seed) => RandomAgent::seeded(seed),
            None => RandomAgent::new(),
        };
        match self {
            AgentKind::Random => Agent::Random(random),
            AgentKind::Minimax => {
                Agent::Minimax(MinimaxAgent::with_fallback(random).with_threads(threads))
            }
        }
    }
}

/// Any of the computer players.
#[derive(Clone, Debug)]
pub enum Agent {
    Random(RandomAgent),
    Minimax(MinimaxAgent),
}

impl Agent {
    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Random(_) => AgentKind::Random,
            Agent::Minimax(_) => AgentKind::Minimax,
        }
    }
}

impl BoardGameAgent for Agent {
    fn next_move(&mut self, board: &Board, me: PlayerId, players: &[Player]) -> Move {
        match self {
            Agent::Random(agent) => agent.next_move(board, me, players),
            Agent::Minimax(agent) => agent.next_move(board, me, players),
        }
    }
}

#[cfg(test)]
fn test_players() -> Vec<Player> {
    use crate::board_game::{Color, Symbol};
    vec![
        Player::ai("AI", Symbol::Circle, Color::RED),
        Player::new("Human", Symbol::Cross, Color::BLUE),
    ]
}

#[test]
fn test_random_agent_valid_move() {
    let players = test_players();
    let board = Board::new(3, 3, 3);
    let mut agent = RandomAgent::new();
    for _ in 0..20 {
        let move_ = agent.next_move(&board, players[0].id(), &players);
        assert!(move_.is_valid(3, 3));
    }
}

#[test]
fn test_random_agent_picks_only_empty_cell() {
    let players = test_players();
    let mut board = Board::new(2, 2, 2);
    board.play(players[0].id(), 0, 0);
    board.play(players[1].id(), 0, 1);
    board.play(players[1].id(), 1, 0);
    let move_ = RandomAgent::new().next_move(&board, players[0].id(), &players);
    assert_eq!(move_, Move::new(1, 1));
}

#[test]
fn test_random_agent_full_board() {
    let players = test_players();
    let mut board = Board::new(1, 2, 2);
    board.play(players[0].id(), 0, 0);
    board.play(players[1].id(), 0, 1);
    let move_ = RandomAgent::new().next_move(&board, players[0].id(), &players);
    assert!(move_.is_none());
}

#[test]
fn test_seeded_random_agents_agree() {
    let players = test_players();
    let board = Board::new(5, 5, 4);
    let mut a = RandomAgent::seeded(7);
    let mut b = RandomAgent::seeded(7);
    for _ in 0..10 {
        assert_eq!(
            a.next_move(&board, players[0].id(), &players),
            b.next_move(&board, players[0].id(), &players)
        );
    }
}

#[test]
fn test_agent_kind_build() {
    assert_eq!(AgentKind::Random.build(None, 1).kind(), AgentKind::Random);
    assert_eq!(AgentKind::Minimax.build(Some(3), 0).kind(), AgentKind::Minimax);
}
