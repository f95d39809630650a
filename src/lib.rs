//! N-in-a-row tic-tac-toe on any `width` x `height` board, with turn and score
//! keeping for any number of players, and computer players that move at random or
//! by exhaustive minimax search.
//!
//! ```
//! use mnk::{BoardGameAgent, Game, MinimaxAgent};
//!
//! let mut game = Game::new();
//! let mut agent = MinimaxAgent::new();
//! while game.is_playing() {
//!     let me = game.current();
//!     let move_ = agent.next_move(game.board(), me, game.players());
//!     assert!(game.play_move(move_.x, move_.y));
//! }
//! // perfect play from both sides
//! assert_eq!(game.winner(), None);
//! ```

pub mod agents;
pub mod board_game;
pub mod config;
pub mod game;
pub mod session;
pub mod tictactoe;

pub use agents::{Agent, AgentKind, BoardGameAgent, MinimaxAgent, RandomAgent};
pub use board_game::{Cell, Color, GameState, Move, Player, PlayerId, Symbol};
pub use config::{ConfigError, GameConfig, PlayerConfig};
pub use game::Game;
pub use session::{parse_move, InputError, Session, SessionError};
pub use tictactoe::Board;
