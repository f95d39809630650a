/// Match setup: board size, win length and the players taking part.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::agents::{Agent, AgentKind};
use crate::board_game::{Color, Player, PlayerId, Symbol, ALPHABET};
use crate::game::{Game, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DEFAULT_TO_WIN};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("board must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("board is {width} columns wide, human players can only name columns a to z ({max})")]
    TooWideForHumans { width: usize, max: usize },
}

/// One player slot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Empty means "Player N" after the slot number.
    pub name: String,
    pub symbol: Option<Symbol>,
    pub color: Option<Color>,
    pub is_ai: bool,
    /// Strategy for an AI player; random if left out.
    pub ai_model: Option<AgentKind>,
    /// When any slot is ready, slots that are not ready sit the match out.
    pub ready: bool,
}

/// Everything needed to start a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_width: usize,
    pub board_height: usize,
    pub to_win: usize,
    pub players: Vec<PlayerConfig>,
    /// Seeds every random agent, for reproducible matches.
    pub seed: Option<u64>,
    /// Worker threads for minimax agents; 0 means one per CPU.
    pub minimax_threads: usize,
}

impl Default for GameConfig {
    /// Classic 3x3 game between two humans.
    fn default() -> Self {
        GameConfig {
            board_width: DEFAULT_BOARD_WIDTH,
            board_height: DEFAULT_BOARD_HEIGHT,
            to_win: DEFAULT_TO_WIN,
            players: vec![
                PlayerConfig {
                    name: String::from("Player 1"),
                    symbol: Some(Symbol::Circle),
                    color: Some(Color::PALETTE[0]),
                    ..PlayerConfig::default()
                },
                PlayerConfig {
                    name: String::from("Player 2"),
                    symbol: Some(Symbol::Cross),
                    color: Some(Color::PALETTE[1]),
                    ..PlayerConfig::default()
                },
            ],
            seed: None,
            minimax_threads: 1,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<GameConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "loaded game config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.board_width > ALPHABET.len() && self.has_human_seat() {
            return Err(ConfigError::TooWideForHumans {
                width: self.board_width,
                max: ALPHABET.len(),
            });
        }
        Ok(())
    }

    /// Slots taking part in the match, with their position in `players`.
    fn seated(&self) -> impl Iterator<Item = (usize, &PlayerConfig)> {
        let any_ready = self.players.iter().any(|pc| pc.ready);
        self.players
            .iter()
            .enumerate()
            .filter(move |(_, pc)| !any_ready || pc.ready)
    }

    /// Whether anyone types moves in; an empty seating means the default humans.
    fn has_human_seat(&self) -> bool {
        let mut seated = self.seated().peekable();
        seated.peek().is_none() || seated.any(|(_, pc)| !pc.is_ai)
    }

    /// `to_win`, clamped to the smaller board dimension when it does not fit.
    pub fn effective_to_win(&self) -> usize {
        let min_dim = self.board_width.min(self.board_height);
        if self.to_win == 0 || self.to_win > min_dim {
            min_dim
        } else {
            self.to_win
        }
    }

    /// Create the game and the agents driving its computer players.
    pub fn build(&self) -> (Game, HashMap<PlayerId, Agent>) {
        let (players, agents) = self.build_players();
        let game = Game::with_config(
            self.board_width,
            self.board_height,
            self.effective_to_win(),
            players,
        );
        (game, agents)
    }

    /// Turn the slots into players. An empty result is left for `Game` to replace
    /// with its default players.
    fn build_players(&self) -> (Vec<Player>, HashMap<PlayerId, Agent>) {
        let mut players = Vec::new();
        let mut agents = HashMap::new();

        for (slot, pc) in self.seated() {
            let index = players.len();
            let name = if pc.name.is_empty() {
                format!("Player {}", slot + 1)
            } else {
                pc.name.clone()
            };
            let symbol = pc.symbol.unwrap_or_else(|| Symbol::for_slot(slot));
            let color = pc
                .color
                .unwrap_or(Color::PALETTE[index % Color::PALETTE.len()]);

            let player = if pc.is_ai {
                let kind = pc.ai_model.unwrap_or(AgentKind::Random);
                // distinct streams per seat so two seeded agents don't mirror each other
                let seed = self.seed.map(|seed| seed.wrapping_add(index as u64));
                let player = Player::ai(name, symbol, color);
                agents.insert(player.id(), kind.build(seed, self.minimax_threads));
                player
            } else {
                Player::new(name, symbol, color)
            };
            players.push(player);
        }

        (players, agents)
    }
}

#[test]
fn test_default_config_builds_classic_game() {
    let (game, agents) = GameConfig::default().build();
    assert!(agents.is_empty());
    assert_eq!(game.players().len(), 2);
    assert_eq!(game.players()[0].name, "Player 1");
    assert_eq!(game.players()[1].symbol, Symbol::Cross);
    assert_eq!(game.board().available_moves().len(), 9);
    assert_eq!(game.board().to_win(), 3);
}

#[test]
fn test_parse_toml() {
    let config: GameConfig = toml::from_str(
        r#"
board_width = 5
board_height = 4
to_win = 9
seed = 42

[[players]]
name = "Alice"
symbol = "square"
color = [1, 2, 3]
ready = true

[[players]]
is_ai = true
ai_model = "minimax"
ready = true

[[players]]
name = "Benched"
"#,
    )
    .unwrap();
    assert_eq!(config.effective_to_win(), 4);
    assert_eq!(config.minimax_threads, 1);

    let (game, agents) = config.build();
    assert_eq!(game.board().to_win(), 4);
    let names: Vec<&str> = game.players().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Player 2"]);
    assert_eq!(game.players()[0].symbol, Symbol::Square);
    assert_eq!(game.players()[0].color, Color(1, 2, 3));
    assert!(game.players()[1].is_ai);
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[&game.players()[1].id()].kind(), AgentKind::Minimax);
}

#[test]
fn test_ai_without_model_is_random() {
    let config = GameConfig {
        players: vec![PlayerConfig {
            is_ai: true,
            ..PlayerConfig::default()
        }],
        ..GameConfig::default()
    };
    let (game, agents) = config.build();
    assert_eq!(game.players().len(), 1);
    assert_eq!(agents[&game.players()[0].id()].kind(), AgentKind::Random);
}

#[test]
fn test_no_players_falls_back_to_defaults() {
    let config = GameConfig {
        players: Vec::new(),
        ..GameConfig::default()
    };
    let (game, agents) = config.build();
    assert!(agents.is_empty());
    assert_eq!(game.players().len(), 2);
}

#[test]
fn test_validate_rejects_empty_board() {
    let config = GameConfig {
        board_width: 0,
        ..GameConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidDimensions { width: 0, height: 3 })
    ));
}

#[test]
fn test_validate_rejects_wide_board_with_humans() {
    let mut config = GameConfig {
        board_width: 27,
        board_height: 1,
        ..GameConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::TooWideForHumans { width: 27, max: 26 })
    ));

    config.board_width = 26;
    assert!(config.validate().is_ok());

    // computers don't need column letters
    config.board_width = 27;
    for pc in config.players.iter_mut() {
        pc.is_ai = true;
    }
    assert!(config.validate().is_ok());

    // a benched human doesn't count, an empty seating means the default humans
    config.players.push(PlayerConfig::default());
    config.players[0].ready = true;
    assert!(config.validate().is_ok());
    config.players.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_allows_small_boards() {
    let config = GameConfig {
        board_width: 2,
        board_height: 1,
        ..GameConfig::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.effective_to_win(), 1);
}

#[test]
fn test_load_missing_file() {
    let err = GameConfig::load("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
