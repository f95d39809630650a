use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mnk::{AgentKind, GameConfig, PlayerConfig, Session};

/// Who sits in a player slot.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Seat {
    Human,
    Random,
    Minimax,
}

impl Seat {
    fn apply(self, slot: &mut PlayerConfig) {
        match self {
            Seat::Human => {
                slot.is_ai = false;
                slot.ai_model = None;
            }
            Seat::Random => {
                slot.is_ai = true;
                slot.ai_model = Some(AgentKind::Random);
            }
            Seat::Minimax => {
                slot.is_ai = true;
                slot.ai_model = Some(AgentKind::Minimax);
            }
        }
    }
}

/// Play N-in-a-row tic-tac-toe in the terminal.
#[derive(Parser, Debug)]
#[command(name = "mnk", version)]
struct Cli {
    /// TOML match config; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of columns
    #[arg(long)]
    width: Option<usize>,

    /// Number of rows
    #[arg(long)]
    height: Option<usize>,

    /// Marks in a row needed to win
    #[arg(long)]
    to_win: Option<usize>,

    /// Who plays first
    #[arg(long, value_enum)]
    p1: Option<Seat>,

    /// Who plays second
    #[arg(long, value_enum)]
    p2: Option<Seat>,

    /// Rounds to play; scores carry over between rounds
    #[arg(long, default_value = "1")]
    rounds: usize,

    /// Seed for the random agents
    #[arg(long)]
    seed: Option<u64>,

    /// Minimax worker threads (0 = one per CPU)
    #[arg(long)]
    threads: Option<usize>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading match config from {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.board_width = width;
        }
        if let Some(height) = self.height {
            config.board_height = height;
        }
        if let Some(to_win) = self.to_win {
            config.to_win = to_win;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(threads) = self.threads {
            config.minimax_threads = threads;
        }
        for (slot, seat) in [self.p1, self.p2].into_iter().enumerate() {
            if let Some(seat) = seat {
                while config.players.len() <= slot {
                    config.players.push(PlayerConfig::default());
                }
                seat.apply(&mut config.players[slot]);
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.game_config()?;
    info!(
        width = config.board_width,
        height = config.board_height,
        to_win = config.effective_to_win(),
        rounds = cli.rounds,
        "starting match"
    );

    let (game, agents) = config.build();
    let stdin = io::stdin();
    let mut session = Session::new(game, agents, stdin.lock(), io::stdout());
    session.play_match(cli.rounds)?;

    Ok(())
}
