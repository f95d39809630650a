/// Line-based match loop: humans type moves, agents pick theirs, rounds repeat.
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{info, warn};

use crate::agents::{Agent, BoardGameAgent};
use crate::board_game::{Move, PlayerId, ALPHABET};
use crate::game::Game;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("bad input, enter a column letter and a row number like \"a0\"")]
    BadInput,
    #[error("column {0:?} is not a letter from a to z")]
    BadColumn(char),
    #[error("row {0:?} is not a number")]
    BadRow(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("input closed while waiting for {0} to move")]
    InputClosed(String),
    #[error("agent for {name} chose {move_}, which the board rejected")]
    IllegalAgentMove { name: String, move_: Move },
}

/// Parse a human move: a column letter followed by a row number, e.g. "b2" is
/// column 1, row 2.
pub fn parse_move(input: &str) -> Result<Move, InputError> {
    let input = input.trim();
    let mut chars = input.chars();
    let col_char = chars.next().ok_or(InputError::BadInput)?;
    let col = ALPHABET
        .find(col_char.to_ascii_lowercase())
        .ok_or(InputError::BadColumn(col_char))?;

    let row_text = chars.as_str().trim();
    if row_text.is_empty() {
        return Err(InputError::BadInput);
    }
    let row = row_text
        .parse::<i32>()
        .map_err(|_| InputError::BadRow(row_text.to_string()))?;

    Ok(Move::new(col as i32, row))
}

/// A match in progress. Players with an entry in `agents` are played by the
/// computer, everyone else reads moves from `input`.
pub struct Session<R, W> {
    game: Game,
    agents: HashMap<PlayerId, Agent>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(game: Game, agents: HashMap<PlayerId, Agent>, input: R, output: W) -> Self {
        Session {
            game,
            agents,
            input,
            output,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_game(self) -> Game {
        self.game
    }

    /// Play `rounds` rounds, clearing the board in between but keeping the score,
    /// then print the final standings.
    pub fn play_match(&mut self, rounds: usize) -> Result<(), SessionError> {
        for round in 1..=rounds {
            if round > 1 {
                self.game.reset();
            }
            writeln!(self.output, "--- Round {} of {} ---", round, rounds)?;
            self.play_round()?;
        }
        self.print_scores()?;
        Ok(())
    }

    /// Play until the current round ends. Returns the winner, None for a draw.
    pub fn play_round(&mut self) -> Result<Option<PlayerId>, SessionError> {
        while self.game.is_playing() {
            let text = self.game.board().render(self.game.players());
            write!(self.output, "{}", text)?;

            let current = self.game.current();
            let name = self
                .game
                .current_player()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| current.to_string());

            match self.agents.get_mut(&current) {
                Some(agent) => {
                    let move_ = agent.next_move(self.game.board(), current, self.game.players());
                    if move_.is_none() || !self.game.play_move(move_.x, move_.y) {
                        warn!(player = %name, %move_, "agent move rejected");
                        return Err(SessionError::IllegalAgentMove { name, move_ });
                    }
                    writeln!(self.output, "{} plays {}", name, move_)?;
                }
                None => self.human_turn(&name)?,
            }
        }

        let text = self.game.board().render(self.game.players());
        write!(self.output, "{}", text)?;
        match self.game.winner_player() {
            Some(winner) => writeln!(self.output, "{} wins!", winner.name)?,
            None => writeln!(self.output, "It's a draw!")?,
        }
        info!(winner = ?self.game.winner_player().map(|p| &p.name), "round over");
        Ok(self.game.winner())
    }

    /// Keep prompting until the human enters a move the board accepts, or asks
    /// for a reset: empty board, zero scores, first player to move.
    fn human_turn(&mut self, name: &str) -> Result<(), SessionError> {
        loop {
            writeln!(
                self.output,
                "{}, enter a move (like \"a0\") or \"reset\":",
                name
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(SessionError::InputClosed(name.to_string()));
            }
            if line.trim().eq_ignore_ascii_case("reset") {
                self.game.reset();
                self.game.reset_points();
                writeln!(self.output, "Board and scores cleared")?;
                return Ok(());
            }
            match parse_move(&line) {
                Ok(move_) => {
                    if self.game.play_move(move_.x, move_.y) {
                        return Ok(());
                    }
                    writeln!(self.output, "Oops, {} is taken or off the board", move_)?;
                }
                Err(err) => writeln!(self.output, "Oops, {}", err)?,
            }
        }
    }

    fn print_scores(&mut self) -> io::Result<()> {
        writeln!(self.output, "Final score:")?;
        for player in self.game.players() {
            writeln!(
                self.output,
                "  {} ({}): {}",
                player.name,
                player.symbol.glyph(),
                player.points
            )?;
        }
        Ok(())
    }
}

#[test]
fn test_parse_move() {
    assert_eq!(parse_move("a0\n").unwrap(), Move::new(0, 0));
    assert_eq!(parse_move("C2").unwrap(), Move::new(2, 2));
    assert_eq!(parse_move(" b12 ").unwrap(), Move::new(1, 12));
    assert!(matches!(parse_move(""), Err(InputError::BadInput)));
    assert!(matches!(parse_move("b"), Err(InputError::BadInput)));
    assert!(matches!(parse_move("1a"), Err(InputError::BadColumn('1'))));
    assert!(matches!(parse_move("bx"), Err(InputError::BadRow(_))));
}

#[test]
fn test_human_round_with_bad_input() {
    let input = "zz\na0\na0\nb0\na1\nb1\na2\n";
    let mut output = Vec::new();
    let mut session = Session::new(Game::new(), HashMap::new(), input.as_bytes(), &mut output);
    let winner = session.play_round().unwrap();
    let game = session.into_game();
    assert_eq!(winner, Some(game.players()[0].id()));
    assert_eq!(game.players()[0].points, 1);

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Oops, row \"z\" is not a number"));
    assert!(text.contains("Oops, a0 is taken or off the board"));
    assert!(text.contains("Player 1 wins!"));
}

#[test]
fn test_reset_command_clears_board_and_scores() {
    // round 1 is won by the first player, round 2 is reset halfway and won again
    let input = "a0\nb0\na1\nb1\na2\na0\nb0\nreset\na0\nb0\na1\nb1\na2\n";
    let mut output = Vec::new();
    let mut session = Session::new(Game::new(), HashMap::new(), input.as_bytes(), &mut output);
    session.play_match(2).unwrap();
    let game = session.into_game();
    assert_eq!(game.players()[0].points, 1);
    assert_eq!(game.players()[1].points, 0);

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("Board and scores cleared").count(), 1);
    assert_eq!(text.matches("Player 1 wins!").count(), 2);
}

#[test]
fn test_input_closed() {
    let mut output = Vec::new();
    let mut session = Session::new(Game::new(), HashMap::new(), "a0\n".as_bytes(), &mut output);
    assert!(matches!(
        session.play_round(),
        Err(SessionError::InputClosed(_))
    ));
}
