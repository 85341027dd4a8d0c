//! The engine connects a [`Game`] to a line-based text protocol: it reads
//! commands and moves from the input stream and reports results to the output
//! stream.
//!
//! [`Engine::run`] is the "main loop" of the engine. Supported commands:
//!
//! - `new`: start a new game from the initial position.
//! - `position [startpos | fen <FEN>] [moves <move>...]`: set up a position.
//! - `moves`: list legal moves of the side to move.
//! - `board` or `d`: print the board and its FEN.
//! - `history`: print the move history.
//! - `status`: print whose turn it is, check and checkmate.
//! - `replay <move>...`: apply a sequence of moves, stopping at the first
//!   failure.
//! - `quit`: stop the loop.
//!
//! Every other line is a move: algebraic notation ("Nf3", "O-O") or start and
//! end squares ("g1f3", "g1 f3").

use std::io::{BufRead, Write};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::chess::game::{CommittedMove, Game, MoveError, MoveSelector};
use crate::chess::moves::Move;
use crate::chess::replay::Replay;
use crate::engine::command::Command;

mod command;

/// The Engine handles commands sent through the input stream and owns the
/// game they act upon.
pub struct Engine<R: BufRead, W: Write> {
    game: Game,
    // Reason the last move was rejected. Cleared by the next accepted move.
    invalid_move: Option<String>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Engine<R, W> {
    /// Creates a new instance of the engine with starting position and provided
    /// I/O.
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self::with_game(Game::new(), input, output)
    }

    /// Creates an engine continuing an existing game.
    #[must_use]
    pub const fn with_game(game: Game, input: R, output: W) -> Self {
        Self {
            game,
            invalid_move: None,
            input,
            output,
        }
    }

    /// The game in progress.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Continuously reads the input stream and executes commands until "quit"
    /// is sent or the input is exhausted.
    ///
    /// Invalid moves and positions are reported to the output and do not stop
    /// the loop.
    ///
    /// # Errors
    ///
    /// Reading the input or writing the output fails.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            match Command::parse(&line) {
                Command::NewGame => self.handle_new_game()?,
                Command::SetPosition { fen, moves } => self.handle_position(fen, moves)?,
                Command::Moves => self.handle_moves()?,
                Command::Board => self.handle_board()?,
                Command::History => writeln!(self.output, "{}", self.game.history_text())?,
                Command::Status => self.handle_status()?,
                Command::Replay { tokens } => {
                    self.handle_replay(Replay::from_movetext(&tokens.join(" ")))?;
                },
                Command::Help => self.handle_help()?,
                Command::Quit => break,
                Command::Move(input) => self.handle_move(&input)?,
                Command::Empty => {},
            }
            self.output.flush()?;
        }
        Ok(())
    }

    fn handle_new_game(&mut self) -> anyhow::Result<()> {
        self.game = Game::new();
        self.invalid_move = None;
        writeln!(self.output, "{}", self.game.status())?;
        Ok(())
    }

    /// Changes the game to the one specified in the command and plays the
    /// listed moves.
    fn handle_position(&mut self, fen: Option<String>, moves: Vec<String>) -> anyhow::Result<()> {
        let game = match fen {
            None => Game::new(),
            Some(fen) => match Game::from_fen(&fen) {
                Ok(game) => game,
                Err(error) => {
                    warn!("rejected position {fen}: {error:#}");
                    writeln!(self.output, "error: {error:#}")?;
                    return Ok(());
                },
            },
        };
        self.game = game;
        self.invalid_move = None;
        if moves.is_empty() {
            writeln!(self.output, "{}", self.game.status())?;
            return Ok(());
        }
        self.handle_replay(Replay::from_movetext(&moves.join(" ")))
    }

    fn handle_moves(&mut self) -> anyhow::Result<()> {
        let moves = self.game.legal_moves().iter().map(Move::notation).join(" ");
        writeln!(self.output, "{moves}")?;
        Ok(())
    }

    fn handle_board(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{:?}", self.game.board())?;
        writeln!(self.output, "{}", self.game.fen())?;
        Ok(())
    }

    fn handle_status(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{}", self.game.status())?;
        if let Some(reason) = &self.invalid_move {
            writeln!(self.output, "last invalid move: {reason}")?;
        }
        Ok(())
    }

    fn handle_move(&mut self, input: &str) -> anyhow::Result<()> {
        let result = self.game.apply_move(MoveSelector::from(input));
        self.report(result)
    }

    fn handle_replay(&mut self, mut replay: Replay) -> anyhow::Result<()> {
        debug!(tokens = replay.remaining(), "replaying moves");
        while let Some(result) = replay.step(&mut self.game) {
            self.report(result)?;
        }
        Ok(())
    }

    fn report(&mut self, result: Result<CommittedMove, MoveError>) -> anyhow::Result<()> {
        match result {
            Ok(committed) => {
                self.invalid_move = None;
                writeln!(
                    self.output,
                    "{} {}: {committed}",
                    committed.turn, committed.player
                )?;
                if committed.checkmate {
                    writeln!(self.output, "{}", self.game.status())?;
                }
            },
            Err(error) => {
                self.invalid_move = Some(error.to_string());
                writeln!(self.output, "error: {error}")?;
            },
        }
        Ok(())
    }

    fn handle_help(&mut self) -> anyhow::Result<()> {
        writeln!(
            self.output,
            "commands: new, position [startpos | fen <FEN>] [moves ...], moves, board, history, \
             status, replay <moves>, quit; anything else is a move (\"Nf3\", \"g1f3\")"
        )?;
        Ok(())
    }
}
