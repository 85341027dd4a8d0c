//! Replays a pre-recorded sequence of moves against a [`Game`], one move per
//! step, halting at the first move that can not be applied.
//!
//! Pacing is up to the caller: stepping is synchronous and the replay holds no
//! timers.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::chess::game::{CommittedMove, Game, MoveError, MoveSelector};
use crate::chess::notation;

/// Queue of movetext tokens waiting to be applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Replay {
    tokens: VecDeque<String>,
    halted: bool,
}

impl Replay {
    /// Creates a replay of the given tokens, one move each.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            halted: false,
        }
    }

    /// Splits whitespace-separated movetext into tokens. An en passant suffix
    /// stays with its move ("exd6 e.p."). Move numbers are not stripped:
    /// "1.e4" is rejected as malformed.
    ///
    /// ```
    /// use rookery::chess::game::Game;
    /// use rookery::chess::replay::Replay;
    ///
    /// let mut game = Game::new();
    /// let mut replay = Replay::from_movetext("e4 e5 Nf3");
    /// let applied = replay.run(&mut game).unwrap();
    /// assert_eq!(applied.len(), 3);
    /// assert_eq!(game.history_text(), "1.e4 e5 2.Nf3");
    /// ```
    #[must_use]
    pub fn from_movetext(movetext: &str) -> Self {
        let suffix = notation::EN_PASSANT_SUFFIX.trim_start();
        let mut tokens: Vec<String> = Vec::new();
        for token in movetext.split_whitespace() {
            match tokens.last_mut() {
                Some(last) if token == suffix && !last.ends_with(suffix) => {
                    last.push_str(notation::EN_PASSANT_SUFFIX);
                },
                _ => tokens.push(token.to_owned()),
            }
        }
        Self::new(tokens)
    }

    /// Number of tokens not applied yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }

    /// The next token to be applied.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    /// Whether no further step will apply a move.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.halted || self.tokens.is_empty()
    }

    /// Applies the next token to `game`. Tokens are notation ("Nf3") or
    /// start and end squares ("g1f3").
    ///
    /// Returns [`None`] once the tokens are exhausted or after a failed step.
    /// A failed step halts the replay and consumes the offending token.
    pub fn step(&mut self, game: &mut Game) -> Option<Result<CommittedMove, MoveError>> {
        if self.halted {
            return None;
        }
        let token = self.tokens.pop_front()?;
        if !notation::is_well_formed(&token) {
            warn!(%token, "replay halted on a malformed token");
            self.halted = true;
            return Some(Err(MoveError::MalformedInputStream(token)));
        }
        let result = game.apply_move(MoveSelector::from(token.as_str()));
        match &result {
            Ok(committed) => debug!(notation = %committed, remaining = self.tokens.len(), "replayed"),
            Err(error) => {
                warn!(%error, "replay halted");
                self.halted = true;
            },
        }
        Some(result)
    }

    /// Steps until the tokens are exhausted.
    ///
    /// # Errors
    ///
    /// The first failed step. Moves applied before it stay applied.
    pub fn run(&mut self, game: &mut Game) -> Result<Vec<CommittedMove>, MoveError> {
        let mut applied = Vec::with_capacity(self.remaining());
        while let Some(result) = self.step(game) {
            applied.push(result?);
        }
        Ok(applied)
    }
}
