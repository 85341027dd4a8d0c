//! Game controller: owns the board and the move history, regenerates legal
//! moves at the start of each ply and validates externally supplied moves.
//!
//! A ply goes through the phases of [`Phase`]: generation, legality
//! filtering, adding castles, evaluating check and waiting for input. Once a
//! move is accepted it is applied, recorded and the next ply begins. A side
//! without legal moves is checkmated.

use std::fmt;

use anyhow::{bail, Context};
use tracing::{debug, info, trace};

use crate::chess::board::Board;
use crate::chess::castling;
use crate::chess::core::{PieceKind, Player, Rank, Square};
use crate::chess::legality;
use crate::chess::movegen::{self, Context as GenerationContext};
use crate::chess::moves::{CastleSide, Move, MoveKind, MoveList};
use crate::chess::notation::{self, CHECKMATE_SUFFIX, CHECK_SUFFIX};

/// Reasons a move is not applied.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum MoveError {
    /// The input does not match any legal move.
    #[error("{0} is an invalid move")]
    InvalidMoveNotation(String),
    /// The game is over, no more moves are accepted.
    #[error("the game has ended in checkmate")]
    CheckmateReached,
    /// A replayed token can not be a move at all.
    #[error("malformed movetext token: '{0}'")]
    MalformedInputStream(String),
}

/// Stage of the current ply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing computed for the active player yet.
    AwaitingGeneration,
    /// Pseudo-legal candidates are generated.
    Generated,
    /// Candidates leaving the own king in check are dropped.
    Filtered,
    /// Castles are added to the candidates.
    CastlesApplied,
    /// Check status is known and published.
    CheckEvaluated,
    /// Waiting for a move from the outside.
    AwaitingInput,
    /// A selected move is being applied to the board.
    MoveApplying,
    /// The applied move is in the history.
    HistoryRecorded,
    /// The active player has no legal moves. Terminal.
    Checkmate,
}

/// How the outside world picks one of the legal moves.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(variant_size_differences)]
pub enum MoveSelector {
    /// Start and end square of the moving piece. Castles are selected by the
    /// king's start square and either its destination or the rook's square.
    Squares {
        #[allow(missing_docs)]
        from: Square,
        #[allow(missing_docs)]
        to: Square,
    },
    /// Algebraic notation, matched after normalization.
    Notation(String),
}

impl From<&str> for MoveSelector {
    /// "e2e4" and "e2 e4" select squares, anything else is notation.
    fn from(input: &str) -> Self {
        let input = input.trim();
        let parts: Vec<&str> = input.split_whitespace().collect();
        let squares = match parts.as_slice() {
            [coordinates] if coordinates.len() == 4 && coordinates.is_ascii() => {
                Some((&coordinates[..2], &coordinates[2..]))
            },
            [from, to] => Some((*from, *to)),
            _ => None,
        };
        if let Some((from, to)) = squares {
            if let (Ok(from), Ok(to)) = (Square::try_from(from), Square::try_from(to)) {
                return Self::Squares { from, to };
            }
        }
        Self::Notation(input.to_owned())
    }
}

impl fmt::Display for MoveSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Squares { from, to } => write!(f, "{from}{to}"),
            Self::Notation(notation) => f.write_str(notation),
        }
    }
}

/// Summary of an accepted move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommittedMove {
    /// Turn number of the move.
    pub turn: u32,
    /// Who made the move.
    pub player: Player,
    /// Notation as recorded in the history, including "+" or "#".
    pub notation: String,
    /// The opponent is in check.
    pub check: bool,
    /// The opponent has no legal moves.
    pub checkmate: bool,
}

impl fmt::Display for CommittedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}

/// Status of the game from the point of view of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// The player to move.
    pub active: Player,
    /// The active player is in check.
    pub check: bool,
    /// The active player has no legal moves.
    pub checkmate: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.checkmate {
            write!(f, "checkmate, {} wins", !self.active)
        } else if self.check {
            write!(f, "{} to move, in check", self.active)
        } else {
            write!(f, "{} to move", self.active)
        }
    }
}

/// A game in progress. Moves are validated against the legal moves of the
/// active player; a rejected move leaves the game untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    board: Board,
    active: Player,
    // Incremented by one after every ply.
    turn: u32,
    check: bool,
    checkmate: bool,
    history: Vec<String>,
    // Square of the pawn that double stepped on the last ply.
    double_step: Option<Square>,
    moves: MoveList,
    phase: Phase,
}

impl Game {
    /// Starts a game from the standard initial position.
    #[must_use]
    pub fn new() -> Self {
        Self::setup(Board::starting(), Player::White, 1, None)
    }

    /// Starts a game from a position in [Forsyth-Edwards Notation]. Halfmove
    /// clock and fullmove counter can be omitted (EPD).
    ///
    /// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split_ascii_whitespace();
        let mut board = match parts.next() {
            Some(placement) => Board::from_placement(placement)?,
            None => bail!("incorrect FEN: missing pieces placement"),
        };
        for player in [Player::White, Player::Black] {
            let kings = board
                .active_pieces(player)
                .filter(|(_, piece)| piece.kind() == PieceKind::King)
                .count();
            if kings != 1 {
                bail!("incorrect FEN: expected exactly one {player} king, got {kings}");
            }
        }
        let active: Player = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        match parts.next() {
            Some(value) => apply_castling_rights(&mut board, value)?,
            None => bail!("incorrect FEN: missing castling rights"),
        }
        let double_step = match parts.next() {
            Some("-") => None,
            Some(value) => Some(
                double_step_from_en_passant(&board, active, value)
                    .with_context(|| format!("incorrect FEN: en passant square {value}"))?,
            ),
            None => bail!("incorrect FEN: missing en passant square"),
        };
        let fullmove = match (parts.next(), parts.next()) {
            (None, None) => 1,
            (Some(halfmove), Some(fullmove)) => {
                let _: u32 = halfmove
                    .parse()
                    .with_context(|| format!("incorrect FEN: halfmove clock {halfmove}"))?;
                let fullmove: u32 = fullmove
                    .parse()
                    .with_context(|| format!("incorrect FEN: fullmove counter {fullmove}"))?;
                if fullmove == 0 {
                    bail!("incorrect FEN: fullmove counter starts at 1");
                }
                fullmove
            },
            (Some(_), None) => bail!("incorrect FEN: missing fullmove counter"),
            (None, Some(_)) => unreachable!("iterator is exhausted"),
        };
        if parts.next().is_some() {
            bail!("incorrect FEN: trailing symbols in {input}");
        }
        // Pawns never return to their first rank. The last rank is reachable
        // since pawns are not promoted.
        if let Some(square) = board
            .pieces()
            .filter(|piece| piece.kind() == PieceKind::Pawn)
            .filter_map(|piece| piece.square().map(|square| (piece.owner(), square)))
            .find_map(|(owner, square)| {
                (square.rank() == Rank::backrank(owner)).then_some(square)
            })
        {
            bail!("incorrect FEN: pawn on its first rank at {square}");
        }
        if legality::in_check(&board, !active) {
            bail!("incorrect FEN: {} king is attacked while {active} is to move", !active);
        }
        let Some(turn) = (fullmove - 1)
            .checked_mul(2)
            .and_then(|turn| turn.checked_add(1 + u32::from(active == Player::Black)))
        else {
            bail!("incorrect FEN: fullmove counter {fullmove} is too large");
        };
        Ok(Self::setup(board, active, turn, double_step))
    }

    fn setup(board: Board, active: Player, turn: u32, double_step: Option<Square>) -> Self {
        let check = legality::in_check(&board, active);
        let mut game = Self {
            board,
            active,
            turn,
            check,
            checkmate: false,
            history: Vec::new(),
            double_step,
            moves: MoveList::new(),
            phase: Phase::AwaitingGeneration,
        };
        game.begin_ply();
        game
    }

    fn enter(&mut self, phase: Phase) {
        trace!(from = ?self.phase, to = ?phase, turn = self.turn, "phase transition");
        self.phase = phase;
    }

    /// Computes legal moves of the active player and detects checkmate.
    fn begin_ply(&mut self) {
        self.enter(Phase::AwaitingGeneration);
        let candidates = movegen::pseudo_legal_moves(
            &self.board,
            self.active,
            GenerationContext {
                double_step: self.double_step,
                ..GenerationContext::plain(self.turn)
            },
        );
        self.enter(Phase::Generated);
        let mut moves = legality::filter_legal(&mut self.board, candidates);
        self.enter(Phase::Filtered);
        moves.extend(castling::castle_moves(
            &mut self.board,
            self.active,
            self.turn,
            self.check,
        ));
        self.enter(Phase::CastlesApplied);
        notation::disambiguate(&mut moves);
        self.moves = moves;
        if self.moves.is_empty() {
            self.checkmate = true;
            if let Some(last) = self.history.last_mut() {
                if last.ends_with(CHECK_SUFFIX) {
                    let _ = last.pop();
                }
                last.push(CHECKMATE_SUFFIX);
            }
            info!(winner = %!self.active, turn = self.turn, "checkmate");
            self.enter(Phase::Checkmate);
            return;
        }
        self.enter(Phase::CheckEvaluated);
        debug!(status = %self.status(), moves = self.moves.len(), "ply started");
        self.enter(Phase::AwaitingInput);
    }

    /// Validates and applies a move of the active player.
    ///
    /// # Errors
    ///
    /// [`MoveError::CheckmateReached`] if the game is over and
    /// [`MoveError::InvalidMoveNotation`] if the selector does not match a
    /// legal move. The game is not modified in either case.
    pub fn apply_move(
        &mut self,
        selector: impl Into<MoveSelector>,
    ) -> Result<CommittedMove, MoveError> {
        if self.checkmate {
            return Err(MoveError::CheckmateReached);
        }
        let selector = selector.into();
        let Some(selected) = self.find(&selector) else {
            debug!(%selector, "rejected move");
            return Err(MoveError::InvalidMoveNotation(selector.to_string()));
        };
        let selected = selected.clone();
        let Some(_) = legality::make(&mut self.board, &selected) else {
            return Err(MoveError::InvalidMoveNotation(selector.to_string()));
        };
        self.enter(Phase::MoveApplying);
        let check = legality::in_check(&self.board, !self.active);
        debug_assert_eq!(check, selected.gives_check());
        self.history.push(selected.notation().to_owned());
        self.double_step = selected.double_step();
        self.enter(Phase::HistoryRecorded);
        debug!(notation = selected.notation(), turn = self.turn, player = %self.active, "move applied");

        self.active = !self.active;
        self.turn = self.turn.saturating_add(1);
        self.check = check;
        self.begin_ply();

        Ok(CommittedMove {
            turn: selected.turn(),
            player: selected.player(),
            notation: self.history.last().cloned().unwrap_or_default(),
            check,
            checkmate: self.checkmate,
        })
    }

    fn find(&self, selector: &MoveSelector) -> Option<&Move> {
        match selector {
            MoveSelector::Notation(input) => {
                let input = notation::normalize(input);
                if input.is_empty() {
                    return None;
                }
                self.moves
                    .iter()
                    .find(|candidate| notation::normalize(candidate.notation()) == input)
            },
            MoveSelector::Squares { from, to } => {
                self.moves.iter().find(|candidate| match candidate.kind() {
                    MoveKind::Regular {
                        from: start,
                        to: end,
                        ..
                    } => start == from && end == to,
                    MoveKind::Castle(side) => {
                        *from == CastleSide::king_origin(self.active)
                            && (*to == side.king_destination(self.active)
                                || *to == side.rook_origin(self.active))
                    },
                })
            },
        }
    }

    /// Legal moves of the active player. Empty after checkmate.
    #[must_use]
    pub fn legal_moves(&self) -> &[Move] {
        &self.moves
    }

    /// Notation of every applied move, in order.
    #[must_use]
    pub fn move_history(&self) -> &[String] {
        &self.history
    }

    /// Move history as numbered pairs: "1.e4 e5 2.Nf3".
    #[must_use]
    pub fn history_text(&self) -> String {
        notation::format_history(&self.history)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn status(&self) -> Status {
        Status {
            active: self.active,
            check: self.check,
            checkmate: self.checkmate,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    #[must_use]
    pub const fn active_player(&self) -> Player {
        self.active
    }

    /// Current turn number, starting at 1 and incremented after every ply.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Whether the active player is in check.
    #[must_use]
    pub const fn is_check(&self) -> bool {
        self.check
    }

    /// Whether the active player has no legal moves. This includes
    /// stalemate.
    #[must_use]
    pub const fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Square a pawn can be captured on en passant, if any.
    #[must_use]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.double_step
            .and_then(|square| square.offset(self.active.push_direction(), 0))
    }

    /// Current position in Forsyth-Edwards Notation. The halfmove clock is
    /// not tracked and always 0.
    #[must_use]
    pub fn fen(&self) -> String {
        let side = match self.active {
            Player::White => 'w',
            Player::Black => 'b',
        };
        let mut castling = String::new();
        for (player, side, symbol) in [
            (Player::White, CastleSide::King, 'K'),
            (Player::White, CastleSide::Queen, 'Q'),
            (Player::Black, CastleSide::King, 'k'),
            (Player::Black, CastleSide::Queen, 'q'),
        ] {
            if has_castling_right(&self.board, player, side) {
                castling.push(symbol);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let en_passant = self
            .en_passant_square()
            .map_or_else(|| "-".to_owned(), |square| square.to_string());
        let fullmove = self.turn / 2 + self.turn % 2;
        format!("{} {side} {castling} {en_passant} 0 {fullmove}", self.board)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn unmoved_at(board: &Board, square: Square, player: Player, kind: PieceKind) -> bool {
    board.occupant_at(square).is_some_and(|piece| {
        piece.owner() == player && piece.kind() == kind && !piece.has_moved()
    })
}

fn has_castling_right(board: &Board, player: Player, side: CastleSide) -> bool {
    unmoved_at(
        board,
        CastleSide::king_origin(player),
        player,
        PieceKind::King,
    ) && unmoved_at(board, side.rook_origin(player), player, PieceKind::Rook)
}

/// Marks kings and rooks as moved unless the castling rights say otherwise.
fn apply_castling_rights(board: &mut Board, rights: &str) -> anyhow::Result<()> {
    if rights != "-"
        && (rights.is_empty() || !rights.chars().all(|c| matches!(c, 'K' | 'Q' | 'k' | 'q')))
    {
        bail!("incorrect FEN: unknown castling rights {rights}");
    }
    for (player, letters) in [(Player::White, ['K', 'Q']), (Player::Black, ['k', 'q'])] {
        let mut any_right = false;
        for (side, letter) in [CastleSide::King, CastleSide::Queen].into_iter().zip(letters) {
            let allowed = rights.contains(letter);
            let rook_square = side.rook_origin(player);
            if allowed && !unmoved_at(board, rook_square, player, PieceKind::Rook) {
                bail!("incorrect FEN: castling right {letter} without a rook on {rook_square}");
            }
            if !allowed {
                if let Some(rook) = board.occupant_id(rook_square) {
                    board.set_has_moved(rook, true);
                }
            }
            any_right |= allowed;
        }
        let king_square = CastleSide::king_origin(player);
        if any_right && !unmoved_at(board, king_square, player, PieceKind::King) {
            bail!("incorrect FEN: {player} can not castle without a king on {king_square}");
        }
        if !any_right {
            if let Some(king) = board.occupant_id(king_square) {
                board.set_has_moved(king, true);
            }
        }
    }
    Ok(())
}

/// Finds the pawn that has just passed over the en passant square.
fn double_step_from_en_passant(board: &Board, active: Player, value: &str) -> anyhow::Result<Square> {
    let square = Square::try_from(value)?;
    let expected_rank = match active {
        Player::White => Rank::Six,
        Player::Black => Rank::Three,
    };
    if square.rank() != expected_rank {
        bail!("en passant square should be on rank {expected_rank}");
    }
    let pawn = match square.offset((!active).push_direction(), 0) {
        Some(pawn) => pawn,
        None => bail!("no square for the passed pawn"),
    };
    match board.occupant_at(pawn) {
        Some(piece) if piece.owner() == !active && piece.kind() == PieceKind::Pawn => Ok(pawn),
        _ => bail!("no {} pawn on {pawn}", !active),
    }
}
