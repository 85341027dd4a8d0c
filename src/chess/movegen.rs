//! Pseudo-legal move generation: every move each piece could make according
//! to its movement pattern, without regard to the safety of the own king.
//!
//! Sliding pieces cast rays until they hit the edge of the board or a piece.
//! Stepping pieces try a fixed set of offsets. Pawns push forward, double
//! step from their starting rank and capture diagonally, including en passant
//! captures of a pawn that has just double stepped.
//!
//! Castling is handled separately in [`crate::chess::castling`].

use crate::chess::board::{Board, Piece, PieceId};
use crate::chess::core::{PieceKind, Player, Rank, Square};
use crate::chess::moves::{Move, MoveList};

/// Rank and file increments.
type Direction = (i8, i8);

const ORTHOGONAL: [Direction; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [Direction; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ALL_DIRECTIONS: [Direction; 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_JUMPS: [Direction; 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Shared inputs of a single generation pass.
#[derive(Clone, Copy, Debug)]
pub struct Context {
    /// Stamped on every generated move.
    pub turn: u32,
    /// Square of the opponent pawn that double stepped on the previous ply.
    pub double_step: Option<Square>,
    /// A piece that is treated as absent from the generating side, e.g. a
    /// piece captured by a speculatively applied move.
    pub omit: Option<PieceId>,
}

impl Context {
    /// Context without en passant opportunities or omitted pieces.
    #[must_use]
    pub const fn plain(turn: u32) -> Self {
        Self {
            turn,
            double_step: None,
            omit: None,
        }
    }
}

/// Generates pseudo-legal moves of all active pieces of `player`, excluding
/// castles.
#[must_use]
pub fn pseudo_legal_moves(board: &Board, player: Player, context: Context) -> MoveList {
    let mut moves = MoveList::new();
    for (id, piece) in board.active_pieces(player) {
        if context.omit == Some(id) {
            continue;
        }
        piece_moves(board, piece, context, &mut moves);
    }
    moves
}

/// Whether any of the moves captures a king. Such a move can only exist if
/// the king was left in check.
#[must_use]
pub fn captures_king(moves: &[Move]) -> bool {
    moves
        .iter()
        .any(|candidate| candidate.capture() == Some(PieceKind::King))
}

/// Whether `attacker` could capture the king of its opponent if it was its
/// turn: i.e. whether the opponent is in check.
#[must_use]
pub fn attacks_king(board: &Board, attacker: Player, omit: Option<PieceId>) -> bool {
    let context = Context {
        omit,
        ..Context::plain(0)
    };
    captures_king(&pseudo_legal_moves(board, attacker, context))
}

/// Appends pseudo-legal moves of a single piece.
pub fn piece_moves(board: &Board, piece: &Piece, context: Context, moves: &mut MoveList) {
    let Some(from) = piece.square() else {
        return;
    };
    let generator = Generator {
        board,
        piece,
        from,
        turn: context.turn,
        moves,
    };
    match piece.kind() {
        PieceKind::Rook => generator.slide(&ORTHOGONAL),
        PieceKind::Bishop => generator.slide(&DIAGONAL),
        PieceKind::Queen => generator.slide(&ALL_DIRECTIONS),
        PieceKind::King => generator.step(&ALL_DIRECTIONS),
        PieceKind::Knight => generator.step(&KNIGHT_JUMPS),
        PieceKind::Pawn => generator.pawn(context.double_step),
    }
}

struct Generator<'a> {
    board: &'a Board,
    piece: &'a Piece,
    from: Square,
    turn: u32,
    moves: &'a mut MoveList,
}

impl Generator<'_> {
    fn push(&mut self, to: Square, capture: Option<PieceKind>, en_passant: bool) {
        self.moves.push(Move::regular(
            self.turn,
            self.piece.owner(),
            self.piece.kind(),
            self.piece.has_moved(),
            self.from,
            to,
            capture,
            en_passant,
        ));
    }

    /// Moves to an empty square or captures an enemy piece. Returns whether
    /// the target square was empty.
    fn try_push(&mut self, to: Square) -> bool {
        match self.board.occupant_at(to) {
            None => {
                self.push(to, None, false);
                true
            },
            Some(occupant) => {
                if occupant.owner() != self.piece.owner() {
                    self.push(to, Some(occupant.kind()), false);
                }
                false
            },
        }
    }

    fn slide(mut self, directions: &[Direction]) {
        for &(rank_delta, file_delta) in directions {
            let mut current = self.from;
            while let Some(next) = current.offset(rank_delta, file_delta) {
                if !self.try_push(next) {
                    break;
                }
                current = next;
            }
        }
    }

    fn step(mut self, offsets: &[Direction]) {
        for &(rank_delta, file_delta) in offsets {
            if let Some(to) = self.from.offset(rank_delta, file_delta) {
                let _ = self.try_push(to);
            }
        }
    }

    fn pawn(mut self, double_step: Option<Square>) {
        let owner = self.piece.owner();
        let forward = owner.push_direction();
        if let Some(single) = self.from.offset(forward, 0) {
            if self.board.occupant_at(single).is_none() {
                self.push(single, None, false);
                if !self.piece.has_moved() {
                    if let Some(double) = single.offset(forward, 0) {
                        if self.board.occupant_at(double).is_none() {
                            self.push(double, None, false);
                        }
                    }
                }
            }
        }
        for side in [1, -1] {
            let Some(to) = self.from.offset(forward, side) else {
                continue;
            };
            if let Some(occupant) = self.board.occupant_at(to) {
                if occupant.owner() != owner {
                    self.push(to, Some(occupant.kind()), false);
                }
            }
        }
        if self.from.rank() != Rank::en_passant_origin(owner) {
            return;
        }
        for side in [1, -1] {
            let Some(passed) = self.from.offset(0, side) else {
                continue;
            };
            if double_step != Some(passed) {
                continue;
            }
            let is_enemy_pawn = self.board.occupant_at(passed).is_some_and(|occupant| {
                occupant.owner() != owner && occupant.kind() == PieceKind::Pawn
            });
            if !is_enemy_pawn {
                continue;
            }
            if let Some(to) = self.from.offset(forward, side) {
                if self.board.occupant_at(to).is_none() {
                    self.push(to, Some(PieceKind::Pawn), true);
                }
            }
        }
    }
}
