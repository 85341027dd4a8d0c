//! Castling eligibility: the king and the castling rook have never moved, the
//! squares between them are empty and the king is not currently in check.
//!
//! Whether the king passes through or lands on an attacked square is not
//! checked, and castles bypass the legality filter.

use tracing::trace;

use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Square};
use crate::chess::legality;
use crate::chess::moves::{CastleSide, Move, MoveList};

/// Castles available to `player`, king side first. Each castle is marked if
/// it gives check.
#[must_use]
pub fn castle_moves(board: &mut Board, player: Player, turn: u32, in_check: bool) -> MoveList {
    if in_check {
        return MoveList::new();
    }
    let mut moves = MoveList::new();
    for side in [CastleSide::King, CastleSide::Queen] {
        if !can_castle(board, player, side) {
            continue;
        }
        let mut castle = Move::castle(turn, player, side);
        let verdict = legality::inspect(board, &castle);
        castle.set_check(verdict.check);
        trace!(notation = castle.notation(), "castle is available");
        moves.push(castle);
    }
    moves
}

/// Checks piece placement and history for castling towards `side`. Does not
/// look at check.
#[must_use]
pub fn can_castle(board: &Board, player: Player, side: CastleSide) -> bool {
    let unmoved = |square: Square, kind: PieceKind| {
        board.occupant_at(square).is_some_and(|piece| {
            piece.owner() == player && piece.kind() == kind && !piece.has_moved()
        })
    };
    unmoved(CastleSide::king_origin(player), PieceKind::King)
        && unmoved(side.rook_origin(player), PieceKind::Rook)
        && side
            .path(player)
            .all(|square| board.occupant_at(square).is_none())
}
