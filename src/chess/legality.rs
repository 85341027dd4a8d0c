//! Legality filtering by speculation: each candidate is applied to the board,
//! the opponent's replies are generated, and the candidate is dropped if any
//! reply captures the mover's king. The board is always restored afterwards.

use tracing::trace;

use crate::chess::board::{Board, PieceId};
use crate::chess::core::{Player, Square};
use crate::chess::movegen::{self, Context};
use crate::chess::moves::{Move, MoveKind, MoveList};

/// Everything needed to take a move back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undo {
    moved: PieceId,
    from: Square,
    had_moved: bool,
    captured: Option<PieceId>,
    rook: Option<(PieceId, Square, bool)>,
}

impl Undo {
    /// The piece taken off the board by the move, if any.
    #[must_use]
    pub const fn captured(&self) -> Option<PieceId> {
        self.captured
    }
}

/// Applies a move to the board.
///
/// Returns [`None`] and leaves the board untouched if the move does not fit
/// the board: its pieces are not where the move expects them.
#[must_use]
pub fn make(board: &mut Board, mv: &Move) -> Option<Undo> {
    match *mv.kind() {
        MoveKind::Regular {
            from,
            to,
            en_passant,
            ..
        } => {
            let moved = board.occupant_id(from)?;
            let captured_square = if en_passant {
                Square::new(to.file(), from.rank())
            } else {
                to
            };
            let captured = board.occupant_id(captured_square);
            if captured.is_some() != mv.capture().is_some() {
                return None;
            }
            let had_moved = board.piece(moved).has_moved();
            if let Some(captured) = captured {
                board.capture(captured);
            }
            board.relocate(moved, to);
            board.set_has_moved(moved, true);
            Some(Undo {
                moved,
                from,
                had_moved,
                captured,
                rook: None,
            })
        },
        MoveKind::Castle(side) => {
            let player = mv.player();
            let king_from = mv.from();
            let rook_from = side.rook_origin(player);
            let king = board.occupant_id(king_from)?;
            let rook = board.occupant_id(rook_from)?;
            let king_had_moved = board.piece(king).has_moved();
            let rook_had_moved = board.piece(rook).has_moved();
            board.relocate(king, side.king_destination(player));
            board.relocate(rook, side.rook_destination(player));
            board.set_has_moved(king, true);
            board.set_has_moved(rook, true);
            Some(Undo {
                moved: king,
                from: king_from,
                had_moved: king_had_moved,
                captured: None,
                rook: Some((rook, rook_from, rook_had_moved)),
            })
        },
    }
}

/// Takes back a move applied by [`make`]. Moves have to be taken back in
/// reverse order.
pub fn unmake(board: &mut Board, undo: Undo) {
    board.relocate(undo.moved, undo.from);
    board.set_has_moved(undo.moved, undo.had_moved);
    if let Some((rook, from, had_moved)) = undo.rook {
        board.relocate(rook, from);
        board.set_has_moved(rook, had_moved);
    }
    if let Some(captured) = undo.captured {
        board.restore(captured);
    }
}

/// Result of trying a move on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    /// The move does not leave the own king capturable.
    pub legal: bool,
    /// The move attacks the opponent king, whether or not it is legal.
    pub check: bool,
}

/// Speculatively applies the move, evaluates the position and takes the move
/// back.
///
/// The opponent's replies are generated with the captured piece omitted.
/// En passant can never capture a king, so replies are generated without the
/// double step of this move.
#[must_use]
pub fn inspect(board: &mut Board, mv: &Move) -> Verdict {
    let Some(undo) = make(board, mv) else {
        tracing::warn!(notation = mv.notation(), "candidate does not fit the board");
        return Verdict {
            legal: false,
            check: false,
        };
    };
    let player = mv.player();
    let replies = movegen::pseudo_legal_moves(
        board,
        !player,
        Context {
            omit: undo.captured(),
            ..Context::plain(mv.turn() + 1)
        },
    );
    let legal = !movegen::captures_king(&replies);
    let check = movegen::attacks_king(board, player, None);
    unmake(board, undo);
    Verdict { legal, check }
}

/// Drops candidates that leave the own king in check and marks the ones that
/// give check.
#[must_use]
pub fn filter_legal(board: &mut Board, candidates: MoveList) -> MoveList {
    candidates
        .into_iter()
        .filter_map(|mut candidate| {
            let verdict = inspect(board, &candidate);
            if !verdict.legal {
                trace!(notation = candidate.notation(), "leaves the king in check");
                return None;
            }
            candidate.set_check(verdict.check);
            Some(candidate)
        })
        .collect()
}

/// Whether `player` is in check: the opponent could capture the king.
#[must_use]
pub fn in_check(board: &Board, player: Player) -> bool {
    movegen::attacks_king(board, !player, None)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::core::PieceKind;
    use crate::chess::moves::CastleSide;

    fn legal_notations(placement: &str, player: Player) -> Vec<String> {
        let mut board = Board::from_placement(placement).unwrap();
        let before = board.clone();
        let candidates = movegen::pseudo_legal_moves(&board, player, Context::plain(1));
        let legal = filter_legal(&mut board, candidates);
        assert_eq!(board, before);
        let mut notations: Vec<_> = legal.iter().map(|m| m.notation().to_owned()).collect();
        notations.sort();
        notations
    }

    #[test]
    fn make_unmake_restores_board() {
        let mut board = Board::from_placement("4k3/8/8/3p4/4P3/8/8/4K3").unwrap();
        let before = board.clone();
        let capture = Move::regular(
            1,
            Player::White,
            PieceKind::Pawn,
            true,
            Square::E4,
            Square::D5,
            Some(PieceKind::Pawn),
            false,
        );
        let undo = make(&mut board, &capture).unwrap();
        assert_eq!(board.to_string(), "4k3/8/8/3P4/8/8/8/4K3");
        assert!(undo.captured().is_some());
        unmake(&mut board, undo);
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_removes_passed_pawn() {
        let mut board = Board::from_placement("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        let before = board.clone();
        let capture = Move::regular(
            3,
            Player::White,
            PieceKind::Pawn,
            true,
            Square::E5,
            Square::D6,
            Some(PieceKind::Pawn),
            true,
        );
        let undo = make(&mut board, &capture).unwrap();
        assert_eq!(board.to_string(), "4k3/8/3P4/8/8/8/8/4K3");
        unmake(&mut board, undo);
        assert_eq!(board, before);
    }

    #[test]
    fn castle_make_unmake() {
        let mut board = Board::from_placement("4k3/8/8/8/8/8/8/R3K2R").unwrap();
        let before = board.clone();
        let undo = make(&mut board, &Move::castle(1, Player::White, CastleSide::Queen)).unwrap();
        assert_eq!(board.to_string(), "4k3/8/8/8/8/8/8/2KR3R");
        assert!(board.occupant_at(Square::C1).unwrap().has_moved());
        assert!(board.occupant_at(Square::D1).unwrap().has_moved());
        unmake(&mut board, undo);
        assert_eq!(board, before);
    }

    #[test]
    fn mismatched_move_is_rejected() {
        let mut board = Board::starting();
        let ghost = Move::regular(
            1,
            Player::White,
            PieceKind::Knight,
            false,
            Square::E4,
            Square::F6,
            None,
            false,
        );
        assert!(make(&mut board, &ghost).is_none());
        assert_eq!(board, Board::starting());
    }

    #[test]
    fn pinned_piece_can_not_move() {
        // The knight on e2 shields the king from the rook on e8.
        let notations = legal_notations("4r1k1/8/8/8/8/8/4N3/4K3", Player::White);
        assert!(notations.iter().all(|n| !n.starts_with('N')));
        assert_eq!(notations, vec!["Kd1", "Kd2", "Kf1", "Kf2"]);
    }

    #[test]
    fn king_can_not_step_into_check() {
        let notations = legal_notations("k7/8/8/8/8/8/1r6/K7", Player::White);
        assert_eq!(notations, vec!["Kxb2"]);
    }

    #[test]
    fn capturing_the_attacker_is_legal() {
        // Capturing the checking rook: the captured rook must not be
        // considered as an attacker afterwards.
        let notations = legal_notations("4k3/8/8/8/8/8/4r3/3QK3", Player::White);
        assert!(notations.contains(&"Kxe2".to_owned()));
        assert!(notations.contains(&"Qxe2".to_owned()));
        assert!(!notations.contains(&"Qd2".to_owned()));
    }

    #[test]
    fn checks_are_marked() {
        let notations = legal_notations("4k3/8/8/8/8/8/8/R3K3", Player::White);
        assert!(notations.contains(&"Ra8+".to_owned()));
        assert!(notations.contains(&"Ra7".to_owned()));
    }

    #[test]
    fn check_detection() {
        let board = Board::from_placement("4k3/8/8/8/8/8/8/4R1K1").unwrap();
        assert!(in_check(&board, Player::Black));
        assert!(!in_check(&board, Player::White));
    }
}
