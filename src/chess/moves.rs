//! Candidate moves: everything needed to apply a move to the board, undo it
//! and print it in algebraic notation.

use std::fmt;

use crate::chess::core::{File, PieceKind, Player, Rank, Square};
use crate::chess::notation::{self, Disambiguator};

/// Direction of castling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    /// Short castle, towards the h-file.
    King,
    /// Long castle, towards the a-file.
    Queen,
}

impl CastleSide {
    /// Notation of the castle: zeros, not the letter O.
    #[must_use]
    pub const fn notation(self) -> &'static str {
        match self {
            Self::King => notation::CASTLE_KING_SIDE,
            Self::Queen => notation::CASTLE_QUEEN_SIDE,
        }
    }

    /// Where the king of `player` stands before castling.
    #[must_use]
    pub fn king_origin(player: Player) -> Square {
        Square::new(File::E, Rank::backrank(player))
    }

    /// Where the king lands.
    #[must_use]
    pub fn king_destination(self, player: Player) -> Square {
        let file = match self {
            Self::King => File::G,
            Self::Queen => File::C,
        };
        Square::new(file, Rank::backrank(player))
    }

    /// Where the castling rook stands before castling.
    #[must_use]
    pub fn rook_origin(self, player: Player) -> Square {
        let file = match self {
            Self::King => File::H,
            Self::Queen => File::A,
        };
        Square::new(file, Rank::backrank(player))
    }

    /// Where the rook lands: the square the king crosses.
    #[must_use]
    pub fn rook_destination(self, player: Player) -> Square {
        let file = match self {
            Self::King => File::F,
            Self::Queen => File::D,
        };
        Square::new(file, Rank::backrank(player))
    }

    /// Squares strictly between the king and the rook. All of them have to
    /// be empty.
    pub fn path(self, player: Player) -> impl Iterator<Item = Square> {
        let files: &'static [File] = match self {
            Self::King => &[File::F, File::G],
            Self::Queen => &[File::B, File::C, File::D],
        };
        let rank = Rank::backrank(player);
        files.iter().map(move |file| Square::new(*file, rank))
    }
}

/// What the move does on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(variant_size_differences)]
pub enum MoveKind {
    /// A single piece moves and possibly captures.
    Regular {
        /// Kind of the moving piece.
        piece: PieceKind,
        /// Whether the moving piece had moved before this move.
        had_moved: bool,
        #[allow(missing_docs)]
        from: Square,
        #[allow(missing_docs)]
        to: Square,
        /// Kind of the captured piece.
        capture: Option<PieceKind>,
        /// The captured pawn stands next to `from`, not on `to`.
        en_passant: bool,
    },
    /// King and rook move together.
    Castle(CastleSide),
}

/// A candidate move of the active player.
///
/// Two moves are the same if they have the same start, end and flags: the
/// notation is derived from these and cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    turn: u32,
    player: Player,
    kind: MoveKind,
    disambiguator: Option<Disambiguator>,
    check: bool,
    notation: String,
}

impl Move {
    /// Creates a regular move or capture.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn regular(
        turn: u32,
        player: Player,
        piece: PieceKind,
        had_moved: bool,
        from: Square,
        to: Square,
        capture: Option<PieceKind>,
        en_passant: bool,
    ) -> Self {
        Self::new(
            turn,
            player,
            MoveKind::Regular {
                piece,
                had_moved,
                from,
                to,
                capture,
                en_passant,
            },
        )
    }

    /// Creates a castle.
    #[must_use]
    pub fn castle(turn: u32, player: Player, side: CastleSide) -> Self {
        Self::new(turn, player, MoveKind::Castle(side))
    }

    fn new(turn: u32, player: Player, kind: MoveKind) -> Self {
        let notation = notation::encode(&kind, None, false);
        Self {
            turn,
            player,
            kind,
            disambiguator: None,
            check: false,
            notation,
        }
    }

    /// Turn number the move belongs to.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn player(&self) -> Player {
        self.player
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> &MoveKind {
        &self.kind
    }

    /// Kind of the moving piece. Castles are king moves.
    #[must_use]
    pub const fn piece(&self) -> PieceKind {
        match self.kind {
            MoveKind::Regular { piece, .. } => piece,
            MoveKind::Castle(_) => PieceKind::King,
        }
    }

    /// Start square of the moving piece (the king for castles).
    #[must_use]
    pub fn from(&self) -> Square {
        match self.kind {
            MoveKind::Regular { from, .. } => from,
            MoveKind::Castle(_) => CastleSide::king_origin(self.player),
        }
    }

    /// End square of the moving piece (the king for castles).
    #[must_use]
    pub fn to(&self) -> Square {
        match self.kind {
            MoveKind::Regular { to, .. } => to,
            MoveKind::Castle(side) => side.king_destination(self.player),
        }
    }

    /// Kind of the captured piece, if the move is a capture.
    #[must_use]
    pub const fn capture(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Regular { capture, .. } => capture,
            MoveKind::Castle(_) => None,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::Regular { en_passant: true, .. })
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn castle_side(&self) -> Option<CastleSide> {
        match self.kind {
            MoveKind::Castle(side) => Some(side),
            MoveKind::Regular { .. } => None,
        }
    }

    /// The destination square of a pawn moving two squares at once. The
    /// opponent may capture it en passant on the next ply.
    #[must_use]
    pub fn double_step(&self) -> Option<Square> {
        match self.kind {
            MoveKind::Regular {
                piece: PieceKind::Pawn,
                from,
                to,
                ..
            } if (from.rank().number() - to.rank().number()).abs() == 2 => Some(to),
            _ => None,
        }
    }

    /// Whether the opponent king is attacked after this move.
    #[must_use]
    pub const fn gives_check(&self) -> bool {
        self.check
    }

    /// Algebraic notation, e.g. "Nf3", "exd6 e.p.", "Qxf7+" or "0-0".
    #[must_use]
    pub fn notation(&self) -> &str {
        &self.notation
    }

    pub(super) fn set_check(&mut self, check: bool) {
        self.check = check;
        self.refresh_notation();
    }

    pub(super) fn set_disambiguator(&mut self, disambiguator: Disambiguator) {
        self.disambiguator = Some(disambiguator);
        self.refresh_notation();
    }

    fn refresh_notation(&mut self) {
        self.notation = notation::encode(&self.kind, self.disambiguator, self.check);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}

/// Moves of a single ply. The number of legal moves in reachable positions
/// stays well below 256, but capacity is not enforced.
pub type MoveList = Vec<Move>;
