//! Square-centric [Mailbox] board: the authoritative mapping from squares to
//! the pieces occupying them.
//!
//! Pieces live in a fixed arena and keep their identity for the whole game.
//! A captured piece is flagged rather than removed, so a speculative capture
//! made while filtering illegal moves can be restored exactly.
//!
//! [Mailbox]: https://www.chessprogramming.org/Mailbox

use std::fmt::{self, Write};

use anyhow::{bail, Context};
use arrayvec::ArrayVec;

use crate::chess::core::{self, File, PieceKind, Player, Rank, Square, BOARD_SIZE, BOARD_WIDTH};

/// Each side starts with 16 pieces and pieces are never created afterwards.
pub const MAX_PIECES: usize = 32;

/// Stable handle of a piece within its [`Board`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(u8);

impl PieceId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A specific piece owned by a player, with its own history: where it is,
/// whether it has ever moved and whether it was captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    owner: Player,
    // Last square the piece occupied. Kept after capture to allow restoring.
    square: Square,
    has_moved: bool,
    captured: bool,
}

impl Piece {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn owner(&self) -> Player {
        self.owner
    }

    /// Current square, or [`None`] if the piece was captured.
    #[must_use]
    pub const fn square(&self) -> Option<Square> {
        if self.captured {
            None
        } else {
            Some(self.square)
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_captured(&self) -> bool {
        self.captured
    }

    fn symbol(&self) -> char {
        self.kind.fen_symbol(self.owner)
    }
}

/// Board State: owns every piece and enforces that at most one piece
/// occupies any square.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    pieces: ArrayVec<Piece, MAX_PIECES>,
    squares: [Option<PieceId>; BOARD_SIZE as usize],
}

impl Board {
    /// Board without any pieces, to be filled with [`Board::place`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pieces: ArrayVec::new(),
            squares: [None; BOARD_SIZE as usize],
        }
    }

    /// Standard starting position: 16 unmoved pieces per side.
    #[must_use]
    pub fn starting() -> Self {
        const BACKRANK: [PieceKind; BOARD_WIDTH as usize] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Self::empty();
        for player in [Player::White, Player::Black] {
            for (file, kind) in File::iter().zip(BACKRANK) {
                let _ = board.spawn(player, kind, Square::new(file, Rank::backrank(player)), false);
            }
            for file in File::iter() {
                let _ = board.spawn(
                    player,
                    PieceKind::Pawn,
                    Square::new(file, Rank::pawns_starting(player)),
                    false,
                );
            }
        }
        board
    }

    /// Parses the piece placement part of [Forsyth-Edwards Notation].
    ///
    /// Pieces that stand on their initial squares are considered unmoved,
    /// everything else has already moved. Castling rights are refined by the
    /// caller.
    ///
    /// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
    pub fn from_placement(placement: &str) -> anyhow::Result<Self> {
        let mut board = Self::empty();
        let mut ranks = Rank::iter().rev();
        for rank_fen in placement.split('/') {
            let Some(rank) = ranks.next() else {
                bail!("incorrect FEN: expected 8 ranks, got {placement}");
            };
            let mut file: u8 = 0;
            for symbol in rank_fen.chars() {
                if file >= BOARD_WIDTH {
                    bail!("incorrect FEN: rank {rank_fen} is longer than {BOARD_WIDTH} squares");
                }
                match symbol {
                    '0' => bail!("increment can not be 0"),
                    '1'..='8' => {
                        file += symbol as u8 - b'0';
                        continue;
                    },
                    _ => (),
                }
                let (owner, kind) = PieceKind::from_fen_symbol(symbol)?;
                let square = Square::new(File::from(file), rank);
                let _ = board
                    .place(owner, kind, square)
                    .with_context(|| format!("incorrect FEN: can not place {symbol}"))?;
                file += 1;
            }
            if file != BOARD_WIDTH {
                bail!(
                    "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {file}"
                );
            }
        }
        if ranks.next().is_some() {
            bail!("incorrect FEN: there should be 8 ranks, got {placement}");
        }
        Ok(board)
    }

    /// Puts a new piece on the board.
    ///
    /// # Errors
    ///
    /// The square is already occupied or the board already holds
    /// [`MAX_PIECES`] pieces.
    pub fn place(&mut self, owner: Player, kind: PieceKind, square: Square) -> anyhow::Result<PieceId> {
        if let Some(occupant) = self.occupant_at(square) {
            bail!(
                "{square} is already occupied by {} {}",
                occupant.owner(),
                occupant.kind()
            );
        }
        if self.pieces.is_full() {
            bail!("board can not hold more than {MAX_PIECES} pieces");
        }
        let has_moved = !on_initial_square(owner, kind, square);
        Ok(self.spawn(owner, kind, square, has_moved))
    }

    fn spawn(&mut self, owner: Player, kind: PieceKind, square: Square, has_moved: bool) -> PieceId {
        debug_assert!(self.squares[square as usize].is_none());
        #[allow(clippy::cast_possible_truncation)]
        let id = PieceId(self.pieces.len() as u8);
        self.pieces.push(Piece {
            kind,
            owner,
            square,
            has_moved,
            captured: false,
        });
        self.squares[square as usize] = Some(id);
        id
    }

    /// Checks whether 1-based `rank` and `file` are on the board.
    #[must_use]
    pub const fn in_bounds(rank: i8, file: i8) -> bool {
        core::in_bounds(rank, file)
    }

    /// The piece occupying `square`, if any.
    #[must_use]
    pub fn occupant_at(&self, square: Square) -> Option<&Piece> {
        self.occupant_id(square).map(|id| self.piece(id))
    }

    /// Handle of the piece occupying `square`, if any.
    #[must_use]
    pub fn occupant_id(&self, square: Square) -> Option<PieceId> {
        self.squares[square as usize]
    }

    /// # Panics
    ///
    /// `id` has to be produced by this board.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    /// Pieces of `player` that are still on the board, in creation order.
    pub fn active_pieces(&self, player: Player) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(move |(_, piece)| piece.owner == player && !piece.captured)
            .map(|(index, piece)| {
                #[allow(clippy::cast_possible_truncation)]
                let id = PieceId(index as u8);
                (id, piece)
            })
    }

    /// Every piece ever placed, including captured ones.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter()
    }

    /// The king of `player`, if it is on the board.
    #[must_use]
    pub fn king(&self, player: Player) -> Option<PieceId> {
        self.active_pieces(player)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(id, _)| id)
    }

    /// Moves a piece to an empty square.
    pub(super) fn relocate(&mut self, id: PieceId, to: Square) {
        let from = self.pieces[id.index()].square;
        debug_assert_eq!(self.squares[from as usize], Some(id));
        debug_assert!(
            self.squares[to as usize].is_none(),
            "can't move to already occupied square {to}"
        );
        self.squares[from as usize] = None;
        self.squares[to as usize] = Some(id);
        self.pieces[id.index()].square = to;
    }

    /// Takes a piece off the board, remembering where it stood.
    pub(super) fn capture(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.index()];
        debug_assert!(!piece.captured, "can't capture a piece twice");
        piece.captured = true;
        self.squares[piece.square as usize] = None;
    }

    /// Puts a captured piece back onto the square it was captured on.
    pub(super) fn restore(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.index()];
        debug_assert!(piece.captured, "can't restore a piece that is on the board");
        debug_assert!(
            self.squares[piece.square as usize].is_none(),
            "can't restore onto already occupied square"
        );
        piece.captured = false;
        self.squares[piece.square as usize] = Some(id);
    }

    pub(super) fn set_has_moved(&mut self, id: PieceId, has_moved: bool) {
        self.pieces[id.index()].has_moved = has_moved;
    }
}

/// Standard initial squares. Knights, bishops and the queen have no special
/// moves, so only pawns, kings and rooks really care.
fn on_initial_square(owner: Player, kind: PieceKind, square: Square) -> bool {
    let backrank = square.rank() == Rank::backrank(owner);
    match kind {
        PieceKind::Pawn => square.rank() == Rank::pawns_starting(owner),
        PieceKind::King => backrank && square.file() == File::E,
        PieceKind::Queen => backrank && square.file() == File::D,
        PieceKind::Rook => backrank && matches!(square.file(), File::A | File::H),
        PieceKind::Bishop => backrank && matches!(square.file(), File::C | File::F),
        PieceKind::Knight => backrank && matches!(square.file(), File::B | File::G),
    }
}

impl fmt::Display for Board {
    /// Prints board representation in FEN format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            let mut empty_squares = 0i32;
            for file in File::iter() {
                if let Some(piece) = self.occupant_at(Square::new(file, rank)) {
                    if empty_squares != 0 {
                        write!(f, "{empty_squares}")?;
                        empty_squares = 0;
                    }
                    f.write_char(piece.symbol())?;
                } else {
                    empty_squares += 1;
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if rank != Rank::One {
                const RANK_SEPARATOR: char = '/';
                f.write_char(RANK_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece) a-la Stockfish "debug" command in UCI mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                match self.occupant_at(Square::new(file, rank)) {
                    Some(piece) => f.write_char(piece.symbol()),
                    None => f.write_char('.'),
                }?;
                if file != File::H {
                    f.write_str(SQUARE_SEPARATOR)?;
                }
            }
            if rank != Rank::One {
                f.write_str(LINE_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";
