//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};
use std::mem;
use std::ops::Not;

use anyhow::bail;
use itertools::Itertools;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Checks whether 1-based `rank` and `file` coordinates are on the board.
///
/// Ray-casting generators step past the edge all the time: being out of
/// bounds is a regular answer, not an error.
///
/// ```
/// use rookery::chess::core::in_bounds;
///
/// assert!(in_bounds(1, 1));
/// assert!(in_bounds(8, 8));
/// assert!(!in_bounds(0, 4));
/// assert!(!in_bounds(5, 9));
/// ```
#[must_use]
pub const fn in_bounds(rank: i8, file: i8) -> bool {
    1 <= rank && rank <= BOARD_WIDTH as i8 && 1 <= file && file <= BOARD_WIDTH as i8
}

/// Board squares: from left to right, from bottom to the top:
///
/// ```
/// use rookery::chess::core::Square;
///
/// assert_eq!(Square::A1 as u8, 0);
/// assert_eq!(Square::E1 as u8, 4);
/// assert_eq!(Square::H1 as u8, 7);
/// assert_eq!(Square::A4 as u8, 8 * 3);
/// assert_eq!(Square::H8 as u8, 63);
/// ```
///
/// Square is a compact immutable coordinate using only one byte.
///
/// ```
/// use rookery::chess::core::Square;
///
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub fn new(file: File, rank: Rank) -> Self {
        Self::from(file as u8 + (rank as u8) * BOARD_WIDTH)
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub fn file(self) -> File {
        File::from(self as u8 % BOARD_WIDTH)
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub fn rank(self) -> Rank {
        Rank::from(self as u8 / BOARD_WIDTH)
    }

    /// Steps `rank_delta` ranks up and `file_delta` files right. Returns
    /// [`None`] when the target is off the board.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn offset(self, rank_delta: i8, file_delta: i8) -> Option<Self> {
        let rank = self.rank().number() + rank_delta;
        let file = self.file().number() + file_delta;
        if !in_bounds(rank, file) {
            return None;
        }
        Some(Self::new(
            File::from((file - 1) as u8),
            Rank::from((rank - 1) as u8),
        ))
    }

    /// All 64 squares from A1 to H8.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..BOARD_SIZE).map(Self::from)
    }
}

impl From<u8> for Square {
    /// Creates a square given its position on the board.
    ///
    /// # Panics
    ///
    /// Input has to be a number within 0..[`BOARD_SIZE`] range.
    fn from(square: u8) -> Self {
        assert!(square < BOARD_SIZE);
        unsafe { mem::transmute(square) }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let (file, rank) = match square.chars().collect_tuple() {
            Some((file, rank)) => (file, rank),
            None => bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            ),
        };
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    /// 1-based file number: a = 1, h = 8.
    #[must_use]
    pub const fn number(self) -> i8 {
        self as i8 + 1
    }

    /// Files from a to h.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..BOARD_WIDTH).map(Self::from)
    }
}

impl From<u8> for File {
    /// # Panics
    ///
    /// Input has to be a number within 0..[`BOARD_WIDTH`] range.
    fn from(file: u8) -> Self {
        assert!(file < BOARD_WIDTH);
        unsafe { mem::transmute(file) }
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(Self::from(file as u8 - b'a')),
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + *self as u8) as char)
    }
}

/// Represents a horizontal row of the chessboard. In chess notation, it is
/// represented with a number. The implementation assumes zero-based values
/// (i.e. rank 1 would be 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Rank {
    /// 1-based rank number, as printed in notation.
    #[must_use]
    pub const fn number(self) -> i8 {
        self as i8 + 1
    }

    /// Ranks from 1 to 8.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..BOARD_WIDTH).map(Self::from)
    }

    /// The rank pieces of `player` start on: castling happens here.
    #[must_use]
    pub const fn backrank(player: Player) -> Self {
        match player {
            Player::White => Self::One,
            Player::Black => Self::Eight,
        }
    }

    /// The rank pawns of `player` start on.
    #[must_use]
    pub const fn pawns_starting(player: Player) -> Self {
        match player {
            Player::White => Self::Two,
            Player::Black => Self::Seven,
        }
    }

    /// The fifth rank relative to `player`: the only rank a pawn can capture
    /// en passant from.
    #[must_use]
    pub const fn en_passant_origin(player: Player) -> Self {
        match player {
            Player::White => Self::Five,
            Player::Black => Self::Four,
        }
    }
}

impl From<u8> for Rank {
    /// # Panics
    ///
    /// Input has to be a number within 0..[`BOARD_WIDTH`] range.
    fn from(rank: u8) -> Self {
        assert!(rank < BOARD_WIDTH);
        unsafe { mem::transmute(rank) }
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(Self::from(rank as u8 - b'1')),
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank increment of a pawn push.
    #[must_use]
    pub const fn push_direction(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Letter used in algebraic notation. Pawns do not have one.
    #[must_use]
    pub const fn notation_letter(self) -> &'static str {
        match self {
            Self::King => "K",
            Self::Queen => "Q",
            Self::Rook => "R",
            Self::Bishop => "B",
            Self::Knight => "N",
            Self::Pawn => "",
        }
    }

    /// Symbol used in FEN: uppercase for white, lowercase for black.
    #[must_use]
    pub const fn fen_symbol(self, owner: Player) -> char {
        let symbol = match self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        };
        match owner {
            Player::White => symbol.to_ascii_uppercase(),
            Player::Black => symbol,
        }
    }

    /// Parses a FEN piece symbol into its owner and kind.
    pub fn from_fen_symbol(symbol: char) -> anyhow::Result<(Player, Self)> {
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => Self::King,
            'q' => Self::Queen,
            'r' => Self::Rook,
            'b' => Self::Bishop,
            'n' => Self::Knight,
            'p' => Self::Pawn,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok((owner, kind))
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::King => "king",
            Self::Queen => "queen",
            Self::Rook => "rook",
            Self::Bishop => "bishop",
            Self::Knight => "knight",
            Self::Pawn => "pawn",
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rank() {
        let ranks: Vec<_> = (0..BOARD_WIDTH).map(Rank::from).collect();
        assert_eq!(
            ranks,
            vec![
                Rank::One,
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
                Rank::Eight,
            ]
        );
        assert_eq!(Rank::Eight.to_string(), "8");
    }

    #[test]
    #[should_panic(expected = "assertion failed: rank < BOARD_WIDTH")]
    fn out_of_bounds_rank() {
        let _ = Rank::from(BOARD_WIDTH);
    }

    #[test]
    fn file() {
        let files: Vec<_> = File::iter().collect();
        assert_eq!(
            files,
            vec![
                File::A,
                File::B,
                File::C,
                File::D,
                File::E,
                File::F,
                File::G,
                File::H,
            ]
        );
        assert_eq!(File::C.to_string(), "c");
        assert!(File::try_from('i').is_err());
    }

    #[test]
    fn square() {
        let squares: Vec<_> = [
            0u8,
            BOARD_SIZE - 1,
            BOARD_WIDTH - 1,
            BOARD_WIDTH,
            BOARD_WIDTH * 2 + 5,
        ]
        .iter()
        .map(|square| Square::from(*square))
        .collect();
        assert_eq!(
            squares,
            vec![Square::A1, Square::H8, Square::H1, Square::A2, Square::F3]
        );
        assert_eq!(Square::try_from("e4").unwrap(), Square::E4);
        assert_eq!(Square::G7.to_string(), "g7");
        assert!(Square::try_from("e9").is_err());
        assert!(Square::try_from("e44").is_err());
        assert!(Square::try_from("").is_err());
    }

    #[test]
    #[should_panic(expected = "assertion failed: square < BOARD_SIZE")]
    fn out_of_bounds_square() {
        let _ = Square::from(BOARD_SIZE);
    }

    #[test]
    fn offsets() {
        assert_eq!(Square::E4.offset(1, 1), Some(Square::F5));
        assert_eq!(Square::E4.offset(-2, -1), Some(Square::D2));
        assert_eq!(Square::A1.offset(-1, 0), None);
        assert_eq!(Square::H8.offset(0, 1), None);
        assert_eq!(Square::B1.offset(2, -2), None);
    }

    #[test]
    fn players() {
        assert_eq!(!Player::White, Player::Black);
        assert_eq!(Player::Black.opponent(), Player::White);
        assert_eq!(Player::try_from("b").unwrap(), Player::Black);
        assert!(Player::try_from("x").is_err());
    }

    #[test]
    fn piece_symbols() {
        assert_eq!(PieceKind::Knight.notation_letter(), "N");
        assert_eq!(PieceKind::Pawn.notation_letter(), "");
        assert_eq!(PieceKind::Queen.fen_symbol(Player::White), 'Q');
        assert_eq!(PieceKind::Queen.fen_symbol(Player::Black), 'q');
        assert_eq!(
            PieceKind::from_fen_symbol('n').unwrap(),
            (Player::Black, PieceKind::Knight)
        );
        assert!(PieceKind::from_fen_symbol('x').is_err());
    }
}
