//! Short [algebraic notation]: encoding candidate moves, disambiguating them
//! and matching user-supplied text against them.
//!
//! Castles use zeros ("0-0", "0-0-0"). The letter O form is accepted on
//! input and normalized.
//!
//! [algebraic notation]: https://en.wikipedia.org/wiki/Algebraic_notation_(chess)

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::chess::core::{File, Rank};
use crate::chess::moves::{Move, MoveKind};

#[allow(missing_docs)]
pub const CASTLE_KING_SIDE: &str = "0-0";
#[allow(missing_docs)]
pub const CASTLE_QUEEN_SIDE: &str = "0-0-0";
/// Appended to en passant captures.
pub const EN_PASSANT_SUFFIX: &str = " e.p.";
#[allow(missing_docs)]
pub const CHECK_SUFFIX: char = '+';
#[allow(missing_docs)]
pub const CHECKMATE_SUFFIX: char = '#';

/// Extra part of the origin square added when two moves of the same kind of
/// piece reach the same square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disambiguator {
    #[allow(missing_docs)]
    File(File),
    #[allow(missing_docs)]
    Rank(Rank),
}

/// Writes the notation of a move.
///
/// Regular moves are: piece letter (none for pawns), disambiguator, "x" and
/// the origin file for pawn captures, destination square, " e.p." for en
/// passant. A "+" is appended if the move gives check.
#[must_use]
pub fn encode(kind: &MoveKind, disambiguator: Option<Disambiguator>, check: bool) -> String {
    let mut notation = String::new();
    match kind {
        MoveKind::Castle(side) => notation.push_str(side.notation()),
        MoveKind::Regular {
            piece,
            from,
            to,
            capture,
            en_passant,
            ..
        } => {
            notation.push_str(piece.notation_letter());
            match disambiguator {
                Some(Disambiguator::File(file)) => notation.push_str(&file.to_string()),
                Some(Disambiguator::Rank(rank)) => notation.push_str(&rank.to_string()),
                None => (),
            }
            if capture.is_some() {
                if piece.notation_letter().is_empty() && disambiguator.is_none() {
                    notation.push_str(&from.file().to_string());
                }
                notation.push('x');
            }
            notation.push_str(&to.to_string());
            if *en_passant {
                notation.push_str(EN_PASSANT_SUFFIX);
            }
        },
    }
    if check {
        notation.push(CHECK_SUFFIX);
    }
    notation
}

/// Adds the origin file or rank to moves that would otherwise share the same
/// notation.
///
/// Pairs are resolved by the origin file when the files differ and by the
/// origin rank otherwise. Three or more pieces able to reach the same square
/// are left ambiguous: this needs a full origin square and only happens after
/// promotions, which are not supported.
pub fn disambiguate(moves: &mut [Move]) {
    for (key, indices) in notation_groups(moves) {
        match indices.as_slice() {
            [_] => (),
            &[first, second] => {
                let (a, b) = (moves[first].from(), moves[second].from());
                let (a, b) = if a.file() == b.file() {
                    (
                        Disambiguator::Rank(a.rank()),
                        Disambiguator::Rank(b.rank()),
                    )
                } else {
                    (
                        Disambiguator::File(a.file()),
                        Disambiguator::File(b.file()),
                    )
                };
                moves[first].set_disambiguator(a);
                moves[second].set_disambiguator(b);
            },
            _ => tracing::warn!(
                notation = %key,
                count = indices.len(),
                "more than two moves share the same notation, leaving them ambiguous"
            ),
        }
    }
}

/// Indices of regular moves keyed by their bare notation, in key order.
fn notation_groups(moves: &[Move]) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, candidate) in moves.iter().enumerate() {
        if candidate.castle_side().is_some() {
            continue;
        }
        let key = encode(candidate.kind(), None, false);
        groups.entry(key).or_default().push(index);
    }
    groups
}

/// Brings user input and move notation to a common form for matching:
/// surrounding whitespace, check and checkmate markers and the en passant
/// suffix are dropped, letter O castles become zeros.
///
/// ```
/// use rookery::chess::notation::normalize;
///
/// assert_eq!(normalize(" Qxf7# "), "Qxf7");
/// assert_eq!(normalize("O-O-O"), "0-0-0");
/// assert_eq!(normalize("exd6 e.p."), "exd6");
/// ```
#[must_use]
pub fn normalize(input: &str) -> String {
    let stripped: String = input
        .trim()
        .chars()
        .filter(|c| *c != CHECK_SUFFIX && *c != CHECKMATE_SUFFIX)
        .collect();
    let stripped = stripped.trim_end();
    let stripped = stripped
        .strip_suffix(EN_PASSANT_SUFFIX.trim_start())
        .map_or(stripped, str::trim_end);
    match stripped {
        "O-O" | CASTLE_KING_SIDE => CASTLE_KING_SIDE.to_owned(),
        "O-O-O" | CASTLE_QUEEN_SIDE => CASTLE_QUEEN_SIDE.to_owned(),
        _ => stripped.to_owned(),
    }
}

/// Whether a movetext token can be a move at all.
///
/// Move numbers ("12." or "12..."), game results and anything with
/// characters outside of the notation alphabet are rejected.
#[must_use]
pub fn is_well_formed(token: &str) -> bool {
    const GAME_RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];
    let token = token.trim();
    if token.is_empty() || GAME_RESULTS.contains(&token) {
        return false;
    }
    let token = token.strip_suffix(EN_PASSANT_SUFFIX.trim_start()).unwrap_or(token);
    let token = token.trim_end_matches(['+', '#', '!', '?']);
    !token.is_empty()
        && !token.chars().all(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| matches!(c, 'a'..='h' | '1'..='8' | 'K' | 'Q' | 'R' | 'B' | 'N' | 'x' | 'O' | '0' | '-' | '='))
}

/// Formats the move history as numbered pairs: "1.e4 e5 2.Nf3".
///
/// ```
/// use rookery::chess::notation::format_history;
///
/// assert_eq!(format_history(&["e4", "e5", "Nf3"]), "1.e4 e5 2.Nf3");
/// assert_eq!(format_history::<&str>(&[]), "");
/// ```
#[must_use]
pub fn format_history<S: AsRef<str>>(history: &[S]) -> String {
    history
        .chunks(2)
        .enumerate()
        .map(|(index, pair)| {
            let moves = pair.iter().map(|m| m.as_ref()).join(" ");
            format!("{}.{moves}", index + 1)
        })
        .join(" ")
}
