use itertools::Itertools;
use pretty_assertions::assert_eq;
use rookery::chess::core::{PieceKind, Player, Square};
use rookery::chess::game::{Game, MoveError, MoveSelector, Phase};
use rookery::chess::moves::{CastleSide, Move};

fn play(game: &mut Game, moves: &[&str]) {
    for notation in moves {
        let result = game.apply_move(*notation);
        assert!(result.is_ok(), "{notation}: {result:?}");
    }
}

fn setup(fen: &str) -> Game {
    Game::from_fen(fen).expect("we are parsing valid position: {fen}")
}

fn sorted_moves(game: &Game) -> Vec<&str> {
    game.legal_moves().iter().map(Move::notation).sorted().collect()
}

fn has_moved(game: &Game, square: Square) -> bool {
    game.board()
        .occupant_at(square)
        .expect("square should be occupied")
        .has_moved()
}

#[test]
fn first_move() {
    let mut game = Game::new();
    let committed = game.apply_move("e4").unwrap();
    assert_eq!(committed.notation, "e4");
    assert_eq!(committed.turn, 1);
    assert_eq!(committed.player, Player::White);
    assert_eq!(game.turn(), 2);
    assert_eq!(game.active_player(), Player::Black);
    assert_eq!(game.phase(), Phase::AwaitingInput);
    assert_eq!(game.move_history(), ["e4"]);
    assert_eq!(game.legal_moves().len(), 20);
    assert!(game.legal_moves().iter().all(|m| m.turn() == 2));
}

#[test]
fn fools_mate() {
    let mut game = Game::new();
    play(&mut game, &["f3", "e5", "g4"]);
    let committed = game.apply_move("Qh4").unwrap();
    assert!(committed.check);
    assert!(committed.checkmate);
    assert_eq!(committed.notation, "Qh4#");
    assert!(game.is_checkmate());
    assert!(game.is_check());
    assert!(game.legal_moves().is_empty());
    assert_eq!(game.phase(), Phase::Checkmate);
    assert_eq!(game.move_history().last().unwrap(), "Qh4#");
    assert_eq!(game.history_text(), "1.f3 e5 2.g4 Qh4#");
    assert_eq!(game.status().to_string(), "checkmate, black wins");

    let finished = game.clone();
    assert_eq!(game.apply_move("e4"), Err(MoveError::CheckmateReached));
    assert_eq!(game.apply_move("Z9"), Err(MoveError::CheckmateReached));
    assert_eq!(game, finished);
}

#[test]
fn king_side_castle() {
    let mut game = Game::new();
    play(&mut game, &["e4", "e5", "Nf3", "Nf6", "Bc4", "Bc5"]);
    assert!(!has_moved(&game, Square::E1));
    assert!(!has_moved(&game, Square::H1));
    assert!(sorted_moves(&game).contains(&"0-0"));

    let committed = game.apply_move("0-0").unwrap();
    assert_eq!(committed.notation, "0-0");
    assert_eq!(game.turn(), 8);
    let king = game.board().occupant_at(Square::G1).unwrap();
    assert_eq!(king.kind(), PieceKind::King);
    assert!(king.has_moved());
    let rook = game.board().occupant_at(Square::F1).unwrap();
    assert_eq!(rook.kind(), PieceKind::Rook);
    assert!(rook.has_moved());
    assert!(game.board().occupant_at(Square::E1).is_none());
    assert!(game.board().occupant_at(Square::H1).is_none());

    // Letter O castles are accepted too.
    let committed = game.apply_move("O-O").unwrap();
    assert_eq!(committed.notation, "0-0");
    assert_eq!(game.history_text(), "1.e4 e5 2.Nf3 Nf6 3.Bc4 Bc5 4.0-0 0-0");
}

#[test]
fn queen_side_castle() {
    let mut game = setup("r3k3/8/8/8/8/8/8/R3K3 w Qq - 0 1");
    assert_eq!(
        game.legal_moves()
            .iter()
            .filter_map(Move::castle_side)
            .collect::<Vec<_>>(),
        vec![CastleSide::Queen]
    );
    let _ = game.apply_move("O-O-O").unwrap();
    assert_eq!(
        game.board().occupant_at(Square::C1).unwrap().kind(),
        PieceKind::King
    );
    assert_eq!(
        game.board().occupant_at(Square::D1).unwrap().kind(),
        PieceKind::Rook
    );
    // The rook on d1 covers d8, castling through it is still offered.
    assert!(sorted_moves(&game).contains(&"0-0-0"));
}

#[test]
fn no_castling_after_king_moved() {
    let mut game = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    play(&mut game, &["Kd1", "Kd8", "Ke1", "Ke8"]);
    assert!(game.legal_moves().iter().all(|m| m.castle_side().is_none()));
    assert_eq!(game.fen(), "r3k2r/8/8/8/8/8/8/R3K2R w - - 0 3");
}

#[test]
fn no_castling_out_of_check() {
    let game = setup("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    assert!(game.is_check());
    assert!(game.legal_moves().iter().all(|m| m.castle_side().is_none()));
    // Neither rook can block the e-file.
    assert_eq!(sorted_moves(&game), vec!["Kd1", "Kd2", "Kf1", "Kf2"]);
}

#[test]
fn invalid_notation_leaves_game_unchanged() {
    let mut game = Game::new();
    play(&mut game, &["e4", "e5"]);
    let before = game.clone();
    assert_eq!(
        game.apply_move("Z9"),
        Err(MoveError::InvalidMoveNotation("Z9".to_owned()))
    );
    assert_eq!(game, before);
    // Moves of the opponent are out of turn and simply invalid.
    assert_eq!(
        game.apply_move("Nf6"),
        Err(MoveError::InvalidMoveNotation("Nf6".to_owned()))
    );
    assert_eq!(
        game.apply_move(MoveSelector::Squares {
            from: Square::E4,
            to: Square::E5
        }),
        Err(MoveError::InvalidMoveNotation("e4e5".to_owned()))
    );
    assert_eq!(game, before);
}

#[test]
fn loose_notation() {
    let mut game = Game::new();
    play(&mut game, &["e4", "d6"]);
    let committed = game.apply_move("Bb5").unwrap();
    assert_eq!(committed.notation, "Bb5+");
    assert!(game.is_check());
    let mut game = Game::new();
    play(&mut game, &["e4", "d6", " Bb5+ ", "c6"]);
    assert_eq!(game.history_text(), "1.e4 d6 2.Bb5+ c6");
}

#[test]
fn en_passant() {
    let mut game = Game::new();
    play(&mut game, &["e4", "a6", "e5", "d5"]);
    assert!(sorted_moves(&game).contains(&"exd6 e.p."));

    let mut taken = game.clone();
    let committed = taken.apply_move("exd6").unwrap();
    assert_eq!(committed.notation, "exd6 e.p.");
    assert!(taken.board().occupant_at(Square::D5).is_none());
    assert_eq!(
        taken.board().occupant_at(Square::D6).unwrap().owner(),
        Player::White
    );

    // The opportunity is lost if not taken immediately.
    play(&mut game, &["Nf3", "a5"]);
    assert!(sorted_moves(&game).iter().all(|m| !m.starts_with("exd6")));
}

#[test]
fn en_passant_requires_double_step() {
    let mut game = Game::new();
    play(&mut game, &["e4", "d6", "e5", "a6", "a3", "d5"]);
    assert!(sorted_moves(&game).iter().all(|m| !m.contains("e.p.")));
}

#[test]
fn black_en_passant() {
    let mut game = setup("4k3/8/8/8/3p4/8/2P5/4K3 w - - 0 1");
    play(&mut game, &["c4"]);
    let committed = game.apply_move("dxc3").unwrap();
    assert_eq!(committed.notation, "dxc3 e.p.");
    assert_eq!(game.board().to_string(), "4k3/8/8/8/8/2p5/8/4K3");
}

#[test]
fn disambiguation_by_file() {
    let game = setup("4k3/8/8/8/R6R/8/8/4K3 w - - 0 1");
    let moves = sorted_moves(&game);
    assert!(moves.contains(&"Rad4"));
    assert!(moves.contains(&"Rhd4"));
    assert!(!moves.contains(&"Rd4"));
    // Unambiguous moves keep the short form.
    assert!(moves.contains(&"Ra8+"));
}

#[test]
fn disambiguation_by_rank() {
    let mut game = setup("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
    let moves = sorted_moves(&game);
    assert!(moves.contains(&"R1a3"));
    assert!(moves.contains(&"R5a3"));
    let committed = game.apply_move("R5a3").unwrap();
    assert_eq!(committed.notation, "R5a3");
    assert!(game.board().occupant_at(Square::A5).is_none());
    assert!(game.board().occupant_at(Square::A1).is_some());
}

#[test]
fn disambiguated_knights() {
    let mut game = setup("4k3/8/8/8/8/8/8/1N1K1N2 w - - 0 1");
    let moves = sorted_moves(&game);
    assert!(moves.contains(&"Nbd2"));
    assert!(moves.contains(&"Nfd2"));
    assert!(moves.contains(&"Kd2"));
    let committed = game.apply_move("Nfd2").unwrap();
    assert_eq!(committed.notation, "Nfd2");
    assert!(game.board().occupant_at(Square::F1).is_none());
    assert!(game.board().occupant_at(Square::B1).is_some());
}

#[test]
fn stalemate_is_checkmate() {
    let mut game = setup("k7/8/8/1Q6/8/8/8/7K w - - 0 1");
    let committed = game.apply_move("Qb6").unwrap();
    assert!(!committed.check);
    assert!(committed.checkmate);
    assert_eq!(committed.notation, "Qb6#");
    assert!(game.is_checkmate());
    assert!(!game.is_check());
}

#[test]
fn pawn_on_last_rank_does_not_promote() {
    let mut game = setup("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
    let _ = game.apply_move("a8").unwrap();
    assert_eq!(
        game.board().occupant_at(Square::A8).unwrap().kind(),
        PieceKind::Pawn
    );
    let _ = game.apply_move("Kd7").unwrap();
    assert!(sorted_moves(&game).iter().all(|m| !m.starts_with('a')));
}

#[test]
fn squares_select_moves() {
    let mut game = Game::new();
    let committed = game.apply_move("g1 f3").unwrap();
    assert_eq!(committed.notation, "Nf3");
    let committed = game.apply_move("e7e5").unwrap();
    assert_eq!(committed.notation, "e5");
    assert_eq!(game.turn(), 3);
}

#[test]
fn fen_round_trip() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34",
        "rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7",
        "r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7",
        "r3k3/5p2/2p5/p7/P3r3/2N2n2/1PP2P2/2K2B2 w q - 0 24",
        "8/8/8/8/2P5/3k4/8/KB6 b - c3 0 1",
    ] {
        assert_eq!(setup(fen).fen(), fen);
    }
    assert_eq!(
        setup("rnbqkb1r/pp2pppp/3p1n2/8/3NP3/2N5/PPP2PPP/R1BQKB1R b KQkq -").fen(),
        "rnbqkb1r/pp2pppp/3p1n2/8/3NP3/2N5/PPP2PPP/R1BQKB1R b KQkq - 0 1"
    );
}

#[test]
fn en_passant_from_fen() {
    let game = setup("rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7");
    assert_eq!(game.en_passant_square(), Some(Square::C6));
    // The e5 pawn is not next to c5: no en passant capture.
    assert!(sorted_moves(&game).iter().all(|m| !m.contains("e.p.")));
    let game = setup("8/8/8/8/2P5/3k4/8/KB6 b - c3 0 1");
    assert!(sorted_moves(&game).iter().all(|m| !m.contains("e.p.")));
    let game = setup("4k3/8/8/8/2Pp4/8/8/4K3 b - c3 0 1");
    assert!(sorted_moves(&game).contains(&"dxc3 e.p."));
}
