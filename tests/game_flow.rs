//! Scripted games against the public `Game` API.

use chess_core::config::GameConfig;
use chess_core::engine::moves::parse_coordinate;
use chess_core::engine::{Board, Color, DrawReason, Game, GameMode, GameStatus, PieceKind, Position};

fn sq(name: &str) -> Position {
    Position::from_algebraic(name).unwrap()
}

/// Play space-separated coordinate moves ("e2e4 e7e5 ..."), asserting each
/// one is accepted.
fn play(game: &mut Game, moves: &str) {
    for text in moves.split_whitespace() {
        let (start, end, promotion) = parse_coordinate(text).unwrap();
        let accepted = match promotion {
            None => game.move_piece(start, end),
            Some(kind) => {
                let mv = game
                    .legal_moves_from(start)
                    .into_iter()
                    .find(|m| m.end == end && m.promotion == Some(kind))
                    .unwrap_or_else(|| panic!("{text} not generated"));
                game.move_piece_with(&mv)
            }
        };
        assert!(accepted, "{text} rejected");
    }
}

fn game_from(placement: &str, side: Color) -> Game {
    Game::from_board(Board::from_placement(placement).unwrap(), side)
}

fn notations(game: &Game) -> Vec<String> {
    game.move_history().iter().map(|m| m.notation.clone()).collect()
}

// =====================================================================
// Opening and basic flow
// =====================================================================

#[test]
fn opening_push() {
    let mut game = Game::new();
    assert!(game.move_piece(Position::new(1, 4), Position::new(3, 4)));
    let board = game.board();
    assert!(board.piece_at(Position::new(1, 4)).is_none());
    let pawn = board.piece_at(Position::new(3, 4)).unwrap();
    assert_eq!((pawn.color, pawn.kind), (Color::White, PieceKind::Pawn));
    assert_eq!(game.halfmove_clock(), 0);
    assert_eq!(game.side_to_move(), Color::Black);
}

#[test]
fn italian_game_notation() {
    let mut game = Game::new();
    play(&mut game, "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 e1g1 g8f6 d2d3 e8g8");
    assert_eq!(
        notations(&game),
        ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O", "Nf6", "d3", "O-O"]
    );
    assert_eq!(game.board().placement(), "r1bq1rk1/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQ1RK1");
}

// =====================================================================
// Castling gating
// =====================================================================

fn can_castle_kingside(game: &Game) -> bool {
    game.legal_moves_from(sq("e1"))
        .iter()
        .any(|m| m.is_castling() && m.end == sq("g1"))
}

#[test]
fn castling_available_when_all_conditions_hold() {
    let game = game_from("4k3/8/8/8/8/8/8/4K2R", Color::White);
    assert!(can_castle_kingside(&game));
}

#[test]
fn castling_gated_by_each_condition() {
    // Piece between king and rook.
    assert!(!can_castle_kingside(&game_from("4k3/8/8/8/8/8/8/4K1NR", Color::White)));
    // King in check.
    assert!(!can_castle_kingside(&game_from("4r1k1/8/8/8/8/8/8/4K2R", Color::White)));
    // Pass-through square attacked.
    assert!(!can_castle_kingside(&game_from("5rk1/8/8/8/8/8/8/4K2R", Color::White)));
    // Destination attacked.
    assert!(!can_castle_kingside(&game_from("6rk/8/8/8/8/8/8/4K2R", Color::White)));
}

#[test]
fn castling_lost_after_king_or_rook_moves() {
    let mut game = game_from("4k3/8/8/8/8/8/8/4K2R", Color::White);
    play(&mut game, "h1h2 e8e7 h2h1 e7e8");
    assert_eq!(game.board().placement(), "4k3/8/8/8/8/8/8/4K2R");
    assert!(!can_castle_kingside(&game), "rook has moved");

    let mut game = game_from("4k3/8/8/8/8/8/8/4K2R", Color::White);
    play(&mut game, "e1e2 e8e7 e2e1 e7e8");
    assert!(!can_castle_kingside(&game), "king has moved");

    // Undoing the rook trip restores the right.
    let mut game = game_from("4k3/8/8/8/8/8/8/4K2R", Color::White);
    play(&mut game, "h1h2 e8e7 h2h1 e7e8");
    for _ in 0..4 {
        assert!(game.move_backward());
    }
    assert!(can_castle_kingside(&game));
}

// =====================================================================
// En passant window
// =====================================================================

#[test]
fn en_passant_only_on_the_next_ply() {
    let mut game = Game::new();
    play(&mut game, "e2e4 a7a6 e4e5 d7d5");
    assert!(
        game.legal_moves_from(sq("e5"))
            .iter()
            .any(|m| m.is_en_passant() && m.end == sq("d6"))
    );

    let mut later = game.clone();
    play(&mut later, "a2a3 a6a5");
    assert!(!later.legal_moves_from(sq("e5")).iter().any(|m| m.is_en_passant()));
    assert!(!later.move_piece(sq("e5"), sq("d6")));

    play(&mut game, "e5d6");
    assert!(game.board().piece_at(sq("d5")).is_none());
    assert_eq!(notations(&game).last().map(String::as_str), Some("exd6"));
}

// =====================================================================
// Promotion
// =====================================================================

#[test]
fn promotion_choices() {
    let mut game = game_from("4k3/P7/8/8/8/8/8/4K3", Color::White);
    play(&mut game, "a7a8r");
    let rook = game.board().piece_at(sq("a8")).unwrap();
    assert_eq!(rook.kind, PieceKind::Rook);
    assert_eq!(notations(&game), ["a8=R+"]);

    assert!(game.move_backward());
    assert_eq!(game.board().piece_at(sq("a7")).map(|p| p.kind), Some(PieceKind::Pawn));
    assert!(game.move_forward());
    assert_eq!(game.board().piece_at(sq("a8")).map(|p| p.kind), Some(PieceKind::Rook));
}

// =====================================================================
// Navigation and branch truncation
// =====================================================================

#[test]
fn round_trip_through_history_is_exact() {
    let mut game = Game::new();
    play(&mut game, "e2e4 d7d5 e4d5 g8f6 f1b5 c7c6 d5c6 d8d2 b1d2 b7c6 g1f3 c6b5 e1g1");
    let tail = game.board().clone();
    let tail_clock = game.halfmove_clock();

    while game.move_backward() {}
    assert_eq!(game.board(), &Board::new());
    assert_eq!(game.side_to_move(), Color::White);
    assert!(game.is_in_review_mode());

    while game.move_forward() {}
    assert_eq!(game.board(), &tail);
    assert_eq!(game.halfmove_clock(), tail_clock);
    assert!(!game.is_in_review_mode());
}

#[test]
fn review_mode_rejects_moves_until_tail() {
    let mut game = Game::new();
    play(&mut game, "e2e4 e7e5");
    assert!(game.move_backward());
    assert!(!game.move_piece(sq("e7"), sq("e6")));
    assert_eq!(game.move_history().len(), 2);
    assert!(game.move_forward());
    assert!(game.move_piece(sq("g1"), sq("f3")));
}

#[test]
fn branching_discards_later_moves() {
    let mut game = Game::new();
    play(&mut game, "e2e4 e7e5 g1f3 b8c6");
    assert!(game.set_current_move_index(Some(1)));
    game.reset_and_replay_moves();
    assert!(game.is_in_review_mode());
    game.resume_from_here();
    play(&mut game, "f1c4");
    assert_eq!(notations(&game), ["e4", "e5", "Bc4"]);
    assert_eq!(game.current_move_index(), Some(2));
    assert!(!game.can_move_forward());
}

// =====================================================================
// Draw rules
// =====================================================================

#[test]
fn fifty_move_rule_at_exactly_one_hundred() {
    let mut game = game_from("r3k3/8/8/8/8/8/8/R3K3", Color::White);
    // Rook shuffle: no pawn moves, no captures.
    let cycle = "a1a2 a8a7 a2a1 a7a8";
    for _ in 0..24 {
        play(&mut game, cycle);
    }
    play(&mut game, "a1a2 a8a7 a2a1");
    assert_eq!(game.halfmove_clock(), 99);
    assert!(!game.is_fifty_move_rule());
    play(&mut game, "a7a8");
    assert_eq!(game.halfmove_clock(), 100);
    assert!(game.is_fifty_move_rule());
}

#[test]
fn fifty_move_status_when_nothing_else_applies() {
    // The shuffle also repeats placements; the fifty-move rule is tested
    // before threefold repetition.
    let mut game = game_from("r3k3/8/8/8/8/8/8/R3K3", Color::White);
    for _ in 0..25 {
        play(&mut game, "a1a2 a8a7 a2a1 a7a8");
    }
    assert!(game.is_fifty_move_rule());
    assert!(game.is_threefold_repetition());
    assert_eq!(game.status(), GameStatus::Draw(DrawReason::FiftyMoveRule));
    assert_eq!(game.game_result(), "Game drawn by fifty-move rule!");
}

#[test]
fn pawn_move_or_capture_resets_clock() {
    let mut game = Game::new();
    play(&mut game, "g1f3 g8f6 f3g5");
    assert_eq!(game.halfmove_clock(), 3);
    play(&mut game, "h7h6");
    assert_eq!(game.halfmove_clock(), 0);
    play(&mut game, "g5f7");
    assert_eq!(game.halfmove_clock(), 0);
    play(&mut game, "e8f7");
    assert_eq!(game.halfmove_clock(), 0);
    play(&mut game, "b1c3");
    assert_eq!(game.halfmove_clock(), 1);
}

#[test]
fn threefold_repetition_by_knight_shuffle() {
    // Each cycle ends on the starting placement with White to move.
    let cycle = "g1f3 g8f6 f3g1 f6g8";
    let mut game = Game::new();
    play(&mut game, cycle);
    assert!(!game.is_threefold_repetition(), "start seen twice");
    play(&mut game, cycle);
    assert!(game.is_threefold_repetition());
    assert!(game.is_game_over());
    assert_eq!(game.game_result(), "Game drawn by threefold repetition!");
}

#[test]
fn insufficient_material_endings() {
    let kk = game_from("4k3/8/8/8/8/8/8/4K3", Color::White);
    assert!(kk.has_insufficient_material());
    assert_eq!(kk.status(), GameStatus::Draw(DrawReason::InsufficientMaterial));

    let kbk = game_from("4k3/8/8/8/8/8/8/2B1K3", Color::White);
    assert!(kbk.has_insufficient_material());

    let kqk = game_from("4k3/8/8/8/8/8/8/3QK3", Color::White);
    assert!(!kqk.has_insufficient_material());
    assert!(!kqk.is_game_over());
}

#[test]
fn capture_into_bare_kings_ends_the_game() {
    let mut game = game_from("4k3/8/8/8/8/8/4q3/4K3", Color::White);
    play(&mut game, "e1e2");
    assert!(game.is_game_over());
    assert_eq!(game.game_result(), "Game drawn due to insufficient material!");
}

// =====================================================================
// Session preferences
// =====================================================================

#[test]
fn config_carried_into_game() {
    let config = GameConfig::from_lookup(|key| match key {
        "CHESS_GAME_MODE" => Some("ai".to_string()),
        "CHESS_PLAYER_COLOR" => Some("black".to_string()),
        _ => None,
    });
    let mut game = Game::with_config(config);
    assert_eq!(game.game_mode(), GameMode::Ai);
    assert_eq!(game.player_color(), Color::Black);
    assert!(game.set_player_color("chartreuse").is_err());
    assert_eq!(game.player_color(), Color::Black);
}
