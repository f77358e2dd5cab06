//! Algebraic notation for finalized moves.
//!
//! Examples: `e4`, `Nf3`, `Bxe5`, `exd6`, `O-O`, `e8=Q+`, `Qxf7#`.
//!
//! No file/rank qualifier is emitted when two like pieces can reach the same
//! square; `Nd2` is written even if both knights could go there.

use crate::engine::moves::Move;
use crate::engine::types::PieceKind;

// =========================================================================
// Notation
// =========================================================================

/// Notation of `mv`, using its `is_check` / `is_checkmate` flags for the
/// suffix. The flags must already be set.
pub fn notation(mv: &Move) -> String {
    let mut san = String::with_capacity(8);

    if let Some(castle) = &mv.castling {
        if castle.rook_start.file() > mv.start.file() {
            san.push_str("O-O");
        } else {
            san.push_str("O-O-O");
        }
    } else {
        let piece = mv.moving_piece.kind;
        let is_pawn = piece == PieceKind::Pawn;
        if !is_pawn {
            san.push(piece.letter());
        }
        if mv.is_capture() || (is_pawn && mv.start.file() != mv.end.file()) {
            if is_pawn {
                san.push(mv.start.file_char());
            }
            san.push('x');
        }
        san.push_str(&mv.end.to_algebraic());
        if let Some(kind) = mv.promotion {
            san.push('=');
            san.push(kind.letter());
        }
    }

    if mv.is_checkmate {
        san.push('#');
    } else if mv.is_check {
        san.push('+');
    }
    san
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::Board;
    use crate::engine::movegen;
    use crate::engine::types::Position;

    fn sq(name: &str) -> Position {
        Position::from_algebraic(name).unwrap()
    }

    /// Generated move `from`-`to` on the board given by `placement`.
    fn generated(placement: &str, from: &str, to: &str) -> Move {
        let board = Board::from_placement(placement).unwrap();
        movegen::pseudo_legal_moves(&board, sq(from))
            .into_iter()
            .find(|m| m.end == sq(to))
            .unwrap()
    }

    // -------------------------------------------------------------------
    // Pawns
    // -------------------------------------------------------------------

    #[test]
    fn pawn_push() {
        let mv = generated("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", "e2", "e4");
        assert_eq!(notation(&mv), "e4");
    }

    #[test]
    fn pawn_capture() {
        let mv = generated("4k3/8/8/3p4/4P3/8/8/4K3", "e4", "d5");
        assert_eq!(notation(&mv), "exd5");
    }

    #[test]
    fn en_passant_reads_like_a_pawn_capture() {
        let mut board = Board::from_placement("4k3/3p4/8/4P3/8/8/8/4K3").unwrap();
        let push = movegen::pseudo_legal_moves(&board, sq("d7"))
            .into_iter()
            .find(|m| m.end == sq("d5"))
            .unwrap();
        board.apply(&push);
        board.set_last_move(Some(push));
        let ep = movegen::pseudo_legal_moves(&board, sq("e5"))
            .into_iter()
            .find(Move::is_en_passant)
            .unwrap();
        assert_eq!(notation(&ep), "exd6");
    }

    #[test]
    fn promotion_suffix() {
        let mv = generated("7k/4P3/8/8/8/8/8/K7", "e7", "e8");
        assert_eq!(mv.promotion, Some(PieceKind::Queen));
        assert_eq!(notation(&mv), "e8=Q");
        let under = mv.with_promotion(PieceKind::Knight);
        assert_eq!(notation(&under), "e8=N");
    }

    #[test]
    fn promotion_capture_with_check() {
        let mut mv = generated("3r3k/4P3/8/8/8/8/8/K7", "e7", "d8");
        mv.is_check = true;
        assert_eq!(notation(&mv), "exd8=Q+");
    }

    // -------------------------------------------------------------------
    // Pieces
    // -------------------------------------------------------------------

    #[test]
    fn knight_move() {
        let mv = generated("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", "g1", "f3");
        assert_eq!(notation(&mv), "Nf3");
    }

    #[test]
    fn bishop_capture() {
        let mv = generated("4k3/8/8/4p3/8/8/1B6/4K3", "b2", "e5");
        assert_eq!(notation(&mv), "Bxe5");
    }

    #[test]
    fn no_disambiguation() {
        let mv = generated("4k3/8/8/8/8/8/8/R3K2R", "a1", "d1");
        assert_eq!(notation(&mv), "Rd1");
    }

    // -------------------------------------------------------------------
    // Castling
    // -------------------------------------------------------------------

    #[test]
    fn castling_kingside() {
        let mv = generated("4k3/8/8/8/8/8/8/4K2R", "e1", "g1");
        assert_eq!(notation(&mv), "O-O");
    }

    #[test]
    fn castling_queenside() {
        let mv = generated("r3k3/8/8/8/8/8/8/4K3", "e8", "c8");
        assert_eq!(notation(&mv), "O-O-O");
    }

    // -------------------------------------------------------------------
    // Suffixes
    // -------------------------------------------------------------------

    #[test]
    fn check_and_mate_suffixes() {
        let mut mv = generated("4k3/8/8/8/8/8/8/Q3K3", "a1", "a8");
        mv.is_check = true;
        assert_eq!(notation(&mv), "Qa8+");
        mv.is_checkmate = true;
        assert_eq!(notation(&mv), "Qa8#");
    }
}
