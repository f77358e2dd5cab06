//! Attack detection on the mailbox board.
//!
//! The offset and ray tables here are shared with the move generators.
//! Attack tests scan outward from the target square instead of generating
//! every opposing move: a slider attacks the square iff the first piece met
//! on a matching ray is that slider. Kings and knights are tested through
//! their offset tables and pawns by their diagonal capture squares, so no
//! check test ever recurses into castling generation.

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceKind, Position};

// =========================================================================
// Offsets and rays
// =========================================================================

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// =========================================================================
// Public API
// =========================================================================

/// Whether any piece of color `by` attacks `target`.
pub fn is_square_attacked(board: &Board, target: Position, by: Color) -> bool {
    // Pawns of `by` sit one rank behind the square they attack.
    let pawn_rank = -by.forward();
    for df in [-1, 1] {
        if let Some(p) = board.piece_at(target.offset(pawn_rank, df)) {
            if p.is(by, PieceKind::Pawn) {
                return true;
            }
        }
    }

    for (dr, df) in KNIGHT_OFFSETS {
        if let Some(p) = board.piece_at(target.offset(dr, df)) {
            if p.is(by, PieceKind::Knight) {
                return true;
            }
        }
    }

    for (dr, df) in KING_OFFSETS {
        if let Some(p) = board.piece_at(target.offset(dr, df)) {
            if p.is(by, PieceKind::King) {
                return true;
            }
        }
    }

    ray_hits(board, target, by, &ROOK_DIRECTIONS, PieceKind::Rook)
        || ray_hits(board, target, by, &BISHOP_DIRECTIONS, PieceKind::Bishop)
}

/// Whether `color`'s king is attacked. A board with no such king is never
/// in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king) => is_square_attacked(board, king, !color),
        None => false,
    }
}

// =========================================================================
// Ray scan
// =========================================================================

/// Walk each ray from `target`; the first piece met attacks along it iff it
/// belongs to `by` and is a `slider` or a queen.
fn ray_hits(
    board: &Board,
    target: Position,
    by: Color,
    directions: &[(i8, i8)],
    slider: PieceKind,
) -> bool {
    for &(dr, df) in directions {
        let mut pos = target.offset(dr, df);
        while pos.is_valid() {
            if let Some(p) = board.piece_at(pos) {
                if p.color == by && (p.kind == slider || p.kind == PieceKind::Queen) {
                    return true;
                }
                break;
            }
            pos = pos.offset(dr, df);
        }
    }
    false
}

// =========================================================================
// Tests
// =========================================================================
