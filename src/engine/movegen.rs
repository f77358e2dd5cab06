//! Move generation.
//!
//! Pipeline:
//!   1. Each piece kind has a pseudo-legal generator, selected by `match`.
//!      Generated moves are fully resolved: captured piece, castling rook and
//!      en passant capture square are already attached.
//!   2. Legal filter: probe the move on the board, verify the mover's king is
//!      not attacked, let the probe revert it.

use crate::engine::attacks::{
    self, BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS,
};
use crate::engine::board::Board;
use crate::engine::moves::{CastlingInfo, Move};
use crate::engine::types::{Color, Piece, PieceKind, Position};

/// King file on the home rank; castling is only generated from here.
const KING_FILE: i8 = 4;

// =========================================================================
// Public API
// =========================================================================

/// Pseudo-legal moves of the piece on `from`; empty if the square is empty.
pub fn pseudo_legal_moves(board: &Board, from: Position) -> Vec<Move> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    let mut moves = Vec::with_capacity(28);
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece, &mut moves),
        PieceKind::Knight => leaper_moves(board, from, piece, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::Bishop => slider_moves(board, from, piece, &BISHOP_DIRECTIONS, &mut moves),
        PieceKind::Rook => slider_moves(board, from, piece, &ROOK_DIRECTIONS, &mut moves),
        PieceKind::Queen => {
            slider_moves(board, from, piece, &ROOK_DIRECTIONS, &mut moves);
            slider_moves(board, from, piece, &BISHOP_DIRECTIONS, &mut moves);
        }
        PieceKind::King => {
            leaper_moves(board, from, piece, &KING_OFFSETS, &mut moves);
            castling_moves(board, from, piece, &mut moves);
        }
    }
    moves
}

/// Whether `mv` leaves its mover's king unattacked.
pub fn is_safe(board: &mut Board, mv: &Move) -> bool {
    let color = mv.moving_piece.color;
    let after = board.probe(mv);
    !attacks::is_in_check(&after, color)
}

/// Legal moves of the piece on `from`.
pub fn legal_moves_from(board: &mut Board, from: Position) -> Vec<Move> {
    pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|mv| is_safe(board, mv))
        .collect()
}

/// All legal moves for `color`.
pub fn legal_moves(board: &mut Board, color: Color) -> Vec<Move> {
    let mut legal = Vec::new();
    for (from, _) in board.pieces_of(color) {
        legal.extend(legal_moves_from(board, from));
    }
    legal
}

/// Whether `color` has at least one legal move. Stops at the first one.
pub fn has_legal_move(board: &mut Board, color: Color) -> bool {
    board.pieces_of(color).into_iter().any(|(from, _)| {
        pseudo_legal_moves(board, from)
            .iter()
            .any(|mv| is_safe(board, mv))
    })
}

// =========================================================================
// Sliders and leapers
// =========================================================================

/// Walk each ray until the edge or the first occupied square; that square is
/// included only when it holds an enemy piece.
fn slider_moves(
    board: &Board,
    from: Position,
    piece: Piece,
    directions: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, df) in directions {
        let mut to = from.offset(dr, df);
        while to.is_valid() {
            match board.piece_at(to) {
                None => moves.push(Move::new(from, to, piece, None)),
                Some(target) => {
                    if target.color != piece.color {
                        moves.push(Move::new(from, to, piece, Some(target)));
                    }
                    break;
                }
            }
            to = to.offset(dr, df);
        }
    }
}

fn leaper_moves(
    board: &Board,
    from: Position,
    piece: Piece,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, df) in offsets {
        let to = from.offset(dr, df);
        if !to.is_valid() {
            continue;
        }
        match board.piece_at(to) {
            None => moves.push(Move::new(from, to, piece, None)),
            Some(target) if target.color != piece.color => {
                moves.push(Move::new(from, to, piece, Some(target)))
            }
            Some(_) => {}
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

fn castling_moves(board: &Board, from: Position, king: Piece, moves: &mut Vec<Move>) {
    let home = king.color.home_rank();
    if king.has_moved || from != Position::new(home, KING_FILE) {
        return;
    }
    let enemy = !king.color;

    // (rook file, squares that must be empty, king destination file, rook destination file)
    let sides: [(i8, &[i8], i8, i8); 2] = [(7, &[5, 6], 6, 5), (0, &[1, 2, 3], 2, 3)];

    for (rook_file, between, king_to, rook_to) in sides {
        let rook_start = Position::new(home, rook_file);
        let Some(rook) = board.piece_at(rook_start) else {
            continue;
        };
        if !rook.is(king.color, PieceKind::Rook) || rook.has_moved {
            continue;
        }
        if between
            .iter()
            .any(|&f| board.piece_at(Position::new(home, f)).is_some())
        {
            continue;
        }
        // Start, pass-through and destination must all be unthreatened.
        let pass = Position::new(home, rook_to);
        let end = Position::new(home, king_to);
        if [from, pass, end]
            .iter()
            .any(|&sq| is_threatened(board, sq, enemy))
        {
            continue;
        }
        let info = CastlingInfo {
            rook_start,
            rook_end: pass,
            rook,
        };
        moves.push(Move::castling(from, end, king, info));
    }
}

/// Whether some piece of `by` could move onto `target`: a pseudo-legal move
/// ending there, or for the king a square within one step. A pawn threatens
/// the squares it can push to and, on an occupied square, capture on.
fn is_threatened(board: &Board, target: Position, by: Color) -> bool {
    board.pieces().any(|(pos, piece)| {
        piece.color == by
            && match piece.kind {
                PieceKind::King => pos.distance(target) <= 1,
                _ => pseudo_legal_moves(board, pos)
                    .iter()
                    .any(|mv| mv.end == target),
            }
    })
}

// =========================================================================
// Pawns
// =========================================================================

fn pawn_moves(board: &Board, from: Position, pawn: Piece, moves: &mut Vec<Move>) {
    let color = pawn.color;
    let dir = color.forward();
    let start_rank = color.home_rank() + dir;

    // Forward pushes.
    let one = from.offset(dir, 0);
    if one.is_valid() && board.piece_at(one).is_none() {
        push_pawn_move(Move::new(from, one, pawn, None), moves);
        let two = from.offset(2 * dir, 0);
        if from.rank() == start_rank && board.piece_at(two).is_none() {
            moves.push(Move::new(from, two, pawn, None));
        }
    }

    // Diagonal captures.
    for df in [-1, 1] {
        let to = from.offset(dir, df);
        if let Some(target) = board.piece_at(to)
            && target.color != color
        {
            push_pawn_move(Move::new(from, to, pawn, Some(target)), moves);
        }
    }

    if let Some(mv) = en_passant(board, from, pawn) {
        moves.push(mv);
    }
}

/// Push `mv`, or its four promotion variants when it lands on the last rank.
fn push_pawn_move(mv: Move, moves: &mut Vec<Move>) {
    if mv.end.rank() == (!mv.moving_piece.color).home_rank() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(mv.clone().with_promotion(kind));
        }
    } else {
        moves.push(mv);
    }
}

/// En passant is available only on the ply right after an adjacent enemy
/// pawn's double push.
fn en_passant(board: &Board, from: Position, pawn: Piece) -> Option<Move> {
    let color = pawn.color;
    let dir = color.forward();
    if from.rank() != color.home_rank() + 4 * dir {
        return None;
    }
    let last = board.last_move()?;
    if !last.is_double_pawn_push()
        || last.moving_piece.color == color
        || last.end.rank() != from.rank()
        || (last.end.file() - from.file()).abs() != 1
    {
        return None;
    }
    let victim = board.piece_at(last.end)?;
    if !victim.is(!color, PieceKind::Pawn) {
        return None;
    }
    let to = Position::new(from.rank() + dir, last.end.file());
    if board.piece_at(to).is_some() {
        return None;
    }
    Some(Move::en_passant(from, to, pawn, last.end, victim))
}

// =========================================================================
// Tests
// =========================================================================
