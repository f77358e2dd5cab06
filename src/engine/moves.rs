//! The `Move` value type.
//!
//! A move is created by a piece's generator with everything the board needs
//! to execute and revert it: snapshots of the moving and captured pieces, the
//! rook transition for castling, the capture square for en passant and the
//! promotion choice. The game fills in the check flags and the notation once
//! the move is finalized.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::engine::types::{ChessError, Piece, PieceKind, Position};

/// Rook transition that accompanies a castling king move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastlingInfo {
    pub rook_start: Position,
    pub rook_end: Position,
    /// Snapshot of the rook before it moved.
    pub rook: Piece,
}

/// A chess move.
///
/// Equality and hashing only look at `start` and `end`: a move is matched
/// against the candidate set by its squares, so promotion alternatives with
/// the same squares compare equal.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub start: Position,
    pub end: Position,
    /// Snapshot of the moving piece, moved-flag as it was before the move.
    pub moving_piece: Piece,
    /// Snapshot of the captured piece. For en passant this is the pawn on
    /// `en_passant`, not anything on `end`.
    pub captured_piece: Option<Piece>,
    pub castling: Option<CastlingInfo>,
    /// Square of the pawn removed by an en passant capture.
    pub en_passant: Option<Position>,
    pub promotion: Option<PieceKind>,
    pub is_check: bool,
    pub is_checkmate: bool,
    /// Algebraic notation; empty until the move is finalized.
    pub notation: String,
}

impl Move {
    /// A plain move of `piece` capturing whatever `captured` is.
    pub fn new(start: Position, end: Position, piece: Piece, captured: Option<Piece>) -> Self {
        Move {
            start,
            end,
            moving_piece: piece,
            captured_piece: captured,
            castling: None,
            en_passant: None,
            promotion: None,
            is_check: false,
            is_checkmate: false,
            notation: String::new(),
        }
    }

    /// A king move that also relocates a rook.
    pub fn castling(start: Position, end: Position, king: Piece, info: CastlingInfo) -> Self {
        Move {
            castling: Some(info),
            ..Move::new(start, end, king, None)
        }
    }

    /// A pawn capture whose victim sits on `capture_square` rather than `end`.
    pub fn en_passant(
        start: Position,
        end: Position,
        pawn: Piece,
        capture_square: Position,
        captured: Piece,
    ) -> Self {
        Move {
            en_passant: Some(capture_square),
            ..Move::new(start, end, pawn, Some(captured))
        }
    }

    /// The same move with a promotion choice attached.
    pub fn with_promotion(self, kind: PieceKind) -> Self {
        Move {
            promotion: Some(kind),
            ..self
        }
    }

    #[inline]
    pub fn is_castling(&self) -> bool {
        self.castling.is_some()
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.en_passant.is_some()
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    /// Whether this is a pawn advancing two ranks.
    pub fn is_double_pawn_push(&self) -> bool {
        self.moving_piece.kind == PieceKind::Pawn
            && (self.end.rank() - self.start.rank()).abs() == 2
    }

    /// The piece standing on `end` once the move has been executed.
    pub fn landing_piece(&self) -> Piece {
        match self.promotion {
            Some(kind) => Piece::new(self.moving_piece.color, kind).moved(),
            None => match self.moving_piece.kind {
                PieceKind::King | PieceKind::Rook => self.moving_piece.moved(),
                _ => self.moving_piece,
            },
        }
    }

    /// Coordinate form, e.g. "e2e4" or "e7e8q".
    pub fn coordinate(&self) -> String {
        let mut s = format!("{}{}", self.start, self.end);
        if let Some(kind) = self.promotion {
            s.push(kind.letter().to_ascii_lowercase());
        }
        s
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.notation.is_empty() {
            write!(f, "{}", self.coordinate())
        } else {
            write!(f, "{}", self.notation)
        }
    }
}

/// Parse coordinate move text such as "e2e4" or "e7e8q" into
/// `(start, end, promotion)`.
pub fn parse_coordinate(text: &str) -> Result<(Position, Position, Option<PieceKind>), ChessError> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(ChessError::InvalidMoveText(text.to_string()));
    }
    let start = Position::from_algebraic(&text[0..2])
        .ok_or_else(|| ChessError::InvalidSquare(text[0..2].to_string()))?;
    let end = Position::from_algebraic(&text[2..4])
        .ok_or_else(|| ChessError::InvalidSquare(text[2..4].to_string()))?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(c) => match PieceKind::from_char(c) {
            Some((_, kind)) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
            _ => return Err(ChessError::InvalidMoveText(text.to_string())),
        },
    };
    Ok((start, end, promotion))
}
