//! 8×8 mailbox board.
//!
//! `Board` owns every piece placed on it and remembers the most recently
//! executed move (en passant eligibility depends on it). It has no notion of
//! legality; `apply`/`revert` execute and undo a fully described `Move`, and
//! `probe` scopes a hypothetical move so it is always reverted.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::engine::moves::Move;
use crate::engine::types::{ChessError, Color, Piece, PieceKind, Position};

/// Back-rank order from the a-file to the h-file.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    /// `squares[rank][file]`.
    squares: [[Option<Piece>; 8]; 8],
    last_move: Option<Move>,
}

impl Board {
    /// Board in the standard starting position.
    pub fn new() -> Self {
        let mut board = Board::empty();
        board.initialize();
        board
    }

    /// Board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            last_move: None,
        }
    }

    /// Clear the grid and set up the standard starting position. The last
    /// move is cleared as well.
    pub fn initialize(&mut self) {
        self.squares = [[None; 8]; 8];
        self.last_move = None;
        for color in [Color::White, Color::Black] {
            let back = color.home_rank();
            let pawns = back + color.forward();
            for (file, kind) in BACK_RANK.iter().enumerate() {
                self.squares[back as usize][file] = Some(Piece::new(color, *kind));
                self.squares[pawns as usize][file] = Some(Piece::new(color, PieceKind::Pawn));
            }
        }
    }

    // -----------------------------------------------------------------
    // Grid access
    // -----------------------------------------------------------------

    #[inline]
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.is_valid()
    }

    /// The piece on `pos`; `None` for empty or off-board squares.
    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if pos.is_valid() {
            self.squares[pos.rank() as usize][pos.file() as usize]
        } else {
            None
        }
    }

    /// Place (or clear) a square. Off-board positions are ignored.
    #[inline]
    pub fn set_piece_at(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_valid() {
            self.squares[pos.rank() as usize][pos.file() as usize] = piece;
        }
    }

    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    #[inline]
    pub fn set_last_move(&mut self, mv: Option<Move>) {
        self.last_move = mv;
    }

    /// Deep copy: every piece is copied, the last move along with it.
    pub fn copy(&self) -> Board {
        self.clone()
    }

    /// All occupied squares, rank 0 first, a-file first within a rank.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(rank, row)| {
            row.iter().enumerate().filter_map(move |(file, cell)| {
                cell.map(|piece| (Position::new(rank as i8, file as i8), piece))
            })
        })
    }

    /// Occupied squares of one color, collected so the caller may mutate the
    /// board while walking them.
    pub fn pieces_of(&self, color: Color) -> Vec<(Position, Piece)> {
        self.pieces().filter(|(_, p)| p.color == color).collect()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, p)| p.is(color, PieceKind::King))
            .map(|(pos, _)| pos)
    }

    // -----------------------------------------------------------------
    // Execute / revert
    // -----------------------------------------------------------------

    /// Execute `mv` on the grid. The last-move pointer is left to the caller.
    pub fn apply(&mut self, mv: &Move) {
        if let Some(castle) = &mv.castling {
            self.set_piece_at(castle.rook_start, None);
            self.set_piece_at(castle.rook_end, Some(castle.rook.moved()));
        }
        if let Some(capture_sq) = mv.en_passant {
            self.set_piece_at(capture_sq, None);
        }
        self.set_piece_at(mv.start, None);
        self.set_piece_at(mv.end, Some(mv.landing_piece()));
    }

    /// Exact inverse of [`Board::apply`]: every touched square gets back the
    /// snapshot recorded in the move, moved-flags included.
    pub fn revert(&mut self, mv: &Move) {
        if let Some(capture_sq) = mv.en_passant {
            self.set_piece_at(mv.end, None);
            self.set_piece_at(capture_sq, mv.captured_piece);
        } else {
            self.set_piece_at(mv.end, mv.captured_piece);
        }
        self.set_piece_at(mv.start, Some(mv.moving_piece));
        if let Some(castle) = &mv.castling {
            self.set_piece_at(castle.rook_end, None);
            self.set_piece_at(castle.rook_start, Some(castle.rook));
        }
    }

    /// Execute `mv` hypothetically. The move becomes the last move while the
    /// returned guard lives; dropping the guard reverts the grid and restores
    /// the previous last move.
    pub fn probe(&mut self, mv: &Move) -> Probe<'_> {
        self.apply(mv);
        let previous = self.last_move.replace(mv.clone());
        Probe {
            board: self,
            previous,
        }
    }

    // -----------------------------------------------------------------
    // Placement text
    // -----------------------------------------------------------------

    /// Parse the piece-placement field of a FEN string, e.g.
    /// `"4k3/8/8/8/8/8/8/4K3"`. A piece counts as unmoved only if it stands
    /// where the standard setup puts that piece. Exactly one king per side
    /// is required.
    pub fn from_placement(placement: &str) -> Result<Self, ChessError> {
        let ranks: Vec<&str> = placement.trim().split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidPlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let standard = Board::new();
        let mut board = Board::empty();
        for (idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - idx as i8;
            let mut file: i8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidPlacement(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidPlacement(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as i8;
                } else if let Some((color, kind)) = PieceKind::from_char(ch) {
                    let pos = Position::new(rank, file);
                    let piece = Piece::new(color, kind);
                    let at_home = standard.piece_at(pos) == Some(piece);
                    board.set_piece_at(pos, Some(if at_home { piece } else { piece.moved() }));
                    file += 1;
                } else {
                    return Err(ChessError::InvalidPlacement(format!(
                        "invalid character '{ch}'"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "rank {} has {file} squares instead of 8",
                    rank + 1
                )));
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces()
                .filter(|(_, p)| p.is(color, PieceKind::King))
                .count();
            if kings != 1 {
                return Err(ChessError::InvalidPlacement(format!(
                    "{color} has {kings} kings (expected 1)"
                )));
            }
        }

        Ok(board)
    }

    /// Piece-placement field in FEN order (rank 8 first).
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0u8;
            for file in 0..8 {
                match self.piece_at(Position::new(rank, file)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        out.push(piece.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push((b'0' + empty) as char);
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// Render the board as an 8-line grid (rank 8 at top).
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank as u8) as char);
            s.push(' ');
            for file in 0..8 {
                let ch = self
                    .piece_at(Position::new(rank, file))
                    .map_or('.', Piece::symbol);
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// A hypothetical move in progress. Derefs to the board as it looks after
/// the move; the move is reverted when the guard drops.
pub struct Probe<'a> {
    board: &'a mut Board,
    previous: Option<Move>,
}

impl Deref for Probe<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Probe<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        let probed = std::mem::replace(&mut self.board.last_move, self.previous.take());
        if let Some(mv) = probed {
            self.board.revert(&mv);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
