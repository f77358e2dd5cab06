//! Zobrist keys for repetition detection.
//!
//! A position is identified by piece placement plus side to move. Each
//! (color, kind, square) triple gets a random 64-bit key and Black to move
//! gets one more; the position key is the XOR of the keys that apply.
//! Moved-flags and en passant availability are not part of the key.

use std::sync::OnceLock;

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceKind, Position};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

pub struct ZobristKeys {
    /// piece\[color\]\[kind\]\[rank * 8 + file\].
    piece: [[[u64; 64]; PieceKind::COUNT]; 2],
    /// XOR'd in when Black is to move.
    black_to_move: u64,
}

static ZOBRIST: OnceLock<ZobristKeys> = OnceLock::new();

pub fn keys() -> &'static ZobristKeys {
    ZOBRIST.get_or_init(ZobristKeys::init)
}

impl ZobristKeys {
    /// Fixed seed, so keys are the same on every run.
    fn init() -> Self {
        let mut rng = Xorshift64::new(0x3243_F6A8_885A_308D);

        let mut piece = [[[0u64; 64]; PieceKind::COUNT]; 2];
        for color in &mut piece {
            for kind in color {
                for sq in kind {
                    *sq = rng.next_u64();
                }
            }
        }

        ZobristKeys {
            piece,
            black_to_move: rng.next_u64(),
        }
    }

    #[inline]
    pub fn piece_key(&self, color: Color, kind: PieceKind, pos: Position) -> u64 {
        let idx = (pos.rank() * 8 + pos.file()) as usize;
        self.piece[color.index()][kind.index()][idx]
    }

    #[inline]
    pub fn side_key(&self, side: Color) -> u64 {
        match side {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }
}

/// Key of `board`'s placement with `side` to move.
pub fn position_key(board: &Board, side: Color) -> u64 {
    let k = keys();
    board
        .pieces()
        .fold(k.side_key(side), |acc, (pos, piece)| {
            acc ^ k.piece_key(piece.color, piece.kind, pos)
        })
}

// ---------------------------------------------------------------------------
// Deterministic PRNG (xorshift64)
// ---------------------------------------------------------------------------

struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        // A zero state never leaves zero.
        Xorshift64 {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
