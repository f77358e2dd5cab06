pub mod attacks;
pub mod board;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod san;
pub mod types;
pub mod zobrist;

pub use board::{Board, Probe};
pub use game::{Game, GameSnapshot, Player};
pub use moves::{CastlingInfo, Move};
pub use types::*;
