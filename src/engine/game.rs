//! Game orchestrator.
//!
//! `Game` owns the board, the move history and a cursor into it. Moves go
//! through a validate / finalize / commit pipeline that either commits the
//! whole move or leaves the game untouched. Backward and forward navigation
//! revert and re-apply history entries; while the cursor is behind the tail
//! the game is in review mode and new moves are rejected.
//!
//! Termination predicates are computed on demand from the current board.
//! Predicates taking `&self` work on a scratch copy of the board.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{self, GameConfig};
use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::movegen;
use crate::engine::moves::Move;
use crate::engine::san;
use crate::engine::types::{
    ChessError, Color, DrawReason, GameMode, GameStatus, PieceKind, Position,
};
use crate::engine::zobrist;

// =========================================================================
// Player
// =========================================================================

/// One side of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Player {
    pub color: Color,
}

// =========================================================================
// GameSnapshot
// =========================================================================

/// Read-only view of a game for presentation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Row-major, rank 8 first. Empty squares are empty strings, pieces are
    /// codes like "wP" or "bK".
    pub board: [[String; 8]; 8],
    pub side_to_move: Color,
    pub history: Vec<String>,
    pub current_move_index: Option<usize>,
    pub in_review: bool,
    pub halfmove_clock: u32,
    pub status: GameStatus,
    pub result: String,
}

// =========================================================================
// Game
// =========================================================================

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    /// Board the history is replayed from.
    starting_board: Board,
    starting_side: Color,
    white: Player,
    black: Player,
    current: Color,
    move_history: Vec<Move>,
    /// Number of history entries applied to `board`.
    cursor: usize,
    in_review: bool,
    /// Plies since the last pawn move or capture.
    halfmove_clock: u32,

    // Session preferences
    mode: GameMode,
    player_color: Color,
    pass_and_play: bool,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// New game from the standard starting position.
    pub fn new() -> Self {
        Self::from_board(Board::new(), Color::White)
    }

    /// New game from the standard starting position with the given
    /// session preferences.
    pub fn with_config(config: GameConfig) -> Self {
        let mut game = Self::new();
        game.mode = config.mode;
        game.player_color = config.player_color;
        game.pass_and_play = config.pass_and_play;
        game
    }

    /// New game from an arbitrary board with `side` to move. `reset` and
    /// replays return to this board.
    pub fn from_board(board: Board, side: Color) -> Self {
        let defaults = GameConfig::default();
        Game {
            starting_board: board.clone(),
            board,
            starting_side: side,
            white: Player {
                color: Color::White,
            },
            black: Player {
                color: Color::Black,
            },
            current: side,
            move_history: Vec::new(),
            cursor: 0,
            in_review: false,
            halfmove_clock: 0,
            mode: defaults.mode,
            player_color: defaults.player_color,
            pass_and_play: defaults.pass_and_play,
        }
    }

    // -----------------------------------------------------------------
    // Session preferences
    // -----------------------------------------------------------------

    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn game_mode(&self) -> GameMode {
        self.mode
    }

    /// Accepts "white", "black" or "random", case-insensitive.
    pub fn set_player_color(&mut self, color: &str) -> Result<(), ChessError> {
        self.player_color = config::parse_player_color(color)?;
        Ok(())
    }

    pub fn player_color(&self) -> Color {
        self.player_color
    }

    pub fn set_pass_and_play(&mut self, enabled: bool) {
        self.pass_and_play = enabled;
    }

    pub fn is_pass_and_play(&self) -> bool {
        self.pass_and_play
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Player {
        self.player(self.current)
    }

    pub fn player(&self, color: Color) -> Player {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.current
    }

    /// Every recorded move, including those after the cursor.
    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    /// Index of the last applied move; `None` before the first move.
    pub fn current_move_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    pub fn is_in_review_mode(&self) -> bool {
        self.in_review
    }

    /// The move at the cursor.
    pub fn last_move(&self) -> Option<&Move> {
        self.current_move_index().map(|i| &self.move_history[i])
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Material balance: pawn 1, knight and bishop 3, rook 5, queen 9.
    /// Positive favors White.
    pub fn evaluate_position(&self) -> i32 {
        self.board
            .pieces()
            .map(|(_, p)| match p.color {
                Color::White => p.kind.value(),
                Color::Black => -p.kind.value(),
            })
            .sum()
    }

    /// Legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&mut self.board.clone(), self.current)
    }

    /// Legal moves of the piece on `pos`, whichever side it belongs to.
    pub fn legal_moves_from(&self, pos: Position) -> Vec<Move> {
        movegen::legal_moves_from(&mut self.board.clone(), pos)
    }

    // -----------------------------------------------------------------
    // Making moves
    // -----------------------------------------------------------------

    /// Move the piece on `start` to `end`. A pawn reaching the last rank
    /// becomes a queen. Returns `false`, leaving the game untouched, if the
    /// move is not legal for the side to move or the game is in review.
    pub fn move_piece(&mut self, start: Position, end: Position) -> bool {
        self.try_move(start, end, None)
    }

    /// Commit a move described by the caller. Only its squares and promotion
    /// choice are read; the move is validated exactly like
    /// [`Game::move_piece`], and a promotion on a move that does not reach
    /// the last rank is rejected.
    pub fn move_piece_with(&mut self, mv: &Move) -> bool {
        self.try_move(mv.start, mv.end, mv.promotion)
    }

    fn try_move(&mut self, start: Position, end: Position, promotion: Option<PieceKind>) -> bool {
        match self.validate(start, end, promotion) {
            Ok(mv) => {
                let (mv, opponent_can_move) = self.finalize(mv);
                self.commit(mv, opponent_can_move);
                true
            }
            Err(reason) => {
                debug!(%start, %end, reason, "move rejected");
                false
            }
        }
    }

    /// Resolve the request to one of the piece's generated moves and check
    /// that it leaves the mover's king safe.
    fn validate(
        &mut self,
        start: Position,
        end: Position,
        promotion: Option<PieceKind>,
    ) -> Result<Move, &'static str> {
        if self.in_review {
            return Err("game is in review mode");
        }
        let piece = self.board.piece_at(start).ok_or("no piece on start square")?;
        if piece.color != self.current {
            return Err("piece does not belong to the side to move");
        }
        let mut candidates = movegen::pseudo_legal_moves(&self.board, start)
            .into_iter()
            .filter(|m| m.end == end);
        let mv = match promotion {
            // Promotion variants come queen first.
            None => candidates.next(),
            Some(kind) => candidates.find(|m| m.promotion == Some(kind)),
        }
        .ok_or("not a move of this piece")?;
        if !movegen::is_safe(&mut self.board, &mv) {
            return Err("move leaves own king in check");
        }
        Ok(mv)
    }

    /// Set the check flags from the position after the move, then the
    /// notation. Also returns whether the opponent has a legal reply.
    fn finalize(&mut self, mut mv: Move) -> (Move, bool) {
        let opponent = !self.current;
        let can_move = {
            let mut after = self.board.probe(&mv);
            mv.is_check = attacks::is_in_check(&after, opponent);
            movegen::has_legal_move(&mut after, opponent)
        };
        mv.is_checkmate = mv.is_check && !can_move;
        mv.notation = san::notation(&mv);
        (mv, can_move)
    }

    fn commit(&mut self, mv: Move, opponent_can_move: bool) {
        let check = mv.is_check;
        self.board.apply(&mv);
        if mv.moving_piece.kind == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        // Anything after the cursor is an abandoned branch.
        self.move_history.truncate(self.cursor);
        self.move_history.push(mv.clone());
        self.cursor = self.move_history.len();
        self.in_review = false;

        debug!(
            notation = %mv.notation,
            halfmove_clock = self.halfmove_clock,
            "move committed"
        );
        self.board.set_last_move(Some(mv));
        self.current = !self.current;

        let status = self.classify(check, opponent_can_move);
        if status.is_game_over() {
            info!(result = %self.result_text(status), "game over");
        }
    }

    /// Whether moving the piece on `start` to `end` would leave that piece's
    /// own king attacked. The game is not modified. Squares that are not a
    /// generated move of the piece are tested as a plain relocation.
    pub fn would_put_king_in_check(&self, start: Position, end: Position) -> bool {
        let Some(piece) = self.board.piece_at(start) else {
            return false;
        };
        let mut scratch = self.board.clone();
        let mv = movegen::pseudo_legal_moves(&scratch, start)
            .into_iter()
            .find(|m| m.end == end)
            .unwrap_or_else(|| Move::new(start, end, piece, scratch.piece_at(end)));
        !movegen::is_safe(&mut scratch, &mv)
    }

    // -----------------------------------------------------------------
    // Termination
    // -----------------------------------------------------------------

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        attacks::is_in_check(&self.board, self.current)
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_move()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_move()
    }

    fn has_legal_move(&self) -> bool {
        movegen::has_legal_move(&mut self.board.clone(), self.current)
    }

    /// Bare kings; a king and one bishop or knight against a bare king; or
    /// four pieces two of which are bishops, all standing on squares with an
    /// even rank + file sum.
    pub fn has_insufficient_material(&self) -> bool {
        let pieces: Vec<_> = self.board.pieces().collect();
        match pieces.len() {
            2 => true,
            3 => pieces
                .iter()
                .filter(|(_, p)| p.kind != PieceKind::King)
                .all(|(_, p)| matches!(p.kind, PieceKind::Bishop | PieceKind::Knight)),
            4 => {
                let bishops: Vec<Position> = pieces
                    .iter()
                    .filter(|(_, p)| p.kind == PieceKind::Bishop)
                    .map(|(pos, _)| *pos)
                    .collect();
                bishops.len() == 2
                    && bishops
                        .iter()
                        .all(|pos| (pos.rank() + pos.file()) % 2 == 0)
            }
            _ => false,
        }
    }

    pub fn is_fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Replays the applied history from the starting board, counting each
    /// placement + side-to-move key; true once any key is seen three times.
    pub fn is_threefold_repetition(&self) -> bool {
        let mut board = self.starting_board.clone();
        let mut side = self.starting_side;
        let mut seen: HashMap<u64, u32> = HashMap::new();
        seen.insert(zobrist::position_key(&board, side), 1);

        for mv in &self.move_history[..self.cursor] {
            board.apply(mv);
            side = !side;
            let count = seen.entry(zobrist::position_key(&board, side)).or_insert(0);
            *count += 1;
            if *count >= 3 {
                return true;
            }
        }
        false
    }

    /// Status of the side to move. Checkmate and stalemate win over the
    /// draw rules, which are tested in the order insufficient material,
    /// fifty-move rule, threefold repetition.
    pub fn status(&self) -> GameStatus {
        self.classify(self.is_check(), self.has_legal_move())
    }

    /// Status of the side to move, given whether it is in check and whether
    /// it has a legal move.
    fn classify(&self, check: bool, can_move: bool) -> GameStatus {
        if !can_move {
            return if check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.has_insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if self.is_fifty_move_rule() {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else if self.is_threefold_repetition() {
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        } else if check {
            GameStatus::Check
        } else {
            GameStatus::Active
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_game_over()
    }

    /// Human-readable result, e.g. "White wins by checkmate!".
    pub fn game_result(&self) -> String {
        self.result_text(self.status())
    }

    fn result_text(&self, status: GameStatus) -> String {
        match status {
            GameStatus::Checkmate => format!("{} wins by checkmate!", !self.current),
            GameStatus::Stalemate => "Game drawn by stalemate!".to_string(),
            GameStatus::Draw(DrawReason::InsufficientMaterial) => {
                "Game drawn due to insufficient material!".to_string()
            }
            GameStatus::Draw(DrawReason::FiftyMoveRule) => {
                "Game drawn by fifty-move rule!".to_string()
            }
            GameStatus::Draw(DrawReason::ThreefoldRepetition) => {
                "Game drawn by threefold repetition!".to_string()
            }
            GameStatus::Active | GameStatus::Check => "Game in progress".to_string(),
        }
    }

    // -----------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------

    pub fn can_move_backward(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_move_forward(&self) -> bool {
        self.cursor < self.move_history.len()
    }

    /// Undo the move at the cursor and enter review mode.
    pub fn move_backward(&mut self) -> bool {
        if !self.can_move_backward() {
            return false;
        }
        self.board.revert(&self.move_history[self.cursor - 1]);
        self.cursor -= 1;
        let last = self.last_move_at(self.cursor);
        self.board.set_last_move(last);
        self.current = !self.current;
        self.in_review = true;
        self.recompute_clock();
        debug!(cursor = self.cursor, "moved backward");
        true
    }

    /// Re-apply the next history entry. Review mode ends at the tail.
    pub fn move_forward(&mut self) -> bool {
        if !self.can_move_forward() {
            return false;
        }
        self.board.apply(&self.move_history[self.cursor]);
        self.cursor += 1;
        let last = self.last_move_at(self.cursor);
        self.board.set_last_move(last);
        self.current = !self.current;
        self.in_review = self.cursor < self.move_history.len();
        self.recompute_clock();
        debug!(cursor = self.cursor, "moved forward");
        true
    }

    /// Jump to the position after the move at `index` (`None` for the
    /// position before the first move), rebuilding the board by replay. The
    /// game is in review mode unless `index` is the last move. Out-of-range
    /// indices are ignored and return `false`.
    pub fn set_current_move_index(&mut self, index: Option<usize>) -> bool {
        let cursor = index.map_or(0, |i| i + 1);
        if cursor > self.move_history.len() {
            return false;
        }
        self.cursor = cursor;
        self.replay_to_cursor();
        true
    }

    /// Rebuild the board from the starting board by replaying every history
    /// entry up to the cursor.
    pub fn reset_and_replay_moves(&mut self) {
        self.replay_to_cursor();
    }

    fn replay_to_cursor(&mut self) {
        self.board = self.starting_board.clone();
        for mv in &self.move_history[..self.cursor] {
            self.board.apply(mv);
        }
        let last = self.last_move_at(self.cursor);
        self.board.set_last_move(last);
        self.current = self.side_after(self.cursor);
        self.in_review = self.cursor < self.move_history.len();
        self.recompute_clock();
        debug!(cursor = self.cursor, "replayed history");
    }

    /// Return to the starting board. History is kept, so the game enters
    /// review mode if there is any.
    pub fn reset(&mut self) {
        self.board = self.starting_board.clone();
        self.current = self.starting_side;
        self.cursor = 0;
        self.halfmove_clock = 0;
        self.in_review = !self.move_history.is_empty();
        debug!(history = self.move_history.len(), "reset");
    }

    /// Leave review mode at the current position. The next committed move
    /// discards the history after the cursor.
    pub fn resume_from_here(&mut self) {
        self.in_review = false;
    }

    /// Last move on the board once `plies` history entries are applied.
    fn last_move_at(&self, plies: usize) -> Option<Move> {
        match plies.checked_sub(1) {
            Some(i) => self.move_history.get(i).cloned(),
            None => self.starting_board.last_move().cloned(),
        }
    }

    fn side_after(&self, plies: usize) -> Color {
        if plies % 2 == 0 {
            self.starting_side
        } else {
            !self.starting_side
        }
    }

    fn recompute_clock(&mut self) {
        self.halfmove_clock = self.move_history[..self.cursor]
            .iter()
            .rev()
            .take_while(|m| m.moving_piece.kind != PieceKind::Pawn && !m.is_capture())
            .count() as u32;
    }

    // -----------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------

    pub fn snapshot(&self) -> GameSnapshot {
        let board = std::array::from_fn(|row| {
            std::array::from_fn(|file| {
                self.board
                    .piece_at(Position::new(7 - row as i8, file as i8))
                    .map(|p| p.code())
                    .unwrap_or_default()
            })
        });
        GameSnapshot {
            board,
            side_to_move: self.current,
            history: self.move_history.iter().map(|m| m.notation.clone()).collect(),
            current_move_index: self.current_move_index(),
            in_review: self.in_review,
            halfmove_clock: self.halfmove_clock,
            status: self.status(),
            result: self.game_result(),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
