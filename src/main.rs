use std::io::{self, BufRead, Write};

use chess_core::config::GameConfig;
use chess_core::engine::Game;
use chess_core::engine::moves::parse_coordinate;

const HELP: &str = "\
moves:    e2e4, e7e8q (promotion letter q/r/b/n)
commands: back, fwd, reset, replay, board, moves, json, help, quit";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_core=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = GameConfig::from_env();
    let mut game = Game::with_config(config);

    tracing::info!(
        "chess-core v{} ({} mode, playing {})",
        env!("CARGO_PKG_VERSION"),
        config.mode,
        config.player_color
    );

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    writeln!(out, "{}\n\n{HELP}", game.board())?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" => break,
            "help" => writeln!(out, "{HELP}")?,
            "board" => writeln!(out, "{}", game.board())?,
            "back" => {
                if !game.move_backward() {
                    writeln!(out, "already at the first position")?;
                }
                writeln!(out, "{}", game.board())?;
            }
            "fwd" => {
                if !game.move_forward() {
                    writeln!(out, "already at the last position")?;
                }
                writeln!(out, "{}", game.board())?;
            }
            "reset" => {
                game.reset();
                writeln!(out, "{}", game.board())?;
            }
            "replay" => {
                game.reset_and_replay_moves();
                writeln!(out, "{}", game.board())?;
            }
            "moves" => {
                let moves: Vec<String> = game.legal_moves().iter().map(|m| m.coordinate()).collect();
                writeln!(out, "{}", moves.join(" "))?;
            }
            "json" => writeln!(out, "{}", serde_json::to_string_pretty(&game.snapshot())?)?,
            text => match parse_coordinate(text) {
                Err(e) => writeln!(out, "{e}")?,
                Ok((start, end, promotion)) => {
                    let accepted = match promotion {
                        None => game.move_piece(start, end),
                        Some(kind) => game
                            .legal_moves_from(start)
                            .into_iter()
                            .find(|m| m.end == end && m.promotion == Some(kind))
                            .is_some_and(|mv| game.move_piece_with(&mv)),
                    };
                    if !accepted {
                        let reason = if game.is_in_review_mode() {
                            "reviewing history; use fwd to return to the last move"
                        } else {
                            "illegal move"
                        };
                        writeln!(out, "{reason}")?;
                        continue;
                    }
                    if let Some(mv) = game.last_move() {
                        writeln!(out, "{}. {mv}", game.move_history().len().div_ceil(2))?;
                    }
                    writeln!(out, "{}", game.board())?;
                    if game.is_game_over() {
                        writeln!(out, "{}", game.game_result())?;
                    }
                }
            },
        }
    }

    Ok(())
}
