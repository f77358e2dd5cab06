use crate::engine::types::{ChessError, Color, GameMode};

/// Session preferences, parsed from environment variables.
///
/// None of these change the rules; they are stored on the `Game` for
/// collaborators (menus, opponents) to read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Opponent kind (`CHESS_GAME_MODE`).
    pub mode: GameMode,
    /// Side the local player takes (`CHESS_PLAYER_COLOR`).
    pub player_color: Color,
    /// Whether both sides play on one device (`CHESS_PASS_AND_PLAY`).
    pub pass_and_play: bool,
}

impl GameConfig {
    /// Load configuration from environment variables. Missing or
    /// unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`GameConfig::from_env`], but unparseable values are errors.
    pub fn try_from_env() -> Result<Self, ChessError> {
        Self::try_from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = GameConfig::default();
        GameConfig {
            mode: lookup("CHESS_GAME_MODE")
                .and_then(|v| GameMode::from_str_loose(&v))
                .unwrap_or(defaults.mode),
            player_color: lookup("CHESS_PLAYER_COLOR")
                .and_then(|v| parse_player_color(&v).ok())
                .unwrap_or(defaults.player_color),
            pass_and_play: lookup("CHESS_PASS_AND_PLAY")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.pass_and_play),
        }
    }

    /// Build from an arbitrary key lookup; a present but bad value is an error.
    pub fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChessError> {
        let defaults = GameConfig::default();

        let mode = match lookup("CHESS_GAME_MODE") {
            Some(v) => GameMode::from_str_loose(&v)
                .ok_or_else(|| ChessError::InvalidConfig(format!("CHESS_GAME_MODE={v}")))?,
            None => defaults.mode,
        };
        let player_color = match lookup("CHESS_PLAYER_COLOR") {
            Some(v) => parse_player_color(&v)
                .map_err(|_| ChessError::InvalidConfig(format!("CHESS_PLAYER_COLOR={v}")))?,
            None => defaults.player_color,
        };
        let pass_and_play = match lookup("CHESS_PASS_AND_PLAY") {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| ChessError::InvalidConfig(format!("CHESS_PASS_AND_PLAY={v}")))?,
            None => defaults.pass_and_play,
        };

        Ok(GameConfig {
            mode,
            player_color,
            pass_and_play,
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            mode: GameMode::Local,
            player_color: Color::White,
            pass_and_play: false,
        }
    }
}

/// Resolve "white", "black" or "random" (case-insensitive) to a color.
pub fn parse_player_color(value: &str) -> Result<Color, ChessError> {
    if value.eq_ignore_ascii_case("random") {
        return Ok(if rand::random::<bool>() {
            Color::White
        } else {
            Color::Black
        });
    }
    Color::from_str_loose(value).ok_or_else(|| ChessError::InvalidColor(value.to_string()))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
