use std::time::Duration;

/// Tunable knobs for a session. Defaults match the classic table rules;
/// both can be overridden from the environment (loaded via dotenvy in
/// the binary).
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Minimum roster size required by `start`.
    pub min_players: usize,
    /// Speaking window granted to each participant during discussion.
    pub discussion_turn: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 5,
            discussion_turn: Duration::from_secs(5),
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("MAFIA_MIN_PLAYERS") {
            if let Ok(n) = value.parse() {
                config.min_players = n;
            }
        }
        if let Ok(value) = std::env::var("MAFIA_DISCUSSION_SECS") {
            if let Ok(secs) = value.parse() {
                config.discussion_turn = Duration::from_secs(secs);
            }
        }
        config
    }
}
