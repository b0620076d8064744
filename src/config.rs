use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// The game mode tag the match-v5 API reports for Arena.
pub const ARENA_GAME_MODE: &str = "CHERRY";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub region: String,
    pub seed: Option<SeedPlayer>,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlayer {
    pub game_name: String,
    pub tag_line: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("RIOT_API_KEY").ok().filter(|key| !key.is_empty());
        let region = env::var("RIOT_REGION").unwrap_or_else(|_| "euw1".to_string());

        let seed = match (env::var("MY_SUMMONER_NAME"), env::var("MY_TAGLINE")) {
            (Ok(game_name), Ok(tag_line)) => Some(SeedPlayer { game_name, tag_line }),
            _ => None,
        };

        let data_dir = match env::var("ARENA_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".arena_stats"),
        };

        Ok(Config {
            api_key,
            region,
            seed,
            data_dir,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::ConfigError("RIOT_API_KEY not found in environment or .env file".to_string())
        })
    }
}

/// Which flavour of Arena a store and a crawl are tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaFormat {
    pub team_count: usize,
}

impl ArenaFormat {
    pub const SUPPORTED_TEAM_COUNTS: [usize; 2] = [4, 8];

    pub fn new(team_count: usize) -> Self {
        ArenaFormat { team_count }
    }

    /// Restricts the team count to the Arena queues that exist in the game.
    pub fn supported(team_count: usize) -> Result<Self, AppError> {
        if Self::SUPPORTED_TEAM_COUNTS.contains(&team_count) {
            Ok(Self::new(team_count))
        } else {
            Err(AppError::UnsupportedTeamCount(team_count))
        }
    }

    pub fn expected_participants(&self) -> usize {
        self.team_count * 2
    }

    pub fn game_mode(&self) -> &'static str {
        ARENA_GAME_MODE
    }
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub format: ArenaFormat,
    pub target_matches: usize,
    pub matches_per_player: usize,
    /// How far back into a player's history listing starts.
    pub history_offset: usize,
    pub max_iterations: usize,
    pub time_budget: Option<Duration>,
}

impl CrawlConfig {
    pub fn new(format: ArenaFormat, target_matches: usize) -> Self {
        CrawlConfig {
            format,
            target_matches,
            matches_per_player: 10,
            history_offset: 1,
            max_iterations: 100_000,
            time_budget: None,
        }
    }
}

/// Fixed waits applied before each request kind, plus the long-window ceiling
/// of the development key.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    pub account_delay: Duration,
    pub match_list_delay: Duration,
    pub match_detail_delay: Duration,
    pub window_requests: u32,
    pub window: Duration,
    pub max_retries: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            account_delay: Duration::from_millis(500),
            match_list_delay: Duration::from_millis(500),
            match_detail_delay: Duration::from_millis(350),
            window_requests: 100,
            window: Duration::from_secs(120),
            max_retries: 3,
        }
    }
}

#[cfg(test)]
impl PacingConfig {
    /// No waiting at all.
    pub fn unthrottled() -> Self {
        PacingConfig {
            account_delay: Duration::ZERO,
            match_list_delay: Duration::ZERO,
            match_detail_delay: Duration::ZERO,
            window_requests: 0,
            window: Duration::ZERO,
            max_retries: 0,
        }
    }
}
