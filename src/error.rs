use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported team count {0}: arena is played with 4 or 8 teams")]
    UnsupportedTeamCount(usize),

    #[error("Unknown champion: {0}")]
    UnknownChampion(String),

    #[error("No seed player configured. Pass --name/--tag or set MY_SUMMONER_NAME and MY_TAGLINE")]
    MissingSeed,
}

/// Failures reaching the remote match-history service.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,
}

impl FetchError {
    /// Whether the id behind this failure can never succeed (as opposed to
    /// being worth another attempt in a later run).
    pub fn is_permanent(&self) -> bool {
        matches!(self, FetchError::NotFound(_) | FetchError::JsonError(_))
    }
}

/// Raw match data that cannot be turned into a `Match`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedPayload {
    #[error("match has no participants")]
    NoParticipants,

    #[error("odd participant count {0}")]
    OddParticipantCount(usize),

    #[error("sub-team id {id} out of range 1..={team_count}")]
    SubteamOutOfRange { id: i64, team_count: usize },

    #[error("sub-team {id} has {count} champions, expected 2")]
    WrongTeamSize { id: usize, count: usize },

    #[error("sub-team {id} fields the same champion twice")]
    DuplicateChampion { id: usize },

    #[error("sub-team {id} reports conflicting placements")]
    ConflictingPlacement { id: usize },

    #[error("scoreboard {0:?} is not a permutation of 1..=team count")]
    InvalidScoreboard(Vec<i64>),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed table {table}: {reason}")]
    Parse { table: String, reason: String },

    #[error("Store shape does not match the champion roster: {0}")]
    ShapeMismatch(String),

    #[error("Champion '{0}' is not registered, add it with `add-champion`")]
    UnknownChampion(String),

    #[error("Champion '{0}' is already registered")]
    AlreadyExists(String),

    #[error("Champion name '{0}' cannot be stored")]
    InvalidName(String),

    #[error("Match {id} has {found} teams but the store tracks {expected}")]
    TeamCountMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("No more matches or players could be found after recording {recorded} matches. Try a new seed player")]
    Exhausted { recorded: usize },

    #[error("Could not resolve seed player: {0}")]
    Seed(#[from] FetchError),

    #[error("Could not list matches of player {player}: {source}")]
    ListFailed { player: String, source: FetchError },

    #[error(transparent)]
    Storage(#[from] StoreError),
}
