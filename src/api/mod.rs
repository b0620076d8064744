pub mod client;
pub mod endpoints;
pub mod models;

use crate::error::FetchError;
use crate::model::{MatchId, PlayerId};

use models::MatchDto;

/// The remote match history. Every call may fail; callers decide whether a
/// failure skips an id or ends the run.
pub trait MatchSource {
    fn resolve_player_id(&self, game_name: &str, tag_line: &str) -> Result<PlayerId, FetchError>;

    /// Up to `limit` match ids, most recent first, skipping the newest `offset`.
    fn list_recent_match_ids(&self, player: &str, offset: usize, limit: usize) -> Result<Vec<MatchId>, FetchError>;

    fn fetch_match_detail(&self, id: &str) -> Result<MatchDto, FetchError>;
}
