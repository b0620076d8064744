use serde::{Deserialize, Serialize};

// Account V1 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
}

// Match V5 response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchDto {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
    /// PUUIDs of every participant.
    pub participants: Vec<String>,
    #[serde(default)]
    pub data_version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default)]
    pub game_mode: String,
    #[serde(default)]
    pub game_duration: i64,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub champion_name: String,
    /// Arena duo id, 1-based. Zero outside Arena.
    #[serde(default)]
    pub player_subteam_id: i64,
    /// Final duo placement, 1 = first. Zero outside Arena.
    #[serde(default)]
    pub placement: i64,
}

// Community Dragon champion summary, used for icon names
#[derive(Debug, Deserialize)]
pub struct ChampionDetailsDto {
    pub name: String,
}
