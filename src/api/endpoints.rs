// Riot and Community Dragon endpoint builders

pub const USER_AGENT: &str = concat!("arena_stats/", env!("CARGO_PKG_VERSION"));

const COMMUNITY_DRAGON_ROOT: &str =
    "https://raw.communitydragon.org/latest/plugins/rcp-be-lol-game-data/global/default/v1";

/// Regional cluster serving account-v1 and match-v5 for a platform id.
pub fn regional_routing(platform: &str) -> &'static str {
    match platform.to_ascii_lowercase().as_str() {
        "na1" | "br1" | "la1" | "la2" => "americas",
        "euw1" | "eun1" | "tr1" | "ru" | "me1" => "europe",
        "kr" | "jp1" => "asia",
        "oc1" | "ph2" | "sg2" | "th2" | "tw2" | "vn2" => "sea",
        _ => "europe",
    }
}

pub fn account_url(routing: &str, game_name: &str, tag_line: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/riot/account/v1/accounts/by-riot-id/{}/{}",
        routing,
        encode_segment(game_name),
        encode_segment(tag_line)
    )
}

pub fn match_ids_url(routing: &str, puuid: &str, start: usize, count: usize) -> String {
    format!(
        "https://{}.api.riotgames.com/lol/match/v5/matches/by-puuid/{}/ids?start={}&count={}",
        routing, puuid, start, count
    )
}

pub fn match_url(routing: &str, match_id: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/lol/match/v5/matches/{}",
        routing,
        encode_segment(match_id)
    )
}

pub fn champion_icon_url(champion_id: u32) -> String {
    format!("{}/champion-icons/{}.png", COMMUNITY_DRAGON_ROOT, champion_id)
}

pub fn champion_details_url(champion_id: u32) -> String {
    format!("{}/champions/{}.json", COMMUNITY_DRAGON_ROOT, champion_id)
}

/// Percent-encodes everything outside the unreserved set.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
