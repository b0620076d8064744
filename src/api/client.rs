use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::PacingConfig;
use crate::error::FetchError;
use crate::model::{MatchId, PlayerId};
use crate::rate_limit::{RequestKind, RequestLog, RequestPacer};

use super::endpoints;
use super::models::*;
use super::MatchSource;

pub struct RiotApiClient {
    api_key: String,
    routing: &'static str,
    pacer: RequestPacer,
}

impl RiotApiClient {
    pub fn new(api_key: &str, region: &str, pacing: PacingConfig) -> Self {
        RiotApiClient {
            api_key: api_key.to_string(),
            routing: endpoints::regional_routing(region),
            pacer: RequestPacer::new(pacing),
        }
    }

    pub fn usage(&self) -> RequestLog {
        self.pacer.usage()
    }

    fn execute_request(&self, kind: RequestKind, url: &str) -> Result<String, FetchError> {
        let mut retry_count = 0;

        loop {
            // Paced before every attempt, retries included
            self.pacer.wait(kind);
            debug!("GET {}", url);

            let response = ureq::get(url)
                .set("User-Agent", endpoints::USER_AGENT)
                .set("X-Riot-Token", &self.api_key)
                .call();

            match response {
                Ok(resp) => {
                    return resp.into_string().map_err(|e| FetchError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(404, _)) => {
                    return Err(FetchError::NotFound(url.to_string()));
                }
                Err(ureq::Error::Status(429, resp)) => {
                    if retry_count >= self.pacer.max_retries() {
                        return Err(FetchError::RateLimited);
                    }
                    let wait_ms = resp
                        .header("Retry-After")
                        .and_then(|s| s.parse::<u64>().ok())
                        .map(|secs| secs * 1000)
                        .unwrap_or(2000 * (retry_count + 1) as u64);
                    warn!("Rate limited, waiting {}ms before retry...", wait_ms);
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(code, _)) => {
                    return Err(FetchError::HttpError(format!("HTTP {} for {}", code, url)));
                }
                Err(e) => {
                    return Err(FetchError::HttpError(e.to_string()));
                }
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, kind: RequestKind, url: &str) -> Result<T, FetchError> {
        let body = self.execute_request(kind, url)?;
        serde_json::from_str(&body).map_err(|e| FetchError::JsonError(e.to_string()))
    }
}

impl MatchSource for RiotApiClient {
    fn resolve_player_id(&self, game_name: &str, tag_line: &str) -> Result<PlayerId, FetchError> {
        let url = endpoints::account_url(self.routing, game_name, tag_line);
        let account: AccountDto = self.get_json(RequestKind::Account, &url).map_err(|e| match e {
            FetchError::NotFound(_) => FetchError::NotFound(format!("{}#{}", game_name, tag_line)),
            other => other,
        })?;
        debug!("Account {}#{} has puuid {}", account.game_name, account.tag_line, account.puuid);
        Ok(account.puuid)
    }

    fn list_recent_match_ids(&self, player: &str, offset: usize, limit: usize) -> Result<Vec<MatchId>, FetchError> {
        let url = endpoints::match_ids_url(self.routing, player, offset, limit);
        self.get_json(RequestKind::MatchList, &url)
    }

    fn fetch_match_detail(&self, id: &str) -> Result<MatchDto, FetchError> {
        let url = endpoints::match_url(self.routing, id);
        self.get_json(RequestKind::MatchDetail, &url)
    }
}
