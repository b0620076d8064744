use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::endpoints;
use crate::api::models::ChampionDetailsDto;
use crate::error::FetchError;
use crate::model::Champion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconReport {
    pub saved: usize,
    pub failed: usize,
}

/// File name for a champion's icon, e.g. `Kai'Sa` becomes `kaisa.png`.
pub fn icon_file_name(display_name: &str) -> String {
    let stripped: String = display_name
        .chars()
        .filter(|c| !matches!(c, '.' | '\'' | ' '))
        .collect();
    format!("{}.png", Champion::of(&stripped))
}

/// Downloads every champion icon with an id below `max_id` into `dir`, using
/// `workers` threads. Ids without a champion are ignored; other failures are
/// logged and dropped.
pub fn download_all(dir: &Path, max_id: u32, workers: usize) -> Result<IconReport, std::io::Error> {
    fs::create_dir_all(dir)?;

    let queue = Mutex::new(0..max_id);
    let saved = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    thread::scope(|scope| {
        for worker in 0..workers.max(1) {
            let queue = &queue;
            let saved = &saved;
            let failed = &failed;
            scope.spawn(move || {
                let agent = ureq::AgentBuilder::new()
                    .user_agent(endpoints::USER_AGENT)
                    .timeout(Duration::from_secs(30))
                    .build();

                loop {
                    let next = match queue.lock() {
                        Ok(mut ids) => ids.next(),
                        Err(_) => None,
                    };
                    let Some(id) = next else {
                        break;
                    };

                    match fetch_icon(&agent, id, dir) {
                        Ok(Some(path)) => {
                            info!("Saved champion icon {}", path.display());
                            saved.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(None) => debug!("No champion with id {}", id),
                        Err(e) => {
                            warn!("Worker {} failed on champion id {}: {}", worker, id, e);
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            });
        }
    });

    Ok(IconReport {
        saved: saved.into_inner(),
        failed: failed.into_inner(),
    })
}

fn fetch_icon(agent: &ureq::Agent, id: u32, dir: &Path) -> Result<Option<PathBuf>, FetchError> {
    let details: ChampionDetailsDto = match agent.get(&endpoints::champion_details_url(id)).call() {
        Ok(resp) => resp.into_json().map_err(|e| FetchError::JsonError(e.to_string()))?,
        Err(ureq::Error::Status(404, _)) => return Ok(None),
        Err(e) => return Err(FetchError::HttpError(e.to_string())),
    };
    if details.name.trim().is_empty() {
        return Ok(None);
    }

    let icon = match agent.get(&endpoints::champion_icon_url(id)).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(404, _)) => return Ok(None),
        Err(e) => return Err(FetchError::HttpError(e.to_string())),
    };
    let mut bytes = Vec::new();
    icon.into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| FetchError::HttpError(e.to_string()))?;

    let path = dir.join(icon_file_name(&details.name));
    fs::write(&path, bytes).map_err(|e| FetchError::HttpError(format!("{}: {}", path.display(), e)))?;
    Ok(Some(path))
}
