use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::api::models::MatchDto;
use crate::api::MatchSource;
use crate::cache::DetailCache;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, StoreError};
use crate::model::{Match, PlayerId};
use crate::store::{ApplyOutcome, PlacementStore};

use super::frontier::Frontier;

/// Shared stop switch, checked between iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Blocks until a line is read from `input`, then cancels. End of input
    /// or a read error leaves the flag alone.
    pub fn cancel_on_line(&self, mut input: impl BufRead) -> bool {
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(n) if n > 0 => {
                self.cancel();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    TargetReached,
    Cancelled,
    TimeBudgetSpent,
    IterationCeiling,
    /// A bounded recent-match save went through every listed id.
    ListProcessed,
}

#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub outcome: CrawlOutcome,
    pub recorded: usize,
    pub already_recorded: usize,
    pub invalid: usize,
    pub skipped: usize,
    pub players_listed: usize,
    pub iterations: usize,
    pub peak_cached: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Counters {
    recorded: usize,
    already_recorded: usize,
    invalid: usize,
    skipped: usize,
    players_listed: usize,
    iterations: usize,
}

/// Walks match ids and player ids outward from a seed player, saving every
/// valid new match into the placement store.
///
/// Pending saves are always drained before any discovery request is made.
pub struct Crawler<'a, S: MatchSource + ?Sized> {
    source: &'a S,
    store: &'a mut PlacementStore,
    config: CrawlConfig,
    frontier: Frontier,
    cache: DetailCache,
    cancel: CancelFlag,
    progress: Option<ProgressBar>,
    counters: Counters,
}

impl<'a, S: MatchSource + ?Sized> Crawler<'a, S> {
    pub fn new(source: &'a S, store: &'a mut PlacementStore, config: CrawlConfig) -> Self {
        Crawler {
            source,
            store,
            config,
            frontier: Frontier::new(),
            cache: DetailCache::new(),
            cancel: CancelFlag::new(),
            progress: None,
            counters: Counters::default(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn resolve_seed(&self, game_name: &str, tag_line: &str) -> Result<PlayerId, CrawlError> {
        let puuid = self.source.resolve_player_id(game_name, tag_line)?;
        info!("Resolved seed {}#{} to {}", game_name, tag_line, puuid);
        Ok(puuid)
    }

    /// Crawls until the target number of new matches is recorded, the run is
    /// cancelled, or a safety limit is hit. Running out of ids before the
    /// target is an error; matches saved up to that point stay saved.
    pub fn run(&mut self, seed: PlayerId) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let started = Instant::now();
        self.frontier.seed(seed);

        let outcome = loop {
            if self.counters.recorded >= self.config.target_matches {
                break CrawlOutcome::TargetReached;
            }
            if self.cancel.is_cancelled() {
                break CrawlOutcome::Cancelled;
            }
            if self.config.time_budget.is_some_and(|budget| started.elapsed() >= budget) {
                break CrawlOutcome::TimeBudgetSpent;
            }
            if self.counters.iterations >= self.config.max_iterations {
                warn!("Stopping after {} iterations", self.counters.iterations);
                break CrawlOutcome::IterationCeiling;
            }
            self.counters.iterations += 1;

            if let Some(id) = self.frontier.pop_match_to_save() {
                self.save_match(&id)?;
                continue;
            }

            if let Some(player) = self.frontier.pop_player() {
                self.list_player(&player);
            } else if let Some(id) = self.frontier.pop_match_to_scan() {
                self.scan_match(&id);
            } else {
                self.finish_progress();
                return Err(CrawlError::Exhausted {
                    recorded: self.counters.recorded,
                });
            }
            debug!("Frontier: {:?}", self.frontier.counts());
        };

        self.finish_progress();
        Ok(self.report(outcome, started_at))
    }

    /// Saves the `count` most recent matches of one player, without
    /// discovering anyone else.
    pub fn save_recent(&mut self, player: &str, count: usize) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        self.counters.players_listed += 1;

        let ids = self
            .source
            .list_recent_match_ids(player, 0, count)
            .map_err(|source| CrawlError::ListFailed {
                player: player.to_string(),
                source,
            })?;

        for id in ids {
            self.counters.iterations += 1;
            self.save_match(&id)?;
        }

        self.finish_progress();
        Ok(self.report(CrawlOutcome::ListProcessed, started_at))
    }

    fn report(&self, outcome: CrawlOutcome, started_at: DateTime<Utc>) -> CrawlReport {
        if !self.cache.is_empty() {
            debug!("{} cached match details were never used", self.cache.len());
        }
        CrawlReport {
            outcome,
            recorded: self.counters.recorded,
            already_recorded: self.counters.already_recorded,
            invalid: self.counters.invalid,
            skipped: self.counters.skipped,
            players_listed: self.counters.players_listed,
            iterations: self.counters.iterations,
            peak_cached: self.cache.peak(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn finish_progress(&self) {
        if let Some(progress) = &self.progress {
            progress.finish_with_message("✓ Crawl finished");
        }
    }

    fn save_match(&mut self, id: &str) -> Result<(), CrawlError> {
        if self.frontier.is_invalid(id) || self.frontier.is_skipped(id) {
            return Ok(());
        }
        if self.store.is_recorded(id) {
            info!("Match {} already recorded", id);
            self.counters.already_recorded += 1;
            return Ok(());
        }
        if !self.ensure_detail(id) {
            return Ok(());
        }

        self.harvest_players(id);
        let converted = match self.cache.remove(id) {
            Some(detail) => Match::from_payload(&detail),
            None => return Ok(()),
        };

        let m = match converted {
            Ok(m) => m,
            Err(e) => {
                self.reject(id, &e.to_string());
                return Ok(());
            }
        };

        match self.store.apply(&m) {
            Ok(ApplyOutcome::Recorded) => {
                self.counters.recorded += 1;
                info!(
                    "Saved match #{}: {}. Number of matches recorded: {}",
                    self.counters.recorded,
                    m,
                    self.store.recorded_match_ids().len()
                );
                if let Some(progress) = &self.progress {
                    progress.inc(1);
                }
            }
            Ok(ApplyOutcome::AlreadyRecorded) => {
                self.counters.already_recorded += 1;
            }
            Err(StoreError::UnknownChampion(name)) => {
                self.reject(id, &format!("champion '{}' is not registered", name));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn list_player(&mut self, player: &str) {
        self.counters.players_listed += 1;
        info!(
            "Checking the past {} matches of player {}",
            self.config.matches_per_player, player
        );

        match self
            .source
            .list_recent_match_ids(player, self.config.history_offset, self.config.matches_per_player)
        {
            Ok(ids) => {
                let new_saves = self.frontier.offer_matches(ids, self.store.recorded_match_ids());
                debug!("Player {} gave {} new matches to save", player, new_saves);
            }
            Err(e) => warn!("Skipping player {}: {}", player, e),
        }
    }

    fn scan_match(&mut self, id: &str) {
        debug!("Checking for new players in match {}", id);
        if self.ensure_detail(id) {
            self.harvest_players(id);
            self.cache.remove(id);
        }
    }

    /// Makes sure a validated detail for `id` is cached. Failed and invalid
    /// ids are marked in the frontier and logged.
    fn ensure_detail(&mut self, id: &str) -> bool {
        if self.cache.contains(id) {
            return true;
        }

        match self.source.fetch_match_detail(id) {
            Ok(detail) => match self.validate(id, &detail) {
                Ok(()) => {
                    self.cache.insert(id.to_string(), detail);
                    true
                }
                Err(reason) => {
                    self.reject(id, &reason);
                    false
                }
            },
            Err(e) if e.is_permanent() => {
                self.reject(id, &e.to_string());
                false
            }
            Err(e) => {
                warn!("Error fetching match {}: {}. Skipping it for this run", id, e);
                self.frontier.mark_skipped(id);
                self.counters.skipped += 1;
                false
            }
        }
    }

    fn validate(&self, id: &str, detail: &MatchDto) -> Result<(), String> {
        let format = &self.config.format;
        if detail.metadata.match_id != id {
            return Err(format!("detail is for match {}", detail.metadata.match_id));
        }
        if detail.info.game_mode != format.game_mode() {
            return Err(format!("game mode {} is not {}", detail.info.game_mode, format.game_mode()));
        }
        let players = detail.info.participants.len();
        if players != format.expected_participants() {
            return Err(format!(
                "{} participants, expected {}",
                players,
                format.expected_participants()
            ));
        }
        Ok(())
    }

    fn reject(&mut self, id: &str, reason: &str) {
        warn!("Invalid match {}: {}", id, reason);
        self.frontier.mark_invalid(id);
        self.counters.invalid += 1;
    }

    fn harvest_players(&mut self, id: &str) {
        let Some(detail) = self.cache.get(id) else {
            return;
        };
        let players: Vec<PlayerId> = detail.metadata.participants.clone();
        let added = self.frontier.offer_players(players);
        self.frontier.mark_scanned(id);
        debug!("Found {} new player ids in match {}", added, id);
    }
}
