use std::collections::HashSet;
use std::hash::Hash;

use crate::model::{MatchId, PlayerId};

/// Traversal state of one crawl run.
///
/// A match id can be pending a save, pending player extraction, or both.
/// Player ids move from pending to listed exactly once per run.
#[derive(Debug, Default)]
pub struct Frontier {
    matches_to_save: HashSet<MatchId>,
    matches_to_scan: HashSet<MatchId>,
    matches_scanned: HashSet<MatchId>,
    matches_invalid: HashSet<MatchId>,
    matches_skipped: HashSet<MatchId>,
    players_to_list: HashSet<PlayerId>,
    players_listed: HashSet<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierCounts {
    pub matches_to_save: usize,
    pub matches_to_scan: usize,
    pub players_to_list: usize,
    pub players_listed: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, player: PlayerId) {
        self.players_listed.remove(&player);
        self.players_to_list.insert(player);
    }

    /// Queues a player unless it was already listed this run.
    pub fn offer_player(&mut self, player: PlayerId) -> bool {
        !self.players_listed.contains(&player) && self.players_to_list.insert(player)
    }

    pub fn offer_players(&mut self, players: impl IntoIterator<Item = PlayerId>) -> usize {
        players.into_iter().filter(|p| self.offer_player(p.clone())).count()
    }

    /// Queues listed match ids: unrecorded ones for saving, unscanned ones for
    /// player extraction. Returns how many were newly queued for saving.
    pub fn offer_matches(&mut self, ids: impl IntoIterator<Item = MatchId>, recorded: &HashSet<MatchId>) -> usize {
        let mut new_saves = 0;
        for id in ids {
            if self.matches_invalid.contains(&id) || self.matches_skipped.contains(&id) {
                continue;
            }
            if !recorded.contains(&id) && self.matches_to_save.insert(id.clone()) {
                new_saves += 1;
            }
            if !self.matches_scanned.contains(&id) {
                self.matches_to_scan.insert(id);
            }
        }
        new_saves
    }

    pub fn pop_match_to_save(&mut self) -> Option<MatchId> {
        pop_any(&mut self.matches_to_save)
    }

    /// Next player to list, marked as listed.
    pub fn pop_player(&mut self) -> Option<PlayerId> {
        let player = pop_any(&mut self.players_to_list)?;
        self.players_listed.insert(player.clone());
        Some(player)
    }

    /// Next match still needing player extraction.
    pub fn pop_match_to_scan(&mut self) -> Option<MatchId> {
        while let Some(id) = pop_any(&mut self.matches_to_scan) {
            if !self.matches_scanned.contains(&id)
                && !self.matches_invalid.contains(&id)
                && !self.matches_skipped.contains(&id)
            {
                return Some(id);
            }
        }
        None
    }

    pub fn mark_scanned(&mut self, id: &str) {
        self.matches_to_scan.remove(id);
        self.matches_scanned.insert(id.to_string());
    }

    /// The match can never be recorded.
    pub fn mark_invalid(&mut self, id: &str) {
        self.matches_to_save.remove(id);
        self.matches_to_scan.remove(id);
        self.matches_invalid.insert(id.to_string());
    }

    /// The match could not be fetched; left alone for the rest of this run.
    pub fn mark_skipped(&mut self, id: &str) {
        self.matches_to_save.remove(id);
        self.matches_to_scan.remove(id);
        self.matches_skipped.insert(id.to_string());
    }

    pub fn is_invalid(&self, id: &str) -> bool {
        self.matches_invalid.contains(id)
    }

    pub fn is_skipped(&self, id: &str) -> bool {
        self.matches_skipped.contains(id)
    }

    #[cfg(test)]
    pub fn is_exhausted(&self) -> bool {
        self.matches_to_save.is_empty() && self.matches_to_scan.is_empty() && self.players_to_list.is_empty()
    }

    pub fn counts(&self) -> FrontierCounts {
        FrontierCounts {
            matches_to_save: self.matches_to_save.len(),
            matches_to_scan: self.matches_to_scan.len(),
            players_to_list: self.players_to_list.len(),
            players_listed: self.players_listed.len(),
        }
    }
}

/// Removes an arbitrary element. Callers must not rely on the order.
fn pop_any<T: Clone + Eq + Hash>(set: &mut HashSet<T>) -> Option<T> {
    let item = set.iter().next()?.clone();
    set.remove(&item);
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_seed_then_exhaust() {
        let mut frontier = Frontier::new();
        assert!(frontier.is_exhausted());

        frontier.seed("p0".to_string());
        assert!(!frontier.is_exhausted());
        assert_eq!(frontier.pop_player().as_deref(), Some("p0"));
        assert!(frontier.is_exhausted());

        assert!(!frontier.offer_player("p0".to_string()));
        assert_eq!(frontier.counts().players_listed, 1);
    }

    #[test]
    fn test_recorded_matches_are_only_scanned() {
        let mut frontier = Frontier::new();
        let recorded: HashSet<MatchId> = ids(&["old"]).into_iter().collect();

        let new_saves = frontier.offer_matches(ids(&["old", "new", "new"]), &recorded);

        assert_eq!(new_saves, 1);
        assert_eq!(frontier.pop_match_to_save().as_deref(), Some("new"));
        assert!(frontier.pop_match_to_save().is_none());

        let mut scans = vec![frontier.pop_match_to_scan().unwrap(), frontier.pop_match_to_scan().unwrap()];
        scans.sort();
        assert_eq!(scans, ids(&["new", "old"]));
    }

    #[test]
    fn test_invalid_and_skipped_are_never_requeued() {
        let mut frontier = Frontier::new();
        let recorded = HashSet::new();
        frontier.offer_matches(ids(&["bad", "down"]), &recorded);

        frontier.mark_invalid("bad");
        frontier.mark_skipped("down");
        assert!(frontier.is_exhausted());

        assert_eq!(frontier.offer_matches(ids(&["bad", "down"]), &recorded), 0);
        assert!(frontier.pop_match_to_scan().is_none());
        assert!(frontier.is_invalid("bad"));
        assert!(frontier.is_skipped("down"));
    }

    #[test]
    fn test_scanned_matches_are_not_rescanned() {
        let mut frontier = Frontier::new();
        frontier.offer_matches(ids(&["m1"]), &HashSet::new());
        frontier.mark_scanned("m1");
        assert!(frontier.pop_match_to_scan().is_none());

        frontier.offer_matches(ids(&["m1"]), &HashSet::new());
        assert!(frontier.pop_match_to_scan().is_none());
        assert_eq!(frontier.counts().matches_to_save, 1);
    }

    #[test]
    fn test_offer_players_counts_new_only() {
        let mut frontier = Frontier::new();
        frontier.seed("p0".to_string());
        frontier.pop_player();

        let added = frontier.offer_players(ids(&["p0", "p1", "p2", "p1"]));
        assert_eq!(added, 2);
        assert_eq!(frontier.counts().players_to_list, 2);
    }
}
