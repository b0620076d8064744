use std::collections::HashMap;

use crate::api::models::MatchDto;
use crate::model::MatchId;

/// Match details fetched during one crawl, kept until the match has been
/// saved and its players harvested.
#[derive(Debug, Default)]
pub struct DetailCache {
    matches: HashMap<MatchId, MatchDto>,
    peak: usize,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&MatchDto> {
        self.matches.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.matches.contains_key(id)
    }

    pub fn insert(&mut self, id: MatchId, detail: MatchDto) {
        self.matches.insert(id, detail);
        self.peak = self.peak.max(self.matches.len());
    }

    pub fn remove(&mut self, id: &str) -> Option<MatchDto> {
        self.matches.remove(id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Largest number of details held at once.
    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::arena_match::tests::payload;

    #[test]
    fn test_insert_remove_tracks_peak() {
        let mut cache = DetailCache::new();
        cache.insert("a".to_string(), payload("a", &[("x", "y")], &[1]));
        cache.insert("b".to_string(), payload("b", &[("x", "y")], &[1]));
        assert_eq!(cache.len(), 2);

        assert!(cache.remove("a").is_some());
        assert!(!cache.contains("a"));
        assert_eq!(cache.get("b").map(|m| m.metadata.match_id.as_str()), Some("b"));
        assert_eq!(cache.peak(), 2);
    }
}
