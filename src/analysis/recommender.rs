use std::cmp::Ordering;

use super::champion_stats::{PlacementStats, PlacementSummary};
use crate::model::Champion;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub label: String,
    pub average: f64,
    pub samples: u64,
}

impl RankedEntry {
    pub fn new(label: String, summary: PlacementSummary) -> Self {
        RankedEntry {
            label,
            average: summary.average,
            samples: summary.samples,
        }
    }
}

pub struct Rankings;

impl Rankings {
    /// Lower average placement first; equal averages favour the larger
    /// sample, then the label. Entries without samples are dropped.
    pub fn rank(entries: impl IntoIterator<Item = RankedEntry>, limit: usize) -> Vec<RankedEntry> {
        let mut ranked: Vec<RankedEntry> = entries.into_iter().filter(|e| e.samples > 0).collect();

        ranked.sort_by(|a, b| {
            a.average
                .partial_cmp(&b.average)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.samples.cmp(&a.samples))
                .then_with(|| a.label.cmp(&b.label))
        });
        ranked.truncate(limit);

        ranked
    }

    pub fn best_champions(stats: &PlacementStats, limit: usize) -> Vec<RankedEntry> {
        let entries = stats.matrix().champions().iter().filter_map(|champion| {
            stats
                .average_placement(champion)
                .map(|summary| RankedEntry::new(champion.name().to_string(), summary))
        });
        Self::rank(entries, limit)
    }

    /// Every unordered pair of distinct champions, labelled `first + second`.
    pub fn best_pairs(stats: &PlacementStats, limit: usize) -> Vec<RankedEntry> {
        let champions = stats.matrix().champions();
        let entries = champions.iter().enumerate().flat_map(|(i, first)| {
            champions[i + 1..].iter().filter_map(move |second| {
                stats
                    .average_pairwise_placement(first, second)
                    .map(|summary| RankedEntry::new(pair_label(first, second), summary))
            })
        });
        Self::rank(entries, limit)
    }

    pub fn best_teammates_for(stats: &PlacementStats, champion: &Champion, limit: usize) -> Option<Vec<RankedEntry>> {
        let by_teammate = stats.average_placement_by_teammate(champion)?;
        let entries = by_teammate
            .into_iter()
            .map(|(teammate, summary)| RankedEntry::new(teammate.name().to_string(), summary));
        Some(Self::rank(entries, limit))
    }
}

pub fn pair_label(first: &Champion, second: &Champion) -> String {
    format!("{} + {}", first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::champion_stats::tests::{matrix_with, play};
    use crate::store::PlacementMatrix;
    use pretty_assertions::assert_eq;

    fn entry(label: &str, average: f64, samples: u64) -> RankedEntry {
        RankedEntry {
            label: label.to_string(),
            average,
            samples,
        }
    }

    /// Two duos that never meet: a+b finish 1st and 2nd five times each,
    /// c+d finish 1st four times and 2nd once.
    fn lopsided() -> PlacementMatrix {
        let mut matrix = matrix_with(2, &["a", "b", "c", "d", "x", "y"]);
        for _ in 0..5 {
            play(&mut matrix, &[("a", "b"), ("x", "y")], &[1, 2]);
            play(&mut matrix, &[("a", "b"), ("x", "y")], &[2, 1]);
        }
        for _ in 0..4 {
            play(&mut matrix, &[("c", "d"), ("x", "y")], &[1, 2]);
        }
        play(&mut matrix, &[("c", "d"), ("x", "y")], &[2, 1]);
        matrix
    }

    #[test]
    fn test_rank_orders_by_average_then_samples() {
        let ranked = Rankings::rank(
            vec![
                entry("slow", 3.0, 10),
                entry("empty", 0.0, 0),
                entry("small", 2.0, 3),
                entry("big", 2.0, 30),
            ],
            10,
        );
        let labels: Vec<&str> = ranked.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["big", "small", "slow"]);
    }

    #[test]
    fn test_best_champion_prefers_lower_average() {
        let matrix = lopsided();
        let stats = PlacementStats::new(&matrix);

        let best = Rankings::best_champions(&stats, 1);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].label, "c");
        assert!((best[0].average - 1.2).abs() < 1e-9);
        assert_eq!(best[0].samples, 5);

        let all = Rankings::best_champions(&stats, 10);
        let a = all.iter().find(|e| e.label == "a").unwrap();
        assert_eq!((a.average, a.samples), (1.5, 10));
    }

    #[test]
    fn test_best_pairs_skip_unplayed_pairs() {
        let matrix = lopsided();
        let stats = PlacementStats::new(&matrix);

        let pairs = Rankings::best_pairs(&stats, 10);
        let labels: Vec<&str> = pairs.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["c + d", "a + b", "x + y"]);
        assert_eq!(pairs[2].samples, 15);
    }

    #[test]
    fn test_best_teammates_for() {
        let mut matrix = matrix_with(2, &["a", "b", "c", "d"]);
        play(&mut matrix, &[("a", "b"), ("c", "d")], &[2, 1]);
        play(&mut matrix, &[("a", "c"), ("b", "d")], &[1, 2]);
        play(&mut matrix, &[("a", "c"), ("b", "d")], &[1, 2]);
        let stats = PlacementStats::new(&matrix);

        let teammates = Rankings::best_teammates_for(&stats, &Champion::of("a"), 5).unwrap();
        assert_eq!(teammates, vec![entry("c", 1.0, 2), entry("b", 2.0, 1)]);
        assert!(Rankings::best_teammates_for(&stats, &Champion::of("zz"), 5).is_none());
    }
}
