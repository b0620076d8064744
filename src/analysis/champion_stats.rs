use std::collections::BTreeMap;

use crate::model::Champion;
use crate::store::PlacementMatrix;

/// Mean placement over a number of finishes. A summary with no samples
/// reports an average of 0.0, which is never a real average since
/// placements start at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementSummary {
    pub average: f64,
    pub samples: u64,
}

impl PlacementSummary {
    pub const EMPTY: PlacementSummary = PlacementSummary {
        average: 0.0,
        samples: 0,
    };

    /// `counts[i]` is the number of finishes in placement `i + 1`.
    pub fn from_counts(counts: &[u64]) -> Self {
        let samples: u64 = counts.iter().sum();
        if samples == 0 {
            return Self::EMPTY;
        }

        let weighted: u64 = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as u64 + 1) * count)
            .sum();

        PlacementSummary {
            average: weighted as f64 / samples as f64,
            samples,
        }
    }

    pub fn has_samples(&self) -> bool {
        self.samples > 0
    }
}

/// Read-only queries over a loaded placement matrix.
pub struct PlacementStats<'a> {
    matrix: &'a PlacementMatrix,
}

impl<'a> PlacementStats<'a> {
    pub fn new(matrix: &'a PlacementMatrix) -> Self {
        PlacementStats { matrix }
    }

    pub fn matrix(&self) -> &'a PlacementMatrix {
        self.matrix
    }

    pub fn team_count(&self) -> usize {
        self.matrix.team_count()
    }

    /// Every match adds one to both directions of each of its teams.
    pub fn total_matches(&self) -> u64 {
        match self.matrix.team_count() {
            0 => 0,
            t => self.matrix.total() / (2 * t as u64),
        }
    }

    /// Finishes of `champion` per placement, summed over every teammate.
    pub fn total_placements(&self, champion: &Champion) -> Option<Vec<u64>> {
        let row = self.matrix.index_of(champion)?;
        let mut totals = vec![0; self.team_count()];
        for teammate in 0..self.matrix.len() {
            for (total, count) in totals.iter_mut().zip(self.matrix.placements_at(row, teammate)) {
                *total += count;
            }
        }
        Some(totals)
    }

    pub fn average_placement(&self, champion: &Champion) -> Option<PlacementSummary> {
        self.total_placements(champion)
            .map(|totals| PlacementSummary::from_counts(&totals))
    }

    pub fn pairwise_placements(&self, first: &Champion, second: &Champion) -> Option<Vec<u64>> {
        let row = self.matrix.index_of(first)?;
        let teammate = self.matrix.index_of(second)?;
        Some(self.matrix.placements_at(row, teammate).to_vec())
    }

    pub fn average_pairwise_placement(&self, first: &Champion, second: &Champion) -> Option<PlacementSummary> {
        let row = self.matrix.index_of(first)?;
        let teammate = self.matrix.index_of(second)?;
        Some(PlacementSummary::from_counts(self.matrix.placements_at(row, teammate)))
    }

    /// Summary for every other champion as a teammate of `champion`,
    /// including teammates it has never played with.
    pub fn average_placement_by_teammate(&self, champion: &Champion) -> Option<BTreeMap<Champion, PlacementSummary>> {
        let row = self.matrix.index_of(champion)?;
        let by_teammate = self
            .matrix
            .champions()
            .iter()
            .enumerate()
            .filter(|&(teammate, _)| teammate != row)
            .map(|(teammate, other)| {
                (
                    other.clone(),
                    PlacementSummary::from_counts(self.matrix.placements_at(row, teammate)),
                )
            })
            .collect();
        Some(by_teammate)
    }
}
