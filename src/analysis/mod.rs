pub mod champion_stats;
pub mod recommender;

pub use champion_stats::PlacementStats;
pub use recommender::{RankedEntry, Rankings};
