pub mod arena_match;
pub mod champion;

pub use arena_match::{Match, MatchId, PlayerId};
pub use champion::Champion;
