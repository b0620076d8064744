pub mod crawler;
pub mod frontier;

pub use crawler::{CancelFlag, CrawlOutcome, CrawlReport, Crawler};
