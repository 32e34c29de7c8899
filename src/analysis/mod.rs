//! Analysis modules.
//!
//! Normalization of raw search results, statistics and recipient ranking.

pub mod aggregator;
pub mod normalizer;
pub mod ranker;

pub use aggregator::{aggregate, award_histogram, HistogramBucket};
pub use normalizer::normalize_all;
pub use ranker::top_recipients;
