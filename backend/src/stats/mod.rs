//! Outcome statistics: per-sample summaries, paired/independent differences
//! and the alive-count step function.

pub mod difference;
pub mod path;
pub mod summary;

pub use difference::DifferenceStat;
pub use path::AlivePath;
pub use summary::{Interval, StatsError, SummaryStat};
