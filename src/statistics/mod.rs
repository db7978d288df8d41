//! Per-user statistics derived from the entertainment records.
//!
//! The summary row of each user is refreshed by [`StatisticsRecomputer`] after every
//! record mutation and before every statistics query. Distributions are never stored,
//! [`StatisticsQueryService`] computes them on each read.

pub mod aggregator;
pub mod models;
mod query;
mod recompute;

#[cfg(test)]
pub(crate) mod testing;

pub use models::{Distributions, StatisticsSummary, StatisticsView, Tally, UserStatistics};
pub use query::StatisticsQueryService;
pub use recompute::{RecomputeTrigger, StatisticsRecomputer};

use anyhow::Result;

pub trait StatisticsStore: Send + Sync {
    /// Inserts the summary of the user, or overwrites it if one is already stored.
    fn upsert_statistics(&self, user_id: usize, summary: &StatisticsSummary) -> Result<()>;

    /// Returns Ok(None) if no summary was ever stored for the user.
    fn get_statistics(&self, user_id: usize) -> Result<Option<UserStatistics>>;
}
