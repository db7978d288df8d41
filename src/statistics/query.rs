use super::{
    aggregator, Distributions, RecomputeTrigger, StatisticsRecomputer, StatisticsSummary,
    StatisticsView,
};
use anyhow::{Context, Result};
use tracing::warn;

/// Answers statistics queries with a freshly recomputed summary plus distributions.
#[derive(Clone)]
pub struct StatisticsQueryService {
    recomputer: StatisticsRecomputer,
}

impl StatisticsQueryService {
    pub fn new(recomputer: StatisticsRecomputer) -> Self {
        Self { recomputer }
    }

    /// Refreshes the stored summary of the user, reads it back and adds the
    /// genre/status/category distributions of the user's current records.
    ///
    /// Users without records (or unknown users) get the zero-valued view. Only a
    /// failure to read the summary back is an error: a failed refresh is logged and
    /// whatever is stored is returned, a failed distribution fetch gives empty
    /// distributions.
    pub fn query_statistics(&self, user_id: usize) -> Result<StatisticsView> {
        self.recomputer
            .recompute_logged(Some(user_id), RecomputeTrigger::Query);

        let summary = self
            .recomputer
            .statistics()
            .get_statistics(user_id)
            .with_context(|| format!("Failed to read statistics of user {}", user_id))?
            .map(|stats| stats.summary)
            .unwrap_or_else(StatisticsSummary::empty);

        let distributions = match self.recomputer.records().list_records(user_id) {
            Ok(records) => aggregator::distributions(&records),
            Err(err) => {
                warn!(
                    "Could not fetch records of user {} for distributions: {:#}",
                    user_id, err
                );
                Distributions::default()
            }
        };

        Ok(StatisticsView::new(summary, distributions))
    }
}
