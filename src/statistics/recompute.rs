use super::{aggregator, StatisticsStore, StatisticsSummary};
use crate::entertainment::EntertainmentStore;
use crate::server::metrics::record_statistics_recompute;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// What caused a recompute, used as metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeTrigger {
    /// A record was inserted, updated or deleted.
    Mutation,
    /// A statistics query refreshed the summary before reading it.
    Query,
}

impl RecomputeTrigger {
    fn as_label(&self) -> &'static str {
        match self {
            RecomputeTrigger::Mutation => "mutation",
            RecomputeTrigger::Query => "query",
        }
    }
}

/// One lock per user id, so that recomputes of the same user run one at a time
/// while different users never wait on each other. An entry lives only as long as
/// some recompute of that user holds a [`UserLease`].
#[derive(Default)]
struct UserLocks {
    locks: Mutex<HashMap<usize, Arc<Mutex<()>>>>,
}

impl UserLocks {
    fn lease(&self, user_id: usize) -> UserLease<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let lock = locks.entry(user_id).or_default().clone();
        UserLease {
            locks: self,
            user_id,
            lock: Some(lock),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// A handle on the lock of one user. Dropping the last lease of a user removes the
/// user's entry from the map.
struct UserLease<'a> {
    locks: &'a UserLocks,
    user_id: usize,
    lock: Option<Arc<Mutex<()>>>,
}

impl UserLease<'_> {
    fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Drop for UserLease<'_> {
    fn drop(&mut self) {
        // Leases are only cloned and released under the map lock, so the count seen
        // here cannot change underneath.
        let mut locks = self.locks.locks.lock().unwrap_or_else(|e| e.into_inner());
        self.lock.take();
        let unused = locks
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(&self.user_id);
        }
    }
}

/// Keeps the stored summary of a user in line with the user's records.
///
/// Without per-user serialization two recomputes of the same user may interleave, in
/// which case the stored summary can reflect the record set seen by the one that
/// upserted last rather than the latest record set.
#[derive(Clone)]
pub struct StatisticsRecomputer {
    records: Arc<dyn EntertainmentStore>,
    statistics: Arc<dyn StatisticsStore>,
    user_locks: Option<Arc<UserLocks>>,
}

impl StatisticsRecomputer {
    pub fn new(
        records: Arc<dyn EntertainmentStore>,
        statistics: Arc<dyn StatisticsStore>,
        serialize_per_user: bool,
    ) -> Self {
        Self {
            records,
            statistics,
            user_locks: serialize_per_user.then(|| Arc::new(UserLocks::default())),
        }
    }

    pub fn records(&self) -> &Arc<dyn EntertainmentStore> {
        &self.records
    }

    pub fn statistics(&self) -> &Arc<dyn StatisticsStore> {
        &self.statistics
    }

    /// Fetches every record of the user, aggregates them and upserts the summary.
    /// A missing user id is a no-op and returns Ok(None).
    pub fn recompute(&self, user_id: Option<usize>) -> Result<Option<StatisticsSummary>> {
        let user_id = match user_id {
            Some(id) => id,
            None => return Ok(None),
        };

        let lease = self.user_locks.as_ref().map(|locks| locks.lease(user_id));
        let _guard = lease.as_ref().and_then(|lease| lease.lock());

        let records = self
            .records
            .list_records(user_id)
            .with_context(|| format!("Failed to fetch records of user {}", user_id))?;
        let summary = aggregator::summarize(&records);
        self.statistics
            .upsert_statistics(user_id, &summary)
            .with_context(|| format!("Failed to store statistics of user {}", user_id))?;

        Ok(Some(summary))
    }

    /// Like [`Self::recompute`], but failures are only logged. Returns whether the
    /// summary was refreshed.
    pub fn recompute_logged(&self, user_id: Option<usize>, trigger: RecomputeTrigger) -> bool {
        let start = Instant::now();
        match self.recompute(user_id) {
            Ok(Some(summary)) => {
                debug!(
                    "Statistics of user {:?} refreshed ({}): {:?}",
                    user_id,
                    trigger.as_label(),
                    summary
                );
                record_statistics_recompute(trigger.as_label(), true, start.elapsed());
                true
            }
            Ok(None) => {
                debug!("Skipping statistics recompute, record has no owner");
                false
            }
            Err(err) => {
                error!(
                    "Statistics recompute for user {:?} failed: {:#}",
                    user_id, err
                );
                record_statistics_recompute(trigger.as_label(), false, start.elapsed());
                false
            }
        }
    }

    /// Recomputes the statistics of the user on the blocking pool without waiting
    /// for it. The returned handle is only meant for callers that want to observe
    /// completion, the outcome itself is logged.
    pub fn spawn_recompute(&self, user_id: Option<usize>) -> Option<JoinHandle<()>> {
        let user_id = user_id?;
        let recomputer = self.clone();
        Some(tokio::task::spawn_blocking(move || {
            recomputer.recompute_logged(Some(user_id), RecomputeTrigger::Mutation);
        }))
    }
}
