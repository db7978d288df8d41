//! In-memory stores for unit tests.

use super::{StatisticsStore, StatisticsSummary, UserStatistics};
use crate::entertainment::{
    EntertainmentFields, EntertainmentRecord, EntertainmentStore, ListFilter, NewEntertainment,
};
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<EntertainmentRecord>>,
    statistics: Mutex<HashMap<usize, StatisticsSummary>>,
    pub fail_list: AtomicBool,
    pub fail_upsert: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_write: AtomicBool,
    pub upserts: AtomicUsize,
    /// How long each `list_records` call holds on before answering.
    pub list_delay_ms: AtomicU64,
    /// Highest number of `list_records` calls seen running at the same time.
    pub max_overlapping_lists: AtomicUsize,
    lists_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, user_id: usize, genre: &str, status: &str, rating: Option<f64>) -> usize {
        self.insert_record(NewEntertainment {
            user_id: Some(user_id),
            fields: EntertainmentFields {
                title: Some(format!("title {}", genre)),
                genre: Some(genre.to_string()),
                status: Some(status.to_string()),
                category: Some("Movie".to_string()),
                rating,
                ..Default::default()
            },
            photo: None,
        })
        .unwrap()
    }

    pub fn stored(&self, user_id: usize) -> Option<StatisticsSummary> {
        self.statistics.lock().unwrap().get(&user_id).cloned()
    }
}

impl EntertainmentStore for MemoryStore {
    fn list_records(&self, user_id: usize) -> Result<Vec<EntertainmentRecord>> {
        if self.fail_list.load(Ordering::SeqCst) {
            bail!("records unavailable");
        }
        let in_flight = self.lists_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_overlapping_lists
            .fetch_max(in_flight, Ordering::SeqCst);
        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        let records: Vec<EntertainmentRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == Some(user_id))
            .cloned()
            .collect();
        self.lists_in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(records)
    }

    fn list_filtered(&self, filter: &ListFilter) -> Result<Vec<EntertainmentRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.user_id.is_none() || r.user_id == filter.user_id)
            .rev()
            .cloned()
            .collect())
    }

    fn get_record(&self, id: usize) -> Result<Option<EntertainmentRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    fn insert_record(&self, record: NewEntertainment) -> Result<usize> {
        if self.fail_write.load(Ordering::SeqCst) {
            bail!("records are read only");
        }
        let mut records = self.records.lock().unwrap();
        let id = records.len() + 1;
        let fields = record.fields;
        records.push(EntertainmentRecord {
            id,
            user_id: record.user_id,
            title: fields.title,
            description: fields.description,
            genre: fields.genre,
            photo: record.photo,
            category: fields.category,
            status: fields.status,
            rating: fields.rating,
            created_at: id as i64,
        });
        Ok(id)
    }

    fn update_record(
        &self,
        id: usize,
        fields: EntertainmentFields,
        photo: Option<String>,
    ) -> Result<bool> {
        if self.fail_write.load(Ordering::SeqCst) {
            bail!("records are read only");
        }
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.title = fields.title;
                r.description = fields.description;
                r.genre = fields.genre;
                r.category = fields.category;
                r.status = fields.status;
                r.rating = fields.rating;
                r.photo = photo;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_record(&self, id: usize) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}

impl StatisticsStore for MemoryStore {
    fn upsert_statistics(&self, user_id: usize, summary: &StatisticsSummary) -> Result<()> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            bail!("statistics unavailable");
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.statistics
            .lock()
            .unwrap()
            .insert(user_id, summary.clone());
        Ok(())
    }

    fn get_statistics(&self, user_id: usize) -> Result<Option<UserStatistics>> {
        if self.fail_get.load(Ordering::SeqCst) {
            bail!("statistics unavailable");
        }
        Ok(self.stored(user_id).map(|summary| UserStatistics { user_id, summary }))
    }
}
