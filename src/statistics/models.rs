//! Statistics models

use indexmap::IndexMap;
use serde::Serialize;

/// Favorite genre of a user with no genre tags at all.
pub const NO_FAVORITE_GENRE: &str = "-";

/// The denormalized per-user summary, as produced by the aggregator.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StatisticsSummary {
    pub total_entries: usize,
    pub completed_count: usize,
    /// Rounded to one decimal place.
    pub average_rating: f64,
    pub favorite_genre: String,
}

impl StatisticsSummary {
    pub fn empty() -> Self {
        Self {
            total_entries: 0,
            completed_count: 0,
            average_rating: 0.0,
            favorite_genre: NO_FAVORITE_GENRE.to_string(),
        }
    }
}

/// A stored summary row.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserStatistics {
    pub user_id: usize,
    #[serde(flatten)]
    pub summary: StatisticsSummary,
}

/// Occurrence count per label. Labels keep the order in which they were first seen,
/// which is also the order of the keys of the serialized JSON object.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Tally {
    counts: IndexMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, c)| (l.as_str(), *c))
    }

    /// The label with the strictly highest count. On ties the label seen first wins.
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in self.iter() {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((label, count)),
            }
        }
        best.map(|(label, _)| label)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distributions {
    pub genre: Tally,
    pub status: Tally,
    pub category: Tally,
}

/// What a statistics query returns.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsView {
    pub total_entry: usize,
    pub average_rating: f64,
    pub favorite_genre: String,
    pub genre_distribution: Tally,
    pub status_distribution: Tally,
    pub category_distribution: Tally,
}

impl StatisticsView {
    pub fn new(summary: StatisticsSummary, distributions: Distributions) -> Self {
        Self {
            total_entry: summary.total_entries,
            average_rating: summary.average_rating,
            favorite_genre: summary.favorite_genre,
            genre_distribution: distributions.genre,
            status_distribution: distributions.status,
            category_distribution: distributions.category,
        }
    }
}
