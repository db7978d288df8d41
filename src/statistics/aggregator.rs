//! Turns a user's records into a summary and into distribution breakdowns.
//!
//! Everything in here is pure: the same records in the same order always give the
//! same result.

use super::models::{Distributions, StatisticsSummary, Tally, NO_FAVORITE_GENRE};
use crate::entertainment::EntertainmentRecord;

const COMPLETED_STATUS: &str = "completed";

/// Splits a comma-separated genre list into trimmed, non-empty labels.
pub fn split_genres(genre: &str) -> impl Iterator<Item = &str> {
    genre.split(',').map(str::trim).filter(|g| !g.is_empty())
}

fn genre_tally(records: &[EntertainmentRecord]) -> Tally {
    let mut tally = Tally::new();
    for genre in records.iter().filter_map(|r| r.genre.as_deref()) {
        for label in split_genres(genre) {
            tally.add(label);
        }
    }
    tally
}

fn is_completed(record: &EntertainmentRecord) -> bool {
    record
        .status
        .as_deref()
        .map(|s| s.trim().to_lowercase() == COMPLETED_STATUS)
        .unwrap_or(false)
}

/// Non-finite averages (a sum of huge ratings overflowing) are reported as 0, like
/// any other rating that cannot be used.
fn round_one_decimal(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.is_finite() {
        rounded
    } else {
        0.0
    }
}

pub fn summarize(records: &[EntertainmentRecord]) -> StatisticsSummary {
    if records.is_empty() {
        return StatisticsSummary::empty();
    }

    let total_entries = records.len();
    let completed_count = records.iter().filter(|r| is_completed(r)).count();
    let rating_sum: f64 = records
        .iter()
        .map(|r| r.rating.filter(|r| r.is_finite()).unwrap_or(0.0))
        .sum();

    let favorite_genre = genre_tally(records)
        .top()
        .unwrap_or(NO_FAVORITE_GENRE)
        .to_string();

    StatisticsSummary {
        total_entries,
        completed_count,
        average_rating: round_one_decimal(rating_sum / total_entries as f64),
        favorite_genre,
    }
}

/// Genre, status and category breakdowns. Statuses are counted verbatim while
/// categories are lower-cased first; blank values count for neither.
pub fn distributions(records: &[EntertainmentRecord]) -> Distributions {
    let mut status = Tally::new();
    let mut category = Tally::new();
    for record in records {
        if let Some(s) = record.status.as_deref().filter(|s| !s.is_empty()) {
            status.add(s);
        }
        if let Some(c) = record.category.as_deref().filter(|c| !c.is_empty()) {
            category.add(&c.to_lowercase());
        }
    }

    Distributions {
        genre: genre_tally(records),
        status,
        category,
    }
}
