//! Entertainment record models

use serde::Serialize;

/// One logged entertainment item, as stored.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EntertainmentRecord {
    pub id: usize,
    pub user_id: Option<usize>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Comma-separated list of genre tags, free text.
    pub genre: Option<String>,
    /// Relative path of the photo, e.g. `uploads/1700000000000.jpg`.
    pub photo: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub rating: Option<f64>,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// The user-editable part of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntertainmentFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewEntertainment {
    pub user_id: Option<usize>,
    pub fields: EntertainmentFields,
    pub photo: Option<String>,
}

/// Filter for listing records. Every criterion is optional.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub user_id: Option<usize>,
    /// Substring to look for in the title.
    pub title_search: Option<String>,
    /// Substring to look for in the genre list.
    pub genre: Option<String>,
}

impl ListFilter {
    pub fn new(user_id: Option<usize>, title_search: Option<String>, genre: Option<String>) -> Self {
        let title_search = title_search.filter(|s| !s.trim().is_empty());
        // Clients send the literal "null" when no genre chip is selected.
        let genre = genre.filter(|g| !g.trim().is_empty() && g != "null");
        Self {
            user_id,
            title_search,
            genre,
        }
    }
}

/// Parses a rating as typed by a user. Blank input means no rating; input that is
/// not a finite number is dropped as well, which aggregates as a 0 rating.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
