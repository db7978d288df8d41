use super::schema::TRACKER_VERSIONED_SCHEMAS;
use crate::entertainment::{
    EntertainmentFields, EntertainmentRecord, EntertainmentStore, ListFilter, NewEntertainment,
};
use crate::sqlite_persistence::migrate_if_needed;
use crate::statistics::{StatisticsStore, StatisticsSummary, UserStatistics};
use crate::user::{PasswordCredentials, User, UserCredentialsStore, UserStore};
use anyhow::{anyhow, Context, Result};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const ENTERTAINMENT_COLUMNS: &str =
    "id, user_id, title, description, genre, photo, category, status, rating, created_at";

/// Reads a rating the way the aggregation expects it: NULL is no rating, while a
/// value that is not a number counts as 0.
fn rating_from_sql(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(r) => Some(r),
        ValueRef::Text(bytes) => Some(
            std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|r| r.is_finite())
                .unwrap_or(0.0),
        ),
        ValueRef::Blob(_) => Some(0.0),
    }
}

fn row_to_record(row: &Row) -> rusqlite::Result<EntertainmentRecord> {
    Ok(EntertainmentRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        genre: row.get("genre")?,
        photo: row.get("photo")?,
        category: row.get("category")?,
        status: row.get("status")?,
        rating: rating_from_sql(row.get_ref("rating")?),
        created_at: row.get("created_at")?,
    })
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
    })
}

pub struct SqliteTrackerStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTrackerStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open tracker database {:?}", path))?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        if is_new_db {
            info!("Creating new tracker database at {:?}", path);
            TRACKER_VERSIONED_SCHEMAS
                .last()
                .context("No tracker schema defined")?
                .create(&conn)?;
        } else {
            migrate_if_needed(&conn, TRACKER_VERSIONED_SCHEMAS)
                .with_context(|| format!("Invalid tracker database {:?}", path))?;
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Tracker database connection lock poisoned"))
    }

    fn query_user(&self, column: &str, value: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT id, username, email FROM user WHERE {} = ?1", column),
                params![value],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }
}

impl EntertainmentStore for SqliteTrackerStore {
    fn list_records(&self, user_id: usize) -> Result<Vec<EntertainmentRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM entertainment WHERE user_id = ?1 ORDER BY id ASC",
            ENTERTAINMENT_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![user_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn list_filtered(&self, filter: &ListFilter) -> Result<Vec<EntertainmentRecord>> {
        let mut sql = format!("SELECT {} FROM entertainment WHERE 1=1", ENTERTAINMENT_COLUMNS);
        let mut values: Vec<Value> = vec![];

        if let Some(user_id) = filter.user_id {
            values.push(Value::Integer(user_id as i64));
            sql.push_str(&format!(" AND user_id = ?{}", values.len()));
        }
        if let Some(search) = &filter.title_search {
            values.push(Value::Text(format!("%{}%", search)));
            sql.push_str(&format!(" AND title LIKE ?{}", values.len()));
        }
        if let Some(genre) = &filter.genre {
            values.push(Value::Text(format!("%{}%", genre)));
            sql.push_str(&format!(" AND genre LIKE ?{}", values.len()));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn get_record(&self, id: usize) -> Result<Option<EntertainmentRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM entertainment WHERE id = ?1",
                    ENTERTAINMENT_COLUMNS
                ),
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn insert_record(&self, record: NewEntertainment) -> Result<usize> {
        let conn = self.conn()?;
        let fields = record.fields;
        conn.execute(
            "INSERT INTO entertainment \
             (user_id, title, description, genre, photo, category, status, rating) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.user_id,
                fields.title,
                fields.description,
                fields.genre,
                record.photo,
                fields.category,
                fields.status,
                fields.rating,
            ],
        )
        .context("Failed to insert entertainment record")?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn update_record(
        &self,
        id: usize,
        fields: EntertainmentFields,
        photo: Option<String>,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE entertainment SET title = ?1, description = ?2, genre = ?3, photo = ?4, \
                 category = ?5, status = ?6, rating = ?7 WHERE id = ?8",
                params![
                    fields.title,
                    fields.description,
                    fields.genre,
                    photo,
                    fields.category,
                    fields.status,
                    fields.rating,
                    id,
                ],
            )
            .with_context(|| format!("Failed to update entertainment record {}", id))?;
        Ok(changed > 0)
    }

    fn delete_record(&self, id: usize) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM entertainment WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete entertainment record {}", id))?;
        Ok(deleted > 0)
    }
}

impl StatisticsStore for SqliteTrackerStore {
    fn upsert_statistics(&self, user_id: usize, summary: &StatisticsSummary) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO statistics \
             (user_id, total_entries, completed_count, average_rating, favorite_genre) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(user_id) DO UPDATE SET \
             total_entries = excluded.total_entries, \
             completed_count = excluded.completed_count, \
             average_rating = excluded.average_rating, \
             favorite_genre = excluded.favorite_genre, \
             updated = cast(strftime('%s','now') as int)",
            params![
                user_id,
                summary.total_entries,
                summary.completed_count,
                summary.average_rating,
                summary.favorite_genre,
            ],
        )?;
        Ok(())
    }

    fn get_statistics(&self, user_id: usize) -> Result<Option<UserStatistics>> {
        let conn = self.conn()?;
        let stats = conn
            .query_row(
                "SELECT user_id, total_entries, completed_count, average_rating, favorite_genre \
                 FROM statistics WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserStatistics {
                        user_id: row.get(0)?,
                        summary: StatisticsSummary {
                            total_entries: row.get(1)?,
                            completed_count: row.get(2)?,
                            average_rating: row.get(3)?,
                            favorite_genre: row.get(4)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(stats)
    }
}

impl UserCredentialsStore for SqliteTrackerStore {
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT salt, hash, hasher FROM user_password_credentials WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((salt, hash, hasher)) => Ok(Some(PasswordCredentials {
                user_id,
                salt,
                hash,
                hasher: hasher.parse()?,
            })),
        }
    }

    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO user_password_credentials (user_id, salt, hash, hasher) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(user_id) DO UPDATE SET \
             salt = excluded.salt, hash = excluded.hash, hasher = excluded.hasher",
            params![
                credentials.user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string(),
            ],
        )
        .with_context(|| {
            format!(
                "Failed to store password credentials of user {}",
                credentials.user_id
            )
        })?;
        Ok(())
    }
}

impl UserStore for SqliteTrackerStore {
    fn create_user(&self, username: &str, email: &str) -> Result<usize> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO user (username, email) VALUES (?1, ?2)",
            params![username, email],
        )
        .with_context(|| format!("Failed to create user {}", username))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email FROM user WHERE id = ?1",
                params![user_id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user("email", email)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.query_user("username", username)
    }

    fn update_user_profile(&self, user_id: usize, username: &str, email: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE user SET username = ?1, email = ?2 WHERE id = ?3",
                params![username, email, user_id],
            )
            .with_context(|| format!("Failed to update user {}", user_id))?;
        Ok(changed > 0)
    }
}
