//! SQLite schema of the tracker database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("username", SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("email", SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_email", "email")],
};

const USER_PASSWORD_CREDENTIALS_TABLE_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("salt", SqlType::Text, non_null = true),
        sqlite_column!("hash", SqlType::Text, non_null = true),
        sqlite_column!("hasher", SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};

/// Records may be inserted without an owner, so user_id is neither required nor a
/// foreign key.
const ENTERTAINMENT_TABLE_V_0: Table = Table {
    name: "entertainment",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("user_id", SqlType::Integer),
        sqlite_column!("title", SqlType::Text),
        sqlite_column!("description", SqlType::Text),
        sqlite_column!("genre", SqlType::Text),
        sqlite_column!("photo", SqlType::Text),
        sqlite_column!("category", SqlType::Text),
        sqlite_column!("status", SqlType::Text),
        sqlite_column!("rating", SqlType::Real),
        sqlite_column!(
            "created_at",
            SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_entertainment_user_id", "user_id")],
};

const STATISTICS_TABLE_V_0: Table = Table {
    name: "statistics",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("user_id", SqlType::Integer, non_null = true, is_unique = true),
        sqlite_column!("total_entries", SqlType::Integer, non_null = true),
        sqlite_column!("completed_count", SqlType::Integer, non_null = true),
        sqlite_column!("average_rating", SqlType::Real, non_null = true),
        sqlite_column!("favorite_genre", SqlType::Text, non_null = true),
        sqlite_column!(
            "updated",
            SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};

pub const TRACKER_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        USER_PASSWORD_CREDENTIALS_TABLE_V_0,
        ENTERTAINMENT_TABLE_V_0,
        STATISTICS_TABLE_V_0,
    ],
    migration: None,
}];
