mod versioned_schema;

pub use versioned_schema::{
    migrate_if_needed, read_db_version, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table,
    VersionedSchema, BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
