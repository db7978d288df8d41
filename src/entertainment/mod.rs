pub mod models;
pub mod photo;

pub use models::{
    parse_rating, EntertainmentFields, EntertainmentRecord, ListFilter, NewEntertainment,
};
pub use photo::{PhotoStore, PhotoStoreError};

use anyhow::Result;

pub trait EntertainmentStore: Send + Sync {
    /// Returns every record owned by the user, oldest first.
    fn list_records(&self, user_id: usize) -> Result<Vec<EntertainmentRecord>>;

    /// Returns the records matching the filter, newest first.
    fn list_filtered(&self, filter: &ListFilter) -> Result<Vec<EntertainmentRecord>>;

    /// Returns Ok(None) if the record does not exist.
    fn get_record(&self, id: usize) -> Result<Option<EntertainmentRecord>>;

    /// Inserts a new record and returns its id.
    fn insert_record(&self, record: NewEntertainment) -> Result<usize>;

    /// Replaces the editable fields and the photo of a record.
    /// Returns false if the record does not exist.
    fn update_record(
        &self,
        id: usize,
        fields: EntertainmentFields,
        photo: Option<String>,
    ) -> Result<bool>;

    /// Returns false if the record does not exist.
    fn delete_record(&self, id: usize) -> Result<bool>;
}
