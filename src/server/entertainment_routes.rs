//! Listing and CRUD of entertainment records. Every successful mutation kicks off a
//! detached statistics recompute for the owner of the record.

use super::metrics::record_error;
use super::response::{failure, success};
use super::state::{GuardedEntertainmentStore, GuardedPhotoStore, ServerState};
use crate::entertainment::{
    parse_rating, EntertainmentFields, ListFilter, NewEntertainment, PhotoStoreError,
};
use crate::statistics::StatisticsRecomputer;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};

const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

#[derive(Deserialize, Debug, Default)]
struct ListQuery {
    #[serde(rename = "userId")]
    pub user_id_camel: Option<String>,
    pub user_id: Option<String>,
    pub query: Option<String>,
    pub search: Option<String>,
    pub genre: Option<String>,
}

/// A record form as posted by clients, photo bytes included.
#[derive(Default)]
struct EntertainmentForm {
    user_id: Option<usize>,
    fields: EntertainmentFields,
    photo: Option<(Option<String>, Vec<u8>)>,
}

fn parse_optional_id(raw: Option<&str>) -> Result<Option<usize>, ()> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s.parse::<usize>().map(Some).map_err(|_| ()),
    }
}

fn store_error(message: &'static str, err: anyhow::Error) -> Response {
    error!("{}: {:#}", message, err);
    record_error("record_store", "entertainments");
    failure(StatusCode::INTERNAL_SERVER_ERROR, message)
}

async fn read_form(mut multipart: Multipart) -> Result<EntertainmentForm, Response> {
    let mut form = EntertainmentForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart body: {}", e);
        failure(StatusCode::BAD_REQUEST, "Malformed form data")
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "photo" {
            let file_name = field.file_name().map(|s| s.to_string());
            match field.bytes().await {
                // Browsers send an empty part when no file was picked.
                Ok(bytes) if bytes.is_empty() => {}
                Ok(bytes) => form.photo = Some((file_name, bytes.to_vec())),
                Err(e) => {
                    warn!("Failed to read photo data: {}", e);
                    return Err(failure(StatusCode::BAD_REQUEST, "Failed to read photo"));
                }
            }
            continue;
        }

        let value = match field.text().await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read form field {}: {}", field_name, e);
                return Err(failure(StatusCode::BAD_REQUEST, "Malformed form data"));
            }
        };
        match field_name.as_str() {
            "user_id" => {
                form.user_id = parse_optional_id(Some(value.as_str())).unwrap_or_else(|_| {
                    warn!("Ignoring non numeric user_id {:?}", value);
                    None
                })
            }
            "title" => form.fields.title = Some(value),
            "description" => form.fields.description = Some(value),
            "genre" => form.fields.genre = Some(value),
            "category" => form.fields.category = Some(value),
            "status" => form.fields.status = Some(value),
            "rating" => form.fields.rating = parse_rating(&value),
            _ => {}
        }
    }
    Ok(form)
}

fn save_photo(
    photo_store: &GuardedPhotoStore,
    photo: Option<(Option<String>, Vec<u8>)>,
) -> Result<Option<String>, Response> {
    let (file_name, bytes) = match photo {
        Some(photo) => photo,
        None => return Ok(None),
    };
    match photo_store.save(file_name.as_deref(), &bytes) {
        Ok(path) => Ok(Some(path)),
        Err(err @ (PhotoStoreError::NotAnImage | PhotoStoreError::Empty)) => {
            Err(failure(StatusCode::BAD_REQUEST, err.to_string()))
        }
        Err(err) => {
            error!("Failed to store photo: {}", err);
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store photo",
            ))
        }
    }
}

async fn list_entertainments(
    State(store): State<GuardedEntertainmentStore>,
    Query(query): Query<ListQuery>,
) -> Response {
    let raw_user_id = query.user_id_camel.as_deref().or(query.user_id.as_deref());
    let user_id = match parse_optional_id(raw_user_id) {
        Ok(user_id) => user_id,
        Err(_) => return failure(StatusCode::BAD_REQUEST, "Invalid user id"),
    };
    let filter = ListFilter::new(user_id, query.query.or(query.search), query.genre);

    match store.list_filtered(&filter) {
        Ok(records) => success(None, Some(records)),
        Err(err) => store_error("Failed to list records", err),
    }
}

async fn get_entertainment(
    State(store): State<GuardedEntertainmentStore>,
    Path(id): Path<usize>,
) -> Response {
    match store.get_record(id) {
        Ok(Some(record)) => success(Some("Record found"), Some(record)),
        Ok(None) => failure(StatusCode::NOT_FOUND, "Record not found"),
        Err(err) => store_error("Failed to get record", err.context(format!("record {}", id))),
    }
}

async fn insert_entertainment(
    State(store): State<GuardedEntertainmentStore>,
    State(photo_store): State<GuardedPhotoStore>,
    State(recomputer): State<StatisticsRecomputer>,
    multipart: Multipart,
) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let photo = match save_photo(&photo_store, form.photo) {
        Ok(photo) => photo,
        Err(response) => return response,
    };

    let user_id = form.user_id;
    let id = match store.insert_record(NewEntertainment {
        user_id,
        fields: form.fields,
        photo: photo.clone(),
    }) {
        Ok(id) => id,
        Err(err) => {
            if let Some(photo) = photo {
                photo_store.remove(&photo);
            }
            return store_error("Failed to save record", err);
        }
    };
    info!("Inserted record {} for user {:?}", id, user_id);

    recomputer.spawn_recompute(user_id);

    match store.get_record(id) {
        Ok(record) => success(Some("Record saved"), record),
        Err(err) => {
            warn!("Record {} saved but could not be read back: {:#}", id, err);
            success::<()>(Some("Record saved"), None)
        }
    }
}

async fn update_entertainment(
    State(store): State<GuardedEntertainmentStore>,
    State(photo_store): State<GuardedPhotoStore>,
    State(recomputer): State<StatisticsRecomputer>,
    Path(id): Path<usize>,
    multipart: Multipart,
) -> Response {
    let previous = match store.get_record(id) {
        Ok(Some(record)) => record,
        Ok(None) => return failure(StatusCode::NOT_FOUND, "Record not found"),
        Err(err) => {
            return store_error("Failed to get record", err.context(format!("record {}", id)))
        }
    };

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let new_photo = match save_photo(&photo_store, form.photo) {
        Ok(photo) => photo,
        Err(response) => return response,
    };
    let photo = new_photo.clone().or(previous.photo);

    let updated = store.update_record(id, form.fields, photo);
    if !matches!(updated, Ok(true)) {
        if let Some(new_photo) = new_photo {
            photo_store.remove(&new_photo);
        }
    }
    match updated {
        Ok(true) => {}
        Ok(false) => return failure(StatusCode::NOT_FOUND, "Record not found"),
        Err(err) => {
            return store_error("Failed to update record", err.context(format!("record {}", id)))
        }
    }

    match store.get_record(id) {
        Ok(Some(record)) => {
            recomputer.spawn_recompute(record.user_id);
            success(Some("Record updated"), Some(record))
        }
        Ok(None) => success::<()>(Some("Record updated"), None),
        Err(err) => {
            warn!("Record {} updated but could not be read back: {:#}", id, err);
            recomputer.spawn_recompute(previous.user_id);
            success::<()>(Some("Record updated"), None)
        }
    }
}

async fn delete_entertainment(
    State(store): State<GuardedEntertainmentStore>,
    State(recomputer): State<StatisticsRecomputer>,
    Path(id): Path<usize>,
) -> Response {
    // The owner must be known before the row is gone.
    let owner = match store.get_record(id) {
        Ok(Some(record)) => record.user_id,
        Ok(None) => return failure(StatusCode::NOT_FOUND, "Record not found"),
        Err(err) => {
            return store_error("Failed to get record", err.context(format!("record {}", id)))
        }
    };

    match store.delete_record(id) {
        Ok(true) => {
            info!("Deleted record {} of user {:?}", id, owner);
            recomputer.spawn_recompute(owner);
            success::<()>(Some("Record deleted"), None)
        }
        Ok(false) => failure(StatusCode::NOT_FOUND, "Record not found"),
        Err(err) => store_error("Failed to delete record", err.context(format!("record {}", id))),
    }
}

pub fn make_entertainment_routes(state: ServerState) -> Router {
    Router::new()
        .route("/entertainments", get(list_entertainments))
        .route("/entertainments/{id}", get(get_entertainment))
        .route("/insert-entertainment", post(insert_entertainment))
        .route("/update-entertainment/{id}", put(update_entertainment))
        .route("/delete-entertainment/{id}", delete(delete_entertainment))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .with_state(state)
}
