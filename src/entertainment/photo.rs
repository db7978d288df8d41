//! Storage of uploaded record photos on the local filesystem.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

/// URL prefix under which the uploads directory is served, also used as the prefix of
/// the photo path stored in each record.
pub const PHOTO_PATH_PREFIX: &str = "uploads";

const MAX_NAME_ATTEMPTS: u64 = 1000;

#[derive(Error, Debug)]
pub enum PhotoStoreError {
    #[error("Uploaded photo is empty")]
    Empty,

    #[error("Uploaded file is not an image")]
    NotAnImage,

    #[error("Could not find a free file name for the photo")]
    NoFreeName,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct PhotoStore {
    uploads_dir: PathBuf,
}

impl PhotoStore {
    pub fn new<P: AsRef<Path>>(uploads_dir: P) -> Self {
        Self {
            uploads_dir: uploads_dir.as_ref().to_path_buf(),
        }
    }

    /// Writes the photo to the uploads directory as `<unix millis><extension>` and
    /// returns the path to store in the record, e.g. `uploads/1700000000000.jpg`.
    pub fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, PhotoStoreError> {
        if bytes.is_empty() {
            return Err(PhotoStoreError::Empty);
        }
        let kind = infer::get(bytes).ok_or(PhotoStoreError::NotAnImage)?;
        if !kind.mime_type().starts_with("image/") {
            return Err(PhotoStoreError::NotAnImage);
        }

        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| format!(".{}", kind.extension()));

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = format!("{}{}", millis + attempt, extension);
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.uploads_dir.join(&file_name));
            match file {
                Ok(mut file) => {
                    let path = self.uploads_dir.join(&file_name);
                    if let Err(err) = file.write_all(bytes) {
                        drop(file);
                        if let Err(remove_err) = fs::remove_file(&path) {
                            warn!("Failed to remove partial photo {:?}: {}", path, remove_err);
                        }
                        return Err(err.into());
                    }
                    return Ok(format!("{}/{}", PHOTO_PATH_PREFIX, file_name));
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(PhotoStoreError::NoFreeName)
    }

    /// Deletes a photo previously returned by [`PhotoStore::save`]. Paths outside the
    /// uploads directory are ignored.
    pub fn remove(&self, stored_path: &str) {
        let file_name = match stored_path
            .strip_prefix(PHOTO_PATH_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(name) if !name.is_empty() && !name.contains(['/', '\\']) && name != ".." => {
                name
            }
            _ => {
                warn!("Not removing photo outside of uploads: {}", stored_path);
                return;
            }
        };
        match fs::remove_file(self.uploads_dir.join(file_name)) {
            Ok(()) => debug!("Removed photo {}", stored_path),
            Err(err) => warn!("Failed to remove photo {}: {}", stored_path, err),
        }
    }
}
