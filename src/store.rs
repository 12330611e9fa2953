//! Persistence for the marked reference point.
//!
//! On disk the reference is two independent optional numbers,
//! `saved_latitude` and `saved_longitude`. In memory it is a single
//! `Option<ReferencePoint>`: a file missing either field loads as "no
//! reference set".

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::position::ReferencePoint;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed reference file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the reference point survives process restarts.
pub trait ReferenceStore: Send {
    fn load(&self) -> Result<Option<ReferencePoint>, StoreError>;
    fn save(&self, reference: &ReferencePoint) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedReference {
    #[serde(default)]
    saved_latitude: Option<f64>,
    #[serde(default)]
    saved_longitude: Option<f64>,
}

impl SavedReference {
    fn into_reference(self) -> Option<ReferencePoint> {
        match (self.saved_latitude, self.saved_longitude) {
            (Some(lat), Some(lon)) => Some(ReferencePoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Keeps the reference in a small JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Write to a sibling temp file and rename over the target so a reader
    /// never sees half a file.
    fn write(&self, saved: &SavedReference) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(saved)?;
        let tmp = self.path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp).map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl ReferenceStore for JsonFileStore {
    fn load(&self) -> Result<Option<ReferencePoint>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved reference");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let saved: SavedReference = serde_json::from_slice(&bytes)?;
        Ok(saved.into_reference())
    }

    fn save(&self, reference: &ReferencePoint) -> Result<(), StoreError> {
        self.write(&SavedReference {
            saved_latitude: Some(reference.latitude),
            saved_longitude: Some(reference.longitude),
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Volatile store, for `--no-store` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reference: Mutex<Option<ReferencePoint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(reference: ReferencePoint) -> Self {
        Self {
            reference: Mutex::new(Some(reference)),
        }
    }
}

impl ReferenceStore for MemoryStore {
    fn load(&self) -> Result<Option<ReferencePoint>, StoreError> {
        Ok(*self.reference.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn save(&self, reference: &ReferencePoint) -> Result<(), StoreError> {
        *self.reference.lock().unwrap_or_else(|e| e.into_inner()) = Some(*reference);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.reference.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
