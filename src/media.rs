use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;

use crate::error::{Error, Result};

/// Blob store for uploaded audio, keyed by generated song id. One file per
/// song, named after the id, under a single root directory.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> MediaStore {
        MediaStore { root: root.into() }
    }

    pub fn path(&self, music_id: &str) -> PathBuf {
        self.root.join(music_id)
    }

    pub async fn save(&self, music_id: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.path(music_id), bytes).await?;
        Ok(())
    }

    /// Removes the blob. A blob that is already gone counts as removed.
    pub async fn delete(&self, music_id: &str) -> Result<()> {
        match fs::remove_file(self.path(music_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::StorageFailure(err)),
        }
    }

    /// Async handle for a streaming layer to read from.
    pub async fn open(&self, music_id: &str) -> Result<fs::File> {
        match fs::File::open(self.path(music_id)).await {
            Ok(file) => Ok(file),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(music_id.to_string()))
            }
            Err(err) => Err(Error::StorageFailure(err)),
        }
    }
}
