use std::sync::Arc;

use entities::{NewSong, Song, SongUpdate};
use log::{info, warn};
use queries::{RecordStore, Table, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::media::MediaStore;
use crate::moderation::ModerationService;

/// Song CRUD plus in-memory search. Uploads are screened against the
/// blacklist; deletion removes the media blob and the row as a pair.
#[derive(Clone)]
pub struct CatalogService {
    store: RecordStore,
    media: MediaStore,
    moderation: ModerationService,
    // Serializes the file-then-row delete pair across concurrent requests.
    delete_lock: Arc<Mutex<()>>,
}

impl CatalogService {
    pub fn new(
        store: RecordStore,
        media: MediaStore,
        moderation: ModerationService,
    ) -> CatalogService {
        CatalogService {
            store,
            media,
            moderation,
            delete_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Persists the media blob under a fresh id and inserts the song row.
    /// Returns `None` without side effects when the title or artist is
    /// blacklisted. Malformed drafts are a [`Error::ValidationFailed`].
    pub async fn upload_song(&self, song: NewSong, bytes: &[u8]) -> Result<Option<Song>> {
        for (field, label) in [
            (&song.title, "title"),
            (&song.artist, "artist"),
            (&song.owner, "owner"),
        ] {
            if field.trim().is_empty() {
                return Err(Error::ValidationFailed(format!("empty {}", label)));
            }
        }

        if self.moderation.blocks_upload(&song.title, &song.artist).await? {
            warn!("Rejected blacklisted upload {:?} by {:?}", song.title, song.artist);
            return Ok(None);
        }

        let music_id = Uuid::new_v4().to_string();
        self.media.save(&music_id, bytes).await?;
        info!("Saved file {}", music_id);

        let values = [
            Value::from(music_id.as_str()),
            Value::from(song.title.as_str()),
            Value::from(song.artist.as_str()),
            Value::from(song.album.as_str()),
            Value::from(song.genre.as_str()),
            Value::from(song.year),
            Value::from(song.lyrics.as_str()),
            Value::from(song.owner.as_str()),
        ];
        if !self.store.insert_if_absent(Table::Music, &values).await? {
            // The generated id collided; take the orphaned blob back out.
            self.media.delete(&music_id).await?;
            return Ok(None);
        }

        Ok(Some(Song {
            music_id,
            title: song.title,
            artist: song.artist,
            album: song.album,
            genre: song.genre,
            year: song.year,
            lyrics: song.lyrics,
            owner: song.owner,
        }))
    }

    pub async fn fetch_song(&self, music_id: &str) -> Result<Song> {
        self.store
            .fetch_one(Table::Music, music_id)
            .await?
            .ok_or_else(|| Error::NotFound(music_id.to_string()))
    }

    /// Full-field overwrite. A missing row is a [`Error::NotFound`], not a
    /// silent no-op.
    pub async fn update_song(&self, music_id: &str, update: SongUpdate) -> Result<()> {
        let affected = self
            .store
            .execute(
                "UPDATE music SET title = ?, artist = ?, album = ?, genre = ?, year = ?, lyrics = ? \
                 WHERE music_id = ?",
                &[
                    Value::from(update.title),
                    Value::from(update.artist),
                    Value::from(update.album),
                    Value::from(update.genre),
                    Value::from(update.year),
                    Value::from(update.lyrics),
                    Value::from(music_id),
                ],
            )
            .await?;
        if affected == 0 {
            return Err(Error::NotFound(music_id.to_string()));
        }
        Ok(())
    }

    /// Removes the media file and then the row. Returns false and leaves
    /// storage untouched when the id does not exist. A failed file removal
    /// aborts before the row is touched, so the two effects never diverge.
    pub async fn delete_song(&self, music_id: &str) -> Result<bool> {
        let _guard = self.delete_lock.lock().await;

        if !self.store.exists(Table::Music, music_id).await? {
            return Ok(false);
        }
        self.media.delete(music_id).await?;
        self.store
            .execute("DELETE FROM music WHERE music_id = ?", &[Value::from(music_id)])
            .await?;
        info!("Deleted song {}", music_id);
        Ok(true)
    }

    pub async fn list_songs(&self) -> Result<Vec<Song>> {
        Ok(self.store.fetch_all(Table::Music).await?)
    }

    /// Case-insensitive substring filter over the denormalized song fields.
    pub async fn search_songs(&self, query: &str) -> Result<Vec<Song>> {
        let mut songs = self.list_songs().await?;
        songs.retain(|song| song.matches(query));
        Ok(songs)
    }
}
