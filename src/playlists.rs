use entities::{Playlist, Privacy, Role, Song, User};
use queries::{RecordStore, Table};

use crate::error::{Error, Result};

/// Playlist retrieval with visibility filtering.
#[derive(Clone)]
pub struct PlaylistService {
    store: RecordStore,
}

impl PlaylistService {
    pub fn new(store: RecordStore) -> PlaylistService {
        PlaylistService { store }
    }

    /// Every playlist for an admin viewer; otherwise the public ones plus the
    /// viewer's own. An unknown viewer sees the public set only.
    pub async fn list_playlists(&self, viewer: &str) -> Result<Vec<Playlist>> {
        let playlists: Vec<Playlist> = self.store.fetch_all(Table::Playlists).await?;

        let user: Option<User> = self.store.fetch_one(Table::Users, viewer).await?;
        if matches!(user, Some(ref user) if user.role == Role::Admin) {
            return Ok(playlists);
        }

        Ok(playlists
            .into_iter()
            .filter(|playlist| playlist.privacy == Privacy::Public || playlist.owner == viewer)
            .collect())
    }

    /// Resolves the playlist's id list to songs, in order. A dangling id is a
    /// hard [`Error::NotFound`].
    pub async fn playlist_songs(&self, playlist: &Playlist) -> Result<Vec<Song>> {
        let mut songs = Vec::new();
        for music_id in playlist.song_ids() {
            let song: Option<Song> = self.store.fetch_one(Table::Music, music_id).await?;
            songs.push(song.ok_or_else(|| Error::NotFound(music_id.to_string()))?);
        }
        Ok(songs)
    }
}
