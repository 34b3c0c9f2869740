use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(sqlx::Type, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[repr(i32)]
pub enum Privacy {
    Public = 0,
    Private = 1,
}

/// A named, ordered list of song ids. `music_ids` is the comma-encoded column
/// straight from the store; ids may dangle (see the playlist service).
#[derive(FromRow, PartialEq, Eq, Hash, Clone, Debug, Serialize)]
pub struct Playlist {
    pub playlist_id: String,
    pub name: String,
    pub owner: String,
    pub music_ids: String,
    pub privacy: Privacy,
}

impl Playlist {
    pub fn song_ids(&self) -> Vec<&str> {
        self.music_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect()
    }
}
