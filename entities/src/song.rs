use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, PartialEq, Eq, Hash, Clone, Debug, Serialize)]
pub struct Song {
    pub music_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub year: i64,
    pub lyrics: String,
    pub owner: String,
}

impl Song {
    /// Case-insensitive substring search over the denormalized fields.
    /// The query is trimmed first; an empty query matches every song.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        [
            self.music_id.to_lowercase(),
            self.title.to_lowercase(),
            self.artist.to_lowercase(),
            self.album.to_lowercase(),
            self.genre.to_lowercase(),
            self.year.to_string(),
        ]
        .iter()
        .any(|field| field.contains(&needle))
    }
}

/// Upload payload. The catalog generates the id and stamps the owner in.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub year: i64,
    pub lyrics: String,
    pub owner: String,
}

/// Full-field overwrite of a song's mutable metadata.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Deserialize)]
pub struct SongUpdate {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub year: i64,
    pub lyrics: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> Song {
        Song {
            music_id: "a1b2".to_string(),
            title: "Night Drive".to_string(),
            artist: "The Streetlights".to_string(),
            album: "Sodium Glow".to_string(),
            genre: "Synthwave".to_string(),
            year: 1987,
            lyrics: "...".to_string(),
            owner: "creator".to_string(),
        }
    }

    #[test]
    fn matches_is_case_insensitive() {
        assert!(song().matches("night"));
        assert!(song().matches("STREETLIGHTS"));
        assert!(song().matches("sOdIuM"));
    }

    #[test]
    fn matches_trims_the_query() {
        assert!(song().matches("  glow  "));
    }

    #[test]
    fn matches_year_as_text() {
        assert!(song().matches("1987"));
        assert!(song().matches("98"));
    }

    #[test]
    fn matches_id_field() {
        assert!(song().matches("a1b"));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(song().matches(""));
        assert!(song().matches("   "));
    }

    #[test]
    fn lyrics_are_not_searched() {
        let mut s = song();
        s.lyrics = "zebra".to_string();
        assert!(!s.matches("zebra"));
    }
}
