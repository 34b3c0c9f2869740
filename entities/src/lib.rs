pub mod blacklist;
pub mod playlist;
pub mod song;
pub mod user;

pub use blacklist::BlacklistEntry;
pub use playlist::{Playlist, Privacy};
pub use song::{NewSong, Song, SongUpdate};
pub use user::{Role, User};
