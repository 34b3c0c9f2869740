//! Core services of a small music-streaming application: identity, song
//! catalog, playlists and moderation over one injected record store. The
//! HTTP layer, sessions and upload plumbing live in the hosting application;
//! this crate only consumes a resolved `(username, role)` identity.

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod media;
pub mod moderation;
pub mod playlists;

pub use catalog::CatalogService;
pub use config::Config;
pub use error::{Error, Result};
pub use identity::IdentityService;
pub use media::MediaStore;
pub use moderation::ModerationService;
pub use playlists::PlaylistService;
pub use queries::{RecordStore, StoreError, Table, Value};

/// The assembled services, all sharing one record store handle.
pub struct App {
    pub identity: IdentityService,
    pub catalog: CatalogService,
    pub playlists: PlaylistService,
    pub moderation: ModerationService,
}

impl App {
    pub fn new(store: RecordStore, media: MediaStore) -> App {
        let moderation = ModerationService::new(store.clone());
        App {
            identity: IdentityService::new(store.clone()),
            catalog: CatalogService::new(store.clone(), media, moderation.clone()),
            playlists: PlaylistService::new(store),
            moderation,
        }
    }

    pub async fn from_config(config: &Config) -> Result<App> {
        let store = RecordStore::connect(&config.database).await?;
        Ok(App::new(store, MediaStore::new(config.media.as_str())))
    }
}

/// Stderr logging for binaries and tests, in the hosting application's hands.
pub fn init_logging(verbosity: usize, quiet: bool) -> std::result::Result<(), log::SetLoggerError> {
    stderrlog::new()
        .verbosity(verbosity)
        .quiet(quiet)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .init()
}
