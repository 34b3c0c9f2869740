use serde::Deserialize;

use crate::error::Result;

/// JSON configuration file handed in by whatever hosts the services.
#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    /// Database URL, e.g. `sqlite://music-app.db`.
    pub database: String,
    /// Directory the uploaded media files live in.
    pub media: String,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
