use entities::BlacklistEntry;
use log::info;
use queries::{RecordStore, Table, Value};

use crate::error::Result;

/// Forbidden-term list consulted by the catalog's upload path. Terms can be
/// added and listed; there is no removal path.
#[derive(Clone)]
pub struct ModerationService {
    store: RecordStore,
}

impl ModerationService {
    pub fn new(store: RecordStore) -> ModerationService {
        ModerationService { store }
    }

    /// Insert-if-absent; returns whether the term was newly added.
    pub async fn add_to_blacklist(&self, text: &str) -> Result<bool> {
        let added = self
            .store
            .insert_if_absent(Table::Blacklist, &[Value::from(text)])
            .await?;
        if added {
            info!("Blacklisted term {:?}", text);
        }
        Ok(added)
    }

    pub async fn entries(&self) -> Result<Vec<BlacklistEntry>> {
        Ok(self.store.fetch_all(Table::Blacklist).await?)
    }

    /// Whether a song with this title and artist must be rejected. A field is
    /// blocked when a listed term occurs inside it, and also when the field
    /// occurs inside a listed term (the containment direction the store-level
    /// LIKE check applies).
    pub async fn blocks_upload(&self, title: &str, artist: &str) -> Result<bool> {
        let entries = self.entries().await?;
        for field in [title, artist] {
            let folded = field.to_lowercase();
            if entries
                .iter()
                .any(|entry| folded.contains(&entry.text.to_lowercase()))
            {
                return Ok(true);
            }
            if self.store.substring_match(Table::Blacklist, field).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
