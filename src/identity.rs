use entities::{Role, User};
use log::info;
use queries::{RecordStore, Table, Value};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// SHA-256 of the UTF-8 text, rendered as uppercase hex. No per-user salt:
/// the scheme must stay byte-compatible with credentials already stored by
/// existing deployments.
pub fn hash_password(plaintext: &str) -> String {
    Sha256::digest(plaintext.as_bytes())
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect()
}

#[derive(Clone)]
pub struct IdentityService {
    store: RecordStore,
}

impl IdentityService {
    pub fn new(store: RecordStore) -> IdentityService {
        IdentityService { store }
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.store.exists(Table::Users, username).await?)
    }

    pub async fn fetch_user_details(&self, username: &str) -> Result<Option<User>> {
        Ok(self.store.fetch_one(Table::Users, username).await?)
    }

    /// Recomputes the hash of `plaintext` and compares it with the stored
    /// one. An absent user answers false, never an error.
    pub async fn check_password(&self, username: &str, plaintext: &str) -> Result<bool> {
        let user: Option<User> = self.store.fetch_one(Table::Users, username).await?;
        Ok(match user {
            Some(user) => hash_password(plaintext) == user.password_hash,
            None => false,
        })
    }

    /// Returns false when the username is already taken; the existing record
    /// is left untouched in that case.
    pub async fn create_user(
        &self,
        username: &str,
        plaintext: &str,
        name: &str,
        role: Role,
    ) -> Result<bool> {
        let values = [
            Value::from(username),
            Value::from(hash_password(plaintext)),
            Value::from(name),
            Value::from(role as i64),
        ];
        let created = self.store.insert_if_absent(Table::Users, &values).await?;
        if created {
            info!("Created {:?} account {}", role, username);
        }
        Ok(created)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<usize> {
        let users: Vec<User> = self.store.fetch_all(Table::Users).await?;
        Ok(users.into_iter().filter(|user| user.role == role).count())
    }
}
