//! Generic per-table accessor over the relational backing store.
//!
//! Every higher service reads and writes through [`RecordStore`]; the only
//! write primitive they use is [`RecordStore::insert_if_absent`], which is a
//! single conflict-aware statement so concurrent callers cannot both pass the
//! existence check.

use std::str::FromStr;

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate primary key")]
    ConstraintViolation,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::ConstraintViolation,
        _ => StoreError::Database(err),
    }
}

/// The named tables of the schema, each with its designated primary key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    Users,
    Music,
    Playlists,
    Blacklist,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Music => "music",
            Table::Playlists => "playlists",
            Table::Blacklist => "blacklist",
        }
    }

    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::Users => "username",
            Table::Music => "music_id",
            Table::Playlists => "playlist_id",
            Table::Blacklist => "text",
        }
    }
}

/// A positional parameter for an insert or a raw statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Integer(number)
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users
     (
         username VARCHAR(20) PRIMARY KEY NOT NULL,
         password_hash VARCHAR(64) NOT NULL,
         name VARCHAR(20) NOT NULL,
         role INT NOT NULL
     )",
    "CREATE TABLE IF NOT EXISTS music
     (
         music_id VARCHAR(40) PRIMARY KEY NOT NULL,
         title VARCHAR(20) NOT NULL,
         artist VARCHAR(20) NOT NULL,
         album VARCHAR(20) NOT NULL,
         genre VARCHAR(20) NOT NULL,
         year INT NOT NULL,
         lyrics VARCHAR(1000) NOT NULL,
         owner VARCHAR(20) NOT NULL
     )",
    "CREATE TABLE IF NOT EXISTS playlists
     (
         playlist_id VARCHAR(20) PRIMARY KEY NOT NULL,
         name VARCHAR(20) NOT NULL,
         owner VARCHAR(20) NOT NULL,
         music_ids VARCHAR(200) NOT NULL, -- comma separated list of music_ids
         privacy INT NOT NULL DEFAULT 0
     )",
    "CREATE TABLE IF NOT EXISTS blacklist
     (
         text VARCHAR(20) PRIMARY KEY NOT NULL
     )",
];

/// Handle over the backing store. Cheap to clone; construct one and inject it
/// into the services instead of sharing a process-wide connection.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Opens (creating if missing) the database at `url` and bootstraps the
    /// schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = RecordStore { pool };
        store.create_tables().await?;
        info!("Record store ready at {}", url);
        Ok(store)
    }

    /// An isolated in-memory store. A single connection keeps every caller on
    /// the same memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = RecordStore { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Appends a row; the store itself rejects a duplicate primary key with
    /// [`StoreError::ConstraintViolation`], nothing is pre-checked.
    pub async fn insert(&self, table: Table, values: &[Value]) -> Result<(), StoreError> {
        let placeholders = vec!["?"; values.len()].join(", ");
        let sql = format!("INSERT INTO {} VALUES ({})", table.name(), placeholders);
        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                Value::Text(text) => query.bind(text.clone()),
                Value::Integer(number) => query.bind(*number),
            };
        }
        query.execute(&self.pool).await.map_err(classify)?;
        Ok(())
    }

    /// The row whose primary-key column equals `key`, if any.
    pub async fn fetch_one<T>(&self, table: Table, key: &str) -> Result<Option<T>, StoreError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            table.name(),
            table.primary_key()
        );
        let row = sqlx::query_as(&sql)
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Every row of `table`, in store order.
    pub async fn fetch_all<T>(&self, table: Table) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {}", table.name());
        let rows = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn exists(&self, table: Table, key: &str) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            table.primary_key(),
            table.name(),
            table.primary_key()
        );
        let row = sqlx::query(&sql)
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// True iff any row's key column contains `needle`, case-insensitive.
    /// The needle is bound as a parameter, never spliced into the statement.
    pub async fn substring_match(&self, table: Table, needle: &str) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE lower({}) LIKE '%' || lower(?) || '%'",
            table.primary_key(),
            table.name(),
            table.primary_key()
        );
        let row = sqlx::query(&sql)
            .bind(needle.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Inserts only if the primary key is absent, as one conflict-aware
    /// statement. Returns whether a row was written.
    pub async fn insert_if_absent(&self, table: Table, values: &[Value]) -> Result<bool, StoreError> {
        let placeholders = vec!["?"; values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} VALUES ({}) ON CONFLICT({}) DO NOTHING",
            table.name(),
            placeholders,
            table.primary_key()
        );
        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                Value::Text(text) => query.bind(text.clone()),
                Value::Integer(number) => query.bind(*number),
            };
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Escape hatch for the update and delete statements the typed accessors
    /// do not cover. Returns the number of affected rows.
    pub async fn execute(&self, statement: &str, params: &[Value]) -> Result<u64, StoreError> {
        let mut query = sqlx::query(statement);
        for value in params {
            query = match value {
                Value::Text(text) => query.bind(text.clone()),
                Value::Integer(number) => query.bind(*number),
            };
        }
        let result = query.execute(&self.pool).await.map_err(classify)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(FromRow, Debug, PartialEq, Eq)]
    struct BlacklistRow {
        text: String,
    }

    #[derive(FromRow, Debug, PartialEq, Eq)]
    struct UserRow {
        username: String,
        password_hash: String,
        name: String,
        role: i64,
    }

    fn user_values(username: &str) -> Vec<Value> {
        vec![
            Value::from(username),
            Value::from("HASH"),
            Value::from("Someone"),
            Value::from(1i64),
        ]
    }

    #[tokio::test]
    async fn insert_then_fetch_one_round_trips() {
        let store = RecordStore::in_memory().await.unwrap();
        store.insert(Table::Users, &user_values("alice")).await.unwrap();

        let row: Option<UserRow> = store.fetch_one(Table::Users, "alice").await.unwrap();
        let row = row.unwrap();
        assert_eq!(row.username, "alice");
        assert_eq!(row.password_hash, "HASH");
        assert_eq!(row.role, 1);
    }

    #[tokio::test]
    async fn fetch_one_of_missing_key_is_none() {
        let store = RecordStore::in_memory().await.unwrap();
        let row: Option<UserRow> = store.fetch_one(Table::Users, "nobody").await.unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_constraint_violation() {
        let store = RecordStore::in_memory().await.unwrap();
        store.insert(Table::Users, &user_values("alice")).await.unwrap();

        let err = store.insert(Table::Users, &user_values("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation));
    }

    #[tokio::test]
    async fn insert_if_absent_reports_whether_it_wrote() {
        let store = RecordStore::in_memory().await.unwrap();
        assert!(store
            .insert_if_absent(Table::Users, &user_values("bob"))
            .await
            .unwrap());
        assert!(!store
            .insert_if_absent(Table::Users, &user_values("bob"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn insert_if_absent_does_not_alter_the_existing_row() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert_if_absent(Table::Users, &user_values("bob"))
            .await
            .unwrap();
        let mut replacement = user_values("bob");
        replacement[2] = Value::from("Somebody Else");
        store
            .insert_if_absent(Table::Users, &replacement)
            .await
            .unwrap();

        let row: Option<UserRow> = store.fetch_one(Table::Users, "bob").await.unwrap();
        assert_eq!(row.unwrap().name, "Someone");
    }

    #[tokio::test]
    async fn exists_tracks_fetch_one() {
        let store = RecordStore::in_memory().await.unwrap();
        assert!(!store.exists(Table::Blacklist, "spam").await.unwrap());
        store
            .insert(Table::Blacklist, &[Value::from("spam")])
            .await
            .unwrap();
        assert!(store.exists(Table::Blacklist, "spam").await.unwrap());
    }

    #[tokio::test]
    async fn substring_match_is_case_insensitive_containment() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert(Table::Blacklist, &[Value::from("Forbidden Word")])
            .await
            .unwrap();

        assert!(store
            .substring_match(Table::Blacklist, "forbidden")
            .await
            .unwrap());
        assert!(store
            .substring_match(Table::Blacklist, "DEN WO")
            .await
            .unwrap());
        assert!(!store
            .substring_match(Table::Blacklist, "allowed")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn substring_match_needle_is_bound_not_spliced() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert(Table::Blacklist, &[Value::from("plain")])
            .await
            .unwrap();

        // A hostile needle is just a needle.
        assert!(!store
            .substring_match(Table::Blacklist, "' OR '1'='1")
            .await
            .unwrap());
        assert!(!store
            .substring_match(Table::Blacklist, "x'; DROP TABLE blacklist; --")
            .await
            .unwrap());
        assert!(store.exists(Table::Blacklist, "plain").await.unwrap());
    }

    #[tokio::test]
    async fn fetch_all_returns_rows_in_insertion_order() {
        let store = RecordStore::in_memory().await.unwrap();
        for text in ["one", "two", "three"] {
            store
                .insert(Table::Blacklist, &[Value::from(text)])
                .await
                .unwrap();
        }

        let rows: Vec<BlacklistRow> = store.fetch_all(Table::Blacklist).await.unwrap();
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn execute_runs_raw_updates_and_deletes() {
        let store = RecordStore::in_memory().await.unwrap();
        store.insert(Table::Users, &user_values("carol")).await.unwrap();

        let affected = store
            .execute(
                "UPDATE users SET name = ? WHERE username = ?",
                &[Value::from("Carol"), Value::from("carol")],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let affected = store
            .execute("DELETE FROM users WHERE username = ?", &[Value::from("carol")])
            .await
            .unwrap();
        assert_eq!(affected, 1);
        assert!(!store.exists(Table::Users, "carol").await.unwrap());
    }
}
