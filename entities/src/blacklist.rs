use serde::Serialize;
use sqlx::FromRow;

/// A forbidden term screened against new song titles and artists at upload time.
#[derive(FromRow, PartialEq, Eq, Hash, Clone, Debug, Serialize)]
pub struct BlacklistEntry {
    pub text: String,
}
