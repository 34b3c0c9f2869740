use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account category stored per user. Gates which operations a session may call.
#[derive(sqlx::Type, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[repr(i32)]
pub enum Role {
    Admin = 0,
    Listener = 1,
    Creator = 2,
}

#[derive(FromRow, PartialEq, Eq, Hash, Clone, Debug, Serialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}
