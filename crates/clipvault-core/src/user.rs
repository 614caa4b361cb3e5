use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role tag on a user account. Elevated users exist for administrative
/// tooling; the storage engine itself treats both the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserRole {
    #[default]
    Ordinary,
    Elevated,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Ordinary => "ORDINARY",
            UserRole::Elevated => "ELEVATED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "ELEVATED" => UserRole::Elevated,
            _ => UserRole::Ordinary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique, looked up case-sensitively.
    pub email: String,
    pub role: UserRole,
    /// Bytes of plaintext attributed to this user. Accounting only; the
    /// engine's quota check counts snippets instead.
    pub storage_used: u64,
    pub created_at: DateTime<Utc>,
}
