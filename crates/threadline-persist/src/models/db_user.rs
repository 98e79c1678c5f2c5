use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database-agnostic user model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Storage id
    pub id: String,
    /// Subject id issued by the identity provider
    pub auth_id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
    pub onboarded: bool,
    /// Owned top-level threads, oldest first
    pub threads: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile fields written by an upsert keyed on the auth id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
    pub onboarded: bool,
}

/// Minimal author projection attached to populated threads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: String,
    pub auth_id: String,
    pub name: String,
    pub image: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            auth_id: user.auth_id.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}
