use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database-agnostic thread model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    /// Storage id of the authoring user
    pub author: String,
    /// Set on replies only
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a thread about to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewThread {
    pub author: String,
    pub parent_id: Option<String>,
    pub text: String,
}

impl NewThread {
    pub fn top_level(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            parent_id: None,
            text: text.into(),
        }
    }

    pub fn reply(
        author: impl Into<String>,
        parent_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            parent_id: Some(parent_id.into()),
            text: text.into(),
        }
    }
}
