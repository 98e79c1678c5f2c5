use thiserror::Error;
use threadline_types::ValidationErrors;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid object ID: {0}")]
    InvalidObjectId(String),

    #[error("Invalid submission: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A data-access operation failed; `action` names the operation
    #[error("Failed to {action}: {source}")]
    Action {
        action: &'static str,
        #[source]
        source: Box<PersistError>,
    },
}

impl PersistError {
    /// Innermost cause, looking through any `Action` wrappers
    pub fn root(&self) -> &PersistError {
        match self {
            PersistError::Action { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Wraps a storage failure with the name of the operation that hit it
pub(crate) trait ActionContext<T> {
    fn action(self, action: &'static str) -> Result<T>;
}

impl<T> ActionContext<T> for Result<T> {
    fn action(self, action: &'static str) -> Result<T> {
        self.map_err(|source| PersistError::Action {
            action,
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_message_prefix() {
        let err: Result<()> = Err(PersistError::Connection("refused".to_string()));
        let wrapped = err.action("fetch user").unwrap_err();
        assert_eq!(
            wrapped.to_string(),
            "Failed to fetch user: Connection error: refused"
        );
    }

    #[test]
    fn test_root_unwraps_nested_actions() {
        let err: Result<()> = Err(PersistError::InvalidObjectId("zz".to_string()));
        let wrapped = err.action("fetch activity").action("render activity").unwrap_err();
        assert!(matches!(wrapped.root(), PersistError::InvalidObjectId(_)));
    }
}
