use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};
use crate::models::{Thread, User};

/// MongoDB-specific User model (uses ObjectId)
///
/// The identity-provider subject lives in the `id` field, the storage id in `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUser {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "id")]
    pub auth_id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub onboarded: bool,
    #[serde(default)]
    pub threads: Vec<ObjectId>,
    pub created_at: bson::DateTime,
}

/// MongoDB-specific Thread model (uses ObjectId)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    #[serde(default)]
    pub children: Vec<ObjectId>,
    pub text: String,
    pub created_at: bson::DateTime,
}

pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| PersistError::InvalidObjectId(format!("{}: {}", id, e)))
}

pub(crate) fn parse_object_ids(ids: &[String]) -> Result<Vec<ObjectId>> {
    ids.iter().map(|id| parse_object_id(id)).collect()
}

pub(crate) fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn to_chrono(at: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<MongoUser> for User {
    fn from(user: MongoUser) -> Self {
        Self {
            id: user.id.to_hex(),
            auth_id: user.auth_id,
            username: user.username,
            name: user.name,
            bio: user.bio,
            image: user.image,
            onboarded: user.onboarded,
            threads: user.threads.into_iter().map(ObjectId::to_hex).collect(),
            created_at: to_chrono(user.created_at),
        }
    }
}

impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id.to_hex(),
            author: thread.author.to_hex(),
            parent_id: thread.parent_id.map(|id| id.to_hex()),
            children: thread.children.into_iter().map(ObjectId::to_hex).collect(),
            text: thread.text,
            created_at: to_chrono(thread.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_object_id() {
        let err = parse_object_id("not-an-id").unwrap_err();
        assert!(matches!(err, PersistError::InvalidObjectId(_)));
    }

    #[test]
    fn test_thread_conversion_keeps_hex_ids() {
        let parent = ObjectId::new();
        let mongo = MongoThread {
            id: ObjectId::new(),
            author: ObjectId::new(),
            parent_id: Some(parent),
            children: vec![],
            text: "hello".to_string(),
            created_at: bson::DateTime::now(),
        };
        let thread: Thread = mongo.clone().into();
        assert_eq!(thread.id, mongo.id.to_hex());
        assert_eq!(thread.parent_id, Some(parent.to_hex()));
    }

    #[test]
    fn test_reference_lists_convert_in_order() {
        let (first, second) = (ObjectId::new(), ObjectId::new());
        let mongo = MongoThread {
            id: ObjectId::new(),
            author: ObjectId::new(),
            parent_id: None,
            children: vec![first, second],
            text: "hello".to_string(),
            created_at: bson::DateTime::now(),
        };
        let thread: Thread = mongo.into();
        assert_eq!(thread.children, vec![first.to_hex(), second.to_hex()]);

        let mongo = MongoUser {
            id: ObjectId::new(),
            auth_id: "user_2abc".to_string(),
            username: "ana".to_string(),
            name: "Ana".to_string(),
            bio: String::new(),
            image: String::new(),
            onboarded: true,
            threads: vec![second, first],
            created_at: bson::DateTime::now(),
        };
        let user: User = mongo.into();
        assert_eq!(user.threads, vec![second.to_hex(), first.to_hex()]);
    }

    #[test]
    fn test_user_document_uses_id_for_auth_subject() {
        let user = MongoUser {
            id: ObjectId::new(),
            auth_id: "user_2abc".to_string(),
            username: "ana".to_string(),
            name: "Ana".to_string(),
            bio: String::new(),
            image: String::new(),
            onboarded: true,
            threads: vec![],
            created_at: bson::DateTime::now(),
        };
        let doc = bson::to_document(&user).unwrap();
        assert_eq!(doc.get_str("id").unwrap(), "user_2abc");
        assert!(doc.get_object_id("_id").is_ok());
    }
}
