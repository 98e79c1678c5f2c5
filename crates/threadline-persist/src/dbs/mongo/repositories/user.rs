use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::{to_bson_datetime, MongoUser};
use crate::error::{PersistError, Result};
use crate::models::{UserFilter, UserProfile, UserQuery};

#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<MongoUser>,
}

fn filter_document(filter: &UserFilter) -> Document {
    let mut query = doc! { "id": { "$ne": filter.exclude_auth_id.as_str() } };
    if let Some(pattern) = filter.pattern.as_deref() {
        query.insert(
            "$or",
            vec![
                doc! { "username": { "$regex": pattern, "$options": "i" } },
                doc! { "name": { "$regex": pattern, "$options": "i" } },
            ],
        );
    }
    query
}

impl MongoUserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("users");
        Self { collection }
    }

    /// Upsert keyed on the auth subject; `created_at` and `threads` are set on insert only
    pub async fn upsert(&self, auth_id: &str, profile: UserProfile) -> Result<()> {
        let filter = doc! { "id": auth_id };
        let update = doc! {
            "$set": {
                "username": profile.username,
                "name": profile.name,
                "bio": profile.bio,
                "image": profile.image,
                "onboarded": profile.onboarded,
            },
            "$setOnInsert": {
                "created_at": to_bson_datetime(Utc::now()),
                "threads": Bson::Array(Vec::new()),
            }
        };

        self.collection.update_one(filter, update).upsert(true).await?;
        Ok(())
    }

    pub async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<MongoUser>> {
        let filter = doc! { "id": auth_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_by_ids(&self, ids: Vec<ObjectId>) -> Result<Vec<MongoUser>> {
        let filter = doc! { "_id": { "$in": ids } };
        let users = self.collection.find(filter).await?.try_collect().await?;
        Ok(users)
    }

    pub async fn find(&self, query: &UserQuery) -> Result<Vec<MongoUser>> {
        let direction = query.sort.as_direction();
        let users = self
            .collection
            .find(filter_document(&query.filter))
            .sort(doc! { "created_at": direction, "_id": direction })
            .skip(query.skip)
            .limit(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }

    pub async fn count(&self, filter: &UserFilter) -> Result<u64> {
        Ok(self.collection.count_documents(filter_document(filter)).await?)
    }

    pub async fn push_thread(&self, user_id: ObjectId, thread_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": user_id };
        let update = doc! { "$push": { "threads": thread_id } };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::UserNotFound(user_id.to_hex()));
        }
        Ok(())
    }
}
