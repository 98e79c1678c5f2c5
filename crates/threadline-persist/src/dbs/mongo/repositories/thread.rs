use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoThread;
use crate::error::{PersistError, Result};

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn insert(&self, thread: &MongoThread) -> Result<()> {
        self.collection.insert_one(thread).await?;
        Ok(())
    }

    /// Threads whose id is in `ids`, minus those by `exclude_author`
    pub async fn find_by_ids(
        &self,
        ids: Vec<ObjectId>,
        exclude_author: Option<ObjectId>,
    ) -> Result<Vec<MongoThread>> {
        let mut filter = doc! { "_id": { "$in": ids } };
        if let Some(author) = exclude_author {
            filter.insert("author", doc! { "$ne": author });
        }

        let threads = self.collection.find(filter).await?.try_collect().await?;
        Ok(threads)
    }

    pub async fn find_by_author(&self, author: ObjectId) -> Result<Vec<MongoThread>> {
        let filter = doc! { "author": author };
        let threads = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn push_child(&self, parent_id: ObjectId, child_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": parent_id };
        let update = doc! { "$push": { "children": child_id } };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(parent_id.to_hex()));
        }
        Ok(())
    }
}
