use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::dbs::mongo::models::{parse_object_id, parse_object_ids, to_bson_datetime, MongoThread};
use crate::dbs::mongo::repositories::{MongoThreadRepository, MongoUserRepository};
use crate::error::{PersistError, Result};
use crate::models::{NewThread, Thread, User, UserFilter, UserProfile, UserQuery};
use crate::trait_client::PersistenceClient;

/// Pool tuning applied on top of the connection string
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoPoolOptions {
    pub max_pool_size: Option<u32>,
    pub timeout: Option<Duration>,
}

pub struct MongoPersistenceClient {
    database: Database,
    user_repo: MongoUserRepository,
    thread_repo: MongoThreadRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        Self::connect_with(mongodb_uri, database, MongoPoolOptions::default()).await
    }

    pub async fn connect_with(
        mongodb_uri: &str,
        database: &str,
        pool: MongoPoolOptions,
    ) -> Result<Self> {
        let mut options = ClientOptions::parse(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        if let Some(size) = pool.max_pool_size {
            options.max_pool_size = Some(size);
        }
        if let Some(timeout) = pool.timeout {
            options.connect_timeout = Some(timeout);
            options.server_selection_timeout = Some(timeout);
        }

        let client =
            Client::with_options(options).map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::debug!(database, "MongoDB client created");

        Ok(Self {
            database: client.database(database),
            user_repo: MongoUserRepository::new(&client, database),
            thread_repo: MongoThreadRepository::new(&client, database),
        })
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn upsert_user(&self, auth_id: &str, profile: UserProfile) -> Result<()> {
        self.user_repo.upsert(auth_id, profile).await
    }

    async fn get_user_by_auth_id(&self, auth_id: &str) -> Result<Option<User>> {
        let user = self.user_repo.find_by_auth_id(auth_id).await?;
        Ok(user.map(User::from))
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let object_ids = parse_object_ids(ids)?;
        let users = self.user_repo.find_by_ids(object_ids).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn find_users(&self, query: &UserQuery) -> Result<Vec<User>> {
        let users = self.user_repo.find(query).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<u64> {
        self.user_repo.count(filter).await
    }

    async fn insert_thread(&self, thread: NewThread) -> Result<Thread> {
        let mongo_thread = MongoThread {
            id: ObjectId::new(),
            author: parse_object_id(&thread.author)?,
            parent_id: thread.parent_id.as_deref().map(parse_object_id).transpose()?,
            children: Vec::new(),
            text: thread.text,
            created_at: to_bson_datetime(Utc::now()),
        };

        self.thread_repo.insert(&mongo_thread).await?;
        Ok(mongo_thread.into())
    }

    async fn get_threads_by_ids(
        &self,
        ids: &[String],
        exclude_author: Option<&str>,
    ) -> Result<Vec<Thread>> {
        let object_ids = parse_object_ids(ids)?;
        let exclude_author = exclude_author.map(parse_object_id).transpose()?;

        let threads = self.thread_repo.find_by_ids(object_ids, exclude_author).await?;
        Ok(threads.into_iter().map(Thread::from).collect())
    }

    async fn list_threads_by_author(&self, author_id: &str) -> Result<Vec<Thread>> {
        let author = parse_object_id(author_id)?;
        let threads = self.thread_repo.find_by_author(author).await?;
        Ok(threads.into_iter().map(Thread::from).collect())
    }

    async fn push_user_thread(&self, user_id: &str, thread_id: &str) -> Result<()> {
        self.user_repo
            .push_thread(parse_object_id(user_id)?, parse_object_id(thread_id)?)
            .await
    }

    async fn push_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()> {
        self.thread_repo
            .push_child(parse_object_id(parent_id)?, parse_object_id(child_id)?)
            .await
    }
}
