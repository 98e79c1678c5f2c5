use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewThread, Thread, User, UserFilter, UserProfile, UserQuery};

/// Trait for database persistence operations
///
/// Implementations provide database-specific CRUD over the `users` and `threads`
/// collections. Population and pagination live in the services.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Cheap round-trip used by health checks
    async fn ping(&self) -> Result<()>;

    /// Insert or update the user keyed on `auth_id`
    async fn upsert_user(&self, auth_id: &str, profile: UserProfile) -> Result<()>;

    async fn get_user_by_auth_id(&self, auth_id: &str) -> Result<Option<User>>;

    /// Users by storage id; unknown ids are skipped
    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;

    /// One page of users matching the query
    async fn find_users(&self, query: &UserQuery) -> Result<Vec<User>>;

    /// Total users matching the filter, ignoring pagination
    async fn count_users(&self, filter: &UserFilter) -> Result<u64>;

    async fn insert_thread(&self, thread: NewThread) -> Result<Thread>;

    /// Threads by storage id, optionally dropping those written by `exclude_author`
    async fn get_threads_by_ids(
        &self,
        ids: &[String],
        exclude_author: Option<&str>,
    ) -> Result<Vec<Thread>>;

    async fn list_threads_by_author(&self, author_id: &str) -> Result<Vec<Thread>>;

    /// Append a thread id to the user's owned threads
    async fn push_user_thread(&self, user_id: &str, thread_id: &str) -> Result<()>;

    /// Append a reply id to the parent thread's children
    async fn push_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()>;
}
