use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ActionContext, Result};
use crate::models::{
    ActivityItem, ReplyView, ThreadWithReplies, User, UserProfile, UserSearch, UserThreads,
    UsersPage,
};
use crate::services::populate::{attach_authors, in_reference_order};
use crate::trait_client::PersistenceClient;

/// Profile submitted from onboarding or the profile editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub auth_id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
    /// Page the submission came from
    pub path: String,
}

/// User-facing data access: profiles, search, and the activity feed
///
/// Every operation re-reads from storage and wraps failures as
/// `Failed to <operation>: <cause>`.
#[derive(Clone)]
pub struct UserService {
    persist: Arc<dyn PersistenceClient>,
}

impl UserService {
    pub fn new(persist: Arc<dyn PersistenceClient>) -> Self {
        Self { persist }
    }

    /// Create or update the profile keyed on the auth id and mark it onboarded
    pub async fn update_user(&self, update: UpdateUser) -> Result<()> {
        let profile = UserProfile {
            username: update.username.to_lowercase(),
            name: update.name,
            bio: update.bio,
            image: update.image,
            onboarded: true,
        };

        self.persist
            .upsert_user(&update.auth_id, profile)
            .await
            .action("create/update user")?;

        tracing::debug!(auth_id = %update.auth_id, path = %update.path, "User profile saved");
        Ok(())
    }

    pub async fn fetch_user(&self, auth_id: &str) -> Result<Option<User>> {
        self.persist
            .get_user_by_auth_id(auth_id)
            .await
            .action("fetch user")
    }

    /// The user with threads, their replies, and the reply authors populated
    pub async fn fetch_user_threads(&self, auth_id: &str) -> Result<Option<UserThreads>> {
        self.load_user_threads(auth_id)
            .await
            .action("fetch user threads")
    }

    /// One page of other users, optionally narrowed by a search string
    pub async fn fetch_users(&self, search: UserSearch) -> Result<UsersPage> {
        self.search_users(&search).await.action("fetch users")
    }

    /// Replies by other users to threads authored by `user_id` (a storage id), newest first
    pub async fn get_activity(&self, user_id: &str) -> Result<Vec<ActivityItem>> {
        self.collect_activity(user_id)
            .await
            .action("fetch activity")
    }

    async fn load_user_threads(&self, auth_id: &str) -> Result<Option<UserThreads>> {
        let Some(user) = self.persist.get_user_by_auth_id(auth_id).await? else {
            return Ok(None);
        };
        if user.threads.is_empty() {
            return Ok(Some(UserThreads {
                user,
                threads: Vec::new(),
            }));
        }

        let found = self.persist.get_threads_by_ids(&user.threads, None).await?;
        let threads = in_reference_order(&user.threads, found);

        let child_ids: Vec<String> = threads
            .iter()
            .flat_map(|t| t.children.iter().cloned())
            .collect();
        let mut replies: HashMap<String, ReplyView> = HashMap::new();
        if !child_ids.is_empty() {
            let children = self.persist.get_threads_by_ids(&child_ids, None).await?;
            replies = attach_authors(self.persist.as_ref(), children)
                .await?
                .into_iter()
                .map(|reply| (reply.thread.id.clone(), reply))
                .collect();
        }

        let threads = threads
            .into_iter()
            .map(|thread| {
                let children = thread
                    .children
                    .iter()
                    .filter_map(|id| replies.get(id).cloned())
                    .collect();
                ThreadWithReplies { thread, children }
            })
            .collect();

        Ok(Some(UserThreads { user, threads }))
    }

    async fn search_users(&self, search: &UserSearch) -> Result<UsersPage> {
        let query = search.to_query();

        let users = self.persist.find_users(&query).await?;
        let total = self.persist.count_users(&query.filter).await?;
        let is_next = search.page.has_next(total, users.len());

        tracing::debug!(
            total,
            returned = users.len(),
            page = search.page.page_number,
            "User search"
        );

        Ok(UsersPage { users, is_next })
    }

    async fn collect_activity(&self, user_id: &str) -> Result<Vec<ActivityItem>> {
        let user_threads = self.persist.list_threads_by_author(user_id).await?;

        let child_ids: Vec<String> = user_threads
            .into_iter()
            .flat_map(|t| t.children)
            .collect();
        if child_ids.is_empty() {
            return Ok(Vec::new());
        }

        let replies = self
            .persist
            .get_threads_by_ids(&child_ids, Some(user_id))
            .await?;
        let mut activity = attach_authors(self.persist.as_ref(), replies).await?;

        // Equal timestamps fall back to the order replies were appended
        let position: HashMap<&str, usize> = child_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let rank = |item: &ActivityItem| {
            (
                item.thread.created_at,
                position.get(item.thread.id.as_str()).copied().unwrap_or(0),
            )
        };
        activity.sort_by(|a, b| rank(b).cmp(&rank(a)));
        Ok(activity)
    }
}
