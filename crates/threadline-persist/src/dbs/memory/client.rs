use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use regex::{Regex, RegexBuilder};
use threadline_types::SortOrder;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PersistError, Result};
use crate::models::{NewThread, Thread, User, UserFilter, UserProfile, UserQuery};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct MemoryStore {
    // insertion order doubles as the tie-breaker for equal timestamps
    users: Vec<User>,
    threads: Vec<Thread>,
}

/// Process-local store for development and tests
///
/// Mirrors the document store's query semantics: `$in` lookups come back in
/// insertion order, unknown ids are skipped, and search is a case-insensitive
/// regex over username or name.
#[derive(Default)]
pub struct MemoryPersistenceClient {
    store: RwLock<MemoryStore>,
}

impl MemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

struct CompiledFilter<'a> {
    exclude_auth_id: &'a str,
    pattern: Option<Regex>,
}

impl<'a> CompiledFilter<'a> {
    fn compile(filter: &'a UserFilter) -> Result<Self> {
        let pattern = filter
            .pattern
            .as_deref()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| PersistError::Internal(format!("Invalid search pattern: {}", e)))
            })
            .transpose()?;
        Ok(Self {
            exclude_auth_id: &filter.exclude_auth_id,
            pattern,
        })
    }

    fn matches(&self, user: &User) -> bool {
        if user.auth_id == self.exclude_auth_id {
            return false;
        }
        match &self.pattern {
            Some(re) => re.is_match(&user.username) || re.is_match(&user.name),
            None => true,
        }
    }
}

#[async_trait]
impl PersistenceClient for MemoryPersistenceClient {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert_user(&self, auth_id: &str, profile: UserProfile) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(user) = store.users.iter_mut().find(|u| u.auth_id == auth_id) {
            user.username = profile.username;
            user.name = profile.name;
            user.bio = profile.bio;
            user.image = profile.image;
            user.onboarded = profile.onboarded;
            return Ok(());
        }

        store.users.push(User {
            id: new_id(),
            auth_id: auth_id.to_string(),
            username: profile.username,
            name: profile.name,
            bio: profile.bio,
            image: profile.image,
            onboarded: profile.onboarded,
            threads: Vec::new(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn get_user_by_auth_id(&self, auth_id: &str) -> Result<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.auth_id == auth_id).cloned())
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let store = self.store.read().await;
        Ok(store
            .users
            .iter()
            .filter(|u| wanted.contains(u.id.as_str()))
            .cloned()
            .collect())
    }

    async fn find_users(&self, query: &UserQuery) -> Result<Vec<User>> {
        let filter = CompiledFilter::compile(&query.filter)?;
        let store = self.store.read().await;

        let mut matching: Vec<(usize, &User)> = store
            .users
            .iter()
            .enumerate()
            .filter(|(_, u)| filter.matches(u))
            .collect();
        matching.sort_by_key(|(seq, u)| (u.created_at, *seq));
        if query.sort == SortOrder::Desc {
            matching.reverse();
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|(_, u)| u.clone())
            .collect())
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<u64> {
        let filter = CompiledFilter::compile(filter)?;
        let store = self.store.read().await;
        Ok(store.users.iter().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn insert_thread(&self, thread: NewThread) -> Result<Thread> {
        let thread = Thread {
            id: new_id(),
            author: thread.author,
            parent_id: thread.parent_id,
            children: Vec::new(),
            text: thread.text,
            created_at: Utc::now(),
        };
        self.store.write().await.threads.push(thread.clone());
        Ok(thread)
    }

    async fn get_threads_by_ids(
        &self,
        ids: &[String],
        exclude_author: Option<&str>,
    ) -> Result<Vec<Thread>> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let store = self.store.read().await;
        Ok(store
            .threads
            .iter()
            .filter(|t| wanted.contains(t.id.as_str()))
            .filter(|t| exclude_author.map_or(true, |author| t.author != author))
            .cloned()
            .collect())
    }

    async fn list_threads_by_author(&self, author_id: &str) -> Result<Vec<Thread>> {
        let store = self.store.read().await;
        Ok(store
            .threads
            .iter()
            .filter(|t| t.author == author_id)
            .cloned()
            .collect())
    }

    async fn push_user_thread(&self, user_id: &str, thread_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| PersistError::UserNotFound(user_id.to_string()))?;
        user.threads.push(thread_id.to_string());
        Ok(())
    }

    async fn push_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let parent = store
            .threads
            .iter_mut()
            .find(|t| t.id == parent_id)
            .ok_or_else(|| PersistError::ThreadNotFound(parent_id.to_string()))?;
        parent.children.push(child_id.to_string());
        Ok(())
    }
}
