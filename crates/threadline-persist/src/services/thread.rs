use std::sync::Arc;

use threadline_types::{CommentValidation, ThreadValidation};

use crate::error::{ActionContext, PersistError, Result};
use crate::models::{NewThread, Thread, ThreadDetails};
use crate::services::populate::{attach_authors, in_reference_order};
use crate::trait_client::PersistenceClient;

/// Thread submissions and the single-thread view
#[derive(Clone)]
pub struct ThreadService {
    persist: Arc<dyn PersistenceClient>,
}

impl ThreadService {
    pub fn new(persist: Arc<dyn PersistenceClient>) -> Self {
        Self { persist }
    }

    /// Validate and store a top-level thread, then link it to its author
    pub async fn create_thread(&self, submission: ThreadValidation) -> Result<Thread> {
        self.insert_thread(submission).await.action("create thread")
    }

    /// Validate and store a reply, then link it to `parent_id`
    ///
    /// `author_id` is the replying user's storage id.
    pub async fn add_comment(
        &self,
        parent_id: &str,
        comment: CommentValidation,
        author_id: &str,
    ) -> Result<Thread> {
        self.insert_reply(parent_id, comment, author_id)
            .await
            .action("add comment to thread")
    }

    pub async fn fetch_thread(&self, thread_id: &str) -> Result<Option<ThreadDetails>> {
        self.load_thread(thread_id).await.action("fetch thread")
    }

    async fn ensure_user(&self, user_id: &str) -> Result<()> {
        let found = self.persist.get_users_by_ids(&[user_id.to_string()]).await?;
        if found.is_empty() {
            return Err(PersistError::UserNotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let mut found = self
            .persist
            .get_threads_by_ids(&[thread_id.to_string()], None)
            .await?;
        Ok(found.pop())
    }

    async fn insert_thread(&self, submission: ThreadValidation) -> Result<Thread> {
        submission.validate()?;
        self.ensure_user(&submission.account_id).await?;

        let thread = self
            .persist
            .insert_thread(NewThread::top_level(&submission.account_id, submission.thread))
            .await?;
        self.persist
            .push_user_thread(&submission.account_id, &thread.id)
            .await?;

        tracing::info!(thread_id = %thread.id, author = %thread.author, "Thread created");
        Ok(thread)
    }

    async fn insert_reply(
        &self,
        parent_id: &str,
        comment: CommentValidation,
        author_id: &str,
    ) -> Result<Thread> {
        comment.validate()?;
        if self.get_thread(parent_id).await?.is_none() {
            return Err(PersistError::ThreadNotFound(parent_id.to_string()));
        }
        self.ensure_user(author_id).await?;

        let reply = self
            .persist
            .insert_thread(NewThread::reply(author_id, parent_id, comment.thread))
            .await?;
        self.persist.push_thread_child(parent_id, &reply.id).await?;

        tracing::info!(thread_id = %reply.id, parent_id, author = author_id, "Reply added");
        Ok(reply)
    }

    async fn load_thread(&self, thread_id: &str) -> Result<Option<ThreadDetails>> {
        let Some(thread) = self.get_thread(thread_id).await? else {
            return Ok(None);
        };

        let Some(head) = attach_authors(self.persist.as_ref(), vec![thread])
            .await?
            .pop()
        else {
            return Ok(None);
        };

        let mut children = Vec::new();
        if !head.thread.children.is_empty() {
            let found = self
                .persist
                .get_threads_by_ids(&head.thread.children, None)
                .await?;
            let ordered = in_reference_order(&head.thread.children, found);
            children = attach_authors(self.persist.as_ref(), ordered).await?;
        }

        Ok(Some(ThreadDetails {
            thread: head.thread,
            author: head.author,
            children,
        }))
    }
}
