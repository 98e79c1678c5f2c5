use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::models::{AuthorSummary, ReplyView, Thread};
use crate::trait_client::PersistenceClient;

/// Resolves the author of every thread into an `AuthorSummary`
///
/// Threads whose author no longer resolves are dropped with a warning.
pub(crate) async fn attach_authors(
    persist: &dyn PersistenceClient,
    threads: Vec<Thread>,
) -> Result<Vec<ReplyView>> {
    let author_ids: Vec<String> = {
        let mut seen = HashSet::new();
        threads
            .iter()
            .filter(|t| seen.insert(t.author.as_str()))
            .map(|t| t.author.clone())
            .collect()
    };
    if author_ids.is_empty() {
        return Ok(Vec::new());
    }

    let authors: HashMap<String, AuthorSummary> = persist
        .get_users_by_ids(&author_ids)
        .await?
        .iter()
        .map(|u| (u.id.clone(), AuthorSummary::from(u)))
        .collect();

    Ok(threads
        .into_iter()
        .filter_map(|thread| match authors.get(&thread.author) {
            Some(author) => Some(ReplyView {
                author: author.clone(),
                thread,
            }),
            None => {
                tracing::warn!(thread_id = %thread.id, author = %thread.author, "Thread author not found");
                None
            }
        })
        .collect())
}

/// Reorders `found` to follow `ids`, the way a populated reference list reads
pub(crate) fn in_reference_order(ids: &[String], found: Vec<Thread>) -> Vec<Thread> {
    let mut by_id: HashMap<String, Thread> =
        found.into_iter().map(|t| (t.id.clone(), t)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
