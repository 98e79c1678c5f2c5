use std::sync::Arc;

use async_trait::async_trait;
use threadline_persist::{
    MemoryPersistenceClient, NewThread, PersistError, PersistenceClient, Thread, ThreadService,
    UpdateUser, User, UserFilter, UserProfile, UserQuery, UserSearch, UserService,
};
use threadline_types::{CommentValidation, SortOrder, ThreadValidation};

struct Fixture {
    users: UserService,
    threads: ThreadService,
}

fn fixture() -> Fixture {
    let persist: Arc<dyn PersistenceClient> = Arc::new(MemoryPersistenceClient::new());
    Fixture {
        users: UserService::new(persist.clone()),
        threads: ThreadService::new(persist),
    }
}

fn update(auth_id: &str, username: &str, name: &str) -> UpdateUser {
    UpdateUser {
        auth_id: auth_id.to_string(),
        username: username.to_string(),
        name: name.to_string(),
        bio: format!("bio of {}", name),
        image: format!("https://img.example/{}.png", auth_id),
        path: "/onboarding".to_string(),
    }
}

async fn onboard(fx: &Fixture, auth_id: &str, username: &str, name: &str) -> User {
    fx.users.update_user(update(auth_id, username, name)).await.unwrap();
    fx.users.fetch_user(auth_id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_upsert_lowercases_username() {
    let fx = fixture();
    fx.users.update_user(update("u1", "MixedCase", "Mixed")).await.unwrap();

    let user = fx.users.fetch_user("u1").await.unwrap().unwrap();
    assert_eq!(user.username, "mixedcase");
    assert!(user.onboarded);
}

#[tokio::test]
async fn test_upsert_twice_updates_in_place() {
    let fx = fixture();
    let first = onboard(&fx, "u1", "first", "First").await;
    let second = onboard(&fx, "u1", "SECOND", "Second").await;

    assert_eq!(first.id, second.id);
    assert_eq!(second.username, "second");
    assert_eq!(second.name, "Second");
}

#[tokio::test]
async fn test_fetch_unknown_user_is_none() {
    let fx = fixture();
    assert!(fx.users.fetch_user("ghost").await.unwrap().is_none());
    assert!(fx.users.fetch_user_threads("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_pagination_last_page_holds_remainder() {
    let fx = fixture();
    onboard(&fx, "me", "me", "Me").await;
    for n in 0..7 {
        onboard(&fx, &format!("other-{}", n), &format!("other{}", n), "Other").await;
    }

    // 7 matches, 3 per page: pages of 3, 3, 1
    let first = fx
        .users
        .fetch_users(UserSearch::new("me").with_page(1, 3))
        .await
        .unwrap();
    assert_eq!(first.users.len(), 3);
    assert!(first.is_next);

    let second = fx
        .users
        .fetch_users(UserSearch::new("me").with_page(2, 3))
        .await
        .unwrap();
    assert!(second.is_next);

    let last = fx
        .users
        .fetch_users(UserSearch::new("me").with_page(3, 3))
        .await
        .unwrap();
    assert_eq!(last.users.len(), 1);
    assert!(!last.is_next);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let fx = fixture();
    onboard(&fx, "me", "me", "Me").await;
    onboard(&fx, "u2", "fruitfan", "APPLE").await;
    onboard(&fx, "u3", "banana", "Banana").await;

    let page = fx
        .users
        .fetch_users(UserSearch::new("me").with_search("apple"))
        .await
        .unwrap();
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].name, "APPLE");
    assert!(!page.is_next);
}

#[tokio::test]
async fn test_search_matches_username_substring() {
    let fx = fixture();
    onboard(&fx, "me", "me", "Me").await;
    onboard(&fx, "u2", "Pineapple42", "Someone").await;

    let page = fx
        .users
        .fetch_users(UserSearch::new("me").with_search("APPLE"))
        .await
        .unwrap();
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].auth_id, "u2");
}

#[tokio::test]
async fn test_search_treats_metacharacters_literally() {
    let fx = fixture();
    onboard(&fx, "me", "me", "Me").await;
    onboard(&fx, "u2", "a.b", "Dotted").await;
    onboard(&fx, "u3", "axb", "Plain").await;

    let page = fx
        .users
        .fetch_users(UserSearch::new("me").with_search("a.b"))
        .await
        .unwrap();
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].auth_id, "u2");
}

#[tokio::test]
async fn test_requester_never_in_own_results() {
    let fx = fixture();
    onboard(&fx, "me", "apple", "Apple Me").await;
    onboard(&fx, "u2", "apple2", "Apple Two").await;

    for search in ["", "apple"] {
        let page = fx
            .users
            .fetch_users(UserSearch::new("me").with_search(search))
            .await
            .unwrap();
        assert!(page.users.iter().all(|u| u.auth_id != "me"));
        assert_eq!(page.users.len(), 1);
    }
}

#[tokio::test]
async fn test_search_sort_order() {
    let fx = fixture();
    onboard(&fx, "me", "me", "Me").await;
    onboard(&fx, "u1", "older", "Older").await;
    onboard(&fx, "u2", "newer", "Newer").await;

    let desc = fx.users.fetch_users(UserSearch::new("me")).await.unwrap();
    assert_eq!(desc.users[0].auth_id, "u2");

    let asc = fx
        .users
        .fetch_users(UserSearch::new("me").with_sort(SortOrder::Asc))
        .await
        .unwrap();
    assert_eq!(asc.users[0].auth_id, "u1");
}

#[tokio::test]
async fn test_activity_end_to_end() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    let b = onboard(&fx, "u2", "bob", "Bob").await;

    let t1 = fx
        .threads
        .create_thread(ThreadValidation::new("first thread", &a.id))
        .await
        .unwrap();
    let t2 = fx
        .threads
        .add_comment(&t1.id, CommentValidation::new("nice one"), &b.id)
        .await
        .unwrap();

    let activity = fx.users.get_activity(&a.id).await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].thread.id, t2.id);
    assert_eq!(activity[0].thread.parent_id.as_deref(), Some(t1.id.as_str()));
    assert_eq!(activity[0].author.name, "Bob");
    assert_eq!(activity[0].author.image, b.image);
}

#[tokio::test]
async fn test_activity_excludes_self_replies() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    let b = onboard(&fx, "u2", "bob", "Bob").await;

    let t1 = fx
        .threads
        .create_thread(ThreadValidation::new("my thread", &a.id))
        .await
        .unwrap();
    fx.threads
        .add_comment(&t1.id, CommentValidation::new("replying to myself"), &a.id)
        .await
        .unwrap();
    let from_bob = fx
        .threads
        .add_comment(&t1.id, CommentValidation::new("hello alice"), &b.id)
        .await
        .unwrap();

    let activity = fx.users.get_activity(&a.id).await.unwrap();
    let ids: Vec<_> = activity.iter().map(|item| item.thread.id.as_str()).collect();
    assert_eq!(ids, vec![from_bob.id.as_str()]);
}

#[tokio::test]
async fn test_activity_covers_direct_children_only() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    let b = onboard(&fx, "u2", "bob", "Bob").await;
    let c = onboard(&fx, "u3", "carol", "Carol").await;

    let t1 = fx
        .threads
        .create_thread(ThreadValidation::new("root thread", &a.id))
        .await
        .unwrap();
    let reply = fx
        .threads
        .add_comment(&t1.id, CommentValidation::new("first reply"), &b.id)
        .await
        .unwrap();
    fx.threads
        .add_comment(&reply.id, CommentValidation::new("nested reply"), &c.id)
        .await
        .unwrap();

    let activity = fx.users.get_activity(&a.id).await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].thread.id, reply.id);

    // the nested reply is activity for bob, who wrote its parent
    let bob_activity = fx.users.get_activity(&b.id).await.unwrap();
    assert_eq!(bob_activity.len(), 1);
    assert_eq!(bob_activity[0].author.name, "Carol");
}

#[tokio::test]
async fn test_activity_empty_without_threads() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    assert!(fx.users.get_activity(&a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_threads_are_populated() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    let b = onboard(&fx, "u2", "bob", "Bob").await;

    let t1 = fx
        .threads
        .create_thread(ThreadValidation::new("first", &a.id))
        .await
        .unwrap();
    let t2 = fx
        .threads
        .create_thread(ThreadValidation::new("second", &a.id))
        .await
        .unwrap();
    fx.threads
        .add_comment(&t2.id, CommentValidation::new("reply to second"), &b.id)
        .await
        .unwrap();

    let populated = fx.users.fetch_user_threads("u1").await.unwrap().unwrap();
    assert_eq!(populated.user.id, a.id);
    assert_eq!(populated.threads.len(), 2);
    assert_eq!(populated.threads[0].thread.id, t1.id);
    assert!(populated.threads[0].children.is_empty());
    assert_eq!(populated.threads[1].children.len(), 1);

    let author = &populated.threads[1].children[0].author;
    assert_eq!(author.auth_id, "u2");
    assert_eq!(author.name, "Bob");
}

#[tokio::test]
async fn test_create_thread_rejects_short_text() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;

    let err = fx
        .threads
        .create_thread(ThreadValidation::new("hi", &a.id))
        .await
        .unwrap_err();
    assert!(matches!(err.root(), PersistError::Validation(_)));
    assert!(err.to_string().starts_with("Failed to create thread"));
}

#[tokio::test]
async fn test_create_thread_for_unknown_author() {
    let fx = fixture();
    let err = fx
        .threads
        .create_thread(ThreadValidation::new("hello", "nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err.root(), PersistError::UserNotFound(_)));
}

#[tokio::test]
async fn test_comment_on_missing_thread() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    let err = fx
        .threads
        .add_comment("missing", CommentValidation::new("hello"), &a.id)
        .await
        .unwrap_err();
    assert!(matches!(err.root(), PersistError::ThreadNotFound(_)));
}

#[tokio::test]
async fn test_fetch_thread_details() {
    let fx = fixture();
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    let b = onboard(&fx, "u2", "bob", "Bob").await;

    let t1 = fx
        .threads
        .create_thread(ThreadValidation::new("root", &a.id))
        .await
        .unwrap();
    fx.threads
        .add_comment(&t1.id, CommentValidation::new("reply"), &b.id)
        .await
        .unwrap();

    let details = fx.threads.fetch_thread(&t1.id).await.unwrap().unwrap();
    assert_eq!(details.author.name, "Alice");
    assert_eq!(details.children.len(), 1);
    assert_eq!(details.children[0].author.name, "Bob");
    assert!(fx.threads.fetch_thread("missing").await.unwrap().is_none());
}

/// Storage that refuses every call, as if the database were unreachable
struct UnavailableStore;

fn unavailable<T>() -> threadline_persist::Result<T> {
    Err(PersistError::Connection("down".to_string()))
}

#[async_trait]
impl PersistenceClient for UnavailableStore {
    async fn ping(&self) -> threadline_persist::Result<()> {
        unavailable()
    }

    async fn upsert_user(&self, _: &str, _: UserProfile) -> threadline_persist::Result<()> {
        unavailable()
    }

    async fn get_user_by_auth_id(&self, _: &str) -> threadline_persist::Result<Option<User>> {
        unavailable()
    }

    async fn get_users_by_ids(&self, _: &[String]) -> threadline_persist::Result<Vec<User>> {
        unavailable()
    }

    async fn find_users(&self, _: &UserQuery) -> threadline_persist::Result<Vec<User>> {
        unavailable()
    }

    async fn count_users(&self, _: &UserFilter) -> threadline_persist::Result<u64> {
        unavailable()
    }

    async fn insert_thread(&self, _: NewThread) -> threadline_persist::Result<Thread> {
        unavailable()
    }

    async fn get_threads_by_ids(
        &self,
        _: &[String],
        _: Option<&str>,
    ) -> threadline_persist::Result<Vec<Thread>> {
        unavailable()
    }

    async fn list_threads_by_author(&self, _: &str) -> threadline_persist::Result<Vec<Thread>> {
        unavailable()
    }

    async fn push_user_thread(&self, _: &str, _: &str) -> threadline_persist::Result<()> {
        unavailable()
    }

    async fn push_thread_child(&self, _: &str, _: &str) -> threadline_persist::Result<()> {
        unavailable()
    }
}

fn assert_wrapped(err: PersistError, action: &str) {
    assert_eq!(
        err.to_string(),
        format!("Failed to {}: Connection error: down", action)
    );
    assert!(matches!(err.root(), PersistError::Connection(msg) if msg == "down"));
}

#[tokio::test]
async fn test_storage_failures_name_the_operation() {
    let users = UserService::new(Arc::new(UnavailableStore));

    let err = users.update_user(update("u1", "ana", "Ana")).await.unwrap_err();
    assert_wrapped(err, "create/update user");

    let err = users.fetch_user("u1").await.unwrap_err();
    assert_wrapped(err, "fetch user");

    let err = users.fetch_user_threads("u1").await.unwrap_err();
    assert_wrapped(err, "fetch user threads");

    let err = users.fetch_users(UserSearch::new("u1")).await.unwrap_err();
    assert_wrapped(err, "fetch users");

    let err = users.get_activity("507f1f77bcf86cd799439011").await.unwrap_err();
    assert_wrapped(err, "fetch activity");
}

/// Memory storage whose threads all report the same creation instant
struct SameInstantStore(MemoryPersistenceClient);

fn frozen(mut threads: Vec<Thread>) -> Vec<Thread> {
    let instant = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    for thread in &mut threads {
        thread.created_at = instant;
    }
    threads
}

#[async_trait]
impl PersistenceClient for SameInstantStore {
    async fn ping(&self) -> threadline_persist::Result<()> {
        self.0.ping().await
    }

    async fn upsert_user(&self, auth_id: &str, profile: UserProfile) -> threadline_persist::Result<()> {
        self.0.upsert_user(auth_id, profile).await
    }

    async fn get_user_by_auth_id(&self, auth_id: &str) -> threadline_persist::Result<Option<User>> {
        self.0.get_user_by_auth_id(auth_id).await
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> threadline_persist::Result<Vec<User>> {
        self.0.get_users_by_ids(ids).await
    }

    async fn find_users(&self, query: &UserQuery) -> threadline_persist::Result<Vec<User>> {
        self.0.find_users(query).await
    }

    async fn count_users(&self, filter: &UserFilter) -> threadline_persist::Result<u64> {
        self.0.count_users(filter).await
    }

    async fn insert_thread(&self, thread: NewThread) -> threadline_persist::Result<Thread> {
        self.0.insert_thread(thread).await
    }

    async fn get_threads_by_ids(
        &self,
        ids: &[String],
        exclude_author: Option<&str>,
    ) -> threadline_persist::Result<Vec<Thread>> {
        Ok(frozen(self.0.get_threads_by_ids(ids, exclude_author).await?))
    }

    async fn list_threads_by_author(&self, author_id: &str) -> threadline_persist::Result<Vec<Thread>> {
        Ok(frozen(self.0.list_threads_by_author(author_id).await?))
    }

    async fn push_user_thread(&self, user_id: &str, thread_id: &str) -> threadline_persist::Result<()> {
        self.0.push_user_thread(user_id, thread_id).await
    }

    async fn push_thread_child(&self, parent_id: &str, child_id: &str) -> threadline_persist::Result<()> {
        self.0.push_thread_child(parent_id, child_id).await
    }
}

#[tokio::test]
async fn test_activity_same_instant_latest_reply_first() {
    let persist: Arc<dyn PersistenceClient> =
        Arc::new(SameInstantStore(MemoryPersistenceClient::new()));
    let fx = Fixture {
        users: UserService::new(persist.clone()),
        threads: ThreadService::new(persist),
    };
    let a = onboard(&fx, "u1", "alice", "Alice").await;
    let b = onboard(&fx, "u2", "bob", "Bob").await;
    let c = onboard(&fx, "u3", "carol", "Carol").await;

    let t1 = fx
        .threads
        .create_thread(ThreadValidation::new("first thread", &a.id))
        .await
        .unwrap();
    let mut replies = Vec::new();
    for (text, author) in [("one", &b.id), ("two", &c.id), ("three", &b.id)] {
        let reply = fx
            .threads
            .add_comment(&t1.id, CommentValidation::new(format!("reply {}", text)), author)
            .await
            .unwrap();
        replies.push(reply.id);
    }

    let activity = fx.users.get_activity(&a.id).await.unwrap();
    let ids: Vec<_> = activity.iter().map(|item| item.thread.id.clone()).collect();
    replies.reverse();
    assert_eq!(ids, replies);
}
