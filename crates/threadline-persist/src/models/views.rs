use serde::{Deserialize, Serialize};

use super::{AuthorSummary, Thread, User};

/// A thread with its author projection attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyView {
    pub thread: Thread,
    pub author: AuthorSummary,
}

/// An owned thread with its direct replies populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadWithReplies {
    pub thread: Thread,
    pub children: Vec<ReplyView>,
}

/// A user with threads, children, and child authors populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserThreads {
    pub user: User,
    pub threads: Vec<ThreadWithReplies>,
}

/// A thread page: the thread, its author, and its direct replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDetails {
    pub thread: Thread,
    pub author: AuthorSummary,
    pub children: Vec<ReplyView>,
}

/// A reply another user made to one of your threads
pub type ActivityItem = ReplyView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersPage {
    pub users: Vec<User>,
    pub is_next: bool,
}
