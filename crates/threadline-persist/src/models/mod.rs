mod db_thread;
mod db_user;
mod query;
mod views;

// Export database-agnostic models
pub use db_thread::{NewThread, Thread};
pub use db_user::{AuthorSummary, User, UserProfile};
pub use query::{UserFilter, UserQuery, UserSearch};
pub use views::{ActivityItem, ReplyView, ThreadDetails, ThreadWithReplies, UserThreads, UsersPage};
