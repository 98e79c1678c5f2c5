pub mod dbs;
pub mod error;
pub mod models;
pub mod services;
pub mod trait_client;

pub use dbs::memory::MemoryPersistenceClient;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::{MongoPersistenceClient, MongoPoolOptions};
pub use error::{PersistError, Result};
pub use models::{
    ActivityItem, AuthorSummary, NewThread, ReplyView, Thread, ThreadDetails, ThreadWithReplies,
    User, UserFilter, UserProfile, UserQuery, UserSearch, UserThreads, UsersPage,
};
pub use services::{ThreadService, UpdateUser, UserService};
pub use trait_client::PersistenceClient;
