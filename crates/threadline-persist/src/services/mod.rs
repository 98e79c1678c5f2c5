mod populate;
pub mod thread;
pub mod user;

pub use thread::ThreadService;
pub use user::{UpdateUser, UserService};
