pub mod health;
pub mod threads;
pub mod users;
