pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod pages;
pub mod routes;
pub mod state;

pub use app::build_router;
