pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod license;
pub mod middleware;
pub mod saved_objects;
pub mod spaces;

pub use app::{app, AppState};
