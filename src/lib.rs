pub mod auth;
pub mod config;
pub mod database;
pub mod models;
pub mod web;

pub use auth::CurrentUser;
pub use config::Config;
pub use database::{Database, DatabaseError};
pub use web::{routes, ApiError, AppState};
