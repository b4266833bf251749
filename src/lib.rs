//! Rolloff Dumpster Inventory
//!
//! Tracks a fleet of rentable dumpsters: availability, rentals and returns,
//! persisted as a single JSON document in a key-value store and served over
//! a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
