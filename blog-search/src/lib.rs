//! # Blog Search
//!
//! Entry point library for the blog search run: configuration, logging and
//! the sequence that creates the index, ingests posts and queries them.

pub mod app;
pub mod config;
pub mod logging;

pub use app::{run, RunReport};
pub use config::{AppConfig, Dependencies, LogFormat};

use thiserror::Error;

/// Errors that can occur during startup or the run itself.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] blog_search_repository::SearchError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
