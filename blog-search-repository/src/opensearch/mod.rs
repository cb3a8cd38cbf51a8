//! OpenSearch implementation of the engine client.
//!
//! This module provides a concrete implementation of `EngineClient` using
//! OpenSearch as the backend, plus the builders for its request bodies.

mod client;
pub mod index_config;
pub mod queries;

pub use client::{OpenSearchClient, TransportOptions};
