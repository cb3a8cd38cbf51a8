//! Runtime settings read from the environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use blog_search_repository::{ConnectionTopology, RetryPolicy, SearchIndexConfig, TransportOptions};
use blog_search_shared::{IndexDescriptor, Post};

use crate::AppError;

/// Default node list.
const DEFAULT_NODES: &str = "http://localhost:9200";

/// Default index name.
const DEFAULT_INDEX: &str = "my_new_blog";

/// Default number of posts per ingestion phase.
const DEFAULT_POSTS: usize = 5;

/// Default bulk size limit.
const DEFAULT_MAX_BATCH: usize = 1000;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}', expected text or json", other)),
        }
    }
}

/// Everything the run needs, parsed and validated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub topology: ConnectionTopology,
    pub index_name: String,
    pub shard_count: u32,
    pub replica_count: u32,
    pub force_recreate: bool,
    /// Posts per ingestion phase.
    pub posts: usize,
    /// Generator seed; unset means a fresh sequence every run.
    pub seed: Option<u64>,
    pub refresh_writes: bool,
    pub max_batch_size: usize,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `BLOG_SEARCH_NODES`: comma-separated node URIs (default: http://localhost:9200)
    /// - `BLOG_SEARCH_INDEX`: index name (default: my_new_blog)
    /// - `BLOG_SEARCH_SHARDS` / `BLOG_SEARCH_REPLICAS`: index settings (default: 1)
    /// - `BLOG_SEARCH_FORCE_RECREATE`: recreate the index on startup (default: false)
    /// - `BLOG_SEARCH_POSTS`: posts per ingestion phase (default: 5)
    /// - `BLOG_SEARCH_SEED`: generator seed (default: unset)
    /// - `BLOG_SEARCH_REFRESH`: wait for writes to become searchable (default: true)
    /// - `BLOG_SEARCH_MAX_BATCH`: bulk size limit (default: 1000)
    /// - `BLOG_SEARCH_RETRY_ATTEMPTS`: retries after the first attempt (default: 3)
    /// - `BLOG_SEARCH_RETRY_BASE_MS` / `BLOG_SEARCH_RETRY_MAX_MS`: backoff bounds
    ///   (default: 100 / 5000)
    /// - `BLOG_SEARCH_TIMEOUT_SECS`: per-request timeout (default: 30)
    /// - `LOG_FORMAT`: text or json (default: text)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let nodes = get("BLOG_SEARCH_NODES").unwrap_or_else(|| DEFAULT_NODES.to_string());
        let node_list: Vec<&str> = nodes
            .split(',')
            .map(str::trim)
            .filter(|node| !node.is_empty())
            .collect();
        let topology = ConnectionTopology::parse(&node_list)?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: parse_or(&get, "BLOG_SEARCH_RETRY_ATTEMPTS", defaults.max_retries)?,
            initial_delay: Duration::from_millis(parse_or(
                &get,
                "BLOG_SEARCH_RETRY_BASE_MS",
                defaults.initial_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(parse_or(
                &get,
                "BLOG_SEARCH_RETRY_MAX_MS",
                defaults.max_delay.as_millis() as u64,
            )?),
        };
        if retry.initial_delay > retry.max_delay {
            return Err(AppError::config(
                "BLOG_SEARCH_RETRY_BASE_MS must not exceed BLOG_SEARCH_RETRY_MAX_MS",
            ));
        }

        let max_batch_size = parse_or(&get, "BLOG_SEARCH_MAX_BATCH", DEFAULT_MAX_BATCH)?;
        if max_batch_size == 0 {
            return Err(AppError::config("BLOG_SEARCH_MAX_BATCH must be positive"));
        }

        let config = Self {
            topology,
            index_name: get("BLOG_SEARCH_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string()),
            shard_count: parse_or(&get, "BLOG_SEARCH_SHARDS", 1)?,
            replica_count: parse_or(&get, "BLOG_SEARCH_REPLICAS", 1)?,
            force_recreate: parse_bool_or(&get, "BLOG_SEARCH_FORCE_RECREATE", false)?,
            posts: parse_or(&get, "BLOG_SEARCH_POSTS", DEFAULT_POSTS)?,
            seed: get("BLOG_SEARCH_SEED")
                .map(|raw| parse_value("BLOG_SEARCH_SEED", &raw))
                .transpose()?,
            refresh_writes: parse_bool_or(&get, "BLOG_SEARCH_REFRESH", true)?,
            max_batch_size,
            retry,
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "BLOG_SEARCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            log_format: get("LOG_FORMAT")
                .map(|raw| raw.parse::<LogFormat>().map_err(AppError::config))
                .transpose()?
                .unwrap_or_default(),
        };

        config.descriptor().validate().map_err(AppError::config)?;
        Ok(config)
    }

    /// The index to create for the posts.
    pub fn descriptor(&self) -> IndexDescriptor {
        IndexDescriptor::for_document::<Post>(self.index_name.clone())
            .with_shards(self.shard_count)
            .with_replicas(self.replica_count)
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            request_timeout: Some(self.request_timeout),
            refresh_writes: self.refresh_writes,
        }
    }

    pub fn search_config(&self) -> SearchIndexConfig {
        SearchIndexConfig::with_max_batch_size(self.max_batch_size)
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::config(format!("invalid {} '{}': {}", name, raw, e)))
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, name: &str, default: bool) -> Result<bool, AppError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::config(format!(
            "invalid {} '{}': expected true or false",
            name, raw
        ))),
    }
}
