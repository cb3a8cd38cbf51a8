//! Mock blog post generation.
//!
//! This crate produces the `Post` documents the blog search binary ingests.
//!
//! # Usage
//!
//! ## Deterministic Generation
//!
//! Use a seed for reproducible runs and tests:
//!
//! ```rust
//! use mock_posts::PostGenerator;
//!
//! let first = PostGenerator::seeded(42).generate(5);
//! let second = PostGenerator::seeded(42).generate(5);
//! assert_eq!(first, second);
//! ```
//!
//! ## Custom Date Window
//!
//! ```rust
//! use mock_posts::{MockConfig, PostGenerator};
//!
//! let config = MockConfig::default().with_years(2019, 2020);
//! let posts = PostGenerator::with_config(config, 7).generate(3);
//! assert!(posts.iter().all(|post| post.text.starts_with("post is created at:")));
//! ```

pub mod generator;

pub use generator::{MockConfig, PostGenerator};
