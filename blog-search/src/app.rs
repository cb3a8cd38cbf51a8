//! The blog search run: create the index, ingest posts, query them.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use tracing::{info, instrument};

use crate::config::{AppConfig, Dependencies};
use crate::AppError;
use blog_search_repository::BulkIngestionSummary;
use blog_search_shared::{Post, QuerySpec};
use mock_posts::PostGenerator;

/// Term searched for in post text.
const SEARCH_TERM: &str = "blog";

/// Posts newer than this are listed by the date range query.
fn recent_cutoff() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// The index was created (or recreated) by this run.
    pub index_created: bool,
    /// Posts written one request at a time.
    pub indexed_one_by_one: usize,
    pub bulk: BulkIngestionSummary,
    /// Posts whose text contains the search term.
    pub term_matches: Vec<Post>,
    /// Total number of posts in the index.
    pub total_posts: u64,
    /// Posts dated after the cutoff and before now.
    pub recent_posts: Vec<Post>,
}

/// Run the whole sequence against the configured index.
#[instrument(skip_all, fields(index = %config.index_name))]
pub async fn run(deps: &Dependencies, config: &AppConfig) -> Result<RunReport, AppError> {
    let descriptor = config.descriptor();
    let index = descriptor.name.as_str();

    // 1. Index
    let index_created = deps
        .index_manager
        .ensure_index(&descriptor, config.force_recreate)
        .await?;

    // 2. Ingestion, one by one then in bulk
    let mut generator = match config.seed {
        Some(seed) => PostGenerator::seeded(seed),
        None => PostGenerator::from_entropy(),
    };

    let singles = generator.generate(config.posts);
    for post in &singles {
        deps.ingestor.index_one(index, post).await?;
    }
    info!(count = singles.len(), "Indexed posts one by one");

    let batch = generator.generate(config.posts);
    let bulk = deps.ingestor.index_bulk(index, &batch).await?.into_result()?;

    // 3. Queries
    let term_matches: Vec<Post> = deps
        .query_engine
        .search(index, &QuerySpec::term(Post::TEXT_FIELD, SEARCH_TERM))
        .await?;
    info!(term = SEARCH_TERM, matches = term_matches.len(), "Term query");

    let all = deps
        .query_engine
        .search_detailed::<Post>(index, &QuerySpec::match_all())
        .await?;
    info!(total = all.total, "Match all query");

    let recent_posts: Vec<Post> = deps
        .query_engine
        .search(
            index,
            &QuerySpec::date_range(Post::DATE_FIELD, recent_cutoff(), Utc::now().naive_utc()),
        )
        .await?;
    for post in &recent_posts {
        info!(user_id = post.user_id, text = %post.text, date = %post.date, "Recent post");
    }

    Ok(RunReport {
        index_created,
        indexed_one_by_one: singles.len(),
        bulk,
        term_matches,
        total_posts: all.total,
        recent_posts,
    })
}
