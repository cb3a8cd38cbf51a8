//! Mock post generator.
//!
//! Posts are drawn from a seedable RNG, so a seed always reproduces the same
//! sequence while `from_entropy` gives a fresh one per run.

use std::ops::Range;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use blog_search_shared::Post;

/// Configuration for the mock post generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// First year a post can be dated in.
    pub first_year: i32,
    /// Posts are dated strictly before this year.
    pub end_year: i32,
    /// User ids are drawn from `0..max_user_id`.
    pub max_user_id: i64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            first_year: 2015,
            end_year: 2020,
            max_user_id: i32::MAX as i64,
        }
    }
}

impl MockConfig {
    /// Date posts from `first_year` up to, not including, `end_year`.
    /// Years are clamped to the dates chrono can represent.
    pub fn with_years(mut self, first_year: i32, end_year: i32) -> Self {
        let years = year_window(first_year, end_year);
        self.first_year = years.start;
        self.end_year = years.end;
        self
    }

    /// Draw user ids from `0..max_user_id`.
    pub fn with_max_user_id(mut self, max_user_id: i64) -> Self {
        self.max_user_id = max_user_id;
        self
    }
}

/// A non-empty year range inside chrono's supported dates.
fn year_window(first_year: i32, end_year: i32) -> Range<i32> {
    let min = NaiveDate::MIN.year();
    let max = NaiveDate::MAX.year();
    let first = first_year.clamp(min, max);
    let end = end_year.clamp(min, max.saturating_add(1)).max(first + 1);
    first..end
}

/// Produces an endless stream of posts.
#[derive(Debug)]
pub struct PostGenerator {
    config: MockConfig,
    rng: StdRng,
}

impl PostGenerator {
    /// A generator that always yields the same posts for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_config(MockConfig::default(), seed)
    }

    /// A generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            config: MockConfig::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// A seeded generator with a custom configuration.
    pub fn with_config(config: MockConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate the next post.
    pub fn next_post(&mut self) -> Post {
        let user_id = self.rng.gen_range(0..self.config.max_user_id.max(1));
        let date = self.random_date();
        Post::new(user_id, format!("post is created at: {}", date), date)
    }

    /// Generate `quantity` posts.
    pub fn generate(&mut self, quantity: usize) -> Vec<Post> {
        (0..quantity).map(|_| self.next_post()).collect()
    }

    /// A midnight timestamp. Days stop at 27 so every month is valid.
    fn random_date(&mut self) -> NaiveDateTime {
        let years = year_window(self.config.first_year, self.config.end_year);
        let year = self.rng.gen_range(years);
        let month = self.rng.gen_range(1..12);
        let day = self.rng.gen_range(1..28);
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }
}

impl Iterator for PostGenerator {
    type Item = Post;

    fn next(&mut self) -> Option<Post> {
        Some(self.next_post())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_search_shared::IndexDocument;

    #[test]
    fn test_same_seed_same_posts() {
        let first = PostGenerator::seeded(42).generate(10);
        let second = PostGenerator::seeded(42).generate(10);

        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let first = PostGenerator::seeded(1).generate(10);
        let second = PostGenerator::seeded(2).generate(10);

        assert_ne!(first, second);
    }

    #[test]
    fn test_generate_quantity() {
        let mut generator = PostGenerator::seeded(7);

        assert_eq!(generator.generate(5).len(), 5);
        assert!(generator.generate(0).is_empty());
    }

    #[test]
    fn test_posts_stay_in_default_window() {
        for post in PostGenerator::seeded(3).take(200) {
            let date = post.date.date();
            assert!((2015..2020).contains(&date.year()));
            assert!((1..12).contains(&date.month()));
            assert!((1..28).contains(&date.day()));
            assert!((0..i32::MAX as i64).contains(&post.user_id));
        }
    }

    #[test]
    fn test_text_mentions_date() {
        for post in PostGenerator::seeded(11).generate(20) {
            assert_eq!(post.text, format!("post is created at: {}", post.date));
            assert!(post.validate().is_ok());
        }
    }

    #[test]
    fn test_custom_config() {
        let config = MockConfig::default()
            .with_years(2019, 2020)
            .with_max_user_id(10);

        for post in PostGenerator::with_config(config, 5).generate(50) {
            assert_eq!(post.date.year(), 2019);
            assert!((0..10).contains(&post.user_id));
        }
    }

    #[test]
    fn test_empty_year_window_uses_first_year() {
        let config = MockConfig::default().with_years(2018, 2018);

        let posts = PostGenerator::with_config(config, 9).generate(5);

        assert!(posts.iter().all(|post| post.date.year() == 2018));
    }

    #[test]
    fn test_years_clamped_to_representable_dates() {
        let config = MockConfig::default().with_years(i32::MAX, i32::MAX);

        assert_eq!(config.first_year, NaiveDate::MAX.year());
        assert_eq!(config.end_year, NaiveDate::MAX.year() + 1);

        let posts = PostGenerator::with_config(config, 1).generate(3);
        assert!(posts.iter().all(|post| post.date.year() == NaiveDate::MAX.year()));
    }

    #[test]
    fn test_out_of_range_fields_still_generate() {
        let config = MockConfig {
            first_year: i32::MIN,
            end_year: i32::MIN,
            max_user_id: 5,
        };

        let post = PostGenerator::with_config(config, 2).next_post();

        assert_eq!(post.date.year(), NaiveDate::MIN.year());
    }
}
