//! Reviews and developer replies.

use fake::Fake;
use fake::faker::internet::en::IPv4;
use fake::faker::lorem::en::{Paragraph, Paragraphs, Sentence};
use rand::Rng;
use time::{Duration, OffsetDateTime};

use catalog::{Review, ReviewComment, ScoreComments, SubScores, SupplyOption};

use super::extension::slugify;
use super::version::random_version;
use crate::sampling::{Bias, between_instants, biased_accept, biased_int};

/// Configuration for review generation. Chances are percentages.
#[derive(Debug, Clone)]
pub struct ReviewGenConfig {
    /// Share of variants that get a handful of reviews rather than many.
    pub light_share: f64,
    pub light_max: i64,
    pub heavy_min: i64,
    pub heavy_max: i64,
    pub flagged_chance: f64,
    pub comment_chance: f64,
    /// A reply starts its window up to this many hours after the review.
    pub comment_delay_hours: i64,
    /// Length of the reply window.
    pub comment_window_days: i64,
    /// Maximum length of the "used for" text, in characters.
    pub used_for_max_chars: usize,
}

impl Default for ReviewGenConfig {
    fn default() -> Self {
        Self {
            light_share: 80.0,
            light_max: 10,
            heavy_min: 5,
            heavy_max: 100,
            flagged_chance: 0.1,
            comment_chance: 3.0,
            comment_delay_hours: 2,
            comment_window_days: 14,
            used_for_max_chars: 350,
        }
    }
}

/// What a review is about and who wrote it when.
#[derive(Debug, Clone)]
pub struct ReviewTarget<'a> {
    pub extension_id: i64,
    pub supply_option: SupplyOption,
    pub extension_version: &'a str,
    pub reviewer_id: i64,
    pub created_on: OffsetDateTime,
    pub ordering: u32,
}

pub struct ReviewGenerator {
    config: ReviewGenConfig,
}

impl ReviewGenerator {
    /// Creates a new review generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: ReviewGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: ReviewGenConfig) -> Self {
        Self { config }
    }

    /// Number of reviews a variant receives.
    ///
    /// Most get a flat 0..=10; the rest get 5..=100 leaning low, which gives the
    /// long tail of popular extensions.
    pub fn review_count(&self, rng: &mut impl Rng) -> usize {
        let config = &self.config;
        let count = if biased_accept(rng, config.light_share) {
            rng.gen_range(0..=config.light_max)
        } else {
            biased_int(rng, config.heavy_min, config.heavy_max, Bias::ExpLow)
        };
        count.max(0) as usize
    }

    pub fn generate(&self, target: ReviewTarget<'_>, rng: &mut impl Rng) -> Review {
        let scores = SubScores {
            functionality: score(rng),
            ease_of_use: score(rng),
            support: score(rng),
            documentation: score(rng),
            value_for_money: score(rng),
        };

        let title: String = Sentence(3..8).fake_with_rng(rng);
        let body: String = Paragraph(3..6).fake_with_rng(rng);
        let score_comments = ScoreComments {
            functionality: Paragraph(2..3).fake_with_rng(rng),
            ease_of_use: Paragraph(2..3).fake_with_rng(rng),
            support: Paragraph(2..3).fake_with_rng(rng),
            documentation: Paragraph(2..3).fake_with_rng(rng),
            value_for_money: Paragraph(2..3).fake_with_rng(rng),
        };
        let used_for: String = Paragraph(2..5).fake_with_rng(rng);

        Review {
            extension_id: target.extension_id,
            supply_option: target.supply_option,
            alias: slugify(&title),
            title,
            body,
            overall: scores.mean(),
            scores,
            score_comments,
            used_for: truncate_chars(&used_for, self.config.used_for_max_chars),
            version: random_version(rng, target.extension_version),
            flagged: biased_accept(rng, self.config.flagged_chance),
            ip_address: IPv4().fake_with_rng(rng),
            published: true,
            created_on: target.created_on,
            created_by: target.reviewer_id,
            ordering: target.ordering,
        }
    }

    pub fn should_comment(&self, rng: &mut impl Rng) -> bool {
        biased_accept(rng, self.config.comment_chance)
    }

    /// A developer reply posted some time after the review, never after `now`.
    pub fn comment(
        &self,
        review_id: i64,
        review_created: OffsetDateTime,
        developer_id: i64,
        now: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> ReviewComment {
        let earliest = between_instants(
            rng,
            review_created,
            (review_created + Duration::hours(self.config.comment_delay_hours)).min(now),
        );
        let latest = (earliest + Duration::days(self.config.comment_window_days)).min(now);
        let created_on = between_instants(rng, earliest, latest);

        let paragraphs: Vec<String> = Paragraphs(2..3).fake_with_rng(rng);

        ReviewComment {
            review_id,
            body: paragraphs.join("\n\n"),
            ip_address: IPv4().fake_with_rng(rng),
            created_on,
            created_by: developer_id,
            ordering: 0,
            published: true,
        }
    }
}

impl Default for ReviewGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn score(rng: &mut impl Rng) -> u8 {
    biased_int(rng, 0, 100, Bias::ExpHigh).clamp(0, 100) as u8
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].trim_end().to_string(),
        None => text.to_string(),
    }
}
