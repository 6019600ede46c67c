//! Extension records, titles, and URL slugs.

use std::collections::HashSet;

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use rand::Rng;
use time::{Duration, OffsetDateTime};

use catalog::{Extension, ExtensionType, License, PlatformVersion};

use super::version::{DEFAULT_MAX_VERSION, random_version};
use crate::corpus::{MediaPool, WordCorpus};
use crate::sampling::{Bias, between_instants, biased_accept, biased_int, select};

/// Configuration for extension generation. Chances are percentages.
#[derive(Debug, Clone)]
pub struct ExtensionGenConfig {
    pub platform_chances: Vec<(PlatformVersion, f64)>,
    pub default_platform: PlatformVersion,
    pub include_chances: Vec<(ExtensionType, f64)>,
    pub default_include: ExtensionType,
    pub popular_chance: f64,
    pub requires_registration_chance: f64,
    pub can_update_chance: f64,
    pub uses_updater_chance: f64,
    pub approved_chance: f64,
    pub checked_chance: f64,
    pub third_party_chance: f64,
    /// Approval happens at most this many days after creation.
    pub approval_window_days: i64,
    /// Extensions are created at least this many days before now.
    pub min_age_days: i64,
}

impl Default for ExtensionGenConfig {
    fn default() -> Self {
        Self {
            platform_chances: vec![
                (PlatformVersion::Joomla3, 30.0),
                (PlatformVersion::Joomla4, 75.0),
                (PlatformVersion::Joomla5, 5.0),
            ],
            default_platform: PlatformVersion::Joomla4,
            include_chances: vec![
                (ExtensionType::Component, 70.0),
                (ExtensionType::Module, 50.0),
                (ExtensionType::Plugin, 20.0),
            ],
            default_include: ExtensionType::Component,
            popular_chance: 10.0,
            requires_registration_chance: 15.0,
            can_update_chance: 95.0,
            uses_updater_chance: 95.0,
            approved_chance: 98.0,
            checked_chance: 95.0,
            third_party_chance: 5.0,
            approval_window_days: 7,
            min_age_days: 7,
        }
    }
}

/// Who owns a new extension and what it should reference.
#[derive(Debug, Clone)]
pub struct ExtensionDraft {
    pub developer_id: i64,
    pub developer_registered_at: OffsetDateTime,
    pub title: String,
    pub category_id: Option<i64>,
    pub logo: String,
}

pub struct ExtensionGenerator {
    config: ExtensionGenConfig,
}

impl ExtensionGenerator {
    /// Creates a new extension generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: ExtensionGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: ExtensionGenConfig) -> Self {
        Self { config }
    }

    pub fn generate(
        &self,
        draft: ExtensionDraft,
        media: &MediaPool,
        now: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> Extension {
        let config = &self.config;

        let platforms = select(rng, &config.platform_chances, config.default_platform);
        let created_on = between_instants(
            rng,
            draft.developer_registered_at,
            now - Duration::days(config.min_age_days),
        );

        let approved = biased_accept(rng, config.approved_chance);
        let approved_at = approved.then(|| {
            let latest = (created_on + Duration::days(config.approval_window_days)).min(now);
            between_instants(rng, created_on, latest)
        });

        let includes = select(rng, &config.include_chances, config.default_include);
        let license_index = biased_int(rng, 0, License::ALL.len() as i64 - 1, Bias::ExpLow);
        let license = License::ALL
            .get(license_index as usize)
            .copied()
            .unwrap_or(License::GplV2OrLater);

        Extension {
            alias: slugify(&draft.title),
            title: draft.title,
            platforms,
            includes,
            license,
            popular: biased_accept(rng, config.popular_chance),
            requires_registration: biased_accept(rng, config.requires_registration_chance),
            uses_updater: biased_accept(rng, config.uses_updater_chance),
            can_update: biased_accept(rng, config.can_update_chance),
            checked: biased_accept(rng, config.checked_chance),
            uses_third_party: biased_accept(rng, config.third_party_chance),
            version: random_version(rng, DEFAULT_MAX_VERSION),
            video: media.video(rng).to_string(),
            second_contact_email: SafeEmail().fake_with_rng(rng),
            approved,
            approved_at,
            primary_category_id: draft.category_id,
            logo: draft.logo,
            created_by: draft.developer_id,
            created_on,
        }
    }
}

impl Default for ExtensionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension titles already handed out during this run.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    used: HashSet<String>,
}

impl TitleRegistry {
    /// Attempts at a fresh combo before numbering the title instead.
    const MAX_DRAWS: usize = 1_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a title nobody has used yet and records it.
    pub fn claim(&mut self, corpus: &WordCorpus, rng: &mut impl Rng) -> String {
        let mut title = corpus.combo(rng);
        for _ in 1..Self::MAX_DRAWS {
            if !self.used.contains(&title) {
                break;
            }
            title = corpus.combo(rng);
        }

        let mut candidate = title.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{title} {n}");
            n += 1;
        }

        self.used.insert(candidate.clone());
        candidate
    }

    pub fn contains(&self, title: &str) -> bool {
        self.used.contains(title)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn clear(&mut self) {
        self.used.clear();
    }
}

/// Lower-case URL slug: runs of anything but letters and digits become one `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Validate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::macros::datetime;

    fn draft(title: &str) -> ExtensionDraft {
        ExtensionDraft {
            developer_id: 2001,
            developer_registered_at: datetime!(2018-01-01 00:00 UTC),
            title: title.to_string(),
            category_id: Some(3),
            logo: "/images/jed_logos/a.png".into(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Brave Otter"), "brave-otter");
        assert_eq!(slugify("  Keen-eyed   Heron!! "), "keen-eyed-heron");
        assert_eq!(slugify("Crème Brûlée 2"), "crème-brûlée-2");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_generate_extension() {
        let media = MediaPool::builtin().unwrap();
        let generator = ExtensionGenerator::new();
        let mut rng = StdRng::seed_from_u64(12345);
        let now = datetime!(2024-05-01 00:00 UTC);

        for _ in 0..500 {
            let extension = generator.generate(draft("Brave Otter"), &media, now, &mut rng);

            assert_eq!(extension.alias, "brave-otter");
            assert!(!extension.platforms.is_empty());
            assert!(!extension.includes.is_empty());
            assert!(extension.created_on >= datetime!(2018-01-01 00:00 UTC));
            assert!(extension.created_on <= now - Duration::days(7));
            if let Some(approved_at) = extension.approved_at {
                assert!(approved_at >= extension.created_on);
                assert!(approved_at <= extension.created_on + Duration::days(7));
            }
            assert!(extension.validate().is_ok(), "{extension:?}");
        }
    }

    #[test]
    fn test_license_skews_to_gpl() {
        let media = MediaPool::builtin().unwrap();
        let generator = ExtensionGenerator::new();
        let mut rng = StdRng::seed_from_u64(12345);
        let now = datetime!(2024-05-01 00:00 UTC);

        let gpl = (0..1_000)
            .map(|_| generator.generate(draft("Calm Heron"), &media, now, &mut rng))
            .filter(|e| e.license == License::GplV2OrLater)
            .count();
        assert!(gpl > 400, "only {gpl} GPL extensions");
    }

    #[test]
    fn test_title_registry_never_repeats() {
        let corpus = WordCorpus::new(
            vec!["brave".into()],
            vec!["otter".into(), "heron".into()],
            vec!["widget".into()],
        )
        .unwrap();
        let mut registry = TitleRegistry::new();
        let mut rng = StdRng::seed_from_u64(12345);

        let titles: Vec<String> = (0..5).map(|_| registry.claim(&corpus, &mut rng)).collect();
        let unique: HashSet<&String> = titles.iter().collect();

        assert_eq!(unique.len(), 5);
        assert!(registry.contains("Brave Otter") && registry.contains("Brave Heron"));
        assert_eq!(registry.len(), 5);
    }
}
