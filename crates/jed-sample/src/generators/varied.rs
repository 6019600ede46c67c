//! Supply options and the per-option data of an extension.

use fake::Fake;
use fake::faker::internet::en::DomainSuffix;
use fake::faker::lorem::en::{Paragraphs, Sentence};
use rand::Rng;

use catalog::{DownloadIntegration, Extension, SupplyOption, VariedDatum};

use crate::corpus::WordCorpus;
use crate::sampling::{biased_accept, select};

/// Configuration for varied data generation. Chances are percentages.
#[derive(Debug, Clone)]
pub struct VariedDataGenConfig {
    /// Chance that an extension requiring registration is a cloud service.
    pub cloud_chance: f64,
    pub free_chance: f64,
    pub paid_chance: f64,
    pub demo_chance: f64,
    pub support_chance: f64,
    pub documentation_chance: f64,
    pub translation_chance: f64,
    pub download_integration_chance: f64,
    /// Publication chance of the non-default options.
    pub published_chance: f64,
    pub max_tags: usize,
}

impl Default for VariedDataGenConfig {
    fn default() -> Self {
        Self {
            cloud_chance: 2.0,
            free_chance: 60.0,
            paid_chance: 50.0,
            demo_chance: 40.0,
            support_chance: 75.0,
            documentation_chance: 50.0,
            translation_chance: 30.0,
            download_integration_chance: 90.0,
            published_chance: 98.0,
            max_tags: 4,
        }
    }
}

pub struct VariedDataGenerator {
    config: VariedDataGenConfig,
}

impl VariedDataGenerator {
    /// Creates a new varied data generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: VariedDataGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: VariedDataGenConfig) -> Self {
        Self { config }
    }

    /// Distribution channels for an extension, default first.
    ///
    /// Only free extensions can skip registration. Extensions that require it
    /// are either a cloud service alone or some non-empty mix of free and paid.
    pub fn supply_options(&self, requires_registration: bool, rng: &mut impl Rng) -> Vec<SupplyOption> {
        if !requires_registration {
            return vec![SupplyOption::Free];
        }
        if biased_accept(rng, self.config.cloud_chance) {
            return vec![SupplyOption::Cloud];
        }

        let fallback = if rng.gen_bool(0.5) {
            SupplyOption::Free
        } else {
            SupplyOption::Paid
        };
        select(
            rng,
            &[
                (SupplyOption::Free, self.config.free_chance),
                (SupplyOption::Paid, self.config.paid_chance),
            ],
            fallback,
        )
    }

    /// Data for one supply option. `ordering` 0 is the default option.
    pub fn generate(
        &self,
        extension_id: i64,
        extension: &Extension,
        supply_option: SupplyOption,
        ordering: u32,
        corpus: &WordCorpus,
        rng: &mut impl Rng,
    ) -> VariedDatum {
        let config = &self.config;

        let suffix: String = DomainSuffix().fake_with_rng(rng);
        let base_url = format!("https://{}.{suffix}", extension.alias);
        let num_tags = rng.gen_range(0..=config.max_tags);
        let tags = (0..num_tags)
            .map(|_| corpus.word(rng).to_lowercase())
            .collect();

        let has_integration = biased_accept(rng, config.download_integration_chance);
        let download_integration = match (has_integration, supply_option) {
            (false, _) => DownloadIntegration::None,
            (true, SupplyOption::Free) if extension.requires_registration => {
                DownloadIntegration::FreeWithRegistration
            }
            (true, SupplyOption::Free) => DownloadIntegration::FreeDirect,
            (true, SupplyOption::Paid | SupplyOption::Cloud) => DownloadIntegration::PaidPurchase,
        };

        let is_default = ordering == 0;
        let published = is_default || biased_accept(rng, config.published_chance);

        let intro_text: String = Sentence(8..16).fake_with_rng(rng);
        let description: Vec<String> = Paragraphs(2..5).fake_with_rng(rng);

        VariedDatum {
            extension_id,
            supply_option,
            intro_text,
            description: description.join("\n\n"),
            homepage_link: base_url.clone(),
            download_link: format!("{base_url}/download"),
            demo_link: optional_link(rng, config.demo_chance, &base_url, "demo"),
            support_link: optional_link(rng, config.support_chance, &base_url, "support"),
            documentation_link: optional_link(rng, config.documentation_chance, &base_url, "documentation"),
            translation_link: optional_link(rng, config.translation_chance, &base_url, "languages"),
            license_link: format!("{base_url}/license"),
            update_url: extension.uses_updater.then(|| format!("{base_url}/update")),
            download_integration,
            download_integration_url: has_integration.then(|| format!("{base_url}/dlintegration")),
            tags,
            logo: extension.logo.clone(),
            is_default,
            ordering,
            published,
            created_by: extension.created_by,
        }
    }
}

fn optional_link(rng: &mut impl Rng, chance: f64, base_url: &str, path: &str) -> Option<String> {
    biased_accept(rng, chance).then(|| format!("{base_url}/{path}"))
}

impl Default for VariedDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}
