//! Site user generation.

use rand::Rng;
use rand::seq::SliceRandom;
use time::{Duration, OffsetDateTime};

use catalog::User;

use crate::corpus::WordCorpus;
use crate::sampling::between_instants;

/// Zones a user may pick, keyed by the country part of their locale.
const TIMEZONES_PER_COUNTRY: &[(&str, &[&str])] = &[
    ("DE", &["Europe/Berlin", "Europe/Busingen"]),
    ("ES", &["Europe/Madrid", "Africa/Ceuta", "Atlantic/Canary"]),
    ("FR", &["Europe/Paris"]),
    ("GB", &["Europe/London"]),
    ("GR", &["Europe/Athens"]),
    ("IT", &["Europe/Rome"]),
    ("NL", &["Europe/Amsterdam"]),
    (
        "US",
        &[
            "America/New_York",
            "America/Chicago",
            "America/Denver",
            "America/Phoenix",
            "America/Los_Angeles",
            "America/Anchorage",
            "Pacific/Honolulu",
        ],
    ),
];

const FALLBACK_TIMEZONE: &str = "UTC";

/// Timezones of the country a locale such as `el_GR` names.
pub fn timezones_for(locale: &str) -> &'static [&'static str] {
    let country = locale.rsplit_once('_').map_or("", |(_, country)| country);
    TIMEZONES_PER_COUNTRY
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(country))
        .map(|(_, zones)| *zones)
        .unwrap_or(&[])
}

/// Configuration for user generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    /// Domains appended to the username to build an e-mail address.
    pub email_domains: Vec<String>,
    /// Locales assigned to users.
    pub locales: Vec<String>,
    /// Oldest possible registration, in days before now.
    pub max_account_age_days: i64,
    /// Newest possible registration, in days before now.
    pub min_account_age_days: i64,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            email_domains: ["example.com", "example.net", "example.org"]
                .map(String::from)
                .to_vec(),
            locales: [
                "en_GB", "en_US", "de_DE", "fr_FR", "el_GR", "nl_NL", "es_ES", "it_IT",
            ]
            .map(String::from)
            .to_vec(),
            max_account_age_days: 3650,
            min_account_age_days: 7,
        }
    }
}

/// Generates users named after adjective/noun combinations.
pub struct UserGenerator {
    config: UserGenConfig,
}

impl UserGenerator {
    /// Creates a new user generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: UserGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: UserGenConfig) -> Self {
        Self { config }
    }

    /// Generates a user carrying the given id.
    ///
    /// Nothing here guarantees a unique username or e-mail; the store reports
    /// duplicates and the caller retries.
    pub fn generate(
        &self,
        id: i64,
        corpus: &WordCorpus,
        now: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> User {
        let name = corpus.combo(rng);
        let username = name.to_lowercase().replace(' ', ".");
        let domain = self
            .config
            .email_domains
            .choose(rng)
            .map(String::as_str)
            .unwrap_or("example.com");
        let email = format!("{username}@{domain}");

        let registered_at = between_instants(
            rng,
            now - Duration::days(self.config.max_account_age_days),
            now - Duration::days(self.config.min_account_age_days),
        );
        let last_visit_at = between_instants(rng, registered_at, now);

        let locale = self
            .config
            .locales
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| "en_GB".to_string());
        let timezone = timezones_for(&locale)
            .choose(rng)
            .copied()
            .unwrap_or(FALLBACK_TIMEZONE)
            .to_string();

        User {
            id,
            name,
            username,
            email,
            registered_at,
            last_visit_at,
            locale,
            timezone,
            blocked: false,
        }
    }
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self::new()
    }
}
