//! Developer profiles for existing users.

use rand::Rng;

use catalog::Developer;

use crate::corpus::WordCorpus;
use crate::sampling::biased_accept;

#[derive(Debug, Clone)]
pub struct DeveloperGenConfig {
    /// Percent chance a developer publishes under a company name.
    pub company_chance: f64,
    /// Percent chance a developer is flagged as suspicious.
    pub suspicious_chance: f64,
}

impl Default for DeveloperGenConfig {
    fn default() -> Self {
        Self {
            company_chance: 40.0,
            suspicious_chance: 0.5,
        }
    }
}

pub struct DeveloperGenerator {
    config: DeveloperGenConfig,
}

impl DeveloperGenerator {
    /// Creates a new developer generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: DeveloperGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: DeveloperGenConfig) -> Self {
        Self { config }
    }

    /// Turns the user into a developer, either under their own name or a company's.
    pub fn generate(
        &self,
        user_id: i64,
        user_name: &str,
        corpus: &WordCorpus,
        rng: &mut impl Rng,
    ) -> Developer {
        let is_company = biased_accept(rng, self.config.company_chance);
        let suspicious = biased_accept(rng, self.config.suspicious_chance);

        let name = if is_company {
            corpus.company(rng)
        } else {
            user_name.to_string()
        };

        Developer {
            user_id,
            name,
            suspicious,
        }
    }
}

impl Default for DeveloperGenerator {
    fn default() -> Self {
        Self::new()
    }
}
