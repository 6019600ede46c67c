//! Populates a catalog store with a consistent sample dataset.
//!
//! [`PopulationGenerator`] runs two commands made of strictly sequential
//! phases. The user command resets generated users, creates new ones in
//! batches and turns the first of them into developers. The extension command
//! resets the catalog and then creates extensions, their supply option data,
//! images, reviews with the occasional developer reply, and finally the score
//! aggregates.
//!
//! Every phase runs in one store transaction and is rolled back on failure,
//! except user creation, which commits every `batch_size` users.
//!
//! ```rust,ignore
//! let corpus = WordCorpus::builtin()?;
//! let media = MediaPool::builtin()?;
//! let mut generator = PopulationGenerator::new(
//!     MemoryStore::new(),
//!     TracingReporter::new(),
//!     &corpus,
//!     &media,
//!     StdRng::seed_from_u64(12345),
//!     RunConfig::default(),
//! );
//! generator.run()?;
//! ```

mod error;
mod extensions;
pub mod identity;
mod metrics;
mod reviews;
mod users;

use std::fmt;
use std::time::Instant;

use rand::Rng;
use time::OffsetDateTime;
use tracing::{info, warn};

use catalog::{LogoStore, Record, Store, Validate};

use crate::config::RunConfig;
use crate::corpus::{MediaPool, WordCorpus};
use crate::generators::{
    DeveloperGenConfig, DeveloperGenerator, ExtensionGenConfig, ExtensionGenerator, LogoGenerator,
    ReviewGenConfig, ReviewGenerator, TitleRegistry, UserGenConfig, UserGenerator,
    VariedDataGenConfig, VariedDataGenerator,
};
use crate::report::Reporter;

pub use error::GenerateError;
use error::InPhase;
pub use identity::Identity;
pub use metrics::{PhaseMetrics, RunMetrics};
pub use users::{MAX_USER_ATTEMPTS, RetryBudget};

/// Steps of the two generation commands, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    ResetUsers,
    CreateUsers,
    AssignDevelopers,
    Reset,
    CreateExtensions,
    CreateVariedData,
    CreateExtensionImages,
    CreateReviews,
    CreateScores,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ResetUsers => "reset_users",
            Phase::CreateUsers => "create_users",
            Phase::AssignDevelopers => "assign_developers",
            Phase::Reset => "reset",
            Phase::CreateExtensions => "create_extensions",
            Phase::CreateVariedData => "create_varied_data",
            Phase::CreateExtensionImages => "create_extension_images",
            Phase::CreateReviews => "create_reviews",
            Phase::CreateScores => "create_scores",
        }
    }

    /// Heading shown to the operator when the phase starts.
    pub fn title(&self) -> &'static str {
        match self {
            Phase::ResetUsers => "Deleting old users",
            Phase::CreateUsers => "Creating new users",
            Phase::AssignDevelopers => "Assigning developer names",
            Phase::Reset => "Deleting extensions, reviews, and scores",
            Phase::CreateExtensions => "Creating extensions",
            Phase::CreateVariedData => "Creating varied data for extensions",
            Phase::CreateExtensionImages => "Creating extension images",
            Phase::CreateReviews => "Creating extension reviews",
            Phase::CreateScores => "Creating extension scores",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates users, developers, extensions, reviews and scores into a store.
pub struct PopulationGenerator<'a, S, P, R> {
    store: S,
    reporter: P,
    corpus: &'a WordCorpus,
    media: &'a MediaPool,
    rng: R,
    config: RunConfig,
    now: OffsetDateTime,
    titles: TitleRegistry,
    metrics: RunMetrics,

    user_gen: UserGenerator,
    developer_gen: DeveloperGenerator,
    extension_gen: ExtensionGenerator,
    varied_gen: VariedDataGenerator,
    review_gen: ReviewGenerator,
    logo_gen: LogoGenerator,
}

impl<'a, S, P, R> PopulationGenerator<'a, S, P, R>
where
    S: Store + LogoStore,
    P: Reporter,
    R: Rng,
{
    pub fn new(
        store: S,
        reporter: P,
        corpus: &'a WordCorpus,
        media: &'a MediaPool,
        rng: R,
        config: RunConfig,
    ) -> Self {
        let developer_gen = DeveloperGenerator::with_config(DeveloperGenConfig {
            company_chance: config.company_chance,
            suspicious_chance: config.suspicious_chance,
        });

        Self {
            store,
            reporter,
            corpus,
            media,
            rng,
            config,
            now: OffsetDateTime::now_utc(),
            titles: TitleRegistry::new(),
            metrics: RunMetrics::default(),
            user_gen: UserGenerator::new(),
            developer_gen,
            extension_gen: ExtensionGenerator::new(),
            varied_gen: VariedDataGenerator::new(),
            review_gen: ReviewGenerator::new(),
            logo_gen: LogoGenerator::new(),
        }
    }

    /// Pins the instant every "now"-relative window is computed against.
    pub fn with_now(mut self, now: OffsetDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn with_user_config(mut self, config: UserGenConfig) -> Self {
        self.user_gen = UserGenerator::with_config(config);
        self
    }

    pub fn with_extension_config(mut self, config: ExtensionGenConfig) -> Self {
        self.extension_gen = ExtensionGenerator::with_config(config);
        self
    }

    pub fn with_varied_data_config(mut self, config: VariedDataGenConfig) -> Self {
        self.varied_gen = VariedDataGenerator::with_config(config);
        self
    }

    pub fn with_review_config(mut self, config: ReviewGenConfig) -> Self {
        self.review_gen = ReviewGenerator::with_config(config);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Runs the user command: reset, create users, assign developers.
    pub fn run_users(&mut self) -> Result<(), GenerateError> {
        let result = self.user_phases();
        self.conclude(result)
    }

    /// Runs the extension command: reset, then every creation phase in order.
    pub fn run_extensions(&mut self) -> Result<(), GenerateError> {
        let result = self.extension_phases();
        self.conclude(result)
    }

    /// Runs the user command followed by the extension command.
    pub fn run(&mut self) -> Result<(), GenerateError> {
        let result = self.user_phases().and_then(|()| self.extension_phases());
        self.conclude(result)
    }

    fn user_phases(&mut self) -> Result<(), GenerateError> {
        self.reset_users()?;
        self.create_users()?;
        self.assign_developers()?;
        Ok(())
    }

    fn extension_phases(&mut self) -> Result<(), GenerateError> {
        self.reset_extensions()?;
        self.create_extensions()?;
        self.create_varied_data()?;
        self.create_extension_images()?;
        self.create_reviews()?;
        self.create_scores()?;
        Ok(())
    }

    fn conclude(&mut self, result: Result<(), GenerateError>) -> Result<(), GenerateError> {
        match &result {
            Ok(()) => self.reporter.success("Done"),
            Err(err) => self.reporter.error(&err.report()),
        }
        result
    }

    /// Announces a phase, runs it and records how long it took.
    fn timed(
        &mut self,
        phase: Phase,
        body: impl FnOnce(&mut Self) -> Result<u64, GenerateError>,
    ) -> Result<u64, GenerateError> {
        self.reporter.title(phase.title());
        let started = Instant::now();

        let rows = body(self)?;

        let elapsed = started.elapsed();
        self.metrics.record(phase, elapsed, rows);
        info!("{phase} completed in {}ms ({rows} rows)", elapsed.as_millis());
        Ok(rows)
    }

    /// Runs `body` inside one store transaction, rolling back on any error.
    fn transaction<T>(
        &mut self,
        phase: Phase,
        body: impl FnOnce(&mut Self) -> Result<T, GenerateError>,
    ) -> Result<T, GenerateError> {
        self.store.begin_transaction().in_phase(phase)?;
        let result = body(self).and_then(|value| {
            self.store.commit().in_phase(phase)?;
            Ok(value)
        });
        if result.is_err() {
            self.rollback_quietly(phase);
        }
        result
    }

    fn rollback_quietly(&mut self, phase: Phase) {
        if let Err(err) = self.store.rollback() {
            warn!("Rolling back {phase} failed: {err}");
        }
    }

    /// Validates a record and hands it to the store.
    fn insert<E>(&mut self, phase: Phase, entity: E) -> Result<i64, GenerateError>
    where
        E: Validate + Into<Record>,
    {
        entity
            .validate()
            .map_err(|source| GenerateError::Invalid { phase, source })?;
        self.store.insert(entity.into()).in_phase(phase)
    }
}
