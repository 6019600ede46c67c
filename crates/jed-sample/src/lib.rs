//! Sample data generation for the JED extension catalog.
//!
//! This crate fills a catalog store with synthetic users, developers, extensions,
//! per-supply-option marketing data, images, reviews and score aggregates, to
//! support manual verification and integration testing of the catalog.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use jed_sample::prelude::*;
//!
//! let corpus = WordCorpus::builtin()?;
//! let media = MediaPool::builtin()?;
//! let config = RunConfig {
//!     developers: 50,
//!     regular_users: 500,
//!     ..RunConfig::default()
//! };
//!
//! let mut generator = PopulationGenerator::new(
//!     MemoryStore::new(),
//!     TracingReporter::new(),
//!     &corpus,
//!     &media,
//!     StdRng::seed_from_u64(12345),
//!     config,
//! );
//! generator.run()?;
//! ```

pub mod config;
pub mod corpus;
pub mod generators;
pub mod population;
pub mod report;
pub mod sampling;

// Re-export the storage side so callers need a single dependency
pub use catalog::{
    EntityKind, LogoStore, MemoryStore, Record, Store, StoreError, SupplyOption, ValidationError,
};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::RunConfig;
    pub use crate::corpus::{CorpusError, MediaPool, WordCorpus, default_categories};
    pub use crate::generators::{
        DeveloperGenerator, ExtensionGenerator, LogoGenerator, ReviewGenerator, UserGenerator,
        VariedDataGenerator,
    };
    pub use crate::population::{GenerateError, Phase, PopulationGenerator, RunMetrics};
    pub use crate::report::{ErrorReport, Reporter, TracingReporter};
    pub use crate::sampling::{Bias, between, biased_accept, biased_int, pick_distinct, select};
    pub use crate::{EntityKind, MemoryStore, Store};
    pub use rand::SeedableRng;
    pub use rand::rngs::StdRng;
}
