//! Seed script - fills a JSON catalog store with sample data
//!
//! Run with:
//! ```
//! cargo run -p jed-sample --bin jed-seed -- all --seed 12345
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use catalog::{Category, EntityKind, MemoryStore, Store, Validate};
use jed_sample::config::RunConfig;
use jed_sample::corpus::{MediaPool, WordCorpus, default_categories};
use jed_sample::generators::slugify;
use jed_sample::population::{PopulationGenerator, RunMetrics};
use jed_sample::report::TracingReporter;

/// Sample data generator for the JED extension catalog.
#[derive(Parser)]
#[command(name = "jed-seed")]
#[command(about = "Sample data generator for the JED extension catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace generated users and assign developers
    Users,

    /// Replace extensions, varied data, images, reviews and scores
    Extensions,

    /// Run the user command followed by the extension command
    All,
}

/// Run parameters. Anything left out keeps its [`RunConfig`] default.
#[derive(Args)]
struct CommonArgs {
    /// Generated users get consecutive ids starting here
    #[arg(long, env = "JED_MIN_UID", global = true)]
    min_uid: Option<i64>,

    /// Number of users that become developers
    #[arg(long, env = "JED_DEVELOPERS", global = true)]
    developers: Option<usize>,

    /// Number of users that only write reviews
    #[arg(long, env = "JED_REGULAR", global = true)]
    regular: Option<usize>,

    /// Users committed per transaction
    #[arg(long, env = "JED_USERS_PER_BATCH", global = true)]
    users_per_batch: Option<usize>,

    /// Percent chance a developer uses a company name
    #[arg(long, env = "JED_COMPANY_CHANCE", global = true)]
    company_chance: Option<f64>,

    /// Percent chance a developer is marked suspicious
    #[arg(long, env = "JED_SUSPICIOUS_CHANCE", global = true)]
    suspicious_chance: Option<f64>,

    /// Maximum extensions per developer
    #[arg(long, env = "JED_PER_DEVELOPER", global = true)]
    per_developer: Option<i64>,

    /// Seed for reproducible data; random when omitted
    #[arg(long, env = "JED_SEED", global = true)]
    seed: Option<u64>,

    /// Directory holding adjectives/nouns/words/photos/videos JSON lists
    #[arg(long, env = "JED_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON file the store is loaded from and saved to
    #[arg(long, env = "JED_STORE", default_value = "jed-sample.json", global = true)]
    store: PathBuf,
}

impl CommonArgs {
    /// Overlays the given flags onto the default run parameters.
    fn run_config(&self) -> RunConfig {
        let defaults = RunConfig::default();
        RunConfig {
            min_user_id: self.min_uid.unwrap_or(defaults.min_user_id),
            developers: self.developers.unwrap_or(defaults.developers),
            regular_users: self.regular.unwrap_or(defaults.regular_users),
            batch_size: self.users_per_batch.unwrap_or(defaults.batch_size),
            company_chance: self.company_chance.unwrap_or(defaults.company_chance),
            suspicious_chance: self.suspicious_chance.unwrap_or(defaults.suspicious_chance),
            max_extensions_per_developer: self
                .per_developer
                .unwrap_or(defaults.max_extensions_per_developer),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let args = &cli.common;

    let (corpus, media) = match &args.data_dir {
        Some(dir) => (WordCorpus::from_dir(dir)?, MediaPool::from_dir(dir)?),
        None => (WordCorpus::builtin()?, MediaPool::builtin()?),
    };

    let mut store = MemoryStore::load(&args.store)
        .with_context(|| format!("loading store from {}", args.store.display()))?;
    tracing::info!("Loaded store from {}", args.store.display());
    seed_categories(&mut store)?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut generator = PopulationGenerator::new(
        store,
        TracingReporter::new(),
        &corpus,
        &media,
        rng,
        args.run_config(),
    );

    match cli.command {
        Commands::Users => generator.run_users()?,
        Commands::Extensions => generator.run_extensions()?,
        Commands::All => generator.run()?,
    }

    let metrics = generator.metrics().clone();
    let store = generator.into_store();
    save_store(&store, &args.store)?;

    summarize(&store, &metrics);
    Ok(())
}

/// Gives an empty store a flat category list so extensions can be categorized.
fn seed_categories(store: &mut MemoryStore) -> anyhow::Result<()> {
    if store.count(EntityKind::Category) > 0 {
        return Ok(());
    }

    let titles = default_categories()?;
    store.begin_transaction()?;
    for title in &titles {
        let category = Category {
            title: title.clone(),
            alias: slugify(title),
            parent_id: None,
        };
        category.validate()?;
        store.insert(category.into())?;
    }
    store.commit()?;

    tracing::info!("Seeded {} default categories", titles.len());
    Ok(())
}

fn save_store(store: &MemoryStore, path: &Path) -> anyhow::Result<()> {
    store
        .save(path)
        .with_context(|| format!("saving store to {}", path.display()))?;
    tracing::info!("Saved store to {}", path.display());
    Ok(())
}

fn summarize(store: &MemoryStore, metrics: &RunMetrics) {
    tracing::info!("Seed completed!");
    for phase in &metrics.phases {
        tracing::info!("  {}: {} rows in {}ms", phase.phase, phase.rows, phase.elapsed_ms);
    }
    tracing::info!("  Users: {}", store.count(EntityKind::User));
    tracing::info!("  Developers: {}", store.count(EntityKind::Developer));
    tracing::info!("  Extensions: {}", store.count(EntityKind::Extension));
    tracing::info!("  Varied data: {}", store.count(EntityKind::VariedDatum));
    tracing::info!("  Images: {}", store.count(EntityKind::ExtensionImage));
    tracing::info!("  Reviews: {}", store.count(EntityKind::Review));
    tracing::info!("  Review comments: {}", store.count(EntityKind::ReviewComment));
    tracing::info!("  Scores: {}", store.count(EntityKind::Score));
    tracing::info!("  Logos: {}", store.logo_count());
    tracing::info!("  User retries: {}", metrics.user_retries);
    tracing::info!("  Total time: {}ms", metrics.total_time_ms());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_flags_keep_run_defaults() {
        let cli = Cli::try_parse_from(["jed-seed", "all"]).unwrap();
        assert_eq!(cli.common.run_config(), RunConfig::default());
    }

    #[test]
    fn test_flags_override_run_defaults() {
        let cli = Cli::try_parse_from([
            "jed-seed",
            "users",
            "--developers",
            "10",
            "--company-chance",
            "12.5",
        ])
        .unwrap();
        let config = cli.common.run_config();

        assert!(matches!(cli.command, Commands::Users));
        assert_eq!(config.developers, 10);
        assert_eq!(config.company_chance, 12.5);
        assert_eq!(config.regular_users, RunConfig::default().regular_users);
    }
}
