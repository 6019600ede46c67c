//! Record generators for the catalog.
//!
//! Each generator builds one kind of record from the sampling primitives and
//! the word/media corpus. None of them touch storage:
//! - [`UserGenerator`]: site users named after adjective/noun combos
//! - [`DeveloperGenerator`]: developer profiles, personal or company named
//! - [`ExtensionGenerator`]: extension records with flags, licence and approval
//! - [`VariedDataGenerator`]: supply options and per-option marketing data
//! - [`ReviewGenerator`]: scored reviews and developer replies
//! - [`LogoGenerator`]: identicon logos

pub mod developer;
pub mod extension;
pub mod logo;
pub mod review;
pub mod user;
pub mod varied;
pub mod version;

pub use developer::{DeveloperGenConfig, DeveloperGenerator};
pub use extension::{ExtensionDraft, ExtensionGenConfig, ExtensionGenerator, TitleRegistry, slugify};
pub use logo::LogoGenerator;
pub use review::{ReviewGenConfig, ReviewGenerator, ReviewTarget};
pub use user::{UserGenConfig, UserGenerator, timezones_for};
pub use varied::{VariedDataGenConfig, VariedDataGenerator};
pub use version::{DEFAULT_MAX_VERSION, random_version};
