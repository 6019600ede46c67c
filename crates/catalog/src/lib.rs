//! Domain model of the JED extension catalog.
//!
//! Typed records for every table the sample-data generator writes, record
//! validation, the persistence and logo ports, and an in-memory store that
//! implements both ports.

pub mod errors;
pub mod memory;
pub mod models;
pub mod store;

pub use errors::{StoreError, ValidationError};
pub use memory::{LOGO_DIR, MemoryStore};
pub use models::{
    Category, Developer, DownloadIntegration, Entity, EntityKind, Extension, ExtensionImage,
    ExtensionType, License, Logo, PlatformVersion, Record, Review, ReviewComment, Score,
    ScoreComments, SubScores, SupplyOption, User, Validate, VariedDatum,
};
pub use store::{Filter, LogoStore, Row, Store};
