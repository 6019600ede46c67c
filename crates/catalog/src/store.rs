//! Persistence ports consumed by the generator.
//!
//! Concrete bindings only need insert, bulk delete, query, transaction control and
//! the one aggregate recompute; the generator never issues anything else.

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::{Entity, EntityKind, Logo, Record};

/// Row selection for queries and bulk deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Rows whose id is greater than or equal to the bound.
    IdAtLeast(i64),
}

impl Filter {
    pub fn matches(&self, id: i64) -> bool {
        match self {
            Filter::All => true,
            Filter::IdAtLeast(min) => id >= *min,
        }
    }
}

/// A stored record together with its generated (or, for users, assigned) id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: i64,
    pub record: Record,
}

/// Relational persistence port.
pub trait Store {
    /// Inserts a record and returns its id.
    ///
    /// Users keep the id they carry; every other kind gets the next free id of its table.
    fn insert(&mut self, record: Record) -> Result<i64, StoreError>;

    /// Deletes matching rows of one table, returning how many were removed.
    fn bulk_delete(&mut self, kind: EntityKind, filter: Filter) -> Result<u64, StoreError>;

    /// Returns matching rows ordered by id.
    fn query(&self, kind: EntityKind, filter: Filter) -> Result<Vec<Row>, StoreError>;

    fn begin_transaction(&mut self) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Replaces every score row with the aggregate of the published reviews,
    /// grouped by (extension, supply option). Returns the number of rows written.
    fn recompute_scores(&mut self) -> Result<u64, StoreError>;

    /// Typed variant of [`Store::query`].
    fn fetch<E: Entity>(&self, filter: Filter) -> Result<Vec<(i64, E)>, StoreError>
    where
        Self: Sized,
    {
        Ok(self
            .query(E::KIND, filter)?
            .into_iter()
            .filter_map(|row| E::from_record(row.record).map(|entity| (row.id, entity)))
            .collect())
    }
}

/// Storage for generated logo images.
pub trait LogoStore {
    /// Persists a logo under `file_name` and returns the public path to it.
    fn save_logo(&mut self, file_name: &str, logo: &Logo) -> Result<String, StoreError>;

    /// Removes every generated logo, returning how many were removed.
    fn purge_logos(&mut self) -> Result<u64, StoreError>;
}
