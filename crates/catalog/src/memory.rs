//! In-memory reference binding of the storage ports.
//!
//! Transactions are implemented with a full snapshot taken at `begin_transaction`,
//! which keeps rollback exact at the cost of one clone per transaction.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::StoreError;
use crate::models::{EntityKind, Logo, Record, Review, Score, SupplyOption};
use crate::store::{Filter, LogoStore, Row, Store};

/// Public directory generated logos are served from.
pub const LOGO_DIR: &str = "/images/jed_logos";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Record>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    tables: BTreeMap<EntityKind, Table>,
    logos: BTreeMap<String, Logo>,
}

/// A [`Store`] and [`LogoStore`] kept entirely in memory.
///
/// Enforces the uniqueness constraints a real catalog schema carries: user id,
/// username and email; one developer row per user; unique extension titles; one
/// varied datum and one score per (extension, supply option).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    tables: BTreeMap<EntityKind, Table>,
    logos: BTreeMap<String, Logo>,
    #[serde(skip)]
    snapshot: Option<Box<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map_or(0, |t| t.rows.len())
    }

    /// Number of saved logos.
    pub fn logo_count(&self) -> usize {
        self.logos.len()
    }

    pub fn logo(&self, path: &str) -> Option<&Logo> {
        let file_name = path.strip_prefix(LOGO_DIR)?.trim_start_matches('/');
        self.logos.get(file_name)
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Reads a store previously written with [`MemoryStore::to_writer`].
    pub fn from_reader(reader: impl Read) -> Result<Self, StoreError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes committed state as JSON. An open transaction is not rolled back first.
    pub fn to_writer(&self, writer: impl Write) -> Result<(), StoreError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Loads a store from a JSON file, or starts empty when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!("No store file at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn rows(&self, kind: EntityKind) -> impl Iterator<Item = &Record> {
        self.tables.get(&kind).into_iter().flat_map(|t| t.rows.values())
    }

    fn conflict(kind: EntityKind, key: String) -> StoreError {
        StoreError::Conflict { kind, key }
    }

    fn check_unique(&self, record: &Record) -> Result<(), StoreError> {
        let kind = record.kind();
        match record {
            Record::User(user) => {
                let table_has_id = self
                    .tables
                    .get(&kind)
                    .is_some_and(|t| t.rows.contains_key(&user.id));
                if table_has_id {
                    return Err(Self::conflict(kind, format!("id={}", user.id)));
                }
                for existing in self.rows(kind) {
                    if let Record::User(other) = existing {
                        if other.username == user.username {
                            return Err(Self::conflict(kind, format!("username={}", user.username)));
                        }
                        if other.email == user.email {
                            return Err(Self::conflict(kind, format!("email={}", user.email)));
                        }
                    }
                }
            }
            Record::Developer(developer) => {
                let taken = self.rows(kind).any(
                    |r| matches!(r, Record::Developer(other) if other.user_id == developer.user_id),
                );
                if taken {
                    return Err(Self::conflict(kind, format!("user_id={}", developer.user_id)));
                }
            }
            Record::Extension(extension) => {
                let taken = self
                    .rows(kind)
                    .any(|r| matches!(r, Record::Extension(other) if other.title == extension.title));
                if taken {
                    return Err(Self::conflict(kind, format!("title={}", extension.title)));
                }
            }
            Record::VariedDatum(datum) => {
                let key = (datum.extension_id, datum.supply_option);
                let taken = self.rows(kind).any(|r| {
                    matches!(r, Record::VariedDatum(other) if (other.extension_id, other.supply_option) == key)
                });
                if taken {
                    return Err(Self::pair_conflict(kind, key));
                }
            }
            Record::Score(score) => {
                let key = (score.extension_id, score.supply_option);
                let taken = self.rows(kind).any(|r| {
                    matches!(r, Record::Score(other) if (other.extension_id, other.supply_option) == key)
                });
                if taken {
                    return Err(Self::pair_conflict(kind, key));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn pair_conflict(kind: EntityKind, (extension_id, option): (i64, SupplyOption)) -> StoreError {
        Self::conflict(
            kind,
            format!("extension_id={extension_id}, supply_option={}", option.as_str()),
        )
    }
}

impl Store for MemoryStore {
    fn insert(&mut self, record: Record) -> Result<i64, StoreError> {
        self.check_unique(&record)?;

        let table = self.tables.entry(record.kind()).or_default();
        let id = match &record {
            Record::User(user) => user.id,
            _ => table.last_id + 1,
        };
        table.last_id = table.last_id.max(id);
        table.rows.insert(id, record);
        Ok(id)
    }

    fn bulk_delete(&mut self, kind: EntityKind, filter: Filter) -> Result<u64, StoreError> {
        let Some(table) = self.tables.get_mut(&kind) else {
            return Ok(0);
        };
        let before = table.rows.len();
        table.rows.retain(|&id, _| !filter.matches(id));
        let removed = (before - table.rows.len()) as u64;
        if table.rows.is_empty() && filter == Filter::All {
            // Truncate semantics: ids restart.
            table.last_id = 0;
        }
        debug!("Deleted {removed} {kind} rows");
        Ok(removed)
    }

    fn query(&self, kind: EntityKind, filter: Filter) -> Result<Vec<Row>, StoreError> {
        Ok(self
            .tables
            .get(&kind)
            .map(|t| {
                t.rows
                    .iter()
                    .filter(|(id, _)| filter.matches(**id))
                    .map(|(&id, record)| Row {
                        id,
                        record: record.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn begin_transaction(&mut self) -> Result<(), StoreError> {
        if self.snapshot.is_some() {
            return Err(StoreError::TransactionActive);
        }
        self.snapshot = Some(Box::new(Snapshot {
            tables: self.tables.clone(),
            logos: self.logos.clone(),
        }));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let snapshot = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        self.tables = snapshot.tables;
        self.logos = snapshot.logos;
        debug!("Rolled back transaction");
        Ok(())
    }

    fn recompute_scores(&mut self) -> Result<u64, StoreError> {
        let mut groups: BTreeMap<(i64, SupplyOption), Vec<&Review>> = BTreeMap::new();
        for record in self.rows(EntityKind::Review) {
            if let Record::Review(review) = record {
                if review.published {
                    groups
                        .entry((review.extension_id, review.supply_option))
                        .or_default()
                        .push(review);
                }
            }
        }

        let scores: Vec<Score> = groups
            .into_iter()
            .map(|((extension_id, option), reviews)| {
                Score::from_reviews(extension_id, option, &reviews)
            })
            .collect();

        self.bulk_delete(EntityKind::Score, Filter::All)?;
        let written = scores.len() as u64;
        for score in scores {
            self.insert(Record::Score(score))?;
        }
        Ok(written)
    }
}

impl LogoStore for MemoryStore {
    fn save_logo(&mut self, file_name: &str, logo: &Logo) -> Result<String, StoreError> {
        self.logos.insert(file_name.to_string(), logo.clone());
        Ok(format!("{LOGO_DIR}/{file_name}"))
    }

    fn purge_logos(&mut self) -> Result<u64, StoreError> {
        let removed = self.logos.len() as u64;
        self.logos.clear();
        Ok(removed)
    }
}
