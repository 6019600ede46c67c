//! Run parameters.

use serde::{Deserialize, Serialize};

/// Parameters of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Generated users get consecutive ids starting here. Lower ids are left alone.
    pub min_user_id: i64,

    /// Number of users that become developers.
    pub developers: usize,

    /// Number of users that only write reviews.
    pub regular_users: usize,

    /// Users committed per transaction while creating users.
    pub batch_size: usize,

    /// Percent chance a developer uses a company name.
    pub company_chance: f64,

    /// Percent chance a developer is marked suspicious.
    pub suspicious_chance: f64,

    /// Upper bound of extensions created per developer.
    pub max_extensions_per_developer: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_user_id: 2000,
            developers: 3000,
            regular_users: 10000,
            batch_size: 100,
            company_chance: 40.0,
            suspicious_chance: 0.5,
            max_extensions_per_developer: 5,
        }
    }
}

impl RunConfig {
    pub fn total_users(&self) -> usize {
        self.developers + self.regular_users
    }
}
