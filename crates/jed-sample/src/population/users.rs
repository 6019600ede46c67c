//! User command phases.

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info, warn};

use catalog::{EntityKind, Filter, LogoStore, Store, User, Validate};

use super::error::InPhase;
use super::{GenerateError, Phase, PopulationGenerator};
use crate::report::Reporter;

/// Consecutive failed attempts at one user id before giving up.
pub const MAX_USER_ATTEMPTS: u32 = 5;

/// Counts consecutive failures of a retried operation.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    limit: u32,
    failures: u32,
}

impl RetryBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            failures: 0,
        }
    }

    /// Records a failure. Returns `false` once the limit has been reached.
    pub fn record_failure(&mut self) -> bool {
        self.failures += 1;
        self.failures < self.limit
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl<S, P, R> PopulationGenerator<'_, S, P, R>
where
    S: Store + LogoStore,
    P: Reporter,
    R: Rng,
{
    /// Deletes generated users (ids from `min_user_id` up) and every developer profile.
    pub fn reset_users(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::ResetUsers;
        self.timed(phase, |this| this.transaction(phase, Self::delete_users))
    }

    /// Creates `developers + regular_users` users with consecutive ids.
    ///
    /// Commits every `batch_size` users. When an id keeps conflicting the open
    /// batch is rolled back and earlier batches stay committed.
    pub fn create_users(&mut self) -> Result<u64, GenerateError> {
        self.timed(Phase::CreateUsers, Self::create_users_in_batches)
    }

    /// Gives the first `developers` generated users a developer profile.
    pub fn assign_developers(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::AssignDevelopers;
        self.timed(phase, |this| this.transaction(phase, Self::insert_developers))
    }

    fn delete_users(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::ResetUsers;
        let users = self
            .store
            .bulk_delete(EntityKind::User, Filter::IdAtLeast(self.config.min_user_id))
            .in_phase(phase)?;
        let developers = self
            .store
            .bulk_delete(EntityKind::Developer, Filter::All)
            .in_phase(phase)?;

        info!("Deleted {users} users and {developers} developers");
        Ok(users + developers)
    }

    fn create_users_in_batches(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateUsers;
        let total = self.config.total_users();

        info!("Seeding {total} users...");
        self.reporter.progress_start(total);
        self.store.begin_transaction().in_phase(phase)?;

        let result = self.insert_users(total).and_then(|created| {
            self.store.commit().in_phase(phase)?;
            Ok(created)
        });
        if result.is_err() {
            self.rollback_quietly(phase);
        }
        self.reporter.progress_finish();

        let created = result?;
        info!("Seeded {created} users");
        Ok(created)
    }

    /// Expects an open transaction and leaves one open.
    fn insert_users(&mut self, total: usize) -> Result<u64, GenerateError> {
        let phase = Phase::CreateUsers;
        let batch_size = self.config.batch_size.max(1);
        let mut budget = RetryBudget::new(MAX_USER_ATTEMPTS);
        let mut created = 0usize;
        let mut in_batch = 0usize;

        while created < total {
            let id = self.config.min_user_id + created as i64;
            let user = self.user_gen.generate(id, self.corpus, self.now, &mut self.rng);
            user.validate()
                .map_err(|source| GenerateError::Invalid { phase, source })?;

            match self.store.insert(user.into()) {
                Ok(_) => {
                    budget.reset();
                    created += 1;
                    in_batch += 1;
                }
                Err(source) if source.is_conflict() => {
                    self.metrics.user_retries += 1;
                    if !budget.record_failure() {
                        return Err(GenerateError::RetriesExhausted {
                            user_id: id,
                            attempts: budget.failures(),
                            source,
                        });
                    }
                    debug!("User {id} conflicted ({source}), retrying");
                    continue;
                }
                Err(source) => return Err(GenerateError::Store { phase, source }),
            }

            if in_batch == batch_size {
                self.store.commit().in_phase(phase)?;
                self.store.begin_transaction().in_phase(phase)?;
                self.reporter.progress_advance(in_batch);
                in_batch = 0;
            }
        }

        self.reporter.progress_advance(in_batch);
        Ok(created as u64)
    }

    fn insert_developers(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::AssignDevelopers;
        let users = self
            .store
            .fetch::<User>(Filter::IdAtLeast(self.config.min_user_id))
            .in_phase(phase)?;

        let count = self.config.developers.min(users.len());
        if count < self.config.developers {
            warn!(
                "Only {} users available, assigning {count} of {} developers",
                users.len(),
                self.config.developers
            );
        }

        self.reporter.progress_start(count);
        let mut names: HashSet<String> = HashSet::with_capacity(count);

        for (_, user) in users.iter().take(count) {
            let mut developer =
                self.developer_gen
                    .generate(user.id, &user.name, self.corpus, &mut self.rng);
            // Taken names become company names until one is free.
            while names.contains(&developer.name) {
                developer.name = self.corpus.company(&mut self.rng);
            }
            names.insert(developer.name.clone());

            self.insert(phase, developer)?;
            self.reporter.progress_advance(1);
        }

        self.reporter.progress_finish();
        info!("Assigned {count} developers");
        Ok(count as u64)
    }
}
