//! Reviews, review comments, and score aggregates.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::{info, warn};

use catalog::{Extension, Filter, LogoStore, Score, Store, SupplyOption, VariedDatum};

use super::error::InPhase;
use super::{GenerateError, Phase, PopulationGenerator, identity};
use crate::generators::ReviewTarget;
use crate::report::Reporter;
use crate::sampling::between_instants;

impl<S, P, R> PopulationGenerator<'_, S, P, R>
where
    S: Store + LogoStore,
    P: Reporter,
    R: Rng,
{
    /// Reviews every supply option, with the occasional developer reply.
    ///
    /// A user reviews a given supply option at most once, so an option never
    /// gets more reviews than there are regular users.
    pub fn create_reviews(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateReviews;
        self.timed(phase, |this| this.transaction(phase, Self::insert_reviews))
    }

    /// Recomputes every score aggregate, then adds empty ones for unreviewed options.
    pub fn create_scores(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateScores;
        self.timed(phase, |this| this.transaction(phase, Self::insert_scores))
    }

    fn insert_reviews(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateReviews;

        let extensions: HashMap<i64, Extension> = self
            .store
            .fetch::<Extension>(Filter::All)
            .in_phase(phase)?
            .into_iter()
            .collect();
        let data = self.store.fetch::<VariedDatum>(Filter::All).in_phase(phase)?;
        let reviewers = identity::regular_users(&self.store).in_phase(phase)?;
        if reviewers.is_empty() {
            warn!("No regular users found, no reviews will be written");
        }

        self.reporter.progress_start(data.len());
        let mut reviews = 0u64;
        let mut comments = 0u64;

        for (_, datum) in &data {
            let Some(extension) = extensions.get(&datum.extension_id) else {
                warn!("Varied data references missing extension {}", datum.extension_id);
                continue;
            };

            let count = self.review_gen.review_count(&mut self.rng).min(reviewers.len());
            let mut reviewed_by: HashSet<i64> = HashSet::with_capacity(count);

            for ordering in 0..count {
                let reviewer = loop {
                    let candidate = &reviewers[self.rng.gen_range(0..reviewers.len())];
                    if reviewed_by.insert(candidate.id) {
                        break candidate;
                    }
                };

                let earliest = extension.created_on.max(reviewer.registered_at);
                let created_on = between_instants(&mut self.rng, earliest, self.now);

                let target = ReviewTarget {
                    extension_id: datum.extension_id,
                    supply_option: datum.supply_option,
                    extension_version: &extension.version,
                    reviewer_id: reviewer.id,
                    created_on,
                    ordering: ordering as u32,
                };
                let review = self.review_gen.generate(target, &mut self.rng);
                let review_id = self.insert(phase, review)?;
                reviews += 1;

                if self.review_gen.should_comment(&mut self.rng) {
                    let comment = self.review_gen.comment(
                        review_id,
                        created_on,
                        extension.created_by,
                        self.now,
                        &mut self.rng,
                    );
                    self.insert(phase, comment)?;
                    comments += 1;
                }
            }

            self.reporter.progress_advance(1);
        }

        self.reporter.progress_finish();
        self.metrics.review_comments += comments;
        info!("Seeded {reviews} reviews and {comments} review comments");
        Ok(reviews)
    }

    fn insert_scores(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateScores;

        let aggregated = self.store.recompute_scores().in_phase(phase)?;
        let scored: HashSet<(i64, SupplyOption)> = self
            .store
            .fetch::<Score>(Filter::All)
            .in_phase(phase)?
            .into_iter()
            .map(|(_, score)| (score.extension_id, score.supply_option))
            .collect();

        let data = self.store.fetch::<VariedDatum>(Filter::All).in_phase(phase)?;
        let mut placeholders = 0u64;
        for (_, datum) in &data {
            if scored.contains(&(datum.extension_id, datum.supply_option)) {
                continue;
            }
            self.insert(phase, Score::empty(datum.extension_id, datum.supply_option))?;
            placeholders += 1;
        }

        info!("Seeded {aggregated} scores and {placeholders} empty scores");
        Ok(aggregated + placeholders)
    }
}
