//! Extension command phases up to and including images.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use catalog::{Category, EntityKind, Extension, ExtensionImage, Filter, LogoStore, Store, VariedDatum};

use super::error::InPhase;
use super::{GenerateError, Phase, PopulationGenerator, identity};
use crate::generators::ExtensionDraft;
use crate::report::Reporter;
use crate::sampling::{Bias, biased_int};

/// Each supply option gets between one and this many images.
pub const MAX_IMAGES_PER_OPTION: usize = 7;

/// Tables cleared by the extension reset, dependants first.
const CATALOG_TABLES: [EntityKind; 6] = [
    EntityKind::ExtensionImage,
    EntityKind::Score,
    EntityKind::ReviewComment,
    EntityKind::Review,
    EntityKind::VariedDatum,
    EntityKind::Extension,
];

impl<S, P, R> PopulationGenerator<'_, S, P, R>
where
    S: Store + LogoStore,
    P: Reporter,
    R: Rng,
{
    /// Deletes every extension and everything hanging off it, including logos.
    pub fn reset_extensions(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::Reset;
        self.timed(phase, |this| this.transaction(phase, Self::delete_extensions))
    }

    /// Creates one to `max_extensions_per_developer` extensions per developer,
    /// leaning towards fewer.
    pub fn create_extensions(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateExtensions;
        self.timed(phase, |this| this.transaction(phase, Self::insert_extensions))
    }

    /// Creates the supply option data of every extension.
    pub fn create_varied_data(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateVariedData;
        self.timed(phase, |this| this.transaction(phase, Self::insert_varied_data))
    }

    /// Attaches distinct photos to every supply option.
    pub fn create_extension_images(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateExtensionImages;
        self.timed(phase, |this| this.transaction(phase, Self::insert_images))
    }

    fn delete_extensions(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::Reset;
        let mut removed = 0;

        for kind in CATALOG_TABLES {
            let rows = self.store.bulk_delete(kind, Filter::All).in_phase(phase)?;
            debug!("Deleted {rows} {kind} rows");
            removed += rows;
        }

        let logos = self.store.purge_logos().in_phase(phase)?;
        self.titles.clear();

        info!("Deleted {removed} catalog rows and {logos} logos");
        Ok(removed)
    }

    fn insert_extensions(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateExtensions;

        let categories: Vec<i64> = self
            .store
            .fetch::<Category>(Filter::All)
            .in_phase(phase)?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        if categories.is_empty() {
            warn!("No categories found, extensions get no primary category");
        }

        let developers = identity::developers(&self.store).in_phase(phase)?;
        let max_per_developer = self.config.max_extensions_per_developer.max(1);

        info!("Seeding extensions for {} developers...", developers.len());
        self.reporter.progress_start(developers.len());
        let mut created = 0u64;

        for developer in &developers {
            let count = biased_int(&mut self.rng, 1, max_per_developer, Bias::LinearLow);

            for _ in 0..count {
                let title = self.titles.claim(self.corpus, &mut self.rng);

                let logo = self.logo_gen.generate(&mut self.rng);
                let file_name = self.logo_gen.file_name(&mut self.rng);
                let logo_path = self.store.save_logo(&file_name, &logo).in_phase(phase)?;
                self.metrics.logos += 1;

                let draft = ExtensionDraft {
                    developer_id: developer.id,
                    developer_registered_at: developer.registered_at,
                    title,
                    category_id: categories.choose(&mut self.rng).copied(),
                    logo: logo_path,
                };
                let extension = self
                    .extension_gen
                    .generate(draft, self.media, self.now, &mut self.rng);

                self.insert(phase, extension)?;
                created += 1;
            }

            self.reporter.progress_advance(1);
        }

        self.reporter.progress_finish();
        info!("Seeded {created} extensions");
        Ok(created)
    }

    fn insert_varied_data(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateVariedData;
        let extensions = self.store.fetch::<Extension>(Filter::All).in_phase(phase)?;

        self.reporter.progress_start(extensions.len());
        let mut created = 0u64;

        for (extension_id, extension) in &extensions {
            let options = self
                .varied_gen
                .supply_options(extension.requires_registration, &mut self.rng);

            for (ordering, option) in options.into_iter().enumerate() {
                let datum = self.varied_gen.generate(
                    *extension_id,
                    extension,
                    option,
                    ordering as u32,
                    self.corpus,
                    &mut self.rng,
                );
                self.insert(phase, datum)?;
                created += 1;
            }

            self.reporter.progress_advance(1);
        }

        self.reporter.progress_finish();
        info!("Seeded {created} varied data rows");
        Ok(created)
    }

    fn insert_images(&mut self) -> Result<u64, GenerateError> {
        let phase = Phase::CreateExtensionImages;
        let data = self.store.fetch::<VariedDatum>(Filter::All).in_phase(phase)?;

        self.reporter.progress_start(data.len());
        let mut created = 0u64;

        for (_, datum) in &data {
            let wanted = self.rng.gen_range(1..=MAX_IMAGES_PER_OPTION);
            let photos = self.media.photos(&mut self.rng, wanted);

            for (ordering, url) in photos.into_iter().enumerate() {
                let image = ExtensionImage {
                    extension_id: datum.extension_id,
                    supply_option: datum.supply_option,
                    url,
                    ordering: ordering as u32,
                    created_by: datum.created_by,
                };
                self.insert(phase, image)?;
                created += 1;
            }

            self.reporter.progress_advance(1);
        }

        self.reporter.progress_finish();
        info!("Seeded {created} extension images");
        Ok(created)
    }
}
