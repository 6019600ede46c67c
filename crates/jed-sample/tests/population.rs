//! Integration tests for the population commands.
//!
//! These drive [`PopulationGenerator`] end to end over the in-memory store:
//! - catalog consistency after a full run (titles, variants, images, scores)
//! - reset behaviour and the users it must leave alone
//! - review and reply timestamp windows
//! - rollback of a failing phase and escalation of persistent user conflicts
//!
//! Run with: `cargo nextest run -p jed-sample --test population`

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use catalog::{
    Category, Developer, Entity, EntityKind, Extension, ExtensionImage, Filter, Logo, LogoStore,
    MemoryStore, Record, Review, ReviewComment, Row, Score, Store, StoreError, SupplyOption, User,
    VariedDatum,
};
use jed_sample::config::RunConfig;
use jed_sample::corpus::{MediaPool, WordCorpus};
use jed_sample::generators::ReviewGenConfig;
use jed_sample::population::{GenerateError, MAX_USER_ATTEMPTS, Phase, PopulationGenerator};
use jed_sample::report::{ErrorReport, Reporter};

const NOW: OffsetDateTime = datetime!(2024-06-01 12:00 UTC);

/// Keeps everything the generator reports.
#[derive(Debug, Default)]
struct RecordingReporter {
    titles: Vec<String>,
    successes: Vec<String>,
    errors: Vec<ErrorReport>,
}

impl Reporter for RecordingReporter {
    fn title(&mut self, title: &str) {
        self.titles.push(title.to_string());
    }

    fn progress_start(&mut self, _total: usize) {}

    fn progress_advance(&mut self, _step: usize) {}

    fn progress_finish(&mut self) {}

    fn success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }

    fn error(&mut self, report: &ErrorReport) {
        self.errors.push(report.clone());
    }
}

/// Wraps a [`MemoryStore`] and injects failures.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryStore,
    /// Inserts of this kind fail with a backend error.
    fail_kind: Option<EntityKind>,
    /// User inserts conflict once the users table holds this many rows.
    user_quota: Option<usize>,
    user_attempts: u32,
    /// Commits fail and leave the transaction open.
    fail_commit: bool,
    rollbacks: u32,
}

impl Store for FlakyStore {
    fn insert(&mut self, record: Record) -> Result<i64, StoreError> {
        let kind = record.kind();
        if Some(kind) == self.fail_kind {
            return Err(StoreError::Backend(format!("{kind} table is read-only")));
        }
        if kind == EntityKind::User {
            self.user_attempts += 1;
            if let Some(quota) = self.user_quota {
                if self.inner.count(EntityKind::User) >= quota {
                    return Err(StoreError::Conflict {
                        kind,
                        key: "email".into(),
                    });
                }
            }
        }
        self.inner.insert(record)
    }

    fn bulk_delete(&mut self, kind: EntityKind, filter: Filter) -> Result<u64, StoreError> {
        self.inner.bulk_delete(kind, filter)
    }

    fn query(&self, kind: EntityKind, filter: Filter) -> Result<Vec<Row>, StoreError> {
        self.inner.query(kind, filter)
    }

    fn begin_transaction(&mut self) -> Result<(), StoreError> {
        self.inner.begin_transaction()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.fail_commit {
            return Err(StoreError::Backend("commit refused".into()));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.rollbacks += 1;
        self.inner.rollback()
    }

    fn recompute_scores(&mut self) -> Result<u64, StoreError> {
        self.inner.recompute_scores()
    }
}

impl LogoStore for FlakyStore {
    fn save_logo(&mut self, file_name: &str, logo: &Logo) -> Result<String, StoreError> {
        self.inner.save_logo(file_name, logo)
    }

    fn purge_logos(&mut self) -> Result<u64, StoreError> {
        self.inner.purge_logos()
    }
}

fn small_config() -> RunConfig {
    RunConfig {
        min_user_id: 2000,
        developers: 10,
        regular_users: 40,
        batch_size: 7,
        max_extensions_per_developer: 5,
        ..RunConfig::default()
    }
}

fn store_with_categories() -> MemoryStore {
    let mut store = MemoryStore::new();
    for title in ["Access & Security", "Calendars & Events", "Site Search"] {
        store
            .insert(
                Category {
                    title: title.into(),
                    alias: jed_sample::generators::slugify(title),
                    parent_id: None,
                }
                .into(),
            )
            .unwrap();
    }
    store
}

fn generator<'a, S>(
    store: S,
    corpus: &'a WordCorpus,
    media: &'a MediaPool,
    config: RunConfig,
) -> PopulationGenerator<'a, S, RecordingReporter, StdRng>
where
    S: Store + LogoStore,
{
    PopulationGenerator::new(
        store,
        RecordingReporter::default(),
        corpus,
        media,
        StdRng::seed_from_u64(12345),
        config,
    )
    .with_now(NOW)
}

fn store_rows<E: Entity, S: Store>(store: &S) -> Vec<(i64, E)> {
    store.fetch::<E>(Filter::All).unwrap()
}

#[test]
fn test_full_run_builds_consistent_catalog() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let mut generator = generator(store_with_categories(), &corpus, &media, small_config());

    generator.run().unwrap();
    assert_eq!(generator.reporter().successes, vec!["Done"]);
    assert!(generator.reporter().errors.is_empty());
    let store = generator.into_store();

    // Users and developers
    let users: Vec<(i64, User)> = store_rows(&store);
    assert_eq!(users.len(), 50);
    let ids: Vec<i64> = users.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, (2000..2050).collect::<Vec<_>>());

    let developers: Vec<(i64, Developer)> = store_rows(&store);
    assert_eq!(developers.len(), 10);
    let developer_ids: HashSet<i64> = developers.iter().map(|(_, d)| d.user_id).collect();
    assert_eq!(developer_ids, (2000..2010).collect::<HashSet<_>>());
    let names: HashSet<&str> = developers.iter().map(|(_, d)| d.name.as_str()).collect();
    assert_eq!(names.len(), developers.len(), "developer names must be unique");

    // Extensions
    let extensions: Vec<(i64, Extension)> = store_rows(&store);
    assert!(
        (10..=50).contains(&extensions.len()),
        "got {} extensions",
        extensions.len()
    );
    let titles: HashSet<&str> = extensions.iter().map(|(_, e)| e.title.as_str()).collect();
    assert_eq!(titles.len(), extensions.len(), "titles must be unique");
    assert_eq!(store.logo_count(), extensions.len());
    for (_, extension) in &extensions {
        assert!(developer_ids.contains(&extension.created_by));
        assert!(store.logo(&extension.logo).is_some());
        assert!(extension.created_on <= NOW - Duration::days(7));
        assert!(extension.primary_category_id.is_some());
    }

    // Every extension gets exactly one default variant, and no Paid/Cloud
    // variant without registration
    let data: Vec<(i64, VariedDatum)> = store_rows(&store);
    let by_extension: HashMap<i64, Vec<&VariedDatum>> =
        data.iter().fold(HashMap::new(), |mut acc, (_, datum)| {
            acc.entry(datum.extension_id).or_default().push(datum);
            acc
        });
    for (id, extension) in &extensions {
        let variants = &by_extension[id];
        let defaults: Vec<_> = variants.iter().filter(|d| d.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].ordering, 0);
        assert!(defaults[0].published);

        if !extension.requires_registration {
            assert_eq!(variants.len(), 1);
            assert_eq!(variants[0].supply_option, SupplyOption::Free);
        }
    }

    // Images
    let images: Vec<(i64, ExtensionImage)> = store_rows(&store);
    for (_, datum) in &data {
        let urls: Vec<&str> = images
            .iter()
            .filter(|(_, i)| i.extension_id == datum.extension_id && i.supply_option == datum.supply_option)
            .map(|(_, i)| i.url.as_str())
            .collect();
        assert!((1..=7).contains(&urls.len()));
        let distinct: HashSet<&str> = urls.iter().copied().collect();
        assert_eq!(distinct.len(), urls.len());
    }

    // One score row per variant, matching the reviews
    let reviews: Vec<(i64, Review)> = store_rows(&store);
    let scores: Vec<(i64, Score)> = store_rows(&store);
    assert_eq!(scores.len(), data.len());
    for (_, score) in &scores {
        let count = reviews
            .iter()
            .filter(|(_, r)| {
                r.published
                    && r.extension_id == score.extension_id
                    && r.supply_option == score.supply_option
            })
            .count();
        assert_eq!(score.number_of_reviews as usize, count);
        if count == 0 {
            assert_eq!(score.functionality, None);
            assert_eq!(score.value_for_money, None);
        } else {
            let mean = score.functionality.unwrap();
            assert!((0.0..=100.0).contains(&mean));
        }
    }
}

#[test]
fn test_phases_report_titles_and_metrics() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let mut generator = generator(store_with_categories(), &corpus, &media, small_config());

    generator.run().unwrap();

    let expected = [
        Phase::ResetUsers,
        Phase::CreateUsers,
        Phase::AssignDevelopers,
        Phase::Reset,
        Phase::CreateExtensions,
        Phase::CreateVariedData,
        Phase::CreateExtensionImages,
        Phase::CreateReviews,
        Phase::CreateScores,
    ];
    let titles: Vec<&str> = expected.iter().map(|p| p.title()).collect();
    assert_eq!(generator.reporter().titles, titles);

    let metrics = generator.metrics();
    let phases: Vec<Phase> = metrics.phases.iter().map(|m| m.phase).collect();
    assert_eq!(phases, expected);
    assert_eq!(metrics.rows(Phase::CreateUsers), Some(50));
    assert_eq!(metrics.rows(Phase::AssignDevelopers), Some(10));
    assert_eq!(
        metrics.rows(Phase::CreateExtensions),
        Some(generator.store().count(EntityKind::Extension) as u64)
    );
    assert_eq!(
        metrics.rows(Phase::CreateScores),
        Some(generator.store().count(EntityKind::Score) as u64)
    );
    assert_eq!(metrics.logos, generator.store().logo_count() as u64);
}

#[test]
fn test_reset_twice_leaves_empty_catalog() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let mut generator = generator(store_with_categories(), &corpus, &media, small_config());
    generator.run().unwrap();
    assert!(generator.store().count(EntityKind::Review) > 0);

    for _ in 0..2 {
        generator.reset_extensions().unwrap();
        let store = generator.store();
        for kind in [
            EntityKind::Extension,
            EntityKind::VariedDatum,
            EntityKind::ExtensionImage,
            EntityKind::Review,
            EntityKind::ReviewComment,
            EntityKind::Score,
        ] {
            assert_eq!(store.count(kind), 0, "{kind} rows left behind");
        }
        assert_eq!(store.logo_count(), 0);
        // Users and categories belong to other commands
        assert_eq!(store.count(EntityKind::User), 50);
        assert_eq!(store.count(EntityKind::Category), 3);
    }

    // The title registry is cleared with the catalog, so a rerun works
    generator.run_extensions().unwrap();
    assert!(generator.store().count(EntityKind::Extension) >= 10);
}

#[test]
fn test_user_reset_spares_low_ids() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();

    let mut store = store_with_categories();
    let admin = User {
        id: 42,
        name: "Site Admin".into(),
        username: "admin".into(),
        email: "admin@example.com".into(),
        registered_at: datetime!(2015-01-01 00:00 UTC),
        last_visit_at: datetime!(2024-05-01 00:00 UTC),
        locale: "en_GB".into(),
        timezone: "Europe/London".into(),
        blocked: false,
    };
    store.insert(admin.clone().into()).unwrap();

    let mut generator = generator(store, &corpus, &media, small_config());
    generator.run_users().unwrap();
    generator.run_users().unwrap();

    let users: Vec<(i64, User)> = store_rows(generator.store());
    assert_eq!(users.len(), 51);
    assert_eq!(users[0], (42, admin));
    assert_eq!(generator.store().count(EntityKind::Developer), 10);
}

#[test]
fn test_reviews_and_replies_honour_windows() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let mut generator = generator(store_with_categories(), &corpus, &media, small_config())
        .with_review_config(ReviewGenConfig {
            comment_chance: 100.0,
            ..ReviewGenConfig::default()
        });

    generator.run().unwrap();
    let review_comments = generator.metrics().review_comments;
    let store = generator.into_store();

    let users: HashMap<i64, User> = store_rows::<User, _>(&store).into_iter().collect();
    let developer_ids: HashSet<i64> = store_rows::<Developer, _>(&store)
        .into_iter()
        .map(|(_, d)| d.user_id)
        .collect();
    let extensions: HashMap<i64, Extension> = store_rows(&store).into_iter().collect();
    let reviews: HashMap<i64, Review> = store_rows(&store).into_iter().collect();
    let comments: Vec<(i64, ReviewComment)> = store_rows(&store);
    assert!(!reviews.is_empty());

    let mut reviewed: HashSet<(i64, SupplyOption, i64)> = HashSet::new();
    for review in reviews.values() {
        let extension = &extensions[&review.extension_id];
        let reviewer = &users[&review.created_by];

        assert!(!developer_ids.contains(&review.created_by), "developers do not review");
        assert!(review.created_on >= extension.created_on);
        assert!(review.created_on >= reviewer.registered_at);
        assert!(review.created_on <= NOW);
        assert!(!review.version.is_empty());
        assert!(
            reviewed.insert((review.extension_id, review.supply_option, review.created_by)),
            "reviewer {} reviewed {}/{} twice",
            review.created_by,
            review.extension_id,
            review.supply_option.as_str()
        );
    }

    // Every review got exactly one reply from the extension's developer
    assert_eq!(comments.len(), reviews.len());
    assert_eq!(review_comments, comments.len() as u64);
    let replied: HashSet<i64> = comments.iter().map(|(_, c)| c.review_id).collect();
    assert_eq!(replied.len(), comments.len());

    for (_, comment) in &comments {
        let review = &reviews[&comment.review_id];
        let extension = &extensions[&review.extension_id];
        assert_eq!(comment.created_by, extension.created_by);
        assert!(comment.created_on >= review.created_on);
        assert!(comment.created_on <= review.created_on + Duration::hours(2) + Duration::days(14));
        assert!(comment.created_on <= NOW);
    }
}

#[test]
fn test_review_count_capped_by_reviewers() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let config = RunConfig {
        regular_users: 3,
        ..small_config()
    };
    let mut generator = generator(store_with_categories(), &corpus, &media, config)
        .with_review_config(ReviewGenConfig {
            light_share: 0.0,
            ..ReviewGenConfig::default()
        });

    generator.run().unwrap();
    let store = generator.into_store();

    let scores: Vec<(i64, Score)> = store_rows(&store);
    assert!(!scores.is_empty());
    for (_, score) in &scores {
        assert_eq!(score.number_of_reviews, 3);
    }
}

#[test]
fn test_same_seed_same_dataset() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();

    let dump = || {
        let mut generator = generator(store_with_categories(), &corpus, &media, small_config());
        generator.run().unwrap();
        let mut bytes = Vec::new();
        generator.into_store().to_writer(&mut bytes).unwrap();
        bytes
    };

    assert_eq!(dump(), dump());
}

#[test]
fn test_failing_phase_is_rolled_back() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let store = FlakyStore {
        inner: store_with_categories(),
        fail_kind: Some(EntityKind::ExtensionImage),
        ..FlakyStore::default()
    };
    let mut generator = generator(store, &corpus, &media, small_config());

    let err = generator.run().unwrap_err();
    assert_eq!(err.phase(), Phase::CreateExtensionImages);
    assert!(matches!(
        err,
        GenerateError::Store {
            phase: Phase::CreateExtensionImages,
            source: StoreError::Backend(_),
        }
    ));

    let reporter = generator.reporter();
    assert!(reporter.successes.is_empty());
    assert_eq!(reporter.errors.len(), 1);
    assert_eq!(
        reporter.errors[0].location.as_deref(),
        Some("create_extension_images")
    );
    assert_eq!(
        reporter.titles.last().map(String::as_str),
        Some(Phase::CreateExtensionImages.title())
    );

    let store = generator.into_store().inner;
    assert!(!store.in_transaction());
    assert_eq!(store.count(EntityKind::ExtensionImage), 0);
    assert_eq!(store.count(EntityKind::Review), 0);
    // Earlier phases were committed
    assert!(store.count(EntityKind::Extension) >= 10);
    assert!(store.count(EntityKind::VariedDatum) >= 10);
}

#[test]
fn test_persistent_user_conflict_escalates() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let store = FlakyStore {
        user_quota: Some(0),
        ..FlakyStore::default()
    };
    let mut generator = generator(store, &corpus, &media, small_config());

    let err = generator.run_users().unwrap_err();
    match &err {
        GenerateError::RetriesExhausted {
            user_id, attempts, ..
        } => {
            assert_eq!(*user_id, 2000);
            assert_eq!(*attempts, MAX_USER_ATTEMPTS);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.phase(), Phase::CreateUsers);
    assert_eq!(generator.metrics().user_retries, u64::from(MAX_USER_ATTEMPTS));
    assert!(generator.reporter().errors[0].causes.iter().any(|c| c.contains("already exists")));

    let store = generator.into_store();
    assert_eq!(store.user_attempts, MAX_USER_ATTEMPTS);
    assert_eq!(store.inner.count(EntityKind::User), 0);
    assert!(!store.inner.in_transaction());
}

#[test]
fn test_conflict_keeps_committed_batches() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let store = FlakyStore {
        user_quota: Some(17),
        ..FlakyStore::default()
    };
    let mut generator = generator(store, &corpus, &media, small_config());

    let err = generator.create_users().unwrap_err();
    assert!(matches!(err, GenerateError::RetriesExhausted { user_id: 2017, .. }));

    // Batches of 7: two committed, the third rolled back
    let store = generator.into_store();
    assert_eq!(store.inner.count(EntityKind::User), 14);
}

#[test]
fn test_failed_commit_is_rolled_back() {
    let corpus = WordCorpus::builtin().unwrap();
    let media = MediaPool::builtin().unwrap();
    let store = FlakyStore {
        inner: store_with_categories(),
        fail_commit: true,
        ..FlakyStore::default()
    };
    let mut generator = generator(store, &corpus, &media, small_config());

    let err = generator.reset_extensions().unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Store {
            phase: Phase::Reset,
            source: StoreError::Backend(_),
        }
    ));
    assert_eq!(generator.store().rollbacks, 1);
    assert!(!generator.store().inner.in_transaction());

    // The first batch commit fails while creating users
    let err = generator.create_users().unwrap_err();
    assert_eq!(err.phase(), Phase::CreateUsers);
    let store = generator.into_store();
    assert_eq!(store.rollbacks, 2);
    assert!(!store.inner.in_transaction());
    assert_eq!(store.inner.count(EntityKind::User), 0);
}
