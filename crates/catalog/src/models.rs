use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::ValidationError;

/// The tables the persistence port knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    User,
    Developer,
    Extension,
    VariedDatum,
    ExtensionImage,
    Review,
    ReviewComment,
    Score,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::User => "user",
            EntityKind::Developer => "developer",
            EntityKind::Extension => "extension",
            EntityKind::VariedDatum => "varied_datum",
            EntityKind::ExtensionImage => "extension_image",
            EntityKind::Review => "review",
            EntityKind::ReviewComment => "review_comment",
            EntityKind::Score => "score",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution channel under which an extension can be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyOption {
    Free,
    Paid,
    Cloud,
}

impl SupplyOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyOption::Free => "free",
            SupplyOption::Paid => "paid",
            SupplyOption::Cloud => "cloud",
        }
    }
}

/// CMS platform release line an extension declares support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlatformVersion {
    #[serde(rename = "30")]
    Joomla3,
    #[serde(rename = "40")]
    Joomla4,
    #[serde(rename = "51")]
    Joomla5,
}

impl PlatformVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformVersion::Joomla3 => "30",
            PlatformVersion::Joomla4 => "40",
            PlatformVersion::Joomla5 => "51",
        }
    }
}

/// Kind of installable package bundled by an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExtensionType {
    #[serde(rename = "com")]
    Component,
    #[serde(rename = "mod")]
    Module,
    #[serde(rename = "plugin")]
    Plugin,
}

impl ExtensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionType::Component => "com",
            ExtensionType::Module => "mod",
            ExtensionType::Plugin => "plugin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum License {
    #[serde(rename = "GPLv2 or later")]
    GplV2OrLater,
    #[serde(rename = "AGPL")]
    Agpl,
    #[serde(rename = "LGPL")]
    Lgpl,
}

impl License {
    /// Ordered from most to least common.
    pub const ALL: [License; 3] = [License::GplV2OrLater, License::Agpl, License::Lgpl];

    pub fn as_str(&self) -> &'static str {
        match self {
            License::GplV2OrLater => "GPLv2 or later",
            License::Agpl => "AGPL",
            License::Lgpl => "LGPL",
        }
    }
}

/// How the download button of a varied datum behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadIntegration {
    None,
    FreeDirect,
    FreeWithRegistration,
    PaidPurchase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub alias: String,
    pub parent_id: Option<i64>,
}

/// A site user. Unlike the other entities the id is chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_visit_at: OffsetDateTime,
    pub locale: String,
    /// IANA zone name, e.g. `Europe/Athens`.
    pub timezone: String,
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Developer {
    pub user_id: i64,
    pub name: String,
    pub suspicious: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub title: String,
    pub alias: String,
    pub platforms: Vec<PlatformVersion>,
    pub includes: Vec<ExtensionType>,
    pub license: License,
    pub popular: bool,
    pub requires_registration: bool,
    pub uses_updater: bool,
    pub can_update: bool,
    pub checked: bool,
    pub uses_third_party: bool,
    pub version: String,
    pub video: String,
    pub second_contact_email: String,
    pub approved: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub approved_at: Option<OffsetDateTime>,
    pub primary_category_id: Option<i64>,
    pub logo: String,
    pub created_by: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
}

/// Per supply option data of an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariedDatum {
    pub extension_id: i64,
    pub supply_option: SupplyOption,
    pub intro_text: String,
    pub description: String,
    pub homepage_link: String,
    pub download_link: String,
    pub demo_link: Option<String>,
    pub support_link: Option<String>,
    pub documentation_link: Option<String>,
    pub translation_link: Option<String>,
    pub license_link: String,
    pub update_url: Option<String>,
    pub download_integration: DownloadIntegration,
    pub download_integration_url: Option<String>,
    pub tags: Vec<String>,
    pub logo: String,
    pub is_default: bool,
    pub ordering: u32,
    pub published: bool,
    pub created_by: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionImage {
    pub extension_id: i64,
    pub supply_option: SupplyOption,
    pub url: String,
    pub ordering: u32,
    pub created_by: i64,
}

/// The five rated aspects of a review, each in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub functionality: u8,
    pub ease_of_use: u8,
    pub support: u8,
    pub documentation: u8,
    pub value_for_money: u8,
}

impl SubScores {
    pub fn as_array(&self) -> [u8; 5] {
        [
            self.functionality,
            self.ease_of_use,
            self.support,
            self.documentation,
            self.value_for_money,
        ]
    }

    /// Arithmetic mean of the five sub-scores.
    pub fn mean(&self) -> f64 {
        self.as_array().iter().map(|&s| f64::from(s)).sum::<f64>() / 5.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComments {
    pub functionality: String,
    pub ease_of_use: String,
    pub support: String,
    pub documentation: String,
    pub value_for_money: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub extension_id: i64,
    pub supply_option: SupplyOption,
    pub title: String,
    pub alias: String,
    pub body: String,
    pub scores: SubScores,
    pub score_comments: ScoreComments,
    pub overall: f64,
    pub used_for: String,
    pub version: String,
    pub flagged: bool,
    pub ip_address: String,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    pub created_by: i64,
    pub ordering: u32,
}

/// Developer reply to a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub review_id: i64,
    pub body: String,
    pub ip_address: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    pub created_by: i64,
    pub ordering: u32,
    pub published: bool,
}

/// Aggregate of all published reviews of one (extension, supply option) pair.
///
/// Pairs without reviews carry `None` means and a zero count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub extension_id: i64,
    pub supply_option: SupplyOption,
    pub functionality: Option<f64>,
    pub ease_of_use: Option<f64>,
    pub support: Option<f64>,
    pub documentation: Option<f64>,
    pub value_for_money: Option<f64>,
    pub number_of_reviews: u32,
}

impl Score {
    /// Placeholder for a pair nobody reviewed.
    pub fn empty(extension_id: i64, supply_option: SupplyOption) -> Self {
        Self {
            extension_id,
            supply_option,
            functionality: None,
            ease_of_use: None,
            support: None,
            documentation: None,
            value_for_money: None,
            number_of_reviews: 0,
        }
    }

    /// Averages the given reviews. Returns the empty placeholder for an empty slice.
    pub fn from_reviews(extension_id: i64, supply_option: SupplyOption, reviews: &[&Review]) -> Self {
        if reviews.is_empty() {
            return Self::empty(extension_id, supply_option);
        }

        let count = reviews.len() as f64;
        let avg = |pick: fn(&SubScores) -> u8| {
            Some(reviews.iter().map(|r| f64::from(pick(&r.scores))).sum::<f64>() / count)
        };

        Self {
            extension_id,
            supply_option,
            functionality: avg(|s| s.functionality),
            ease_of_use: avg(|s| s.ease_of_use),
            support: avg(|s| s.support),
            documentation: avg(|s| s.documentation),
            value_for_money: avg(|s| s.value_for_money),
            number_of_reviews: reviews.len() as u32,
        }
    }

    fn means(&self) -> [Option<f64>; 5] {
        [
            self.functionality,
            self.ease_of_use,
            self.support,
            self.documentation,
            self.value_for_money,
        ]
    }
}

/// 5x5 identicon used as an extension logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
    /// Row-major cells; `true` cells use the primary colour.
    pub cells: [[bool; 5]; 5],
    /// `#rrggbb`
    pub primary: String,
    /// `#rrggbb`
    pub secondary: String,
}

/// Checks a record before it is handed to a store.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require(kind: EntityKind, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { kind, field })
    } else {
        Ok(())
    }
}

impl Validate for Category {
    fn validate(&self) -> Result<(), ValidationError> {
        require(EntityKind::Category, "title", &self.title)?;
        require(EntityKind::Category, "alias", &self.alias)
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::User;
        if self.id <= 0 {
            return Err(ValidationError::OutOfRange {
                kind,
                field: "id",
                value: self.id as f64,
            });
        }
        require(kind, "name", &self.name)?;
        require(kind, "username", &self.username)?;
        require(kind, "email", &self.email)?;
        require(kind, "timezone", &self.timezone)?;
        if !self.email.contains('@') {
            return Err(ValidationError::Inconsistent {
                kind,
                detail: "email has no domain part",
            });
        }
        if self.last_visit_at < self.registered_at {
            return Err(ValidationError::Chronology {
                kind,
                field: "last_visit_at",
                other: "registered_at",
            });
        }
        Ok(())
    }
}

impl Validate for Developer {
    fn validate(&self) -> Result<(), ValidationError> {
        require(EntityKind::Developer, "name", &self.name)
    }
}

impl Validate for Extension {
    fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Extension;
        require(kind, "title", &self.title)?;
        require(kind, "alias", &self.alias)?;
        require(kind, "logo", &self.logo)?;
        if self.platforms.is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                field: "platforms",
            });
        }
        if self.includes.is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                field: "includes",
            });
        }
        match (self.approved, self.approved_at) {
            (true, Some(at)) if at < self.created_on => Err(ValidationError::Chronology {
                kind,
                field: "approved_at",
                other: "created_on",
            }),
            (true, None) | (false, Some(_)) => Err(ValidationError::Inconsistent {
                kind,
                detail: "approval timestamp must be present exactly when approved",
            }),
            _ => Ok(()),
        }
    }
}

impl Validate for VariedDatum {
    fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::VariedDatum;
        require(kind, "homepage_link", &self.homepage_link)?;
        require(kind, "download_link", &self.download_link)?;
        if self.is_default != (self.ordering == 0) {
            return Err(ValidationError::Inconsistent {
                kind,
                detail: "only the first supply option is the default one",
            });
        }
        if self.is_default && !self.published {
            return Err(ValidationError::Inconsistent {
                kind,
                detail: "the default supply option must be published",
            });
        }
        Ok(())
    }
}

impl Validate for ExtensionImage {
    fn validate(&self) -> Result<(), ValidationError> {
        require(EntityKind::ExtensionImage, "url", &self.url)
    }
}

impl Validate for Review {
    fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Review;
        require(kind, "title", &self.title)?;
        for (field, value) in [
            ("functionality", self.scores.functionality),
            ("ease_of_use", self.scores.ease_of_use),
            ("support", self.scores.support),
            ("documentation", self.scores.documentation),
            ("value_for_money", self.scores.value_for_money),
        ] {
            if value > 100 {
                return Err(ValidationError::OutOfRange {
                    kind,
                    field,
                    value: f64::from(value),
                });
            }
        }
        let expected = self.scores.mean();
        if (self.overall - expected).abs() > 1e-9 {
            return Err(ValidationError::OverallMismatch {
                overall: self.overall,
                expected,
            });
        }
        Ok(())
    }
}

impl Validate for ReviewComment {
    fn validate(&self) -> Result<(), ValidationError> {
        require(EntityKind::ReviewComment, "body", &self.body)
    }
}

impl Validate for Score {
    fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Score;
        let means = self.means();
        if self.number_of_reviews == 0 {
            if means.iter().any(Option::is_some) {
                return Err(ValidationError::Inconsistent {
                    kind,
                    detail: "a score without reviews has no means",
                });
            }
            return Ok(());
        }
        for mean in means {
            match mean {
                None => {
                    return Err(ValidationError::Inconsistent {
                        kind,
                        detail: "a score with reviews has all five means",
                    });
                }
                Some(value) if !(0.0..=100.0).contains(&value) => {
                    return Err(ValidationError::OutOfRange {
                        kind,
                        field: "mean",
                        value,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Any storable row, tagged with its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Category(Category),
    User(User),
    Developer(Developer),
    Extension(Extension),
    VariedDatum(VariedDatum),
    ExtensionImage(ExtensionImage),
    Review(Review),
    ReviewComment(ReviewComment),
    Score(Score),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Category(_) => EntityKind::Category,
            Record::User(_) => EntityKind::User,
            Record::Developer(_) => EntityKind::Developer,
            Record::Extension(_) => EntityKind::Extension,
            Record::VariedDatum(_) => EntityKind::VariedDatum,
            Record::ExtensionImage(_) => EntityKind::ExtensionImage,
            Record::Review(_) => EntityKind::Review,
            Record::ReviewComment(_) => EntityKind::ReviewComment,
            Record::Score(_) => EntityKind::Score,
        }
    }
}

/// A typed entity stored under a single [`EntityKind`].
pub trait Entity: Sized + Into<Record> {
    const KIND: EntityKind;

    /// Unwraps the matching [`Record`] variant.
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! entity {
    ($ty:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Record {
            fn from(inner: $ty) -> Self {
                Record::$ty(inner)
            }
        }
    };
}

entity!(Category);
entity!(User);
entity!(Developer);
entity!(Extension);
entity!(VariedDatum);
entity!(ExtensionImage);
entity!(Review);
entity!(ReviewComment);
entity!(Score);

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn make_review(scores: SubScores) -> Review {
        Review {
            extension_id: 1,
            supply_option: SupplyOption::Free,
            title: "Does the job".into(),
            alias: "does-the-job".into(),
            body: "Body".into(),
            scores,
            score_comments: ScoreComments {
                functionality: String::new(),
                ease_of_use: String::new(),
                support: String::new(),
                documentation: String::new(),
                value_for_money: String::new(),
            },
            overall: scores.mean(),
            used_for: String::new(),
            version: "1.0.0".into(),
            flagged: false,
            ip_address: "10.0.0.1".into(),
            published: true,
            created_on: datetime!(2024-01-01 00:00 UTC),
            created_by: 2001,
            ordering: 0,
        }
    }

    #[test]
    fn test_sub_score_mean() {
        let scores = SubScores {
            functionality: 100,
            ease_of_use: 80,
            support: 60,
            documentation: 40,
            value_for_money: 20,
        };
        assert_eq!(scores.mean(), 60.0);
        assert!(make_review(scores).validate().is_ok());
    }

    #[test]
    fn test_review_overall_must_match_mean() {
        let scores = SubScores {
            functionality: 10,
            ease_of_use: 10,
            support: 10,
            documentation: 10,
            value_for_money: 10,
        };
        let mut review = make_review(scores);
        review.overall = 50.0;
        assert!(matches!(
            review.validate(),
            Err(ValidationError::OverallMismatch { .. })
        ));
    }

    #[test]
    fn test_score_from_reviews() {
        let a = make_review(SubScores {
            functionality: 100,
            ease_of_use: 50,
            support: 0,
            documentation: 20,
            value_for_money: 70,
        });
        let b = make_review(SubScores {
            functionality: 50,
            ease_of_use: 50,
            support: 100,
            documentation: 40,
            value_for_money: 30,
        });

        let score = Score::from_reviews(1, SupplyOption::Free, &[&a, &b]);
        assert_eq!(score.number_of_reviews, 2);
        assert_eq!(score.functionality, Some(75.0));
        assert_eq!(score.support, Some(50.0));
        assert_eq!(score.value_for_money, Some(50.0));
        assert!(score.validate().is_ok());

        let empty = Score::from_reviews(1, SupplyOption::Paid, &[]);
        assert_eq!(empty, Score::empty(1, SupplyOption::Paid));
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_varied_datum_default_flag() {
        let mut datum = VariedDatum {
            extension_id: 1,
            supply_option: SupplyOption::Paid,
            intro_text: "Intro".into(),
            description: "Description".into(),
            homepage_link: "https://example.com".into(),
            download_link: "https://example.com/download".into(),
            demo_link: None,
            support_link: None,
            documentation_link: None,
            translation_link: None,
            license_link: "https://example.com/license".into(),
            update_url: None,
            download_integration: DownloadIntegration::None,
            download_integration_url: None,
            tags: Vec::new(),
            logo: "/images/jed_logos/a.png".into(),
            is_default: true,
            ordering: 1,
            published: true,
            created_by: 2001,
        };
        assert!(datum.validate().is_err());

        datum.ordering = 0;
        assert!(datum.validate().is_ok());
    }

    #[test]
    fn test_record_round_trips_through_entity() {
        let developer = Developer {
            user_id: 2001,
            name: "Brave Otter Ltd".into(),
            suspicious: false,
        };
        let record: Record = developer.clone().into();
        assert_eq!(record.kind(), EntityKind::Developer);
        assert_eq!(Developer::from_record(record.clone()), Some(developer));
        assert_eq!(User::from_record(record), None);
    }
}
