//! Uniformly distributed instants between two bounds.

use rand::Rng;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DateError {
    #[error("Unrecognised date: {0:?}")]
    Parse(String),
    #[error("Timestamp out of range: {0}")]
    OutOfRange(i64),
}

/// One end of a date interval.
#[derive(Debug, Clone, PartialEq)]
pub enum DateBound {
    Instant(OffsetDateTime),
    /// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD` (UTC midnight).
    Text(String),
    /// Seconds since the Unix epoch.
    Epoch(i64),
}

impl DateBound {
    pub fn resolve(&self) -> Result<OffsetDateTime, DateError> {
        match self {
            DateBound::Instant(instant) => Ok(*instant),
            DateBound::Epoch(seconds) => OffsetDateTime::from_unix_timestamp(*seconds)
                .map_err(|_| DateError::OutOfRange(*seconds)),
            DateBound::Text(text) => parse_date(text),
        }
    }
}

impl From<OffsetDateTime> for DateBound {
    fn from(instant: OffsetDateTime) -> Self {
        DateBound::Instant(instant)
    }
}

impl From<i64> for DateBound {
    fn from(seconds: i64) -> Self {
        DateBound::Epoch(seconds)
    }
}

impl From<&str> for DateBound {
    fn from(text: &str) -> Self {
        DateBound::Text(text.to_string())
    }
}

impl From<String> for DateBound {
    fn from(text: String) -> Self {
        DateBound::Text(text)
    }
}

fn parse_date(text: &str) -> Result<OffsetDateTime, DateError> {
    let text = text.trim();

    if let Ok(instant) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(instant);
    }

    let date_time = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(primitive) = PrimitiveDateTime::parse(text, &date_time) {
        return Ok(primitive.assume_utc());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(text, &date_only) {
        return Ok(date.midnight().assume_utc());
    }

    Err(DateError::Parse(text.to_string()))
}

/// Returns a uniformly random instant in `[from, to]`, at whole-second resolution.
///
/// An inverted interval yields `from`.
pub fn between(
    rng: &mut impl Rng,
    from: impl Into<DateBound>,
    to: impl Into<DateBound>,
) -> Result<OffsetDateTime, DateError> {
    let from = from.into().resolve()?;
    let to = to.into().resolve()?;
    Ok(between_instants(rng, from, to))
}

/// [`between`] for already resolved instants.
pub fn between_instants(rng: &mut impl Rng, from: OffsetDateTime, to: OffsetDateTime) -> OffsetDateTime {
    if to <= from {
        return from;
    }

    let span = (to - from).whole_seconds();
    from + Duration::seconds(rng.gen_range(0..=span))
}
