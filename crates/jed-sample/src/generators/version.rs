//! Semantic-looking version strings.

use rand::Rng;

use crate::sampling::biased_accept;

/// Upper bound used for freshly created extensions.
pub const DEFAULT_MAX_VERSION: &str = "10.9.23";

/// Generates `major.minor.patch`, each part bounded by the matching part of `max`.
///
/// A bound such as `"3.2.1-p4"` also allows a `-pN` suffix (N in 1..=4) one time
/// in ten. Missing or unparseable parts fall back to the default bound.
pub fn random_version(rng: &mut impl Rng, max: &str) -> String {
    let (base, suffix) = match max.split_once('-') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (max, None),
    };

    let mut parts = base.split('.').map(|p| p.trim().parse::<u32>().ok());
    let major = parts.next().flatten().filter(|m| *m > 0).unwrap_or(10);
    let minor = parts.next().flatten().unwrap_or(9);
    let patch = parts.next().flatten().unwrap_or(23);

    let mut version = format!(
        "{}.{}.{}",
        rng.gen_range(1..=major),
        rng.gen_range(0..=minor),
        rng.gen_range(0..=patch)
    );

    if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
        if biased_accept(rng, 10.0) {
            let max_patch = suffix
                .trim_start_matches('p')
                .parse::<u32>()
                .ok()
                .filter(|p| *p > 0)
                .unwrap_or(5);
            version.push_str(&format!("-p{}", rng.gen_range(1..=max_patch)));
        }
    }

    version
}
