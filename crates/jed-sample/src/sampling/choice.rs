//! Independent weighted inclusion of items.

use rand::Rng;

use super::bias::biased_accept;

/// Keeps each item independently with its own percentage chance.
///
/// Input order is preserved. When nothing is kept the result is `[default]`, so
/// the returned list is never empty.
pub fn select<T: Clone>(rng: &mut impl Rng, items: &[(T, f64)], default: T) -> Vec<T> {
    let selected: Vec<T> = items
        .iter()
        .filter(|(_, percent)| biased_accept(rng, *percent))
        .map(|(item, _)| item.clone())
        .collect();

    if selected.is_empty() {
        vec![default]
    } else {
        selected
    }
}
