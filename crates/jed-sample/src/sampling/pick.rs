use rand::Rng;
use rand::seq::SliceRandom;

/// Picks `count` distinct elements from `pool`.
///
/// Asking for the whole pool (or more) returns it unchanged, in order. Smaller
/// requests draw uniformly and reject repeats, so the pool is expected to hold
/// distinct values and to be much larger than `count`.
pub fn pick_distinct<T: Clone + PartialEq>(rng: &mut impl Rng, pool: &[T], count: usize) -> Vec<T> {
    if count == 0 || pool.is_empty() {
        return Vec::new();
    }
    if count >= pool.len() {
        return pool.to_vec();
    }

    let mut picked: Vec<T> = Vec::with_capacity(count);
    while picked.len() < count {
        if let Some(item) = pool.choose(rng) {
            if !picked.contains(item) {
                picked.push(item.clone());
            }
        }
    }
    picked
}
