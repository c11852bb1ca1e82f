//! Randomness provider used to break ties between equally ranked items

use rand::seq::SliceRandom;
use rand::thread_rng;

/// Permutes a slice of positions in place.
///
/// Object safe so the engine can hold it as `Arc<dyn TieBreaker>`; callers
/// shuffle index slices and then reorder their items with [`shuffle_items`].
pub trait TieBreaker: Send + Sync {
    fn shuffle(&self, positions: &mut [usize]);
}

/// Uniform shuffle backed by the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTieBreaker;

impl TieBreaker for RandomTieBreaker {
    fn shuffle(&self, positions: &mut [usize]) {
        positions.shuffle(&mut thread_rng());
    }
}

/// Leaves the order untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTieBreaker;

impl TieBreaker for NoopTieBreaker {
    fn shuffle(&self, _positions: &mut [usize]) {}
}

/// Reorder `items` by a permutation drawn from `tie_breaker`
pub fn shuffle_items<T>(tie_breaker: &dyn TieBreaker, items: Vec<T>) -> Vec<T> {
    if items.len() < 2 {
        return items;
    }

    let mut positions: Vec<usize> = (0..items.len()).collect();
    tie_breaker.shuffle(&mut positions);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    positions
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect()
}
