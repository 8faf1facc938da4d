//! Shuffle helpers for playlist randomization
//!
//! Fisher-Yates over the tail of a slice. Entries before the start
//! position are never moved, so the item that is playing (and the one
//! queued after it) can be protected from relocation.

use rand::seq::SliceRandom;
use rand::thread_rng;
use rand::Rng;

/// Shuffle `items[from..]` in place with the thread-local RNG
///
/// Returns `false` (and leaves the slice untouched) when `from` is past
/// the end.
pub fn shuffle_tail<T>(items: &mut [T], from: usize) -> bool {
    let mut rng = thread_rng();
    shuffle_tail_with(items, from, &mut rng)
}

/// Shuffle `items[from..]` in place with a caller-provided RNG
pub fn shuffle_tail_with<T, R: Rng + ?Sized>(items: &mut [T], from: usize, rng: &mut R) -> bool {
    if from >= items.len() {
        return false;
    }

    items[from..].shuffle(rng);
    true
}
