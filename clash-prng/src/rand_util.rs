use std::mem;

use crate::PseudoRandomNumberGenerator;

/// Returns whether an event with probability `numerator / denominator` occurs.
///
/// A chance at or above one always occurs.
pub fn chance(
    prng: &mut dyn PseudoRandomNumberGenerator,
    numerator: u64,
    denominator: u64,
) -> bool {
    prng.next().rem_euclid(denominator) < numerator
}

/// Returns a random integer in the range `[min, max)`.
pub fn range(prng: &mut dyn PseudoRandomNumberGenerator, min: u64, max: u64) -> u64 {
    prng.next().rem_euclid(max - min) + min
}

/// Returns a random element from the given slice.
pub fn sample_slice<'a, T>(
    prng: &mut dyn PseudoRandomNumberGenerator,
    slice: &'a [T],
) -> Option<&'a T> {
    if slice.len() <= 1 {
        return slice.first();
    }
    let index = range(prng, 0, slice.len() as u64);
    slice.get(index as usize)
}

/// Fisher-Yates shuffle.
pub fn shuffle<T>(prng: &mut dyn PseudoRandomNumberGenerator, items: &mut [T]) {
    let end = items.len() as u64;
    if end < 2 {
        return;
    }
    let mut start = 0;
    while start < end - 1 {
        let next = range(prng, start, end);
        if start != next {
            let (head, tail) = items.split_at_mut(next as usize);
            mem::swap(&mut head[start as usize], &mut tail[0]);
        }
        start += 1;
    }
}
