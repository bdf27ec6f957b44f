use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform integer in `[min(from, to), max(from, to)]`, both ends included.
pub fn random_integer<R: Rng + ?Sized>(rng: &mut R, from: i64, to: i64) -> i64 {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    rng.gen_range(lo..=hi)
}

/// Pick one element with equal probability. `None` only for an empty slice.
pub fn pick_uniform<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}
