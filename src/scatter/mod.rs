//! The declarative scatter model: recipes and shape stamps.

pub mod recipe;
pub mod stamp;

use rand::rand_core::RngCore;

/// Generate a random float in the range `[0, 1)`.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u32() as f64) / ((u32::MAX as f64) + 1.0)
}

/// In-place Fisher–Yates shuffle using the provided RNG.
pub(crate) fn fisher_yates_shuffle<T>(arr: &mut [T], rng: &mut dyn RngCore) {
    let n = arr.len();
    for i in (1..n).rev() {
        let j = (rand01(rng) * (i + 1) as f64) as usize;
        arr.swap(i, j.min(i));
    }
}
