//! Seeded random stream shared by every probabilistic decision in the engine.
//!
//! A seed string is hashed into four 32-bit words (cyrb128 style mixing) which
//! initialise a small fast counter generator (sfc32). Both halves are pure
//! integer arithmetic, so the same seed yields the same stream on every target.
//! Hosts that bring their own stream (for example a minting platform's RNG) plug
//! it in through [`RandomSource`] when the engine is constructed.

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};

/// Characters used for short shareable seeds.
const BASE62: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Scale converting a 32-bit word into `[0, 1)`.
const WORD_SCALE: f64 = 4_294_967_296.0;

/// Anything able to produce uniformly distributed floats in `[0, 1)`.
pub trait RandomSource {
    /// Draw the next value of the stream.
    fn next_f64(&mut self) -> f64;
}

/// Hash a seed string into the four initial generator words.
///
/// Characters are consumed as UTF-16 code units so seeds shared between
/// browser hosts and native tools resolve to the same state.
#[must_use]
pub fn seed_words(seed: &str) -> [u32; 4] {
    let mut h1: u32 = 1_779_033_703;
    let mut h2: u32 = 3_144_134_277;
    let mut h3: u32 = 1_013_904_242;
    let mut h4: u32 = 2_773_480_762;
    for unit in seed.encode_utf16() {
        let k = u32::from(unit);
        h1 = h2 ^ (h1 ^ k).wrapping_mul(597_399_067);
        h2 = h3 ^ (h2 ^ k).wrapping_mul(2_869_860_233);
        h3 = h4 ^ (h3 ^ k).wrapping_mul(951_274_213);
        h4 = h1 ^ (h4 ^ k).wrapping_mul(2_716_044_179);
    }
    h1 = (h3 ^ (h1 >> 18)).wrapping_mul(597_399_067);
    h2 = (h4 ^ (h2 >> 22)).wrapping_mul(2_869_860_233);
    h3 = (h1 ^ (h3 >> 17)).wrapping_mul(951_274_213);
    h4 = (h2 ^ (h4 >> 19)).wrapping_mul(2_716_044_179);
    [h1 ^ h2 ^ h3 ^ h4, h2 ^ h1, h3 ^ h1, h4 ^ h1]
}

/// Small fast counter generator with 128 bits of state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sfc32 {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl Sfc32 {
    /// Construct a generator from raw state words.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { a, b, c, d }
    }

    /// Construct a generator from a seed string.
    #[must_use]
    pub fn from_seed_str(seed: &str) -> Self {
        let [a, b, c, d] = seed_words(seed);
        Self::new(a, b, c, d)
    }

    /// Current state words, in `a, b, c, d` order.
    #[must_use]
    pub const fn state(&self) -> [u32; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Advance the generator and return the next 32-bit word.
    pub fn next_word(&mut self) -> u32 {
        let mut t = self.a.wrapping_add(self.b);
        self.a = self.b ^ (self.b >> 9);
        self.b = self.c.wrapping_add(self.c << 3);
        self.c = self.c.rotate_left(21);
        self.d = self.d.wrapping_add(1);
        t = t.wrapping_add(self.d);
        self.c = self.c.wrapping_add(t);
        t
    }
}

impl RandomSource for Sfc32 {
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_word()) / WORD_SCALE
    }
}

impl RngCore for Sfc32 {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst);
    }
}

impl SeedableRng for Sfc32 {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(seed.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self::new(words[0], words[1], words[2], words[3])
    }
}

/// Adapter turning any `FnMut() -> f64` into a [`RandomSource`].
///
/// Values outside `[0, 1)` (including NaN) are folded back into range so a
/// misbehaving host stream cannot push indices out of bounds.
pub struct ExternalSource<F> {
    draw: F,
}

impl<F> ExternalSource<F>
where
    F: FnMut() -> f64,
{
    #[must_use]
    pub fn new(draw: F) -> Self {
        Self { draw }
    }
}

impl<F> RandomSource for ExternalSource<F>
where
    F: FnMut() -> f64,
{
    fn next_f64(&mut self) -> f64 {
        let value = (self.draw)();
        if value.is_finite() {
            value.rem_euclid(1.0)
        } else {
            0.0
        }
    }
}

impl<F> std::fmt::Debug for ExternalSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalSource").finish_non_exhaustive()
    }
}

/// Random stream plus the derived helpers the engine draws through.
pub struct EngineRng {
    source: Box<dyn RandomSource>,
    draws: u64,
}

impl std::fmt::Debug for EngineRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRng")
            .field("draws", &self.draws)
            .finish_non_exhaustive()
    }
}

impl EngineRng {
    /// Deterministic stream derived from a seed string.
    #[must_use]
    pub fn seeded(seed: &str) -> Self {
        Self::from_source(Sfc32::from_seed_str(seed))
    }

    /// Wrap an externally supplied stream.
    #[must_use]
    pub fn from_source(source: impl RandomSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            draws: 0,
        }
    }

    /// Number of values drawn since construction.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        self.source.next_f64()
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform float in `[a, b)`.
    pub fn range_f64(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.next_f64()
    }

    /// Integer in `[0, n)`, truncated toward zero.
    pub fn range_int(&mut self, n: i32) -> i32 {
        (self.next_f64() * f64::from(n)) as i32
    }

    /// Index in `[0, len)` for slice lookups.
    pub fn index(&mut self, len: usize) -> usize {
        (self.next_f64() * len as f64) as usize
    }

    /// `-1` or `1` with equal probability.
    pub fn sign(&mut self) -> i32 {
        if self.chance(0.5) { -1 } else { 1 }
    }

    /// Inverse-CDF draw over unnormalised weights.
    ///
    /// The first index whose running remainder drops to zero or below wins;
    /// the last index absorbs floating point slack.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut remainder = self.next_f64() * total;
        for (index, weight) in weights.iter().enumerate() {
            remainder -= weight;
            if remainder <= 0.0 {
                return index;
            }
        }
        weights.len().saturating_sub(1)
    }

    /// Fisher-Yates shuffle driven by this stream.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }

    /// Short base-62 seed drawn from this stream.
    pub fn short_seed(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(BASE62[self.index(BASE62.len())]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cycle {
        values: Vec<f64>,
        cursor: usize,
    }

    impl Cycle {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                cursor: 0,
            }
        }
    }

    impl RandomSource for Cycle {
        fn next_f64(&mut self) -> f64 {
            let value = self.values[self.cursor % self.values.len()];
            self.cursor += 1;
            value
        }
    }

    #[test]
    fn same_seed_reproduces_stream() {
        let mut a = EngineRng::seeded("abc123");
        let mut b = EngineRng::seeded("abc123");
        let left: Vec<f64> = (0..256).map(|_| a.next_f64()).collect();
        let right: Vec<f64> = (0..256).map(|_| b.next_f64()).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = EngineRng::seeded("abc123");
        let mut b = EngineRng::seeded("abc124");
        let left: Vec<f64> = (0..8).map(|_| a.next_f64()).collect();
        let right: Vec<f64> = (0..8).map(|_| b.next_f64()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn empty_seed_hash_matches_initial_mix() {
        let words = seed_words("");
        let h1 = (1_013_904_242u32 ^ (1_779_033_703u32 >> 18)).wrapping_mul(597_399_067);
        let h2 = (2_773_480_762u32 ^ (3_144_134_277u32 >> 22)).wrapping_mul(2_869_860_233);
        assert_eq!(words[1], h2 ^ h1);
    }

    #[test]
    fn generator_counter_advances_once_per_draw() {
        let mut rng = Sfc32::new(0, 0, 0, 0);
        assert_eq!(rng.next_word(), 1);
        assert_eq!(rng.state()[3], 1);
        rng.next_word();
        assert_eq!(rng.state()[3], 2);
    }

    #[test]
    fn rng_core_matches_float_stream() {
        let mut core = Sfc32::from_seed_str("xyz");
        let mut floats = Sfc32::from_seed_str("xyz");
        let word = core.next_u32();
        assert_eq!(f64::from(word) / WORD_SCALE, floats.next_f64());
    }

    #[test]
    fn seedable_rng_matches_string_seeding() {
        let mut bytes = [0u8; 16];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(seed_words("abc123")) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        let mut from_bytes = Sfc32::from_seed(bytes);
        let mut from_str = Sfc32::from_seed_str("abc123");
        assert_eq!(from_bytes.state(), from_str.state());
        for _ in 0..16 {
            assert_eq!(from_bytes.next_word(), from_str.next_word());
        }
    }

    #[test]
    fn weighted_index_follows_running_remainder() {
        let mut rng = EngineRng::from_source(Cycle::new(&[0.125, 0.375, 0.625, 0.875]));
        let picks: Vec<usize> = (0..8).map(|_| rng.weighted_index(&[1.0; 4])).collect();
        assert_eq!(picks, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn weighted_index_boundaries_resolve_to_lower_index() {
        let mut rng = EngineRng::from_source(Cycle::new(&[0.0, 0.25, 0.5, 0.75]));
        let picks: Vec<usize> = (0..4).map(|_| rng.weighted_index(&[1.0; 4])).collect();
        assert_eq!(picks, vec![0, 0, 1, 2]);
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = EngineRng::from_source(Cycle::new(&[0.5]));
        assert_eq!(rng.weighted_index(&[0.0, 0.0, 2.0]), 2);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = EngineRng::seeded("perm");
        let mut items: Vec<usize> = (0..24).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn range_int_truncates() {
        let mut rng = EngineRng::from_source(Cycle::new(&[0.999_999]));
        assert_eq!(rng.range_int(5), 4);
        let mut rng = EngineRng::from_source(Cycle::new(&[0.0]));
        assert_eq!(rng.range_int(5), 0);
    }

    #[test]
    fn external_source_folds_out_of_range_values() {
        let mut values = vec![f64::NAN, 1.25, -0.25].into_iter();
        let mut source = ExternalSource::new(move || values.next().unwrap_or(0.0));
        assert_eq!(source.next_f64(), 0.0);
        assert!((source.next_f64() - 0.25).abs() < 1e-12);
        assert!((source.next_f64() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn short_seed_is_base62() {
        let mut rng = EngineRng::seeded("seed");
        let seed = rng.short_seed(6);
        assert_eq!(seed.len(), 6);
        assert!(seed.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
