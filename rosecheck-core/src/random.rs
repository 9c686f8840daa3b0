//! Seeded, clonable pseudo-random source.
//!
//! [`Random`] is a SplitMix64 stream keyed by a seed string. It counts the
//! draws it has made, so a clone (or [`Random::replay`]) reproduces exactly
//! the same subsequent draws. Replay-based shrinking depends on this.

use crate::error::{CheckError, Result};
use rand::{Rng, RngCore};
use std::fmt;

/// Lower end of the signed domain `interval` draws from.
const GEN_MIN: i64 = i32::MIN as i64;
/// Upper end of the signed domain `interval` draws from.
const GEN_MAX: i64 = i32::MAX as i64;

/// Default probability of returning a boundary value from the biased draws.
pub const DEFAULT_BOUNDARY_PROBABILITY: f64 = 0.1;

/// Golden-ratio increment used by SplitMix64.
const GAMMA: u64 = 0x9e3779b97f4a7c15;

/// A deterministic random source.
#[derive(Clone, PartialEq)]
pub struct Random {
    seed: String,
    state: u64,
    draws: u64,
    boundary_probability: f64,
}

impl Random {
    /// Create a random source from a seed string. An empty seed picks a
    /// fresh one from the thread RNG.
    pub fn new(seed: &str) -> Self {
        let seed = if seed.is_empty() {
            rand::thread_rng().gen::<u64>().to_string()
        } else {
            seed.to_string()
        };
        let state = hash_seed(&seed);
        Random {
            seed,
            state,
            draws: 0,
            boundary_probability: DEFAULT_BOUNDARY_PROBABILITY,
        }
    }

    /// Create an auto-seeded random source.
    pub fn auto() -> Self {
        Self::new("")
    }

    /// Rebuild the source for `seed` positioned after `draws` draws.
    pub fn replay(seed: &str, draws: u64) -> Self {
        let mut rand = Self::new(seed);
        rand.state = rand.state.wrapping_add(GAMMA.wrapping_mul(draws));
        rand.draws = draws;
        rand
    }

    /// The seed string this source was created from.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of raw draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Tune how often the biased draws return a boundary value.
    pub fn set_boundary_probability(&mut self, probability: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(CheckError::config(format!(
                "boundary probability must be within [0, 1], got {probability}"
            )));
        }
        self.boundary_probability = probability;
        Ok(())
    }

    /// The next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GAMMA);
        self.draws += 1;
        splitmix64_mix(self.state)
    }

    /// A signed value from the fixed `[i32::MIN, i32::MAX]` domain.
    fn next_signed(&mut self) -> i64 {
        (self.next_u64() >> 32) as u32 as i32 as i64
    }

    /// A uniform value in `[0, 1)`.
    pub fn next_prob(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// `true` with probability `true_prob`.
    pub fn next_boolean(&mut self, true_prob: f64) -> bool {
        self.next_prob() < true_prob
    }

    /// An arbitrary `f64` bit pattern, including NaN and infinities.
    pub fn next_f64(&mut self) -> f64 {
        f64::from_bits(self.next_u64())
    }

    /// Map a draw linearly onto `[min, max]`.
    ///
    /// The offset from `min` is `round(frac * (max - min))` with
    /// `frac = (drawn - GEN_MIN) / (GEN_MAX - GEN_MIN)`; the same draw and
    /// bounds always give the same result.
    pub fn interval(&mut self, min: i64, max: i64) -> Result<i64> {
        self.interval_wide(min.into(), max.into()).map(|value| value as i64)
    }

    /// `interval` over `i128` bounds, for unsigned ranges past `i64::MAX`.
    ///
    /// The offset is added to `min` in integer arithmetic, so narrow
    /// ranges stay exact at any magnitude.
    pub fn interval_wide(&mut self, min: i128, max: i128) -> Result<i128> {
        if min > max {
            return Err(CheckError::InvalidRange { min, max });
        }
        let drawn = self.next_signed();
        let frac = (drawn - GEN_MIN) as f64 / (GEN_MAX - GEN_MIN) as f64;
        let span = max.abs_diff(min);
        let offset = ((frac * span as f64).round() as u128).min(span);
        Ok((min as u128).wrapping_add(offset) as i128)
    }

    /// Like `interval`, excluding `to`.
    pub fn in_range(&mut self, from: i64, to: i64) -> Result<i64> {
        if from >= to {
            return Err(CheckError::InvalidRange {
                min: from.into(),
                max: to.into(),
            });
        }
        self.interval(from, to - 1)
    }

    /// A boundary-biased `i32` in `[min, max]`.
    pub fn next_int(&mut self, min: i32, max: i32) -> Result<i32> {
        self.next_long(min as i64, max as i64).map(|value| value as i32)
    }

    /// A boundary-biased `i64` in `[min, max]`.
    ///
    /// With the configured boundary probability one of `0` (when in range),
    /// `min` or `max` is returned; otherwise the draw is uniform over the
    /// whole range.
    pub fn next_long(&mut self, min: i64, max: i64) -> Result<i64> {
        self.next_wide(min.into(), max.into()).map(|value| value as i64)
    }

    /// `next_long` over `i128` bounds.
    ///
    /// Spans wider than 64 bits only reach the first `2^64` values above
    /// `min`, which covers every primitive integer type.
    pub fn next_wide(&mut self, min: i128, max: i128) -> Result<i128> {
        if min > max {
            return Err(CheckError::InvalidRange { min, max });
        }
        if self.next_boolean(self.boundary_probability) {
            let mut boundaries = vec![min, max];
            if min < 0 && max > 0 {
                boundaries.push(0);
            }
            let pick = self.bounded(boundaries.len() as u64) as usize;
            return Ok(boundaries[pick]);
        }
        let span = max.abs_diff(min).saturating_add(1);
        let offset = if span > u64::MAX as u128 {
            self.next_u64() as u128
        } else {
            self.bounded(span as u64) as u128
        };
        Ok((min as u128).wrapping_add(offset) as i128)
    }

    /// A uniform value in `[0, bound)`, `bound > 0`.
    fn bounded(&mut self, bound: u64) -> u64 {
        ((self.next_u64() as u128 * bound as u128) >> 64) as u64
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::auto()
    }
}

impl fmt::Debug for Random {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Random")
            .field("seed", &self.seed)
            .field("draws", &self.draws)
            .finish()
    }
}

impl RngCore for Random {
    fn next_u32(&mut self) -> u32 {
        (Random::next_u64(self) >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        Random::next_u64(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = Random::next_u64(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Stable hash of the seed string (FNV-1a folded through the mixer).
fn hash_seed(seed: &str) -> u64 {
    let folded = seed.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    });
    splitmix64_mix(folded)
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}
