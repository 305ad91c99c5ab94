//! Seeded randomness for library shuffles and randomized agents.
//!
//! A match is fully reproducible from its seed: each seat shuffles from its
//! own stream so that changing one deck never perturbs the other seat's
//! draws.
//!
//! ```
//! use duel_rules::core::{GameRng, PlayerId};
//!
//! let mut a = GameRng::new(7).for_seat(PlayerId::new(0));
//! let mut b = GameRng::new(7).for_seat(PlayerId::new(0));
//! assert_eq!(a.below(100), b.below(100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Deterministic ChaCha8 generator.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

/// SplitMix64 finalizer, used to derive independent stream seeds.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl GameRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream for one seat, derived from the root seed only.
    #[must_use]
    pub fn for_seat(&self, seat: PlayerId) -> Self {
        Self::new(mix(self.seed ^ mix(u64::from(seat.0) + 1)))
    }

    /// Independent stream for a numbered purpose (agent instances, tests).
    #[must_use]
    pub fn for_stream(&self, stream: u64) -> Self {
        Self::new(mix(self.seed.rotate_left(17) ^ mix(stream)))
    }

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    pub fn below(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.inner.gen_range(0..len)
        }
    }

    /// Bernoulli draw.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Capture the position of this generator.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Rebuild a generator at a captured position.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable generator position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Seed of the stream.
    pub seed: u64,
    /// ChaCha8 word position.
    pub word_pos: u128,
}
