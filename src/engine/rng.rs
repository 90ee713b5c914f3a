//! Seedable RNG stream for one engine instance
//!
//! Every probabilistic decision (offer acceptance, AI tie-breaks, hand
//! draws) pulls from this stream, so a run is reproducible from its seed.
//! Save/restore captures the seed plus the stream position.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone)]
pub struct EngineRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl EngineRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in [0, 1)
    pub fn roll(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform index below `bound` (bound must be non-zero)
    pub fn pick(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    pub fn inner(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

impl PartialEq for EngineRng {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed && self.rng.get_word_pos() == other.rng.get_word_pos()
    }
}

#[derive(Serialize, Deserialize)]
struct RngRepr {
    seed: u64,
    word_pos: u128,
}

impl Serialize for EngineRng {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RngRepr {
            seed: self.seed,
            word_pos: self.rng.get_word_pos(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EngineRng {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = RngRepr::deserialize(deserializer)?;
        let mut rng = ChaCha8Rng::seed_from_u64(repr.seed);
        rng.set_word_pos(repr.word_pos);
        Ok(Self {
            seed: repr.seed,
            rng,
        })
    }
}
