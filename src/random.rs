//! Deterministic seeded randomizer.
//!
//! Every procedural decision in the world goes through [`Randomizer`], so a
//! chunk's contents are a pure function of its seed. No wall clock, no OS
//! entropy.

/// Seeded xorshift64* generator.
///
/// The seed is diffused through one splitmix64 round first so that adjacent
/// seeds (chunk seeds often differ by one) start from unrelated states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Randomizer {
    state: u64,
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

impl Randomizer {
    pub fn new(seed: i64) -> Self {
        let mut z = (seed as u64).wrapping_add(GOLDEN_GAMMA);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        // xorshift never leaves the all-zero state
        Self {
            state: if z == 0 { GOLDEN_GAMMA } else { z },
        }
    }

    /// Raw 32 bits from the sequence.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }

    /// Uniform integer in `[0, bound)`. Returns 0 for a zero bound.
    pub fn next_int(&mut self, bound: u32) -> u32 {
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }

    /// Uniformly chosen element, `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_int(items.len() as u32) as usize)
    }
}

/// Stable integer hash of `value`, reduced into `[0, modulus)`.
///
/// Used to derive per-chunk seeds from coordinates. MD5 gives full
/// avalanche between neighbouring inputs and involves no floating point, so
/// the result is identical on every platform.
pub fn pseudo_rand_int(value: i64, modulus: u32) -> u32 {
    if modulus == 0 {
        return 0;
    }
    let digest = md5::compute(value.to_le_bytes());
    let d = digest.0;
    let wide = u64::from_le_bytes([d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]]);
    (wide % modulus as u64) as u32
}
