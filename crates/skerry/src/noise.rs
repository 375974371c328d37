//! # Simplex Noise
//!
//! Seeded 2D simplex noise used to carve holes into the tile grid.
//!
//! ```text
//!  seed ──xorshift──► permutation table ──► sample(x, z) ∈ [-1, 1]
//! ```
//!
//! The same seed always yields the same table, so a map can be rebuilt from
//! the seed stored on it.

/// Seeds are mixed with this before shuffling; a raw zero would leave the
/// xorshift state stuck at zero.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// 12 gradient directions for 2D simplex.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0],
    [1, 1],
    [0, 1],
    [-1, 1],
    [-1, 0],
    [-1, -1],
    [0, -1],
    [1, -1],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
];

/// 2D simplex noise generator.
#[derive(Clone)]
pub struct SimplexNoise {
    seed: u64,
    /// 256 entries, doubled so lookups never wrap.
    perm: [u8; 512],
}

impl SimplexNoise {
    /// Skewing factor: (sqrt(3) - 1) / 2.
    const F2: f64 = 0.366025403784439;
    /// Unskewing factor: (3 - sqrt(3)) / 6.
    const G2: f64 = 0.211324865405187;

    pub fn new(seed: u64) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates with xorshift64.
        let mut state = seed ^ SEED_MIX;
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { seed, perm }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Noise at `(x, y)`, in `[-1, 1]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = (i + j) as f64 * Self::G2;
        let x0 = x - (i as f64 - unskew);
        let y0 = y - (j as f64 - unskew);

        // Lower or upper triangle of the skewed cell.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + Self::G2;
        let y1 = y0 - j1 as f64 + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let gi0 = self.perm(ii + self.perm(jj) as usize);
        let gi1 = self.perm(ii + i1 + self.perm(jj + j1) as usize);
        let gi2 = self.perm(ii + 1 + self.perm(jj + 1) as usize);

        let n = contribution(x0, y0, gi0) + contribution(x1, y1, gi1) + contribution(x2, y2, gi2);

        // 70 normalizes the corner sum to roughly [-1, 1].
        (70.0 * n).clamp(-1.0, 1.0)
    }

    #[inline]
    fn perm(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise").field("seed", &self.seed).finish()
    }
}

#[inline]
fn contribution(x: f64, y: f64, hash: u8) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let grad = GRADIENTS[(hash % 12) as usize];
    let t2 = t * t;
    t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
}

#[inline]
fn fast_floor(x: f64) -> i64 {
    let xi = x as i64;
    if x < xi as f64 { xi - 1 } else { xi }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let a = SimplexNoise::new(42);
        let b = SimplexNoise::new(42);
        for x in 0..20 {
            for z in 0..20 {
                assert_eq!(a.sample(x as f64, z as f64), b.sample(x as f64, z as f64));
            }
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = SimplexNoise::new(1);
        let b = SimplexNoise::new(2);
        let differs = (0..50).any(|i| a.sample(i as f64 * 0.7, 3.1) != b.sample(i as f64 * 0.7, 3.1));
        assert!(differs);
    }

    #[test]
    fn zero_seed_is_shuffled() {
        let noise = SimplexNoise::new(0);
        let identity = (0..256).all(|i| noise.perm[i] as usize == i);
        assert!(!identity);
    }

    #[test]
    fn samples_stay_in_range() {
        let noise = SimplexNoise::new(7);
        for x in -40..40 {
            for z in -40..40 {
                let v = noise.sample(x as f64 * 0.37, z as f64 * 0.53);
                assert!((-1.0..=1.0).contains(&v), "{v} out of range");
            }
        }
    }

    #[test]
    fn noise_is_not_flat() {
        let noise = SimplexNoise::new(99);
        let values: Vec<f64> = (0..100).map(|i| noise.sample(i as f64 * 0.5, i as f64 * 0.25)).collect();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.2);
    }

    #[test]
    fn floor_handles_negatives() {
        assert_eq!(fast_floor(-0.5), -1);
        assert_eq!(fast_floor(1.5), 1);
        assert_eq!(fast_floor(-2.0), -2);
    }
}
