//! 2-D gradient noise with fractal summation.
//!
//! The lattice hash is a shuffled permutation of `0..256` duplicated to 512
//! entries so `perm[perm[xi] + yi + 1]` never needs wrapping. Each hash picks
//! one of 256 unit gradients with a random direction.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const TABLE_SIZE: usize = 256;

/// Deterministic gradient-noise source built from a seed.
#[derive(Clone)]
pub struct GradientNoise {
    perm: [u8; TABLE_SIZE * 2],
    gradients: [[f64; 2]; TABLE_SIZE],
}

impl GradientNoise {
    /// Build the tables from a seeded `ChaCha8Rng`. Equal seeds give equal noise.
    pub fn new(seed: u64) -> Self {
        Self::from_rng(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_rng<R: Rng>(rng: &mut R) -> Self {
        let mut gradients = [[0.0; 2]; TABLE_SIZE];
        for g in gradients.iter_mut() {
            let angle = rng.gen::<f64>() * TAU;
            *g = [angle.cos(), angle.sin()];
        }

        let mut shuffled = [0u8; TABLE_SIZE];
        for (i, p) in shuffled.iter_mut().enumerate() {
            *p = i as u8;
        }
        // Fisher-Yates
        for i in (1..TABLE_SIZE).rev() {
            let j = rng.gen_range(0..=i);
            shuffled.swap(i, j);
        }

        let mut perm = [0u8; TABLE_SIZE * 2];
        for (i, p) in perm.iter_mut().enumerate() {
            *p = shuffled[i & (TABLE_SIZE - 1)];
        }

        Self { perm, gradients }
    }

    #[inline]
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + t * (b - a)
    }

    #[inline]
    fn gradient(&self, xi: usize, yi: usize) -> [f64; 2] {
        let hash = self.perm[self.perm[xi] as usize + yi];
        self.gradients[hash as usize]
    }

    /// Single-octave noise at `(x, y)`. Zero on every lattice point.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xi = (x0 as i64 & 255) as usize;
        let yi = (y0 as i64 & 255) as usize;
        let xf = x - x0;
        let yf = y - y0;

        let g00 = self.gradient(xi, yi);
        let g10 = self.gradient(xi + 1, yi);
        let g01 = self.gradient(xi, yi + 1);
        let g11 = self.gradient(xi + 1, yi + 1);

        let n00 = g00[0] * xf + g00[1] * yf;
        let n10 = g10[0] * (xf - 1.0) + g10[1] * yf;
        let n01 = g01[0] * xf + g01[1] * (yf - 1.0);
        let n11 = g11[0] * (xf - 1.0) + g11[1] * (yf - 1.0);

        let u = Self::fade(xf);
        let v = Self::fade(yf);
        Self::lerp(Self::lerp(n00, n10, u), Self::lerp(n01, n11, u), v)
    }

    /// Fractal Brownian motion: lacunarity 2, persistence 0.5, normalised by
    /// the summed amplitude.
    pub fn fbm(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += amplitude * self.sample(x * frequency, y * frequency);
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_covers_every_byte_twice() {
        let noise = GradientNoise::new(11);
        let mut counts = [0u32; 256];
        for &p in noise.perm.iter() {
            counts[p as usize] += 1;
        }
        assert!(counts.iter().all(|&c| c == 2));
        assert_eq!(noise.perm[..256], noise.perm[256..]);
    }

    #[test]
    fn gradients_are_unit_length() {
        let noise = GradientNoise::new(3);
        for g in noise.gradients.iter() {
            let len = (g[0] * g[0] + g[1] * g[1]).sqrt();
            assert!((len - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = GradientNoise::new(42);
        let b = GradientNoise::new(42);
        let c = GradientNoise::new(43);
        let pts = [(0.3, 0.7), (12.25, -4.5), (100.9, 3.3)];
        for &(x, y) in &pts {
            assert_eq!(a.fbm(x, y, 4), b.fbm(x, y, 4));
        }
        assert!(pts.iter().any(|&(x, y)| a.sample(x, y) != c.sample(x, y)));
    }

    #[test]
    fn lattice_points_are_zero() {
        let noise = GradientNoise::new(5);
        for &(x, y) in &[(0.0, 0.0), (3.0, 7.0), (-2.0, 255.0), (300.0, 1.0)] {
            assert!(noise.sample(x, y).abs() < 1e-12);
        }
    }

    #[test]
    fn continuous_across_cell_boundaries() {
        let noise = GradientNoise::new(9);
        let eps = 1e-7;
        for i in 0..20 {
            let x = i as f64;
            let y = 0.37 + i as f64 * 0.11;
            let left = noise.sample(x - eps, y);
            let right = noise.sample(x + eps, y);
            assert!((left - right).abs() < 1e-5, "jump at x={x}");
        }
    }

    #[test]
    fn fbm_stays_bounded() {
        let noise = GradientNoise::new(1);
        for i in 0..400 {
            let x = i as f64 * 0.173;
            let y = i as f64 * 0.291;
            let v = noise.fbm(x, y, 6);
            assert!(v.abs() <= 1.0, "fbm({x}, {y}) = {v}");
        }
        assert_eq!(noise.fbm(0.5, 0.5, 0), 0.0);
    }
}
