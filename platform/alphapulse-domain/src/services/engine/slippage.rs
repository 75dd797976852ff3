use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Seedable Gaussian slippage stream. Each environment owns exactly one.
#[derive(Debug, Clone)]
pub struct GaussianSlippage {
    std_fraction: f64,
    normal: Option<Normal<f64>>,
    rng: ChaCha8Rng,
}

impl GaussianSlippage {
    pub fn new(std_fraction: f64, seed: Option<u64>) -> Self {
        let normal = if std_fraction > 0.0 && std_fraction.is_finite() {
            Normal::new(0.0, std_fraction).ok()
        } else {
            None
        };
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            std_fraction,
            normal,
            rng,
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn std_fraction(&self) -> f64 {
        self.std_fraction
    }

    /// Magnitude of one draw, as a fraction of price. Always zero when the
    /// configured deviation is zero; no randomness is consumed in that case.
    pub fn draw_fraction(&mut self) -> f64 {
        match &self.normal {
            Some(normal) => normal.sample(&mut self.rng).abs(),
            None => 0.0,
        }
    }
}
