use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;

/// Seedable source of the variates every stochastic component draws from.
///
/// One instance is owned by each engine, so runs with the same seed and the
/// same call sequence produce identical traces.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Create a new source seeded deterministically
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Exponential variate with the given mean. Never negative.
    ///
    /// Samples the unit exponential and scales it, so callers only need
    /// `mean > 0` (checked at configuration time).
    pub fn exponential(&mut self, mean: f64) -> f64 {
        let unit: f64 = self.rng.sample(Exp1);
        unit * mean
    }

    /// Uniform variate in `[0, 1)`
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
