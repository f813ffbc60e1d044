//! Crosswind drawn once per run
//!
//! [`sample_wind_speed`] picks one observed speed uniformly from a pool and
//! gives it a random sign. [`WindSource`] lets a run take its wind from a
//! pooled sampler or from a fixed value.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::error::SimError;

/// Draw a signed wind speed (m/s) from `pool`
pub fn sample_wind_speed<R: Rng + ?Sized>(pool: &[f64], rng: &mut R) -> Result<f64, SimError> {
    let speed = pool
        .choose(rng)
        .ok_or_else(|| SimError::input("wind sample pool is empty"))?;
    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Ok(direction * speed)
}

/// Anything that can hand a run its wind value at setup
pub trait WindSource {
    fn draw(&mut self) -> Result<f64, SimError>;
}

/// Empirical wind pool with its own random source
#[derive(Debug, Clone)]
pub struct WindSampler<R = StdRng> {
    pool: Vec<f64>,
    rng: R,
}

impl WindSampler<StdRng> {
    /// Sampler with a deterministic generator
    pub fn seeded(pool: Vec<f64>, seed: u64) -> Result<Self, SimError> {
        Self::with_rng(pool, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WindSampler<R> {
    pub fn with_rng(pool: Vec<f64>, rng: R) -> Result<Self, SimError> {
        if pool.is_empty() {
            return Err(SimError::input("wind sample pool is empty"));
        }
        if let Some(bad) = pool.iter().find(|v| !v.is_finite()) {
            return Err(SimError::input(format!("wind sample pool holds non-finite speed {bad}")));
        }
        Ok(Self { pool, rng })
    }

    pub fn pool(&self) -> &[f64] {
        &self.pool
    }

    pub fn sample(&mut self) -> Result<f64, SimError> {
        sample_wind_speed(&self.pool, &mut self.rng)
    }
}

impl<R: Rng> WindSource for WindSampler<R> {
    fn draw(&mut self) -> Result<f64, SimError> {
        self.sample()
    }
}

/// Constant wind, e.g. calm air for reference runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWind(pub f64);

impl WindSource for FixedWind {
    fn draw(&mut self) -> Result<f64, SimError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            sample_wind_speed(&[], &mut rng),
            Err(SimError::InvalidInput { .. })
        ));
        assert!(WindSampler::seeded(Vec::new(), 1).is_err());
    }

    #[test]
    fn non_finite_pool_entries_are_rejected() {
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert!(matches!(
                WindSampler::seeded(vec![2.0, bad], 1),
                Err(SimError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn single_value_pool_gives_both_signs_evenly() {
        let mut sampler = WindSampler::seeded(vec![4.2], 7).unwrap();
        let trials = 10_000;
        let mut positive = 0;

        for _ in 0..trials {
            let w = sampler.sample().unwrap();
            assert!(w == 4.2 || w == -4.2, "unexpected draw {w}");
            if w > 0.0 {
                positive += 1;
            }
        }

        let share = positive as f64 / trials as f64;
        assert!((share - 0.5).abs() < 0.03, "positive share {share}");
    }

    #[test]
    fn draws_only_pool_members() {
        let pool = vec![1.0, 2.5, 7.0];
        let mut sampler = WindSampler::seeded(pool.clone(), 3).unwrap();
        for _ in 0..200 {
            let w = sampler.draw().unwrap();
            assert!(pool.contains(&w.abs()));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let pool: Vec<f64> = (0..50).map(|i| i as f64 * 0.3).collect();
        let mut a = WindSampler::seeded(pool.clone(), 42).unwrap();
        let mut b = WindSampler::seeded(pool, 42).unwrap();
        for _ in 0..20 {
            assert_eq!(a.sample().unwrap(), b.sample().unwrap());
        }
    }

    #[test]
    fn fixed_wind_always_returns_its_value() {
        let mut calm = FixedWind(0.0);
        assert_eq!(calm.draw().unwrap(), 0.0);
        assert_eq!(FixedWind(-3.5).draw().unwrap(), -3.5);
    }
}
