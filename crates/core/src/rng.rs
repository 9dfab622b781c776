use crate::{Coord, EngineError};
use log::trace;
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    seq::index,
    Rng, SeedableRng,
};
use std::collections::VecDeque;

/// Source of every random draw the engine makes. Draw order is part of the
/// contract: replaying the same draws replays the same game.
pub trait RandomSupplier {
    /// Uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Uniform integer in `lo..=hi`.
    fn int_in_range(&mut self, lo: i64, hi: i64) -> i64;

    /// Index into `weights`, picked proportionally to its weight.
    fn weighted_index(&mut self, weights: &[u32]) -> Result<usize, EngineError>;

    /// `count` distinct members of `pool`.
    fn sample(&mut self, pool: &[Coord], count: usize) -> Result<Vec<Coord>, EngineError>;
}

fn check_weights(weights: &[u32]) -> Result<(), EngineError> {
    if weights.iter().all(|weight| *weight == 0) {
        return Err(EngineError::InvalidWeights(
            "weights must contain a positive entry".to_string(),
        ));
    }
    Ok(())
}

fn check_sample(pool: &[Coord], count: usize) -> Result<(), EngineError> {
    if count > pool.len() {
        return Err(EngineError::SamplingUnderflow {
            requested: count,
            available: pool.len(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSupplier for RngState {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn int_in_range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    fn weighted_index(&mut self, weights: &[u32]) -> Result<usize, EngineError> {
        check_weights(weights)?;
        let dist = WeightedIndex::new(weights)
            .map_err(|err| EngineError::InvalidWeights(err.to_string()))?;
        Ok(dist.sample(&mut self.rng))
    }

    fn sample(&mut self, pool: &[Coord], count: usize) -> Result<Vec<Coord>, EngineError> {
        check_sample(pool, count)?;
        let picked = index::sample(&mut self.rng, pool.len(), count)
            .into_iter()
            .map(|i| pool[i])
            .collect();
        Ok(picked)
    }
}

/// Replays scripted draws. Each queue falls back to a fixed answer once it
/// runs dry: `fallback_uniform` for uniforms, the lower bound for integers,
/// the first positive weight for weighted picks. Scripted integers are
/// returned as given, even outside the requested range. Samples take the first
/// `count` pool members in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    uniforms: VecDeque<f64>,
    ints: VecDeque<i64>,
    picks: VecDeque<usize>,
    fallback_uniform: f64,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every uniform draw returns `value`, e.g. `0.0` makes every gated hit land.
    pub fn always(value: f64) -> Self {
        Self {
            fallback_uniform: value,
            ..Self::default()
        }
    }

    pub fn with_uniforms(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(values);
        self
    }

    pub fn with_ints(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.ints.extend(values);
        self
    }

    pub fn with_picks(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(values);
        self
    }
}

impl RandomSupplier for ScriptedRandom {
    fn uniform(&mut self) -> f64 {
        let value = self.uniforms.pop_front().unwrap_or(self.fallback_uniform);
        trace!("scripted uniform {value}");
        value
    }

    fn int_in_range(&mut self, lo: i64, _hi: i64) -> i64 {
        self.ints.pop_front().unwrap_or(lo)
    }

    fn weighted_index(&mut self, weights: &[u32]) -> Result<usize, EngineError> {
        check_weights(weights)?;
        match self.picks.pop_front() {
            Some(pick) if pick < weights.len() => Ok(pick),
            Some(pick) => Err(EngineError::InvalidWeights(format!(
                "scripted pick {pick} out of {} weights",
                weights.len()
            ))),
            None => Ok(weights.iter().position(|w| *w > 0).unwrap_or(0)),
        }
    }

    fn sample(&mut self, pool: &[Coord], count: usize) -> Result<Vec<Coord>, EngineError> {
        check_sample(pool, count)?;
        Ok(pool[..count].to_vec())
    }
}
