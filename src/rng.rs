use std::collections::{HashMap, VecDeque};

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the Bernoulli draws that decide growth and decay.
pub trait RandomSource {
    /// Returns true with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
}

impl RandomSource for ChaCha8Rng {
    fn chance(&mut self, probability: f64) -> bool {
        self.gen::<f64>() < probability
    }
}

/// Hands out one independent ChaCha stream per name, all derived from a
/// single session seed.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 32];
            self.master.fill_bytes(&mut seed_bytes);
            let mut seed_u64 = [0u8; 8];
            seed_u64.copy_from_slice(&seed_bytes[..8]);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_u64))
        });
        SystemRng { inner: entry }
    }
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl RandomSource for SystemRng<'_> {
    fn chance(&mut self, probability: f64) -> bool {
        self.inner.chance(probability)
    }
}

/// Every check succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysSucceed;

impl RandomSource for AlwaysSucceed {
    fn chance(&mut self, _probability: f64) -> bool {
        true
    }
}

/// Every check fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverSucceed;

impl RandomSource for NeverSucceed {
    fn chance(&mut self, _probability: f64) -> bool {
        false
    }
}

/// Replays a fixed list of outcomes, then keeps returning `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    outcomes: VecDeque<bool>,
    fallback: bool,
    draws: usize,
}

impl ScriptedSource {
    pub fn new(outcomes: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            fallback,
            draws: 0,
        }
    }

    /// Number of checks made so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for ScriptedSource {
    fn chance(&mut self, _probability: f64) -> bool {
        self.draws += 1;
        self.outcomes.pop_front().unwrap_or(self.fallback)
    }
}

/// Answers every check with `outcome` and remembers the probability asked for.
#[derive(Debug, Clone, Default)]
pub struct RecordingSource {
    outcome: bool,
    probabilities: Vec<f64>,
}

impl RecordingSource {
    pub fn new(outcome: bool) -> Self {
        Self {
            outcome,
            probabilities: Vec::new(),
        }
    }

    /// Probabilities of every check made so far, in order.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

impl RandomSource for RecordingSource {
    fn chance(&mut self, probability: f64) -> bool {
        self.probabilities.push(probability);
        self.outcome
    }
}
