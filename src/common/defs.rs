use crate::{Continous, Discrete};
use ndarray::Array2;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One weighted outcome of taking an action in a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub probability: Continous,
    pub next_state: Discrete,
    pub reward: Continous,
}

/// Full transition model, keyed by (state, action). Only the legal actions
/// of non-terminal states have entries.
pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;

/// One step of a sampled trajectory: the state the agent was in, the action
/// it took there and the reward the step returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeEvent {
    pub s: Discrete,
    pub a: Discrete,
    pub r: Continous,
}

/// Action-value table, n_s x n_a. Entries of never-visited pairs keep
/// whatever value the algorithm initialized them with.
pub type QTable = Array2<Continous>;

/// A rule for picking the next action given the current state.
pub trait Policy {
    /// `None` means the state has no legal action (terminal).
    fn decide(&self, s: Discrete, rng: &mut StdRng) -> Option<Discrete>;
}

/// Deterministic policy: one action per state, `None` for terminal states.
/// Immutable once returned by a solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreedyPolicy {
    actions: Vec<Option<Discrete>>,
}

impl GreedyPolicy {
    pub fn new(actions: Vec<Option<Discrete>>) -> Self {
        Self { actions }
    }

    pub fn n_s(&self) -> usize {
        self.actions.len()
    }

    pub fn action(&self, s: Discrete) -> Option<Discrete> {
        self.actions[s as usize]
    }
}

impl Policy for GreedyPolicy {
    fn decide(&self, s: Discrete, _rng: &mut StdRng) -> Option<Discrete> {
        self.action(s)
    }
}

/// Stochastic policy: one distribution over actions per state. Rows of
/// states without legal actions are all-zero; every other row sums to 1.
/// Immutable once returned by a solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftPolicy {
    probs: Array2<Continous>,
}

impl SoftPolicy {
    pub fn new(probs: Array2<Continous>) -> Self {
        Self { probs }
    }

    pub fn n_s(&self) -> usize {
        self.probs.nrows()
    }

    pub fn probs(&self) -> &Array2<Continous> {
        &self.probs
    }

    /// Probability of taking `a` in `s`.
    pub fn prob(&self, s: Discrete, a: Discrete) -> Continous {
        self.probs[[s as usize, a as usize]]
    }

    /// Draw an action from the state's distribution.
    pub fn sample(&self, s: Discrete, rng: &mut StdRng) -> Option<Discrete> {
        let row = self.probs.row(s as usize);
        let dist = WeightedIndex::new(row.iter().copied()).ok()?;
        Some(dist.sample(rng) as Discrete)
    }
}

impl Policy for SoftPolicy {
    fn decide(&self, s: Discrete, rng: &mut StdRng) -> Option<Discrete> {
        self.sample(s, rng)
    }
}
