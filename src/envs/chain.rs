use super::{EnvSpace, SampleEnv};
use crate::{Continous, Discrete};
use rand::rngs::StdRng;

/// Deterministic chain with a single action per state: state i pays
/// `rewards[i]` and moves to i+1, the last state is terminal. Every
/// trajectory is identical, which keeps return arithmetic in tests exact.
pub struct Chain {
    rewards: Vec<Continous>,
    pos: usize,
}

impl Chain {
    pub fn new(rewards: &[Continous]) -> Self {
        Self {
            rewards: rewards.to_vec(),
            pos: 0,
        }
    }
}

impl EnvSpace for Chain {
    fn n_s(&self) -> usize {
        self.rewards.len() + 1
    }

    fn n_a(&self) -> usize {
        1
    }

    fn actions(&self, s: Discrete) -> Vec<Discrete> {
        if (s as usize) < self.rewards.len() {
            vec![0]
        } else {
            vec![]
        }
    }
}

impl SampleEnv for Chain {
    fn reset(&mut self, _rng: &mut StdRng) -> Discrete {
        self.pos = 0;
        0
    }

    fn state(&self) -> Discrete {
        self.pos as Discrete
    }

    fn step(&mut self, _action: Discrete, _rng: &mut StdRng) -> (Discrete, Continous) {
        let reward = self.rewards[self.pos];
        self.pos += 1;
        (self.pos as Discrete, reward)
    }

    fn is_over(&self) -> bool {
        self.pos == self.rewards.len()
    }
}
