//! The environment contract, split by capability, plus small reference
//! environments implementing it.
//!
//! Each capability is its own trait and a concrete environment implements
//! exactly the subset it supports; an algorithm's bound *is* its capability
//! requirement, so a mismatch fails at the call site instead of at run time.

#[cfg(test)]
pub mod chain;
pub mod grid_world;
pub mod line_world;
pub mod monty_hall;
pub mod rps_game;

pub use grid_world::GridWorld;
pub use line_world::LineWorld;
pub use monty_hall::MontyHall;
pub use rps_game::RpsGame;

use crate::common::defs::Transitions;
use crate::error::Result;
use crate::{Continous, Discrete};
use rand::rngs::StdRng;
use std::rc::Rc;

/// State/action enumeration, shared by every capability.
///
/// States are dense indices `0..n_s()`; environments with composite states
/// keep their own index mapping internally.
pub trait EnvSpace {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    /// Legal actions in `s`. Empty exactly when `s` is terminal.
    fn actions(&self, s: Discrete) -> Vec<Discrete>;
}

/// Full-model capability, consumed by dynamic programming.
pub trait ModelEnv: EnvSpace {
    /// The complete transition model. Solvers validate it before the first
    /// sweep and abort on malformed entries.
    fn transitions(&self) -> Rc<Transitions>;

    fn is_terminal(&self, s: Discrete) -> bool;
}

/// Live-stepping capability, consumed by Monte Carlo, TD and planning.
///
/// Every stochastic move the environment makes draws from the rng the
/// caller threads through, so a seeded run is reproducible end to end.
pub trait SampleEnv: EnvSpace {
    /// Start a fresh episode, returning the initial state.
    fn reset(&mut self, rng: &mut StdRng) -> Discrete;

    fn state(&self) -> Discrete;

    /// Apply `action`, returning `(next_state, reward)`.
    fn step(&mut self, action: Discrete, rng: &mut StdRng) -> (Discrete, Continous);

    fn is_over(&self) -> bool;
}

/// Arbitrary-start capability, required by Monte Carlo exploring starts.
pub trait ExploringStarts: SampleEnv {
    /// Start an episode from `s` instead of the regular initial state.
    /// Environments whose non-initial states depend on hidden information
    /// refuse with [`crate::RlError::UnsupportedStart`].
    fn reset_to(&mut self, s: Discrete, rng: &mut StdRng) -> Result<Discrete>;
}
