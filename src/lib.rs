//! Tabular reinforcement learning on finite MDPs - Sutton & Barto 2018.
//!
//! Dynamic programming (policy/value iteration) over a known transition
//! model, Monte Carlo control, one-step TD control and Dyna-style planning
//! over a live environment. The engine owns the numerics only: rendering,
//! persistence and experiment harnesses live with the caller, which hands in
//! an environment, a [`SolverConfig`] and (for the stochastic algorithms) a
//! seeded rng, and gets back a `(policy, table)` pair.

pub mod common;
pub mod config;
pub mod envs;
pub mod error;
pub mod solvers;

pub use common::defs::*;
pub use config::SolverConfig;
pub use envs::{EnvSpace, ExploringStarts, ModelEnv, SampleEnv};
pub use envs::{GridWorld, LineWorld, MontyHall, RpsGame};
pub use error::{Result, RlError};
pub use solvers::common::{epsilon_greedy_policy, evaluate_policy, greedy_policy_from_q};
pub use solvers::mc_methods::{
    monte_carlo_es, off_policy_mc_control, on_policy_first_visit_mc_control,
};
pub use solvers::planning_methods::{dyna_q, dyna_q_plus};
pub use solvers::policy_iteration::{policy_iteration, PolicyIteration};
pub use solvers::td_methods::{expected_sarsa, q_learning, sarsa};
pub use solvers::value_iteration::{value_iteration, ValueIteration};
pub use solvers::MdpSolver;

pub type Discrete = i32;
pub type Continous = f64;
