use crate::Continous;
use serde::{Deserialize, Serialize};

/// Hyperparameters shared by every solver entry point.
///
/// Each algorithm reads only the options it recognizes and ignores the
/// rest, so one config can drive a whole sweep. `..Default::default()` is
/// the intended way to set just the fields an experiment cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Discount factor γ.
    pub gamma: Continous,
    /// Convergence threshold θ for the DP value sweeps.
    pub theta: Continous,
    /// Learning rate α for TD and planning updates.
    pub alpha: Continous,
    /// Exploration rate ε for the ε-greedy/ε-soft policies.
    pub epsilon: Continous,
    /// Episode budget for the sampling algorithms.
    pub episodes: usize,
    /// Simulated updates per real step (Dyna-Q / Dyna-Q+).
    pub planning_steps: usize,
    /// Exploration-bonus coefficient κ (Dyna-Q+ only).
    pub kappa: Continous,
    /// Per-episode step cap. Exceeding it truncates the episode; the
    /// partial trajectory is still used.
    pub max_steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            theta: 1e-6,
            alpha: 0.1,
            epsilon: 0.1,
            episodes: 10_000,
            planning_steps: 10,
            kappa: 1e-4,
            max_steps: 1_000,
        }
    }
}
