//! The algorithm families: dynamic programming over a known model, Monte
//! Carlo control, one-step TD control and Dyna-style planning.

pub mod common;
pub mod mc_methods;
pub mod planning_methods;
pub mod policy_iteration;
pub mod td_methods;
pub mod value_iteration;

use crate::error::Result;
use crate::{Continous, Discrete};

/// A dynamic-programming solver over a known MDP.
///
/// `exec` runs to convergence (or an iteration cap) and the accessors read
/// the converged tables; `T` is the solver's own convergence verdict.
pub trait MdpSolver<T> {
    fn v_star(&self, s: Discrete) -> Continous;

    /// One-step lookahead on the converged V. `None` for terminal states
    /// and illegal actions.
    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    /// The converged greedy action. `None` for terminal states.
    fn pi_star(&self, s: Discrete) -> Option<Discrete>;

    fn exec(&mut self, max_iterations: Option<usize>) -> Result<(T, usize)>;
}
