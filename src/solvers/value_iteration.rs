use super::common::{expected_return, greedy_action_by, validate_model};
use super::MdpSolver;
use crate::common::defs::GreedyPolicy;
use crate::config::SolverConfig;
use crate::envs::ModelEnv;
use crate::error::Result;
use crate::{Continous, Discrete};
use std::rc::Rc;

/// Value iteration - Sutton & Barto 2018, §4.4.
///
/// Sweeps the max-backup V(s) = max_a Σ p·(r + γ·V(s')) until the largest
/// per-sweep change drops below θ, then extracts the greedy policy from the
/// converged V in one final pass. One sweep per iteration, so typically more
/// iterations than policy iteration but each far cheaper.
pub struct ValueIteration {
    mdp: Rc<dyn ModelEnv>,
    gamma: Continous,
    theta: Continous,
    v: Vec<Continous>,
    pi: Vec<Option<Discrete>>,
}

impl ValueIteration {
    pub fn new(mdp: Rc<dyn ModelEnv>, cfg: &SolverConfig) -> Self {
        let n_s = mdp.n_s();
        Self {
            mdp,
            gamma: cfg.gamma,
            theta: cfg.theta,
            v: vec![0.0; n_s],
            pi: vec![None; n_s],
        }
    }

    pub fn values(&self) -> &[Continous] {
        &self.v
    }

    pub fn policy(&self) -> GreedyPolicy {
        GreedyPolicy::new(self.pi.clone())
    }
}

impl MdpSolver<bool> for ValueIteration {
    fn v_star(&self, s: Discrete) -> Continous {
        self.v[s as usize]
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        if self.mdp.is_terminal(s) || !self.mdp.actions(s).contains(&a) {
            return None;
        }
        Some(expected_return(
            &self.mdp.transitions(),
            s,
            a,
            self.gamma,
            &self.v,
        ))
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        self.pi[s as usize]
    }

    fn exec(&mut self, max_iterations: Option<usize>) -> Result<(bool, usize)> {
        let transitions = validate_model(self.mdp.as_ref())?;
        let n_s = self.mdp.n_s() as Discrete;

        self.v = vec![0.0; self.mdp.n_s()];
        let mut iterations = 0;
        let converged = loop {
            let mut delta: Continous = 0.0;
            for s in 0..n_s {
                if self.mdp.is_terminal(s) {
                    continue;
                }
                let old = self.v[s as usize];
                self.v[s as usize] = self
                    .mdp
                    .actions(s)
                    .iter()
                    .map(|&a| expected_return(&transitions, s, a, self.gamma, &self.v))
                    .fold(Continous::NEG_INFINITY, Continous::max);
                delta = delta.max((old - self.v[s as usize]).abs());
            }
            iterations += 1;
            tracing::debug!(iterations, delta, "value iteration sweep");

            if delta < self.theta {
                break true;
            }
            if max_iterations.is_some_and(|cap| iterations >= cap) {
                break false;
            }
        };

        self.pi = (0..n_s)
            .map(|s| {
                greedy_action_by(&self.mdp.actions(s), |a| {
                    expected_return(&transitions, s, a, self.gamma, &self.v)
                })
            })
            .collect();

        Ok((converged, iterations))
    }
}

/// One-call wrapper: run value iteration to convergence and return the
/// greedy policy with its state values.
pub fn value_iteration(
    mdp: Rc<dyn ModelEnv>,
    cfg: &SolverConfig,
) -> Result<(GreedyPolicy, Vec<Continous>)> {
    let mut solver = ValueIteration::new(mdp, cfg);
    solver.exec(None)?;
    Ok((solver.policy(), solver.values().to_vec()))
}
