use super::common::{expected_return, greedy_action_by, validate_model};
use super::MdpSolver;
use crate::common::defs::{GreedyPolicy, Transitions};
use crate::config::SolverConfig;
use crate::envs::ModelEnv;
use crate::error::Result;
use crate::{Continous, Discrete};
use std::rc::Rc;

/// Policy iteration - Sutton & Barto 2018, §4.3.
///
/// Alternates iterative policy evaluation (to within θ) with greedy policy
/// improvement until no state changes its action. The model is validated
/// before the first sweep; a malformed model aborts the run with no partial
/// result.
pub struct PolicyIteration {
    mdp: Rc<dyn ModelEnv>,
    gamma: Continous,
    theta: Continous,
    v: Vec<Continous>,
    pi: Vec<Option<Discrete>>,
}

impl PolicyIteration {
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

    /// The converged state values.
    pub fn values(&self) -> &[Continous] {
        &self.v
    }

    /// The converged deterministic policy.
    pub fn policy(&self) -> GreedyPolicy {
        GreedyPolicy::new(self.pi.clone())
    }

    fn evaluate(&mut self, transitions: &Transitions) {
        loop {
            let mut delta: Continous = 0.0;
            for s in 0..self.mdp.n_s() as Discrete {
                if self.mdp.is_terminal(s) {
                    continue;
                }
                let a = self.pi[s as usize].expect("non-terminal states keep an action");
                let old = self.v[s as usize];
                self.v[s as usize] = expected_return(transitions, s, a, self.gamma, &self.v);
                delta = delta.max((old - self.v[s as usize]).abs());
            }
            if delta < self.theta {
                break;
            }
        }
    }

    fn improve(&mut self, transitions: &Transitions) -> bool {
        let mut stable = true;
        for s in 0..self.mdp.n_s() as Discrete {
            if self.mdp.is_terminal(s) {
                continue;
            }
            let old = self.pi[s as usize];
            let best = greedy_action_by(&self.mdp.actions(s), |a| {
                expected_return(transitions, s, a, self.gamma, &self.v)
            });
            self.pi[s as usize] = best;
            if best != old {
                stable = false;
            }
        }
        stable
    }
}

impl MdpSolver<bool> for PolicyIteration {
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

        self.v = vec![0.0; self.mdp.n_s()];
        self.pi = (0..self.mdp.n_s() as Discrete)
            .map(|s| self.mdp.actions(s).first().copied())
            .collect();

        let mut iterations = 0;
        loop {
            self.evaluate(&transitions);
            let stable = self.improve(&transitions);
            iterations += 1;
            tracing::debug!(iterations, stable, "policy iteration sweep");

            if stable {
                return Ok((true, iterations));
            }
            if max_iterations.is_some_and(|cap| iterations >= cap) {
                return Ok((false, iterations));
            }
        }
    }
}

/// One-call wrapper: run policy iteration to convergence and return the
/// greedy policy with its state values.
pub fn policy_iteration(
    mdp: Rc<dyn ModelEnv>,
    cfg: &SolverConfig,
) -> Result<(GreedyPolicy, Vec<Continous>)> {
    let mut solver = PolicyIteration::new(mdp, cfg);
    solver.exec(None)?;
    Ok((solver.policy(), solver.values().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::{line_world, rps_game, LineWorld, RpsGame};
    use crate::error::RlError;
    use float_eq::*;

    fn cfg(gamma: Continous, theta: Continous) -> SolverConfig {
        SolverConfig {
            gamma,
            theta,
            ..Default::default()
        }
    }

    #[test]
    fn line_world_converges_to_always_right() {
        let (pi, v) = policy_iteration(Rc::new(LineWorld::new(5)), &cfg(0.9, 1e-4)).unwrap();

        for s in 1..4 {
            assert_eq!(pi.action(s), Some(line_world::RIGHT));
        }
        assert_eq!(pi.action(0), None);
        assert_eq!(pi.action(4), None);

        // V grows toward the +1 exit: 0.81, 0.9, 1.0.
        assert_float_eq!(v[1..4].to_vec(), vec![0.81, 0.9, 1.0], abs_all <= 1e-3);
        assert_float_eq!(v[0], 0.0, abs <= 1e-12);
    }

    #[test]
    fn rps_optimum_wins_both_rounds() {
        let (pi, v) = policy_iteration(Rc::new(RpsGame::new()), &cfg(0.99, 1e-6)).unwrap();

        // Round one: paper beats the scripted rock.
        assert_eq!(pi.action(0), Some(rps_game::PAPER));
        // Round two: beat the counter of whatever was thrown first.
        for p1 in 0..3 {
            for e1 in 0..3 {
                let s = RpsGame::round_one_state(p1, e1);
                assert_eq!(pi.action(s), Some(RpsGame::counter(RpsGame::counter(p1))));
            }
        }
        assert_float_eq!(v[0], 1.0 + 0.99, abs <= 1e-6);
    }

    #[test]
    fn solver_accessors_expose_the_converged_tables() {
        let mut solver = PolicyIteration::new(Rc::new(LineWorld::new(5)), &cfg(0.9, 1e-4));
        let (stable, iterations) = solver.exec(None).unwrap();

        assert!(stable);
        assert!(iterations >= 1);
        assert_eq!(solver.pi_star(2), Some(line_world::RIGHT));
        assert_float_eq!(solver.v_star(3), 1.0, abs <= 1e-3);
        assert_float_eq!(solver.q_star(3, line_world::RIGHT).unwrap(), 1.0, abs <= 1e-3);
        assert!(solver.q_star(3, 17).is_none());
        assert!(solver.q_star(0, line_world::LEFT).is_none());
    }

    #[test]
    fn iteration_cap_reports_an_unstable_policy() {
        let mut solver = PolicyIteration::new(Rc::new(LineWorld::new(9)), &cfg(0.9, 1e-8));
        let (stable, iterations) = solver.exec(Some(1)).unwrap();

        assert!(!stable);
        assert_eq!(iterations, 1);
    }

    #[test]
    fn malformed_models_abort_before_any_sweep() {
        struct Halved(LineWorld);

        impl crate::envs::EnvSpace for Halved {
            fn n_s(&self) -> usize {
                self.0.n_s()
            }
            fn n_a(&self) -> usize {
                self.0.n_a()
            }
            fn actions(&self, s: Discrete) -> Vec<Discrete> {
                self.0.actions(s)
            }
        }

        impl ModelEnv for Halved {
            fn transitions(&self) -> Rc<Transitions> {
                let mut ts = (*self.0.transitions()).clone();
                for t in ts.values_mut() {
                    t[0].probability = 0.5;
                }
                Rc::new(ts)
            }
            fn is_terminal(&self, s: Discrete) -> bool {
                self.0.is_terminal(s)
            }
        }

        let err = policy_iteration(Rc::new(Halved(LineWorld::new(5))), &cfg(0.9, 1e-4))
            .unwrap_err();
        assert!(matches!(err, RlError::MalformedModel { .. }));
    }
}
