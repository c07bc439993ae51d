use super::common::{epsilon_greedy_action, greedy_policy_from_q, max_q};
use crate::common::defs::{GreedyPolicy, QTable};
use crate::config::SolverConfig;
use crate::envs::SampleEnv;
use crate::error::{Result, RlError};
use crate::{Continous, Discrete};
use ndarray::Array2;
use rand::prelude::*;
use std::collections::HashMap;

/// Last observed (reward, next state) per (state, action): a deterministic
/// stand-in for the real dynamics, overwritten on every visit.
type LearnedModel = HashMap<(Discrete, Discrete), (Continous, Discrete)>;

fn exploration_bonus(kappa: Continous, tau: u64) -> Continous {
    kappa * (tau as Continous).sqrt()
}

/// Max of Q(s, ·) over the legal actions of `s`, 0 when `s` has none - the
/// bootstrap term of a Q-learning-style backup.
fn bootstrap<E: SampleEnv>(q: &QTable, env: &E, s: Discrete) -> Continous {
    max_q(q, s, &env.actions(s))
}

fn dyna<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
    kappa: Option<Continous>,
) -> Result<(GreedyPolicy, QTable)> {
    let mut q: QTable = Array2::zeros((env.n_s(), env.n_a()));
    let mut model = LearnedModel::new();
    let mut seen: Vec<(Discrete, Discrete)> = Vec::new();
    // Dyna-Q+ recency bookkeeping: τ of a pair is the number of real steps
    // since it was last taken.
    let mut total_steps: u64 = 0;
    let mut last_taken: HashMap<(Discrete, Discrete), u64> = HashMap::new();

    for _ in 0..cfg.episodes {
        let mut s = env.reset(rng);
        let mut steps = 0;
        while !env.is_over() {
            if steps >= cfg.max_steps {
                tracing::warn!(steps, "episode hit the step cap, truncating");
                break;
            }
            let a = epsilon_greedy_action(&q, env, s, cfg.epsilon, rng)?;
            let (next, reward) = env.step(a, rng);
            steps += 1;
            total_steps += 1;

            // Real-experience backup.
            let target = if env.is_over() {
                reward
            } else {
                let legal = env.actions(next);
                if legal.is_empty() {
                    return Err(RlError::EmptyActionSet { state: next });
                }
                reward + cfg.gamma * max_q(&q, next, &legal)
            };
            let (si, ai) = (s as usize, a as usize);
            q[[si, ai]] += cfg.alpha * (target - q[[si, ai]]);

            // Model write and recency stamp.
            if model.insert((s, a), (reward, next)).is_none() {
                seen.push((s, a));
            }
            if kappa.is_some() {
                last_taken.insert((s, a), total_steps);
            }

            // Simulated replay over previously seen pairs.
            for _ in 0..cfg.planning_steps {
                let (ps, pa) = seen[rng.gen_range(0..seen.len())];
                let (mut r_sim, s_sim) = model[&(ps, pa)];
                if let Some(kappa) = kappa {
                    let tau = total_steps - last_taken[&(ps, pa)];
                    r_sim += exploration_bonus(kappa, tau);
                }
                let target = r_sim + cfg.gamma * bootstrap(&q, env, s_sim);
                let (psi, pai) = (ps as usize, pa as usize);
                q[[psi, pai]] += cfg.alpha * (target - q[[psi, pai]]);
            }

            s = next;
        }
    }

    Ok((greedy_policy_from_q(&q, env), q))
}

/// Dyna-Q - Sutton & Barto 2018, §8.2.
///
/// Q-learning on real experience, plus `planning_steps` simulated backups
/// per real step drawn from a learned deterministic model of everything
/// seen so far. Planning reuses old experience, so far fewer real episodes
/// reach a good policy.
pub fn dyna_q<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(GreedyPolicy, QTable)> {
    dyna(env, cfg, rng, None)
}

/// Dyna-Q+ - Sutton & Barto 2018, §8.3.
///
/// Dyna-Q with an exploration bonus: each simulated reward gains κ·√τ,
/// where τ counts the real steps since that pair was last taken. Stale
/// model entries look increasingly attractive to the planner, so the agent
/// re-tries them and picks up changes in the environment's dynamics.
pub fn dyna_q_plus<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(GreedyPolicy, QTable)> {
    dyna(env, cfg, rng, Some(cfg.kappa))
}
