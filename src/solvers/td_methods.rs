use super::common::{epsilon_greedy_action, epsilon_soft_pairs, greedy_policy_from_q, max_q};
use crate::common::defs::{GreedyPolicy, QTable};
use crate::config::SolverConfig;
use crate::envs::SampleEnv;
use crate::error::{Result, RlError};
use crate::Continous;
use ndarray::Array2;
use rand::prelude::*;

/// SARSA, on-policy one-step TD control - Sutton & Barto 2018, §6.4.
///
/// Acts ε-greedily on the live Q, bootstrapping each update from the action
/// actually chosen at the next state. The target is the bare reward exactly
/// when the next state is terminal.
pub fn sarsa<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(GreedyPolicy, QTable)> {
    let mut q: QTable = Array2::zeros((env.n_s(), env.n_a()));

    for _ in 0..cfg.episodes {
        let mut s = env.reset(rng);
        if env.is_over() {
            continue;
        }
        let mut a = epsilon_greedy_action(&q, env, s, cfg.epsilon, rng)?;

        let mut steps = 0;
        while !env.is_over() {
            if steps >= cfg.max_steps {
                tracing::warn!(steps, "episode hit the step cap, truncating");
                break;
            }
            let (next, reward) = env.step(a, rng);
            steps += 1;

            let (si, ai) = (s as usize, a as usize);
            if env.is_over() {
                q[[si, ai]] += cfg.alpha * (reward - q[[si, ai]]);
                break;
            }

            let next_a = epsilon_greedy_action(&q, env, next, cfg.epsilon, rng)?;
            let target = reward + cfg.gamma * q[[next as usize, next_a as usize]];
            q[[si, ai]] += cfg.alpha * (target - q[[si, ai]]);

            s = next;
            a = next_a;
        }
    }

    Ok((greedy_policy_from_q(&q, env), q))
}

/// Q-learning, off-policy one-step TD control - Sutton & Barto 2018, §6.5.
///
/// Acts ε-greedily but bootstraps from the best legal action at the next
/// state, so the learned Q tracks the greedy target policy regardless of
/// the exploration actually taken.
pub fn q_learning<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(GreedyPolicy, QTable)> {
    let mut q: QTable = Array2::zeros((env.n_s(), env.n_a()));

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

            s = next;
        }
    }

    Ok((greedy_policy_from_q(&q, env), q))
}

/// Expected SARSA - Sutton & Barto 2018, §6.6.
///
/// SARSA with the sampled next action replaced by the expectation of
/// Q(s', ·) under the current ε-greedy distribution, removing that one
/// source of sampling variance. Same fixed point as SARSA.
pub fn expected_sarsa<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(GreedyPolicy, QTable)> {
    let mut q: QTable = Array2::zeros((env.n_s(), env.n_a()));

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

            let target = if env.is_over() {
                reward
            } else {
                let legal = env.actions(next);
                if legal.is_empty() {
                    return Err(RlError::EmptyActionSet { state: next });
                }
                let expected: Continous = epsilon_soft_pairs(&q, next, &legal, cfg.epsilon)
                    .iter()
                    .map(|&(a, p)| p * q[[next as usize, a as usize]])
                    .sum();
                reward + cfg.gamma * expected
            };
            let (si, ai) = (s as usize, a as usize);
            q[[si, ai]] += cfg.alpha * (target - q[[si, ai]]);

            s = next;
        }
    }

    Ok((greedy_policy_from_q(&q, env), q))
}
