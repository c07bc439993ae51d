use super::common::{epsilon_soft_pairs, greedy_action, sample_discrete};
use crate::common::defs::{EpisodeEvent, GreedyPolicy, QTable, SoftPolicy};
use crate::config::SolverConfig;
use crate::envs::{ExploringStarts, SampleEnv};
use crate::error::{Result, RlError};
use crate::{Continous, Discrete};
use ndarray::Array2;
use rand::prelude::*;

/// Drive one episode from the environment's current state, choosing each
/// action through `choose`. Stops at terminal or at the step cap; a capped
/// episode is reported and its partial trajectory returned for use.
fn sample_episode<E, F>(
    env: &mut E,
    max_steps: usize,
    rng: &mut StdRng,
    mut choose: F,
) -> Result<Vec<EpisodeEvent>>
where
    E: SampleEnv,
    F: FnMut(&E, Discrete, &mut StdRng) -> Result<Discrete>,
{
    let mut trajectory = Vec::new();
    let mut s = env.state();
    while !env.is_over() {
        if trajectory.len() >= max_steps {
            tracing::warn!(steps = trajectory.len(), "episode hit the step cap, truncating");
            break;
        }
        let a = choose(env, s, rng)?;
        let (next, reward) = env.step(a, rng);
        trajectory.push(EpisodeEvent { s, a, r: reward });
        s = next;
    }
    Ok(trajectory)
}

/// True when (s, a) at step `t` does not occur earlier in the episode.
fn is_first_visit(ep: &[EpisodeEvent], t: usize) -> bool {
    let EpisodeEvent { s, a, .. } = ep[t];
    !ep[..t].iter().any(|e| e.s == s && e.a == a)
}

/// On-policy first-visit Monte Carlo control with an ε-soft acting policy -
/// Sutton & Barto 2018, §5.4.
///
/// Episodes are sampled from the current ε-soft policy; each first-visit
/// (s, a) gets its Q entry pulled toward the observed return by incremental
/// sample averaging, and the state's policy row is re-derived immediately.
/// Returns the final ε-soft policy with Q.
pub fn on_policy_first_visit_mc_control<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(SoftPolicy, QTable)> {
    let (n_s, n_a) = (env.n_s(), env.n_a());
    let mut q: QTable = Array2::from_shape_fn((n_s, n_a), |_| rng.gen());
    let mut counts = Array2::<Continous>::zeros((n_s, n_a));

    // The acting policy starts uniform over each state's legal actions and
    // tightens toward greedy as returns come in.
    let mut pi = Array2::<Continous>::zeros((n_s, n_a));
    for s in 0..n_s {
        let legal = env.actions(s as Discrete);
        for &a in &legal {
            pi[[s, a as usize]] = 1.0 / legal.len() as Continous;
        }
    }

    for _ in 0..cfg.episodes {
        env.reset(rng);
        let trajectory = sample_episode(env, cfg.max_steps, rng, |env, s, rng| {
            let legal = env.actions(s);
            if legal.is_empty() {
                return Err(RlError::EmptyActionSet { state: s });
            }
            let pairs: Vec<_> = legal
                .iter()
                .map(|&a| (a, pi[[s as usize, a as usize]]))
                .collect();
            Ok(sample_discrete(&pairs, rng))
        })?;

        let mut g = 0.0;
        for t in (0..trajectory.len()).rev() {
            let EpisodeEvent { s, a, r } = trajectory[t];
            g = cfg.gamma * g + r;
            if !is_first_visit(&trajectory, t) {
                continue;
            }

            let (si, ai) = (s as usize, a as usize);
            counts[[si, ai]] += 1.0;
            q[[si, ai]] += (g - q[[si, ai]]) / counts[[si, ai]];

            for (a, p) in epsilon_soft_pairs(&q, s, &env.actions(s), cfg.epsilon) {
                pi[[si, a as usize]] = p;
            }
        }
    }

    Ok((SoftPolicy::new(pi), q))
}

/// Monte Carlo control with exploring starts - Sutton & Barto 2018, §5.3.
///
/// Each episode opens on a uniformly random non-terminal (state, action)
/// pair: the environment is reset to the state and the action is actually
/// taken, bypassing the policy for that first step only; the greedy policy
/// takes over from the second step. Requires [`ExploringStarts`].
pub fn monte_carlo_es<E: ExploringStarts>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(GreedyPolicy, QTable)> {
    let (n_s, n_a) = (env.n_s(), env.n_a());
    let mut q: QTable = Array2::from_shape_fn((n_s, n_a), |_| rng.gen());
    let mut counts = Array2::<Continous>::zeros((n_s, n_a));
    let mut pi: Vec<Option<Discrete>> = (0..n_s as Discrete)
        .map(|s| greedy_action(&q, s, &env.actions(s)))
        .collect();

    let starts: Vec<(Discrete, Discrete)> = (0..n_s as Discrete)
        .flat_map(|s| env.actions(s).into_iter().map(move |a| (s, a)))
        .collect();
    if starts.is_empty() {
        return Err(RlError::EmptyActionSet { state: env.state() });
    }

    for _ in 0..cfg.episodes {
        let (s0, a0) = starts[rng.gen_range(0..starts.len())];
        env.reset_to(s0, rng)?;

        let mut forced = Some(a0);
        let trajectory = sample_episode(env, cfg.max_steps, rng, |_, s, _| match forced.take() {
            Some(a) => Ok(a),
            None => pi[s as usize].ok_or(RlError::EmptyActionSet { state: s }),
        })?;

        let mut g = 0.0;
        for t in (0..trajectory.len()).rev() {
            let EpisodeEvent { s, a, r } = trajectory[t];
            g = cfg.gamma * g + r;
            if !is_first_visit(&trajectory, t) {
                continue;
            }

            let (si, ai) = (s as usize, a as usize);
            counts[[si, ai]] += 1.0;
            q[[si, ai]] += (g - q[[si, ai]]) / counts[[si, ai]];
            pi[si] = greedy_action(&q, s, &env.actions(s));
        }
    }

    Ok((GreedyPolicy::new(pi), q))
}

/// Off-policy Monte Carlo control via weighted importance sampling -
/// Sutton & Barto 2018, §5.7.
///
/// Episodes come from a uniform behavior policy over each state's legal
/// actions while Q converges toward the greedy target policy. The backward
/// pass keeps a cumulative weight W, resets it to 1 each episode, and stops
/// at the first step whose action diverges from the current greedy action -
/// beyond that point W carries no information about the target policy.
pub fn off_policy_mc_control<E: SampleEnv>(
    env: &mut E,
    cfg: &SolverConfig,
    rng: &mut StdRng,
) -> Result<(GreedyPolicy, QTable)> {
    let (n_s, n_a) = (env.n_s(), env.n_a());
    let mut q: QTable = Array2::from_shape_fn((n_s, n_a), |_| rng.gen());
    let mut c = Array2::<Continous>::zeros((n_s, n_a));
    let mut pi: Vec<Option<Discrete>> = (0..n_s as Discrete)
        .map(|s| greedy_action(&q, s, &env.actions(s)))
        .collect();

    for _ in 0..cfg.episodes {
        env.reset(rng);
        let trajectory = sample_episode(env, cfg.max_steps, rng, |env, s, rng| {
            let legal = env.actions(s);
            if legal.is_empty() {
                return Err(RlError::EmptyActionSet { state: s });
            }
            Ok(legal[rng.gen_range(0..legal.len())])
        })?;

        let mut g = 0.0;
        let mut w = 1.0;
        for t in (0..trajectory.len()).rev() {
            let EpisodeEvent { s, a, r } = trajectory[t];
            g = cfg.gamma * g + r;

            let (si, ai) = (s as usize, a as usize);
            c[[si, ai]] += w;
            q[[si, ai]] += (w / c[[si, ai]]) * (g - q[[si, ai]]);

            let legal = env.actions(s);
            pi[si] = greedy_action(&q, s, &legal);
            if pi[si] != Some(a) {
                break;
            }
            // Uniform behavior: 1 / b(a|s) is the legal-action count.
            w *= legal.len() as Continous;
        }
    }

    Ok((GreedyPolicy::new(pi), q))
}
