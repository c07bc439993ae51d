//! Machinery shared across the solver families: model validation, greedy
//! and ε-soft action selection, policy extraction and policy evaluation.

use crate::common::defs::{GreedyPolicy, Policy, QTable, SoftPolicy, Transitions};
use crate::envs::{EnvSpace, ModelEnv, SampleEnv};
use crate::error::{Result, RlError};
use crate::{Continous, Discrete};
use ndarray::Array2;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

const PROBABILITY_TOLERANCE: Continous = 1e-6;

/// Check the environment's model before the first sweep: every non-terminal
/// state has at least one legal action, every legal (s, a) has transitions
/// whose probabilities sum to 1, and no transition leaves the state set.
pub(crate) fn validate_model<E: ModelEnv + ?Sized>(env: &E) -> Result<std::rc::Rc<Transitions>> {
    let transitions = env.transitions();
    let n_s = env.n_s() as Discrete;

    for s in 0..n_s {
        if env.is_terminal(s) {
            continue;
        }
        let actions = env.actions(s);
        if actions.is_empty() {
            return Err(RlError::EmptyActionSet { state: s });
        }
        for a in actions {
            let ts = transitions
                .get(&(s, a))
                .ok_or(RlError::MalformedModel { state: s, action: a, sum: 0.0 })?;
            let sum: Continous = ts.iter().map(|t| t.probability).sum();
            if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(RlError::MalformedModel { state: s, action: a, sum });
            }
            for t in ts {
                if t.next_state < 0 || t.next_state >= n_s {
                    return Err(RlError::UnknownState {
                        state: s,
                        action: a,
                        next_state: t.next_state,
                    });
                }
            }
        }
    }

    Ok(transitions)
}

/// Expected one-step return of (s, a) under V: Σ p·(r + γ·V(s')).
pub(crate) fn expected_return(
    transitions: &Transitions,
    s: Discrete,
    a: Discrete,
    gamma: Continous,
    v: &[Continous],
) -> Continous {
    transitions[&(s, a)]
        .iter()
        .map(|t| t.probability * (t.reward + gamma * v[t.next_state as usize]))
        .sum()
}

/// Argmax of `value` over `actions`; ties keep the action that enumerates
/// first. `None` when `actions` is empty.
pub(crate) fn greedy_action_by<F>(actions: &[Discrete], mut value: F) -> Option<Discrete>
where
    F: FnMut(Discrete) -> Continous,
{
    let mut best: Option<(Discrete, Continous)> = None;
    for &a in actions {
        let v = value(a);
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((a, v));
        }
    }
    best.map(|(a, _)| a)
}

/// Argmax of Q(s, ·) over the legal actions.
pub(crate) fn greedy_action(q: &QTable, s: Discrete, legal: &[Discrete]) -> Option<Discrete> {
    greedy_action_by(legal, |a| q[[s as usize, a as usize]])
}

/// Max of Q(s, ·) over the legal actions; 0 when there are none, which is
/// how the bootstrap term vanishes past a terminal state.
pub(crate) fn max_q(q: &QTable, s: Discrete, legal: &[Discrete]) -> Continous {
    legal
        .iter()
        .map(|&a| q[[s as usize, a as usize]])
        .fold(0.0, Continous::max)
}

/// The ε-soft distribution over the legal actions of `s`: ε/|A| each plus
/// 1-ε on the greedy action.
pub(crate) fn epsilon_soft_pairs(
    q: &QTable,
    s: Discrete,
    legal: &[Discrete],
    epsilon: Continous,
) -> Vec<(Discrete, Continous)> {
    let greedy = greedy_action(q, s, legal);
    let base = epsilon / legal.len() as Continous;
    legal
        .iter()
        .map(|&a| {
            let p = if Some(a) == greedy {
                1.0 - epsilon + base
            } else {
                base
            };
            (a, p)
        })
        .collect()
}

pub(crate) fn sample_discrete(pairs: &[(Discrete, Continous)], rng: &mut StdRng) -> Discrete {
    let dist = WeightedIndex::new(pairs.iter().map(|(_, p)| *p))
        .expect("action distribution must carry positive mass");
    pairs[dist.sample(rng)].0
}

/// Draw from the ε-greedy policy over Q at `s`. Errors when a non-terminal
/// state exposes no legal action.
pub(crate) fn epsilon_greedy_action<E: EnvSpace + ?Sized>(
    q: &QTable,
    env: &E,
    s: Discrete,
    epsilon: Continous,
    rng: &mut StdRng,
) -> Result<Discrete> {
    let legal = env.actions(s);
    if legal.is_empty() {
        return Err(RlError::EmptyActionSet { state: s });
    }
    Ok(sample_discrete(
        &epsilon_soft_pairs(q, s, &legal, epsilon),
        rng,
    ))
}

/// Extract the deterministic greedy policy from Q, restricted per state to
/// its legal actions.
pub fn greedy_policy_from_q<E: EnvSpace + ?Sized>(q: &QTable, env: &E) -> GreedyPolicy {
    let actions = (0..env.n_s() as Discrete)
        .map(|s| greedy_action(q, s, &env.actions(s)))
        .collect();
    GreedyPolicy::new(actions)
}

/// Build the ε-soft stochastic policy from Q. Rows of terminal states are
/// all-zero.
pub fn epsilon_greedy_policy<E: EnvSpace + ?Sized>(
    q: &QTable,
    env: &E,
    epsilon: Continous,
) -> SoftPolicy {
    let mut probs = Array2::zeros((env.n_s(), env.n_a()));
    for s in 0..env.n_s() as Discrete {
        let legal = env.actions(s);
        if legal.is_empty() {
            continue;
        }
        for (a, p) in epsilon_soft_pairs(q, s, &legal, epsilon) {
            probs[[s as usize, a as usize]] = p;
        }
    }
    SoftPolicy::new(probs)
}

/// Run `episodes` episodes under `policy` and return the mean undiscounted
/// return. Evaluation only - nothing is learned.
pub fn evaluate_policy<E: SampleEnv, P: Policy + ?Sized>(
    env: &mut E,
    policy: &P,
    episodes: usize,
    max_steps: usize,
    rng: &mut StdRng,
) -> Continous {
    let mut total = 0.0;
    for _ in 0..episodes {
        let mut s = env.reset(rng);
        let mut steps = 0;
        while !env.is_over() && steps < max_steps {
            let Some(a) = policy.decide(s, rng) else {
                break;
            };
            let (next, reward) = env.step(a, rng);
            total += reward;
            s = next;
            steps += 1;
        }
    }
    total / episodes as Continous
}
