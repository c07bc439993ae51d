use crate::{Continous, Discrete};
use thiserror::Error;

/// Contract and model violations surfaced by the solvers.
///
/// Step-cap overruns are deliberately absent: a truncated episode is
/// reported through `tracing` and its partial trajectory is still consumed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlError {
    /// Transition probabilities for a (state, action) pair do not sum to 1.
    #[error("malformed model: transitions for ({state}, {action}) sum to {sum}")]
    MalformedModel {
        state: Discrete,
        action: Discrete,
        sum: Continous,
    },

    /// A transition references a state outside the environment's state set.
    #[error("malformed model: transition for ({state}, {action}) references unknown state {next_state}")]
    UnknownState {
        state: Discrete,
        action: Discrete,
        next_state: Discrete,
    },

    /// A non-terminal state exposed no legal action.
    #[error("no legal action in non-terminal state {state}")]
    EmptyActionSet { state: Discrete },

    /// The environment refused to start an episode from the requested state.
    #[error("environment does not support starting from state {state}")]
    UnsupportedStart { state: Discrete },
}

pub type Result<T> = std::result::Result<T, RlError>;
