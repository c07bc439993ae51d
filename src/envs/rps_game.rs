use super::{EnvSpace, ModelEnv, SampleEnv};
use crate::common::defs::{Transition, Transitions};
use crate::{Continous, Discrete};
use itertools::iproduct;
use rand::rngs::StdRng;
use std::rc::Rc;

pub const ROCK: Discrete = 0;
pub const PAPER: Discrete = 1;
pub const SCISSORS: Discrete = 2;

/// Two rounds of rock-paper-scissors against a scripted opponent: rock in
/// round one, then the counter of the player's first throw. Each round pays
/// +1 / 0 / -1. The interesting bit for control algorithms is that the
/// round-one throw determines which round-two throw wins.
///
/// State indices: 0 = before round one, 1..=9 = round-one outcomes
/// (player, opponent), 10 = terminal.
pub struct RpsGame {
    state: Discrete,
    transitions: Rc<Transitions>,
}

const TERMINAL: Discrete = 10;

impl RpsGame {
    pub fn new() -> Self {
        let mut transitions = Transitions::new();
        for p in [ROCK, PAPER, SCISSORS] {
            transitions.insert(
                (0, p),
                vec![Transition {
                    probability: 1.0,
                    next_state: Self::round_one_state(p, ROCK),
                    reward: Self::payoff(p, ROCK),
                }],
            );
        }
        for (p1, e1, a) in iproduct!(
            [ROCK, PAPER, SCISSORS],
            [ROCK, PAPER, SCISSORS],
            [ROCK, PAPER, SCISSORS]
        ) {
            transitions.insert(
                (Self::round_one_state(p1, e1), a),
                vec![Transition {
                    probability: 1.0,
                    next_state: TERMINAL,
                    reward: Self::payoff(a, Self::counter(p1)),
                }],
            );
        }

        Self {
            state: 0,
            transitions: Rc::new(transitions),
        }
    }

    /// Index of the state reached after round one.
    pub fn round_one_state(player: Discrete, opponent: Discrete) -> Discrete {
        1 + player * 3 + opponent
    }

    /// The throw that beats `action`.
    pub fn counter(action: Discrete) -> Discrete {
        (action + 1) % 3
    }

    fn payoff(player: Discrete, opponent: Discrete) -> Continous {
        if player == opponent {
            0.0
        } else if Self::counter(opponent) == player {
            1.0
        } else {
            -1.0
        }
    }

    fn play(&self, s: Discrete, action: Discrete) -> (Discrete, Continous) {
        if s == 0 {
            (
                Self::round_one_state(action, ROCK),
                Self::payoff(action, ROCK),
            )
        } else {
            let p1 = (s - 1) / 3;
            (TERMINAL, Self::payoff(action, Self::counter(p1)))
        }
    }
}

impl Default for RpsGame {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvSpace for RpsGame {
    fn n_s(&self) -> usize {
        11
    }

    fn n_a(&self) -> usize {
        3
    }

    fn actions(&self, s: Discrete) -> Vec<Discrete> {
        if s == TERMINAL {
            vec![]
        } else {
            vec![ROCK, PAPER, SCISSORS]
        }
    }
}

impl ModelEnv for RpsGame {
    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn is_terminal(&self, s: Discrete) -> bool {
        s == TERMINAL
    }
}

impl SampleEnv for RpsGame {
    fn reset(&mut self, _rng: &mut StdRng) -> Discrete {
        self.state = 0;
        self.state
    }

    fn state(&self) -> Discrete {
        self.state
    }

    fn step(&mut self, action: Discrete, _rng: &mut StdRng) -> (Discrete, Continous) {
        let (next, reward) = self.play(self.state, action);
        self.state = next;
        (next, reward)
    }

    fn is_over(&self) -> bool {
        self.state == TERMINAL
    }
}
