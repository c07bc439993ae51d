use super::{EnvSpace, ExploringStarts, ModelEnv, SampleEnv};
use crate::common::defs::{Transition, Transitions};
use crate::error::{Result, RlError};
use crate::{Continous, Discrete};
use rand::rngs::StdRng;
use std::rc::Rc;

pub const LEFT: Discrete = 0;
pub const RIGHT: Discrete = 1;

/// A line of `length` cells with terminal cells at both ends. Entering the
/// left end pays -1, entering the right end pays +1, every other move pays
/// nothing. Episodes start in the middle.
pub struct LineWorld {
    length: usize,
    start: Discrete,
    pos: Discrete,
    transitions: Rc<Transitions>,
}

impl LineWorld {
    pub fn new(length: usize) -> Self {
        assert!(length >= 3, "line world needs two ends and a middle");

        let start = (length / 2) as Discrete;
        let mut transitions = Transitions::new();
        for s in 1..(length - 1) as Discrete {
            for a in [LEFT, RIGHT] {
                let (next_state, reward) = Self::transition(length, s, a);
                transitions.insert(
                    (s, a),
                    vec![Transition {
                        probability: 1.0,
                        next_state,
                        reward,
                    }],
                );
            }
        }

        Self {
            length,
            start,
            pos: start,
            transitions: Rc::new(transitions),
        }
    }

    fn transition(length: usize, s: Discrete, a: Discrete) -> (Discrete, Continous) {
        let next = if a == LEFT {
            (s - 1).max(0)
        } else {
            (s + 1).min(length as Discrete - 1)
        };
        let reward = if next == 0 {
            -1.0
        } else if next == length as Discrete - 1 {
            1.0
        } else {
            0.0
        };
        (next, reward)
    }
}

impl Default for LineWorld {
    fn default() -> Self {
        Self::new(5)
    }
}

impl EnvSpace for LineWorld {
    fn n_s(&self) -> usize {
        self.length
    }

    fn n_a(&self) -> usize {
        2
    }

    fn actions(&self, s: Discrete) -> Vec<Discrete> {
        if self.is_terminal(s) {
            vec![]
        } else {
            vec![LEFT, RIGHT]
        }
    }
}

impl ModelEnv for LineWorld {
    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn is_terminal(&self, s: Discrete) -> bool {
        s == 0 || s == self.length as Discrete - 1
    }
}

impl SampleEnv for LineWorld {
    fn reset(&mut self, _rng: &mut StdRng) -> Discrete {
        self.pos = self.start;
        self.pos
    }

    fn state(&self) -> Discrete {
        self.pos
    }

    fn step(&mut self, action: Discrete, _rng: &mut StdRng) -> (Discrete, Continous) {
        let (next, reward) = Self::transition(self.length, self.pos, action);
        self.pos = next;
        (next, reward)
    }

    fn is_over(&self) -> bool {
        self.is_terminal(self.pos)
    }
}

impl ExploringStarts for LineWorld {
    fn reset_to(&mut self, s: Discrete, _rng: &mut StdRng) -> Result<Discrete> {
        if s < 0 || s >= self.length as Discrete {
            return Err(RlError::UnsupportedStart { state: s });
        }
        self.pos = s;
        Ok(self.pos)
    }
}
