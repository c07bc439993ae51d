use super::{EnvSpace, SampleEnv};
use crate::{Continous, Discrete};
use rand::prelude::*;

pub const KEEP: Discrete = 0;
pub const SWITCH: Discrete = 1;

/// Three-door Monty Hall as a two-phase episodic game.
///
/// From the start state the action picks a door (0..3). The host then opens
/// a losing door the player did not pick, landing in one of six reveal
/// states (picked, opened). There the action keeps the picked door or
/// switches to the remaining one; winning pays 1. The winning door is hidden
/// environment state, resampled from the caller's rng each episode - which
/// is why this environment offers live stepping but no arbitrary-state
/// reset: a reveal state alone does not determine the hidden door.
///
/// State indices: 0 = start, 1..=6 = reveal states, 7 = lost, 8 = won.
pub struct MontyHall {
    winning: Discrete,
    state: Discrete,
}

impl MontyHall {
    pub fn new() -> Self {
        Self {
            winning: 0,
            state: 0,
        }
    }

    /// Index of the reveal state where `picked` is held and `opened` is out.
    pub fn reveal_state(picked: Discrete, opened: Discrete) -> Discrete {
        debug_assert!(picked != opened);
        1 + picked * 2 + if opened > picked { opened - 1 } else { opened }
    }

    fn decode_reveal(s: Discrete) -> (Discrete, Discrete) {
        let picked = (s - 1) / 2;
        let k = (s - 1) % 2;
        let opened = if k >= picked { k + 1 } else { k };
        (picked, opened)
    }
}

impl Default for MontyHall {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvSpace for MontyHall {
    fn n_s(&self) -> usize {
        9
    }

    fn n_a(&self) -> usize {
        3
    }

    fn actions(&self, s: Discrete) -> Vec<Discrete> {
        match s {
            0 => vec![0, 1, 2],
            1..=6 => vec![KEEP, SWITCH],
            _ => vec![],
        }
    }
}

impl SampleEnv for MontyHall {
    fn reset(&mut self, rng: &mut StdRng) -> Discrete {
        self.winning = rng.gen_range(0..3);
        self.state = 0;
        self.state
    }

    fn state(&self) -> Discrete {
        self.state
    }

    fn step(&mut self, action: Discrete, rng: &mut StdRng) -> (Discrete, Continous) {
        match self.state {
            0 => {
                let picked = action;
                let candidates: Vec<Discrete> = (0..3)
                    .filter(|&d| d != picked && d != self.winning)
                    .collect();
                let opened = candidates[rng.gen_range(0..candidates.len())];
                self.state = Self::reveal_state(picked, opened);
                (self.state, 0.0)
            }
            1..=6 => {
                let (picked, opened) = Self::decode_reveal(self.state);
                let final_choice = if action == KEEP {
                    picked
                } else {
                    3 - picked - opened
                };
                self.state = if final_choice == self.winning { 8 } else { 7 };
                let reward = if final_choice == self.winning { 1.0 } else { 0.0 };
                (self.state, reward)
            }
            s => (s, 0.0),
        }
    }

    fn is_over(&self) -> bool {
        self.state >= 7
    }
}
