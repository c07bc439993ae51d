use super::{EnvSpace, ExploringStarts, ModelEnv, SampleEnv};
use crate::common::defs::{Transition, Transitions};
use crate::error::{Result, RlError};
use crate::{Continous, Discrete};
use itertools::iproduct;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub const UP: Discrete = 0;
pub const DOWN: Discrete = 1;
pub const LEFT: Discrete = 2;
pub const RIGHT: Discrete = 3;

const MOVES: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Rectangular grid with optional walls and a set of terminal cells, each
/// carrying the reward paid on entering it. Moves that would leave the grid
/// or hit a wall keep the agent in place. Cells are (row, col).
pub struct GridWorld {
    width: usize,
    height: usize,
    start: (usize, usize),
    walls: HashSet<(usize, usize)>,
    rewards: HashMap<(usize, usize), Continous>,
    states: Vec<(usize, usize)>,
    index_of: HashMap<(usize, usize), Discrete>,
    pos: (usize, usize),
    transitions: Rc<Transitions>,
}

impl GridWorld {
    pub fn new(
        width: usize,
        height: usize,
        start: (usize, usize),
        walls: &[(usize, usize)],
        terminals: &[((usize, usize), Continous)],
    ) -> Self {
        let walls: HashSet<_> = walls.iter().copied().collect();
        assert!(!walls.contains(&start), "start cell cannot be a wall");

        let states: Vec<_> = iproduct!(0..height, 0..width)
            .filter(|cell| !walls.contains(cell))
            .collect();
        let index_of: HashMap<_, _> = states
            .iter()
            .enumerate()
            .map(|(i, &cell)| (cell, i as Discrete))
            .collect();
        let rewards: HashMap<_, _> = terminals.iter().copied().collect();

        let mut env = Self {
            width,
            height,
            start,
            walls,
            rewards,
            states,
            index_of,
            pos: start,
            transitions: Rc::new(Transitions::new()),
        };
        env.transitions = Rc::new(env.build_transitions());
        env
    }

    fn build_transitions(&self) -> Transitions {
        let mut transitions = Transitions::new();
        for (i, &cell) in self.states.iter().enumerate() {
            if self.terminal_cell(cell) {
                continue;
            }
            for a in 0..MOVES.len() as Discrete {
                let (next, reward) = self.transition(cell, a);
                transitions.insert(
                    (i as Discrete, a),
                    vec![Transition {
                        probability: 1.0,
                        next_state: self.index_of[&next],
                        reward,
                    }],
                );
            }
        }
        transitions
    }

    fn terminal_cell(&self, cell: (usize, usize)) -> bool {
        self.rewards.contains_key(&cell)
    }

    fn transition(&self, cell: (usize, usize), action: Discrete) -> ((usize, usize), Continous) {
        let (dx, dy) = MOVES[action as usize];
        let nx = cell.0 as i32 + dx;
        let ny = cell.1 as i32 + dy;

        let next = if nx >= 0
            && (nx as usize) < self.height
            && ny >= 0
            && (ny as usize) < self.width
            && !self.walls.contains(&(nx as usize, ny as usize))
        {
            (nx as usize, ny as usize)
        } else {
            cell
        };

        (next, self.rewards.get(&next).copied().unwrap_or(0.0))
    }

    /// The (row, col) cell behind a state index.
    pub fn cell(&self, s: Discrete) -> (usize, usize) {
        self.states[s as usize]
    }

    /// The state index of a (row, col) cell.
    pub fn index(&self, cell: (usize, usize)) -> Discrete {
        self.index_of[&cell]
    }
}

impl Default for GridWorld {
    /// The 5x5 world used throughout the tests: start in the top-left
    /// corner, a -3 trap at (0, 4) and a +1 goal at (4, 4).
    fn default() -> Self {
        Self::new(5, 5, (0, 0), &[], &[((0, 4), -3.0), ((4, 4), 1.0)])
    }
}

impl EnvSpace for GridWorld {
    fn n_s(&self) -> usize {
        self.states.len()
    }

    fn n_a(&self) -> usize {
        MOVES.len()
    }

    fn actions(&self, s: Discrete) -> Vec<Discrete> {
        if self.terminal_cell(self.cell(s)) {
            vec![]
        } else {
            (0..MOVES.len() as Discrete).collect()
        }
    }
}

impl ModelEnv for GridWorld {
    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn is_terminal(&self, s: Discrete) -> bool {
        self.terminal_cell(self.cell(s))
    }
}

impl SampleEnv for GridWorld {
    fn reset(&mut self, _rng: &mut StdRng) -> Discrete {
        self.pos = self.start;
        self.index_of[&self.pos]
    }

    fn state(&self) -> Discrete {
        self.index_of[&self.pos]
    }

    fn step(&mut self, action: Discrete, _rng: &mut StdRng) -> (Discrete, Continous) {
        let (next, reward) = self.transition(self.pos, action);
        self.pos = next;
        (self.index_of[&next], reward)
    }

    fn is_over(&self) -> bool {
        self.terminal_cell(self.pos)
    }
}

impl ExploringStarts for GridWorld {
    fn reset_to(&mut self, s: Discrete, _rng: &mut StdRng) -> Result<Discrete> {
        if s < 0 || s as usize >= self.states.len() {
            return Err(RlError::UnsupportedStart { state: s });
        }
        self.pos = self.states[s as usize];
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn moves_off_the_grid_keep_the_agent_in_place() {
        let mut env = GridWorld::default();
        let rng = &mut StdRng::seed_from_u64(0);

        let s = env.reset(rng);
        assert_eq!(env.cell(s), (0, 0));

        let (s, r) = env.step(UP, rng);
        assert_eq!(env.cell(s), (0, 0));
        assert_eq!(r, 0.0);

        let (s, r) = env.step(LEFT, rng);
        assert_eq!(env.cell(s), (0, 0));
        assert_eq!(r, 0.0);
    }

    #[test]
    fn entering_a_terminal_cell_pays_its_reward_and_ends_the_episode() {
        let mut env = GridWorld::default();
        let rng = &mut StdRng::seed_from_u64(0);

        env.reset(rng);
        for _ in 0..3 {
            env.step(RIGHT, rng);
        }
        let (s, r) = env.step(RIGHT, rng);
        assert_eq!(env.cell(s), (0, 4));
        assert_eq!(r, -3.0);
        assert!(env.is_over());
        assert!(env.actions(s).is_empty());
    }

    #[test]
    fn walls_are_excluded_from_the_state_set_and_block_moves() {
        let mut env = GridWorld::new(3, 3, (0, 0), &[(1, 1)], &[((2, 2), 1.0)]);
        let rng = &mut StdRng::seed_from_u64(0);

        assert_eq!(env.n_s(), 8);

        env.reset_to(env.index((1, 0)), rng).unwrap();
        let (s, _) = env.step(RIGHT, rng);
        assert_eq!(env.cell(s), (1, 0));
    }

    #[test]
    fn model_covers_every_non_terminal_state_action_pair() {
        let env = GridWorld::default();
        // 25 states, 2 terminal, 4 actions each.
        assert_eq!(env.transitions().len(), 23 * 4);
    }
}
