use float_eq::*;
use rand::prelude::*;
use std::rc::Rc;
use tabular_rl::envs::grid_world::{DOWN, LEFT, RIGHT, UP};
use tabular_rl::*;

fn manhattan(a: (usize, usize), b: (usize, usize)) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

fn moved(cell: (usize, usize), action: Discrete) -> (i32, i32) {
    let (r, c) = (cell.0 as i32, cell.1 as i32);
    match action {
        UP => (r - 1, c),
        DOWN => (r + 1, c),
        LEFT => (r, c - 1),
        RIGHT => (r, c + 1),
        a => panic!("unknown action {a}"),
    }
}

#[test]
fn dyna_q_reaches_a_goal_monotone_policy_within_200_episodes() {
    let goal = (2, 2);
    let mut env = GridWorld::new(3, 3, (0, 0), &[], &[(goal, 1.0)]);
    let rng = &mut StdRng::seed_from_u64(2718);
    let cfg = SolverConfig {
        gamma: 0.9,
        alpha: 0.1,
        epsilon: 0.1,
        episodes: 200,
        planning_steps: 10,
        ..Default::default()
    };

    let (pi, _) = dyna_q(&mut env, &cfg, rng).unwrap();

    // Every non-terminal state's greedy action must step strictly closer
    // to the goal.
    for s in 0..env.n_s() as Discrete {
        let cell = env.cell(s);
        if cell == goal {
            assert_eq!(pi.action(s), None);
            continue;
        }
        let a = pi.action(s).unwrap();
        let (nr, nc) = moved(cell, a);
        assert!((0..3).contains(&nr) && (0..3).contains(&nc), "{cell:?} walks off the grid");
        let next = (nr as usize, nc as usize);
        assert!(
            manhattan(next, goal) < manhattan(cell, goal),
            "{cell:?} -> {next:?} does not approach the goal"
        );
    }
}

#[test]
fn dp_avoids_the_trap_on_the_default_grid() {
    // Default world: -3 trap at (0, 4), +1 goal at (4, 4).
    let env = Rc::new(GridWorld::default());
    let (pi, v) = policy_iteration(Rc::clone(&env) as Rc<dyn ModelEnv>, &SolverConfig::default())
        .unwrap();

    // The cell next to the trap must not step into it.
    let beside_trap = env.index((0, 3));
    assert_ne!(pi.action(beside_trap), Some(RIGHT));

    // Values rise along the optimal path toward the goal.
    assert!(v[env.index((4, 3)) as usize] > v[env.index((0, 0)) as usize]);
    assert_float_eq!(v[env.index((4, 4)) as usize], 0.0, abs <= 1e-12);
}

#[test]
fn td_and_planning_agree_on_the_small_grid() {
    let goal = (2, 2);
    let build = || GridWorld::new(3, 3, (0, 0), &[], &[(goal, 1.0)]);
    let cfg = SolverConfig {
        gamma: 0.9,
        episodes: 2_000,
        ..Default::default()
    };

    let (pi_q, _) = q_learning(&mut build(), &cfg, &mut StdRng::seed_from_u64(11)).unwrap();
    let (pi_d, _) = dyna_q(&mut build(), &cfg, &mut StdRng::seed_from_u64(12)).unwrap();

    let env = build();
    for s in 0..env.n_s() as Discrete {
        let cell = env.cell(s);
        if cell == goal {
            continue;
        }
        // Both must walk closer to the goal; the exact action may differ
        // when two moves are equally good.
        for pi in [&pi_q, &pi_d] {
            let (nr, nc) = moved(cell, pi.action(s).unwrap());
            assert!(manhattan((nr as usize, nc as usize), goal) < manhattan(cell, goal));
        }
    }
}
