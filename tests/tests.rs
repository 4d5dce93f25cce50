use std::cell::Cell;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;

use gravsim::simulation::error::{InvalidBodyReason, SimError};
use gravsim::simulation::forces::{force_between, ForceLaw, ForceSet};
use gravsim::simulation::params::{Parameters, G};
use gravsim::simulation::states::{total_momentum, Body, NVec2, Scenario};
use gravsim::{Engine, Never, NoProgress, RandomConfig, RunStatus};

/// Build a body, panicking on invalid input
pub fn body(name: &str, m: f64, x: [f64; 2], v: [f64; 2]) -> Body {
    Body::new(name, m, x.into(), v.into()).unwrap()
}

/// Two bodies separated along the x-axis, symmetric about the origin, at rest
pub fn two_body_scenario(dist: f64, m1: f64, m2: f64) -> Scenario {
    let b1 = body("a", m1, [-dist / 2.0, 0.0], [0.0, 0.0]);
    let b2 = body("b", m2, [dist / 2.0, 0.0], [0.0, 0.0]);
    Scenario::new(vec![b1, b2], Scenario::DEFAULT_SCALE).unwrap()
}

/// Run a scenario to the end with no observer
pub fn run(scenario: Scenario, t_end: f64, steps: usize) -> Vec<Body> {
    Engine::new(Parameters::new(t_end, steps)).unwrap().run_to_end(scenario).unwrap()
}

fn distance(a: NVec2, b: NVec2) -> f64 {
    (b - a).norm()
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let s = two_body_scenario(1.0e9, 2.0e24, 3.0e24);
    let f12 = force_between(&s.bodies[0], &s.bodies[1], G).unwrap();
    let f21 = force_between(&s.bodies[1], &s.bodies[0], G).unwrap();

    assert_eq!(f12, -f21, "forces not equal and opposite");
}

#[test]
fn gravity_points_toward_other_body() {
    let s = two_body_scenario(2.0e9, 1.0e24, 1.0e24);
    let f = force_between(&s.bodies[0], &s.bodies[1], G).unwrap();
    let dx = s.bodies[1].position - s.bodies[0].position;

    assert!(f.dot(&dx) > 0.0, "force is not toward second body");
}

#[test]
fn gravity_matches_newton_magnitude() {
    let s = two_body_scenario(3.844e8, 5.972e24, 7.342e22);
    let f = force_between(&s.bodies[0], &s.bodies[1], G).unwrap();
    let expected = G * 5.972e24 * 7.342e22 / (3.844e8 * 3.844e8);

    assert!((f.norm() - expected).abs() / expected < 1e-12, "got {}, expected {}", f.norm(), expected);
}

#[test]
fn gravity_inverse_square_law() {
    let r = two_body_scenario(1.0e9, 1.0e24, 1.0e24);
    let r2 = two_body_scenario(2.0e9, 1.0e24, 1.0e24);

    let f_r = force_between(&r.bodies[0], &r.bodies[1], G).unwrap();
    let f_2r = force_between(&r2.bodies[0], &r2.bodies[1], G).unwrap();
    let ratio = f_r.norm() / f_2r.norm();

    assert!((ratio - 4.0).abs() < 1e-9, "Expected ~4x, got {}", ratio);
}

#[test]
fn gravity_rejects_zero_separation() {
    let a = body("a", 1.0, [5.0, 5.0], [0.0, 0.0]);
    let b = body("b", 1.0, [5.0, 5.0], [1.0, 0.0]);

    match force_between(&a, &b, G) {
        Err(SimError::InvalidBody { bodies, reason }) => {
            assert_eq!(bodies, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(reason, InvalidBodyReason::Coincident);
        }
        other => panic!("expected InvalidBody, got {:?}", other),
    }
}

#[test]
fn force_set_sums_all_other_bodies() {
    let bodies = vec![
        body("left", 1.0e24, [-1.0e9, 0.0], [0.0, 0.0]),
        body("mid", 1.0e24, [0.0, 0.0], [0.0, 0.0]),
        body("right", 1.0e24, [1.0e9, 0.0], [0.0, 0.0]),
    ];
    let mut out = vec![NVec2::zeros(); 3];
    ForceSet::gravity(G).accumulate_forces(&bodies, &mut out).unwrap();

    // the middle body is pulled equally both ways
    assert!(out[1].norm() < 1e-6 * out[0].norm());
    assert!(out[0].x > 0.0 && out[2].x < 0.0);
    assert_eq!(out[0], -out[2]);
}

/// Net forces through the force set (rayon across bodies with the
/// `parallel` feature) must equal a plain sequential per-body sum
#[test]
fn net_forces_match_sequential_pairwise_sum() {
    let s = Scenario::preset("Sol (moons)", 1.0e12).unwrap();
    let bodies = run(s, 1.0e6, 20);

    let mut out = vec![NVec2::zeros(); bodies.len()];
    ForceSet::gravity(G).accumulate_forces(&bodies, &mut out).unwrap();

    for (i, bi) in bodies.iter().enumerate() {
        let mut expected = NVec2::zeros();
        for (j, bj) in bodies.iter().enumerate() {
            if i != j {
                expected += force_between(bi, bj, G).unwrap();
            }
        }
        assert_eq!(out[i], expected, "net force on {} differs", bi.name);
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_runs_are_bit_identical() {
    let a = run(Scenario::preset("Sol (moons)", 1.0e12).unwrap(), 1.0e7, 500);
    let b = run(Scenario::preset("Sol (moons)", 1.0e12).unwrap(), 1.0e7, 500);
    assert_eq!(a, b);

    // final Earth state of the same run without the feature
    let earth = a.iter().find(|b| b.name == "Earth").unwrap();
    assert_eq!(earth.position, NVec2::new(-61665688338.62278, 136064709860.79692));
}

// ==================================================================================
// Body / scenario invariants
// ==================================================================================

#[test]
fn body_rejects_non_positive_mass() {
    for m in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = Body::new("bad", m, NVec2::zeros(), NVec2::zeros()).unwrap_err();
        assert!(
            matches!(err, SimError::InvalidBody { ref bodies, .. } if bodies == &vec!["bad".to_string()]),
            "mass {m} gave {err:?}"
        );
    }
}

#[test]
fn body_trajectory_seeded_with_initial_state() {
    let b = body("p", 1.0, [1.0, 2.0], [3.0, 4.0]);
    assert_eq!(b.trajectory().len(), 1);
    assert_eq!(b.trajectory()[0].position, NVec2::new(1.0, 2.0));
    assert_eq!(b.trajectory()[0].velocity, NVec2::new(3.0, 4.0));
}

#[test]
fn scenario_rejects_coincident_bodies() {
    let bodies = vec![
        body("star", 2.0e30, [0.0, 0.0], [0.0, 0.0]),
        body("x", 1.0e20, [1.0e9, 2.0e9], [0.0, 0.0]),
        body("y", 1.0e20, [1.0e9, 2.0e9], [5.0, 0.0]),
    ];
    match Scenario::new(bodies, 1.0) {
        Err(SimError::InvalidBody { bodies, reason }) => {
            assert_eq!(bodies, vec!["x".to_string(), "y".to_string()]);
            assert_eq!(reason, InvalidBodyReason::Coincident);
        }
        other => panic!("expected InvalidBody, got {:?}", other),
    }
}

#[test]
fn scenario_rejects_empty_body_list() {
    assert!(matches!(Scenario::new(Vec::new(), 1.0), Err(SimError::EmptyScenario)));
}

#[test]
fn randomized_scenario_respects_bounds() {
    let cfg = RandomConfig {
        seed: Some(3),
        count: 20,
        ..RandomConfig::default()
    };
    let s = Scenario::randomized(&cfg, 1.0e12, &mut cfg.rng()).unwrap();

    assert_eq!(s.bodies.len(), 21);
    let star = &s.bodies[0];
    assert_eq!(star.name, "star");
    assert_eq!(star.mass, cfg.star_mass);
    assert_eq!(star.position, NVec2::zeros());
    assert_eq!(star.velocity, NVec2::zeros());

    for (i, b) in s.bodies[1..].iter().enumerate() {
        assert_eq!(b.name, (i + 1).to_string());
        assert!(b.mass >= cfg.m_min && b.mass <= cfg.m_max);
        assert!(b.position.x.abs() <= cfg.position && b.position.y.abs() <= cfg.position);
        assert!(b.velocity.x.abs() <= cfg.velocity && b.velocity.y.abs() <= cfg.velocity);
        assert_eq!(b.trajectory().len(), 1);
    }
}

#[test]
fn randomized_scenario_reproducible_with_seed() {
    let cfg = RandomConfig {
        seed: Some(42),
        ..RandomConfig::default()
    };
    let a = Scenario::randomized(&cfg, 1.0, &mut cfg.rng()).unwrap();
    let b = Scenario::randomized(&cfg, 1.0, &mut cfg.rng()).unwrap();
    assert_eq!(a.bodies, b.bodies);

    let other = RandomConfig {
        seed: Some(43),
        ..RandomConfig::default()
    };
    let c = Scenario::randomized(&other, 1.0, &mut other.rng()).unwrap();
    assert_ne!(a.bodies, c.bodies);
}

#[test]
fn randomized_scenario_rejects_bad_bounds() {
    let cfg = RandomConfig {
        m_min: 1.0e23,
        m_max: 1.0e21,
        seed: Some(1),
        ..RandomConfig::default()
    };
    assert!(matches!(
        Scenario::randomized(&cfg, 1.0, &mut cfg.rng()),
        Err(SimError::InvalidParameters(_))
    ));
}

#[test]
fn randomized_scenario_rejects_huge_count() {
    let cfg = RandomConfig {
        count: usize::MAX,
        seed: Some(1),
        ..RandomConfig::default()
    };
    assert!(matches!(
        Scenario::randomized(&cfg, 1.0, &mut cfg.rng()),
        Err(SimError::InvalidParameters(_))
    ));
}

#[test]
fn randomized_scenario_rejects_zero_position_bound() {
    let cfg = RandomConfig {
        position: 0.0,
        seed: Some(1),
        ..RandomConfig::default()
    };
    assert!(matches!(
        Scenario::randomized(&cfg, 1.0, &mut cfg.rng()),
        Err(SimError::InvalidParameters(_))
    ));

    // a lone star needs no position bound
    let star_only = RandomConfig { count: 0, ..cfg };
    let s = Scenario::randomized(&star_only, 1.0, &mut star_only.rng()).unwrap();
    assert_eq!(s.bodies.len(), 1);
}

// ==================================================================================
// Integrator / driver tests
// ==================================================================================

#[test]
fn run_yields_steps_plus_one_samples() {
    let s = Scenario::preset("Sol", 1.0e12).unwrap();
    let n = s.bodies.len();
    let bodies = run(s, 3.0e7, 137);

    assert_eq!(bodies.len(), n);
    for b in &bodies {
        assert_eq!(b.trajectory().len(), 138, "{} has wrong sample count", b.name);
        let last = b.trajectory().last().unwrap();
        assert_eq!(last.position, b.position);
        assert_eq!(last.velocity, b.velocity);
    }
}

#[test]
fn lone_body_drifts_in_straight_line() {
    let s = Scenario::new(vec![body("solo", 1.0, [0.0, 0.0], [2.0, -1.0])], 1.0).unwrap();
    let bodies = run(s, 10.0, 10);

    let b = &bodies[0];
    assert_eq!(b.velocity, NVec2::new(2.0, -1.0));
    assert!((b.position - NVec2::new(20.0, -10.0)).norm() < 1e-12);
}

#[test]
fn single_step_uses_updated_velocity_for_position() {
    let mut bodies = vec![
        body("star", 2.0e30, [0.0, 0.0], [0.0, 0.0]),
        body("p", 1.0, [1.0e11, 0.0], [0.0, 1.0e4]),
    ];
    let dt = 1000.0;
    let forces = ForceSet::gravity(G);
    let mut buf = Vec::new();

    let f = force_between(&bodies[1], &bodies[0], G).unwrap();
    gravsim::semi_implicit_euler(&mut bodies, &forces, &mut buf, dt, 1).unwrap();

    let v_new = NVec2::new(0.0, 1.0e4) + f / 1.0 * dt;
    let x_new = NVec2::new(1.0e11, 0.0) + v_new * dt;
    assert_eq!(bodies[1].velocity, v_new);
    assert_eq!(bodies[1].position, x_new);
}

#[test]
fn forces_use_start_of_step_state() {
    // Reversing body order must not change the outcome: every force in a step
    // sees only the state from before the step
    let make = || {
        vec![
            body("a", 1.0e22, [0.0, 0.0], [0.0, 0.0]),
            body("b", 1.0e22, [1.0e8, 0.0], [0.0, 10.0]),
            body("c", 1.0e22, [0.0, 1.0e8], [-10.0, 0.0]),
        ]
    };
    let forward = run(Scenario::new(make(), 1.0).unwrap(), 1.0e5, 50);
    let mut rev = make();
    rev.reverse();
    let backward = run(Scenario::new(rev, 1.0).unwrap(), 1.0e5, 50);

    for b in &forward {
        let other = backward.iter().find(|o| o.name == b.name).unwrap();
        let d = (b.position - other.position).norm();
        assert!(d <= 1e-6 * b.position.norm().max(1.0), "{} diverged by {}", b.name, d);
    }
}

#[test]
fn symmetric_pair_obeys_third_law_every_step() {
    let s = two_body_scenario(1.0e9, 5.0e24, 5.0e24);
    let bodies = run(s, 1.0e5, 200);

    for (sa, sb) in bodies[0].trajectory().iter().zip(bodies[1].trajectory()) {
        let a = Body::new("a", 5.0e24, sa.position, sa.velocity).unwrap();
        let b = Body::new("b", 5.0e24, sb.position, sb.velocity).unwrap();
        let fab = force_between(&a, &b, G).unwrap();
        let fba = force_between(&b, &a, G).unwrap();
        assert!((fab + fba).norm() <= 1e-12 * fab.norm(), "third law broken: {:?} vs {:?}", fab, fba);
        assert!((sa.position + sb.position).norm() <= 1e-6, "pair lost symmetry");
    }
}

#[test]
fn circular_orbit_closes_after_one_period() {
    let m_star = 2.0e30;
    let r = 1.496e11;
    let v = (G * m_star / r).sqrt();
    let period = 2.0 * std::f64::consts::PI * (r * r * r / (G * m_star)).sqrt();

    let s = Scenario::new(
        vec![
            body("star", m_star, [0.0, 0.0], [0.0, 0.0]),
            body("planet", 1.0, [r, 0.0], [0.0, v]),
        ],
        1.0e12,
    )
    .unwrap();
    let bodies = run(s, period, 10_000);

    let star = &bodies[0];
    let planet = &bodies[1];
    for (sp, ss) in planet.trajectory().iter().zip(star.trajectory()) {
        let d = distance(ss.position, sp.position);
        assert!((d - r).abs() / r < 1e-3, "radius drifted to {}", d);
    }
    let end = planet.trajectory().last().unwrap().position;
    assert!(distance(end, NVec2::new(r, 0.0)) / r < 1e-3, "orbit did not close: {:?}", end);
}

#[test]
fn earth_moon_orbit_stays_bound() {
    let s = Scenario::new(
        vec![
            body("earth", 5.972e24, [0.0, 0.0], [0.0, 0.0]),
            body("moon", 7.342e22, [3.844e8, 0.0], [0.0, 1022.0]),
        ],
        1.0e9,
    )
    .unwrap();
    let bodies = run(s, 27.3 * 24.0 * 3600.0, 100);

    for (se, sm) in bodies[0].trajectory().iter().zip(bodies[1].trajectory()) {
        let d = distance(se.position, sm.position);
        assert!((d - 3.844e8).abs() / 3.844e8 < 0.05, "moon separation {} out of range", d);
    }
}

#[test]
fn momentum_conserved() {
    let s = Scenario::preset("Sol", 1.0e12).unwrap();
    let p0 = s.total_momentum();
    let scale: f64 = s.bodies.iter().map(|b| b.momentum().norm()).sum();

    let bodies = run(s, gravsim::years_to_seconds(2.0), 2000);
    let p1 = total_momentum(&bodies);

    assert!((p1 - p0).norm() / scale < 1e-9, "momentum drifted: {:?} -> {:?}", p0, p1);
}

#[test]
fn identical_runs_are_bit_identical() {
    let a = run(Scenario::preset("Sol (moons)", 1.0e12).unwrap(), 1.0e7, 300);
    let b = run(Scenario::preset("Sol (moons)", 1.0e12).unwrap(), 1.0e7, 300);
    assert_eq!(a, b);
}

#[test]
fn engine_rejects_invalid_parameters() {
    assert!(matches!(Engine::new(Parameters::new(1.0, 0)), Err(SimError::InvalidParameters(_))));
    assert!(matches!(Engine::new(Parameters::new(0.0, 10)), Err(SimError::InvalidParameters(_))));
    assert!(matches!(Engine::new(Parameters::new(f64::NAN, 10)), Err(SimError::InvalidParameters(_))));
}

#[test]
fn dt_is_duration_over_steps() {
    let p = Parameters::new(100.0, 8);
    assert_eq!(p.dt(), 12.5);
}

#[test]
fn progress_is_monotone_and_ends_at_one() {
    for steps in [7, 250, 5000] {
        let mut seen = Vec::new();
        let engine = Engine::new(Parameters::new(1.0e6, steps)).unwrap();
        let run = engine
            .run(two_body_scenario(1.0e9, 1.0e20, 1.0e20), &mut |f: f64| seen.push(f), &Never)
            .unwrap();

        assert!(run.is_complete());
        assert!(!seen.is_empty() && seen.len() <= 1000, "{} reports", seen.len());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards");
        assert!(seen.iter().all(|f| (0.0..=1.0).contains(f)));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }
}

#[test]
fn progress_through_channel() {
    let (tx, rx) = mpsc::channel();
    let mut tx = tx;
    let engine = Engine::new(Parameters::new(1.0e6, 100)).unwrap();
    engine.run(two_body_scenario(1.0e9, 1.0e20, 1.0e20), &mut tx, &Never).unwrap();
    drop(tx);

    let seen: Vec<f64> = rx.iter().collect();
    assert_eq!(seen.len(), 100);
    assert_eq!(*seen.last().unwrap(), 1.0);
}

#[test]
fn cancelled_run_keeps_recorded_samples() {
    let checks = Cell::new(0);
    let cancel = || {
        checks.set(checks.get() + 1);
        checks.get() > 10
    };
    let engine = Engine::new(Parameters::new(1.0e6, 100)).unwrap();
    let run = engine.run(two_body_scenario(1.0e9, 1.0e20, 1.0e20), &mut NoProgress, &cancel).unwrap();

    assert_eq!(run.status, RunStatus::Cancelled);
    assert_eq!(run.steps_completed, 10);
    for b in &run.bodies {
        assert_eq!(b.trajectory().len(), 11);
    }
}

#[test]
fn cancel_flag_before_start_runs_no_steps() {
    let flag = AtomicBool::new(true);
    let engine = Engine::new(Parameters::new(1.0e6, 100)).unwrap();
    let run = engine.run(two_body_scenario(1.0e9, 1.0e20, 1.0e20), &mut NoProgress, &flag).unwrap();

    assert_eq!(run.status, RunStatus::Cancelled);
    assert_eq!(run.steps_completed, 0);
    assert!(run.bodies.iter().all(|b| b.trajectory().len() == 1));
}

/// Force law that blows up, standing in for a divergent close encounter
struct Divergent;

impl ForceLaw for Divergent {
    fn accumulate(&self, _bodies: &[Body], out: &mut [NVec2]) -> Result<(), SimError> {
        out[0] += NVec2::new(f64::INFINITY, 0.0);
        Ok(())
    }
}

#[test]
fn non_finite_state_is_numerical_instability() {
    let forces = ForceSet::gravity(G).with(Divergent);
    let engine = Engine::with_forces(Parameters::new(1.0e6, 100), forces).unwrap();

    match engine.run(two_body_scenario(1.0e9, 1.0e20, 1.0e20), &mut NoProgress, &Never) {
        Err(SimError::NumericalInstability { body, step }) => {
            assert_eq!(body, "a");
            assert_eq!(step, 1);
        }
        other => panic!("expected NumericalInstability, got {:?}", other),
    }
}
