use bulletsim::simulation::engine::{is_ground_impact, Phase, TrajectorySimulation};
use bulletsim::simulation::error::SimError;
use bulletsim::simulation::params::{Ammunition, EnvironmentConstants, IntegratorSettings, ProjectileParameters};
use bulletsim::simulation::scenario::Scenario;
use bulletsim::simulation::wind::{FixedWind, WindSampler, WindSource};
use bulletsim::configuration::config::ScenarioConfig;
use bulletsim::control::session::{Flow, Session};

use std::path::PathBuf;

/// Simulation set up for `ammo` with a fixed wind
pub fn sim_with(ammo: Ammunition, env: EnvironmentConstants, wind: f64) -> TrajectorySimulation {
    let mut sim = TrajectorySimulation::new(env, IntegratorSettings::default()).unwrap();
    sim.setup_ammo(ammo, &mut FixedWind(wind)).unwrap();
    sim
}

/// No crosswind and no Earth rotation
pub fn calm_env() -> EnvironmentConstants {
    EnvironmentConstants::default().without_coriolis()
}

/// Counts draws so tests can tell whether setup touched the wind source
pub struct CountingWind {
    pub draws: usize,
    pub value: f64,
}

impl WindSource for CountingWind {
    fn draw(&mut self) -> Result<f64, SimError> {
        self.draws += 1;
        Ok(self.value)
    }
}

/// Independent drag-gravity reference: classical RK4 on
/// vx' = -k vx, vy' = -g - k vy with a much finer step
pub fn reference_rk4(y0: [f64; 4], k: f64, g: f64, t_end: f64, n: usize) -> [f64; 4] {
    let f = |s: &[f64; 4]| [s[2], s[3], -k * s[2], -g - k * s[3]];
    let h = t_end / n as f64;
    let mut s = y0;
    for _ in 0..n {
        let k1 = f(&s);
        let s2 = [0, 1, 2, 3].map(|i| s[i] + 0.5 * h * k1[i]);
        let k2 = f(&s2);
        let s3 = [0, 1, 2, 3].map(|i| s[i] + 0.5 * h * k2[i]);
        let k3 = f(&s3);
        let s4 = [0, 1, 2, 3].map(|i| s[i] + h * k3[i]);
        let k4 = f(&s4);
        s = [0, 1, 2, 3].map(|i| s[i] + h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]));
    }
    s
}

// ==================================================================================
// Setup and first step
// ==================================================================================

#[test]
fn first_step_matches_constant_gravity_kinematics() {
    for ammo in Ammunition::ALL {
        let mut sim = sim_with(ammo, EnvironmentConstants::default(), 5.0);
        let start = sim.snapshot();
        let dt = sim.settings.dt;
        let g = sim.environment.gravity;

        let snap = sim.step().unwrap();
        assert!(snap.position.iter().all(|v| v.is_finite()));
        assert!(snap.velocity.iter().all(|v| v.is_finite()));

        let expected_y = start.position.y + start.velocity.y * dt - 0.5 * g * dt * dt;
        assert!(
            (snap.position.y - expected_y).abs() < 1e-7,
            "{}: y = {}, expected {}",
            ammo.name(),
            snap.position.y,
            expected_y
        );
        assert!((snap.velocity.y - (start.velocity.y - g * dt)).abs() < 1e-5);
        assert!((snap.time - dt).abs() < 1e-15);
    }
}

#[test]
fn setup_derives_launch_state() {
    let sim = sim_with(Ammunition::Nato556, EnvironmentConstants::default(), -2.0);
    let snap = sim.snapshot();
    let angle = 0.3_f64.to_radians();

    assert_eq!(snap.position.y, 10.0);
    assert!((snap.velocity.x - 945.0 * angle.cos()).abs() < 1e-9);
    assert!((snap.velocity.y - 945.0 * angle.sin()).abs() < 1e-9);
    assert_eq!(snap.velocity.z, 0.0);
    assert!(snap.paused);
    assert_eq!(sim.wind(), Some(-2.0));
    assert_eq!(sim.trace().len(), 1);

    let cd = (4.01 / 453.6) / (0.149 * 0.0394);
    assert!((sim.drag_coefficient().unwrap() - cd).abs() < 1e-12);
}

#[test]
fn zero_mass_setup_fails_without_touching_state() {
    let mut sim = sim_with(Ammunition::Parabellum9mm, EnvironmentConstants::default(), 1.0);
    let before = sim.snapshot();
    let trace_before = sim.trace().clone();

    let mut bad = Ammunition::Nato762.params();
    bad.mass = 0.0;
    let mut wind = CountingWind { draws: 0, value: 9.0 };

    let err = sim.setup(bad, &mut wind).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    assert_eq!(wind.draws, 0);
    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.trace(), &trace_before);
    assert_eq!(sim.wind(), Some(1.0));
    assert_eq!(sim.projectile(), Some(&Ammunition::Parabellum9mm.params()));
}

#[test]
fn non_positive_ballistic_coefficient_is_rejected() {
    let mut sim = TrajectorySimulation::new(EnvironmentConstants::default(), IntegratorSettings::default()).unwrap();
    let p = ProjectileParameters {
        ballistic_coefficient: 0.0,
        ..Ammunition::Nato556.params()
    };
    assert!(matches!(
        sim.setup(p, &mut FixedWind(0.0)),
        Err(SimError::InvalidConfiguration { .. })
    ));
    assert!(!sim.is_set_up());
}

#[test]
fn non_finite_wind_is_rejected_at_setup() {
    let mut sim = TrajectorySimulation::new(EnvironmentConstants::default(), IntegratorSettings::default()).unwrap();
    let err = sim.setup_ammo(Ammunition::Nato556, &mut FixedWind(f64::NAN)).unwrap_err();
    assert!(matches!(err, SimError::InvalidInput { .. }));
    assert!(!sim.is_set_up());

    let cfg: ScenarioConfig = serde_yaml::from_str("wind:\n  source: fixed\n  speed: .nan\n").unwrap();
    let built = Scenario::build_scenario(cfg, std::path::Path::new(".")).unwrap();
    assert!(matches!(built.into_simulation(), Err(SimError::InvalidInput { .. })));

    assert!(matches!(
        WindSampler::seeded(vec![3.0, f64::INFINITY], 1),
        Err(SimError::InvalidInput { .. })
    ));
}

#[test]
fn empty_wind_pool_fails_setup() {
    assert!(matches!(
        WindSampler::seeded(Vec::new(), 0),
        Err(SimError::InvalidInput { .. })
    ));
}

// ==================================================================================
// Physics against references
// ==================================================================================

#[test]
fn calm_run_matches_reference_integration() {
    let ammo = Ammunition::Parabellum9mm;
    let mut sim = sim_with(ammo, calm_env(), 0.0);
    let start = sim.snapshot();
    let params = *sim.force_params().unwrap();
    let k = params.drag_factor() / params.mass;
    let g = params.gravity;

    let steps = 300;
    for _ in 0..steps {
        sim.step().unwrap();
    }
    let snap = sim.snapshot();

    let reference = reference_rk4(
        [start.position.x, start.position.y, start.velocity.x, start.velocity.y],
        k,
        g,
        snap.time,
        steps * 20,
    );

    let dx = snap.position.x - reference[0];
    let dy = snap.position.y - reference[1];
    let scale = (reference[0].powi(2) + reference[1].powi(2)).sqrt();
    assert!(((dx * dx + dy * dy).sqrt() / scale) < 1e-4);
    assert!((snap.velocity.x - reference[2]).abs() / reference[2].abs() < 1e-4);
    assert_eq!(snap.position.z, 0.0);

    // closed form of the same linear drag problem
    let t = snap.time;
    let decay = -(-k * t).exp_m1(); // 1 - e^(-kt)
    let x_exact = start.velocity.x * decay / k;
    assert!((snap.position.x - x_exact).abs() / x_exact < 1e-6);
}

#[test]
fn calm_ammo_one_descends_and_never_drifts_back() {
    let mut sim = sim_with(Ammunition::Parabellum9mm, calm_env(), 0.0);

    for _ in 0..500 {
        sim.step().unwrap();
    }
    let snap = sim.snapshot();
    assert!((snap.time - 1.65).abs() < 1e-9);
    assert!(snap.position.y < 10.0, "y = {}", snap.position.y);

    let trace = sim.trace();
    assert_eq!(trace.len(), 501);
    for w in trace.x.windows(2) {
        assert!(w[1] > w[0], "x went backwards: {} -> {}", w[0], w[1]);
    }
    assert!(trace.z.iter().all(|z| *z == 0.0));
}

#[test]
fn crosswind_sign_sets_drift_direction() {
    let env = calm_env();
    let mut left = sim_with(Ammunition::Nato762, env, -4.0);
    let mut right = sim_with(Ammunition::Nato762, env, 4.0);
    for _ in 0..100 {
        left.step().unwrap();
        right.step().unwrap();
    }
    let zl = left.snapshot().position.z;
    let zr = right.snapshot().position.z;
    assert!(zl < 0.0 && zr > 0.0);
    assert!((zl + zr).abs() < 1e-12);
}

#[test]
fn seeded_runs_are_identical() {
    let pool: Vec<f64> = (1..=30).map(|i| i as f64 / 3.6).collect();

    let run = || {
        let mut sampler = WindSampler::seeded(pool.clone(), 1234).unwrap();
        let mut sim = TrajectorySimulation::new(EnvironmentConstants::default(), IntegratorSettings::default()).unwrap();
        sim.setup_ammo(Ammunition::Nato556, &mut sampler).unwrap();
        for _ in 0..200 {
            sim.step().unwrap();
        }
        (sim.wind(), sim.trace().clone())
    };

    assert_eq!(run(), run());
}

// ==================================================================================
// State machine
// ==================================================================================

#[test]
fn ground_impact_threshold() {
    assert!(is_ground_impact(-1.0));
    assert!(!is_ground_impact(-0.999));
}

#[test]
fn pause_and_resume_are_idempotent() {
    let mut sim = sim_with(Ammunition::Nato556, EnvironmentConstants::default(), 0.0);
    sim.pause();
    sim.pause();
    assert_eq!(sim.phase(), Phase::Paused);

    sim.resume();
    sim.resume();
    assert_eq!(sim.phase(), Phase::Running);

    sim.pause();
    assert_eq!(sim.phase(), Phase::Paused);
}

#[test]
fn run_terminates_on_impact_and_stays_terminated() {
    let mut sim = sim_with(Ammunition::Parabellum9mm, EnvironmentConstants::default(), 3.0);
    sim.resume();
    let mut guard = 0;
    while sim.phase() != Phase::Terminated {
        sim.step().unwrap();
        guard += 1;
        assert!(guard < 5_000, "no impact");
    }

    let last = sim.snapshot();
    assert!(last.position.y <= -1.0);
    assert!(last.terminated);

    sim.resume();
    assert_eq!(sim.phase(), Phase::Terminated);
    sim.pause();
    assert_eq!(sim.phase(), Phase::Terminated);
    assert_eq!(sim.step().unwrap(), last);
}

#[test]
fn integration_failure_keeps_last_valid_state() {
    let mut sim = TrajectorySimulation::new(EnvironmentConstants::default(), IntegratorSettings::default()).unwrap();
    let runaway = ProjectileParameters {
        muzzle_speed: f64::MAX,
        ..Ammunition::Nato556.params()
    };
    sim.setup(runaway, &mut FixedWind(0.0)).unwrap();
    let before = sim.snapshot();

    let err = sim.step().unwrap_err();
    match err {
        SimError::Integration { time, last_state, .. } => {
            assert_eq!(time, 0.0);
            assert_eq!(last_state[1], 10.0);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.trace().len(), 1);
    assert_eq!(sim.steps_taken(), 0);
}

// ==================================================================================
// Scenario files
// ==================================================================================

#[test]
fn default_scenario_runs_to_impact() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let text = std::fs::read_to_string(dir.join("default.yaml")).unwrap();
    let cfg: ScenarioConfig = serde_yaml::from_str(&text).unwrap();

    let sim = Scenario::build_scenario(cfg.clone(), &dir).unwrap().into_simulation().unwrap();
    let wind = sim.wind().unwrap();
    assert!(wind.abs() > 0.0 && wind.abs() < 20.0);

    let mut session = Session::new(sim);
    assert_eq!(session.run_to_impact(10_000).unwrap(), Flow::Impact);

    // seed 42 in the file makes the draw repeatable
    let again = Scenario::build_scenario(cfg, &dir).unwrap().into_simulation().unwrap();
    assert_eq!(again.wind(), Some(wind));
}

#[test]
fn calm_scenario_has_no_lateral_motion() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let text = std::fs::read_to_string(dir.join("calm.yaml")).unwrap();
    let cfg: ScenarioConfig = serde_yaml::from_str(&text).unwrap();

    let mut session = Session::new(Scenario::build_scenario(cfg, &dir).unwrap().into_simulation().unwrap());
    session.run_to_impact(10_000).unwrap();
    assert_eq!(session.snapshot().position.z, 0.0);
}
