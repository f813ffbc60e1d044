//! Trajectory simulation runtime
//!
//! `TrajectorySimulation` owns the integrator and force model of one run,
//! records the trace, and implements the Paused/Running/Terminated
//! state machine driven by the presentation layer.

use tracing::{debug, info, trace, warn};

use crate::simulation::error::SimError;
use crate::simulation::forces::ForceModel;
use crate::simulation::integrator::Integrator;
use crate::simulation::params::{
    Ammunition, EnvironmentConstants, ForceParams, IntegratorSettings, ProjectileParameters,
    GROUND_IMPACT_Y,
};
use crate::simulation::states::{NVec3, Projectile, Snapshot, Trace};
use crate::simulation::wind::WindSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Paused,
    Running,
    Terminated,
}

/// `y <= -1.0` ends the run
pub fn is_ground_impact(y: f64) -> bool {
    y <= GROUND_IMPACT_Y
}

/// State created by `setup`
struct Flight {
    projectile: ProjectileParameters,
    model: ForceModel,
    integrator: Integrator,
}

pub struct TrajectorySimulation {
    pub environment: EnvironmentConstants,
    pub settings: IntegratorSettings,
    phase: Phase,
    flight: Option<Flight>,
    current: Projectile,
    trace: Trace,
    steps: usize,
}

impl TrajectorySimulation {
    pub fn new(environment: EnvironmentConstants, settings: IntegratorSettings) -> Result<Self, SimError> {
        settings.validate()?;
        let start = NVec3::new(0.0, settings.launch_height, 0.0);

        Ok(Self {
            environment,
            settings,
            phase: Phase::Paused,
            flight: None,
            current: Projectile {
                x: start,
                v: NVec3::zeros(),
                t: 0.0,
            },
            trace: Trace::default(),
            steps: 0,
        })
    }

    /// Set up a run for a catalog entry
    pub fn setup_ammo(&mut self, ammo: Ammunition, wind: &mut dyn WindSource) -> Result<(), SimError> {
        debug!(ammo = ammo.name(), "selected ammunition");
        self.setup(ammo.params(), wind)
    }

    /// Derive coefficients, draw the wind and seed the integrator
    ///
    /// Nothing is modified unless every check and the wind draw succeed.
    pub fn setup(&mut self, projectile: ProjectileParameters, wind: &mut dyn WindSource) -> Result<(), SimError> {
        if self.steps > 0 {
            return Err(SimError::config("setup is only valid before the first step"));
        }
        projectile.validate()?;
        let wind = wind.draw()?;
        if !wind.is_finite() {
            return Err(SimError::input(format!("wind speed {wind} is not finite")));
        }

        let (vx, vy) = projectile.launch_velocity();
        let params = ForceParams::derive(&projectile, &self.environment, wind);
        let model = ForceModel::new(params);

        let start = Projectile {
            x: NVec3::new(0.0, self.settings.launch_height, 0.0),
            v: NVec3::new(vx, vy, 0.0),
            t: 0.0,
        };
        let mut integrator = Integrator::new(&self.settings);
        integrator.initialize(start.to_state(), start.t);

        debug!(
            cd = params.cd,
            drag_factor = params.drag_factor(),
            wind,
            vx,
            vy,
            "run set up"
        );

        self.current = start;
        self.trace = Trace::starting_at(&start.x);
        self.phase = Phase::Paused;
        self.flight = Some(Flight {
            projectile,
            model,
            integrator,
        });
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
    }

    /// Advance one tick of `settings.dt`
    ///
    /// A terminated run is left as is. On integration failure time, state
    /// and trace keep their last valid values and the error is returned.
    pub fn step(&mut self) -> Result<Snapshot, SimError> {
        if self.phase == Phase::Terminated {
            return Ok(self.snapshot());
        }
        let flight = self
            .flight
            .as_mut()
            .ok_or_else(|| SimError::config("step called before setup"))?;

        let target = flight.integrator.time() + self.settings.dt;
        let model = &flight.model;
        let result = flight
            .integrator
            .advance(|t, y| model.state_derivative(t, y), target);

        let y = match result {
            Ok(y) => y,
            Err(e) => {
                warn!(time = flight.integrator.time(), error = %e, "integration failed");
                return Err(e);
            }
        };

        self.current = Projectile::from_state(target, &y);
        self.trace.push(&self.current.x);
        self.steps += 1;
        trace!(
            t = self.current.t,
            x = self.current.x.x,
            y = self.current.x.y,
            z = self.current.x.z,
            "step"
        );

        if is_ground_impact(self.current.x.y) {
            self.phase = Phase::Terminated;
            info!(
                t = self.current.t,
                range = self.current.x.x,
                drift = self.current.x.z,
                "ground impact"
            );
        }
        Ok(self.snapshot())
    }

    /// Apply the ground-impact check to the current altitude
    pub fn check_ground_impact(&mut self) -> bool {
        if is_ground_impact(self.current.x.y) {
            self.phase = Phase::Terminated;
        }
        self.phase == Phase::Terminated
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.current.t,
            position: self.current.x,
            velocity: self.current.v,
            paused: self.phase == Phase::Paused,
            terminated: self.phase == Phase::Terminated,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_set_up(&self) -> bool {
        self.flight.is_some()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    pub fn projectile(&self) -> Option<&ProjectileParameters> {
        self.flight.as_ref().map(|f| &f.projectile)
    }

    pub fn force_params(&self) -> Option<&ForceParams> {
        self.flight.as_ref().map(|f| f.model.params())
    }

    /// Wind drawn at setup
    pub fn wind(&self) -> Option<f64> {
        self.force_params().map(|p| p.wind)
    }

    pub fn drag_coefficient(&self) -> Option<f64> {
        self.force_params().map(|p| p.cd)
    }

    /// Right-hand-side evaluations spent by the integrator this run
    pub fn evaluations(&self) -> usize {
        self.flight.as_ref().map_or(0, |f| f.integrator.evaluations())
    }

    #[cfg(test)]
    pub(crate) fn force_altitude(&mut self, y: f64) {
        self.current.x.y = y;
    }
}
