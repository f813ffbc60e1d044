//! Build fully-initialized simulation runs from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - the selected ammunition
//! - environment constants (`EnvironmentConstants`)
//! - integrator settings (`IntegratorSettings`)
//! - the wind source (pooled sampler or fixed value)
//!
//! `into_simulation` then performs the setup and hands back a ready
//! `TrajectorySimulation`

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::configuration::config::{ScenarioConfig, WindConfig};
use crate::configuration::wind_data::load_wind_pool;
use crate::simulation::engine::TrajectorySimulation;
use crate::simulation::error::SimError;
use crate::simulation::params::{Ammunition, EnvironmentConstants, IntegratorSettings};
use crate::simulation::wind::{FixedWind, WindSampler, WindSource};

/// Runtime bundle for one run, built from a [`ScenarioConfig`]
pub struct Scenario {
    pub ammo: Ammunition,
    pub environment: EnvironmentConstants,
    pub settings: IntegratorSettings,
    pub wind: Box<dyn WindSource>,
}

impl Scenario {
    /// Relative wind-table paths are resolved against `base_dir`
    pub fn build_scenario(cfg: ScenarioConfig, base_dir: &Path) -> Result<Self, SimError> {
        let ammo = Ammunition::from_choice(cfg.ammo)?;

        // Environment (runtime) from EnvironmentConfig
        let e_cfg = cfg.environment;
        let environment = EnvironmentConstants {
            gravity: e_cfg.gravity,
            air_density: e_cfg.air_density,
            earth_rotation: e_cfg.earth_rotation,
            latitude_factor: EnvironmentConstants::latitude_factor_for(e_cfg.latitude),
        };

        // Integrator settings (runtime) from SolverConfig
        let s_cfg = cfg.solver;
        let settings = IntegratorSettings {
            dt: s_cfg.dt,
            atol: s_cfg.atol,
            rtol: s_cfg.rtol,
            max_steps: s_cfg.max_steps,
            launch_height: cfg.launch_height,
        };
        settings.validate()?;

        let wind: Box<dyn WindSource> = match cfg.wind {
            WindConfig::Fixed { speed } => Box::new(FixedWind(speed)),
            WindConfig::Pool { csv, already_mps, seed } => {
                let path = base_dir.join(csv);
                let pool = load_wind_pool(&path, already_mps)?;
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                Box::new(WindSampler::with_rng(pool, rng)?)
            }
        };

        Ok(Self {
            ammo,
            environment,
            settings,
            wind,
        })
    }

    /// Create the simulation and run its setup
    pub fn into_simulation(mut self) -> Result<TrajectorySimulation, SimError> {
        let mut sim = TrajectorySimulation::new(self.environment, self.settings)?;
        sim.setup_ammo(self.ammo, self.wind.as_mut())?;
        info!(
            ammo = self.ammo.name(),
            wind = sim.wind().unwrap_or_default(),
            cd = sim.drag_coefficient().unwrap_or_default(),
            "simulation ready"
        );
        Ok(sim)
    }
}
