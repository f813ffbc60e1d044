//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! run. A scenario consists of:
//!
//! - `ammo`                – catalog entry, 1..=3
//! - `launch_height`       – initial altitude in meters
//! - [`EnvironmentConfig`] – physical constants
//! - [`SolverConfig`]      – tick size and integrator tolerances
//! - [`WindConfig`]        – where the crosswind comes from
//!
//! Every field is optional; missing values fall back to the calibrated
//! defaults.
//!
//! # YAML format
//!
//! ```yaml
//! ammo: 2
//! launch_height: 10.0
//!
//! environment:
//!   gravity: 9.8
//!   air_density: 1.293
//!   earth_rotation: 0.000727
//!   latitude: 43.8971         # handed to sin() as is
//!
//! solver:
//!   dt: 0.0033                # simulation seconds per tick
//!   atol: 1.0e-8
//!   rtol: 1.0e-8
//!   max_steps: 500            # internal steps allowed per tick
//!
//! wind:
//!   source: pool              # or: fixed
//!   csv: data/wind_sample.csv # resolved against the scenario directory
//!   already_mps: false        # raw km/h table
//!   seed: 42
//! ```
//!
//! A fixed wind looks like `wind: { source: fixed, speed: 0.0 }`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::simulation::params::{
    DEFAULT_AIR_DENSITY, DEFAULT_DT, DEFAULT_EARTH_ROTATION, DEFAULT_GRAVITY, DEFAULT_LATITUDE,
    DEFAULT_LAUNCH_HEIGHT,
};

/// Physical constants of the firing site
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub gravity: f64, // m/s^2
    pub air_density: f64, // kg/m^3
    pub earth_rotation: f64, // rad/s, 0 disables the Coriolis term
    pub latitude: f64, // site latitude, passed to sin() unconverted
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            air_density: DEFAULT_AIR_DENSITY,
            earth_rotation: DEFAULT_EARTH_ROTATION,
            latitude: DEFAULT_LATITUDE,
        }
    }
}

/// Tick size and adaptive solver tolerances
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    pub dt: f64, // simulation time per tick
    pub atol: f64, // absolute error tolerance
    pub rtol: f64, // relative error tolerance
    pub max_steps: usize, // internal step budget per tick
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            atol: 1e-8,
            rtol: 1e-8,
            max_steps: 500,
        }
    }
}

/// Where the run's crosswind comes from
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum WindConfig {
    /// Sample from an observed wind-speed table
    Pool {
        csv: PathBuf, // table with a `wind_speed` column
        #[serde(default)]
        already_mps: bool, // `false` - values are km/h and get divided by 3.6
        #[serde(default)]
        seed: Option<u64>, // fixed seed for reproducible draws
    },
    /// Use the same wind every run
    Fixed { speed: f64 },
}

impl Default for WindConfig {
    fn default() -> Self {
        WindConfig::Fixed { speed: 0.0 }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub ammo: u8, // catalog entry, 1..=3
    pub launch_height: f64, // initial y in meters
    pub environment: EnvironmentConfig,
    pub solver: SolverConfig,
    pub wind: WindConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ammo: 1,
            launch_height: DEFAULT_LAUNCH_HEIGHT,
            environment: EnvironmentConfig::default(),
            solver: SolverConfig::default(),
            wind: WindConfig::default(),
        }
    }
}
