pub mod simulation;
pub mod configuration;
pub mod control;
pub mod benchmark;

pub use simulation::states::{NVec3, Projectile, Snapshot, State6, Trace};
pub use simulation::error::SimError;
pub use simulation::params::{
    Ammunition, EnvironmentConstants, ForceParams, IntegratorSettings, ProjectileParameters,
};
pub use simulation::forces::{AccelSet, Acceleration, Coriolis, Crosswind, Drag, ForceModel, Gravity};
pub use simulation::integrator::Integrator;
pub use simulation::engine::{is_ground_impact, Phase, TrajectorySimulation};
pub use simulation::wind::{sample_wind_speed, FixedWind, WindSampler, WindSource};
pub use simulation::scenario::Scenario;

pub use configuration::config::{EnvironmentConfig, ScenarioConfig, SolverConfig, WindConfig};
pub use configuration::wind_data::{load_wind_pool, read_wind_pool};

pub use control::session::{Command, Flow, Session, KEY_BINDINGS};
pub use control::export::{write_trace, write_trace_file, FlightSummary};

pub use benchmark::benchmark::bench_integrator;
