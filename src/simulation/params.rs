//! Physical and numerical parameters for the simulation
//!
//! - `ProjectileParameters` and the fixed `Ammunition` catalog
//! - `EnvironmentConstants` (gravity, air density, Earth rotation, latitude)
//! - `IntegratorSettings` (tick size and error tolerances)
//! - `ForceParams`, the coefficients derived at setup and fed to the force model

use super::error::SimError;

/// Grams per pound as used by the drag-coefficient derivation
pub const GRAMS_PER_POUND: f64 = 453.6;

/// Empirical scaling of the in² cross-section inside the drag term
pub const AREA_SCALE: f64 = 1550.0;

/// Crosswind term divisor
pub const WIND_SCALE: f64 = 1000.0;

/// Altitude at or below which a run is over
pub const GROUND_IMPACT_Y: f64 = -1.0;

pub const DEFAULT_GRAVITY: f64 = 9.8;
pub const DEFAULT_AIR_DENSITY: f64 = 1.293;
/// Kept at the calibrated value, an order of magnitude above 7.27e-5
pub const DEFAULT_EARTH_ROTATION: f64 = 0.000727;
/// Oshawa, Ontario. Passed to `sin` unconverted.
pub const DEFAULT_LATITUDE: f64 = 43.8971;
pub const DEFAULT_LAUNCH_HEIGHT: f64 = 10.0;
pub const DEFAULT_DT: f64 = 0.0033;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileParameters {
    pub muzzle_speed: f64, // m/s
    pub mass: f64, // g
    pub ballistic_coefficient: f64,
    pub area: f64, // in^2
    pub launch_angle: f64, // degrees
}

impl ProjectileParameters {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.mass > 0.0) {
            return Err(SimError::config(format!("mass must be positive, got {}", self.mass)));
        }
        if !(self.ballistic_coefficient > 0.0) {
            return Err(SimError::config(format!(
                "ballistic coefficient must be positive, got {}",
                self.ballistic_coefficient
            )));
        }
        if !(self.area > 0.0) {
            return Err(SimError::config(format!(
                "cross-sectional area must be positive, got {}",
                self.area
            )));
        }
        if !self.muzzle_speed.is_finite() || !self.launch_angle.is_finite() {
            return Err(SimError::config("muzzle speed and launch angle must be finite"));
        }
        Ok(())
    }

    /// `Cd = (mass / 453.6) / (Bc * A)`
    pub fn drag_coefficient(&self) -> f64 {
        (self.mass / GRAMS_PER_POUND) / (self.ballistic_coefficient * self.area)
    }

    /// Muzzle velocity split into (vx, vy)
    pub fn launch_velocity(&self) -> (f64, f64) {
        let angle = self.launch_angle.to_radians();
        (self.muzzle_speed * angle.cos(), self.muzzle_speed * angle.sin())
    }
}

/// The three selectable cartridges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ammunition {
    Parabellum9mm,
    Nato556,
    Nato762,
}

impl Ammunition {
    pub const ALL: [Ammunition; 3] = [Ammunition::Parabellum9mm, Ammunition::Nato556, Ammunition::Nato762];

    /// Menu number 1..=3
    pub fn from_choice(choice: u8) -> Result<Self, SimError> {
        match choice {
            1 => Ok(Ammunition::Parabellum9mm),
            2 => Ok(Ammunition::Nato556),
            3 => Ok(Ammunition::Nato762),
            other => Err(SimError::config(format!("unknown ammunition choice {other}, expected 1-3"))),
        }
    }

    pub fn choice(&self) -> u8 {
        match self {
            Ammunition::Parabellum9mm => 1,
            Ammunition::Nato556 => 2,
            Ammunition::Nato762 => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ammunition::Parabellum9mm => "9x19mm Parabellum 124 gr FMJ",
            Ammunition::Nato556 => "5.56x45mm NATO 62 gr FMJ-BT",
            Ammunition::Nato762 => "7.62x51mm NATO 147 gr FMJ",
        }
    }

    pub fn params(&self) -> ProjectileParameters {
        // (speed m/s, mass g, Bc, area in^2, angle deg)
        let (muzzle_speed, mass, ballistic_coefficient, area, launch_angle) = match self {
            Ammunition::Parabellum9mm => (385.0, 8.04, 0.125, 0.0989, 0.3), // 118mm barrel
            Ammunition::Nato556 => (945.0, 4.01, 0.149, 0.0394, 0.3), // 508mm barrel
            Ammunition::Nato762 => (850.0, 9.53, 0.209, 0.0745, 0.3), // 559mm barrel
        };
        ProjectileParameters {
            muzzle_speed,
            mass,
            ballistic_coefficient,
            area,
            launch_angle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentConstants {
    pub gravity: f64, // m/s^2
    pub air_density: f64, // kg/m^3
    pub earth_rotation: f64, // rad/s
    pub latitude_factor: f64, // signed factor applied to the Coriolis term
}

impl EnvironmentConstants {
    /// Latitude factor as calibrated: `-sin(latitude)` with the degree value
    /// handed straight to `sin`
    pub fn latitude_factor_for(latitude: f64) -> f64 {
        -latitude.sin()
    }

    /// No Earth rotation and no latitude effect
    pub fn without_coriolis(mut self) -> Self {
        self.earth_rotation = 0.0;
        self
    }
}

impl Default for EnvironmentConstants {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            air_density: DEFAULT_AIR_DENSITY,
            earth_rotation: DEFAULT_EARTH_ROTATION,
            latitude_factor: Self::latitude_factor_for(DEFAULT_LATITUDE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorSettings {
    pub dt: f64, // simulation time per tick
    pub atol: f64, // absolute error tolerance
    pub rtol: f64, // relative error tolerance
    pub max_steps: usize, // internal step budget per advance
    pub launch_height: f64, // initial y
}

impl IntegratorSettings {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(SimError::config(format!("tick size must be positive, got {}", self.dt)));
        }
        if !(self.atol > 0.0) || !(self.rtol > 0.0) {
            return Err(SimError::config("error tolerances must be positive"));
        }
        if self.max_steps == 0 {
            return Err(SimError::config("max_steps must be at least 1"));
        }
        if !self.launch_height.is_finite() {
            return Err(SimError::config("launch height must be finite"));
        }
        Ok(())
    }
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            atol: 1e-8,
            rtol: 1e-8,
            max_steps: 500,
            launch_height: DEFAULT_LAUNCH_HEIGHT,
        }
    }
}

/// Everything the force model needs, fixed for the duration of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub cd: f64, // drag coefficient
    pub area: f64, // in^2
    pub mass: f64,
    pub wind: f64, // m/s, signed
    pub earth_rotation: f64,
    pub latitude_factor: f64,
    pub gravity: f64,
    pub air_density: f64,
}

impl ForceParams {
    pub fn derive(p: &ProjectileParameters, env: &EnvironmentConstants, wind: f64) -> Self {
        Self {
            cd: p.drag_coefficient(),
            area: p.area,
            mass: p.mass,
            wind,
            earth_rotation: env.earth_rotation,
            latitude_factor: env.latitude_factor,
            gravity: env.gravity,
            air_density: env.air_density,
        }
    }

    /// `Fd = 0.5 * rho * Cd * (A / 1550)`
    pub fn drag_factor(&self) -> f64 {
        0.5 * self.air_density * self.cd * (self.area / AREA_SCALE)
    }
}
