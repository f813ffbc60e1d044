//! Acceleration contributors for the projectile
//!
//! Each physical effect (gravity, drag, Coriolis, crosswind) implements
//! [`Acceleration`]; a [`ForceModel`] sums them into the state derivative

use crate::simulation::params::{ForceParams, WIND_SCALE};
use crate::simulation::states::{NVec3, State6};

/// Trait for acceleration sources acting on the projectile
/// Implementations add their contribution into `out`
pub trait Acceleration {
    fn acceleration(&self, t: f64, v: &NVec3, out: &mut NVec3);
}

/// Collection of acceleration terms
/// Contributions are summed into a single acceleration vector
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Total acceleration at time `t` for velocity `v`
    pub fn accumulate_accels(&self, t: f64, v: &NVec3) -> NVec3 {
        let mut out = NVec3::zeros();
        for term in &self.terms {
            term.acceleration(t, v, &mut out);
        }
        out
    }
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant downward pull along -y
pub struct Gravity {
    pub g: f64,
}

impl Acceleration for Gravity {
    fn acceleration(&self, _t: f64, _v: &NVec3, out: &mut NVec3) {
        out.y -= self.g;
    }
}

/// Linear drag in the firing plane: a = -(Fd * v) / m on x and y
pub struct Drag {
    pub factor: f64, // Fd = 0.5 * rho * Cd * (A / 1550)
    pub mass: f64,
}

impl Acceleration for Drag {
    fn acceleration(&self, _t: f64, v: &NVec3, out: &mut NVec3) {
        out.x -= (self.factor * v.x) / self.mass;
        out.y -= (self.factor * v.y) / self.mass;
    }
}

/// Lateral deflection from Earth rotation, scaled by planar speed
pub struct Coriolis {
    pub omega: f64,
    pub latitude_factor: f64,
    pub mass: f64,
}

impl Acceleration for Coriolis {
    fn acceleration(&self, _t: f64, v: &NVec3, out: &mut NVec3) {
        let planar = (v.x * v.x + v.y * v.y).sqrt();
        out.z += (2.0 * planar * self.omega * self.latitude_factor) / self.mass;
    }
}

/// Lateral push from the sampled crosswind, scaled by planar speed
pub struct Crosswind {
    pub wind: f64,
    pub mass: f64,
}

impl Acceleration for Crosswind {
    fn acceleration(&self, _t: f64, v: &NVec3, out: &mut NVec3) {
        let planar = (v.x * v.x + v.y * v.y).sqrt();
        out.z += self.wind * planar / self.mass / WIND_SCALE;
    }
}

/// Projectile dynamics for one run
///
/// Built once from [`ForceParams`] at setup. Pure: evaluating it never
/// mutates anything, so the integrator may call it at any sub-stage.
pub struct ForceModel {
    params: ForceParams,
    forces: AccelSet,
}

impl ForceModel {
    pub fn new(params: ForceParams) -> Self {
        let forces = AccelSet::new()
            .with(Drag {
                factor: params.drag_factor(),
                mass: params.mass,
            })
            .with(Gravity { g: params.gravity })
            .with(Coriolis {
                omega: params.earth_rotation,
                latitude_factor: params.latitude_factor,
                mass: params.mass,
            })
            .with(Crosswind {
                wind: params.wind,
                mass: params.mass,
            });

        Self { params, forces }
    }

    /// Coefficients the terms were built from
    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    /// Acceleration `(ax, ay, az)` for velocity `v`
    pub fn derivative(&self, v: &NVec3) -> NVec3 {
        self.forces.accumulate_accels(0.0, v)
    }

    /// `d/dt [x, y, z, vx, vy, vz] = [vx, vy, vz, ax, ay, az]`
    pub fn state_derivative(&self, t: f64, y: &State6) -> State6 {
        let v = NVec3::new(y[3], y[4], y[5]);
        let a = self.forces.accumulate_accels(t, &v);
        [v.x, v.y, v.z, a.x, a.y, a.z]
    }
}
