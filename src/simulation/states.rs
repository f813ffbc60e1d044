//! Core state types for the trajectory simulation.
//!
//! - `State6` is the raw integrator vector `[x, y, z, vx, vy, vz]`
//! - `Projectile` is the same data split into nalgebra position/velocity
//! - `Trace` is the append-only position history of a run
//!
//! The derivative of a `State6` uses the same layout:
//! `[vx, vy, vz, ax, ay, az]`.

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

/// Integrator state vector `[x, y, z, vx, vy, vz]`
pub type State6 = [f64; 6];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub x: NVec3, // position (m)
    pub v: NVec3, // velocity (m/s)
    pub t: f64, // simulation time (s)
}

impl Projectile {
    pub fn from_state(t: f64, y: &State6) -> Self {
        Self {
            x: NVec3::new(y[0], y[1], y[2]),
            v: NVec3::new(y[3], y[4], y[5]),
            t,
        }
    }

    pub fn to_state(&self) -> State6 {
        [self.x.x, self.x.y, self.x.z, self.v.x, self.v.y, self.v.z]
    }
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub time: f64,
    pub position: NVec3,
    pub velocity: NVec3,
    pub paused: bool,
    pub terminated: bool,
}

/// Position history of one run, one entry per accepted step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Trace {
    /// Start a trace at the launch position
    pub fn starting_at(p: &NVec3) -> Self {
        let mut trace = Self::default();
        trace.push(p);
        trace
    }

    pub fn push(&mut self, p: &NVec3) {
        self.x.push(p.x);
        self.y.push(p.y);
        self.z.push(p.z);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate the recorded points in order
    pub fn points(&self) -> impl Iterator<Item = NVec3> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.z.iter())
            .map(|((x, y), z)| NVec3::new(*x, *y, *z))
    }

    /// Highest recorded altitude, `None` for an empty trace
    pub fn apex(&self) -> Option<f64> {
        self.y.iter().copied().reduce(f64::max)
    }
}
