//! Adaptive time integrator for the projectile state
//!
//! Embedded Dormand–Prince 5(4) pair with FSAL, local error control on
//! `atol + rtol * |y|` and a bounded number of internal steps per call.
//! The caller asks for the state at a target time; the integrator picks
//! its own sub-steps to get there.

use super::error::SimError;
use super::params::IntegratorSettings;
use super::states::State6;

/// Dormand–Prince 5(4) Butcher tableau
mod dopri5 {
    pub const C2: f64 = 1.0 / 5.0;
    pub const C3: f64 = 3.0 / 10.0;
    pub const C4: f64 = 4.0 / 5.0;
    pub const C5: f64 = 8.0 / 9.0;

    pub const A21: f64 = 1.0 / 5.0;

    pub const A31: f64 = 3.0 / 40.0;
    pub const A32: f64 = 9.0 / 40.0;

    pub const A41: f64 = 44.0 / 45.0;
    pub const A42: f64 = -56.0 / 15.0;
    pub const A43: f64 = 32.0 / 9.0;

    pub const A51: f64 = 19372.0 / 6561.0;
    pub const A52: f64 = -25360.0 / 2187.0;
    pub const A53: f64 = 64448.0 / 6561.0;
    pub const A54: f64 = -212.0 / 729.0;

    pub const A61: f64 = 9017.0 / 3168.0;
    pub const A62: f64 = -355.0 / 33.0;
    pub const A63: f64 = 46732.0 / 5247.0;
    pub const A64: f64 = 49.0 / 176.0;
    pub const A65: f64 = -5103.0 / 18656.0;

    // 5th order weights (also row 7 of A)
    pub const B1: f64 = 35.0 / 384.0;
    pub const B3: f64 = 500.0 / 1113.0;
    pub const B4: f64 = 125.0 / 192.0;
    pub const B5: f64 = -2187.0 / 6784.0;
    pub const B6: f64 = 11.0 / 84.0;

    // b5 - b4, the embedded error weights
    pub const E1: f64 = 71.0 / 57600.0;
    pub const E3: f64 = -71.0 / 16695.0;
    pub const E4: f64 = 71.0 / 1920.0;
    pub const E5: f64 = -17253.0 / 339200.0;
    pub const E6: f64 = 22.0 / 525.0;
    pub const E7: f64 = -1.0 / 40.0;
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
const ERROR_EXPONENT: f64 = -0.2; // -1 / (order + 1) with order 4

/// Result of one trial step
struct Trial {
    y_new: State6,
    k_last: State6, // f(t + h, y_new), reused as k1 of the next step
    err: f64, // scaled RMS error, <= 1 means accept
}

/// `y + h * sum(coef_j * k_j)`
fn combine(y: &State6, h: f64, terms: &[(f64, &State6)]) -> State6 {
    let mut out = *y;
    for (i, o) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (coef, k) in terms {
            acc += coef * k[i];
        }
        *o += h * acc;
    }
    out
}

fn is_finite(y: &State6) -> bool {
    y.iter().all(|v| v.is_finite())
}

/// Scaled RMS norm of `v` against `atol + rtol * max(|a|, |b|)`
fn scaled_norm(v: &State6, a: &State6, b: &State6, atol: f64, rtol: f64) -> f64 {
    let sum: f64 = (0..6)
        .map(|i| {
            let scale = atol + rtol * a[i].abs().max(b[i].abs());
            (v[i] / scale).powi(2)
        })
        .sum();
    (sum / 6.0).sqrt()
}

/// Owns the simulation time and state between ticks
#[derive(Debug, Clone)]
pub struct Integrator {
    t: f64,
    y: State6,
    h_next: Option<f64>, // step size carried into the next advance
    atol: f64,
    rtol: f64,
    max_steps: usize,
    evaluations: usize, // right-hand-side evaluations since initialize
}

impl Integrator {
    pub fn new(settings: &IntegratorSettings) -> Self {
        Self {
            t: 0.0,
            y: [0.0; 6],
            h_next: None,
            atol: settings.atol,
            rtol: settings.rtol,
            max_steps: settings.max_steps,
            evaluations: 0,
        }
    }

    /// Reset to `state0` at time `t0`
    pub fn initialize(&mut self, state0: State6, t0: f64) {
        self.t = t0;
        self.y = state0;
        self.h_next = None;
        self.evaluations = 0;
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn state(&self) -> &State6 {
        &self.y
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn failure(&self, reason: impl Into<String>) -> SimError {
        SimError::Integration {
            time: self.t,
            last_state: self.y,
            reason: reason.into(),
        }
    }

    /// Integrate `dy/dt = f(t, y)` from the current time up to `target`
    ///
    /// On success time becomes `target` and the new state is returned.
    /// On failure time and state are left at their last accepted values.
    pub fn advance<F>(&mut self, f: F, target: f64) -> Result<State6, SimError>
    where
        F: Fn(f64, &State6) -> State6,
    {
        if !target.is_finite() {
            return Err(self.failure(format!("target time {target} is not finite")));
        }
        if target < self.t {
            return Err(self.failure(format!(
                "target time {target} precedes current time {}",
                self.t
            )));
        }
        if target == self.t {
            return Ok(self.y);
        }

        let mut t = self.t;
        let mut y = self.y;

        let mut k1 = f(t, &y);
        self.evaluations += 1;
        if !is_finite(&k1) {
            return Err(self.failure("derivative is not finite at the current state"));
        }

        let mut h = match self.h_next {
            Some(h) => h,
            None => self.initial_step(&f, t, &y, &k1, target - t),
        };
        let mut saw_non_finite = false;

        for _ in 0..self.max_steps {
            let remaining = target - t;
            let last = h >= remaining;
            if last {
                h = remaining;
            }

            let trial = self.trial_step(&f, t, &y, &k1, h);

            if trial.err <= 1.0 {
                let factor = if trial.err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * trial.err.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
                };

                t = if last { target } else { t + h };
                y = trial.y_new;
                k1 = trial.k_last;
                h *= factor;

                if last {
                    self.t = t;
                    self.y = y;
                    self.h_next = Some(h);
                    return Ok(y);
                }
            } else {
                // NaN/inf trials come back with err = inf and shrink the step
                if !trial.err.is_finite() {
                    saw_non_finite = true;
                }
                let factor = if trial.err.is_finite() {
                    (SAFETY * trial.err.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                h *= factor;

                let h_min = 16.0 * f64::EPSILON * t.abs().max(1.0);
                if h < h_min {
                    let reason = if saw_non_finite {
                        "solver produced non-finite values"
                    } else {
                        "step size underflow"
                    };
                    return Err(self.failure(format!("{reason} while advancing to t = {target}")));
                }
            }
        }

        Err(self.failure(format!(
            "exceeded {} internal steps while advancing to t = {target}",
            self.max_steps
        )))
    }

    /// One Dormand–Prince trial of size `h` from `(t, y)` with `k1 = f(t, y)`
    fn trial_step<F>(&mut self, f: &F, t: f64, y: &State6, k1: &State6, h: f64) -> Trial
    where
        F: Fn(f64, &State6) -> State6,
    {
        use dopri5::*;

        let k2 = f(t + C2 * h, &combine(y, h, &[(A21, k1)]));
        let k3 = f(t + C3 * h, &combine(y, h, &[(A31, k1), (A32, &k2)]));
        let k4 = f(t + C4 * h, &combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]));
        let k5 = f(
            t + C5 * h,
            &combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        );
        let k6 = f(
            t + h,
            &combine(y, h, &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)]),
        );
        let y_new = combine(y, h, &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)]);
        let k7 = f(t + h, &y_new);
        self.evaluations += 6;

        let err_vec = combine(
            &[0.0; 6],
            h,
            &[(E1, k1), (E3, &k3), (E4, &k4), (E5, &k5), (E6, &k6), (E7, &k7)],
        );

        let err = if is_finite(&y_new) && is_finite(&k7) {
            scaled_norm(&err_vec, y, &y_new, self.atol, self.rtol)
        } else {
            f64::INFINITY
        };
        // A finite y_new with a NaN error still has to be rejected
        let err = if err.is_nan() { f64::INFINITY } else { err };

        Trial {
            y_new,
            k_last: k7,
            err,
        }
    }

    /// Starting step size from the scale of the state and its derivatives
    fn initial_step<F>(&mut self, f: &F, t: f64, y: &State6, k1: &State6, span: f64) -> f64
    where
        F: Fn(f64, &State6) -> State6,
    {
        let d0 = scaled_norm(y, y, y, self.atol, self.rtol);
        let d1 = scaled_norm(k1, y, y, self.atol, self.rtol);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
        let h0 = h0.min(span);

        let y1 = combine(y, h0, &[(1.0, k1)]);
        let k2 = f(t + h0, &y1);
        self.evaluations += 1;

        let mut diff = [0.0; 6];
        for i in 0..6 {
            diff[i] = k2[i] - k1[i];
        }
        let d2 = scaled_norm(&diff, y, y, self.atol, self.rtol) / h0;
        let d = d1.max(d2);

        let h1 = if !d.is_finite() {
            h0
        } else if d <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d).powf(0.2)
        };

        (100.0 * h0).min(h1).min(span)
    }
}
