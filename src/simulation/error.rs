//! Error type shared by setup, wind sampling and integration

use std::error::Error;
use std::fmt;

use super::states::State6;

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Parameters that cannot describe a physical run (mass <= 0, Bc <= 0, ...)
    InvalidConfiguration { reason: String },
    /// Unusable input data, e.g. an empty wind pool
    InvalidInput { reason: String },
    /// Solver failure; time and state are the last accepted values
    Integration {
        time: f64,
        last_state: State6,
        reason: String,
    },
}

impl SimError {
    pub fn config(reason: impl Into<String>) -> Self {
        SimError::InvalidConfiguration { reason: reason.into() }
    }

    pub fn input(reason: impl Into<String>) -> Self {
        SimError::InvalidInput { reason: reason.into() }
    }

    pub fn is_integration(&self) -> bool {
        matches!(self, SimError::Integration { .. })
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidConfiguration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            SimError::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            SimError::Integration { time, last_state, reason } => write!(
                f,
                "integration failed at t = {time:.6} s ({reason}); last state \
                 x = {:.4}, y = {:.4}, z = {:.4}, vx = {:.4}, vy = {:.4}, vz = {:.4}",
                last_state[0], last_state[1], last_state[2],
                last_state[3], last_state[4], last_state[5],
            ),
        }
    }
}

impl Error for SimError {}

impl From<csv::Error> for SimError {
    fn from(e: csv::Error) -> Self {
        SimError::input(e.to_string())
    }
}
