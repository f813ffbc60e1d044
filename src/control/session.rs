//! Single-threaded driving loop
//!
//! One `tick` per loop iteration: apply the input command, then step the
//! simulation if it is running (or on an explicit single-step while paused).

use std::str::FromStr;

use tracing::debug;

use crate::simulation::engine::TrajectorySimulation;
use crate::simulation::error::SimError;
use crate::simulation::states::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Resume,
    Pause,
    Quit,
    StepOnce,
}

impl FromStr for Command {
    type Err = String;

    /// Key bindings: r, p, q, space (or s)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches(['\r', '\n']) {
            "r" | "resume" => Ok(Command::Resume),
            "p" | "pause" => Ok(Command::Pause),
            "q" | "quit" => Ok(Command::Quit),
            " " | "" | "s" | "step" => Ok(Command::StepOnce),
            other => Err(format!("unknown command `{other}`")),
        }
    }
}

/// Help text per key. Input is only read while paused, so a resumed run
/// goes on to ground impact or the tick limit.
pub const KEY_BINDINGS: [(&str, &str); 4] = [
    ("r", "resume; runs to ground impact without further input"),
    ("p", "stay paused"),
    ("q", "quit"),
    ("space", "step forward one tick (an empty line also works)"),
];

/// What the loop should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    Impact,
}

pub struct Session {
    pub sim: TrajectorySimulation,
    ticks: usize,
}

impl Session {
    pub fn new(sim: TrajectorySimulation) -> Self {
        Self { sim, ticks: 0 }
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn snapshot(&self) -> Snapshot {
        self.sim.snapshot()
    }

    /// Process one loop iteration
    pub fn tick(&mut self, command: Option<Command>) -> Result<Flow, SimError> {
        self.ticks += 1;

        match command {
            Some(Command::Pause) => {
                self.sim.pause();
                return Ok(Flow::Continue);
            }
            Some(Command::Resume) => {
                self.sim.resume();
                return Ok(Flow::Continue);
            }
            Some(Command::Quit) => {
                debug!(ticks = self.ticks, "quit requested");
                return Ok(Flow::Quit);
            }
            _ => {}
        }

        if self.sim.check_ground_impact() {
            return Ok(Flow::Impact);
        }

        let snap = self.sim.snapshot();
        if !snap.paused || command == Some(Command::StepOnce) {
            self.sim.step()?;
        }
        Ok(Flow::Continue)
    }

    /// Resume and tick until impact or `max_ticks`
    pub fn run_to_impact(&mut self, max_ticks: usize) -> Result<Flow, SimError> {
        self.sim.resume();
        for _ in 0..max_ticks {
            match self.tick(None)? {
                Flow::Continue => {}
                flow => return Ok(flow),
            }
        }
        if self.sim.check_ground_impact() {
            return Ok(Flow::Impact);
        }
        Ok(Flow::Continue)
    }
}
