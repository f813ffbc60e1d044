//! Hand-off of a finished run to plotting and reporting

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::simulation::error::SimError;
use crate::simulation::states::Trace;

/// Write the trace as `step,x,y,z` rows
pub fn write_trace<W: Write>(trace: &Trace, writer: W) -> Result<(), SimError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["step", "x", "y", "z"])?;
    for (i, p) in trace.points().enumerate() {
        wtr.write_record(&[
            i.to_string(),
            format!("{:.6}", p.x),
            format!("{:.6}", p.y),
            format!("{:.6}", p.z),
        ])?;
    }
    wtr.flush()
        .map_err(|e| SimError::input(format!("failed to flush trace: {e}")))?;
    Ok(())
}

pub fn write_trace_file(trace: &Trace, path: &Path) -> Result<(), SimError> {
    let file = File::create(path)
        .map_err(|e| SimError::input(format!("cannot create {}: {e}", path.display())))?;
    write_trace(trace, file)
}

/// Summary figures of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightSummary {
    pub time_of_flight: f64,
    pub range: f64, // final x
    pub drift: f64, // final z
    pub apex: f64, // highest y
    pub final_speed: f64,
}

impl FlightSummary {
    pub fn new(time: f64, trace: &Trace, final_speed: f64) -> Option<Self> {
        let last = trace.points().last()?;
        Some(Self {
            time_of_flight: time,
            range: last.x,
            drift: last.z,
            apex: trace.apex()?,
            final_speed,
        })
    }
}
