//! Observed wind-speed table loading
//!
//! Reads the `wind_speed` column of a CSV export, drops rows with no
//! reading and converts km/h to m/s unless the table is already cleaned.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::simulation::error::SimError;

pub const WIND_COLUMN: &str = "wind_speed";
pub const KMH_PER_MPS: f64 = 3.6;

/// Load the wind pool (m/s) from a CSV file
pub fn load_wind_pool(path: &Path, already_mps: bool) -> Result<Vec<f64>, SimError> {
    let file = File::open(path)
        .map_err(|e| SimError::input(format!("cannot open {}: {e}", path.display())))?;
    let pool = read_wind_pool(file, already_mps)?;
    debug!(path = %path.display(), samples = pool.len(), "loaded wind pool");
    Ok(pool)
}

/// Parse a wind pool (m/s) from any CSV reader
pub fn read_wind_pool<R: Read>(reader: R, already_mps: bool) -> Result<Vec<f64>, SimError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h == WIND_COLUMN)
        .ok_or_else(|| SimError::input(format!("no `{WIND_COLUMN}` column in wind table")))?;

    let mut pool = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record?;
        let value = record
            .get(column)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite());

        match value {
            Some(v) if already_mps => pool.push(v),
            Some(v) => pool.push(v / KMH_PER_MPS),
            None => dropped += 1,
        }
    }
    debug!(kept = pool.len(), dropped, "cleaned wind table");

    if pool.is_empty() {
        return Err(SimError::input("wind table has no usable readings"));
    }
    Ok(pool)
}
