use std::time::Instant;

use crate::simulation::engine::TrajectorySimulation;
use crate::simulation::error::SimError;
use crate::simulation::params::{Ammunition, EnvironmentConstants, IntegratorSettings};
use crate::simulation::wind::FixedWind;

/// Time full runs for each cartridge across solver tolerances
/// Paste output directly into a spreadsheet to graph
pub fn bench_integrator() -> Result<(), SimError> {
    let tolerances = [1e-6, 1e-8, 1e-10, 1e-12];
    let max_ticks = 100_000; // stop runaway settings

    println!("ammo,tol,ticks,evals,evals_per_tick,ms_total,us_per_tick");

    for ammo in Ammunition::ALL {
        for tol in tolerances {
            let settings = IntegratorSettings {
                atol: tol,
                rtol: tol,
                ..IntegratorSettings::default()
            };

            let mut sim = TrajectorySimulation::new(EnvironmentConstants::default(), settings)?;
            sim.setup_ammo(ammo, &mut FixedWind(3.0))?;
            sim.resume();

            let t0 = Instant::now();
            let mut ticks = 0;
            while !sim.snapshot().terminated && ticks < max_ticks {
                sim.step()?;
                ticks += 1;
            }
            let elapsed = t0.elapsed().as_secs_f64();

            let evals = sim.evaluations();
            println!(
                "{},{:e},{},{},{:.2},{:.3},{:.3}",
                ammo.choice(),
                tol,
                ticks,
                evals,
                evals as f64 / ticks.max(1) as f64,
                elapsed * 1000.0,
                elapsed * 1e6 / ticks.max(1) as f64,
            );
        }
    }
    Ok(())
}
