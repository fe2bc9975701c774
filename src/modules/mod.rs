pub mod buttons;
pub mod dispatcher;
pub mod elevator;
pub mod monitor;
pub mod simulation;

use crate::utilities::config::SimulationConfig;
use crate::utilities::error::Result;

use self::simulation::{Outcome, Simulation};

/// Reads the configuration and runs one full simulation.
pub fn run() -> Result<Outcome> {
    let config = SimulationConfig::get()?;
    Simulation::new(config).run()
}
