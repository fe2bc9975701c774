use std::process::ExitCode;

use log::error;

use elevator_dispatch::modules::{self, simulation::Outcome};
use elevator_dispatch::utilities::logger;

fn main() -> ExitCode {
    logger::init();

    match modules::run() {
        Ok(Outcome::Passed { .. }) => ExitCode::SUCCESS,
        Ok(Outcome::Failed(violation)) => {
            error!("test failed: {}", violation);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("could not run simulation: {}", e);
            ExitCode::FAILURE
        }
    }
}
