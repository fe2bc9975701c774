//! Multi-elevator dispatch simulation.
//!
//! Buttons on every floor spawn passengers, a dispatcher thread hands each
//! request to an idle elevator, and every elevator runs its own tick loop.
//! The dispatcher blocks on two conditions instead of polling, and every
//! safety invariant (one floor per tick, board and exit at the right floor,
//! one passenger per elevator) fails the whole run when broken.

pub mod modules;
pub mod utilities;

pub use modules::dispatcher::{DispatchQueue, Dispatcher};
pub use modules::elevator::{Elevator, TickOutcome};
pub use modules::simulation::{Outcome, Simulation};
pub use utilities::config::SimulationConfig;
pub use utilities::termination::Termination;
