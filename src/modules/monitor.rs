/// ----- MONITOR MODULE -----
/// Prints the state of the building once per tick until the simulation
/// terminates.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel as cbc;
use log::warn;

use crate::modules::buttons::Button;
use crate::modules::elevator::Elevator;
use crate::utilities::debug::{Debug, FloorView};
use crate::utilities::termination::Termination;

/// Gathers one consistent-per-elevator view of every floor.
pub fn floor_views(buttons: &[Arc<Button>], elevators: &[Arc<Elevator>]) -> Vec<FloorView> {
    let mut floors: Vec<FloorView> = buttons
        .iter()
        .map(|button| FloorView { waiting: button.is_waiting(), elevators: Vec::new() })
        .collect();
    for elevator in elevators {
        let snapshot = elevator.snapshot();
        if let Some(view) = floors.get_mut(snapshot.floor as usize) {
            view.elevators.push(snapshot);
        }
    }
    floors
}

pub fn main(
    buttons: Vec<Arc<Button>>,
    elevators: Vec<Arc<Elevator>>,
    delay: Duration,
    termination: Termination,
) {
    let mut debug = Debug::new();
    let timer = cbc::tick(delay);
    let terminated = termination.receiver();

    loop {
        cbc::select! {
            recv(timer) -> _ => {
                if let Err(e) = debug.print_state(&floor_views(&buttons, &elevators)) {
                    warn!("could not print state, monitor stopping: {}", e);
                    return;
                }
            },
            recv(terminated) -> _ => return,
        }
    }
}
