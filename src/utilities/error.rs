use std::io;

use thiserror::Error;

use super::elevator_id::ElevatorId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config file could not be read: {0}")]
    Io(#[from] io::Error),

    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Returned by `hail` when the elevator already has a passenger assigned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HailError {
    #[error("elevator {0} is occupied")]
    Occupied(ElevatorId),
}

/// A broken safety invariant. Any of these halts the whole simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("elevator {elevator} left floor {expected} outside its tick and was found at {found}")]
    FloorTampered { elevator: ElevatorId, expected: u8, found: u8 },

    #[error("elevator {elevator} jumped from floor {from} to {to} in one tick")]
    FloorSkipped { elevator: ElevatorId, from: u8, to: u8 },

    #[error("elevator {elevator} was started twice")]
    ElevatorStartedTwice { elevator: ElevatorId },

    #[error("passenger {origin} is already on elevator {carrier}")]
    AlreadyBoarded { origin: u8, carrier: ElevatorId },

    #[error("cannot pick up passenger {origin} from floor {floor}")]
    WrongPickupFloor { origin: u8, floor: u8 },

    #[error("passenger {origin} has not boarded and cannot exit")]
    ExitWithoutBoarding { origin: u8 },

    #[error("passenger {origin}'s destination is {destination}, cannot drop off at {floor}")]
    WrongDropoffFloor { origin: u8, destination: u8, floor: u8 },

    #[error("passenger {origin} already exited")]
    ExitedTwice { origin: u8 },

    #[error("controller terminated early")]
    ControllerTerminatedEarly,

    #[error("controller is not waiting on its conditions")]
    ControllerNotWaiting,

    #[error("did not call wait on {0}")]
    ConditionNeverAwaited(&'static str),

    #[error("did not broadcast {0}")]
    ConditionNeverSignalled(&'static str),

    #[error("did not drop everyone off, {undelivered} passenger(s) left")]
    PassengersNotDelivered { undelivered: usize },
}
