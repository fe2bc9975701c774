use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;

use super::elevator_id::ElevatorId;
use super::error::Violation;

pub type PassengerRef = Arc<Passenger>;

#[derive(Debug, Default)]
struct Boarding {
    carrier: Option<ElevatorId>,
    done: bool,
}

/// A person waiting at `origin` who wants to go to `destination`.
///
/// `board` and `exit` are the only ways to change the passenger's state and
/// each checks that it happens at the right floor and in the right order.
#[derive(Debug)]
pub struct Passenger {
    origin: u8,
    destination: u8,
    boarding: Mutex<Boarding>,
}

impl Passenger {
    pub fn new(origin: u8, destination: u8) -> Self {
        Passenger {
            origin,
            destination,
            boarding: Mutex::new(Boarding::default()),
        }
    }

    /// Destination is drawn uniformly from every floor in the building,
    /// including the one the passenger is standing on.
    pub fn random(origin: u8, num_floors: u8) -> Self {
        let destination = rand::rng().random_range(0..num_floors.max(1));
        Passenger::new(origin, destination)
    }

    pub fn origin(&self) -> u8 {
        self.origin
    }

    pub fn destination(&self) -> u8 {
        self.destination
    }

    pub fn carrier(&self) -> Option<ElevatorId> {
        self.boarding.lock().carrier
    }

    pub fn is_waiting(&self) -> bool {
        self.boarding.lock().carrier.is_none()
    }

    pub fn is_done(&self) -> bool {
        self.boarding.lock().done
    }

    pub fn board(&self, elevator: ElevatorId, floor: u8) -> Result<(), Violation> {
        let mut boarding = self.boarding.lock();
        if let Some(carrier) = boarding.carrier {
            return Err(Violation::AlreadyBoarded { origin: self.origin, carrier });
        }
        if floor != self.origin {
            return Err(Violation::WrongPickupFloor { origin: self.origin, floor });
        }
        boarding.carrier = Some(elevator);
        Ok(())
    }

    pub fn exit(&self, floor: u8) -> Result<(), Violation> {
        let mut boarding = self.boarding.lock();
        if boarding.carrier.is_none() {
            return Err(Violation::ExitWithoutBoarding { origin: self.origin });
        }
        if boarding.done {
            return Err(Violation::ExitedTwice { origin: self.origin });
        }
        if floor != self.destination {
            return Err(Violation::WrongDropoffFloor {
                origin: self.origin,
                destination: self.destination,
                floor,
            });
        }
        boarding.done = true;
        Ok(())
    }
}

impl fmt::Display for Passenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)
    }
}
