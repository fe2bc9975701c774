/// ----- ELEVATOR MODULE -----
/// One elevator and its state machine. Every tick moves the car at most one
/// floor toward its target, then either picks up or drops off its single
/// passenger. All state lives behind the elevator's own lock.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel as cbc;
use log::{debug, info};
use parking_lot::Mutex;

use crate::modules::dispatcher::DispatchQueue;
use crate::utilities::elevator_id::ElevatorId;
use crate::utilities::error::{HailError, Violation};
use crate::utilities::passenger::PassengerRef;
use crate::utilities::termination::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Idle,
    EnRoutePickup,
    Carrying,
}

impl Behaviour {
    pub fn as_string(&self) -> String {
        match self {
            Behaviour::Idle => String::from("idle"),
            Behaviour::EnRoutePickup => String::from("pickup"),
            Behaviour::Carrying => String::from("carrying"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Moved,
    PickedUp,
    DroppedOff,
}

#[derive(Debug, Clone)]
enum Trip {
    Idle,
    Hailed(PassengerRef),
    Carrying(PassengerRef),
}

#[derive(Debug)]
struct ElevatorState {
    floor: u8,
    target_floor: u8,
    // Floor as left by the previous tick.
    settled_floor: u8,
    trip: Trip,
}

impl ElevatorState {
    fn step(&mut self) -> bool {
        if self.floor == self.target_floor {
            return false;
        }
        if self.floor < self.target_floor {
            self.floor += 1;
        } else {
            self.floor -= 1;
        }
        true
    }

    fn should_pick_up(&self) -> bool {
        match &self.trip {
            Trip::Hailed(passenger) => self.floor == passenger.origin(),
            Trip::Idle | Trip::Carrying(_) => false,
        }
    }

    fn should_offload(&self) -> bool {
        match &self.trip {
            Trip::Carrying(passenger) => self.floor == passenger.destination(),
            Trip::Idle | Trip::Hailed(_) => false,
        }
    }

    fn behaviour(&self) -> Behaviour {
        match self.trip {
            Trip::Idle => Behaviour::Idle,
            Trip::Hailed(_) => Behaviour::EnRoutePickup,
            Trip::Carrying(_) => Behaviour::Carrying,
        }
    }
}

/// Consistent copy of an elevator's state, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatorSnapshot {
    pub id: ElevatorId,
    pub floor: u8,
    pub target_floor: u8,
    pub behaviour: Behaviour,
    /// Origin floor of the passenger, if one is assigned.
    pub passenger: Option<u8>,
}

impl fmt::Display for ElevatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.behaviour, self.passenger) {
            (Behaviour::Carrying, Some(origin)) => write!(f, "{}({})->{}", self.id, origin, self.target_floor),
            _ => write!(f, "{}()->{}", self.id, self.target_floor),
        }
    }
}

pub struct Elevator {
    id: ElevatorId,
    state: Mutex<ElevatorState>,
    queue: Arc<DispatchQueue>,
    started: AtomicBool,
}

impl Elevator {
    /// Starts idle at floor 0.
    pub fn new(id: ElevatorId, queue: Arc<DispatchQueue>) -> Self {
        Elevator {
            id,
            state: Mutex::new(ElevatorState {
                floor: 0,
                target_floor: 0,
                settled_floor: 0,
                trip: Trip::Idle,
            }),
            queue,
            started: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn floor(&self) -> u8 {
        self.state.lock().floor
    }

    pub fn target_floor(&self) -> u8 {
        self.state.lock().target_floor
    }

    pub fn is_moving(&self) -> bool {
        let state = self.state.lock();
        state.floor != state.target_floor
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state.lock().trip, Trip::Idle)
    }

    pub fn snapshot(&self) -> ElevatorSnapshot {
        let state = self.state.lock();
        let passenger = match &state.trip {
            Trip::Idle => None,
            Trip::Hailed(passenger) | Trip::Carrying(passenger) => Some(passenger.origin()),
        };
        ElevatorSnapshot {
            id: self.id,
            floor: state.floor,
            target_floor: state.target_floor,
            behaviour: state.behaviour(),
            passenger,
        }
    }

    /// Sends the elevator to `floor` to fetch `passenger`. Only valid while idle.
    pub fn hail(&self, floor: u8, passenger: PassengerRef) -> Result<(), HailError> {
        let mut state = self.state.lock();
        if !matches!(state.trip, Trip::Idle) {
            return Err(HailError::Occupied(self.id));
        }
        state.target_floor = floor;
        state.trip = Trip::Hailed(passenger);
        Ok(())
    }

    /// Advances the state machine by one step. On drop-off the dispatcher is
    /// told that this elevator is free again, after the elevator lock is released.
    pub fn tick(&self) -> Result<TickOutcome, Violation> {
        let outcome = {
            let mut state = self.state.lock();
            if state.floor != state.settled_floor {
                return Err(Violation::FloorTampered {
                    elevator: self.id,
                    expected: state.settled_floor,
                    found: state.floor,
                });
            }

            let before = state.floor;
            let moved = state.step();
            if state.floor.abs_diff(before) > 1 {
                return Err(Violation::FloorSkipped { elevator: self.id, from: before, to: state.floor });
            }
            state.settled_floor = state.floor;
            if moved {
                debug!("elevator {} at floor {}", self.id, state.floor);
            }

            if state.should_pick_up() {
                self.pick_up(&mut state)?;
                TickOutcome::PickedUp
            } else if state.should_offload() {
                self.offload(&mut state)?;
                TickOutcome::DroppedOff
            } else if moved {
                TickOutcome::Moved
            } else {
                TickOutcome::Idle
            }
        };

        if outcome == TickOutcome::DroppedOff {
            self.queue.notify_elevator_available();
        }
        Ok(outcome)
    }

    fn pick_up(&self, state: &mut ElevatorState) -> Result<(), Violation> {
        let passenger = match &state.trip {
            Trip::Hailed(passenger) => passenger.clone(),
            Trip::Idle | Trip::Carrying(_) => return Ok(()),
        };
        passenger.board(self.id, state.floor)?;
        info!("elevator {} picked up passenger {} at floor {}", self.id, passenger, state.floor);
        state.target_floor = passenger.destination();
        state.trip = Trip::Carrying(passenger);
        Ok(())
    }

    fn offload(&self, state: &mut ElevatorState) -> Result<(), Violation> {
        if let Trip::Carrying(passenger) = &state.trip {
            passenger.exit(state.floor)?;
            info!("elevator {} dropped off passenger {} at floor {}", self.id, passenger, state.floor);
        }
        state.trip = Trip::Idle;
        Ok(())
    }

    /// The elevator thread: one tick every `delay` until termination. A
    /// violation fails the whole simulation.
    pub fn run(&self, delay: Duration, termination: &Termination) {
        if self.started.swap(true, Ordering::SeqCst) {
            termination.fail(Violation::ElevatorStartedTwice { elevator: self.id });
            return;
        }
        info!("elevator {} started", self.id);

        let timer = cbc::tick(delay);
        let terminated = termination.receiver();
        while !termination.is_terminated() {
            cbc::select! {
                recv(timer) -> _ => {
                    if let Err(violation) = self.tick() {
                        termination.fail(violation);
                        return;
                    }
                },
                recv(terminated) -> _ => break,
            }
        }
        let snapshot = self.snapshot();
        info!("elevator {} stopped at floor {} ({})", self.id, snapshot.floor, snapshot.behaviour.as_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::passenger::Passenger;

    fn elevator() -> Elevator {
        Elevator::new(ElevatorId(0), Arc::new(DispatchQueue::new()))
    }

    #[test]
    fn idle_elevator_stays_put() {
        let elevator = elevator();
        for _ in 0..3 {
            assert_eq!(elevator.tick(), Ok(TickOutcome::Idle));
        }
        assert_eq!(elevator.floor(), 0);
        assert!(elevator.is_available());
        assert!(!elevator.is_moving());
    }

    #[test]
    fn serves_passenger_in_four_ticks() {
        let elevator = elevator();
        let passenger = Arc::new(Passenger::new(2, 0));
        elevator.hail(2, passenger.clone()).unwrap();
        assert!(!elevator.is_available());
        assert!(elevator.is_moving());

        assert_eq!(elevator.tick(), Ok(TickOutcome::Moved));
        assert_eq!(elevator.floor(), 1);
        assert!(passenger.is_waiting());

        assert_eq!(elevator.tick(), Ok(TickOutcome::PickedUp));
        assert_eq!(elevator.floor(), 2);
        assert_eq!(passenger.carrier(), Some(ElevatorId(0)));
        assert_eq!(elevator.target_floor(), 0);
        assert_eq!(elevator.snapshot().behaviour, Behaviour::Carrying);

        assert_eq!(elevator.tick(), Ok(TickOutcome::Moved));
        assert!(!passenger.is_done());

        assert_eq!(elevator.tick(), Ok(TickOutcome::DroppedOff));
        assert_eq!(elevator.floor(), 0);
        assert!(passenger.is_done());
        assert!(elevator.is_available());
    }

    #[test]
    fn hail_while_busy_is_occupied() {
        let elevator = elevator();
        elevator.hail(3, Arc::new(Passenger::new(3, 1))).unwrap();
        assert_eq!(
            elevator.hail(1, Arc::new(Passenger::new(1, 0))),
            Err(HailError::Occupied(ElevatorId(0)))
        );
        // Still occupied while carrying.
        for _ in 0..3 {
            elevator.tick().unwrap();
        }
        assert_eq!(elevator.snapshot().behaviour, Behaviour::Carrying);
        assert!(elevator.hail(1, Arc::new(Passenger::new(1, 0))).is_err());
    }

    #[test]
    fn same_floor_trip_picks_up_then_drops_off() {
        let elevator = elevator();
        let passenger = Arc::new(Passenger::new(0, 0));
        elevator.hail(0, passenger.clone()).unwrap();
        assert_eq!(elevator.tick(), Ok(TickOutcome::PickedUp));
        assert_eq!(elevator.tick(), Ok(TickOutcome::DroppedOff));
        assert!(passenger.is_done());
    }

    #[test]
    fn never_moves_more_than_one_floor() {
        let elevator = elevator();
        elevator.hail(7, Arc::new(Passenger::new(7, 2))).unwrap();
        let mut previous = elevator.floor();
        for _ in 0..20 {
            elevator.tick().unwrap();
            let floor = elevator.floor();
            assert!(floor.abs_diff(previous) <= 1);
            previous = floor;
        }
        assert_eq!(previous, 2);
        assert!(elevator.is_available());
    }

    #[test]
    fn never_boards_away_from_origin() {
        // Target floor 1 but the passenger waits on 2.
        let elevator = elevator();
        let passenger = Arc::new(Passenger::new(2, 0));
        elevator.hail(1, passenger.clone()).unwrap();
        for _ in 0..3 {
            elevator.tick().unwrap();
        }
        assert_eq!(elevator.floor(), 1);
        assert!(passenger.is_waiting());
    }

    #[test]
    fn already_boarded_passenger_is_a_violation() {
        let elevator = elevator();
        let passenger = Arc::new(Passenger::new(0, 2));
        passenger.board(ElevatorId(5), 0).unwrap();
        elevator.hail(0, passenger).unwrap();
        assert_eq!(
            elevator.tick(),
            Err(Violation::AlreadyBoarded { origin: 0, carrier: ElevatorId(5) })
        );
    }

    #[test]
    fn second_start_fails_the_simulation() {
        let elevator = Arc::new(elevator());
        let termination = Termination::new();
        let handle = {
            let elevator = elevator.clone();
            let termination = termination.clone();
            std::thread::spawn(move || elevator.run(Duration::from_millis(5), &termination))
        };
        while !elevator.started.load(Ordering::SeqCst) {
            std::thread::yield_now();
        }
        elevator.run(Duration::from_millis(5), &termination);
        handle.join().unwrap();
        assert_eq!(
            termination.failure(),
            Some(Violation::ElevatorStartedTwice { elevator: ElevatorId(0) })
        );
    }

    #[test]
    fn snapshot_renders_like_state_frame() {
        let elevator = elevator();
        assert_eq!(elevator.snapshot().to_string(), "A()->0");
        elevator.hail(1, Arc::new(Passenger::new(1, 3))).unwrap();
        assert_eq!(elevator.snapshot().to_string(), "A()->1");
        elevator.tick().unwrap();
        assert_eq!(elevator.snapshot().to_string(), "A(1)->3");
    }
}
