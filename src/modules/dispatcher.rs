/// ----- DISPATCHER MODULE -----
/// Matches button presses to idle elevators. Requests wait in one FIFO
/// queue behind the dispatch lock; the dispatcher blocks on
/// `request_available` while the queue is empty and on `elevator_available`
/// while every elevator is busy. Nothing here polls.
///
/// Lock order: dispatch lock first, then an elevator lock. Elevators never
/// take the dispatch lock while holding their own.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::modules::elevator::Elevator;
use crate::utilities::condition::ObservedCondition;
use crate::utilities::error::HailError;
use crate::utilities::passenger::PassengerRef;
use crate::utilities::request::Request;
use crate::utilities::termination::Termination;

pub const REQUEST_AVAILABLE: &str = "request_available";
pub const ELEVATOR_AVAILABLE: &str = "elevator_available";

/// The dispatch lock, the queue it guards and both conditions keyed off it.
#[derive(Debug)]
pub struct DispatchQueue {
    pending: Mutex<VecDeque<Request>>,
    request_available: ObservedCondition,
    elevator_available: ObservedCondition,
}

impl DispatchQueue {
    pub fn new() -> Self {
        DispatchQueue {
            pending: Mutex::new(VecDeque::new()),
            request_available: ObservedCondition::new(REQUEST_AVAILABLE),
            elevator_available: ObservedCondition::new(ELEVATOR_AVAILABLE),
        }
    }

    /// Never blocks for longer than it takes to get the dispatch lock.
    pub fn submit(&self, floor: u8, passenger: PassengerRef) {
        let mut pending = self.pending.lock();
        debug!("request from floor {} to {}", floor, passenger.destination());
        pending.push_back(Request::new(floor, passenger));
        self.request_available.notify_all();
    }

    /// Called by an elevator after it has flipped itself to available.
    pub fn notify_elevator_available(&self) {
        let _pending = self.pending.lock();
        self.elevator_available.notify_all();
    }

    /// Wakes a blocked dispatcher so it can observe termination.
    pub fn interrupt(&self) {
        let _pending = self.pending.lock();
        self.request_available.wake_all();
        self.elevator_available.wake_all();
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Floors with at least one queued request, oldest first, no duplicates.
    pub fn pending_floors(&self) -> Vec<u8> {
        let mut floors = Vec::new();
        for request in self.pending.lock().iter() {
            if !floors.contains(&request.floor) {
                floors.push(request.floor);
            }
        }
        floors
    }

    /// True while some thread is blocked on either condition.
    pub fn is_waiting(&self) -> bool {
        self.request_available.waiters() + self.elevator_available.waiters() > 0
    }

    pub fn request_available(&self) -> &ObservedCondition {
        &self.request_available
    }

    pub fn elevator_available(&self) -> &ObservedCondition {
        &self.elevator_available
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        DispatchQueue::new()
    }
}

pub struct Dispatcher {
    queue: Arc<DispatchQueue>,
    elevators: Vec<Arc<Elevator>>,
    termination: Termination,
}

impl Dispatcher {
    pub fn new(queue: Arc<DispatchQueue>, elevators: Vec<Arc<Elevator>>, termination: Termination) -> Self {
        let weak_queue = Arc::downgrade(&queue);
        termination.on_terminate(move || {
            if let Some(queue) = weak_queue.upgrade() {
                queue.interrupt();
            }
        });
        Dispatcher { queue, elevators, termination }
    }

    pub fn submit(&self, floor: u8, passenger: PassengerRef) {
        self.queue.submit(floor, passenger);
    }

    /// The dispatcher thread. Returns once the simulation terminates.
    pub fn run(&self) {
        info!("dispatcher started with {} elevator(s)", self.elevators.len());
        let mut pending = self.queue.pending.lock();
        loop {
            if self.termination.is_terminated() {
                break;
            }
            if pending.is_empty() {
                self.queue.request_available.wait(&mut pending);
                continue;
            }
            match self.first_available() {
                Some(elevator) => self.assign(&mut pending, elevator),
                None => self.queue.elevator_available.wait(&mut pending),
            }
        }
        if !pending.is_empty() {
            warn!("dispatcher stopped with {} request(s) still queued", pending.len());
        }
        info!("dispatcher stopped");
    }

    /// Lowest id wins among the idle elevators.
    fn first_available(&self) -> Option<&Arc<Elevator>> {
        self.elevators.iter().find(|elevator| elevator.is_available())
    }

    /// Hails `elevator` with the oldest request. Must be called with the
    /// dispatch lock held so that availability cannot go stale in between;
    /// if it does anyway the request goes back to the front of the queue.
    fn assign(&self, pending: &mut VecDeque<Request>, elevator: &Elevator) {
        let Some(request) = pending.pop_front() else {
            return;
        };
        match elevator.hail(request.floor, request.passenger.clone()) {
            Ok(()) => info!(
                "hailed elevator {} to floor {} for passenger {}",
                elevator.id(),
                request.floor,
                request.passenger
            ),
            Err(HailError::Occupied(id)) => {
                warn!("elevator {} was occupied, requeueing request from floor {}", id, request.floor);
                pending.push_front(request);
            }
        }
    }
}
