/// ----- BUTTONS MODULE -----
/// One call button per floor. Each press spawns a passenger with a random
/// destination and hands it to the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel as cbc;
use log::{debug, info};
use parking_lot::Mutex;
use rand::Rng;

use crate::modules::dispatcher::DispatchQueue;
use crate::utilities::passenger::{Passenger, PassengerRef};
use crate::utilities::termination::Termination;

pub struct Button {
    floor: u8,
    num_floors: u8,
    queue: Arc<DispatchQueue>,
    passengers: Mutex<Vec<PassengerRef>>,
}

impl Button {
    pub fn new(floor: u8, num_floors: u8, queue: Arc<DispatchQueue>) -> Self {
        Button {
            floor,
            num_floors,
            queue,
            passengers: Mutex::new(Vec::new()),
        }
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }

    pub fn spawn_and_press(&self) -> PassengerRef {
        let passenger = Arc::new(Passenger::random(self.floor, self.num_floors));
        self.passengers.lock().push(passenger.clone());
        self.queue.submit(self.floor, passenger.clone());
        passenger
    }

    /// Presses `press_count` times, each after a random delay shorter than
    /// `window`. Returns early if the simulation terminates first.
    pub fn run(&self, press_count: u32, window: Duration, termination: &Termination) {
        let terminated = termination.receiver();
        for _ in 0..press_count {
            let wait = random_delay(window);
            cbc::select! {
                recv(cbc::after(wait)) -> _ => {},
                recv(terminated) -> _ => {
                    debug!("button {} interrupted by termination", self.floor);
                    return;
                },
            }
            let passenger = self.spawn_and_press();
            info!("button {} pressed, passenger going to {}", self.floor, passenger.destination());
        }
    }

    /// Someone on this floor has not boarded yet.
    pub fn is_waiting(&self) -> bool {
        self.passengers.lock().iter().any(|passenger| passenger.is_waiting())
    }

    pub fn is_done(&self) -> bool {
        self.passengers.lock().iter().all(|passenger| passenger.is_done())
    }

    pub fn undelivered(&self) -> usize {
        self.passengers.lock().iter().filter(|passenger| !passenger.is_done()).count()
    }

    pub fn presses(&self) -> usize {
        self.passengers.lock().len()
    }
}

fn random_delay(window: Duration) -> Duration {
    let window_ms = window.as_millis() as u64;
    if window_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..window_ms))
}
