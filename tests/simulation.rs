use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};

use elevator_dispatch::modules::buttons::Button;
use elevator_dispatch::utilities::elevator_id::ElevatorId;
use elevator_dispatch::utilities::passenger::Passenger;
use elevator_dispatch::{DispatchQueue, Dispatcher, Elevator, Outcome, Simulation, SimulationConfig, Termination};

struct Building {
    queue: Arc<DispatchQueue>,
    elevators: Vec<Arc<Elevator>>,
    termination: Termination,
    stopped: Vec<Receiver<()>>,
}

impl Building {
    /// Starts `num_elevators` elevator threads and one dispatcher thread.
    fn start(num_elevators: u8, delay: Duration) -> Self {
        let termination = Termination::new();
        let queue = Arc::new(DispatchQueue::new());
        let elevators: Vec<Arc<Elevator>> = (0..num_elevators)
            .map(|i| Arc::new(Elevator::new(ElevatorId(i), queue.clone())))
            .collect();
        let dispatcher = Arc::new(Dispatcher::new(queue.clone(), elevators.clone(), termination.clone()));

        let mut stopped = Vec::new();
        for elevator in &elevators {
            let elevator = elevator.clone();
            let termination = termination.clone();
            stopped.push(spawn(move || elevator.run(delay, &termination)));
        }
        stopped.push(spawn(move || dispatcher.run()));

        Building { queue, elevators, termination, stopped }
    }

    fn shutdown(self) -> Termination {
        self.termination.terminate();
        for stopped in &self.stopped {
            assert!(stopped.recv_timeout(Duration::from_secs(5)).is_ok(), "thread did not stop");
        }
        self.termination
    }
}

fn spawn<F: FnOnce() + Send + 'static>(f: F) -> Receiver<()> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        f();
        let _ = tx.send(());
    });
    rx
}

fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

fn quiet_config(num_floors: u8, num_elevators: u8, delay_milliseconds: u64, press_count: u32) -> SimulationConfig {
    SimulationConfig {
        num_floors,
        num_elevators,
        test_length_seconds: 1,
        delay_milliseconds,
        press_count,
        print_state: false,
    }
}

#[test]
fn no_requests_stays_quiescent() {
    let building = Building::start(1, Duration::from_millis(5));
    let button = Button::new(0, 1, building.queue.clone());
    button.run(0, Duration::from_millis(10), &building.termination);

    assert!(wait_until(Duration::from_secs(2), || building.queue.is_waiting()));
    thread::sleep(Duration::from_millis(100));

    assert!(building.queue.is_waiting());
    assert!(building.queue.request_available().was_awaited());
    assert!(building.queue.is_empty());
    assert_eq!(building.elevators[0].floor(), 0);
    assert!(building.elevators[0].is_available());
    assert!(!building.elevators[0].is_moving());

    let termination = building.shutdown();
    assert!(termination.passed());
}

#[test]
fn single_request_is_carried_to_its_destination() {
    let building = Building::start(1, Duration::from_millis(10));
    let passenger = Arc::new(Passenger::new(2, 0));
    building.queue.submit(2, passenger.clone());

    assert!(wait_until(Duration::from_secs(5), || passenger.is_done()));
    assert_eq!(passenger.carrier(), Some(ElevatorId(0)));
    assert_eq!(building.elevators[0].floor(), 0);
    assert!(wait_until(Duration::from_secs(1), || building.queue.is_waiting()));

    let termination = building.shutdown();
    assert!(termination.passed());
}

#[test]
fn idle_elevators_serve_simultaneous_requests_concurrently() {
    // Long ticks, so each trip takes far longer than the dispatcher needs.
    let building = Building::start(2, Duration::from_millis(50));
    let first = Arc::new(Passenger::new(3, 0));
    let second = Arc::new(Passenger::new(4, 0));
    building.queue.submit(3, first.clone());
    building.queue.submit(4, second.clone());

    assert!(wait_until(Duration::from_secs(1), || building.queue.is_empty()));
    assert!(!building.elevators[0].is_available());
    assert!(!building.elevators[1].is_available());
    assert!(first.is_waiting() && second.is_waiting());

    assert!(wait_until(Duration::from_secs(5), || first.is_done() && second.is_done()));
    assert_ne!(first.carrier(), second.carrier());

    let termination = building.shutdown();
    assert!(termination.passed());
}

#[test]
fn busy_elevator_is_never_hailed_twice() {
    let building = Building::start(1, Duration::from_millis(5));
    let passengers: Vec<Arc<Passenger>> = (0..5).map(|i| Arc::new(Passenger::new(i, 4 - i))).collect();
    for passenger in &passengers {
        building.queue.submit(passenger.origin(), passenger.clone());
    }

    assert!(wait_until(Duration::from_secs(5), || passengers.iter().all(|p| p.is_done())));
    assert!(building.queue.elevator_available().was_awaited());
    assert!(building.queue.elevator_available().was_signalled());

    let termination = building.shutdown();
    assert!(termination.passed());
}

#[test]
fn full_simulation_delivers_everyone() {
    let simulation = Simulation::new(quiet_config(4, 2, 10, 2));
    let outcome = simulation.run().unwrap();
    // Two presses per floor plus one extra press per elevator and one more.
    assert_eq!(outcome, Outcome::Passed { delivered: 4 * 2 + 3 });
    assert!(simulation.termination().is_terminated());
    assert!(simulation.buttons().iter().all(|button| button.is_done()));
}

#[test]
fn stress_with_fast_ticks_keeps_every_invariant() {
    let simulation = Simulation::new(quiet_config(8, 3, 1, 6));
    let outcome = simulation.run().unwrap();
    assert_eq!(outcome, Outcome::Passed { delivered: 8 * 6 + 4 });
    for elevator in simulation.elevators() {
        assert!(elevator.is_available());
        assert!(!elevator.is_moving());
    }
}
