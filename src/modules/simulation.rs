/// ----- SIMULATION MODULE -----
/// Builds the building, starts every thread and watches for quiescence.
/// Once no elevator has moved for two consecutive observations and nothing
/// is queued, every passenger must have been delivered and the dispatcher
/// must be blocked on its conditions.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel as cbc;
use log::{error, info};

use crate::modules::buttons::Button;
use crate::modules::dispatcher::{DispatchQueue, Dispatcher};
use crate::modules::elevator::Elevator;
use crate::modules::monitor;
use crate::utilities::condition::ObservedCondition;
use crate::utilities::config::SimulationConfig;
use crate::utilities::elevator_id::ElevatorId;
use crate::utilities::error::{Result, Violation};
use crate::utilities::termination::Termination;

const STARTUP_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed { delivered: usize },
    Failed(Violation),
}

pub struct Simulation {
    config: SimulationConfig,
    termination: Termination,
    queue: Arc<DispatchQueue>,
    elevators: Vec<Arc<Elevator>>,
    dispatcher: Arc<Dispatcher>,
    buttons: Vec<Arc<Button>>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let termination = Termination::new();
        let queue = Arc::new(DispatchQueue::new());
        let elevators: Vec<Arc<Elevator>> = (0..config.num_elevators)
            .map(|i| Arc::new(Elevator::new(ElevatorId(i), queue.clone())))
            .collect();
        let buttons: Vec<Arc<Button>> = (0..config.num_floors)
            .map(|floor| Arc::new(Button::new(floor, config.num_floors, queue.clone())))
            .collect();
        let dispatcher = Arc::new(Dispatcher::new(queue.clone(), elevators.clone(), termination.clone()));
        Simulation { config, termination, queue, elevators, dispatcher, buttons }
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    pub fn elevators(&self) -> &[Arc<Elevator>] {
        &self.elevators
    }

    pub fn buttons(&self) -> &[Arc<Button>] {
        &self.buttons
    }

    pub fn run(&self) -> Result<Outcome> {
        let result = self.run_threads();
        if result.is_err() {
            // Threads that did start must still be able to stop.
            self.termination.terminate();
        }
        result
    }

    fn run_threads(&self) -> Result<Outcome> {
        let delay = self.config.tick_delay();
        info!(
            "starting simulation: {} floors, {} elevators, {}s window, {}ms ticks, {} presses per floor",
            self.config.num_floors,
            self.config.num_elevators,
            self.config.test_length_seconds,
            self.config.delay_milliseconds,
            self.config.press_count
        );

        // INITIALIZE ELEVATOR THREADS
        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        for elevator in &self.elevators {
            let elevator = elevator.clone();
            let termination = self.termination.clone();
            handles.push(
                thread::Builder::new()
                    .name(format!("elevator-{}", elevator.id()))
                    .spawn(move || elevator.run(delay, &termination))?,
            );
        }

        // INITIALIZE DISPATCHER THREAD
        let dispatcher_handle = {
            let dispatcher = self.dispatcher.clone();
            thread::Builder::new().name("dispatcher".to_string()).spawn(move || dispatcher.run())?
        };

        thread::sleep(STARTUP_GRACE);
        if dispatcher_handle.is_finished() {
            self.termination.fail(Violation::ControllerTerminatedEarly);
        } else if !self.queue.is_waiting() {
            self.termination.fail(Violation::ControllerNotWaiting);
        }

        // INITIALIZE BUTTON THREADS
        let mut button_handles: Vec<JoinHandle<()>> = Vec::new();
        for button in &self.buttons {
            let button = button.clone();
            let termination = self.termination.clone();
            let press_count = self.config.press_count;
            let window = self.config.test_length();
            button_handles.push(
                thread::Builder::new()
                    .name(format!("button-{}", button.floor()))
                    .spawn(move || button.run(press_count, window, &termination))?,
            );
        }

        // INITIALIZE MONITOR THREAD
        if self.config.print_state {
            let buttons = self.buttons.clone();
            let elevators = self.elevators.clone();
            let termination = self.termination.clone();
            handles.push(
                thread::Builder::new()
                    .name("monitor".to_string())
                    .spawn(move || monitor::main(buttons, elevators, delay, termination))?,
            );
        }

        self.sleep(self.config.test_length());
        for handle in button_handles {
            join(handle);
        }

        if !self.termination.is_terminated() {
            // More requests than elevators, so the dispatcher has to wait for one.
            if let Some(ground_floor) = self.buttons.first() {
                for _ in 0..=self.config.num_elevators {
                    ground_floor.spawn_and_press();
                }
            }
            self.watch_for_quiescence(delay);
        }

        self.termination.terminate();
        join(dispatcher_handle);
        for handle in handles {
            join(handle);
        }

        Ok(match self.termination.failure() {
            Some(violation) => Outcome::Failed(violation),
            None => {
                let delivered = self.buttons.iter().map(|button| button.presses()).sum();
                info!("All tests passed! {} passenger(s) delivered", delivered);
                Outcome::Passed { delivered }
            }
        })
    }

    fn watch_for_quiescence(&self, delay: Duration) {
        while !self.termination.is_terminated() {
            self.sleep(delay);
            let mut still_going = self.any_moving();
            self.sleep(delay);
            still_going |= self.any_moving();
            still_going |= !self.queue.is_empty();
            still_going |= !self.all_available();
            if still_going {
                continue;
            }

            match self.check_completion(delay) {
                Ok(()) => self.termination.terminate(),
                Err(violation) => self.termination.fail(violation),
            }
        }
    }

    fn check_completion(&self, delay: Duration) -> std::result::Result<(), Violation> {
        let undelivered: usize = self.buttons.iter().map(|button| button.undelivered()).sum();
        if undelivered > 0 {
            return Err(Violation::PassengersNotDelivered { undelivered });
        }
        if !self.dispatcher_settles(delay) {
            return Err(Violation::ControllerNotWaiting);
        }
        check_condition(self.queue.request_available())?;
        check_condition(self.queue.elevator_available())?;
        Ok(())
    }

    // The last drop-off wakes the dispatcher, so give it a moment to block again.
    fn dispatcher_settles(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay.max(STARTUP_GRACE);
        loop {
            if self.queue.is_waiting() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn any_moving(&self) -> bool {
        self.elevators.iter().any(|elevator| elevator.is_moving())
    }

    // A hailed elevator can stand still for a tick while its passenger boards.
    fn all_available(&self) -> bool {
        self.elevators.iter().all(|elevator| elevator.is_available())
    }

    /// Sleeps for `duration` unless the simulation terminates first.
    fn sleep(&self, duration: Duration) {
        let terminated = self.termination.receiver();
        cbc::select! {
            recv(cbc::after(duration)) -> _ => {},
            recv(terminated) -> _ => {},
        }
    }
}

fn check_condition(condition: &ObservedCondition) -> std::result::Result<(), Violation> {
    if !condition.was_awaited() {
        return Err(Violation::ConditionNeverAwaited(condition.name()));
    }
    if !condition.was_signalled() {
        return Err(Violation::ConditionNeverSignalled(condition.name()));
    }
    Ok(())
}

fn join(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("unnamed").to_string();
    if handle.join().is_err() {
        error!("thread {} panicked", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_checks_name_the_condition() {
        let condition = ObservedCondition::new("request_available");
        assert_eq!(check_condition(&condition), Err(Violation::ConditionNeverAwaited("request_available")));
    }

    #[test]
    fn builds_one_button_per_floor_and_lettered_elevators() {
        let config = SimulationConfig { num_floors: 4, num_elevators: 3, print_state: false, ..Default::default() };
        let simulation = Simulation::new(config);
        assert_eq!(simulation.buttons().len(), 4);
        let ids: Vec<String> = simulation.elevators().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert!(!simulation.termination().is_terminated());
    }
}
