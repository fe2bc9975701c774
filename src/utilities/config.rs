use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};

use super::error::{Error, Result};

const CONFIG_FILE: &str = "config.json";
const FALLBACK_CONFIG_FILE: &str = "_config.json";

/// Experimental parameters of one simulation run.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Floors are numbered from 0.
    pub num_floors: u8,
    pub num_elevators: u8,
    /// Window during which buttons are pressed at random times.
    pub test_length_seconds: u64,
    /// Time between two elevator ticks.
    pub delay_milliseconds: u64,
    /// Presses per button, and therefore passengers spawned per floor.
    pub press_count: u32,
    pub print_state: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_floors: 25,
            num_elevators: 5,
            test_length_seconds: 30,
            delay_milliseconds: 500,
            press_count: 2,
            print_state: true,
        }
    }
}

impl SimulationConfig {
    /// Reads `config.json`, then `_config.json`, then falls back to the
    /// defaults. Command line flags override whatever was loaded.
    pub fn get() -> Result<Self> {
        let mut config = match read_config_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(Error::Io(_)) => match read_config_file(FALLBACK_CONFIG_FILE) {
                Ok(config) => config,
                Err(Error::Io(_)) => {
                    info!("No configuration file provided, using default settings...");
                    SimulationConfig::default()
                }
                Err(e) => return Err(e),
            },
            Err(e) => return Err(e),
        };
        let args: Vec<String> = env::args().skip(1).collect();
        config.apply_args(&args);
        config.validate()?;
        Ok(config)
    }

    /// Applies `--flag value` pairs. Unknown flags and malformed numbers are
    /// logged and skipped.
    pub fn apply_args(&mut self, args: &[String]) {
        for arg_pair in args.chunks(2) {
            let (flag, value) = match arg_pair {
                [flag, value] => (flag.as_str(), value.as_str()),
                [flag] => {
                    warn!("argument {} has no value, skipping...", flag);
                    continue;
                }
                _ => continue,
            };
            match flag {
                "--floors" => set_number(&mut self.num_floors, flag, value),
                "--elevators" => set_number(&mut self.num_elevators, flag, value),
                "--seconds" => set_number(&mut self.test_length_seconds, flag, value),
                "--delay" => set_number(&mut self.delay_milliseconds, flag, value),
                "--presses" => set_number(&mut self.press_count, flag, value),
                _ => warn!("illegal argument {}, skipping...", flag),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_floors == 0 {
            return Err(Error::InvalidConfig("there must be at least one floor".to_string()));
        }
        if self.num_elevators == 0 {
            return Err(Error::InvalidConfig("there must be at least one elevator".to_string()));
        }
        if self.delay_milliseconds == 0 {
            return Err(Error::InvalidConfig("tick delay must be at least 1 ms".to_string()));
        }
        Ok(())
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.delay_milliseconds)
    }

    pub fn test_length(&self) -> Duration {
        Duration::from_secs(self.test_length_seconds)
    }
}

pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn set_number<T: std::str::FromStr>(field: &mut T, flag: &str, value: &str) {
    match value.parse::<T>() {
        Ok(number) => *field = number,
        Err(_) => warn!("{} {} is not a number, skipping...", flag, value),
    }
}
