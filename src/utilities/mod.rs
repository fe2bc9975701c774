pub mod condition;
pub mod config;
pub mod debug;
pub mod elevator_id;
pub mod error;
pub mod logger;
pub mod passenger;
pub mod request;
pub mod termination;
