use std::fs;

use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::Dispatch;
use log::LevelFilter;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "simulation.log";

/// Installs the global logger: colored lines on stderr and plain lines in
/// `logs/simulation.log`. Level comes from `RUST_LOG`, default `info`.
///
/// Stdout is left alone for the state frames.
pub fn init() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory at '{}': {}", LOG_DIR, e);
    }
    let log_file_path = format!("{}/{}", LOG_DIR, LOG_FILE);

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let console = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                colors.color(record.level()),
                std::thread::current().name().unwrap_or("main"),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut base = Dispatch::new().level(level).chain(console);

    match fern::log_file(&log_file_path) {
        Ok(file) => {
            base = base.chain(
                Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "[{} {} {}] {}",
                            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                            record.level(),
                            record.target(),
                            message
                        ))
                    })
                    .chain(file),
            );
        }
        Err(e) => eprintln!("Failed to open log file '{}': {}", log_file_path, e),
    }

    if let Err(e) = base.apply() {
        eprintln!("Failed to apply logger configuration: {}", e);
        return;
    }
    log::info!("Logger initialized. Logging to stderr and '{}'.", log_file_path);
}
