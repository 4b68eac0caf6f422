//! The application code, used when running tinynes as a standalone program.
//!
//! Runs a cartridge headless for some number of frames, feeding it scripted controller input
//! and optionally recording its audio output to a WAV file.
//! All of the actual NES emulation is done by importing from [core](crate::core).
mod config;
pub use config::{Config, ScheduledInput};
mod runner;
pub use runner::{RunStats, Runner};

use thiserror::Error;

/// Anything that can go wrong while running the emulator as a program.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("could not write audio: {0}")]
    Wav(#[from] hound::Error),
    #[error(transparent)]
    Core(#[from] crate::core::Error),
    #[error("controller input for player {0}, only players 0 and 1 exist")]
    InvalidPlayer(usize),
}
