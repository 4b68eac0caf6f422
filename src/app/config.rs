use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{app::AppError, core::Controller, core::Settings};

/// A controller state applied at the start of a given frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledInput {
    /// Frame the input is applied before, counting from 0
    pub frame: u64,
    /// Controller port, either `0` or `1`
    #[serde(default)]
    pub player: usize,
    /// State of the controller from this frame on
    #[serde(default)]
    pub controller: Controller,
}

/// Configuration for running the emulator headless.
///
/// Loaded from an optional YAML file, every field missing from the file keeps its default.
/// ```
/// use tinynes::app::Config;
/// let config = Config::from_yaml_str("frames: 10\npace: false").unwrap();
/// assert_eq!(config.frames, Some(10));
/// assert!(!config.pace);
/// assert_eq!(config.frame_duration_micros, 16_666);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of frames to run, or `None` to run until an error occurs
    pub frames: Option<u64>,
    /// Sleep between frames so the emulator runs at the console's speed
    pub pace: bool,
    /// Target wall clock time of a single frame when pacing
    pub frame_duration_micros: u64,
    pub log_level: LevelFilter,
    /// Where to write the audio output, if anywhere
    pub wav_output: Option<PathBuf>,
    /// Controller changes, in any order
    pub inputs: Vec<ScheduledInput>,
    pub emu_settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            frames: None,
            pace: true,
            frame_duration_micros: 16_666,
            log_level: LevelFilter::Info,
            wav_output: None,
            inputs: Vec::new(),
            emu_settings: Settings::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(contents: &str) -> Result<Config, AppError> {
        let config: Config = serde_yaml::from_str(contents)?;
        if let Some(input) = config.inputs.iter().find(|i| i.player > 1) {
            return Err(AppError::InvalidPlayer(input.player));
        }
        Ok(config)
    }
    pub fn from_yaml_file(path: &Path) -> Result<Config, AppError> {
        let contents = std::fs::read_to_string(path)?;
        Config::from_yaml_str(&contents)
    }
    /// The scheduled inputs that apply at the start of `frame`.
    pub fn inputs_at(&self, frame: u64) -> impl Iterator<Item = &ScheduledInput> {
        self.inputs.iter().filter(move |i| i.frame == frame)
    }
}
