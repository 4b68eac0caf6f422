use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::*;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use tinynes::{
    app::{AppError, Config, Runner},
    core::{Cartridge, Nes},
};

/// Run an NES cartridge headless.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the iNES (.nes) file
    rom: PathBuf,
    /// YAML file to load the configuration from
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to run, runs forever if not given
    #[arg(short, long)]
    frames: Option<u64>,
    /// Run as fast as possible instead of at the console's speed
    #[arg(long)]
    no_pace: bool,
    /// Write the audio output to a WAV file
    #[arg(short, long)]
    wav: Option<PathBuf>,
    /// Log level, one of off, error, warn, info, debug or trace
    #[arg(short, long)]
    log_level: Option<LevelFilter>,
    /// Log every instruction executed, implies --log-level trace
    #[arg(long)]
    trace: bool,
}

fn load_config(args: &Args) -> Result<Config, AppError> {
    let mut config = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    if args.frames.is_some() {
        config.frames = args.frames;
    }
    if args.no_pace {
        config.pace = false;
    }
    if args.wav.is_some() {
        config.wav_output = args.wav.clone();
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if args.trace {
        config.emu_settings.trace_instructions = true;
        config.log_level = LevelFilter::Trace;
    }
    Ok(config)
}

fn run(args: &Args, config: Config) -> Result<(), AppError> {
    let data = std::fs::read(&args.rom)?;
    let cartridge = Cartridge::from_ines(&data)?;
    info!("Loaded {}", args.rom.display());
    let nes = Nes::with_cartridge(cartridge)?;
    Runner::new(nes, config)?.run()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let log_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .build();
    if let Err(e) = TermLogger::init(
        config.log_level,
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Unable to initialize logging: {}", e);
    }
    match run(&args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
