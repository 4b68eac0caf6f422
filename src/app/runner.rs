use std::{
    fs::File,
    io::BufWriter,
    thread::sleep,
    time::{Duration, Instant},
};

use hound::{SampleFormat, WavSpec, WavWriter};
use log::*;

use crate::{
    app::{AppError, Config},
    core::{apu::SAMPLE_RATE, FrameStatus, Nes},
};

/// Statistics about a run, logged when it finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub cycles: u64,
    /// Number of audio samples produced
    pub samples: u64,
    /// Frames where the PPU raised an NMI
    pub nmi_frames: u64,
}

/// Drives an [Nes] one frame at a time.
///
/// Applies the scheduled controller input before each frame, drains the audio buffer after it,
/// and sleeps so that each frame takes [Config::frame_duration_micros] when pacing.
pub struct Runner {
    pub nes: Nes,
    config: Config,
    wav: Option<WavWriter<BufWriter<File>>>,
    stats: RunStats,
    last_frame: Instant,
}

impl Runner {
    pub fn new(nes: Nes, config: Config) -> Result<Runner, AppError> {
        let wav = match &config.wav_output {
            Some(path) => {
                let spec = WavSpec {
                    channels: 1,
                    sample_rate: SAMPLE_RATE,
                    bits_per_sample: 16,
                    sample_format: SampleFormat::Int,
                };
                info!("Writing audio to {}", path.display());
                Some(WavWriter::create(path, spec)?)
            }
            None => None,
        };
        Ok(Runner {
            nes,
            config,
            wav,
            stats: RunStats::default(),
            last_frame: Instant::now(),
        })
    }
    /// Run a single frame.
    pub fn run_frame(&mut self) -> Result<FrameStatus, AppError> {
        for input in self.config.inputs_at(self.stats.frames) {
            debug!(
                "Frame {}: player {} now {:?}",
                input.frame, input.player, input.controller
            );
            self.nes
                .set_controller_state(input.player, input.controller);
        }
        let status = self.nes.advance_frame(&self.config.emu_settings)?;
        self.stats.frames += 1;
        self.stats.cycles += status.cycles as u64;
        if status.nmi_raised {
            self.stats.nmi_frames += 1;
        }
        let samples = self.nes.apu.drain_samples();
        self.stats.samples += samples.len() as u64;
        if let Some(wav) = &mut self.wav {
            let mut writer = wav.get_i16_writer(samples.len() as u32);
            samples.iter().for_each(|s| writer.write_sample(*s));
            writer.flush()?;
        }
        if self.config.pace {
            let target = Duration::from_micros(self.config.frame_duration_micros);
            let elapsed = self.last_frame.elapsed();
            if elapsed < target {
                sleep(target - elapsed);
            }
        }
        self.last_frame = Instant::now();
        Ok(status)
    }
    /// Run until the configured number of frames is reached, then [finish](Runner::finish).
    ///
    /// Runs forever if no frame count is configured.
    pub fn run(mut self) -> Result<RunStats, AppError> {
        let start = Instant::now();
        while self.config.frames.map_or(true, |f| self.stats.frames < f) {
            self.run_frame()?;
        }
        let stats = self.finish()?;
        let secs = start.elapsed().as_secs_f64();
        info!(
            "Ran {} frames ({} cycles) in {:.2}s, {:.1} fps",
            stats.frames,
            stats.cycles,
            secs,
            stats.frames as f64 / secs.max(f64::EPSILON)
        );
        Ok(stats)
    }
    /// Finalize the WAV file, if one is being written.
    pub fn finish(self) -> Result<RunStats, AppError> {
        if let Some(wav) = self.wav {
            wav.finalize()?;
        }
        info!(
            "{} samples produced, NMI raised on {} of {} frames",
            self.stats.samples, self.stats.nmi_frames, self.stats.frames
        );
        Ok(self.stats)
    }
    pub fn stats(&self) -> RunStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::Runner;
    use crate::{
        app::{Config, ScheduledInput},
        core::{Cartridge, Controller, Nes},
    };

    // Keeps enabling NMI, and reads the controller on every NMI
    fn nes() -> Nes {
        let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 0, 0, 0];
        image.resize(16, 0);
        let mut prg = vec![0xEA; 0x4000];
        let program = [
            0xA9, 0x80, // LDA #$80
            0x8D, 0x00, 0x20, // STA $2000
            0x4C, 0x00, 0x80, // JMP $8000
        ];
        prg[0..program.len()].copy_from_slice(&program);
        // NMI handler: strobe the controller and read A into $00
        let handler = [
            0xA9, 0x01, 0x8D, 0x16, 0x40, // LDA #1, STA $4016
            0xA9, 0x00, 0x8D, 0x16, 0x40, // LDA #0, STA $4016
            0xAD, 0x16, 0x40, 0x85, 0x00, // LDA $4016, STA $00
            0x40, // RTI
        ];
        prg[0x100..0x100 + handler.len()].copy_from_slice(&handler);
        prg[0x3FFA..0x3FFE].copy_from_slice(&[0x00, 0x81, 0x00, 0x80]);
        image.extend(prg);
        Nes::with_cartridge(Cartridge::from_ines(&image).unwrap()).unwrap()
    }

    #[test]
    fn test_runs_configured_frames() {
        let config = Config {
            frames: Some(3),
            pace: false,
            ..Config::default()
        };
        let stats = Runner::new(nes(), config).unwrap().run().unwrap();
        assert_eq!(stats.frames, 3);
        assert!(stats.cycles > 3 * 29000);
        assert!(stats.samples > 3 * 700);
    }
    #[test]
    fn test_scheduled_input() {
        let config = Config {
            pace: false,
            inputs: vec![ScheduledInput {
                frame: 2,
                player: 0,
                controller: Controller {
                    a: true,
                    ..Controller::default()
                },
            }],
            ..Config::default()
        };
        let mut runner = Runner::new(nes(), config).unwrap();
        runner.run_frame().unwrap();
        runner.run_frame().unwrap();
        assert_eq!(runner.nes.bus.read(0x00).unwrap(), 0);
        runner.run_frame().unwrap();
        runner.run_frame().unwrap();
        assert_eq!(runner.nes.bus.read(0x00).unwrap() & 0x01, 1);
    }
    #[test]
    fn test_wav_output() {
        let path = std::env::temp_dir().join("tinynes_runner_test.wav");
        let config = Config {
            frames: Some(2),
            pace: false,
            wav_output: Some(path.clone()),
            ..Config::default()
        };
        let stats = Runner::new(nes(), config).unwrap().run().unwrap();
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, crate::core::apu::SAMPLE_RATE);
        assert_eq!(reader.len() as u64, stats.samples);
        std::fs::remove_file(path).unwrap();
    }
}
