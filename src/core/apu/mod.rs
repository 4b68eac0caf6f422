//! The audio processing unit.
//!
//! Five channels (2 pulse, triangle, noise, and DMC) clocked in lock-step with the CPU,
//! a frame sequencer producing the slower envelope/length/sweep clocks, and a mixer whose
//! output is decimated into signed 16 bit samples.
mod dmc;
pub use dmc::{Dmc, DMC_RATES};
mod envelope;
pub use envelope::Envelope;
mod frame_sequencer;
pub use frame_sequencer::{FrameEvents, FrameSequencer, SequencerMode};
mod length_counter;
pub use length_counter::{LengthCounter, LENGTH_TABLE};
pub mod mixer;
mod noise;
pub use noise::{Noise, NOISE_PERIODS};
mod pulse;
pub use pulse::{Pulse, Sweep};
mod triangle;
pub use triangle::Triangle;

use std::{collections::VecDeque, fmt::Debug};

use log::*;

use crate::core::{
    registers::{
        DMC_FREQ, DMC_LEN, FRAME_COUNTER, NOISE_HI, NOISE_VOL, SND_CHN, SQ1_HI, SQ1_VOL, SQ2_HI,
        SQ2_VOL, TRI_HI, TRI_LINEAR,
    },
    Bus, Result, CPU_CLOCK_SPEED,
};

/// Number of CPU cycles averaged into a single output sample
pub const CPU_CYCLES_PER_SAMPLE: u32 = 40;
/// The output sample rate, in hertz
pub const SAMPLE_RATE: u32 = CPU_CLOCK_SPEED / CPU_CYCLES_PER_SAMPLE;
/// Number of samples held before the oldest ones are overwritten
pub const SAMPLE_BUFFER_LEN: usize = 8192;
// Pole of the DC blocking filter
const DC_BLOCK_POLE: f32 = 0.995;

/// The APU of the NES.
pub struct Apu {
    pub pulses: [Pulse; 2],
    pub triangle: Triangle,
    pub noise: Noise,
    pub dmc: Dmc,
    pub frame_sequencer: FrameSequencer,
    /// Sample address latched by the last `$4015` write enabling the DMC
    pub dmc_reload_addr: u16,
    /// Sample length latched by the last `$4015` write enabling the DMC
    pub dmc_reload_len: u16,
    // Total CPU cycles, used to find the APU's half speed clock
    cycles: u64,
    sample_sum: f32,
    sample_count: u32,
    // Previous input and output of the DC blocking filter
    filter_in: f32,
    filter_out: f32,
    samples: VecDeque<i16>,
    // Whether the buffer has overrun since it was last drained
    overrun: bool,
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Apu {
    pub fn new() -> Apu {
        Apu {
            pulses: [Pulse::new(true), Pulse::new(false)],
            triangle: Triangle::default(),
            noise: Noise::default(),
            dmc: Dmc::default(),
            frame_sequencer: FrameSequencer::default(),
            dmc_reload_addr: 0,
            dmc_reload_len: 0,
            cycles: 0,
            sample_sum: 0.0,
            sample_count: 0,
            filter_in: 0.0,
            filter_out: 0.0,
            samples: VecDeque::with_capacity(SAMPLE_BUFFER_LEN),
            overrun: false,
        }
    }
    /// Write a byte to an APU register given its address in CPU memory space
    pub fn write_register(&mut self, addr: usize, value: u8) {
        match addr {
            SQ1_VOL..=SQ1_HI => self.pulses[0].write(addr - SQ1_VOL, value),
            SQ2_VOL..=SQ2_HI => self.pulses[1].write(addr - SQ2_VOL, value),
            TRI_LINEAR..=TRI_HI => self.triangle.write(addr - TRI_LINEAR, value),
            NOISE_VOL..=NOISE_HI => self.noise.write(addr - NOISE_VOL, value),
            DMC_FREQ..=DMC_LEN => self.dmc.write(addr - DMC_FREQ, value),
            SND_CHN => {
                self.pulses[0].set_enabled((value & 0x01) != 0);
                self.pulses[1].set_enabled((value & 0x02) != 0);
                self.triangle.set_enabled((value & 0x04) != 0);
                self.noise.set_enabled((value & 0x08) != 0);
                // Only latches the sample, the DMC itself keeps playing whatever it was playing
                if (value & 0x10) != 0 {
                    self.dmc_reload_addr = self.dmc.sample_addr;
                    self.dmc_reload_len = self.dmc.sample_len;
                }
            }
            FRAME_COUNTER => {
                let events = self.frame_sequencer.write(value);
                self.on_frame_events(events);
            }
            _ => warn!("Trying to write {:X} to APU address {:X}", value, addr),
        }
    }
    /// Read `$4015`, clearing the frame IRQ flag.
    pub fn read_status(&mut self) -> u8 {
        macro_rules! bit_flag {
            ($flag: expr, $bit: literal) => {
                if $flag {
                    0x01 << $bit
                } else {
                    0x00
                }
            };
        }
        let v = bit_flag!(self.dmc.irq_flag, 7)
            | bit_flag!(self.frame_sequencer.irq_flag, 6)
            | bit_flag!(self.dmc.bytes_remaining > 0, 4)
            | bit_flag!(!self.noise.length_counter.muted(), 3)
            | bit_flag!(!self.triangle.length_counter.muted(), 2)
            | bit_flag!(!self.pulses[1].length_counter.muted(), 1)
            | bit_flag!(!self.pulses[0].length_counter.muted(), 0);
        self.frame_sequencer.irq_flag = false;
        v
    }
    /// Whether the frame sequencer or the DMC is raising an IRQ.
    pub fn irq_pending(&self) -> bool {
        self.frame_sequencer.irq_flag || self.dmc.irq_flag
    }
    /// Advance the APU by some number of CPU cycles.
    ///
    /// The bus is only read, by the DMC fetching sample bytes.
    pub fn advance_cpu_cycles(&mut self, cpu_cycles: u32, bus: &Bus) -> Result<()> {
        for _ in 0..cpu_cycles {
            let events = self.frame_sequencer.clock();
            self.on_frame_events(events);
            self.triangle.clock_timer();
            // Everything else runs on the APU clock, every other CPU cycle
            if self.cycles % 2 == 1 {
                self.pulses.iter_mut().for_each(|p| p.clock_timer());
                self.noise.clock_timer();
                self.dmc.clock_timer(bus)?;
            }
            self.cycles += 1;
            self.accumulate_sample();
        }
        Ok(())
    }
    fn on_frame_events(&mut self, events: FrameEvents) {
        if events.quarter {
            self.pulses
                .iter_mut()
                .for_each(|p| p.envelope.clock(p.length_counter.halt));
            self.noise
                .envelope
                .clock(self.noise.length_counter.halt);
            self.triangle.clock_linear();
        }
        if events.half {
            self.pulses.iter_mut().for_each(|p| {
                p.length_counter.clock();
                p.clock_sweep();
            });
            self.triangle.length_counter.clock();
            self.noise.length_counter.clock();
        }
    }
    /// The current output from the mixer, between 0 and 1
    pub fn mixer_output(&self) -> f32 {
        mixer::mix(
            self.pulses[0].value(),
            self.pulses[1].value(),
            self.triangle.value(),
            self.noise.value(),
            self.dmc.value(),
        )
    }
    fn accumulate_sample(&mut self) {
        self.sample_sum += self.mixer_output();
        self.sample_count += 1;
        if self.sample_count < CPU_CYCLES_PER_SAMPLE {
            return;
        }
        let average = self.sample_sum / self.sample_count as f32;
        self.sample_sum = 0.0;
        self.sample_count = 0;
        // Remove the DC offset the mixer's unipolar output has
        let filtered = average - self.filter_in + DC_BLOCK_POLE * self.filter_out;
        self.filter_in = average;
        self.filter_out = filtered;
        let sample = (filtered * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32);
        self.push_sample(sample as i16);
    }
    fn push_sample(&mut self, sample: i16) {
        if self.samples.len() >= SAMPLE_BUFFER_LEN {
            if !self.overrun {
                warn!("Sample buffer full, dropping the oldest samples");
                self.overrun = true;
            }
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }
    /// Take every sample produced since the last drain, oldest first.
    pub fn drain_samples(&mut self) -> Vec<i16> {
        self.overrun = false;
        self.samples.drain(..).collect()
    }
    /// Number of samples waiting to be drained
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Debug for Apu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Apu")
            .field("pulse1", &self.pulses[0])
            .field("pulse2", &self.pulses[1])
            .field("triangle", &self.triangle)
            .field("noise", &self.noise)
            .field("dmc", &self.dmc)
            .field("frame_sequencer", &self.frame_sequencer)
            .field("samples", &self.samples.len())
            .finish()
    }
}
