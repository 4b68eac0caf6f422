use log::*;
use std::fmt::Debug;

use crate::core::{Bus, Result};

/// DMC timer periods, in APU cycles
pub const DMC_RATES: [u16; 16] = [
    214, 190, 170, 160, 143, 127, 113, 107, 95, 80, 71, 64, 53, 42, 36, 27,
];
/// Base address of DMC samples
const SAMPLE_BASE: u16 = 0xC000;

#[derive(Clone, PartialEq, Eq)]
/// The DMC channel of the NES.
///
/// A delta-modulation channel.
/// Takes 1-bit delta encoded samples from CPU memory and outputs a value
/// between 0 and 127 to the APU's mixer.
/// Can also raise an IRQ flag when a sample ends.
pub struct Dmc {
    /// Whether the IRQ is enabled
    pub irq_enabled: bool,
    /// The IRQ flag
    pub irq_flag: bool,
    /// Whether to restart the sample after playing it
    pub loop_flag: bool,
    /// Timer period, in APU cycles
    pub rate: u16,
    timer: u16,
    /// Address of the sample, in CPU memory space
    pub sample_addr: u16,
    /// Length of the sample in bytes
    pub sample_len: u16,
    /// Address of the next byte to fetch
    pub current_addr: u16,
    /// Number of bytes left to fetch
    pub bytes_remaining: u16,
    // Byte fetched but not yet being played
    sample_buffer: Option<u8>,
    // Byte currently being played
    shift: u8,
    bits_left: u8,
    silent: bool,
    /// The current output level
    pub output: u8,
}
impl Debug for Dmc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bytes_remaining={:X} silent={} rate={:3X} loop={} sample_addr={:X} sample_len={:X} IRQ={}, output={}",
            self.bytes_remaining,
            self.silent,
            self.rate,
            self.loop_flag,
            self.sample_addr,
            self.sample_len,
            self.irq_enabled,
            self.output
        )
    }
}
impl Default for Dmc {
    fn default() -> Self {
        Dmc {
            irq_enabled: false,
            irq_flag: false,
            loop_flag: false,
            rate: DMC_RATES[0],
            timer: 0,
            sample_addr: SAMPLE_BASE,
            sample_len: 1,
            current_addr: SAMPLE_BASE,
            bytes_remaining: 0,
            sample_buffer: None,
            shift: 0,
            bits_left: 8,
            silent: true,
            output: 0,
        }
    }
}
impl Dmc {
    /// Write one of the channel's registers, `reg` is the offset from `0x4010`.
    ///
    /// Writing the address or the length also points the reader at the new sample.
    /// ```
    /// let mut dmc = tinynes::core::apu::Dmc::default();
    /// dmc.write(2, 0x01);
    /// dmc.write(3, 0x02);
    /// assert_eq!(dmc.sample_addr, 0xC040);
    /// assert_eq!(dmc.sample_len, 0x21);
    /// ```
    pub fn write(&mut self, reg: usize, value: u8) {
        match reg {
            0 => {
                self.irq_enabled = (value & 0x80) != 0;
                if !self.irq_enabled {
                    self.irq_flag = false;
                }
                self.loop_flag = (value & 0x40) != 0;
                self.rate = DMC_RATES[(value & 0x0F) as usize];
            }
            1 => self.output = value & 0x7F,
            2 => {
                self.sample_addr = SAMPLE_BASE + 64 * value as u16;
                self.current_addr = self.sample_addr;
            }
            _ => {
                self.sample_len = 16 * value as u16 + 1;
                self.bytes_remaining = self.sample_len;
            }
        }
    }
    /// Clock the timer, once per APU cycle.
    ///
    /// Fetches sample bytes from the bus as the buffer empties.
    pub fn clock_timer(&mut self, bus: &Bus) -> Result<()> {
        if self.timer > 0 {
            self.timer -= 1;
            return Ok(());
        }
        self.timer = self.rate.saturating_sub(1);
        self.clock_output();
        self.fetch(bus)
    }
    fn clock_output(&mut self) {
        if !self.silent {
            let delta = if self.shift & 0x01 != 0 { 2 } else { -2 };
            self.output = (self.output as i16 + delta).clamp(0, 127) as u8;
        }
        self.shift >>= 1;
        self.bits_left -= 1;
        if self.bits_left == 0 {
            self.bits_left = 8;
            match self.sample_buffer.take() {
                Some(b) => {
                    self.shift = b;
                    self.silent = false;
                }
                None => self.silent = true,
            }
        }
    }
    fn fetch(&mut self, bus: &Bus) -> Result<()> {
        if self.sample_buffer.is_some() || self.bytes_remaining == 0 {
            return Ok(());
        }
        self.sample_buffer = Some(bus.read(self.current_addr as usize)?);
        self.current_addr = if self.current_addr == 0xFFFF {
            0x8000
        } else {
            self.current_addr + 1
        };
        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.current_addr = self.sample_addr;
                self.bytes_remaining = self.sample_len;
            } else if self.irq_enabled {
                trace!("DMC sample finished, raising IRQ");
                self.irq_flag = true;
            }
        }
        Ok(())
    }
    pub fn value(&self) -> u8 {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::Dmc;
    use crate::core::Bus;

    // A DMC playing a 1 byte sample at 0xFFFF, at the fastest rate
    fn dmc(bus: &mut Bus, sample: u8) -> Dmc {
        bus.write(0xFFFF, &[sample]).unwrap();
        bus.write(0x8000, &[0x00]).unwrap();
        let mut d = Dmc::default();
        d.write(0, 0x8F);
        d.write(2, 0xFF);
        d.write(3, 0x00);
        d.current_addr = 0xFFFF;
        d
    }

    #[test]
    fn test_address_wraps() {
        let mut bus = Bus::new();
        let mut d = dmc(&mut bus, 0xFF);
        d.clock_timer(&bus).unwrap();
        assert_eq!(d.current_addr, 0x8000);
    }
    #[test]
    fn test_irq_at_end_of_sample() {
        let mut bus = Bus::new();
        let mut d = dmc(&mut bus, 0xFF);
        d.clock_timer(&bus).unwrap();
        assert_eq!(d.bytes_remaining, 0);
        assert!(d.irq_flag);
        // Disabling the IRQ clears the flag
        d.write(0, 0x0F);
        assert!(!d.irq_flag);
    }
    #[test]
    fn test_no_irq_when_looping() {
        let mut bus = Bus::new();
        let mut d = dmc(&mut bus, 0xFF);
        d.write(0, 0xCF);
        d.clock_timer(&bus).unwrap();
        assert!(!d.irq_flag);
        assert_eq!(d.bytes_remaining, 1);
        assert_eq!(d.current_addr, d.sample_addr);
    }
    #[test]
    fn test_output_steps_and_clamps() {
        let mut bus = Bus::new();
        let mut d = dmc(&mut bus, 0xFF);
        d.output = 120;
        // Plays the silent first byte, then loads the sample
        (0..8 * 27).for_each(|_| d.clock_timer(&bus).unwrap());
        assert_eq!(d.output, 120);
        (0..8 * 27).for_each(|_| d.clock_timer(&bus).unwrap());
        assert_eq!(d.output, 127);
    }
    #[test]
    fn test_output_steps_down() {
        let mut bus = Bus::new();
        let mut d = dmc(&mut bus, 0x00);
        d.output = 3;
        (0..16 * 27).for_each(|_| d.clock_timer(&bus).unwrap());
        assert_eq!(d.output, 0);
    }
}
