use super::{envelope::Envelope, length_counter::LengthCounter};
use std::fmt::Debug;

/// Noise timer periods, in APU cycles
pub const NOISE_PERIODS: [u16; 16] = [
    2, 4, 8, 16, 32, 48, 64, 80, 101, 127, 190, 254, 381, 508, 1017, 2034,
];

#[derive(Clone, Copy, PartialEq, Eq)]
/// The APU's noise channel.
/// Outputs pseudo random noise from a 15 bit linear feedback shift register.
pub struct Noise {
    pub length_counter: LengthCounter,
    pub envelope: Envelope,
    /// Short mode, taps bit 6 instead of bit 1
    pub mode: bool,
    /// Timer period, in APU cycles
    pub period: u16,
    timer: u16,
    /// The shift register, only the low 15 bits are used
    pub shift: u16,
    pub enabled: bool,
}
impl Debug for Noise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "on={} period={:3X} shift={:04X} length=[{:?}]",
            self.enabled, self.period, self.shift, self.length_counter
        )
    }
}

impl Default for Noise {
    fn default() -> Self {
        Noise {
            length_counter: LengthCounter::default(),
            envelope: Envelope::default(),
            mode: false,
            period: NOISE_PERIODS[0],
            timer: 0,
            shift: 1,
            enabled: false,
        }
    }
}

impl Noise {
    /// Write one of the channel's registers, `reg` is the offset from `0x400C`.
    pub fn write(&mut self, reg: usize, value: u8) {
        match reg {
            0 => {
                self.length_counter.halt = (value & 0x20) != 0;
                self.envelope.constant = (value & 0x10) != 0;
                self.envelope.volume = value & 0x0F;
            }
            // Unused
            1 => {}
            2 => {
                self.mode = (value & 0x80) != 0;
                self.period = NOISE_PERIODS[(value & 0x0F) as usize];
            }
            _ => {
                if self.enabled {
                    self.length_counter.reload(value >> 3);
                }
                self.envelope.start = true;
            }
        }
    }
    /// Shift the register once.
    ///
    /// ```
    /// let mut noise = tinynes::core::apu::Noise::default();
    /// noise.clock_shift();
    /// assert_eq!(noise.shift, 0x4000);
    /// ```
    pub fn clock_shift(&mut self) {
        let tap = if self.mode { 6 } else { 1 };
        let feedback = (self.shift ^ (self.shift >> tap)) & 0x01;
        self.shift = (self.shift >> 1) | (feedback << 14);
    }
    /// Clock the timer, once per APU cycle.
    pub fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period.saturating_sub(1);
            self.clock_shift();
        } else {
            self.timer -= 1;
        }
    }
    pub fn muted(&self) -> bool {
        self.shift & 0x01 != 0 || self.length_counter.muted()
    }
    pub fn value(&self) -> u8 {
        if !self.enabled || self.muted() {
            0
        } else {
            self.envelope.value()
        }
    }
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !self.enabled {
            self.length_counter.load = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Noise;

    #[test]
    fn test_short_mode_taps_bit_six() {
        let mut n = Noise {
            mode: true,
            shift: 0x0041,
            ..Noise::default()
        };
        n.clock_shift();
        // Bits 0 and 6 are both set, so the feedback is 0
        assert_eq!(n.shift, 0x0020);
    }
    #[test]
    fn test_muted_by_bit_zero() {
        let mut n = Noise::default();
        n.set_enabled(true);
        n.write(0, 0x1F);
        n.write(3, 0x00);
        assert_eq!(n.value(), 0);
        n.clock_shift();
        assert_eq!(n.value(), 15);
    }
    #[test]
    fn test_period_table() {
        let mut n = Noise::default();
        n.write(2, 0x8F);
        assert!(n.mode);
        assert_eq!(n.period, 2034);
    }
}
