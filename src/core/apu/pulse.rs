use super::{envelope::Envelope, length_counter::LengthCounter};
use std::fmt::Debug;

const DUTY_CYCLES: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 1, 1, 1],
];

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
/// A pulse channel's sweep unit.
/// Periodically moves the channel's period up or down.
pub struct Sweep {
    pub enabled: bool,
    /// Divider period, in half frames
    pub period: u8,
    pub negate: bool,
    pub shift: u8,
    // Set when the sweep register is written, reloads the divider on the next half frame
    reload: bool,
    divider: u8,
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
/// One of the APU's pulse channels.
/// Outputs a pulse (rectangle) wave.
pub struct Pulse {
    /// Whether this is pulse 1, which negates its sweep with one's complement
    pub first: bool,
    /// The index of the duty to use
    pub duty: u8,
    /// The period of the pulse wave, in APU cycles
    pub period: u16,
    // Counts down to the next sequencer step
    timer: u16,
    /// The index of the duty step currently being sent to the mixer
    pub sequencer: u8,
    pub envelope: Envelope,
    pub length_counter: LengthCounter,
    pub sweep: Sweep,
    /// Whether the channel is enabled through `$4015`
    pub enabled: bool,
}

impl Pulse {
    pub fn new(first: bool) -> Pulse {
        Pulse {
            first,
            ..Pulse::default()
        }
    }
    /// Write one of the channel's 4 registers, `reg` is the offset from the first one.
    pub fn write(&mut self, reg: usize, value: u8) {
        match reg {
            0 => {
                self.duty = value >> 6;
                self.length_counter.halt = (value & 0x20) != 0;
                self.envelope.constant = (value & 0x10) != 0;
                self.envelope.volume = value & 0x0F;
            }
            1 => {
                self.sweep.enabled = (value & 0x80) != 0;
                self.sweep.period = (value >> 4) & 0x07;
                self.sweep.negate = (value & 0x08) != 0;
                self.sweep.shift = value & 0x07;
                self.sweep.reload = true;
            }
            2 => self.period = (self.period & 0x0700) | value as u16,
            _ => {
                self.period = (self.period & 0x00FF) | (((value & 0x07) as u16) << 8);
                if self.enabled {
                    self.length_counter.reload(value >> 3);
                }
                self.sequencer = 0;
                self.envelope.start = true;
            }
        }
    }
    /// The period the sweep unit is currently moving towards.
    ///
    /// ```
    /// use tinynes::core::apu::Pulse;
    /// let mut first = Pulse::new(true);
    /// let mut second = Pulse::new(false);
    /// for p in [&mut first, &mut second] {
    ///     p.period = 0x100;
    ///     p.write(1, 0x89);
    /// }
    /// assert_eq!(first.target_period(), 0x100 - 0x80 - 1);
    /// assert_eq!(second.target_period(), 0x100 - 0x80);
    /// ```
    pub fn target_period(&self) -> u16 {
        let change = self.period >> self.sweep.shift;
        if self.sweep.negate {
            let extra = if self.first { 1 } else { 0 };
            self.period.saturating_sub(change + extra)
        } else {
            self.period + change
        }
    }
    /// Whether the sweep unit is muting the channel.
    pub fn sweep_muted(&self) -> bool {
        self.period < 8 || self.target_period() > 0x7FF
    }
    /// Clock the timer, once per APU cycle.
    pub fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            self.sequencer = (self.sequencer + 1) % 8;
        } else {
            self.timer -= 1;
        }
    }
    /// Clock the sweep unit, on every half frame.
    pub fn clock_sweep(&mut self) {
        if self.sweep.divider == 0
            && self.sweep.enabled
            && self.sweep.shift > 0
            && !self.sweep_muted()
        {
            self.period = self.target_period();
        }
        if self.sweep.divider == 0 || self.sweep.reload {
            self.sweep.divider = self.sweep.period;
            self.sweep.reload = false;
        } else {
            self.sweep.divider -= 1;
        }
    }
    pub fn value(&self) -> u8 {
        if !self.enabled
            || self.length_counter.muted()
            || self.sweep_muted()
            || DUTY_CYCLES[self.duty as usize][self.sequencer as usize] == 0
        {
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
impl Debug for Pulse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "on={} period={:3X} target={:X} duty={:X} length=[{:?}] sweep=[on={} shift={:X}]",
            self.enabled,
            self.period,
            self.target_period(),
            self.duty,
            self.length_counter,
            self.sweep.enabled,
            self.sweep.shift
        )
    }
}
