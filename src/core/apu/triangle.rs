use super::length_counter::LengthCounter;
use std::fmt::Debug;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
/// The APU's triangle channel.
/// Steps through a 32 step 15 to 0 to 15 sequence, once per CPU cycle.
pub struct Triangle {
    pub length_counter: LengthCounter,
    pub linear_counter: u8,
    /// Linear counter reload value
    pub linear_reload: u8,
    pub reload_flag: bool,
    /// Also the length counter's halt flag
    pub control: bool,
    /// Timer period, in CPU cycles
    pub period: u16,
    timer: u16,
    pub sequencer: u8,
    pub enabled: bool,
}
impl Debug for Triangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "on={} period={:3X} length=[{:?}] linear={:X}",
            self.enabled, self.period, self.length_counter, self.linear_counter
        )
    }
}
impl Triangle {
    /// Write one of the channel's registers, `reg` is the offset from `0x4008`.
    pub fn write(&mut self, reg: usize, value: u8) {
        match reg {
            0 => {
                self.control = (value & 0x80) != 0;
                self.length_counter.halt = self.control;
                self.linear_reload = value & 0x7F;
            }
            // Unused
            1 => {}
            2 => self.period = (self.period & 0x0700) | value as u16,
            _ => {
                self.period = (self.period & 0x00FF) | (((value & 0x07) as u16) << 8);
                if self.enabled {
                    self.length_counter.reload(value >> 3);
                }
                self.reload_flag = true;
            }
        }
    }
    /// Whether either counter is holding the sequencer in place.
    pub fn halted(&self) -> bool {
        self.linear_counter == 0 || self.length_counter.muted()
    }
    /// Clock the timer, once per CPU cycle.
    pub fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            if !self.halted() {
                self.sequencer = (self.sequencer + 1) % 32;
            }
        } else {
            self.timer -= 1;
        }
    }
    /// Clock the linear counter, on every quarter frame.
    pub fn clock_linear(&mut self) {
        if self.reload_flag {
            self.linear_counter = self.linear_reload;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.control {
            self.reload_flag = false;
        }
    }
    /// The current output, silent while the channel is halted.
    pub fn value(&self) -> u8 {
        if self.halted() {
            0
        } else if self.sequencer < 16 {
            15 - self.sequencer
        } else {
            self.sequencer - 16
        }
    }
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !self.enabled {
            self.length_counter.load = 0;
        }
    }
}
