use std::fmt::Debug;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
/// An envelope generator unit.
/// Controls the volume of the APU's pulse and noise channels.
/// See [the NESDEV wiki](https://www.nesdev.org/wiki/APU_Envelope)
pub struct Envelope {
    /// Constant volume flag
    pub constant: bool,
    /// Volume value (either the volume or the divider's reload value)
    pub volume: u8,
    /// Start flag, set when the channel's length counter is reloaded
    pub start: bool,
    // Current value of the divider
    divider: u8,
    // Current value of the decay level
    decay: u8,
}
impl Envelope {
    /// Clock the envelope unit, on every quarter frame.
    ///
    /// * `looping`: Whether the decay level reloads to 15 after reaching 0, shared with the
    ///   length counter's halt flag
    pub fn clock(&mut self, looping: bool) {
        if self.start {
            self.start = false;
            self.decay = 0xF;
            self.divider = self.volume;
        } else if self.divider == 0 {
            self.divider = self.volume;
            if self.decay > 0 {
                self.decay -= 1;
            } else if looping {
                self.decay = 0xF;
            }
        } else {
            self.divider -= 1;
        }
    }
    /// Get the current output of the unit
    pub fn value(&self) -> u8 {
        if self.constant {
            self.volume
        } else {
            self.decay
        }
    }
}
impl Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "constant={} volume={:X} decay={:X}",
            self.constant, self.volume, self.decay
        )
    }
}
