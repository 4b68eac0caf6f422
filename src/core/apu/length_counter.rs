use std::fmt::Debug;

/// Length counter values, indexed by the top 5 bits of a channel's length register.
pub const LENGTH_TABLE: [u8; 0x20] = [
    0x0A, 0xFE, 0x14, 0x02, 0x28, 0x04, 0x50, 0x06, 0xA0, 0x08, 0x3C, 0x0A, 0x0E, 0x0C, 0x1A, 0x0E,
    0x0C, 0x10, 0x18, 0x12, 0x30, 0x14, 0x60, 0x16, 0xC0, 0x18, 0x48, 0x1A, 0x10, 0x1C, 0x20, 0x1E,
];

#[derive(Clone, Copy, Default, PartialEq, Eq)]
/// A length counter.
/// Simple divider that mutes a channel when it hits 0.
pub struct LengthCounter {
    /// The halt flag, pauses the counter when true
    pub halt: bool,
    /// The current value
    pub load: u8,
}
impl LengthCounter {
    /// Return `true` if the counter should be muting the channel
    pub fn muted(&self) -> bool {
        self.load == 0
    }
    /// Reload the counter from the length table.
    ///
    /// ```
    /// use tinynes::core::apu::LengthCounter;
    /// let mut l = LengthCounter::default();
    /// l.reload(0);
    /// assert_eq!(l.load, 10);
    /// l.reload(1);
    /// assert_eq!(l.load, 254);
    /// ```
    pub fn reload(&mut self, index: u8) {
        self.load = LENGTH_TABLE[(index & 0x1F) as usize];
    }
    /// Clock the length counter, on every half frame
    pub fn clock(&mut self) {
        if !self.halt && self.load > 0 {
            self.load -= 1;
        }
    }
}
impl Debug for LengthCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "halt={} load={:X}", self.halt, self.load)
    }
}

#[cfg(test)]
mod tests {
    use super::LengthCounter;

    #[test]
    fn test_halt_pauses() {
        let mut l = LengthCounter::default();
        l.reload(3);
        l.halt = true;
        l.clock();
        assert_eq!(l.load, 2);
        l.halt = false;
        l.clock();
        l.clock();
        assert!(l.muted());
        l.clock();
        assert_eq!(l.load, 0);
    }
}
