/// The frame sequencer's two step patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerMode {
    #[default]
    FourStep,
    FiveStep,
}

/// The clocks produced by a single frame sequencer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameEvents {
    /// Clocks envelopes and the triangle's linear counter
    pub quarter: bool,
    /// Clocks length counters and sweep units
    pub half: bool,
}

const NONE: FrameEvents = FrameEvents {
    quarter: false,
    half: false,
};
const QUARTER: FrameEvents = FrameEvents {
    quarter: true,
    half: false,
};
const QUARTER_HALF: FrameEvents = FrameEvents {
    quarter: true,
    half: true,
};

/// The APU's frame sequencer.
///
/// Counts CPU cycles and produces quarter and half frame clocks at fixed points.
/// In 4 step mode it also raises the frame IRQ flag at the end of every sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSequencer {
    pub mode: SequencerMode,
    /// CPU cycles since the sequence started
    pub cycle: u32,
    pub irq_inhibit: bool,
    pub irq_flag: bool,
}

impl FrameSequencer {
    /// Write `$4017`.
    ///
    /// Restarts the sequence, and clocks everything immediately if 5 step mode was selected.
    pub fn write(&mut self, value: u8) -> FrameEvents {
        self.mode = if value & 0x80 != 0 {
            SequencerMode::FiveStep
        } else {
            SequencerMode::FourStep
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_flag = false;
        }
        self.cycle = 0;
        match self.mode {
            SequencerMode::FiveStep => QUARTER_HALF,
            SequencerMode::FourStep => NONE,
        }
    }
    /// Advance by a single CPU cycle.
    pub fn clock(&mut self) -> FrameEvents {
        self.cycle += 1;
        match (self.mode, self.cycle) {
            (_, 7457) | (_, 22371) => QUARTER,
            (_, 14916) => QUARTER_HALF,
            (SequencerMode::FourStep, 29829) => QUARTER_HALF,
            (SequencerMode::FourStep, 29830) => {
                if !self.irq_inhibit {
                    self.irq_flag = true;
                }
                self.cycle = 0;
                NONE
            }
            (SequencerMode::FiveStep, 29828) => QUARTER,
            (SequencerMode::FiveStep, 37281) => {
                self.cycle = 0;
                QUARTER_HALF
            }
            _ => NONE,
        }
    }
}
