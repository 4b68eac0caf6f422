use serde::{Deserialize, Serialize};

/// An NES controller
///
/// Used to represent the controller's state in the emulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controller {
    pub up: bool,
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub start: bool,
    pub select: bool,
    pub a: bool,
    pub b: bool,
}

impl Controller {
    pub fn new() -> Controller {
        Controller::default()
    }
    /// Get the button at a given position in the order the console reads them.
    ///
    /// A, B, Select, Start, Up, Down, Left, Right.
    /// Positions past the eighth read as pressed.
    pub fn button(&self, index: usize) -> bool {
        match index {
            0 => self.a,
            1 => self.b,
            2 => self.select,
            3 => self.start,
            4 => self.up,
            5 => self.down,
            6 => self.left,
            7 => self.right,
            _ => true,
        }
    }
}

/// One of the two controller ports.
///
/// Latches the controller's state while the strobe is high, then shifts it out one button
/// per read.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControllerPort {
    latched: Controller,
    strobe: bool,
    index: usize,
}

impl ControllerPort {
    /// Write the strobe bit, latching `state` while it is set.
    pub fn write_strobe(&mut self, value: u8, state: Controller) {
        self.strobe = value & 0x01 != 0;
        if self.strobe {
            self.latched = state;
            self.index = 0;
        }
    }
    /// Read the next button.
    ///
    /// While the strobe is high every read returns the A button.
    /// ```
    /// use tinynes::core::{Controller, ControllerPort};
    /// let mut port = ControllerPort::default();
    /// let state = Controller { start: true, ..Controller::default() };
    /// port.write_strobe(1, state);
    /// port.write_strobe(0, state);
    /// let bits: Vec<u8> = (0..9).map(|_| port.read()).collect();
    /// assert_eq!(bits, [0, 0, 0, 1, 0, 0, 0, 0, 1]);
    /// ```
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            return self.latched.a as u8;
        }
        let pressed = self.latched.button(self.index);
        self.index = (self.index + 1).min(8);
        pressed as u8
    }
}
