use serde::{Deserialize, Serialize};

/// Settings for how to run the emulator.
///
/// None of these change the behaviour of the console, only how much is logged about it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log every instruction at the trace level before it executes.
    pub trace_instructions: bool,
    /// Number of instructions kept in [Nes::previous_states][crate::core::Nes::previous_states],
    /// which are logged if execution fails.
    pub history_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            trace_instructions: false,
            history_len: 200,
        }
    }
}
