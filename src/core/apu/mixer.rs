//! The APU's non-linear mixer, approximated with two lookup tables.
//! See [the NESDEV wiki](https://www.nesdev.org/wiki/APU_Mixer)
use std::sync::OnceLock;

/// Number of entries in the pulse table, indexed by the sum of both pulse outputs
pub const PULSE_TABLE_LEN: usize = 31;
/// Number of entries in the triangle/noise/DMC table, indexed by `3t + 2n + d`
pub const TND_TABLE_LEN: usize = 203;

static PULSE_TABLE: OnceLock<[f32; PULSE_TABLE_LEN]> = OnceLock::new();
static TND_TABLE: OnceLock<[f32; TND_TABLE_LEN]> = OnceLock::new();

pub fn pulse_table() -> &'static [f32; PULSE_TABLE_LEN] {
    PULSE_TABLE.get_or_init(|| {
        let mut table = [0.0; PULSE_TABLE_LEN];
        table
            .iter_mut()
            .enumerate()
            .skip(1)
            .for_each(|(n, v)| *v = 95.52 / (8128.0 / n as f32 + 100.0));
        table
    })
}

pub fn tnd_table() -> &'static [f32; TND_TABLE_LEN] {
    TND_TABLE.get_or_init(|| {
        let mut table = [0.0; TND_TABLE_LEN];
        table
            .iter_mut()
            .enumerate()
            .skip(1)
            .for_each(|(n, v)| *v = 163.67 / (24329.0 / n as f32 + 100.0));
        table
    })
}

/// Mix the outputs of all five channels into a value between 0 and 1.
pub fn mix(pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
    let pulse = pulse_table()[(pulse1 + pulse2) as usize];
    let tnd = tnd_table()[3 * triangle as usize + 2 * noise as usize + dmc as usize];
    pulse + tnd
}
