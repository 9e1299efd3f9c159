// Hall sensor based electrical angle source
// Three digital hall inputs give one of six 60° sectors; the angle reported
// is the sector centre plus a mounting offset.

use ac_motor_cascade::foc::transforms::normalize_angle;
use ac_motor_cascade::AngleSensor;
use core::f32::consts::PI;
use embassy_stm32::gpio::Input;

/// Hall state lookup table
/// Maps raw hall state (1-6) to sector index (0-5)
/// Valid transition sequence: 1 -> 3 -> 2 -> 6 -> 4 -> 5 -> 1 (CW rotation)
const HALL_STATE_TABLE: [u8; 8] = [
    255, // 0b000: Invalid state
    0,   // 0b001: State 1 -> sector 0
    2,   // 0b010: State 2 -> sector 2
    1,   // 0b011: State 3 -> sector 1
    4,   // 0b100: State 4 -> sector 4
    5,   // 0b101: State 5 -> sector 5
    3,   // 0b110: State 6 -> sector 3
    255, // 0b111: Invalid state
];

const SECTOR_ANGLE: f32 = PI / 3.0;

pub struct HallAngleSensor {
    h1: Input<'static>,
    h2: Input<'static>,
    h3: Input<'static>,
    /// Electrical offset in radians
    offset: f32,
    /// Last valid electrical angle, held while the hall state is invalid
    last_theta: f32,
}

impl HallAngleSensor {
    pub fn new(h1: Input<'static>, h2: Input<'static>, h3: Input<'static>, offset: f32) -> Self {
        Self {
            h1,
            h2,
            h3,
            offset,
            last_theta: 0.0,
        }
    }

    /// Raw hall state (0-7), H1 = bit0
    pub fn raw_state(&self) -> u8 {
        (self.h1.is_high() as u8) | (self.h2.is_high() as u8) << 1 | (self.h3.is_high() as u8) << 2
    }
}

impl AngleSensor for HallAngleSensor {
    fn read_theta(&mut self) -> f32 {
        let sector = HALL_STATE_TABLE[self.raw_state() as usize];
        if sector == 255 {
            return self.last_theta;
        }
        self.last_theta =
            normalize_angle(sector as f32 * SECTOR_ANGLE + SECTOR_ANGLE / 2.0 + self.offset);
        self.last_theta
    }
}
