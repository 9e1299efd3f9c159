//! 3相電流センサ（2シャント方式）
//!
//! U相・V相の電流センスアンプ出力をADC1で読み取り、
//! W相は i_u + i_v + i_w = 0 から求めます。

use ac_motor_cascade::{CurrentSensor, UvwVector};
use embassy_stm32::{
    adc::{Adc, AnyAdcChannel},
    peripherals,
};

use crate::config::current_sense::{ADC_MAX, VOLTS_PER_AMP, VREF, ZERO_OFFSET_V};

pub struct ShuntCurrentSensor {
    adc: Adc<'static, peripherals::ADC1>,
    ch_u: AnyAdcChannel<peripherals::ADC1>,
    ch_v: AnyAdcChannel<peripherals::ADC1>,
}

impl ShuntCurrentSensor {
    pub fn new(
        adc: Adc<'static, peripherals::ADC1>,
        ch_u: AnyAdcChannel<peripherals::ADC1>,
        ch_v: AnyAdcChannel<peripherals::ADC1>,
    ) -> Self {
        Self { adc, ch_u, ch_v }
    }

    /// ADC生値 → 電流 [A]
    fn raw_to_amps(raw: u16) -> f32 {
        let volts = raw as f32 / ADC_MAX * VREF;
        (volts - ZERO_OFFSET_V) / VOLTS_PER_AMP
    }
}

impl CurrentSensor for ShuntCurrentSensor {
    fn read_uvw_current(&mut self) -> UvwVector {
        let i_u = Self::raw_to_amps(self.adc.blocking_read(&mut self.ch_u));
        let i_v = Self::raw_to_amps(self.adc.blocking_read(&mut self.ch_v));
        UvwVector::new(i_u, i_v, -(i_u + i_v))
    }
}
