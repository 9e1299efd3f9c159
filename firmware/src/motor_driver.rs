//! 3相インバータドライバ
//!
//! UVW電圧指令をTIM1相補PWMのDuty比へ変換して出力します。

use ac_motor_cascade::{Inverter, UvwVector};
use embassy_stm32::{
    peripherals,
    timer::{complementary_pwm::ComplementaryPwm, Channel},
};

/// TIM1相補PWMによる3相インバータ
///
/// 各相電圧をDCバス電圧で正規化し、50%を中心とした正弦波変調で
/// Duty比を決めます。範囲外の指令はDuty比の上下限で飽和します。
pub struct PwmInverter {
    pwm: ComplementaryPwm<'static, peripherals::TIM1>,
    max_duty: u16,
    v_dc_bus: f32,
}

impl PwmInverter {
    /// PWMを全相50%で有効化して返す
    ///
    /// # 引数
    /// * `pwm` - PWMペリフェラル（TIM1）
    /// * `v_dc_bus` - DCバス電圧 [V]
    pub fn new(pwm: ComplementaryPwm<'static, peripherals::TIM1>, v_dc_bus: f32) -> Self {
        let max_duty = pwm.get_max_duty();
        let mut inverter = Self {
            pwm,
            max_duty,
            v_dc_bus,
        };
        inverter.set_duty_uvw(max_duty / 2, max_duty / 2, max_duty / 2);
        inverter.enable_all_channels();
        inverter
    }

    /// 相電圧 [V] → Duty比
    fn voltage_to_duty(&self, voltage: f32) -> u16 {
        if self.v_dc_bus <= 0.0 {
            return self.max_duty / 2;
        }
        let max = self.max_duty as f32;
        ((voltage / self.v_dc_bus + 0.5) * max).clamp(0.0, max) as u16
    }

    fn set_duty_uvw(&mut self, duty_u: u16, duty_v: u16, duty_w: u16) {
        self.pwm.set_duty(Channel::Ch1, duty_u);
        self.pwm.set_duty(Channel::Ch2, duty_v);
        self.pwm.set_duty(Channel::Ch3, duty_w);
    }

    fn enable_all_channels(&mut self) {
        self.pwm.enable(Channel::Ch1);
        self.pwm.enable(Channel::Ch2);
        self.pwm.enable(Channel::Ch3);
    }
}

impl Inverter for PwmInverter {
    fn write_uvw_voltage(&mut self, uvw: UvwVector) {
        let duty_u = self.voltage_to_duty(uvw.u);
        let duty_v = self.voltage_to_duty(uvw.v);
        let duty_w = self.voltage_to_duty(uvw.w);
        self.set_duty_uvw(duty_u, duty_v, duty_w);
    }
}
