//! ボード固有の設定パラメータ
//!
//! 制御ゲイン・周期などカスケードのパラメータは
//! `ac_motor_cascade::config` にあります。

/// DCバス電圧 [V]
pub const V_DC_BUS: f32 = 24.0;

/// Hall角度オフセット [rad]（取り付け位置に応じて調整）
pub const HALL_ANGLE_OFFSET: f32 = 0.0;

/// 電流センスアンプ設定
pub mod current_sense {
    /// ADCフルスケール値（12bit）
    pub const ADC_MAX: f32 = 4096.0;

    /// ADC基準電圧 [V]
    pub const VREF: f32 = 3.3;

    /// 0A時のアンプ出力 [V]（中点バイアス）
    pub const ZERO_OFFSET_V: f32 = 1.65;

    /// シャント抵抗 × アンプゲイン [V/A]（10mΩ × 20倍）
    pub const VOLTS_PER_AMP: f32 = 0.2;
}

/// PWM設定
pub mod pwm {
    use embassy_stm32::time::Hertz;

    /// PWM周波数（50kHz）
    pub const FREQUENCY: Hertz = Hertz(50_000);

    /// デッドタイム
    pub const DEAD_TIME: u16 = 1;
}
