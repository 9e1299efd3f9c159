//! 制御パラメータ
//!
//! すべてコンパイル時定数です。実行時の設定変更・永続化は行いません。

/// 制御周期 [μs]（1kHz = 1000μs）
pub const CONTROL_PERIOD_US: u32 = 1000;

/// dq軸電流PIゲイン（d軸・q軸共通）
pub const CURRENT_KP: f32 = 0.1;
pub const CURRENT_KI: f32 = 0.01;

/// 速度PIゲイン
pub const SPEED_KP: f32 = 0.1;
pub const SPEED_KI: f32 = 0.01;

/// 目標速度 [rad/s]
pub const TARGET_SPEED: f32 = 100.0;

/// dq電圧ベクトルの最大振幅 [V]（電流PIの出力制限）
pub const MAX_VOLTAGE: f32 = 24.0;

/// q軸電流指令の最大値 [A]（速度PIの出力制限）
pub const MAX_CURRENT: f32 = 10.0;

/// 速度推定ローパスフィルタ係数（1.0でフィルタなし）
pub const SPEED_FILTER_ALPHA: f32 = 0.2;

/// Invalid parameter combination found by [`CascadeConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Control period must be non-zero.
    ZeroPeriod,
    /// Proportional and integral gains must be non-negative.
    NegativeGain,
    /// Voltage and current limits must be positive.
    NonPositiveLimit,
    /// Speed filter coefficient must lie in `[0, 1]`.
    FilterAlphaOutOfRange,
}

/// カスケード全体のパラメータ
///
/// 3つのPI制御器とループ周期制御は、すべてここの `control_period_us` から
/// サンプリング周期を得ます。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeConfig {
    pub control_period_us: u32,
    pub current_kp: f32,
    pub current_ki: f32,
    pub speed_kp: f32,
    pub speed_ki: f32,
    pub max_voltage: f32,
    pub max_current: f32,
    pub speed_filter_alpha: f32,
    pub target_speed: f32,
}

impl CascadeConfig {
    pub const DEFAULT: Self = Self {
        control_period_us: CONTROL_PERIOD_US,
        current_kp: CURRENT_KP,
        current_ki: CURRENT_KI,
        speed_kp: SPEED_KP,
        speed_ki: SPEED_KI,
        max_voltage: MAX_VOLTAGE,
        max_current: MAX_CURRENT,
        speed_filter_alpha: SPEED_FILTER_ALPHA,
        target_speed: TARGET_SPEED,
    };

    /// 制御周期 [s]
    pub fn sample_period_s(&self) -> f32 {
        self.control_period_us as f32 / 1_000_000.0
    }

    /// Check the parameters before the cascade is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_period_us == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        let gains = [self.current_kp, self.current_ki, self.speed_kp, self.speed_ki];
        if gains.iter().any(|g| !(*g >= 0.0)) {
            return Err(ConfigError::NegativeGain);
        }
        if !(self.max_voltage > 0.0) || !(self.max_current > 0.0) {
            return Err(ConfigError::NonPositiveLimit);
        }
        if !(0.0..=1.0).contains(&self.speed_filter_alpha) {
            return Err(ConfigError::FilterAlphaOutOfRange);
        }
        Ok(())
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
