//! ACモータ制御（dq座標系）
//!
//! 内側から順に:
//! - [`AcMotor`]: 座標変換とハードウェアを束ね、dq座標系で電圧出力・電流取得
//! - [`CurrentFeedbackMotor`]: dq軸電流PIで電流フィードバック
//! - [`SpeedFeedbackMotor`]: 速度PIでq軸電流指令を生成

pub mod current_feedback;
pub mod speed_feedback;

pub use current_feedback::CurrentFeedbackMotor;
pub use speed_feedback::SpeedFeedbackMotor;

use crate::foc::{DqVector, UvwVector};
use crate::hardware::{AngleSensor, CurrentSensor, Inverter};

/// ACモータ
///
/// インバータ・電流センサ・ロータリーエンコーダを排他的に所有します。
pub struct AcMotor<I, C, A> {
    inverter: I,
    current_sensor: C,
    rotary_encoder: A,
}

impl<I, C, A> AcMotor<I, C, A>
where
    I: Inverter,
    C: CurrentSensor,
    A: AngleSensor,
{
    pub fn new(inverter: I, current_sensor: C, rotary_encoder: A) -> Self {
        Self {
            inverter,
            current_sensor,
            rotary_encoder,
        }
    }

    /// dq座標系の電圧 [V] をインバータへ出力
    ///
    /// 角度取得 → dq→UVW変換 → 出力 の順に実行します。
    pub fn write_dq_voltage(&mut self, dq: DqVector) {
        let theta = self.rotary_encoder.read_theta();
        let uvw: UvwVector = dq.to_uvw(theta);
        self.inverter.write_uvw_voltage(uvw);
    }

    /// dq座標系の電流 [A] を取得
    pub fn read_dq_current(&mut self) -> DqVector {
        let uvw = self.current_sensor.read_uvw_current();
        uvw.to_dq(self.rotary_encoder.read_theta())
    }

    /// 回転角 [rad] を取得
    pub fn read_theta(&mut self) -> f32 {
        self.rotary_encoder.read_theta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{FixedAngleSensor, FixedCurrentSensor, RecordingInverter};
    use core::f32::consts::PI;

    const EPSILON: f32 = 0.00001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_write_dq_voltage_uses_current_angle() {
        let inverter = RecordingInverter::new();
        let encoder = FixedAngleSensor::new(PI / 2.0);
        let mut motor = AcMotor::new(
            inverter.clone(),
            FixedCurrentSensor::new(UvwVector::default()),
            encoder.clone(),
        );

        // θ=90° で d軸 1V → α=0, β=1
        motor.write_dq_voltage(DqVector::new(1.0, 0.0));
        let uvw = inverter.last().unwrap();
        assert!(approx_eq(uvw.u, 0.0));
        assert!(approx_eq(uvw.v, 0.866_025_4));
        assert!(approx_eq(uvw.w, -0.866_025_4));
        assert_eq!(encoder.reads(), 1);
        assert_eq!(inverter.written().len(), 1);
    }

    #[test]
    fn test_read_dq_current() {
        let sensor = FixedCurrentSensor::new(UvwVector::new(1.0, -0.5, -0.5));
        let encoder = FixedAngleSensor::new(0.0);
        let mut motor = AcMotor::new(RecordingInverter::new(), sensor.clone(), encoder.clone());

        let dq = motor.read_dq_current();
        assert!(approx_eq(dq.d, 1.0));
        assert!(approx_eq(dq.q, 0.0));

        encoder.set(PI);
        let dq = motor.read_dq_current();
        assert!(approx_eq(dq.d, -1.0));
        assert!(approx_eq(dq.q, 0.0));
    }

    #[test]
    fn test_read_theta_passthrough() {
        let encoder = FixedAngleSensor::new(1.25);
        let mut motor = AcMotor::new(
            RecordingInverter::new(),
            FixedCurrentSensor::new(UvwVector::default()),
            encoder,
        );
        assert_eq!(motor.read_theta(), 1.25);
    }
}
