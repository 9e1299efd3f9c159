//! 速度フィードバック制御

use super::CurrentFeedbackMotor;
use crate::foc::{DqVector, PiController, SpeedEstimator};
use crate::hardware::{AngleSensor, CurrentSensor, Inverter};

/// 速度フィードバック制御付きACモータ
///
/// 速度PIの出力をq軸電流指令とし、d軸電流指令は常に0とします（弱め界磁なし）。
pub struct SpeedFeedbackMotor<I, C, A> {
    motor: CurrentFeedbackMotor<I, C, A>,
    pi_speed: PiController,
    speed_estimator: SpeedEstimator,
}

impl<I, C, A> SpeedFeedbackMotor<I, C, A>
where
    I: Inverter,
    C: CurrentSensor,
    A: AngleSensor,
{
    pub fn new(
        motor: CurrentFeedbackMotor<I, C, A>,
        pi_speed: PiController,
        speed_estimator: SpeedEstimator,
    ) -> Self {
        Self {
            motor,
            pi_speed,
            speed_estimator,
        }
    }

    /// 速度フィードバック制御を1周期実行
    ///
    /// # 引数
    /// * `target_speed` - 目標速度 [rad/s]
    ///
    /// # 戻り値
    /// 電流ループへ渡したdq電流指令 [A]
    pub fn write_target_speed(&mut self, target_speed: f32) -> DqVector {
        let theta = self.motor.read_theta();
        let speed = self.speed_estimator.update(theta);

        let iq = self.pi_speed.update(speed, target_speed);
        if self.pi_speed.is_saturated() {
            trace!("Speed PI saturated: iq={}A, speed={}rad/s", iq, speed);
        }

        let dq_current = DqVector::new(0.0, iq);
        self.motor.write_target_dq_current(dq_current);

        dq_current
    }

    /// 回転角 [rad] を取得
    pub fn read_theta(&mut self) -> f32 {
        self.motor.read_theta()
    }

    /// 最新の推定速度 [rad/s]
    pub fn speed(&self) -> f32 {
        self.speed_estimator.speed()
    }

    pub fn pi_speed(&self) -> &PiController {
        &self.pi_speed
    }

    pub fn current_loop(&self) -> &CurrentFeedbackMotor<I, C, A> {
        &self.motor
    }

    /// 全PIの積分項と速度推定をリセット
    pub fn reset(&mut self) {
        self.pi_speed.reset();
        self.speed_estimator.reset();
        self.motor.reset();
    }
}
