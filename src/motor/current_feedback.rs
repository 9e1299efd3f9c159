//! 電流フィードバック制御（dq座標系）

use super::AcMotor;
use crate::foc::{limit_voltage, DqVector, PiController};
use crate::hardware::{AngleSensor, CurrentSensor, Inverter};

/// 電流フィードバック制御付きACモータ
///
/// d軸・q軸それぞれ独立したPI制御器で目標電流に追従させます。
pub struct CurrentFeedbackMotor<I, C, A> {
    motor: AcMotor<I, C, A>,
    pi_d: PiController,
    pi_q: PiController,
    /// dq電圧ベクトルの最大振幅 [V]
    max_voltage: f32,
}

impl<I, C, A> CurrentFeedbackMotor<I, C, A>
where
    I: Inverter,
    C: CurrentSensor,
    A: AngleSensor,
{
    /// # 引数
    /// * `motor` - ACモータ
    /// * `pi_dq` - dq軸電流PI制御器（d軸・q軸で同じパラメータを複製して使用）
    /// * `max_voltage` - dq電圧ベクトルの最大振幅 [V]
    pub fn new(motor: AcMotor<I, C, A>, pi_dq: PiController, max_voltage: f32) -> Self {
        Self {
            motor,
            pi_d: pi_dq.clone(),
            pi_q: pi_dq,
            max_voltage,
        }
    }

    /// 電流フィードバック制御を1周期実行
    ///
    /// 電流取得 → d軸・q軸PI → 電圧ベクトル制限 → 電圧出力
    ///
    /// 電圧ベクトルが制限された周期は、振幅を増やす方向の積分を取り消します。
    ///
    /// # 戻り値
    /// インバータへ出力したdq電圧 [V]
    pub fn write_target_dq_current(&mut self, target_current: DqVector) -> DqVector {
        let current = self.motor.read_dq_current();

        let vd = self.pi_d.update(current.d, target_current.d);
        let vq = self.pi_q.update(current.q, target_current.q);

        let (limited_d, limited_q) = limit_voltage(vd, vq, self.max_voltage);
        if limited_d != vd || limited_q != vq {
            self.pi_d.discard_windup_step();
            self.pi_q.discard_windup_step();
        }
        let dq_voltage = DqVector::new(limited_d, limited_q);

        self.motor.write_dq_voltage(dq_voltage);

        dq_voltage
    }

    /// 回転角 [rad] を取得
    pub fn read_theta(&mut self) -> f32 {
        self.motor.read_theta()
    }

    pub fn pi_d(&self) -> &PiController {
        &self.pi_d
    }

    pub fn pi_q(&self) -> &PiController {
        &self.pi_q
    }

    /// 両軸の積分項をリセット
    pub fn reset(&mut self) {
        self.pi_d.reset();
        self.pi_q.reset();
    }
}
