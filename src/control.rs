//! 制御エントリポイント
//!
//! 速度フィードバック制御カスケードとループ周期制御を組み立て、
//! 「目標速度を出力 → 周期待機」を無限に繰り返します。

use crate::config::CascadeConfig;
use crate::foc::{PiController, SpeedEstimator};
use crate::hardware::{AngleSensor, CurrentSensor, Inverter, TimeSource};
use crate::loop_cycle::{LoopCycleController, Pacing};
use crate::motor::{AcMotor, CurrentFeedbackMotor, SpeedFeedbackMotor};

/// カスケードを組み立てる
///
/// 3つのPI制御器と速度推定はすべて `config.sample_period_s()` を
/// サンプリング周期として使います。
pub fn build_cascade<I, C, A>(
    config: &CascadeConfig,
    inverter: I,
    current_sensor: C,
    rotary_encoder: A,
) -> SpeedFeedbackMotor<I, C, A>
where
    I: Inverter,
    C: CurrentSensor,
    A: AngleSensor,
{
    let dt = config.sample_period_s();

    let motor = AcMotor::new(inverter, current_sensor, rotary_encoder);

    // dq軸電流PI制御器（出力: 電圧）
    let pi_dq = PiController::new_symmetric(
        config.current_kp,
        config.current_ki,
        dt,
        config.max_voltage,
    );
    let current_loop = CurrentFeedbackMotor::new(motor, pi_dq, config.max_voltage);

    // 速度PI制御器（出力: q軸電流）
    let pi_speed =
        PiController::new_symmetric(config.speed_kp, config.speed_ki, dt, config.max_current);
    let speed_estimator = SpeedEstimator::new(dt, config.speed_filter_alpha);

    info!(
        "Cascade built: period={}us, current Kp={} Ki={}, speed Kp={} Ki={}, Vmax={}V, Imax={}A",
        config.control_period_us,
        config.current_kp,
        config.current_ki,
        config.speed_kp,
        config.speed_ki,
        config.max_voltage,
        config.max_current
    );

    SpeedFeedbackMotor::new(current_loop, pi_speed, speed_estimator)
}

/// 制御ループ全体（カスケード + ループ周期制御）
pub struct ControlLoop<I, C, A, T: TimeSource> {
    motor: SpeedFeedbackMotor<I, C, A>,
    loop_ctrl: LoopCycleController<T>,
    target_speed: f32,
    /// 状態ログの出力間隔 [周期]
    log_interval: u32,
    log_counter: u32,
}

impl<I, C, A, T> ControlLoop<I, C, A, T>
where
    I: Inverter,
    C: CurrentSensor,
    A: AngleSensor,
    T: TimeSource,
{
    /// ループ周期制御はここで生成されるため、最初の周期はこの時点から数えます。
    pub fn new(
        config: &CascadeConfig,
        inverter: I,
        current_sensor: C,
        rotary_encoder: A,
        clock: T,
    ) -> Self {
        let motor = build_cascade(config, inverter, current_sensor, rotary_encoder);
        let loop_ctrl = LoopCycleController::new(clock, config.control_period_us);
        // 約1秒ごと
        let log_interval = (1_000_000 / config.control_period_us.max(1)).max(1);

        Self {
            motor,
            loop_ctrl,
            target_speed: config.target_speed,
            log_interval,
            log_counter: 0,
        }
    }

    /// 1周期分: 目標速度を出力してから周期待機
    pub fn tick(&mut self) -> Pacing {
        let dq_current = self.motor.write_target_speed(self.target_speed);

        self.log_counter += 1;
        if self.log_counter >= self.log_interval {
            self.log_counter = 0;
            let stats = self.loop_ctrl.stats();
            debug!(
                "[Control] Speed: {}/{} rad/s, Iq*: {}A, cycles={}, overruns={}, max_elapsed={}us",
                self.motor.speed(),
                self.target_speed,
                dq_current.q,
                stats.cycles,
                stats.overruns,
                stats.max_elapsed_us
            );
        }

        self.loop_ctrl.wait()
    }

    /// 制御ループを永久に実行
    pub fn run(mut self) -> ! {
        info!(
            "Control loop started: target={}rad/s, period={}us",
            self.target_speed,
            self.loop_ctrl.period_us()
        );
        loop {
            self.tick();
        }
    }

    pub fn motor(&self) -> &SpeedFeedbackMotor<I, C, A> {
        &self.motor
    }

    pub fn loop_ctrl(&self) -> &LoopCycleController<T> {
        &self.loop_ctrl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foc::UvwVector;
    use crate::sim::{FixedAngleSensor, FixedCurrentSensor, ManualClock, RecordingInverter};

    const EPSILON: f32 = 0.00001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_single_tick_end_to_end() {
        // 固定電流 (1, -0.5, -0.5)、固定角度 0 の模擬モーター
        let inverter = RecordingInverter::new();
        let clock = ManualClock::new(0);
        let config = CascadeConfig::DEFAULT;
        let mut control = ControlLoop::new(
            &config,
            inverter.clone(),
            FixedCurrentSensor::new(UvwVector::new(1.0, -0.5, -0.5)),
            FixedAngleSensor::new(0.0),
            clock.clone(),
        );

        assert_eq!(control.tick(), Pacing::OnTime { slack_us: 1000 });

        // 速度PI: speed=0（初回）, error=100
        //   integral = 100 * 0.001 = 0.1
        //   iq* = 0.1*100 + 0.01*0.1 = 10.001 → 10A で飽和
        let pi_speed = control.motor().pi_speed();
        assert!(approx_eq(pi_speed.integral(), 0.1));
        assert_eq!(pi_speed.output(), 10.0);

        // 電流PI: 測定 (d, q) = (1, 0)
        //   d: error=-1  → integral=-0.001, vd = -0.1 + 0.01*-0.001 = -0.10001
        //   q: error=10  → integral= 0.01,  vq =  1.0 + 0.01*0.01   =  1.0001
        let vd = -0.10001;
        let vq = 1.0001;
        let current_loop = control.motor().current_loop();
        assert!(approx_eq(current_loop.pi_d().output(), vd));
        assert!(approx_eq(current_loop.pi_q().output(), vq));

        // θ=0: u = vd, v = -vd/2 + √3/2·vq, w = -vd/2 - √3/2·vq
        let written = inverter.written();
        assert_eq!(written.len(), 1);
        let uvw = written[0];
        assert!(approx_eq(uvw.u, vd));
        assert!(approx_eq(uvw.v, -0.5 * vd + 0.866_025_4 * vq));
        assert!(approx_eq(uvw.w, -0.5 * vd - 0.866_025_4 * vq));
        assert!(approx_eq(uvw.u + uvw.v + uvw.w, 0.0));
    }

    #[test]
    fn test_cascade_with_custom_gains() {
        // 飽和しないゲインで手計算値と照合（θ=90°）
        let config = CascadeConfig {
            current_kp: 0.5,
            current_ki: 0.0,
            speed_kp: 0.02,
            speed_ki: 0.0,
            ..CascadeConfig::DEFAULT
        };
        let inverter = RecordingInverter::new();
        let mut motor = build_cascade(
            &config,
            inverter.clone(),
            FixedCurrentSensor::new(UvwVector::default()),
            FixedAngleSensor::new(core::f32::consts::FRAC_PI_2),
        );

        let target = motor.write_target_speed(100.0);
        assert_eq!(target.d, 0.0);
        assert!(approx_eq(target.q, 2.0));

        // vq = 0.5 * 2.0 = 1.0, θ=90° → α=-1, β=0
        let uvw = inverter.last().unwrap();
        assert!(approx_eq(uvw.u, -1.0));
        assert!(approx_eq(uvw.v, 0.5));
        assert!(approx_eq(uvw.w, 0.5));
    }

    #[test]
    fn test_ticks_are_paced() {
        let clock = ManualClock::new(0);
        let mut control = ControlLoop::new(
            &CascadeConfig::DEFAULT,
            RecordingInverter::new(),
            FixedCurrentSensor::new(UvwVector::default()),
            FixedAngleSensor::new(0.0),
            clock.clone(),
        );
        for n in 1..=5u32 {
            clock.advance(123);
            control.tick();
            assert_eq!(clock.now(), n * 1000);
        }
        assert_eq!(control.loop_ctrl().stats().cycles, 5);
    }

    #[test]
    fn test_tick_is_deterministic() {
        let run = || {
            let inverter = RecordingInverter::new();
            let mut control = ControlLoop::new(
                &CascadeConfig::DEFAULT,
                inverter.clone(),
                FixedCurrentSensor::new(UvwVector::new(0.2, 0.1, -0.3)),
                FixedAngleSensor::new(1.0),
                ManualClock::new(0),
            );
            for _ in 0..10 {
                control.tick();
            }
            inverter.written()
        };
        assert_eq!(run(), run());
    }
}
