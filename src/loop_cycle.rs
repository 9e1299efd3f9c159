//! ループ周期制御
//!
//! ループ本体の実行時間に関係なく、一定周期でループを回します。
//! 名目上のループ開始時刻は毎周期ちょうど1周期分だけ進むため、
//! 本体の実行時間や待機の誤差が累積してドリフトすることはありません。

use crate::hardware::TimeSource;

/// Result of one [`LoopCycleController::wait`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pacing {
    /// The body finished early; the controller slept `slack_us`.
    OnTime { slack_us: u32 },
    /// The body took longer than one period. No wait was issued and the
    /// next cycle is measured from now.
    Overrun { late_us: u32 },
}

/// 周期統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopStats {
    /// 完了した周期数
    pub cycles: u32,
    /// オーバーラン回数
    pub overruns: u32,
    /// 名目開始時刻から `wait()` 呼び出しまでの最大経過時間 [μs]
    pub max_elapsed_us: u32,
}

/// ループ周期を一定に保つ
pub struct LoopCycleController<T: TimeSource> {
    clock: T,
    /// ループ周期 [μs]
    period_us: u32,
    /// 現在の周期の名目上の開始時刻 [μs]
    prev_loop_us: u32,
    stats: LoopStats,
}

impl<T: TimeSource> LoopCycleController<T> {
    /// 生成時点の時刻を最初の周期の名目開始時刻とする
    pub fn new(clock: T, period_us: u32) -> Self {
        let prev_loop_us = clock.now_us();
        Self {
            clock,
            period_us,
            prev_loop_us,
            stats: LoopStats::default(),
        }
    }

    /// 現在の周期の開始から `period_us` 経過するまで待機
    pub fn wait(&mut self) -> Pacing {
        let now_us = self.clock.now_us();

        // 早起き（now < 名目開始）を負の経過時間として扱うため符号付きで解釈
        // 約35.8分（2^31 μs）を超える停止（デバッガ等）は負に見えるので、
        // 1周期より大きく負なら停止とみなして遅延扱いにする
        let raw_elapsed_us = now_us.wrapping_sub(self.prev_loop_us);
        let mut elapsed_us = raw_elapsed_us as i32 as i64;
        if elapsed_us < -(self.period_us as i64) {
            elapsed_us = raw_elapsed_us as i64;
        }
        let remaining_us = self.period_us as i64 - elapsed_us;

        self.stats.cycles = self.stats.cycles.wrapping_add(1);
        if elapsed_us > self.stats.max_elapsed_us as i64 {
            self.stats.max_elapsed_us = elapsed_us as u32;
        }

        if remaining_us > 0 {
            let slack_us = remaining_us as u32;
            self.clock.delay_us(slack_us);
            self.prev_loop_us = self.prev_loop_us.wrapping_add(self.period_us);
            Pacing::OnTime { slack_us }
        } else {
            // 遅れを取り戻そうとすると連続実行になるので、今から数え直す
            let late_us = (-remaining_us).min(u32::MAX as i64) as u32;
            self.prev_loop_us = now_us;
            self.stats.overruns = self.stats.overruns.wrapping_add(1);
            warn!(
                "Loop overrun: {}us late (period {}us, total {})",
                late_us, self.period_us, self.stats.overruns
            );
            Pacing::Overrun { late_us }
        }
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// ループ周期 [s]（PI制御器のサンプリング周期）
    pub fn sample_period_s(&self) -> f32 {
        self.period_us as f32 / 1_000_000.0
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }
}
