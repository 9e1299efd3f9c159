//! ハードウェア抽象化
//!
//! 制御カスケードが呼び出す外部デバイス（インバータ・電流センサ・
//! ロータリーエンコーダ・時刻源）の読み書き契約を定義します。
//! 実装はファームウェア側のドライバが提供します。

use crate::foc::UvwVector;

/// 3相インバータ
pub trait Inverter {
    /// UVW座標系の電圧 [V] を出力（失敗しない前提）
    fn write_uvw_voltage(&mut self, uvw: UvwVector);
}

/// 3相電流センサ
pub trait CurrentSensor {
    /// UVW座標系の電流 [A] のスナップショット
    fn read_uvw_current(&mut self) -> UvwVector;
}

/// 回転角センサ
pub trait AngleSensor {
    /// 電気角 [rad]
    fn read_theta(&mut self) -> f32;
}

/// 単調増加のマイクロ秒カウンタとブロッキング待機
pub trait TimeSource {
    /// 現在時刻 [μs]（u32幅でラップアラウンドする）
    fn now_us(&self) -> u32;

    /// 指定時間 [μs] だけブロッキング待機
    fn delay_us(&mut self, us: u32);
}
