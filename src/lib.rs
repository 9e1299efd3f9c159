//! Cascaded dq speed/current control for three-phase AC motors.
//!
//! 速度ループ → 電流ループ → dq/UVW座標変換 → インバータ の順に指令を流し、
//! 角度・電流のフィードバックで各ループを閉じます。制御周期は
//! [`LoopCycleController`] が一定に保ちます。
#![cfg_attr(not(test), no_std)]

// マクロを他モジュールより先に定義する
mod fmt;

pub mod config;
pub mod control;
pub mod foc;
pub mod hardware;
pub mod loop_cycle;
pub mod motor;

#[cfg(test)]
mod sim;

pub use config::{CascadeConfig, ConfigError};
pub use control::{build_cascade, ControlLoop};
pub use foc::{DqVector, PiController, SpeedEstimator, UvwVector};
pub use hardware::{AngleSensor, CurrentSensor, Inverter, TimeSource};
pub use loop_cycle::{LoopCycleController, LoopStats, Pacing};
pub use motor::{AcMotor, CurrentFeedbackMotor, SpeedFeedbackMotor};
