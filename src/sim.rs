//! テスト用の決定的なハードウェア模擬
//!
//! 所有権がモーターへ移った後もテストから観測できるよう、内部状態は
//! `Rc` で共有します。

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use crate::foc::UvwVector;
use crate::hardware::{AngleSensor, CurrentSensor, Inverter, TimeSource};

/// 書き込まれた電圧を記録するインバータ
#[derive(Clone, Default)]
pub struct RecordingInverter {
    written: Rc<RefCell<Vec<UvwVector>>>,
}

impl RecordingInverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> Vec<UvwVector> {
        self.written.borrow().clone()
    }

    pub fn last(&self) -> Option<UvwVector> {
        self.written.borrow().last().copied()
    }
}

impl Inverter for RecordingInverter {
    fn write_uvw_voltage(&mut self, uvw: UvwVector) {
        self.written.borrow_mut().push(uvw);
    }
}

/// 一定の電流を返す電流センサ
#[derive(Clone)]
pub struct FixedCurrentSensor {
    current: Rc<Cell<UvwVector>>,
}

impl FixedCurrentSensor {
    pub fn new(current: UvwVector) -> Self {
        Self {
            current: Rc::new(Cell::new(current)),
        }
    }
}

impl CurrentSensor for FixedCurrentSensor {
    fn read_uvw_current(&mut self) -> UvwVector {
        self.current.get()
    }
}

/// 設定された角度を返し、読み出し回数を数える角度センサ
#[derive(Clone)]
pub struct FixedAngleSensor {
    theta: Rc<Cell<f32>>,
    reads: Rc<Cell<u32>>,
}

impl FixedAngleSensor {
    pub fn new(theta: f32) -> Self {
        Self {
            theta: Rc::new(Cell::new(theta)),
            reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, theta: f32) {
        self.theta.set(theta);
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl AngleSensor for FixedAngleSensor {
    fn read_theta(&mut self) -> f32 {
        self.reads.set(self.reads.get() + 1);
        self.theta.get()
    }
}

/// 手動で進める時計（待機すると時刻が進む）
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
    delay_error: Rc<Cell<i32>>,
    delays: Rc<RefCell<Vec<u32>>>,
}

impl ManualClock {
    pub fn new(start_us: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_us)),
            delay_error: Rc::new(Cell::new(0)),
            delays: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn now(&self) -> u32 {
        self.now.get()
    }

    /// ループ本体の実行時間を模擬
    pub fn advance(&self, us: u32) {
        self.now.set(self.now.get().wrapping_add(us));
    }

    /// 待機の誤差 [μs]（正: 長すぎる、負: 短すぎる）
    pub fn set_delay_error(&self, error_us: i32) {
        self.delay_error.set(error_us);
    }

    pub fn delays(&self) -> Vec<u32> {
        self.delays.borrow().clone()
    }
}

impl TimeSource for ManualClock {
    fn now_us(&self) -> u32 {
        self.now.get()
    }

    fn delay_us(&mut self, us: u32) {
        self.delays.borrow_mut().push(us);
        let actual = (us as i64 + self.delay_error.get() as i64).max(0) as u32;
        self.advance(actual);
    }
}
