//! 設定コラボレータ
//!
//! 校正値と制御モードは取得コアの外側（設定管理）が所有し、コアは読み出すだけです。
//! `SharedSettings` は各値を個別のアトミックに保持するため、割り込みハンドラーから
//! ロックなしで読み出せます。

use core::sync::atomic::{AtomicI16, AtomicU8, Ordering};

use crate::calibration::{CalibrationTable, SensorCalibration};
use crate::channel::{Sensor, SENSOR_COUNT};

/// 取得コアが参照する設定
pub trait Settings {
    /// センサーの校正値
    fn calibration(&self, sensor: Sensor) -> SensorCalibration;

    /// 制御モードフラグ（0 = V/Hz、1 = FOC、その他 = 取得のみ）
    fn control_mode(&self) -> u8;
}

/// 固定値の設定（テスト・初期値用）
#[derive(Debug, Clone, Copy)]
pub struct FixedSettings {
    pub calibration: CalibrationTable,
    pub control_mode: u8,
}

impl Settings for FixedSettings {
    fn calibration(&self, sensor: Sensor) -> SensorCalibration {
        self.calibration.get(sensor)
    }

    fn control_mode(&self) -> u8 {
        self.control_mode
    }
}

/// アトミック値で保持する共有設定
///
/// 設定管理側の書き込みは値ごとに不可分です。bias/scaleの組は別々に更新されるため、
/// 更新中の読み出しでは新旧が混在し得ます（校正は通常運転中には変更しない前提）。
pub struct SharedSettings {
    bias: [AtomicI16; SENSOR_COUNT],
    scale: [AtomicI16; SENSOR_COUNT],
    control_mode: AtomicU8,
}

impl SharedSettings {
    pub const fn new(table: &CalibrationTable, control_mode: u8) -> Self {
        let bv = table.get(Sensor::BusVoltage);
        let c1 = table.get(Sensor::Current1);
        let c2 = table.get(Sensor::Current2);
        let it1 = table.get(Sensor::InverterTemp1);
        let it2 = table.get(Sensor::InverterTemp2);
        let mt1 = table.get(Sensor::MotorTemp1);
        let mt2 = table.get(Sensor::MotorTemp2);
        Self {
            bias: [
                AtomicI16::new(bv.bias),
                AtomicI16::new(c1.bias),
                AtomicI16::new(c2.bias),
                AtomicI16::new(it1.bias),
                AtomicI16::new(it2.bias),
                AtomicI16::new(mt1.bias),
                AtomicI16::new(mt2.bias),
            ],
            scale: [
                AtomicI16::new(bv.scale),
                AtomicI16::new(c1.scale),
                AtomicI16::new(c2.scale),
                AtomicI16::new(it1.scale),
                AtomicI16::new(it2.scale),
                AtomicI16::new(mt1.scale),
                AtomicI16::new(mt2.scale),
            ],
            control_mode: AtomicU8::new(control_mode),
        }
    }

    /// センサーの校正値を更新
    pub fn set_calibration(&self, sensor: Sensor, calibration: SensorCalibration) {
        self.bias[sensor.index()].store(calibration.bias, Ordering::Relaxed);
        self.scale[sensor.index()].store(calibration.scale, Ordering::Relaxed);
    }

    /// 校正テーブル全体を更新
    pub fn load_table(&self, table: &CalibrationTable) {
        for sensor in Sensor::ALL {
            self.set_calibration(sensor, table.get(sensor));
        }
    }

    /// 制御モードフラグを更新
    pub fn set_control_mode(&self, mode: u8) {
        self.control_mode.store(mode, Ordering::Relaxed);
    }

    /// 現在の校正テーブルを取得
    pub fn table(&self) -> CalibrationTable {
        let mut table = CalibrationTable::identity();
        for sensor in Sensor::ALL {
            table.set(sensor, self.calibration(sensor));
        }
        table
    }
}

impl Settings for SharedSettings {
    #[inline(always)]
    fn calibration(&self, sensor: Sensor) -> SensorCalibration {
        SensorCalibration::new(
            self.bias[sensor.index()].load(Ordering::Relaxed),
            self.scale[sensor.index()].load(Ordering::Relaxed),
        )
    }

    #[inline(always)]
    fn control_mode(&self) -> u8 {
        self.control_mode.load(Ordering::Relaxed)
    }
}
