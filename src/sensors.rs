//! センサー値の問い合わせ
//!
//! 現在の生値と校正値から物理量を都度計算します。読み出しのみなので
//! どの実行コンテキストからでも呼び出せます。

use crate::calibration::physical_value;
use crate::channel::{RawReading, Sensor, SENSOR_COUNT};
use crate::settings::Settings;
use crate::state::RawChannelState;

/// 生値と設定を束ねた読み出しビュー
pub struct SensorReadings<'a, S: Settings> {
    state: &'a RawChannelState,
    settings: &'a S,
}

impl<'a, S: Settings> SensorReadings<'a, S> {
    pub const fn new(state: &'a RawChannelState, settings: &'a S) -> Self {
        Self { state, settings }
    }

    /// センサーの生値
    #[inline(always)]
    pub fn raw(&self, sensor: Sensor) -> RawReading {
        self.state.get(sensor)
    }

    /// センサーの物理量（`(raw - bias) * scale`）
    #[inline(always)]
    pub fn physical(&self, sensor: Sensor) -> i32 {
        physical_value(self.state.get(sensor), self.settings.calibration(sensor))
    }

    /// 全センサーの物理量（論理順）
    pub fn all(&self) -> [i32; SENSOR_COUNT] {
        Sensor::ALL.map(|sensor| self.physical(sensor))
    }

    pub fn bus_voltage(&self) -> i32 {
        self.physical(Sensor::BusVoltage)
    }

    pub fn current1(&self) -> i32 {
        self.physical(Sensor::Current1)
    }

    pub fn current2(&self) -> i32 {
        self.physical(Sensor::Current2)
    }

    pub fn inverter_temp1(&self) -> i32 {
        self.physical(Sensor::InverterTemp1)
    }

    pub fn inverter_temp2(&self) -> i32 {
        self.physical(Sensor::InverterTemp2)
    }

    pub fn motor_temp1(&self) -> i32 {
        self.physical(Sensor::MotorTemp1)
    }

    pub fn motor_temp2(&self) -> i32 {
        self.physical(Sensor::MotorTemp2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationTable, SensorCalibration};
    use crate::settings::{FixedSettings, SharedSettings};

    #[test]
    fn test_accessors_follow_channel_map() {
        let state = RawChannelState::new();
        // slot order: MT2, MT1, IT1, BUS, I2, I1, IT2
        state.latch(&[700, 600, 400, 100, 300, 200, 500]);
        let settings = FixedSettings {
            calibration: CalibrationTable::identity(),
            control_mode: 0,
        };
        let readings = SensorReadings::new(&state, &settings);

        assert_eq!(readings.bus_voltage(), 100);
        assert_eq!(readings.current1(), 200);
        assert_eq!(readings.current2(), 300);
        assert_eq!(readings.inverter_temp1(), 400);
        assert_eq!(readings.inverter_temp2(), 500);
        assert_eq!(readings.motor_temp1(), 600);
        assert_eq!(readings.motor_temp2(), 700);
        assert_eq!(readings.all(), [100, 200, 300, 400, 500, 600, 700]);
    }

    #[test]
    fn test_each_sensor_uses_its_own_calibration() {
        let state = RawChannelState::new();
        state.latch(&[1000; 7]);

        let mut table = CalibrationTable::identity();
        table.set(Sensor::MotorTemp1, SensorCalibration::new(100, 2));
        table.set(Sensor::MotorTemp2, SensorCalibration::new(200, 3));
        let settings = SharedSettings::new(&table, 0);
        let readings = SensorReadings::new(&state, &settings);

        assert_eq!(readings.motor_temp1(), (1000 - 100) * 2);
        assert_eq!(readings.motor_temp2(), (1000 - 200) * 3);
    }

    #[test]
    fn test_calibration_changes_apply_on_next_read() {
        let state = RawChannelState::new();
        state.latch(&[0, 0, 0, 0, 0, 0, 0]);
        let settings = SharedSettings::new(&CalibrationTable::identity(), 0);
        let readings = SensorReadings::new(&state, &settings);
        assert_eq!(readings.current1(), 0);

        settings.set_calibration(Sensor::Current1, SensorCalibration::new(100, 2));
        assert_eq!(readings.current1(), -200);
    }

    #[test]
    fn test_sentinel_is_transformed_mechanically() {
        let state = RawChannelState::new();
        state.store(Sensor::BusVoltage, RawReading::from_word(4000));
        let settings = SharedSettings::new(&CalibrationTable::identity(), 0);
        settings.set_calibration(Sensor::BusVoltage, SensorCalibration::new(10, 3));
        let readings = SensorReadings::new(&state, &settings);

        assert_eq!(readings.raw(Sensor::BusVoltage).value(), 4000);
        assert_eq!(readings.bus_voltage(), (4000 - 10) * 3);
    }
}
