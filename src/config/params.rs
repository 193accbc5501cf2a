//! 取得コアの既定パラメータ

use crate::calibration::{CalibrationTable, SensorCalibration};
use crate::config::timing::{AcquisitionTiming, ClockPrescaler, SampleTime, TriggerSource};
use crate::dispatch::CONTROL_MODE_NONE;

/// ADCカーネルクロック [Hz]（ADC12SEL = SYSCLK 170MHz）
pub const ADC_KERNEL_CLOCK_HZ: u32 = 170_000_000;

/// PWM周波数 = 取得トリガー周波数 [Hz]（既定値）
pub const DEFAULT_TRIGGER_HZ: u32 = 20_000;

/// バス電圧の故障時センチネル（通常運転の電圧範囲では現れない値）
pub const BUS_VOLTAGE_FAULT_SENTINEL: u16 = 4000;

/// バス電圧のウィンドウ下限 [count]
pub const BUS_VOLTAGE_WINDOW_LOW: u16 = 0;

/// バス電圧のウィンドウ上限 [count]
///
/// センチネル以上の読み値はすべてウィンドウ外として置換されるため、
/// ウィンドウ内の正常値がセンチネルと一致することはない。
pub const BUS_VOLTAGE_WINDOW_HIGH: u16 = BUS_VOLTAGE_FAULT_SENTINEL - 1;

const _: () = assert!(BUS_VOLTAGE_WINDOW_LOW <= BUS_VOLTAGE_WINDOW_HIGH);
const _: () = assert!(BUS_VOLTAGE_WINDOW_HIGH < BUS_VOLTAGE_FAULT_SENTINEL);

/// 起動時の制御モード（取得のみ）
pub const DEFAULT_CONTROL_MODE: u8 = CONTROL_MODE_NONE;

/// 既定のトリガー・変換タイミング
///
/// TIM1 TRGO立ち上がり、170MHz ÷ 4 = 42.5MHz、トラッキング24.5クロック。
/// 1スロット37クロック（約870ns）、7チャネルで約6.1μs。
pub const DEFAULT_TIMING: AcquisitionTiming = AcquisitionTiming::new(TriggerSource::Tim1Trgo)
    .with_prescaler(ClockPrescaler::Div4)
    .with_sample_time(SampleTime::Cycles24_5);

/// 電流センサーの中点（双方向電流のゼロ点）[count]
pub const CURRENT_ZERO_OFFSET: i16 = 2048;

/// 既定の校正値（設定ストアから読み込むまでの初期値）
///
/// 論理順: バス電圧、電流1、電流2、インバーター温度1/2、モーター温度1/2
pub const DEFAULT_CALIBRATION: CalibrationTable = CalibrationTable::new([
    SensorCalibration::new(0, 1),
    SensorCalibration::new(CURRENT_ZERO_OFFSET, 1),
    SensorCalibration::new(CURRENT_ZERO_OFFSET, 1),
    SensorCalibration::new(0, 1),
    SensorCalibration::new(0, 1),
    SensorCalibration::new(0, 1),
    SensorCalibration::new(0, 1),
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Sensor, RAW_MASK};

    #[test]
    fn test_default_timing_fits_default_trigger() {
        assert!(DEFAULT_TIMING
            .budget(ADC_KERNEL_CLOCK_HZ, DEFAULT_TRIGGER_HZ)
            .is_ok());
    }

    #[test]
    fn test_in_window_readings_never_equal_sentinel() {
        for word in BUS_VOLTAGE_WINDOW_LOW..=BUS_VOLTAGE_WINDOW_HIGH {
            assert_ne!(word & RAW_MASK, BUS_VOLTAGE_FAULT_SENTINEL);
        }
        // the sentinel itself and everything above it trips the window
        for word in BUS_VOLTAGE_FAULT_SENTINEL..=RAW_MASK {
            assert!(word > BUS_VOLTAGE_WINDOW_HIGH);
        }
    }

    #[test]
    fn test_sentinel_fits_data_width() {
        assert_eq!(BUS_VOLTAGE_FAULT_SENTINEL & RAW_MASK, BUS_VOLTAGE_FAULT_SENTINEL);
    }

    #[test]
    fn test_current_defaults_are_zero_centred() {
        assert_eq!(DEFAULT_CALIBRATION.get(Sensor::Current1).bias, 2048);
        assert_eq!(DEFAULT_CALIBRATION.get(Sensor::Current2).bias, 2048);
        assert_eq!(DEFAULT_CALIBRATION.get(Sensor::BusVoltage).bias, 0);
    }
}
