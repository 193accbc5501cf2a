// Calibration transform: raw ADC counts -> signed physical units

use crate::channel::{RawReading, Sensor, SENSOR_COUNT};

/// Bias/scale pair for one sensor
///
/// `bias` is in raw ADC counts, `scale` is the multiplier from counts to the
/// caller's physical unit (mV, mA, 0.1 degC, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorCalibration {
    pub bias: i16,
    pub scale: i16,
}

impl SensorCalibration {
    pub const fn new(bias: i16, scale: i16) -> Self {
        Self { bias, scale }
    }

    /// Identity calibration (physical value == raw counts)
    pub const fn identity() -> Self {
        Self::new(0, 1)
    }

    /// Apply `(raw - bias) * scale`
    ///
    /// A masked reading is at most 4095, so the worst case magnitude is
    /// (4095 + 32768) * 32768, which still fits in an `i32`.
    #[inline(always)]
    pub const fn apply(self, raw: RawReading) -> i32 {
        (raw.value() as i32 - self.bias as i32) * self.scale as i32
    }
}

// worst case of `apply` must stay inside i32
const _: () = {
    let worst = (crate::channel::RAW_MASK as i64 - i16::MIN as i64) * (i16::MIN as i64);
    assert!(worst >= i32::MIN as i64 && -worst <= i32::MAX as i64 + 1);
};

/// Per-sensor calibration table, indexed by `Sensor::index()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTable {
    entries: [SensorCalibration; SENSOR_COUNT],
}

impl CalibrationTable {
    pub const fn new(entries: [SensorCalibration; SENSOR_COUNT]) -> Self {
        Self { entries }
    }

    /// Every sensor reports raw counts
    pub const fn identity() -> Self {
        Self::new([SensorCalibration::identity(); SENSOR_COUNT])
    }

    #[inline(always)]
    pub const fn get(&self, sensor: Sensor) -> SensorCalibration {
        self.entries[sensor.index()]
    }

    pub fn set(&mut self, sensor: Sensor, calibration: SensorCalibration) {
        self.entries[sensor.index()] = calibration;
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::identity()
    }
}

/// Convert a raw reading to physical units
#[inline(always)]
pub const fn physical_value(raw: RawReading, calibration: SensorCalibration) -> i32 {
    calibration.apply(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::RAW_MASK;

    fn raw(value: u16) -> RawReading {
        RawReading::from_word(value)
    }

    #[test]
    fn test_midscale_identity() {
        assert_eq!(physical_value(raw(2048), SensorCalibration::new(0, 1)), 2048);
    }

    #[test]
    fn test_negative_result() {
        assert_eq!(physical_value(raw(0), SensorCalibration::new(100, 2)), -200);
    }

    #[test]
    fn test_algebraic_identity_over_raw_range() {
        let calibrations = [
            SensorCalibration::new(0, 1),
            SensorCalibration::new(2048, 12),
            SensorCalibration::new(-500, -7),
            SensorCalibration::new(4095, 3),
        ];
        for calibration in calibrations {
            for value in 0..=RAW_MASK {
                let expected = (value as i64 - calibration.bias as i64) * calibration.scale as i64;
                assert_eq!(physical_value(raw(value), calibration) as i64, expected);
            }
        }
    }

    #[test]
    fn test_extremes_do_not_overflow() {
        let worst = SensorCalibration::new(i16::MIN, i16::MIN);
        assert_eq!(
            physical_value(raw(RAW_MASK), worst) as i64,
            (4095i64 + 32768) * -32768
        );

        let largest = SensorCalibration::new(i16::MIN, i16::MAX);
        assert_eq!(
            physical_value(raw(RAW_MASK), largest) as i64,
            (4095i64 + 32768) * 32767
        );

        let low = SensorCalibration::new(i16::MAX, i16::MAX);
        assert_eq!(physical_value(raw(0), low) as i64, -32767i64 * 32767);
    }

    #[test]
    fn test_table_lookup() {
        let mut table = CalibrationTable::identity();
        table.set(Sensor::Current1, SensorCalibration::new(2048, 5));
        assert_eq!(table.get(Sensor::Current1), SensorCalibration::new(2048, 5));
        assert_eq!(table.get(Sensor::Current2), SensorCalibration::identity());
    }
}
