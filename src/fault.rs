//! アウトオブウィンドウ故障監視
//!
//! 完了イベントとは独立したウィンドウ外フラグを検査し、対象センサーの生値を
//! 物理的にあり得ないセンチネル値で上書きします。エラーとして呼び出し元へは返さず、
//! 下流の消費者が値の異常から判断できるようにします。

use crate::channel::{RawReading, Sensor};
use crate::state::RawChannelState;

/// 故障監視の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultMonitor {
    /// 監視対象センサー
    pub sensor: Sensor,
    /// 故障時に書き込む生値
    pub sentinel: u16,
}

impl FaultMonitor {
    pub const fn new(sensor: Sensor, sentinel: u16) -> Self {
        Self { sensor, sentinel }
    }

    /// ウィンドウ外フラグが立っていればセンチネルを書き込む
    ///
    /// 生値の書き込みは完了ハンドラー（`AcquisitionController::on_completion`）からのみ行う。
    ///
    /// # 戻り値
    /// 置換を行った場合 `true`
    #[inline(always)]
    pub(crate) fn check(&self, out_of_window: bool, state: &RawChannelState) -> bool {
        if out_of_window {
            state.store(self.sensor, RawReading::from_word(self.sentinel));
        }
        out_of_window
    }

    // TODO: 電流1の比較ウィンドウ（第2アナログウォッチドッグ）を有効にする場合は、
    // しきい値の実測が済んでから監視対象を複数持てる形に拡張する
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::SLOT_COUNT;

    #[test]
    fn test_fault_substitutes_sentinel() {
        let state = RawChannelState::new();
        let mut samples = [0u16; SLOT_COUNT];
        samples[3] = 1500; // bus voltage slot
        state.latch(&samples);

        let monitor = FaultMonitor::new(Sensor::BusVoltage, 4000);
        assert!(monitor.check(true, &state));
        assert_eq!(state.get(Sensor::BusVoltage).value(), 4000);
    }

    #[test]
    fn test_no_fault_leaves_state() {
        let state = RawChannelState::new();
        let mut samples = [0u16; SLOT_COUNT];
        samples[3] = 1500;
        state.latch(&samples);

        let monitor = FaultMonitor::new(Sensor::BusVoltage, 4000);
        assert!(!monitor.check(false, &state));
        assert_eq!(state.get(Sensor::BusVoltage).value(), 1500);
    }

    #[test]
    fn test_only_target_sensor_is_touched() {
        let state = RawChannelState::new();
        state.latch(&[11, 22, 33, 44, 55, 66, 77]);

        FaultMonitor::new(Sensor::BusVoltage, 4000).check(true, &state);
        assert_eq!(state.snapshot(), [4000, 66, 55, 33, 77, 22, 11]);
    }
}
