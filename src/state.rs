//! 取得状態（割り込みハンドラーが唯一の書き込み元）
//!
//! 各センサーの生値は1ワードのアトミックに格納し、フォアグラウンドからの読み出しで
//! 値が裂けることはありません。ただし同一サイクル内のセンサー間整合は保証しません。
//! 書き込み用メソッドはクレート内に閉じており、`AcquisitionController` 以外からは
//! 更新できません。

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::channel::{RawReading, Sensor, CHANNEL_MAP, SENSOR_COUNT, SLOT_COUNT};

/// 論理センサーごとの最新生値
pub struct RawChannelState {
    raw: [AtomicU16; SENSOR_COUNT],
}

impl RawChannelState {
    pub const fn new() -> Self {
        Self {
            raw: [
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
            ],
        }
    }

    /// センサーの最新生値（12ビット）を取得
    #[inline(always)]
    pub fn get(&self, sensor: Sensor) -> RawReading {
        RawReading::from_word(self.raw[sensor.index()].load(Ordering::Relaxed))
    }

    /// 全センサーの生値を論理順で取得（ログ用）
    pub fn snapshot(&self) -> [u16; SENSOR_COUNT] {
        let mut values = [0u16; SENSOR_COUNT];
        for (value, cell) in values.iter_mut().zip(self.raw.iter()) {
            *value = cell.load(Ordering::Relaxed);
        }
        values
    }

    #[inline(always)]
    pub(crate) fn store(&self, sensor: Sensor, reading: RawReading) {
        self.raw[sensor.index()].store(reading.value(), Ordering::Relaxed);
    }

    /// DMAバッファ（物理スロット順）をマスクしてチャネルマップ位置へ書き込む
    #[inline(always)]
    pub(crate) fn latch(&self, samples: &[u16; SLOT_COUNT]) {
        for (word, sensor) in samples.iter().zip(CHANNEL_MAP.iter()) {
            self.store(*sensor, RawReading::from_word(*word));
        }
    }
}

impl Default for RawChannelState {
    fn default() -> Self {
        Self::new()
    }
}

/// 単一書き込み元のラップアラウンドカウンタ
///
/// 書き込みはハンドラーのみなのでread-modify-writeは不要です。
pub struct AcquisitionCounter(AtomicU32);

impl AcquisitionCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// 任意の初期値から開始（ラップ動作の確認用）
    pub const fn starting_at(value: u32) -> Self {
        Self(AtomicU32::new(value))
    }

    #[inline(always)]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub(crate) fn increment(&self) -> u32 {
        let next = self.0.load(Ordering::Relaxed).wrapping_add(1);
        self.0.store(next, Ordering::Relaxed);
        next
    }
}

impl Default for AcquisitionCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// 診断情報のスナップショット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// 完了した取得サイクル数
    pub cycles: u32,
    /// 転送完了ビットなしで発生した完了イベント数
    pub spurious_events: u32,
    /// センチネル置換を行ったサイクル数
    pub fault_substitutions: u32,
}

/// 取得パイプラインがプロセス寿命で保持する状態一式
///
/// ファームウェアでは `static` に置き、割り込みハンドラーとフォアグラウンドで共有します。
pub struct AcquisitionState {
    pub raw: RawChannelState,
    pub cycles: AcquisitionCounter,
    spurious_events: AcquisitionCounter,
    fault_substitutions: AcquisitionCounter,
}

impl AcquisitionState {
    pub const fn new() -> Self {
        Self {
            raw: RawChannelState::new(),
            cycles: AcquisitionCounter::new(),
            spurious_events: AcquisitionCounter::new(),
            fault_substitutions: AcquisitionCounter::new(),
        }
    }

    /// サイクルカウンタを任意の値から開始した状態を生成
    pub const fn with_cycle_count(cycles: u32) -> Self {
        Self {
            raw: RawChannelState::new(),
            cycles: AcquisitionCounter::starting_at(cycles),
            spurious_events: AcquisitionCounter::new(),
            fault_substitutions: AcquisitionCounter::new(),
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            cycles: self.cycles.get(),
            spurious_events: self.spurious_events.get(),
            fault_substitutions: self.fault_substitutions.get(),
        }
    }

    #[inline(always)]
    pub(crate) fn record_spurious(&self) {
        self.spurious_events.increment();
    }

    #[inline(always)]
    pub(crate) fn record_fault(&self) {
        self.fault_substitutions.increment();
    }
}

impl Default for AcquisitionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_remaps_and_masks() {
        let state = RawChannelState::new();
        // slot order: MT2, MT1, IT1, BUS, I2, I1, IT2
        state.latch(&[0xF010, 0x1020, 0x2030, 0x3040, 0x4050, 0x5060, 0x6070]);

        assert_eq!(state.get(Sensor::MotorTemp2).value(), 0x010);
        assert_eq!(state.get(Sensor::MotorTemp1).value(), 0x020);
        assert_eq!(state.get(Sensor::InverterTemp1).value(), 0x030);
        assert_eq!(state.get(Sensor::BusVoltage).value(), 0x040);
        assert_eq!(state.get(Sensor::Current2).value(), 0x050);
        assert_eq!(state.get(Sensor::Current1).value(), 0x060);
        assert_eq!(state.get(Sensor::InverterTemp2).value(), 0x070);
    }

    #[test]
    fn test_snapshot_is_logical_order() {
        let state = RawChannelState::new();
        state.latch(&[7, 6, 4, 1, 3, 2, 5]);
        assert_eq!(state.snapshot(), [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_latch_overwrites_in_place() {
        let state = RawChannelState::new();
        state.latch(&[100; SLOT_COUNT]);
        state.latch(&[200; SLOT_COUNT]);
        assert_eq!(state.snapshot(), [200; SENSOR_COUNT]);
    }

    #[test]
    fn test_counter_wraps() {
        let counter = AcquisitionCounter::starting_at(u32::MAX - 1);
        assert_eq!(counter.increment(), u32::MAX);
        assert_eq!(counter.increment(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_diagnostics_start_at_zero() {
        let state = AcquisitionState::new();
        assert_eq!(state.diagnostics(), Diagnostics::default());

        state.record_spurious();
        state.record_fault();
        state.record_fault();
        let diag = state.diagnostics();
        assert_eq!(diag.cycles, 0);
        assert_eq!(diag.spurious_events, 1);
        assert_eq!(diag.fault_substitutions, 2);
    }
}
