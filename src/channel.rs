//! 論理センサーとチャネルマップ
//!
//! ADCの変換順（物理スロット）は基板配線の都合で論理センサーの順序と一致しないため、
//! 固定のルックアップテーブルで対応付けます。

/// ADC分解能 [bit]
pub const ADC_RESOLUTION_BITS: u32 = 12;

/// 12ビットのデータ幅マスク（タグ/ステータスビットを除去）
pub const RAW_MASK: u16 = (1 << ADC_RESOLUTION_BITS) - 1;

/// 論理センサー数
pub const SENSOR_COUNT: usize = 7;

/// 有効な物理スロット数（1トリガーあたりの変換数）
pub const SLOT_COUNT: usize = 7;

/// 1サイクル分のDMAバッファ（物理スロット順）
pub type SampleBuffer = [u16; SLOT_COUNT];

/// 論理センサー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sensor {
    /// DCバス電圧
    BusVoltage,
    /// 相電流1
    Current1,
    /// 相電流2
    Current2,
    /// インバーター温度1
    InverterTemp1,
    /// インバーター温度2
    InverterTemp2,
    /// モーター温度1
    MotorTemp1,
    /// モーター温度2
    MotorTemp2,
}

impl Sensor {
    /// 論理順の全センサー
    pub const ALL: [Sensor; SENSOR_COUNT] = [
        Sensor::BusVoltage,
        Sensor::Current1,
        Sensor::Current2,
        Sensor::InverterTemp1,
        Sensor::InverterTemp2,
        Sensor::MotorTemp1,
        Sensor::MotorTemp2,
    ];

    /// 論理インデックス（RawChannelState・校正テーブルの添字）
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 物理スロット → 論理センサーの固定テーブル
///
/// ADCシーケンスのランク順に並んでいます。配線上、A0〜A7のアナログ番号と
/// ハードウェアのチャネル番号が逆順になっているため、この対応は変換順と一致しません。
pub const CHANNEL_MAP: [Sensor; SLOT_COUNT] = [
    Sensor::MotorTemp2,
    Sensor::MotorTemp1,
    Sensor::InverterTemp1,
    Sensor::BusVoltage,
    Sensor::Current2,
    Sensor::Current1,
    Sensor::InverterTemp2,
];

// テーブルが全単射でなければビルドを止める
const _: () = assert!(is_bijective(&CHANNEL_MAP));

/// 各論理センサーがちょうど1つの物理スロットから供給されるかを検査
pub const fn is_bijective(map: &[Sensor; SLOT_COUNT]) -> bool {
    let mut seen = [false; SENSOR_COUNT];
    let mut slot = 0;
    while slot < SLOT_COUNT {
        let index = map[slot].index();
        if seen[index] {
            return false;
        }
        seen[index] = true;
        slot += 1;
    }
    let mut sensor = 0;
    while sensor < SENSOR_COUNT {
        if !seen[sensor] {
            return false;
        }
        sensor += 1;
    }
    true
}

/// 論理センサーの供給元スロットを逆引き
pub const fn slot_of(sensor: Sensor) -> usize {
    let mut slot = 0;
    while slot < SLOT_COUNT {
        if CHANNEL_MAP[slot] as usize == sensor as usize {
            return slot;
        }
        slot += 1;
    }
    // 全単射はコンパイル時に保証済み
    unreachable!()
}

/// 12ビットにマスク済みの生値
///
/// 構築時に必ずマスクされるため、値は常に `0..=RAW_MASK` に収まります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading(u16);

impl RawReading {
    /// 転送されたワードからデータ幅外のビットを落として生成
    #[inline(always)]
    pub const fn from_word(word: u16) -> Self {
        Self(word & RAW_MASK)
    }

    #[inline(always)]
    pub const fn value(self) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_map_is_bijective() {
        assert!(is_bijective(&CHANNEL_MAP));

        // every sensor has exactly one source slot
        for sensor in Sensor::ALL {
            let sources = CHANNEL_MAP.iter().filter(|&&s| s == sensor).count();
            assert_eq!(sources, 1, "{:?} has {} source slots", sensor, sources);
        }
    }

    #[test]
    fn test_duplicate_slot_is_rejected() {
        let mut map = CHANNEL_MAP;
        map[6] = Sensor::BusVoltage;
        assert!(!is_bijective(&map));
    }

    #[test]
    fn test_wiring_order() {
        assert_eq!(slot_of(Sensor::BusVoltage), 3);
        assert_eq!(slot_of(Sensor::Current1), 5);
        assert_eq!(slot_of(Sensor::Current2), 4);
        assert_eq!(slot_of(Sensor::InverterTemp1), 2);
        assert_eq!(slot_of(Sensor::InverterTemp2), 6);
        assert_eq!(slot_of(Sensor::MotorTemp1), 1);
        assert_eq!(slot_of(Sensor::MotorTemp2), 0);
    }

    #[test]
    fn test_slot_of_inverts_map() {
        for (slot, sensor) in CHANNEL_MAP.iter().enumerate() {
            assert_eq!(slot_of(*sensor), slot);
        }
    }

    #[test]
    fn test_raw_reading_masks_tag_bits() {
        assert_eq!(RawReading::from_word(0xFFFF).value(), 0x0FFF);
        assert_eq!(RawReading::from_word(0x7123).value(), 0x0123);
        assert_eq!(RawReading::from_word(2048).value(), 2048);

        for word in (0..=u16::MAX).step_by(97) {
            assert_eq!(RawReading::from_word(word).value(), word & 0x0FFF);
        }
    }
}
