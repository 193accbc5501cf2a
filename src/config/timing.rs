//! ADCトリガー・変換タイミングの型付き設定
//!
//! 名前付きオプションとそのクロック効果をデータとして保持し、
//! ファームウェアはここから得たフィールドコードだけをレジスタへ書き込みます。
//!
//! ## タイミングモデル（STM32G4 ADC、12ビット）
//! - クロック分周: CCR.PRESC（カーネルクロック ÷ 1〜256）
//! - トラッキング: SMPRのサンプリング時間（2.5〜640.5 ADCクロック）
//! - 転送（逐次比較）: 12.5 ADCクロック固定
//! - スタートアップ: 電圧レギュレータ起動 20μs（初期化時に1回のみ）
//! - セトリング: PGAを持たないため不要
//!
//! 1スロット = トラッキング + 12.5クロック、1シーケンス = 7スロットです。
//! スロット間隔がそのままチャネル間スキューの上限になります。

use crate::channel::SLOT_COUNT;

/// ADCクロックの上限 [Hz]
pub const MAX_ADC_CLOCK_HZ: u32 = 60_000_000;

/// 12ビット逐次比較の変換時間 [ADCクロック×2]
pub const CONVERSION_HALF_CYCLES: u32 = 25;

/// ADC電圧レギュレータの起動時間 [μs]
pub const REGULATOR_STARTUP_US: u32 = 20;

const NS_PER_S: u64 = 1_000_000_000;

/// ADCクロック分周（CCR.PRESC）
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPrescaler {
    Div1 = 0,
    Div2 = 1,
    Div4 = 2,
    Div6 = 3,
    Div8 = 4,
    Div10 = 5,
    Div12 = 6,
    Div16 = 7,
    Div32 = 8,
    Div64 = 9,
    Div128 = 10,
    Div256 = 11,
}

impl ClockPrescaler {
    pub const fn divisor(self) -> u32 {
        match self {
            ClockPrescaler::Div1 => 1,
            ClockPrescaler::Div2 => 2,
            ClockPrescaler::Div4 => 4,
            ClockPrescaler::Div6 => 6,
            ClockPrescaler::Div8 => 8,
            ClockPrescaler::Div10 => 10,
            ClockPrescaler::Div12 => 12,
            ClockPrescaler::Div16 => 16,
            ClockPrescaler::Div32 => 32,
            ClockPrescaler::Div64 => 64,
            ClockPrescaler::Div128 => 128,
            ClockPrescaler::Div256 => 256,
        }
    }

    /// PRESCフィールド値
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// トラッキング（サンプリング）時間（SMPR.SMPx）
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleTime {
    Cycles2_5 = 0,
    Cycles6_5 = 1,
    Cycles12_5 = 2,
    Cycles24_5 = 3,
    Cycles47_5 = 4,
    Cycles92_5 = 5,
    Cycles247_5 = 6,
    Cycles640_5 = 7,
}

impl SampleTime {
    /// サンプリング時間 [ADCクロック×2]
    pub const fn half_cycles(self) -> u32 {
        match self {
            SampleTime::Cycles2_5 => 5,
            SampleTime::Cycles6_5 => 13,
            SampleTime::Cycles12_5 => 25,
            SampleTime::Cycles24_5 => 49,
            SampleTime::Cycles47_5 => 95,
            SampleTime::Cycles92_5 => 185,
            SampleTime::Cycles247_5 => 495,
            SampleTime::Cycles640_5 => 1281,
        }
    }

    /// SMPフィールド値
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// 外部トリガー源（ADC12 EXTSEL）
///
/// ソフトウェアトリガーは意図的に用意していません。
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSource {
    Tim8Trgo = 7,
    Tim8Trgo2 = 8,
    Tim1Trgo = 9,
    Tim1Trgo2 = 10,
}

impl TriggerSource {
    /// EXTSELフィールド値
    pub const fn extsel(self) -> u8 {
        self as u8
    }
}

/// トリガーエッジ（CFGR.EXTEN）
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerEdge {
    Rising = 1,
    Falling = 2,
    Both = 3,
}

impl TriggerEdge {
    /// EXTENフィールド値
    pub const fn exten(self) -> u8 {
        self as u8
    }
}

/// タイミング設定のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// トリガー周波数が0
    ZeroTriggerRate,
    /// 分周後のADCクロックが0
    ZeroAdcClock,
    /// ADCクロックが上限を超える
    AdcClockTooFast { adc_clock_hz: u32 },
    /// 変換シーケンスがトリガー周期の半分に収まらない
    SequenceTooLong { sequence_ns: u32, trigger_period_ns: u32 },
}

/// 検証済みのタイミング予算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingBudget {
    /// ADCクロック [Hz]
    pub adc_clock_hz: u32,
    /// 隣接チャネル間のサンプリング間隔 [ns]
    pub channel_spacing_ns: u32,
    /// 全チャネルの変換時間 [ns]
    pub sequence_ns: u32,
    /// トリガー周期 [ns]
    pub trigger_period_ns: u32,
    /// 完了イベントからDMA再アームまでの期限 [ns]
    pub rearm_deadline_ns: u32,
    /// ハンドラー全体の実行時間上限 [ns]
    pub handler_budget_ns: u32,
}

/// トリガー・変換タイミング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionTiming {
    pub trigger: TriggerSource,
    pub edge: TriggerEdge,
    pub prescaler: ClockPrescaler,
    pub sample_time: SampleTime,
}

impl AcquisitionTiming {
    /// 指定トリガー（立ち上がり）、÷4、24.5クロックで生成
    pub const fn new(trigger: TriggerSource) -> Self {
        Self {
            trigger,
            edge: TriggerEdge::Rising,
            prescaler: ClockPrescaler::Div4,
            sample_time: SampleTime::Cycles24_5,
        }
    }

    pub const fn with_edge(mut self, edge: TriggerEdge) -> Self {
        self.edge = edge;
        self
    }

    pub const fn with_prescaler(mut self, prescaler: ClockPrescaler) -> Self {
        self.prescaler = prescaler;
        self
    }

    pub const fn with_sample_time(mut self, sample_time: SampleTime) -> Self {
        self.sample_time = sample_time;
        self
    }

    /// 分周後のADCクロック [Hz]
    pub const fn adc_clock_hz(&self, kernel_clock_hz: u32) -> u32 {
        kernel_clock_hz / self.prescaler.divisor()
    }

    /// 1スロットの所要時間 [ADCクロック×2]
    pub const fn slot_half_cycles(&self) -> u32 {
        self.sample_time.half_cycles() + CONVERSION_HALF_CYCLES
    }

    /// 全スロットの所要時間 [ADCクロック×2]
    pub const fn sequence_half_cycles(&self) -> u32 {
        self.slot_half_cycles() * SLOT_COUNT as u32
    }

    /// カーネルクロックとトリガー周波数に対して予算を検証
    pub fn budget(
        &self,
        kernel_clock_hz: u32,
        trigger_hz: u32,
    ) -> Result<TimingBudget, TimingError> {
        if trigger_hz == 0 {
            return Err(TimingError::ZeroTriggerRate);
        }

        let adc_clock_hz = self.adc_clock_hz(kernel_clock_hz);
        if adc_clock_hz == 0 {
            return Err(TimingError::ZeroAdcClock);
        }
        if adc_clock_hz > MAX_ADC_CLOCK_HZ {
            return Err(TimingError::AdcClockTooFast { adc_clock_hz });
        }

        let half_cycles_to_ns =
            |half_cycles: u32| half_cycles as u64 * NS_PER_S / (2 * adc_clock_hz as u64);

        let channel_spacing_ns = half_cycles_to_ns(self.slot_half_cycles());
        let sequence_ns = half_cycles_to_ns(self.sequence_half_cycles());
        let trigger_period_ns = NS_PER_S / trigger_hz as u64;

        // 変換はトリガー周期の半分以内で終わらせる
        if sequence_ns * 2 > trigger_period_ns {
            return Err(TimingError::SequenceTooLong {
                sequence_ns: sequence_ns.min(u32::MAX as u64) as u32,
                trigger_period_ns: trigger_period_ns as u32,
            });
        }

        Ok(TimingBudget {
            adc_clock_hz,
            channel_spacing_ns: channel_spacing_ns as u32,
            sequence_ns: sequence_ns as u32,
            trigger_period_ns: trigger_period_ns as u32,
            rearm_deadline_ns: (trigger_period_ns - sequence_ns) as u32,
            handler_budget_ns: trigger_period_ns as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KERNEL_HZ: u32 = 170_000_000;

    #[test]
    fn test_default_budget() {
        let timing = AcquisitionTiming::new(TriggerSource::Tim1Trgo);
        let budget = timing.budget(KERNEL_HZ, 20_000).unwrap();

        assert_eq!(budget.adc_clock_hz, 42_500_000);
        // 37 ADC clocks per slot
        assert_eq!(budget.channel_spacing_ns, 870);
        assert_eq!(budget.sequence_ns, 6_094);
        assert_eq!(budget.trigger_period_ns, 50_000);
        assert_eq!(budget.rearm_deadline_ns, 50_000 - 6_094);
        assert_eq!(budget.handler_budget_ns, 50_000);
    }

    #[test]
    fn test_sequence_too_long() {
        let timing = AcquisitionTiming::new(TriggerSource::Tim1Trgo)
            .with_prescaler(ClockPrescaler::Div256)
            .with_sample_time(SampleTime::Cycles640_5);
        match timing.budget(KERNEL_HZ, 20_000) {
            Err(TimingError::SequenceTooLong { trigger_period_ns, .. }) => {
                assert_eq!(trigger_period_ns, 50_000)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_adc_clock_limit() {
        let timing =
            AcquisitionTiming::new(TriggerSource::Tim1Trgo).with_prescaler(ClockPrescaler::Div1);
        assert_eq!(
            timing.budget(KERNEL_HZ, 20_000),
            Err(TimingError::AdcClockTooFast { adc_clock_hz: KERNEL_HZ })
        );

        // 170MHz / 4 is the fastest setting inside the limit
        let timing =
            AcquisitionTiming::new(TriggerSource::Tim1Trgo).with_prescaler(ClockPrescaler::Div2);
        assert!(timing.budget(KERNEL_HZ, 20_000).is_err());
    }

    #[test]
    fn test_zero_rates() {
        let timing = AcquisitionTiming::new(TriggerSource::Tim1Trgo);
        assert_eq!(timing.budget(KERNEL_HZ, 0), Err(TimingError::ZeroTriggerRate));
        assert_eq!(timing.budget(0, 20_000), Err(TimingError::ZeroAdcClock));
    }

    #[test]
    fn test_half_period_boundary() {
        // 7 slots of 37 clocks at 42.5MHz take ~6.1us, which must fit in half a period
        let timing = AcquisitionTiming::new(TriggerSource::Tim1Trgo);
        assert!(timing.budget(KERNEL_HZ, 80_000).is_ok()); // 12.5us period
        assert!(timing.budget(KERNEL_HZ, 90_000).is_err()); // 11.1us period
    }

    #[test]
    fn test_field_codes() {
        let timing = AcquisitionTiming::new(TriggerSource::Tim1Trgo)
            .with_edge(TriggerEdge::Both)
            .with_sample_time(SampleTime::Cycles640_5);
        assert_eq!(timing.trigger.extsel(), 9);
        assert_eq!(timing.edge.exten(), 3);
        assert_eq!(timing.prescaler.bits(), 2);
        assert_eq!(timing.sample_time.bits(), 7);
        assert_eq!(timing.sequence_half_cycles(), 7 * (1281 + 25));
    }
}
