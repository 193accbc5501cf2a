//! 取得パイプラインのハードウェア設定パラメータ

use g4_acquisition::channel::SLOT_COUNT;

/// GPIOポート
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
}

/// ADCシーケンスの1ランク（物理スロット）
#[derive(Debug, Clone, Copy)]
pub struct AnalogInput {
    /// 入力ピンのポート
    pub port: Port,
    /// 入力ピン番号
    pub pin: usize,
    /// ADC1入力チャネル番号
    pub channel: u8,
}

impl AnalogInput {
    const fn new(port: Port, pin: usize, channel: u8) -> Self {
        Self { port, pin, channel }
    }
}

/// ADC1変換シーケンス（ランク順 = `CHANNEL_MAP` のスロット順）
pub const ADC_SEQUENCE: [AnalogInput; SLOT_COUNT] = [
    AnalogInput::new(Port::C, 3, 9),  // モーター温度2（PC3 = ADC12_IN9）
    AnalogInput::new(Port::C, 2, 8),  // モーター温度1（PC2 = ADC12_IN8）
    AnalogInput::new(Port::C, 0, 6),  // インバーター温度1（PC0 = ADC12_IN6）
    AnalogInput::new(Port::C, 1, 7),  // バス電圧（PC1 = ADC12_IN7）
    AnalogInput::new(Port::B, 1, 12), // 電流2（OPAMP3出力 PB1 = ADC1_IN12）
    AnalogInput::new(Port::A, 2, 3),  // 電流1（OPAMP1出力 PA2 = ADC1_IN3）
    AnalogInput::new(Port::A, 0, 1),  // インバーター温度2（PA0 = ADC12_IN1）
];

/// 取得割り込み（ADC1_2）の優先度
/// STM32は上位4ビットのみ有効（Priority 1 = 0x10）
pub const ACQUISITION_IRQ_PRIORITY: u8 = 0x10;

/// ハンドラー内トレースログの間引き間隔 [cycle]（20kHzで1秒ごと）
pub const TRACE_INTERVAL_CYCLES: u32 = 20_000;

/// PWM設定
pub mod pwm {
    use embassy_stm32::time::Hertz;

    /// PWM周波数 = 取得トリガー周波数（20kHz）（デフォルト値）
    pub const DEFAULT_FREQUENCY: Hertz = Hertz(g4_acquisition::config::DEFAULT_TRIGGER_HZ);

    /// デッドタイム（デフォルト値）
    pub const DEFAULT_DEAD_TIME: u16 = 1;
}

/// 監視タスク設定
pub mod monitor {
    /// センサーログ周期 [ms]
    pub const LOG_PERIOD_MS: u64 = 1000;

    /// LED点滅周期 [ms]
    pub const LED_PERIOD_MS: u64 = 500;
}
