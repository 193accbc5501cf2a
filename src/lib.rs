//! PWM同期アナログ取得コア
//!
//! バス電圧・相電流×2・インバーター温度×2・モーター温度×2をPWM周期に同期して
//! 取得し、校正済みの物理量として提供します。完了割り込み内で制御更新
//! （V/Hz または FOC）へサンプルを受け渡します。
//!
//! ハードウェア非依存部分のみを含み、ホスト上でテストできます。
//! STM32G431への結合は `firmware/` にあります。

#![cfg_attr(not(test), no_std)]

// fmtは他モジュールより先に宣言する（マクロ定義のため）
mod fmt;

pub mod acquisition;
pub mod calibration;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod fault;
pub mod sensors;
pub mod settings;
pub mod state;

// Re-export main types for easier access
pub use acquisition::{AcquisitionController, CompletionStatus, CycleOutcome, SampleTransfer};
pub use calibration::{physical_value, CalibrationTable, SensorCalibration};
pub use channel::{RawReading, SampleBuffer, Sensor, CHANNEL_MAP, RAW_MASK, SLOT_COUNT};
pub use dispatch::{ControlHooks, ControlStrategy};
pub use fault::FaultMonitor;
pub use sensors::SensorReadings;
pub use settings::{FixedSettings, Settings, SharedSettings};
pub use state::{AcquisitionCounter, AcquisitionState, Diagnostics, RawChannelState};
