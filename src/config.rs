//! Configuration module
//!
//! 取得コアの既定値と、トリガー・変換タイミングの型付き設定を提供します。

pub mod params;
pub mod timing;

// params.rsから主要な定数を再エクスポート
pub use params::*;

// timing.rsから型を再エクスポート
pub use timing::{
    AcquisitionTiming, ClockPrescaler, SampleTime, TimingBudget, TimingError, TriggerEdge,
    TriggerSource,
};
