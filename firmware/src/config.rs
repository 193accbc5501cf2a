//! Configuration module
//!
//! 取得パイプラインのハードウェア割り当て（ピン・ADCチャネル・PWM・割り込み優先度）を
//! 提供します。校正値と制御モードの既定値は `g4_acquisition::config` にあります。

pub mod params;

// params.rsから主要な定数を再エクスポート
pub use params::*;
