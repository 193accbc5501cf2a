//! グローバル共有状態管理
//!
//! 取得割り込みとフォアグラウンドタスクで共有する状態です。
//! いずれもアトミック値の集合で、割り込みハンドラー内でロックを取りません。

use g4_acquisition::config::{DEFAULT_CALIBRATION, DEFAULT_CONTROL_MODE};
use g4_acquisition::{AcquisitionState, SharedSettings};

/// 生値・サイクルカウンタ・診断カウンタ（書き込みは取得割り込みのみ）
pub static ACQUISITION: AcquisitionState = AcquisitionState::new();

/// 校正値と制御モード（設定管理が書き込み、取得割り込みが読み出す）
pub static SETTINGS: SharedSettings = SharedSettings::new(&DEFAULT_CALIBRATION, DEFAULT_CONTROL_MODE);
