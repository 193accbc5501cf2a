//! タスクモジュール
//!
//! 各タスクの実装を分離して管理します。

pub mod led;
pub mod sensor_monitor;

// タスク関数を再エクスポート
pub use led::led_task;
pub use sensor_monitor::sensor_monitor_task;
