//! 制御更新フック
//!
//! 取得割り込みから同期的に呼ばれる制御則の入口です。V/Hz・FOCの制御則本体は
//! 外部コラボレータが実装し、ここでは呼び出し回数のみを記録します。

use core::sync::atomic::{AtomicU32, Ordering};

use g4_acquisition::ControlHooks;

/// V/Hz更新の呼び出し回数
pub static VHZ_UPDATES: AtomicU32 = AtomicU32::new(0);

/// FOC更新の呼び出し回数
pub static FOC_UPDATES: AtomicU32 = AtomicU32::new(0);

/// 取得割り込みから呼ばれる制御ループ
pub struct ControlLoop;

impl ControlHooks for ControlLoop {
    #[inline(always)]
    fn update_vhz(&mut self) {
        VHZ_UPDATES.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    fn update_foc(&mut self) {
        FOC_UPDATES.fetch_add(1, Ordering::Relaxed);
    }
}

/// 制御更新の呼び出し回数 (V/Hz, FOC)
pub fn update_counts() -> (u32, u32) {
    (
        VHZ_UPDATES.load(Ordering::Relaxed),
        FOC_UPDATES.load(Ordering::Relaxed),
    )
}
