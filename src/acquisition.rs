//! 取得コントローラ
//!
//! PWMトリガー → ADCシーケンス → DMA転送 → 完了割り込み のサイクルを駆動します。
//! 完了ハンドラーの処理順は固定です。
//!
//! 1. イベントステータスを読み取り・クリア
//! 2. 転送完了なら各スロットをマスクしてチャネルマップ位置へ書き込み
//! 3. 直ちにDMAを再アーム（次のトリガーを取りこぼさないため、以降の処理より先に行う）
//! 4. サイクルカウンタを加算
//! 5. 故障監視（転送完了とは独立に評価）
//! 6. 制御モードに応じた制御更新を1回だけ呼び出し
//!
//! ハンドラーはロックを取らず、ブロックもしません。

use crate::channel::{SampleBuffer, SLOT_COUNT};
use crate::dispatch::{dispatch, ControlHooks, ControlStrategy};
use crate::fault::FaultMonitor;
use crate::settings::Settings;
use crate::state::AcquisitionState;

/// 完了割り込み時のイベントステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompletionStatus {
    /// 期待した転送元の転送完了
    pub transfer_complete: bool,
    /// ウィンドウ外（アナログウォッチドッグ）検出
    pub out_of_window: bool,
}

/// 変換・転送機構
///
/// 「N個の生サンプルをバッファへ届け、完了を通知する」ブラックボックスとして扱います。
pub trait SampleTransfer {
    /// 保留中のイベントフラグを読み取り、クリアする
    fn take_status(&mut self) -> CompletionStatus;

    /// 直近の転送で届いたワード（物理スロット順）
    fn samples(&self) -> SampleBuffer;

    /// 転送先を先頭に戻し、`count` サンプルを待つ状態にする
    fn rearm(&mut self, count: usize);
}

/// 1回の完了イベントの処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// 転送完了として処理した
    Completed {
        cycle: u32,
        fault: bool,
        strategy: ControlStrategy,
    },
    /// 転送完了ビットなし（故障監視のみ実施）
    Spurious { fault: bool },
}

/// 取得コントローラ
///
/// 状態・設定は参照で受け取るため、割り込みハンドラー内で毎回組み立てても低コストです。
pub struct AcquisitionController<'a, T, S, H>
where
    T: SampleTransfer,
    S: Settings,
    H: ControlHooks,
{
    transfer: T,
    state: &'a AcquisitionState,
    settings: &'a S,
    hooks: H,
    fault: FaultMonitor,
}

impl<'a, T, S, H> AcquisitionController<'a, T, S, H>
where
    T: SampleTransfer,
    S: Settings,
    H: ControlHooks,
{
    pub fn new(
        transfer: T,
        state: &'a AcquisitionState,
        settings: &'a S,
        hooks: H,
        fault: FaultMonitor,
    ) -> Self {
        Self {
            transfer,
            state,
            settings,
            hooks,
            fault,
        }
    }

    /// 初回のDMAアーム（初期化時に1回）
    pub fn arm(&mut self) {
        self.transfer.rearm(SLOT_COUNT);
    }

    /// 完了イベント1回分の処理
    pub fn on_completion(&mut self) -> CycleOutcome {
        let status = self.transfer.take_status();

        if !status.transfer_complete {
            self.state.record_spurious();
            let fault = self.check_fault(status);
            trace!("Spurious completion event (fault={})", fault);
            return CycleOutcome::Spurious { fault };
        }

        let samples = self.transfer.samples();
        self.state.raw.latch(&samples);
        self.transfer.rearm(SLOT_COUNT);

        let cycle = self.state.cycles.increment();
        let fault = self.check_fault(status);

        let strategy = dispatch(self.settings.control_mode(), &mut self.hooks);

        CycleOutcome::Completed {
            cycle,
            fault,
            strategy,
        }
    }

    #[inline(always)]
    fn check_fault(&self, status: CompletionStatus) -> bool {
        let fault = self.fault.check(status.out_of_window, &self.state.raw);
        if fault {
            self.state.record_fault();
        }
        fault
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn transfer_mut(&mut self) -> &mut T {
        &mut self.transfer
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}
