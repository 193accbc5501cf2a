//! ADC1 + DMA1によるPWM同期取得
//!
//! PWM（TIM1 TRGO）→ ADC1レギュラーシーケンス（7ランク）→ DMA1 CH1 → ADC1_2割り込み
//! のカスケードで全センサーを1トリガーごとに取得します。
//!
//! ## ハードウェア構成
//! - トリガー: TIM1_TRGO 立ち上がり（EXTSEL=9）、ソフトウェア開始は使わない
//! - ADC1: 12ビット右詰め、DMA循環要求、オーバーラン時は上書き
//! - DMA1 CH1: DMAMUX要求 ADC1、ペリフェラル→メモリ、ハーフワード、ノーマルモード
//! - 割り込み: ADC1のEOS（シーケンス終了）のみ有効。DMA・他のADC割り込みは無効
//! - ウィンドウ外検出: アナログウォッチドッグ1をバス電圧チャネルに設定（フラグのみ）
//!
//! ## 完了判定
//! EOSとDMA転送完了（TCIF）の両方が立っている場合のみ転送完了とみなします。
//! 最終サンプルのDMA転送はEOSから数クロック以内に終わるため、割り込み入口の時点で
//! TCIFは確定しています。
//!
//! ## 再アーム
//! DMAはノーマルモードで、ハンドラーが毎サイクル転送先アドレスと転送数を書き直します。
//! 再アームは次のトリガー（PWM周期 - 変換時間 後）より前に終わる必要があります。

use core::cell::UnsafeCell;

use embassy_stm32::pac;
use embassy_time::{block_for, Duration};

use g4_acquisition::channel::{Sensor, SLOT_COUNT};
use g4_acquisition::config::timing::REGULATOR_STARTUP_US;
use g4_acquisition::config::{
    AcquisitionTiming, TimingBudget, TimingError, ADC_KERNEL_CLOCK_HZ,
    BUS_VOLTAGE_FAULT_SENTINEL, BUS_VOLTAGE_WINDOW_HIGH, BUS_VOLTAGE_WINDOW_LOW,
};
use g4_acquisition::{
    AcquisitionController, CompletionStatus, CycleOutcome, FaultMonitor, SampleBuffer,
    SampleTransfer, SensorReadings, SharedSettings,
};

use crate::config::{
    AnalogInput, Port, ACQUISITION_IRQ_PRIORITY, ADC_SEQUENCE, TRACE_INTERVAL_CYCLES,
};
use crate::control::ControlLoop;
use crate::state::{ACQUISITION, SETTINGS};

/// 使用するDMA1チャネル（CH1 = インデックス0）
const DMA_CHANNEL: usize = 0;

/// DMAMUX要求ID: ADC1
const DMAMUX_REQ_ADC1: u8 = 5;

/// バス電圧のウィンドウ外でセンチネルを書き込む故障監視
const FAULT_MONITOR: FaultMonitor =
    FaultMonitor::new(Sensor::BusVoltage, BUS_VOLTAGE_FAULT_SENTINEL);

/// DMA転送先バッファ（DMAが書き込み、取得割り込みが読み出す）
#[repr(C, align(4))]
struct DmaBuffer(UnsafeCell<SampleBuffer>);

// DMA停止中（完了後〜再アーム前）のみCPUが読み出す
unsafe impl Sync for DmaBuffer {}

static ADC_BUF: DmaBuffer = DmaBuffer(UnsafeCell::new([0; SLOT_COUNT]));

/// ADC1 + DMA1 CH1による転送機構
pub struct DmaTransfer;

impl SampleTransfer for DmaTransfer {
    #[inline(always)]
    fn take_status(&mut self) -> CompletionStatus {
        let adc_isr = pac::ADC1.isr().read();
        let dma_isr = pac::DMA1.isr().read();

        let status = CompletionStatus {
            transfer_complete: adc_isr.eos() && dma_isr.tcif(DMA_CHANNEL),
            out_of_window: adc_isr.awd(0),
        };

        // フラグクリア（1書き込みでクリア）
        pac::ADC1.isr().write(|w| {
            w.set_eos(true);
            w.set_eoc(true);
            w.set_ovr(true);
            w.set_awd(0, true);
        });
        pac::DMA1.ifcr().write(|w| w.set_gif(DMA_CHANNEL, true));

        status
    }

    #[inline(always)]
    fn samples(&self) -> SampleBuffer {
        // DMAはTCで停止済み
        unsafe { core::ptr::read_volatile(ADC_BUF.0.get()) }
    }

    #[inline(always)]
    fn rearm(&mut self, count: usize) {
        let ch = pac::DMA1.ch(DMA_CHANNEL);
        ch.cr().modify(|w| w.set_en(false));
        ch.mar().write_value(ADC_BUF.0.get() as u32);
        ch.ndtr().write(|w| w.set_ndt(count as u16));
        ch.cr().modify(|w| w.set_en(true));
    }
}

/// 割り込みごとに組み立てる取得コントローラ（すべて参照かZST）
#[inline(always)]
fn controller() -> AcquisitionController<'static, DmaTransfer, SharedSettings, ControlLoop> {
    AcquisitionController::new(DmaTransfer, &ACQUISITION, &SETTINGS, ControlLoop, FAULT_MONITOR)
}

/// ADC1_2割り込みハンドラー本体
///
/// # Safety
/// 割り込みコンテキストで実行されるため、処理は最小限にする
#[inline(always)]
pub unsafe fn adc_irq_handler() {
    let outcome = controller().on_completion();

    if let CycleOutcome::Completed { cycle, fault, strategy } = outcome {
        if cycle % TRACE_INTERVAL_CYCLES == 0 {
            trace!(
                "[ADC ISR] cycle={}, fault={}, strategy={}",
                cycle,
                fault,
                strategy
            );
        }
    }
}

/// ADC1_2割り込みのRust側エントリーポイント
#[allow(non_snake_case)]
#[no_mangle]
pub unsafe extern "C" fn ADC1_2() {
    adc_irq_handler();
}

/// 入力ピンをアナログモードに設定
unsafe fn set_analog(input: &AnalogInput) {
    let gpio = match input.port {
        Port::A => pac::GPIOA,
        Port::B => pac::GPIOB,
        Port::C => pac::GPIOC,
    };
    gpio.moder()
        .modify(|w| w.set_moder(input.pin, pac::gpio::vals::Moder::ANALOG));
    gpio.pupdr()
        .modify(|w| w.set_pupdr(input.pin, pac::gpio::vals::Pupdr::FLOATING));
}

/// ランク（1始まり）にチャネルを割り当て
unsafe fn set_sequence_rank(rank: usize, channel: u8) {
    let adc = pac::ADC1;
    match rank {
        1..=4 => adc.sqr1().modify(|w| w.set_sq(rank - 1, channel)),
        5..=9 => adc.sqr2().modify(|w| w.set_sq(rank - 5, channel)),
        10..=14 => adc.sqr3().modify(|w| w.set_sq(rank - 10, channel)),
        _ => adc.sqr4().modify(|w| w.set_sq(rank - 15, channel)),
    }
}

/// チャネルのサンプリング（トラッキング）時間を設定
unsafe fn set_sample_time(channel: u8, bits: u8) {
    let adc = pac::ADC1;
    let sample_time = pac::adc::vals::SampleTime::from_bits(bits);
    if channel <= 9 {
        adc.smpr().modify(|w| w.set_smp(channel as usize, sample_time));
    } else {
        adc.smpr2()
            .modify(|w| w.set_smp(channel as usize - 10, sample_time));
    }
}

/// ADC1・DMA1・DMAMUXを初期化し、最初の転送をアームする
///
/// タイミング予算を検証してからレジスタを設定します。予算外の設定では
/// 何も書き込まずにエラーを返します。
///
/// # Safety
/// PACを使用した直接レジスタ操作を含む。ADC1とDMA1 CH1は他で使用しないこと
pub unsafe fn init_acquisition(
    timing: &AcquisitionTiming,
    trigger_hz: u32,
) -> Result<TimingBudget, TimingError> {
    let budget = timing.budget(ADC_KERNEL_CLOCK_HZ, trigger_hz)?;

    let rcc = pac::RCC;
    let adc = pac::ADC1;
    let dma = pac::DMA1;

    info!("Initializing ADC1 + DMA1 acquisition...");

    // 1. クロック有効化
    rcc.ahb1enr().modify(|w| {
        w.set_dma1en(true);
        w.set_dmamux1en(true);
    });
    rcc.ahb2enr().modify(|w| {
        w.set_gpioaen(true);
        w.set_gpioben(true);
        w.set_gpiocen(true);
        w.set_adc12en(true);
    });

    // 2. アナログ入力ピン
    for input in ADC_SEQUENCE.iter() {
        set_analog(input);
    }

    // 3. ADCクロック（非同期カーネルクロック ÷ PRESC）
    pac::ADC12_COMMON.ccr().modify(|w| {
        w.set_ckmode(pac::adccommon::vals::Ckmode::ASYNCHRONOUS);
        w.set_presc(pac::adccommon::vals::Presc::from_bits(timing.prescaler.bits()));
    });

    // 4. 電圧レギュレータ起動（スタートアップ時間は初期化時の1回のみ）
    adc.cr().modify(|w| {
        w.set_deeppwd(false);
        w.set_advregen(true);
    });
    block_for(Duration::from_micros(REGULATOR_STARTUP_US as u64));

    // 5. シングルエンド校正
    adc.cr().modify(|w| {
        w.set_adcaldif(pac::adc::vals::Adcaldif::SINGLE_ENDED);
        w.set_adcal(true);
    });
    while adc.cr().read().adcal() {}

    // 6. 有効化
    adc.isr().write(|w| w.set_adrdy(true));
    adc.cr().modify(|w| w.set_aden(true));
    while !adc.isr().read().adrdy() {}
    adc.isr().write(|w| w.set_adrdy(true));

    // 7. 変換設定: 外部トリガー、DMA循環要求、上書き、12ビット右詰め
    adc.cfgr().modify(|w| {
        w.set_exten(pac::adc::vals::Exten::from_bits(timing.edge.exten()));
        w.set_extsel(timing.trigger.extsel());
        w.set_cont(false);
        w.set_dmaen(true);
        w.set_dmacfg(pac::adc::vals::Dmacfg::CIRCULAR);
        w.set_ovrmod(pac::adc::vals::Ovrmod::OVERWRITE);
        w.set_res(pac::adc::vals::Res::BITS12);
        w.set_align(false);
    });

    // 8. シーケンス（有効チャネルは固定）
    for (slot, input) in ADC_SEQUENCE.iter().enumerate() {
        set_sequence_rank(slot + 1, input.channel);
        set_sample_time(input.channel, timing.sample_time.bits());
    }
    adc.sqr1().modify(|w| w.set_l((SLOT_COUNT - 1) as u8));

    // 9. アナログウォッチドッグ1: バス電圧チャネルのみ監視（割り込みは使わない）
    // 電流1用のAWD2は使用しない
    let bus_channel = ADC_SEQUENCE[g4_acquisition::channel::slot_of(Sensor::BusVoltage)].channel;
    adc.tr1().modify(|w| {
        w.set_lt1(BUS_VOLTAGE_WINDOW_LOW);
        w.set_ht1(BUS_VOLTAGE_WINDOW_HIGH);
    });
    adc.cfgr().modify(|w| {
        w.set_awd1ch(bus_channel);
        w.set_awd1sgl(true);
        w.set_awd1en(true);
    });

    // 10. 割り込み: EOSのみ有効
    adc.ier().write(|w| w.set_eosie(true));

    // 11. DMAMUX: CH1 ← ADC1
    pac::DMAMUX1
        .ccr(DMA_CHANNEL)
        .write(|w| w.set_dmareq_id(DMAMUX_REQ_ADC1));

    // 12. DMA1 CH1: ペリフェラル→メモリ、ハーフワード、割り込みなし
    let ch = dma.ch(DMA_CHANNEL);
    ch.cr().write(|w| {
        w.set_dir(pac::bdma::vals::Dir::FROM_PERIPHERAL);
        w.set_psize(pac::bdma::vals::Size::BITS16);
        w.set_msize(pac::bdma::vals::Size::BITS16);
        w.set_pinc(false);
        w.set_minc(true);
        w.set_circ(false);
        w.set_pl(pac::bdma::vals::Pl::VERY_HIGH);
        w.set_tcie(false);
        w.set_htie(false);
        w.set_teie(false);
        w.set_en(false);
    });
    ch.par().write_value(adc.dr().as_ptr() as u32);
    dma.ifcr().write(|w| w.set_gif(DMA_CHANNEL, true));

    // 13. 最初のアーム（転送先と転送数）
    controller().arm();

    // 14. NVIC（Embassyタスクより高優先度）
    let mut cp = cortex_m::Peripherals::steal();
    cp.NVIC
        .set_priority(pac::Interrupt::ADC1_2, ACQUISITION_IRQ_PRIORITY);
    cortex_m::peripheral::NVIC::unmask(pac::Interrupt::ADC1_2);

    // 15. 変換開始待ち（以降はTIM1 TRGOで変換が始まる）
    adc.cr().modify(|w| w.set_adstart(true));

    info!(
        "ADC1 acquisition armed: {} channels, ADC clock {}Hz, sequence {}ns, spacing {}ns",
        SLOT_COUNT,
        budget.adc_clock_hz,
        budget.sequence_ns,
        budget.channel_spacing_ns
    );
    info!(
        "Real-time budget: re-arm within {}ns, handler within {}ns (trigger period {}ns)",
        budget.rearm_deadline_ns,
        budget.handler_budget_ns,
        budget.trigger_period_ns
    );

    Ok(budget)
}

/// 現在のセンサー値ビュー
pub fn readings() -> SensorReadings<'static, SharedSettings> {
    SensorReadings::new(&ACQUISITION.raw, &SETTINGS)
}

/// 完了した取得サイクル数
#[inline(always)]
pub fn get_cycle_count() -> u32 {
    ACQUISITION.cycles.get()
}
