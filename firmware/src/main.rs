#![no_std]
#![no_main]

mod fmt;

mod adc;
mod config;
mod control;
mod hardware;
mod state;
mod tasks;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    opamp::{OpAmp, OpAmpGain, OpAmpSpeed},
    timer::{
        complementary_pwm::{ComplementaryPwm, ComplementaryPwmPin},
        low_level::CountingMode,
        simple_pwm::PwmPin,
        Channel,
    },
};
use embassy_time::{Duration, Timer};

use g4_acquisition::config::{DEFAULT_TIMING, DEFAULT_TRIGGER_HZ};
use g4_acquisition::Settings;

use tasks::{led_task, sensor_monitor_task};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // ハードウェア初期化
    let config = hardware::create_clock_config();
    let p = embassy_stm32::init(config);

    info!("═══════════════════════════════════════════════════════════════════");
    info!("");
    info!("        G4 Acquisition • PWM-synchronous ADC • STM32G431VB @ 170MHz");
    info!("");
    info!("═══════════════════════════════════════════════════════════════════");

    // LED初期化＆タスク起動
    let led1 = Output::new(p.PC13, Level::High, Speed::Low);
    let led2 = Output::new(p.PC14, Level::High, Speed::Low);
    let led3 = Output::new(p.PC15, Level::High, Speed::Low);
    spawner.spawn(led_task(led1, led2, led3)).unwrap();

    // OPAMP初期化（電流センスアンプ、出力をADC1へ）
    // 電流1: OPAMP1 PGA（PA1入力 → PA2出力、×4）
    let mut op1 = OpAmp::new(p.OPAMP1, OpAmpSpeed::HighSpeed);
    let _op1_out = op1.pga_ext(p.PA1, p.PA2, OpAmpGain::Mul4);
    // 電流2: OPAMP3 外部帰還（PB0+ / PB2- → PB1出力）
    let mut op3 = OpAmp::new(p.OPAMP3, OpAmpSpeed::Normal);
    let _op3_out = op3.standalone_ext(p.PB0, p.PB2, p.PB1);

    // PWM初期化（TIM1、3相補完PWM、センターアライン）
    // 出力は制御則が有効化するまで無効。カウンタのみ走らせてトリガー源とする
    let mut uvw_pwm = ComplementaryPwm::new(
        p.TIM1,
        Some(PwmPin::new(
            p.PE9,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE8,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE11,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE10,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE13,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE12,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        None,
        None,
        config::pwm::DEFAULT_FREQUENCY,
        CountingMode::CenterAlignedBothInterrupts,
    );
    uvw_pwm.disable(Channel::Ch1);
    uvw_pwm.disable(Channel::Ch2);
    uvw_pwm.disable(Channel::Ch3);
    uvw_pwm.set_dead_time(config::pwm::DEFAULT_DEAD_TIME);

    // TIM1 TRGO（更新イベント）をADCトリガーとして出力
    unsafe {
        hardware::init_pwm_trigger();
    }

    // ADC1 + DMA1 取得パイプライン初期化
    match unsafe { adc::init_acquisition(&DEFAULT_TIMING, DEFAULT_TRIGGER_HZ) } {
        Ok(budget) => {
            info!(
                "Acquisition started: {}Hz trigger, sequence {}ns of {}ns period",
                DEFAULT_TRIGGER_HZ,
                budget.sequence_ns,
                budget.trigger_period_ns
            );
        }
        Err(e) => {
            error!("Acquisition timing rejected: {}", e);
        }
    }

    info!(
        "Control mode: {}",
        state::SETTINGS.control_mode()
    );

    spawner.spawn(sensor_monitor_task()).unwrap();

    // PWMはタスク終了まで保持（dropでTIM1が停止しないよう）
    let _pwm = uvw_pwm;

    // メインループ（将来の拡張用）
    loop {
        Timer::after(Duration::from_millis(100)).await;
    }
}
