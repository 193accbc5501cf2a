//! LED表示タスク
//!
//! 取得サイクルが進んでいる間だけLED1を点滅させ、停止中はLED2を点灯します。
//! LED3は一度でも停止を検出すると点灯したままになります。

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Ticker};

use crate::adc;
use crate::config::monitor::LED_PERIOD_MS;

/// LED点滅タスク
#[embassy_executor::task]
pub async fn led_task(
    mut led1: Output<'static>,
    mut led2: Output<'static>,
    mut led3: Output<'static>,
) {
    let mut ticker = Ticker::every(Duration::from_millis(LED_PERIOD_MS));
    let mut last_cycle = adc::get_cycle_count();

    // LEDはアクティブロー
    led1.set_high();
    led2.set_high();
    led3.set_high();

    loop {
        ticker.next().await;

        let cycle = adc::get_cycle_count();
        if cycle != last_cycle {
            led1.toggle();
            led2.set_high();
        } else {
            led1.set_high();
            led2.set_low();
            led3.set_low();
        }
        last_cycle = cycle;
    }
}
