//! センサー監視タスク
//!
//! 校正済みのセンサー値と取得診断を周期的にログ出力します。
//! 取得の停止とバス電圧の故障センチネルを警告します。

use embassy_time::{Duration, Ticker};

use g4_acquisition::channel::Sensor;
use g4_acquisition::config::BUS_VOLTAGE_FAULT_SENTINEL;
use g4_acquisition::Settings;

use crate::adc;
use crate::config::monitor::LOG_PERIOD_MS;
use crate::control;
use crate::state::{ACQUISITION, SETTINGS};

/// センサー監視タスク
#[embassy_executor::task]
pub async fn sensor_monitor_task() {
    info!("Sensor monitor task started");

    let mut ticker = Ticker::every(Duration::from_millis(LOG_PERIOD_MS));
    let mut last = ACQUISITION.diagnostics();

    loop {
        ticker.next().await;

        let diag = ACQUISITION.diagnostics();
        let readings = adc::readings();

        if diag.cycles == last.cycles {
            warn!("Acquisition stalled at cycle {}", diag.cycles);
        }

        if readings.raw(Sensor::BusVoltage).value() == BUS_VOLTAGE_FAULT_SENTINEL {
            warn!(
                "Bus voltage out of window (faults={})",
                diag.fault_substitutions
            );
        }

        let spurious = diag.spurious_events.wrapping_sub(last.spurious_events);
        if spurious > 0 {
            warn!("{} spurious acquisition events in last period", spurious);
        }

        info!(
            "Vbus={} I1={} I2={} Tinv1={} Tinv2={} Tmot1={} Tmot2={}",
            readings.bus_voltage(),
            readings.current1(),
            readings.current2(),
            readings.inverter_temp1(),
            readings.inverter_temp2(),
            readings.motor_temp1(),
            readings.motor_temp2()
        );

        let (vhz, foc) = control::update_counts();
        debug!(
            "cycles={} (+{}), mode={}, vhz={}, foc={}",
            diag.cycles,
            diag.cycles.wrapping_sub(last.cycles),
            SETTINGS.control_mode(),
            vhz,
            foc
        );

        last = diag;
    }
}
