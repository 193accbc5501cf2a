//! ハードウェア初期化モジュール
//!
//! クロックツリーとPWMトリガー出力の初期化ロジックを集約します。

use embassy_stm32::{pac, Config};

/// RCCクロック設定を初期化
///
/// HSI → PLL（÷4 × 85 ÷ 2）で170MHz生成、ADC12カーネルクロック = SYSCLK
pub fn create_clock_config() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::mux::{Adcsel, ClockMux};
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};

        config.rcc.hsi = true;
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R; // システムクロックをPLLに設定

        let mut clock_mux = ClockMux::default();
        clock_mux.adc12sel = Adcsel::SYS;
        config.rcc.mux = clock_mux;
    }
    config
}

/// TIM1の更新イベントをTRGOへ出力
///
/// センターアラインモードでRCR=1とすると、更新イベントはPWM1周期に1回、
/// カウンタの谷（ローサイド導通区間の中点）で発生します。
///
/// # Safety
/// PACを使用した直接レジスタ操作を含む。TIM1はComplementaryPwmで初期化済みであること
pub unsafe fn init_pwm_trigger() {
    let tim1 = pac::TIM1;

    tim1.rcr().modify(|w| w.set_rep(1));
    tim1.cr2().modify(|w| w.set_mms(pac::timer::vals::Mms::UPDATE));

    // RCRを即時反映（カウンタはリセットされる）
    tim1.egr().write(|w| w.set_ug(true));
}
