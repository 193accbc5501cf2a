// Dispatch hook: hands each completed sample set to one control-update routine

/// Mode flag value selecting the V/Hz update
pub const CONTROL_MODE_VHZ: u8 = 0;

/// Mode flag value selecting the FOC update
pub const CONTROL_MODE_FOC: u8 = 1;

/// Any mode flag outside {0, 1} runs acquisition only
pub const CONTROL_MODE_NONE: u8 = 0xFF;

/// Control-law collaborators
///
/// Both entry points run inside the acquisition interrupt and must return
/// before the next completion event (one trigger period).
pub trait ControlHooks {
    /// Volts-per-hertz update
    fn update_vhz(&mut self);

    /// Field oriented control update
    fn update_foc(&mut self);
}

/// Strategy selected by the control mode flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlStrategy {
    /// Open-loop V/Hz
    VoltsPerHertz,
    /// Closed-loop FOC
    FieldOriented,
    /// No control update, sample only
    AcquisitionOnly,
}

impl ControlStrategy {
    pub const fn from_mode(mode: u8) -> Self {
        match mode {
            CONTROL_MODE_VHZ => ControlStrategy::VoltsPerHertz,
            CONTROL_MODE_FOC => ControlStrategy::FieldOriented,
            _ => ControlStrategy::AcquisitionOnly,
        }
    }

    /// Invoke the selected hook (at most one call)
    #[inline(always)]
    pub fn run<H: ControlHooks>(self, hooks: &mut H) {
        match self {
            ControlStrategy::VoltsPerHertz => hooks.update_vhz(),
            ControlStrategy::FieldOriented => hooks.update_foc(),
            ControlStrategy::AcquisitionOnly => {}
        }
    }
}

/// Read the mode flag once and run the matching hook
#[inline(always)]
pub fn dispatch<H: ControlHooks>(mode: u8, hooks: &mut H) -> ControlStrategy {
    let strategy = ControlStrategy::from_mode(mode);
    strategy.run(hooks);
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHooks {
        vhz: u32,
        foc: u32,
    }

    impl ControlHooks for CountingHooks {
        fn update_vhz(&mut self) {
            self.vhz += 1;
        }

        fn update_foc(&mut self) {
            self.foc += 1;
        }
    }

    #[test]
    fn test_mode_mapping() {
        assert_eq!(ControlStrategy::from_mode(0), ControlStrategy::VoltsPerHertz);
        assert_eq!(ControlStrategy::from_mode(1), ControlStrategy::FieldOriented);
        assert_eq!(ControlStrategy::from_mode(2), ControlStrategy::AcquisitionOnly);
        assert_eq!(ControlStrategy::from_mode(0xFF), ControlStrategy::AcquisitionOnly);
    }

    #[test]
    fn test_vhz_only() {
        let mut hooks = CountingHooks::default();
        dispatch(CONTROL_MODE_VHZ, &mut hooks);
        assert_eq!((hooks.vhz, hooks.foc), (1, 0));
    }

    #[test]
    fn test_foc_only() {
        let mut hooks = CountingHooks::default();
        dispatch(CONTROL_MODE_FOC, &mut hooks);
        assert_eq!((hooks.vhz, hooks.foc), (0, 1));
    }

    #[test]
    fn test_other_modes_run_nothing() {
        let mut hooks = CountingHooks::default();
        for mode in 2..=u8::MAX {
            dispatch(mode, &mut hooks);
        }
        assert_eq!((hooks.vhz, hooks.foc), (0, 0));
    }
}
