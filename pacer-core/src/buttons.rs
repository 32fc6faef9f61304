//! Edge-triggered button actions, run from interrupt context

use crate::hal::{self, OutputLine};
use crate::state::SystemState;
use crate::types::{Button, PacerConfig};

/// What a falling edge did
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    /// Alert cleared; carries the new telemetry flag
    Silenced { telemetry_enabled: bool },
    PoweredOn,
    /// Alert cleared and every output forced low
    PoweredOff,
    /// Edge from a pin that is not a button
    Ignored,
}

/// Outputs the power button forces low on shutdown
pub struct ForcedOutputs<'a, R, A, I> {
    pub rhythm: &'a R,
    pub alert: &'a A,
    pub indicator: &'a I,
}

/// Button edge dispatcher.
///
/// Only single-flag atomic updates and single line writes; safe to call
/// from an interrupt handler. Never emits a pulse.
pub struct ButtonHandler<'a, R, A, I> {
    config: PacerConfig,
    state: &'a SystemState,
    outputs: ForcedOutputs<'a, R, A, I>,
}

impl<'a, R, A, I> ButtonHandler<'a, R, A, I>
where
    R: OutputLine,
    A: OutputLine,
    I: OutputLine,
{
    pub fn new(config: &PacerConfig, state: &'a SystemState, outputs: ForcedOutputs<'a, R, A, I>) -> Self {
        Self {
            config: *config,
            state,
            outputs,
        }
    }

    /// Falling edge on `pin`
    pub fn on_falling_edge(&self, pin: u8) -> ButtonAction {
        match self.config.button_for_pin(pin) {
            Some(button) => self.on_press(button),
            None => ButtonAction::Ignored,
        }
    }

    pub fn on_press(&self, button: Button) -> ButtonAction {
        match button {
            Button::Silence => self.silence(),
            Button::Power => self.toggle_power(),
        }
    }

    fn silence(&self) -> ButtonAction {
        self.state.clear_medication_due();
        let telemetry_enabled = self.state.toggle_telemetry();

        #[cfg(feature = "defmt")]
        defmt::info!("medication alert silenced, telemetry {}", if telemetry_enabled { "on" } else { "off" });

        ButtonAction::Silenced { telemetry_enabled }
    }

    fn toggle_power(&self) -> ButtonAction {
        if self.state.toggle_power() {
            #[cfg(feature = "defmt")]
            defmt::info!("system powered on");
            return ButtonAction::PoweredOn;
        }

        self.state.clear_medication_due();
        hal::force_low(self.outputs.rhythm);
        hal::force_low(self.outputs.alert);
        hal::force_low(self.outputs.indicator);

        #[cfg(feature = "defmt")]
        defmt::info!("system powered off");

        ButtonAction::PoweredOff
    }
}
