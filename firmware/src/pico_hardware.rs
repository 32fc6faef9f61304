//! Raspberry Pi Pico W hardware wiring
//!
//! Buzzers and LED are push-pull outputs starting low; buttons are
//! active-low inputs with pull-ups.

use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{PIN_10, PIN_13, PIN_21, PIN_5, PIN_6};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Delay;
use static_cell::StaticCell;

use pacer_core::{AlertLoop, ButtonHandler, MedicationSignal, PacerConfig, RhythmTickSource, SharedOutput};

/// Output line shared between the tick, alert and button contexts
pub type Line = SharedOutput<Output<'static>>;

pub type Signal = MedicationSignal<CriticalSectionRawMutex>;
pub type Rhythm = RhythmTickSource<'static, Line, Delay, CriticalSectionRawMutex>;
pub type Alert = AlertLoop<'static, Line, Line, Delay, CriticalSectionRawMutex>;
pub type Buttons = ButtonHandler<'static, Line, Line, Line>;

/// GPIO numbers of the Pico W board, matching [`PacerConfig::DEFAULT`]
pub mod pins {
    /// Compression cue buzzer
    pub const RHYTHM_PIN: u8 = 10;

    /// Medication alert buzzer
    pub const ALERT_PIN: u8 = 21;

    /// Medication LED
    pub const INDICATOR_PIN: u8 = 13;

    /// Silence button
    pub const SILENCE_PIN: u8 = 6;

    /// Power button
    pub const POWER_PIN: u8 = 5;
}

const _: () = {
    let map = PacerConfig::DEFAULT.pins;
    assert!(map.rhythm == pins::RHYTHM_PIN);
    assert!(map.alert == pins::ALERT_PIN);
    assert!(map.indicator == pins::INDICATOR_PIN);
    assert!(map.silence == pins::SILENCE_PIN);
    assert!(map.power == pins::POWER_PIN);
};

/// Pins needed by the pacer
pub struct PacerPins {
    pub rhythm: PIN_10,
    pub alert: PIN_21,
    pub indicator: PIN_13,
    pub silence: PIN_6,
    pub power: PIN_5,
}

/// Configured hardware; outputs are `'static` so every context can hold them
pub struct PicoBoard {
    pub rhythm: &'static Line,
    pub alert: &'static Line,
    pub indicator: &'static Line,
    pub silence: Input<'static>,
    pub power: Input<'static>,
}

static RHYTHM_LINE: StaticCell<Line> = StaticCell::new();
static ALERT_LINE: StaticCell<Line> = StaticCell::new();
static INDICATOR_LINE: StaticCell<Line> = StaticCell::new();

impl PicoBoard {
    /// Configure the pins. Call once.
    pub fn init(p: PacerPins) -> Self {
        let rhythm: &'static Line = RHYTHM_LINE.init(SharedOutput::new(Output::new(p.rhythm, Level::Low)));
        let alert: &'static Line = ALERT_LINE.init(SharedOutput::new(Output::new(p.alert, Level::Low)));
        let indicator: &'static Line = INDICATOR_LINE.init(SharedOutput::new(Output::new(p.indicator, Level::Low)));

        defmt::info!(
            "pins: rhythm={} alert={} led={} silence={} power={}",
            pins::RHYTHM_PIN,
            pins::ALERT_PIN,
            pins::INDICATOR_PIN,
            pins::SILENCE_PIN,
            pins::POWER_PIN
        );

        Self {
            rhythm,
            alert,
            indicator,
            silence: Input::new(p.silence, Pull::Up),
            power: Input::new(p.power, Pull::Up),
        }
    }
}
