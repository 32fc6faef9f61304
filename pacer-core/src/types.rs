//! Core data types for the CPR pacer

use core::num::NonZeroU32;

/// Audible tone frequency, never zero
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone(NonZeroU32);

impl Tone {
    /// Returns `None` for a zero frequency
    pub const fn from_hz(hz: u32) -> Option<Self> {
        match NonZeroU32::new(hz) {
            Some(hz) => Some(Self(hz)),
            None => None,
        }
    }

    pub const fn hz(&self) -> u32 {
        self.0.get()
    }

    /// Delay between line toggles, in microseconds
    pub const fn half_period_us(&self) -> u32 {
        500_000 / self.0.get()
    }

    /// Full square wave period, in microseconds
    pub const fn period_us(&self) -> u32 {
        1_000_000 / self.0.get()
    }

    // Only for the build-time defaults below
    const fn known(hz: u32) -> Self {
        match Self::from_hz(hz) {
            Some(tone) => tone,
            None => panic!("tone frequency must be non-zero"),
        }
    }
}

/// Physical buttons on the device
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Clears the medication reminder and toggles telemetry
    Silence,
    /// Starts or stops the whole device
    Power,
}

/// Configuration validation errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A tone frequency of zero was given
    ZeroFrequency,
    /// Compressions per minute outside 1..=240
    InvalidRate,
    /// Medication interval of zero
    InvalidInterval,
    /// Rhythm cue as long as or longer than one tick
    PulseExceedsPeriod,
    /// Alert pulse of zero length
    InvalidAlertPulse,
    /// Two functions assigned to the same GPIO
    PinConflict,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroFrequency => write!(f, "Tone frequency must be non-zero"),
            ConfigError::InvalidRate => write!(f, "Compressions per minute must be between 1 and 240"),
            ConfigError::InvalidInterval => write!(f, "Medication interval must be non-zero"),
            ConfigError::PulseExceedsPeriod => write!(f, "Rhythm pulse must be shorter than the tick period"),
            ConfigError::InvalidAlertPulse => write!(f, "Alert pulse must be non-zero"),
            ConfigError::PinConflict => write!(f, "Each function needs its own pin"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// GPIO assignment
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    /// Buzzer for the compression cue
    pub rhythm: u8,
    /// Buzzer for the medication alert
    pub alert: u8,
    /// Medication LED
    pub indicator: u8,
    /// Silence button (active low)
    pub silence: u8,
    /// Power button (active low)
    pub power: u8,
}

impl PinMap {
    fn has_conflict(&self) -> bool {
        let pins = [self.rhythm, self.alert, self.indicator, self.silence, self.power];
        pins.iter()
            .enumerate()
            .any(|(i, pin)| pins[i + 1..].contains(pin))
    }
}

/// Pacer configuration, fixed at build time and shared by every component
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacerConfig {
    pub pins: PinMap,
    /// Compression cue tone
    pub rhythm_tone: Tone,
    /// Medication alert tone
    pub alert_tone: Tone,
    pub compressions_per_minute: u32,
    /// Time between medication reminders
    pub medication_interval_ms: u32,
    /// Length of each compression cue
    pub rhythm_pulse_ms: u32,
    /// Length of each alert beep
    pub alert_pulse_ms: u32,
    /// Silence between alert beeps
    pub alert_gap_ms: u32,
    /// Level stability required before a press or release counts
    pub press_settle_ms: u64,
    /// Cadence of telemetry reports
    pub telemetry_period_ms: u32,
}

impl PacerConfig {
    /// Stock Pico W board: 110 cpm, reminder every 30 s
    pub const DEFAULT: PacerConfig = PacerConfig {
        pins: PinMap {
            rhythm: 10,
            alert: 21,
            indicator: 13,
            silence: 6,
            power: 5,
        },
        rhythm_tone: Tone::known(500),
        alert_tone: Tone::known(440),
        compressions_per_minute: 110,
        medication_interval_ms: 30_000,
        rhythm_pulse_ms: 100,
        alert_pulse_ms: 500,
        alert_gap_ms: 500,
        press_settle_ms: 10,
        telemetry_period_ms: 90_000,
    };

    /// Create a new configuration with validation
    ///
    /// Alert cadence, press settle time and telemetry period keep their
    /// defaults; adjust the fields afterwards if needed.
    pub fn new(
        pins: PinMap,
        rhythm_hz: u32,
        alert_hz: u32,
        compressions_per_minute: u32,
        medication_interval_ms: u32,
        rhythm_pulse_ms: u32,
    ) -> Result<Self, ConfigError> {
        let rhythm_tone = Tone::from_hz(rhythm_hz).ok_or(ConfigError::ZeroFrequency)?;
        let alert_tone = Tone::from_hz(alert_hz).ok_or(ConfigError::ZeroFrequency)?;

        let config = Self {
            pins,
            rhythm_tone,
            alert_tone,
            compressions_per_minute,
            medication_interval_ms,
            rhythm_pulse_ms,
            ..Self::DEFAULT
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants that `new` enforces
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compressions_per_minute == 0 || self.compressions_per_minute > 240 {
            return Err(ConfigError::InvalidRate);
        }
        if self.medication_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.rhythm_pulse_ms >= self.tick_period_ms() {
            return Err(ConfigError::PulseExceedsPeriod);
        }
        if self.alert_pulse_ms == 0 {
            return Err(ConfigError::InvalidAlertPulse);
        }
        if self.pins.has_conflict() {
            return Err(ConfigError::PinConflict);
        }
        Ok(())
    }

    /// Time between compression cues
    pub const fn tick_period_ms(&self) -> u32 {
        60_000 / self.compressions_per_minute
    }

    /// Ticks between medication reminders, rounded up
    pub const fn medication_threshold(&self) -> u32 {
        let period = self.tick_period_ms();
        let ticks = self.medication_interval_ms.div_ceil(period);
        if ticks == 0 {
            1
        } else {
            ticks
        }
    }

    /// Map an interrupting GPIO to its button
    pub const fn button_for_pin(&self, pin: u8) -> Option<Button> {
        if pin == self.pins.silence {
            Some(Button::Silence)
        } else if pin == self.pins.power {
            Some(Button::Power)
        } else {
            None
        }
    }
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
