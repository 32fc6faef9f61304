//! Interval arithmetic and tick counting across configurations

use proptest::prelude::*;
use rstest::rstest;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use pacer_core::hal::mock::{MockDelay, MockLine};
use pacer_core::*;

fn config(cpm: u32, interval_ms: u32) -> PacerConfig {
    PacerConfig {
        compressions_per_minute: cpm,
        medication_interval_ms: interval_ms,
        rhythm_pulse_ms: 10,
        ..PacerConfig::DEFAULT
    }
}

#[rstest]
#[case::stock(110, 30_000, 545, 56)]
#[case::exact(100, 30_000, 600, 50)]
#[case::slow(60, 30_000, 1_000, 30)]
#[case::guideline_upper(120, 30_000, 500, 60)]
#[case::fastest(240, 1_000, 250, 4)]
#[case::interval_shorter_than_tick(1, 30_000, 60_000, 1)]
#[case::tiny_interval(110, 100, 545, 1)]
#[case::two_minutes(110, 120_000, 545, 221)]
fn test_threshold_table(#[case] cpm: u32, #[case] interval_ms: u32, #[case] period_ms: u32, #[case] threshold: u32) {
    let config = config(cpm, interval_ms);
    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.tick_period_ms(), period_ms);
    assert_eq!(config.medication_threshold(), threshold);
}

#[rstest]
#[case::zero_rate(0, 30_000, 10, ConfigError::InvalidRate)]
#[case::rate_too_high(241, 30_000, 10, ConfigError::InvalidRate)]
#[case::zero_interval(110, 0, 10, ConfigError::InvalidInterval)]
#[case::pulse_fills_tick(110, 30_000, 545, ConfigError::PulseExceedsPeriod)]
fn test_rejected_configs(#[case] cpm: u32, #[case] interval_ms: u32, #[case] pulse_ms: u32, #[case] error: ConfigError) {
    let result = PacerConfig::new(PacerConfig::DEFAULT.pins, 500, 440, cpm, interval_ms, pulse_ms);
    assert_eq!(result, Err(error));
}

#[rstest]
#[case::rhythm(0, 440)]
#[case::alert(500, 0)]
fn test_zero_tone_rejected(#[case] rhythm_hz: u32, #[case] alert_hz: u32) {
    let result = PacerConfig::new(PacerConfig::DEFAULT.pins, rhythm_hz, alert_hz, 110, 30_000, 100);
    assert_eq!(result, Err(ConfigError::ZeroFrequency));
}

#[test]
fn test_shared_pin_rejected() {
    let mut pins = PacerConfig::DEFAULT.pins;
    pins.indicator = pins.rhythm;
    let result = PacerConfig::new(pins, 500, 440, 110, 30_000, 100);
    assert_eq!(result, Err(ConfigError::PinConflict));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_threshold_covers_interval(cpm in 1u32..=240, interval_ms in 1u32..=600_000) {
        let config = config(cpm, interval_ms);
        let threshold = config.medication_threshold();
        let period = config.tick_period_ms();

        prop_assert!(threshold >= 1);
        // Smallest tick count whose elapsed time reaches the interval
        prop_assert!(u64::from(threshold) * u64::from(period) >= u64::from(interval_ms));
        prop_assert!(u64::from(threshold - 1) * u64::from(period) < u64::from(interval_ms));
    }

    #[test]
    fn prop_reminders_every_threshold_ticks(ticks in 0u32..400, interval_ms in 1_000u32..20_000) {
        let config = config(110, interval_ms);
        let state = SystemState::new();
        let signal: MedicationSignal<CriticalSectionRawMutex> = MedicationSignal::new();
        let line = MockLine::new();
        let mut rhythm = RhythmTickSource::new(&config, &state, &signal, &line, PulseEmitter::new(MockDelay::new()));
        let threshold = rhythm.threshold();

        state.toggle_power();
        let reminders = (0..ticks)
            .map(|_| rhythm.on_tick())
            .filter(|o| matches!(o, TickOutcome::MedicationDue { .. }))
            .count() as u32;

        prop_assert_eq!(reminders, ticks / threshold);
        prop_assert_eq!(state.tick_count(), ticks % threshold);
        prop_assert_eq!(state.medication_due(), reminders > 0);
        prop_assert_eq!(signal.is_pending(), reminders > 0);
        // 10 ms at 500 Hz is five cycles per tick
        prop_assert_eq!(line.rising_edges(), ticks * 5);
        prop_assert!(!line.is_high());
    }

    #[test]
    fn prop_power_off_freezes_count(before in 0u32..55, idle in 1u32..50) {
        let config = PacerConfig::DEFAULT;
        let state = SystemState::new();
        let signal: MedicationSignal<CriticalSectionRawMutex> = MedicationSignal::new();
        let line = MockLine::new();
        let mut rhythm = RhythmTickSource::new(&config, &state, &signal, &line, PulseEmitter::new(MockDelay::new()));

        state.toggle_power();
        for _ in 0..before {
            rhythm.on_tick();
        }
        state.toggle_power();
        let edges = line.rising_edges();
        for _ in 0..idle {
            prop_assert_eq!(rhythm.on_tick(), TickOutcome::Idle);
        }

        prop_assert_eq!(state.tick_count(), before);
        prop_assert_eq!(line.rising_edges(), edges);
    }
}
