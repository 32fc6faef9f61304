//! End-to-end device scenarios: ticks, reminders, buttons

use pacer_core::test_utils::delays::HookedGap;
use pacer_core::*;

use crate::rig::Rig;

#[test]
fn test_powered_off_device_stays_silent() {
    println!("🔌 Powered off: ticks do nothing");
    let rig = Rig::stock();
    let mut rhythm = rig.rhythm();

    let outcomes = rig.run_ticks(&mut rhythm, 200);

    assert!(outcomes.iter().all(|o| *o == TickOutcome::Idle));
    assert!(rig.rhythm_line.transitions().is_empty());
    assert_eq!(rig.state.tick_count(), 0);
    assert!(!rig.state.medication_due());
    assert!(!rig.signal.is_pending());
}

#[test]
fn test_reminder_after_fifty_six_compressions() {
    println!("💓 110 cpm: reminder on the 56th compression");
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut rhythm = rig.rhythm();
    assert_eq!(rhythm.threshold(), 56);

    assert_eq!(buttons.on_press(Button::Power), ButtonAction::PoweredOn);

    let outcomes = rig.run_ticks(&mut rhythm, 55);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(*outcome, TickOutcome::Paced { tick_count: i as u32 + 1 });
    }
    assert!(!rig.state.medication_due());
    assert!(!rig.signal.is_pending());

    let outcome = rig.run_ticks(&mut rhythm, 1)[0];
    assert_eq!(outcome, TickOutcome::MedicationDue { signalled: true });
    assert!(rig.state.medication_due());
    assert_eq!(rig.state.tick_count(), 0);
    assert!(rig.signal.is_pending());

    // 100 ms at 500 Hz on every tick
    let spans = rig.rhythm_line.high_spans();
    assert_eq!(spans.len(), 56 * 50);
    assert!(spans.iter().all(|s| s.duration_us() == 1_000));
    assert!(!rig.rhythm_line.is_high());
    println!("  ✅ {} cue cycles, reminder raised", spans.len());
}

#[test]
fn test_cue_starts_on_tick_boundaries() {
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut rhythm = rig.rhythm();
    buttons.on_press(Button::Power);

    rig.run_ticks(&mut rhythm, 3);

    let spans = rig.rhythm_line.high_spans();
    let starts: Vec<u64> = spans.chunks(50).map(|cue| cue[0].start_us).collect();
    assert_eq!(starts, vec![0, 545_000, 1_090_000]);
    for cue in spans.chunks(50) {
        let length = cue[49].end_us + 1_000 - cue[0].start_us;
        assert_eq!(length, 100_000);
    }
}

#[tokio::test]
async fn test_full_reminder_cycle() {
    println!("🔁 Reminder, alert, silence, next reminder");
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut rhythm = rig.rhythm();
    let mut alert = rig.alert();

    buttons.on_press(Button::Power);
    rig.run_ticks(&mut rhythm, 56);

    // Alert context wakes and beeps until the responder silences it
    rig.signal.wait().await;
    let mut gap = HookedGap::new(&rig.clock, move |waits| {
        if waits == 2 {
            buttons.on_press(Button::Silence);
        }
    });
    let beeps = alert.run_episode(&mut gap).await;

    assert_eq!(beeps, 2);
    assert_eq!(rig.indicator.high_spans().len(), 2);
    assert!(!rig.indicator.is_high());
    assert!(!rig.state.medication_due());
    assert!(rig.state.telemetry_enabled());

    // Counting restarted at the reminder; the next one needs 56 more
    let outcomes = rig.run_ticks(&mut rhythm, 56);
    assert_eq!(outcomes[54], TickOutcome::Paced { tick_count: 55 });
    assert_eq!(outcomes[55], TickOutcome::MedicationDue { signalled: true });
    println!("  ✅ second reminder after another 56 compressions");
}

#[test]
fn test_power_cycle_keeps_tick_count() {
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut rhythm = rig.rhythm();

    buttons.on_press(Button::Power);
    rig.run_ticks(&mut rhythm, 30);
    assert_eq!(buttons.on_press(Button::Power), ButtonAction::PoweredOff);

    let idle = rig.run_ticks(&mut rhythm, 5);
    assert!(idle.iter().all(|o| *o == TickOutcome::Idle));
    assert_eq!(rig.state.tick_count(), 30);

    buttons.on_press(Button::Power);
    let outcomes = rig.run_ticks(&mut rhythm, 26);
    assert_eq!(outcomes[25], TickOutcome::MedicationDue { signalled: true });
}

#[tokio::test]
async fn test_power_off_during_alert() {
    println!("⏻ Power off while the alert sounds");
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut rhythm = rig.rhythm();
    let mut alert = rig.alert();

    buttons.on_press(Button::Power);
    rig.run_ticks(&mut rhythm, 56);
    assert!(rig.signal.try_take());

    let mut gap = HookedGap::new(&rig.clock, move |waits| {
        if waits == 3 {
            assert_eq!(buttons.on_press(Button::Power), ButtonAction::PoweredOff);
        }
    });
    let beeps = alert.run_episode(&mut gap).await;

    assert_eq!(beeps, 3);
    assert!(!rig.state.power_on());
    assert!(!rig.state.medication_due());
    assert!(rig.outputs_quiet());

    // Telemetry untouched by power
    assert!(!rig.state.telemetry_enabled());

    let after = rig.run_ticks(&mut rhythm, 10);
    assert!(after.iter().all(|o| *o == TickOutcome::Idle));
    println!("  ✅ all outputs low, ticks idle");
}

#[test]
fn test_repeated_reminder_while_pending() {
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut rhythm = rig.rhythm();

    buttons.on_press(Button::Power);
    let outcomes = rig.run_ticks(&mut rhythm, 112);

    // Nobody consumed the first wake-up; the second one is dropped
    assert_eq!(outcomes[55], TickOutcome::MedicationDue { signalled: true });
    assert_eq!(outcomes[111], TickOutcome::MedicationDue { signalled: false });
    assert!(rig.state.medication_due());
    assert!(rig.signal.try_take());
    assert!(!rig.signal.try_take());
}

#[test]
fn test_silence_without_reminder_toggles_telemetry() {
    let rig = Rig::stock();
    let buttons = rig.buttons();

    assert_eq!(
        buttons.on_press(Button::Silence),
        ButtonAction::Silenced { telemetry_enabled: true }
    );
    assert_eq!(
        buttons.on_press(Button::Silence),
        ButtonAction::Silenced { telemetry_enabled: false }
    );
    assert!(!rig.state.medication_due());
    assert!(!rig.state.power_on());
}

#[test]
fn test_edges_dispatch_by_pin() {
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let pins = rig.config.pins;

    assert_eq!(buttons.on_falling_edge(pins.power), ButtonAction::PoweredOn);
    assert!(matches!(buttons.on_falling_edge(pins.silence), ButtonAction::Silenced { .. }));
    assert_eq!(buttons.on_falling_edge(pins.rhythm), ButtonAction::Ignored);
    assert_eq!(buttons.on_falling_edge(99), ButtonAction::Ignored);
    assert!(rig.state.power_on());
}

#[test]
fn test_press_counter_feeds_telemetry() {
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut counter = PressCounter::new(rig.state, rig.config.press_settle_ms);

    // Two presses with contact bounce on both edges
    let samples = [
        (0, true),
        (2, false),
        (3, true),
        (20, true),
        (100, false),
        (101, true),
        (102, false),
        (150, false),
        (400, true),
        (420, true),
        (500, false),
        (520, false),
    ];
    let mut accepted = Vec::new();
    for (ms, pressed) in samples {
        if let Some(count) = counter.poll(pressed, Instant::from_millis(ms)) {
            accepted.push(count);
        }
    }
    assert_eq!(accepted, vec![1, 2]);
    assert!(counter.is_idle());

    buttons.on_press(Button::Silence);
    let snapshot = rig.state.snapshot();
    assert_eq!(snapshot.press_count, 2);
    assert!(snapshot.telemetry_enabled);
}

#[test]
fn test_bouncy_silence_press_acts_once() {
    println!("🤫 Bouncing silence contact during an alert");
    let rig = Rig::stock();
    let buttons = rig.buttons();
    let mut silence = SilenceButton::new(buttons, rig.state, &rig.config);
    rig.state.raise_medication_due();

    // One sample per millisecond: bounce on press, 300 ms hold, bounce on release
    let trace: Vec<bool> = [true, false]
        .into_iter()
        .chain(std::iter::repeat(true).take(301))
        .chain([false, true])
        .chain(std::iter::repeat(false).take(30))
        .collect();

    let mut edges = 0;
    let mut silenced = 0;
    let mut previous = false;
    for pressed in trace {
        let now = Instant::from_millis(rig.clock.now_ms());
        if pressed && !previous {
            edges += 1;
            if matches!(silence.on_falling_edge(now), ButtonAction::Silenced { .. }) {
                silenced += 1;
            }
        }
        silence.poll(pressed, now);
        previous = pressed;
        rig.clock.advance_ms(1);
    }

    assert_eq!(edges, 3);
    assert_eq!(silenced, 1);
    assert_eq!(rig.state.press_count(), 1);
    assert!(rig.state.telemetry_enabled());
    assert!(!rig.state.medication_due());
    assert!(silence.is_armed());
    println!("  ✅ {} edges, one silence, one counted press", edges);
}
