//! Polled, debounced press counting on the silence input

use crate::buttons::{ButtonAction, ButtonHandler};
use crate::hal::{Duration, Instant, OutputLine};
use crate::state::SystemState;
use crate::types::{Button, PacerConfig};

/// Debounce states for a single active-low input
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Level {
    Released,
    /// Low seen, waiting for it to hold
    Pressing(Instant),
    Pressed,
    /// High seen, waiting for it to hold
    Releasing(Instant),
}

/// Counts presses once their level has been stable for the settle time.
///
/// Both edges are debounced, so contact bounce on release never starts a
/// second press.
pub struct PressCounter<'a> {
    state: &'a SystemState,
    settle: Duration,
    level: Level,
}

impl<'a> PressCounter<'a> {
    pub fn new(state: &'a SystemState, settle_ms: u64) -> Self {
        Self {
            state,
            settle: Duration::from_millis(settle_ms),
            level: Level::Released,
        }
    }

    /// Feed one sample; returns the new press count when a press is accepted
    pub fn poll(&mut self, pressed: bool, now: Instant) -> Option<u32> {
        match (self.level, pressed) {
            (Level::Released, true) => {
                self.level = Level::Pressing(now);
                self.accept_press(now)
            }
            (Level::Pressing(_), true) => self.accept_press(now),
            (Level::Pressing(_), false) => {
                self.level = Level::Released;
                None
            }
            (Level::Pressed, false) => {
                self.level = Level::Releasing(now);
                self.accept_release(now);
                None
            }
            (Level::Releasing(_), true) => {
                self.level = Level::Pressed;
                None
            }
            (Level::Releasing(_), false) => {
                self.accept_release(now);
                None
            }
            (Level::Released, false) | (Level::Pressed, true) => None,
        }
    }

    /// True once a release has settled and no press is in progress
    pub fn is_idle(&self) -> bool {
        self.level == Level::Released
    }

    fn accept_press(&mut self, now: Instant) -> Option<u32> {
        let Level::Pressing(since) = self.level else {
            return None;
        };
        if now.duration_since(since) < self.settle {
            return None;
        }

        self.level = Level::Pressed;
        let count = self.state.record_press();

        #[cfg(feature = "defmt")]
        defmt::info!("press counted: {}", count);

        Some(count)
    }

    fn accept_release(&mut self, now: Instant) {
        if let Level::Releasing(since) = self.level {
            if now.duration_since(since) >= self.settle {
                self.level = Level::Released;
            }
        }
    }
}


/// The silence input's two jobs on one pin.
///
/// A falling edge silences once and disarms; presses are then counted
/// from polled samples. The edge action re-arms only after the input has
/// read released for the settle time and the counter is idle, so bounce
/// on either edge gives neither a second silence nor a lost count.
pub struct SilenceButton<'a, R, A, I> {
    handler: &'a ButtonHandler<'a, R, A, I>,
    counter: PressCounter<'a>,
    settle: Duration,
    last_low: Instant,
    armed: bool,
}

impl<'a, R, A, I> SilenceButton<'a, R, A, I>
where
    R: OutputLine,
    A: OutputLine,
    I: OutputLine,
{
    pub fn new(handler: &'a ButtonHandler<'a, R, A, I>, state: &'a SystemState, config: &PacerConfig) -> Self {
        Self {
            handler,
            counter: PressCounter::new(state, config.press_settle_ms),
            settle: Duration::from_millis(config.press_settle_ms),
            last_low: Instant::from_millis(0),
            armed: true,
        }
    }

    /// Falling edge on the silence pin
    pub fn on_falling_edge(&mut self, now: Instant) -> ButtonAction {
        self.last_low = now;
        if !self.armed {
            return ButtonAction::Ignored;
        }
        self.armed = false;
        self.handler.on_press(Button::Silence)
    }

    /// Feed one level sample; returns the new press count when a press is accepted
    pub fn poll(&mut self, pressed: bool, now: Instant) -> Option<u32> {
        let counted = self.counter.poll(pressed, now);
        if pressed {
            self.last_low = now;
        } else if !self.armed && self.counter.is_idle() && now.duration_since(self.last_low) >= self.settle {
            self.armed = true;
        }
        counted
    }

    /// True when the next falling edge silences again; polling may stop
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
