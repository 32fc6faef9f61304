//! Process-wide flags and counters shared by every execution context

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Atomic system state
///
/// Safe for use from interrupt handlers and from either core. Every
/// accessor is a single atomic operation; nothing here blocks.
pub struct SystemState {
    power_on: AtomicBool,
    medication_due: AtomicBool,
    telemetry_enabled: AtomicBool,
    tick_count: AtomicU32,
    press_count: AtomicU32,
}

/// Point-in-time copy of [`SystemState`], for logging and assertions
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateSnapshot {
    pub power_on: bool,
    pub medication_due: bool,
    pub telemetry_enabled: bool,
    pub tick_count: u32,
    pub press_count: u32,
}

impl SystemState {
    /// Powered off, no alert, telemetry off, counters at zero
    pub const fn new() -> Self {
        Self {
            power_on: AtomicBool::new(false),
            medication_due: AtomicBool::new(false),
            telemetry_enabled: AtomicBool::new(false),
            tick_count: AtomicU32::new(0),
            press_count: AtomicU32::new(0),
        }
    }

    pub fn power_on(&self) -> bool {
        self.power_on.load(Ordering::Acquire)
    }

    /// Flip the power flag, returning the new value
    pub fn toggle_power(&self) -> bool {
        !self.power_on.fetch_not(Ordering::AcqRel)
    }

    pub fn medication_due(&self) -> bool {
        self.medication_due.load(Ordering::Acquire)
    }

    pub fn raise_medication_due(&self) {
        self.medication_due.store(true, Ordering::Release);
    }

    pub fn clear_medication_due(&self) {
        self.medication_due.store(false, Ordering::Release);
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry_enabled.load(Ordering::Acquire)
    }

    /// Flip the telemetry flag, returning the new value
    pub fn toggle_telemetry(&self) -> bool {
        !self.telemetry_enabled.fetch_not(Ordering::AcqRel)
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count.load(Ordering::Acquire)
    }

    /// Count one compression, returning the new count
    pub fn advance_tick(&self) -> u32 {
        self.tick_count.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    pub fn reset_ticks(&self) {
        self.tick_count.store(0, Ordering::Release);
    }

    pub fn press_count(&self) -> u32 {
        self.press_count.load(Ordering::Acquire)
    }

    /// Count one debounced press, returning the new count
    pub fn record_press(&self) -> u32 {
        self.press_count.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            power_on: self.power_on(),
            medication_due: self.medication_due(),
            telemetry_enabled: self.telemetry_enabled(),
            tick_count: self.tick_count(),
            press_count: self.press_count(),
        }
    }

    /// Reset everything to power-up values (for testing)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn reset(&self) {
        self.power_on.store(false, Ordering::SeqCst);
        self.medication_due.store(false, Ordering::SeqCst);
        self.telemetry_enabled.store(false, Ordering::SeqCst);
        self.tick_count.store(0, Ordering::SeqCst);
        self.press_count.store(0, Ordering::SeqCst);
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}
