#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Pacer Core
//!
//! Coordination core for a CPR assistance device: compression rhythm cue,
//! periodic medication reminder, silence and power buttons.
//!
//! Three contexts share [`SystemState`]: the rhythm tick source (timer
//! driven), the alert loop (its own core) and the button handler
//! (interrupt). They talk through single atomic operations and one
//! capacity-1 [`MedicationSignal`].

pub mod types;
pub mod hal;
pub mod state;
pub mod pulse;
pub mod signal;
pub mod rhythm;
pub mod alert;
pub mod buttons;
pub mod press;
pub mod telemetry;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use hal::{Duration, HalError, Instant, OutputLine, SharedOutput};
pub use state::{StateSnapshot, SystemState};
pub use pulse::PulseEmitter;
pub use signal::{MedicationDue, MedicationSignal};
pub use rhythm::{RhythmTickSource, TickOutcome};
pub use alert::AlertLoop;
pub use buttons::{ButtonAction, ButtonHandler, ForcedOutputs};
pub use press::{PressCounter, SilenceButton};
pub use telemetry::{TelemetryReporter, TelemetryUplink, UpdateRequest};

/// Pacer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
