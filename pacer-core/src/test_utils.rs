//! Test utilities for pacer core functionality

pub mod virtual_time {
    //! Virtual microsecond clock shared by delays and traced lines

    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// Virtual time controller for testing
    #[derive(Clone, Default)]
    pub struct VirtualClock {
        now_us: Arc<AtomicU64>,
    }

    impl VirtualClock {
        pub fn new() -> Self {
            Self::default()
        }

        /// Current virtual time in microseconds
        pub fn now_us(&self) -> u64 {
            self.now_us.load(Ordering::SeqCst)
        }

        pub fn now_ms(&self) -> u64 {
            self.now_us() / 1_000
        }

        /// Advance virtual time
        pub fn advance_us(&self, us: u64) {
            self.now_us.fetch_add(us, Ordering::SeqCst);
        }

        pub fn advance_ms(&self, ms: u64) {
            self.advance_us(ms * 1_000);
        }
    }
}

pub mod delays {
    //! Delays that advance a [`VirtualClock`] instead of sleeping

    use super::virtual_time::VirtualClock;

    /// Blocking delay for the pulse emitter
    #[derive(Clone)]
    pub struct ClockDelay {
        clock: VirtualClock,
    }

    impl ClockDelay {
        pub fn new(clock: &VirtualClock) -> Self {
            Self { clock: clock.clone() }
        }
    }

    impl embedded_hal::delay::DelayNs for ClockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.clock.advance_us(u64::from(ns) / 1_000);
        }

        fn delay_us(&mut self, us: u32) {
            self.clock.advance_us(u64::from(us));
        }
    }

    /// Async gap delay that runs a hook after every wait.
    ///
    /// The hook gets the number of completed waits; scenarios use it to
    /// press a button from "another context" at a chosen point.
    pub struct HookedGap<F> {
        clock: VirtualClock,
        waits: u32,
        hook: F,
    }

    impl<F: FnMut(u32)> HookedGap<F> {
        pub fn new(clock: &VirtualClock, hook: F) -> Self {
            Self {
                clock: clock.clone(),
                waits: 0,
                hook,
            }
        }

        pub fn waits(&self) -> u32 {
            self.waits
        }
    }

    impl<F: FnMut(u32)> embedded_hal_async::delay::DelayNs for HookedGap<F> {
        async fn delay_ns(&mut self, ns: u32) {
            self.clock.advance_us(u64::from(ns) / 1_000);
            self.waits += 1;
            (self.hook)(self.waits);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.clock.advance_ms(u64::from(ms));
            self.waits += 1;
            (self.hook)(self.waits);
        }
    }
}

pub mod output_capture {
    //! Output line that records timestamped level changes

    use super::virtual_time::VirtualClock;
    use crate::hal::{HalError, OutputLine};
    use std::sync::Mutex;

    /// One level change
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Transition {
        pub at_us: u64,
        pub high: bool,
    }

    /// A high phase of the line
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HighSpan {
        pub start_us: u64,
        pub end_us: u64,
    }

    impl HighSpan {
        pub fn duration_us(&self) -> u64 {
            self.end_us - self.start_us
        }
    }

    /// Traced output line
    pub struct TraceLine {
        clock: VirtualClock,
        transitions: Mutex<Vec<Transition>>,
    }

    impl TraceLine {
        pub fn new(clock: &VirtualClock) -> Self {
            Self {
                clock: clock.clone(),
                transitions: Mutex::new(Vec::new()),
            }
        }

        pub fn is_high(&self) -> bool {
            self.level()
        }

        /// Level changes only; repeated writes of the same level are folded
        pub fn transitions(&self) -> Vec<Transition> {
            self.lock().clone()
        }

        /// Completed high phases, in order
        pub fn high_spans(&self) -> Vec<HighSpan> {
            let transitions = self.lock();
            let mut spans = Vec::new();
            let mut start = None;
            for t in transitions.iter() {
                match (t.high, start) {
                    (true, None) => start = Some(t.at_us),
                    (false, Some(s)) => {
                        spans.push(HighSpan { start_us: s, end_us: t.at_us });
                        start = None;
                    }
                    _ => {}
                }
            }
            spans
        }

        pub fn clear(&self) {
            self.lock().clear();
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Transition>> {
            self.transitions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn level(&self) -> bool {
            self.lock().last().map(|t| t.high).unwrap_or(false)
        }

        fn record(&self, high: bool) {
            let mut transitions = self.lock();
            let current = transitions.last().map(|t| t.high).unwrap_or(false);
            if current != high {
                transitions.push(Transition {
                    at_us: self.clock.now_us(),
                    high,
                });
            }
        }
    }

    impl OutputLine for TraceLine {
        fn set_high(&self) -> Result<(), HalError> {
            self.record(true);
            Ok(())
        }

        fn set_low(&self) -> Result<(), HalError> {
            self.record(false);
            Ok(())
        }

        fn is_set_high(&self) -> Result<bool, HalError> {
            Ok(self.level())
        }
    }
}
