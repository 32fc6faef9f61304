//! Hardware Abstraction Layer for the pacer core

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Mock instant type for compilation without embassy-time
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Instant(u64);

    impl Instant {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub fn duration_since(&self, other: Instant) -> Duration {
            Duration::from_millis(self.0.saturating_sub(other.0))
        }

        pub fn as_millis(&self) -> u64 {
            self.0
        }
    }

    impl core::ops::Add<Duration> for Instant {
        type Output = Instant;

        fn add(self, rhs: Duration) -> Instant {
            Instant(self.0 + rhs.as_millis())
        }
    }

    /// Mock duration type
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub fn as_millis(&self) -> u64 {
            self.0
        }
    }
}

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Digital output shared between execution contexts.
///
/// Every method takes `&self`: the power button forces lines low that the
/// tick source and the alert loop drive. Each write must be atomic with
/// respect to the other contexts.
pub trait OutputLine {
    /// Drive the line high
    fn set_high(&self) -> Result<(), HalError>;

    /// Drive the line low
    fn set_low(&self) -> Result<(), HalError>;

    /// Last level written to the line
    fn is_set_high(&self) -> Result<bool, HalError>;

    /// Set line level (true = high)
    fn set_state(&self, high: bool) -> Result<(), HalError> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }
}

impl<L: OutputLine + ?Sized> OutputLine for &L {
    fn set_high(&self) -> Result<(), HalError> {
        (**self).set_high()
    }

    fn set_low(&self) -> Result<(), HalError> {
        (**self).set_low()
    }

    fn is_set_high(&self) -> Result<bool, HalError> {
        (**self).is_set_high()
    }
}

/// Drive a line low, logging instead of failing.
///
/// Used on the shutdown paths, where a failed write must not stop the
/// remaining lines from being forced off.
pub(crate) fn force_low<L: OutputLine + ?Sized>(line: &L) {
    if let Err(_err) = line.set_low() {
        #[cfg(feature = "defmt")]
        defmt::warn!("failed to force line low: {:?}", _err);
    }
}

/// Adapter turning an exclusive embedded-hal pin into an [`OutputLine`].
///
/// The pin lives behind a critical section that covers a single write.
pub struct SharedOutput<P> {
    pin: Mutex<RefCell<P>>,
    level: Mutex<RefCell<bool>>,
}

impl<P> SharedOutput<P>
where
    P: OutputPin,
{
    /// Wrap a pin that is currently driven low
    pub const fn new(pin: P) -> Self {
        Self {
            pin: Mutex::new(RefCell::new(pin)),
            level: Mutex::new(RefCell::new(false)),
        }
    }

    /// Give the pin back (tests verify mock pins this way)
    pub fn into_inner(self) -> P {
        self.pin.into_inner().into_inner()
    }

    fn write(&self, high: bool) -> Result<(), HalError> {
        critical_section::with(|cs| {
            let mut pin = self.pin.borrow(cs).borrow_mut();
            let result = if high { pin.set_high() } else { pin.set_low() };
            result.map_err(|_| HalError::GpioError)?;
            *self.level.borrow(cs).borrow_mut() = high;
            Ok(())
        })
    }
}

impl<P> OutputLine for SharedOutput<P>
where
    P: OutputPin,
{
    fn set_high(&self) -> Result<(), HalError> {
        self.write(true)
    }

    fn set_low(&self) -> Result<(), HalError> {
        self.write(false)
    }

    fn is_set_high(&self) -> Result<bool, HalError> {
        Ok(critical_section::with(|cs| *self.level.borrow(cs).borrow()))
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use embedded_hal::delay::DelayNs;
    use portable_atomic::{AtomicBool, AtomicU32, Ordering};

    /// Output line recording its level and the number of rising edges
    #[derive(Default)]
    pub struct MockLine {
        high: AtomicBool,
        rising_edges: AtomicU32,
        writes: AtomicU32,
    }

    impl MockLine {
        pub const fn new() -> Self {
            Self {
                high: AtomicBool::new(false),
                rising_edges: AtomicU32::new(0),
                writes: AtomicU32::new(0),
            }
        }

        /// Create a line that starts out driven high
        pub fn new_high() -> Self {
            let line = Self::new();
            line.high.store(true, Ordering::SeqCst);
            line
        }

        pub fn is_high(&self) -> bool {
            self.high.load(Ordering::SeqCst)
        }

        /// Number of low-to-high transitions seen so far
        pub fn rising_edges(&self) -> u32 {
            self.rising_edges.load(Ordering::SeqCst)
        }

        /// Number of writes of either level
        pub fn writes(&self) -> u32 {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl OutputLine for MockLine {
        fn set_high(&self) -> Result<(), HalError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if !self.high.swap(true, Ordering::SeqCst) {
                self.rising_edges.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }

        fn set_low(&self) -> Result<(), HalError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.high.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_set_high(&self) -> Result<bool, HalError> {
            Ok(self.is_high())
        }
    }

    /// Line whose writes always fail
    pub struct BrokenLine;

    impl OutputLine for BrokenLine {
        fn set_high(&self) -> Result<(), HalError> {
            Err(HalError::GpioError)
        }

        fn set_low(&self) -> Result<(), HalError> {
            Err(HalError::GpioError)
        }

        fn is_set_high(&self) -> Result<bool, HalError> {
            Err(HalError::GpioError)
        }
    }

    /// Blocking delay that only accumulates the requested time
    #[derive(Default, Debug)]
    pub struct MockDelay {
        total_us: u64,
        calls: u32,
    }

    impl MockDelay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn total_us(&self) -> u64 {
            self.total_us
        }

        pub fn calls(&self) -> u32 {
            self.calls
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_us += u64::from(ns) / 1_000;
            self.calls += 1;
        }

        fn delay_us(&mut self, us: u32) {
            self.total_us += u64::from(us);
            self.calls += 1;
        }
    }
}
