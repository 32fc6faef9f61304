//! Boundary to the telemetry uplink

use core::fmt::Write;

use heapless::String;

use crate::state::SystemState;

/// Reports a counter value over the network.
///
/// Fire and forget: implementations own connection setup, retries and
/// timeouts, and report failures through their own logs. `report` must
/// not wait on the network.
pub trait TelemetryUplink {
    fn report(&mut self, value: u32, enabled: bool);
}

impl<T: TelemetryUplink + ?Sized> TelemetryUplink for &mut T {
    fn report(&mut self, value: u32, enabled: bool) {
        (**self).report(value, enabled)
    }
}

/// Hands the current press count and telemetry flag to an uplink
pub struct TelemetryReporter<'a, U> {
    state: &'a SystemState,
    uplink: U,
}

impl<'a, U: TelemetryUplink> TelemetryReporter<'a, U> {
    pub fn new(state: &'a SystemState, uplink: U) -> Self {
        Self { state, uplink }
    }

    /// Report once; returns the value handed over
    pub fn report_now(&mut self) -> u32 {
        let value = self.state.press_count();
        let enabled = self.state.telemetry_enabled();

        #[cfg(feature = "defmt")]
        defmt::debug!("telemetry report: value={} enabled={}", value, enabled);

        self.uplink.report(value, enabled);
        value
    }

    pub fn uplink(&self) -> &U {
        &self.uplink
    }
}

/// Report on a fixed cadence, forever
#[cfg(feature = "embassy-time")]
pub async fn telemetry_task<U: TelemetryUplink>(mut reporter: TelemetryReporter<'_, U>, period_ms: u32) -> ! {
    use embassy_time::{Duration, Ticker};

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(period_ms)));
    loop {
        ticker.next().await;
        reporter.report_now();
    }
}

/// Request head for a ThingSpeak style `update` endpoint
pub struct UpdateRequest<'a> {
    pub host: &'a str,
    pub api_key: &'a str,
}

/// Capacity of a rendered request head
pub const REQUEST_CAPACITY: usize = 256;

impl UpdateRequest<'_> {
    /// Render `GET /update?api_key=..&field1=<value>`.
    ///
    /// Fails only when the host and key do not fit the buffer.
    pub fn render(&self, value: u32) -> Result<String<REQUEST_CAPACITY>, core::fmt::Error> {
        let mut request = String::new();
        write!(
            request,
            "GET /update?api_key={}&field1={} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.api_key, value, self.host
        )?;
        Ok(request)
    }
}
