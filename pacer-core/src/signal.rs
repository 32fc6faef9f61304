//! Single-slot wake-up from the tick source to the alert loop

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

/// Payload of a medication reminder wake-up
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MedicationDue;

/// Capacity-1 channel carrying [`MedicationDue`].
///
/// A notify while a wake-up is still pending is dropped. The receiver
/// re-reads `medication_due` in [`SystemState`](crate::SystemState), so
/// the number of queued wake-ups carries no information.
pub struct MedicationSignal<M: RawMutex> {
    channel: Channel<M, MedicationDue, 1>,
}

impl<M: RawMutex> MedicationSignal<M> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Non-blocking send; returns `false` when a wake-up was already pending
    pub fn notify(&self) -> bool {
        self.channel.try_send(MedicationDue).is_ok()
    }

    /// Wait for the next wake-up
    pub async fn wait(&self) -> MedicationDue {
        self.channel.receive().await
    }

    /// Consume a pending wake-up without waiting
    pub fn try_take(&self) -> bool {
        self.channel.try_receive().is_ok()
    }

    pub fn is_pending(&self) -> bool {
        !self.channel.is_empty()
    }
}

impl<M: RawMutex> Default for MedicationSignal<M> {
    fn default() -> Self {
        Self::new()
    }
}
