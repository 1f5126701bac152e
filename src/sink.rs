//! Outbound transport contract.
//!
//! The BLE glue implements this for the GATT HID service; tests implement
//! it with an in-memory recorder. Sends are synchronous and categorical:
//! the core never retries inside a call, it just leaves its own state
//! untouched and lets the next tick try again.

/// Why a send did not go out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    /// The sink cannot accept notifications right now (no subscriber,
    /// congestion window closed). Clean no-op; nothing to roll back.
    NotReady,
    /// The sink accepted the call but transmission failed; retry next tick.
    Transient,
}

/// Capability set required from the outbound transport.
pub trait Sink {
    /// Whether the sink is currently able to accept notifications.
    fn is_ready(&self) -> bool;

    /// Send an 8-byte boot-protocol keyboard report.
    fn send_keyboard(&mut self, report: &[u8; 8]) -> Result<(), SendError>;

    /// Send a 6-byte pointing report.
    fn send_pointing(&mut self, report: &[u8; 6]) -> Result<(), SendError>;

    /// Send a 2-byte consumer-control report.
    fn send_consumer(&mut self, report: &[u8; 2]) -> Result<(), SendError>;
}
