//! Unified error type for usb2bt.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! Nothing here is fatal to the translation core: bad input degrades to
//! fallback behavior and transport trouble is retried, so these variants
//! mostly travel through log lines and diagnostics.

use defmt::Format;

/// Top-level error type used across the application.
#[derive(Debug, Format)]
pub enum Error {
    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// No central is connected or subscribed.
    SinkNotReady,

    // Wired front end
    /// UART transfer failed.
    Uart,

    /// A front-end frame was dropped (checksum, length, unknown command).
    FrameRejected,

    // HID core
    /// The report descriptor produced no usable layout or role.
    DescriptorRejected,

    /// No free slot for another wired device.
    DeviceTableFull,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, Format)]
pub enum BleError {
    /// GAP / GATT raw error code from the SoftDevice.
    Raw(u32),
    /// GATT service registration failed at bring-up.
    RegisterFailed,
    /// Advertising could not start.
    AdvertiseFailed,
    /// Notification could not be queued.
    NotifyFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
