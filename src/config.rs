//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// BLE

/// Device name carried in the advertising payload and GAP.
pub const BLE_DEVICE_NAME: &str = "usb2bt";

/// GAP appearance: Generic Human Interface Device (0x03C0).
pub const BLE_APPEARANCE_HID: u16 = 0x03C0;

/// BLE connection interval range (in 1.25 ms units).
/// 6 = 7.5 ms (lowest latency for HID).
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// BLE slave latency (number of connection events we may skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

// Wired front end (UART-attached USB-host bridge IC)
//
// The front-end link runs at 115200 baud, 8N1 (`Baudrate::BAUD115200`
// in `main.rs`).

/// DMA chunk size for the UART reader.
pub const UART_RX_CHUNK: usize = 64;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   UART RXD (from front end) → P0.08
//   UART TXD (to front end)   → P0.06

// Channel depths

/// Keyboard/consumer pass-through queue depth.
pub const OUTBOUND_QUEUE_DEPTH: usize = 8;

/// Keyboard LED output queue depth.
pub const LED_QUEUE_DEPTH: usize = 4;
