//! Test-only library interface for usb2bt.
//!
//! This module exposes the pure translation core so it can be tested on
//! the host (no embedded hardware required): descriptor parsing, report
//! decoding, the motion resampler, the core bridge, and the front-end
//! wire framing.
//!
//! Usage: `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].
//! This lib.rs provides a separate entry point for host-based testing;
//! the transport glue (BLE peripheral, UART tasks) is compiled only into
//! the binary.

#![cfg_attr(not(test), no_std)]

pub mod bridge;
pub mod hid;
pub mod resampler;
pub mod sink;

// The rest of src/usb/ is embedded transport glue; only the pure framing
// layer is part of the host-testable surface.
#[path = "usb/frame.rs"]
mod usb_frame_impl;

pub mod usb {
    pub mod frame {
        pub use crate::usb_frame_impl::*;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cross-module tests
// ═══════════════════════════════════════════════════════════════════════════
