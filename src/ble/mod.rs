//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **HID Service** - a HID-over-GATT service with keyboard, mouse and
//!    consumer input reports plus the keyboard LED output report.
//! 2. **Peripheral loop** - advertises, accepts one central, services
//!    GATT events (CCCD subscriptions, LED writes) and tears state down
//!    on disconnect.
//! 3. **Writer tasks** - the resampler tick and the keyboard/consumer
//!    pass-through queue both notify through [`BleSink`].
//!
//! Communication with other tasks is done via Embassy channels and the
//! shared bridge mutex defined in the crate root.

pub mod hid_service;
pub mod peripheral;

use core::sync::atomic::{AtomicBool, Ordering};

use nrf_softdevice::ble::gatt_server::NotifyValueError;
use nrf_softdevice::ble::Connection;

use crate::sink::{SendError, Sink};
use self::hid_service::HidService;

/// Which notifications the connected central has enabled.
///
/// Written from the GATT event callback, read by the writer tasks.
pub struct SinkReady {
    connected: AtomicBool,
    keyboard: AtomicBool,
    mouse: AtomicBool,
    consumer: AtomicBool,
}

impl SinkReady {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            keyboard: AtomicBool::new(false),
            mouse: AtomicBool::new(false),
            consumer: AtomicBool::new(false),
        }
    }

    pub fn set_connected(&self, on: bool) {
        self.connected.store(on, Ordering::Relaxed);
    }

    pub fn set_keyboard(&self, on: bool) {
        self.keyboard.store(on, Ordering::Relaxed);
    }

    pub fn set_mouse(&self, on: bool) {
        self.mouse.store(on, Ordering::Relaxed);
    }

    pub fn set_consumer(&self, on: bool) {
        self.consumer.store(on, Ordering::Relaxed);
    }

    /// Subscribed for pointing input.
    pub fn pointing_ready(&self) -> bool {
        self.connected.load(Ordering::Relaxed) && self.mouse.load(Ordering::Relaxed)
    }

    pub fn keyboard_ready(&self) -> bool {
        self.connected.load(Ordering::Relaxed) && self.keyboard.load(Ordering::Relaxed)
    }

    pub fn consumer_ready(&self) -> bool {
        self.connected.load(Ordering::Relaxed) && self.consumer.load(Ordering::Relaxed)
    }

    /// Forget all subscriptions (disconnect).
    pub fn reset(&self) {
        self.connected.store(false, Ordering::Relaxed);
        self.keyboard.store(false, Ordering::Relaxed);
        self.mouse.store(false, Ordering::Relaxed);
        self.consumer.store(false, Ordering::Relaxed);
    }
}

/// The translation core's sink, backed by GATT notifications on the
/// active connection.
pub struct BleSink<'a> {
    pub conn: &'a Connection,
    pub service: &'a HidService,
    pub ready: &'a SinkReady,
}

fn map_notify_error(e: NotifyValueError) -> SendError {
    match e {
        NotifyValueError::Disconnected => SendError::NotReady,
        NotifyValueError::Raw(_) => SendError::Transient,
    }
}

impl Sink for BleSink<'_> {
    fn is_ready(&self) -> bool {
        self.ready.pointing_ready()
    }

    fn send_keyboard(&mut self, report: &[u8; 8]) -> Result<(), SendError> {
        if !self.ready.keyboard_ready() {
            return Err(SendError::NotReady);
        }
        self.service
            .notify_keyboard(self.conn, report)
            .map_err(map_notify_error)
    }

    fn send_pointing(&mut self, report: &[u8; 6]) -> Result<(), SendError> {
        if !self.ready.pointing_ready() {
            return Err(SendError::NotReady);
        }
        self.service
            .notify_mouse(self.conn, report)
            .map_err(map_notify_error)
    }

    fn send_consumer(&mut self, report: &[u8; 2]) -> Result<(), SendError> {
        if !self.ready.consumer_ready() {
            return Err(SendError::NotReady);
        }
        self.service
            .notify_consumer(self.conn, report)
            .map_err(map_notify_error)
    }
}
