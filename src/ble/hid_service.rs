//! HID-over-GATT service registration and notification plumbing.
//!
//! The `#[nrf_softdevice::gatt_service]` macro cannot attach the Report
//! Reference descriptor (UUID 0x2908) that HOGP requires on every Report
//! characteristic, so the service is built by hand with `ServiceBuilder`:
//!
//! - HID Information (0x2A4A), Report Map (0x2A4B), HID Control Point
//!   (0x2A4C)
//! - Input Reports (0x2A4D, notify) for keyboard / mouse / consumer,
//!   each tagged with its report id
//! - Output Report (0x2A4D, write) for keyboard LEDs

use defmt::debug;
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{self, NotifyValueError, RegisterError};
use nrf_softdevice::ble::{Connection, SecurityMode, Uuid};
use nrf_softdevice::Softdevice;

use crate::hid::report_map::{
    REPORT_ID_CONSUMER, REPORT_ID_KEYBOARD, REPORT_ID_MOUSE, REPORT_MAP,
};

const HID_SERVICE: Uuid = Uuid::new_16(0x1812);
const HID_INFORMATION: Uuid = Uuid::new_16(0x2A4A);
const REPORT_MAP_CHAR: Uuid = Uuid::new_16(0x2A4B);
const HID_CONTROL_POINT: Uuid = Uuid::new_16(0x2A4C);
const HID_REPORT: Uuid = Uuid::new_16(0x2A4D);
const REPORT_REFERENCE: Uuid = Uuid::new_16(0x2908);

/// Report Reference: second byte distinguishes input (1) from output (2).
const REPORT_REF_INPUT: u8 = 1;
const REPORT_REF_OUTPUT: u8 = 2;

/// Events surfaced to the peripheral loop from GATT writes.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidEvent {
    /// Central toggled keyboard input notifications.
    KeyboardSubscribed(bool),
    /// Central toggled pointing input notifications.
    MouseSubscribed(bool),
    /// Central toggled consumer input notifications.
    ConsumerSubscribed(bool),
    /// Keyboard LED output report from the host.
    KeyboardLeds(u8),
}

/// Attribute handles of the registered HID service.
pub struct HidService {
    input_keyboard: u16,
    input_keyboard_cccd: u16,
    output_keyboard: u16,
    input_mouse: u16,
    input_mouse_cccd: u16,
    input_consumer: u16,
    input_consumer_cccd: u16,
}

impl HidService {
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut sb = ServiceBuilder::new(sd, HID_SERVICE)?;

        sb.add_characteristic(
            HID_INFORMATION,
            Attribute::new([
                0x11u8, 0x01u8, // HID version 1.11
                0x00u8, // country code
                0x02u8, // normally connectable
            ])
            .security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read()),
        )?
        .build();

        sb.add_characteristic(
            REPORT_MAP_CHAR,
            Attribute::new(REPORT_MAP).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read()),
        )?
        .build();

        sb.add_characteristic(
            HID_CONTROL_POINT,
            Attribute::new([0u8]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().write_without_response()),
        )?
        .build();

        let mut input_keyboard = sb.add_characteristic(
            HID_REPORT,
            Attribute::new([0u8; 8]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().notify()),
        )?;
        input_keyboard.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new([REPORT_ID_KEYBOARD, REPORT_REF_INPUT])
                .security(SecurityMode::JustWorks),
        )?;
        let input_keyboard = input_keyboard.build();

        let mut output_keyboard = sb.add_characteristic(
            HID_REPORT,
            Attribute::new([0u8; 1]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().write().write_without_response()),
        )?;
        output_keyboard.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new([REPORT_ID_KEYBOARD, REPORT_REF_OUTPUT])
                .security(SecurityMode::JustWorks),
        )?;
        let output_keyboard = output_keyboard.build();

        let mut input_mouse = sb.add_characteristic(
            HID_REPORT,
            Attribute::new([0u8; 6]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().notify()),
        )?;
        input_mouse.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new([REPORT_ID_MOUSE, REPORT_REF_INPUT]).security(SecurityMode::JustWorks),
        )?;
        let input_mouse = input_mouse.build();

        let mut input_consumer = sb.add_characteristic(
            HID_REPORT,
            Attribute::new([0u8; 2]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().notify()),
        )?;
        input_consumer.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new([REPORT_ID_CONSUMER, REPORT_REF_INPUT])
                .security(SecurityMode::JustWorks),
        )?;
        let input_consumer = input_consumer.build();

        let _ = sb.build();

        Ok(Self {
            input_keyboard: input_keyboard.value_handle,
            input_keyboard_cccd: input_keyboard.cccd_handle,
            output_keyboard: output_keyboard.value_handle,
            input_mouse: input_mouse.value_handle,
            input_mouse_cccd: input_mouse.cccd_handle,
            input_consumer: input_consumer.value_handle,
            input_consumer_cccd: input_consumer.cccd_handle,
        })
    }

    /// Translate a GATT write into a [`HidEvent`].
    pub fn on_write(&self, handle: u16, data: &[u8]) -> Option<HidEvent> {
        if data.is_empty() {
            return None;
        }
        if handle == self.input_keyboard_cccd {
            return Some(HidEvent::KeyboardSubscribed(data[0] & 0x01 != 0));
        }
        if handle == self.input_mouse_cccd {
            return Some(HidEvent::MouseSubscribed(data[0] & 0x01 != 0));
        }
        if handle == self.input_consumer_cccd {
            return Some(HidEvent::ConsumerSubscribed(data[0] & 0x01 != 0));
        }
        if handle == self.output_keyboard {
            return Some(HidEvent::KeyboardLeds(data[0]));
        }
        debug!("unhandled GATT write to handle {}", handle);
        None
    }

    pub fn notify_keyboard(
        &self,
        conn: &Connection,
        report: &[u8; 8],
    ) -> Result<(), NotifyValueError> {
        gatt_server::notify_value(conn, self.input_keyboard, report)
    }

    pub fn notify_mouse(
        &self,
        conn: &Connection,
        report: &[u8; 6],
    ) -> Result<(), NotifyValueError> {
        gatt_server::notify_value(conn, self.input_mouse, report)
    }

    pub fn notify_consumer(
        &self,
        conn: &Connection,
        report: &[u8; 2],
    ) -> Result<(), NotifyValueError> {
        gatt_server::notify_value(conn, self.input_consumer, report)
    }
}
