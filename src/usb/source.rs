//! UART reader/writer tasks for the USB-host front end.

use defmt::{info, warn};
use embassy_nrf::peripherals::{TIMER1, UARTE0};
use embassy_nrf::uarte::{UarteRxWithIdle, UarteTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::Instant;

use crate::bridge::{DeviceHandle, OutboundReport, ProtocolHint};
use crate::config;
use crate::error::Error;
use crate::usb::frame::{self, Deframer, FrameKind};
use crate::SharedBridge;

/// Read front-end frames and feed the translation core.
///
/// The bridge lock is taken per event and never held across an await.
pub async fn source_task(
    mut rx: UarteRxWithIdle<'static, UARTE0, TIMER1>,
    bridge: &'static SharedBridge,
    outbound: Sender<'static, CriticalSectionRawMutex, OutboundReport, { config::OUTBOUND_QUEUE_DEPTH }>,
) -> ! {
    info!("front-end reader started");

    let mut deframer = Deframer::new();
    let mut chunk = [0u8; config::UART_RX_CHUNK];
    let mut device: Option<DeviceHandle> = None;

    loop {
        let n = match rx.read_until_idle(&mut chunk).await {
            Ok(n) => n,
            Err(_) => {
                warn!("front-end read: {}", Error::Uart);
                continue;
            }
        };

        for &byte in &chunk[..n] {
            let Some(f) = deframer.push(byte) else {
                continue;
            };

            match f.kind {
                FrameKind::Attached => {
                    if f.data.is_empty() {
                        warn!("attach frame without protocol byte");
                        continue;
                    }
                    let hint = ProtocolHint::from_interface_protocol(f.data[0]);
                    let descriptor = &f.data[1..];

                    // The front end services one port; a new enumeration
                    // replaces whatever was there.
                    if let Some(prev) = device.take() {
                        bridge.lock(|b| b.borrow_mut().on_device_detached(prev));
                    }

                    match bridge.lock(|b| b.borrow_mut().on_device_attached(descriptor, hint)) {
                        Some((handle, profile)) => {
                            info!(
                                "wired device attached: keyboard={} pointing={}",
                                profile.keyboard, profile.pointing
                            );
                            device = Some(handle);
                        }
                        None => warn!("device table full, ignoring attach"),
                    }
                }

                FrameKind::Report => {
                    let Some(handle) = device else {
                        continue;
                    };
                    let now_us = Instant::now().as_micros();
                    let out =
                        bridge.lock(|b| b.borrow_mut().on_input_report(handle, f.data, now_us));
                    if let Some(report) = out {
                        // try_send keeps this path non-blocking; if the BLE
                        // writer is behind we drop the report.
                        if outbound.try_send(report).is_err() {
                            warn!("outbound queue full - dropping pass-through report");
                        }
                    }
                }

                FrameKind::Detached => {
                    if let Some(handle) = device.take() {
                        bridge.lock(|b| b.borrow_mut().on_device_detached(handle));
                        info!("wired device detached");
                    }
                }
            }
        }
    }
}

/// Forward keyboard LED state from the BLE host to the wired device.
pub async fn led_task(
    mut tx: UarteTx<'static, UARTE0>,
    leds: Receiver<'static, CriticalSectionRawMutex, u8, { config::LED_QUEUE_DEPTH }>,
) -> ! {
    let mut buf = [0u8; 8];
    loop {
        let bits = leds.receive().await;
        match frame::encode_frame(frame::CMD_SET_LEDS, &[bits], &mut buf) {
            Some(n) => {
                if tx.write(&buf[..n]).await.is_err() {
                    warn!("LED frame write failed");
                }
            }
            None => warn!("LED frame encode failed"),
        }
    }
}
