//! BLE peripheral loop and outbound writer tasks.
//!
//! One central at a time: advertise, serve GATT events until disconnect,
//! tear down, advertise again. The active connection is published in a
//! shared cell so the writer tasks can notify without owning the
//! connection lifecycle.

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::{Duration, Instant, Timer};
use nrf_softdevice::ble::gatt_server::{self, Server, WriteOp};
use nrf_softdevice::ble::peripheral::{self, AdvertiseError};
use nrf_softdevice::ble::Connection;
use nrf_softdevice::Softdevice;

use crate::ble::hid_service::{HidEvent, HidService};
use crate::ble::{BleSink, SinkReady};
use crate::bridge::{forward, OutboundReport};
use crate::config;
use crate::error::{BleError, Error};
use crate::sink::{SendError, Sink};
use crate::SharedBridge;

/// Active connection, shared with the writer tasks.
static CONNECTION: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>> =
    Mutex::new(RefCell::new(None));

fn active_connection() -> Option<Connection> {
    CONNECTION.lock(|c| c.borrow().clone())
}

/// Advertising payload: flags, HID service UUID, appearance, name.
#[rustfmt::skip]
static ADV_DATA: &[u8] = &[
    0x02, 0x01, 0x06,                               // flags: LE general, no BR/EDR
    0x03, 0x03, 0x12, 0x18,                         // complete 16-bit UUIDs: 0x1812
    0x03, 0x19,
    (config::BLE_APPEARANCE_HID & 0xFF) as u8,      // appearance (LE)
    (config::BLE_APPEARANCE_HID >> 8) as u8,
    0x07, 0x09, b'u', b's', b'b', b'2', b'b', b't', // complete local name
];

static SCAN_DATA: &[u8] = &[];

/// GATT server wrapper handing writes to the HID service.
pub struct HidServer {
    pub hid: HidService,
}

impl Server for HidServer {
    type Event = HidEvent;

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<HidEvent> {
        self.hid.on_write(handle, data)
    }
}

/// Advertise, serve one central, repeat.
pub async fn ble_task(
    sd: &'static Softdevice,
    server: &'static HidServer,
    bridge: &'static SharedBridge,
    ready: &'static SinkReady,
    leds: Sender<'static, CriticalSectionRawMutex, u8, { config::LED_QUEUE_DEPTH }>,
) -> ! {
    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: ADV_DATA,
            scan_data: SCAN_DATA,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &peripheral::Config::default())
            .await
        {
            Ok(conn) => conn,
            Err(AdvertiseError::Timeout) => continue,
            Err(_) => {
                warn!("{}", Error::Ble(BleError::AdvertiseFailed));
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };

        info!("central connected");
        CONNECTION.lock(|c| c.borrow_mut().replace(conn.clone()));
        ready.set_connected(true);

        // Ask for the low-latency interval range; the central may grant a
        // slower one.
        let desired = nrf_softdevice::raw::ble_gap_conn_params_t {
            min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
            max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
            slave_latency: config::BLE_SLAVE_LATENCY,
            conn_sup_timeout: config::BLE_SUP_TIMEOUT,
        };
        if conn.set_conn_params(desired).is_err() {
            warn!("connection parameter request failed");
        }

        // Seed the tick period from the negotiated connection interval
        // (1.25 ms units, same unit the resampler expects).
        let params = conn.conn_params();
        bridge.lock(|b| {
            b.borrow_mut()
                .on_link_interval_updated(params.max_conn_interval)
        });

        let result = gatt_server::run(&conn, server, |event| match event {
            HidEvent::KeyboardSubscribed(on) => ready.set_keyboard(on),
            HidEvent::ConsumerSubscribed(on) => ready.set_consumer(on),
            HidEvent::MouseSubscribed(on) => {
                ready.set_mouse(on);
                let now_us = Instant::now().as_micros();
                bridge.lock(|b| b.borrow_mut().on_sink_ready_changed(on, now_us));
            }
            HidEvent::KeyboardLeds(bits) => {
                if leds.try_send(bits).is_err() {
                    warn!("LED queue full");
                }
            }
        })
        .await;

        info!("central disconnected: {:?}", result);
        CONNECTION.lock(|c| c.borrow_mut().take());
        ready.reset();
        let now_us = Instant::now().as_micros();
        bridge.lock(|b| b.borrow_mut().on_sink_ready_changed(false, now_us));
    }
}

/// Periodic resampler tick.
///
/// Split-phase against the bridge mutex: preview under the lock, notify
/// with no lock held, then commit (or record the failure) under the lock.
pub async fn tick_task(
    server: &'static HidServer,
    bridge: &'static SharedBridge,
    ready: &'static SinkReady,
) -> ! {
    loop {
        let interval_us = bridge.lock(|b| b.borrow().send_interval_us());
        Timer::after(Duration::from_micros(interval_us)).await;

        if !ready.pointing_ready() {
            continue;
        }
        let Some(conn) = active_connection() else {
            continue;
        };

        let now_us = Instant::now().as_micros();
        let Some(batch) = bridge.lock(|b| b.borrow().tick_preview(now_us)) else {
            continue;
        };

        let mut sink = BleSink {
            conn: &conn,
            service: &server.hid,
            ready,
        };
        match sink.send_pointing(batch.frame()) {
            Ok(()) => bridge.lock(|b| b.borrow_mut().tick_commit(&batch)),
            Err(SendError::Transient) => bridge.lock(|b| b.borrow_mut().tick_failed()),
            // Not ready: the same window is re-previewed next tick.
            Err(SendError::NotReady) => {}
        }
    }
}

/// Keyboard / consumer pass-through writer.
pub async fn forward_task(
    server: &'static HidServer,
    ready: &'static SinkReady,
    outbound: Receiver<
        'static,
        CriticalSectionRawMutex,
        OutboundReport,
        { config::OUTBOUND_QUEUE_DEPTH },
    >,
) -> ! {
    loop {
        let report = outbound.receive().await;
        let Some(conn) = active_connection() else {
            continue;
        };
        let mut sink = BleSink {
            conn: &conn,
            service: &server.hid,
            ready,
        };
        if let Err(e) = forward(&report, &mut sink) {
            match e {
                SendError::NotReady => {}
                SendError::Transient => warn!("pass-through notify failed"),
            }
        }
    }
}
