//! # usb2bt - USB-to-Bluetooth HID Bridge
//!
//! Firmware for the **nRF52840** that exposes a wired USB keyboard/mouse
//! as a BLE HID peripheral. A UART-attached USB-host bridge IC enumerates
//! the wired device and streams descriptors and raw input reports; the
//! translation core re-emits them over HID-over-GATT.
//!
//! ## Architecture
//!
//! ```text
//! +----------------+  UART frames   +---------------------+  BLE notifications  +---------+
//! | USB host front | -------------> | nRF52840 (firmware) | ------------------> | Host PC |
//! | end (wired kbd/|                |  parse / classify / |                     | tablet  |
//! | mouse attached)| <------------- |  resample / notify  |                     +---------+
//! +----------------+  LED frames    +---------------------+
//! ```
//!
//! ## Async tasks (Embassy)
//!
//! | Task              | Responsibility                                  |
//! |-------------------|-------------------------------------------------|
//! | `softdevice_task` | Runs the Nordic SoftDevice event loop           |
//! | `ble_task`        | Advertise, serve GATT events, track sink state  |
//! | `source_task`     | Front-end UART frames → translation core        |
//! | `tick_task`       | Periodic resampler tick → pointing notification |
//! | `forward_task`    | Keyboard/consumer pass-through → notification   |
//! | `led_task`        | Keyboard LED output → front-end UART            |

#![no_std]
#![no_main]

mod ble;
mod bridge;
mod config;
mod error;
mod hid;
mod resampler;
mod sink;
mod usb;

use core::cell::RefCell;

use defmt::{info, unwrap};
use defmt_rtt as _; // global logger
use panic_probe as _; // panic handler → defmt

use embassy_executor::Spawner;
use embassy_nrf::peripherals::{TIMER1, UARTE0};
use embassy_nrf::uarte::{self, UarteRxWithIdle, UarteTx};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

use crate::ble::hid_service::HidService;
use crate::ble::peripheral::HidServer;
use crate::ble::SinkReady;
use crate::bridge::{Bridge, OutboundReport};

/// Translation core, shared by the UART, tick and BLE tasks. The lock is
/// held only for O(1) core calls, never across a send or an await.
pub type SharedBridge = Mutex<CriticalSectionRawMutex, RefCell<Bridge>>;

static BRIDGE: SharedBridge = Mutex::new(RefCell::new(Bridge::new()));

/// CCCD subscription state, written by the GATT callback.
static SINK_READY: SinkReady = SinkReady::new();

/// Keyboard/consumer pass-through → BLE writer.
static OUTBOUND_CHANNEL: Channel<
    CriticalSectionRawMutex,
    OutboundReport,
    { config::OUTBOUND_QUEUE_DEPTH },
> = Channel::new();

/// Keyboard LED state → front-end UART writer.
static LED_CHANNEL: Channel<CriticalSectionRawMutex, u8, { config::LED_QUEUE_DEPTH }> =
    Channel::new();

static SERVER: StaticCell<HidServer> = StaticCell::new();

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(nrf_softdevice::raw::nrf_clock_lf_cfg_t {
            source: nrf_softdevice::raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: nrf_softdevice::raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(nrf_softdevice::raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(nrf_softdevice::raw::ble_gatt_conn_cfg_t { att_mtu: 64 }),
        gap_role_count: Some(nrf_softdevice::raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,      // one advertising set
            periph_role_count: 1,  // one central may connect
            central_role_count: 0, // we never scan
            central_sec_count: 0,
            _bitfield_1: nrf_softdevice::raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        ..Default::default()
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static HidServer) -> ! {
    ble::peripheral::ble_task(sd, server, &BRIDGE, &SINK_READY, LED_CHANNEL.sender()).await
}

#[embassy_executor::task]
async fn tick_task(server: &'static HidServer) -> ! {
    ble::peripheral::tick_task(server, &BRIDGE, &SINK_READY).await
}

#[embassy_executor::task]
async fn forward_task(server: &'static HidServer) -> ! {
    ble::peripheral::forward_task(server, &SINK_READY, OUTBOUND_CHANNEL.receiver()).await
}

#[embassy_executor::task]
async fn source_task(rx: UarteRxWithIdle<'static, UARTE0, TIMER1>) -> ! {
    usb::source::source_task(rx, &BRIDGE, OUTBOUND_CHANNEL.sender()).await
}

#[embassy_executor::task]
async fn led_task(tx: UarteTx<'static, UARTE0>) -> ! {
    usb::source::led_task(tx, LED_CHANNEL.receiver()).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("usb2bt firmware starting");

    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = embassy_nrf::interrupt::Priority::P2;
    nrf_config.time_interrupt_priority = embassy_nrf::interrupt::Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    let sd = Softdevice::enable(&softdevice_config());

    // GATT registration must finish before the SoftDevice event loop runs.
    let hid = unwrap!(HidService::new(sd));
    let server = SERVER.init(HidServer { hid });
    unwrap!(spawner.spawn(softdevice_task(sd)));
    info!("SoftDevice started, HID service registered");

    // UART link to the USB-host front end.
    let mut uart_config = uarte::Config::default();
    uart_config.baudrate = uarte::Baudrate::BAUD115200;
    let uart = uarte::Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uart_config);
    let (tx, rx) = uart.split_with_idle(p.TIMER1, p.PPI_CH0, p.PPI_CH1);

    unwrap!(spawner.spawn(source_task(rx)));
    unwrap!(spawner.spawn(led_task(tx)));
    info!("front-end UART started");

    unwrap!(spawner.spawn(ble_task(sd, server)));
    unwrap!(spawner.spawn(tick_task(server)));
    unwrap!(spawner.spawn(forward_task(server)));
    info!("BLE peripheral started, advertising as {}", config::BLE_DEVICE_NAME);
}
