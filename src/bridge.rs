//! Core facade: routes wired-side events into the translation core.
//!
//! The transport glue owns the actual USB front end and BLE stack; this
//! module owns everything in between. On device attach it parses and
//! caches the report layouts and classifies the device; on each raw input
//! report it dispatches by role: keyboard and consumer payloads are handed
//! back to the caller for direct forwarding, pointing payloads are decoded
//! and pushed into the resampler, which the periodic tick drains.
//!
//! Nothing in here blocks, and nothing fatal propagates upward: bad
//! descriptors degrade to fallback decoding, short reports are dropped,
//! and sink trouble is absorbed by the resampler's retry.

use heapless::Vec;

use crate::hid::classify::{classify_device, DeviceProfile};
use crate::hid::consumer::ConsumerReport;
use crate::hid::decode::{decode_pointing, decode_pointing_auto};
use crate::hid::descriptor::{parse_report_descriptor, ReportLayout, MAX_LAYOUTS};
use crate::hid::keyboard::KeyboardReport;
use crate::resampler::{PendingBatch, Resampler, TickOutcome};
use crate::sink::{SendError, Sink};

/// Number of wired devices serviced concurrently.
pub const MAX_DEVICES: usize = 2;

/// The USB interface protocol field, used only when the descriptor is
/// unreadable or a composite device leaves routing ambiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolHint {
    #[default]
    None,
    Keyboard,
    Pointing,
}

impl ProtocolHint {
    /// Map the bInterfaceProtocol value of a boot interface.
    pub fn from_interface_protocol(protocol: u8) -> Self {
        match protocol {
            1 => ProtocolHint::Keyboard,
            2 => ProtocolHint::Pointing,
            _ => ProtocolHint::None,
        }
    }
}

/// Opaque handle to an attached device slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceHandle(u8);

/// A report the caller should forward to the sink directly (no
/// resampling). Produced by [`Bridge::on_input_report`] so the wired input
/// path itself never touches the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutboundReport {
    Keyboard([u8; 8]),
    Consumer([u8; 2]),
}

/// Send a dispatched pass-through report.
pub fn forward<S: Sink>(report: &OutboundReport, sink: &mut S) -> Result<(), SendError> {
    match report {
        OutboundReport::Keyboard(bytes) => sink.send_keyboard(bytes),
        OutboundReport::Consumer(bytes) => sink.send_consumer(bytes),
    }
}

struct DeviceSlot {
    active: bool,
    layouts: Vec<ReportLayout, MAX_LAYOUTS>,
    profile: DeviceProfile,
    hint: ProtocolHint,
}

impl DeviceSlot {
    const EMPTY: Self = Self {
        active: false,
        layouts: Vec::new(),
        profile: DeviceProfile {
            keyboard: false,
            pointing: false,
            keyboard_report_id: None,
            consumer_report_id: None,
        },
        hint: ProtocolHint::None,
    };
}

/// The translation core's single aggregate: device table plus resampler.
pub struct Bridge {
    devices: [DeviceSlot; MAX_DEVICES],
    resampler: Resampler,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub const fn new() -> Self {
        Self {
            devices: [DeviceSlot::EMPTY; MAX_DEVICES],
            resampler: Resampler::new(),
        }
    }

    /// Parse and cache the device's descriptor, classify it, and claim a
    /// slot. Returns `None` when every slot is taken.
    ///
    /// A descriptor that yields no role at all falls back to the
    /// transport's protocol hint; such devices decode through the
    /// length-based fallback layouts.
    pub fn on_device_attached(
        &mut self,
        descriptor: &[u8],
        hint: ProtocolHint,
    ) -> Option<(DeviceHandle, DeviceProfile)> {
        let layouts = parse_report_descriptor(descriptor);
        let mut profile = classify_device(descriptor, &layouts);

        if !profile.any() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "descriptor yielded no role ({} bytes); using protocol hint",
                descriptor.len()
            );
            match hint {
                ProtocolHint::Keyboard => profile.keyboard = true,
                ProtocolHint::Pointing => profile.pointing = true,
                ProtocolHint::None => {}
            }
        }

        let idx = self.devices.iter().position(|d| !d.active)?;
        self.devices[idx] = DeviceSlot {
            active: true,
            layouts,
            profile,
            hint,
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "device attached: slot={} keyboard={} pointing={} layouts={}",
            idx,
            profile.keyboard,
            profile.pointing,
            self.devices[idx].layouts.len()
        );

        Some((DeviceHandle(idx as u8), profile))
    }

    /// Release the slot; its layout catalog is dropped.
    pub fn on_device_detached(&mut self, handle: DeviceHandle) {
        if let Some(slot) = self.devices.get_mut(handle.0 as usize) {
            slot.active = false;
            slot.layouts.clear();
            slot.profile = DeviceProfile::default();
        }
    }

    /// Dispatch one raw input report.
    ///
    /// Pointing payloads are decoded and absorbed into the resampler;
    /// keyboard and consumer payloads come back as an [`OutboundReport`]
    /// for the caller to forward from its own context.
    pub fn on_input_report(
        &mut self,
        handle: DeviceHandle,
        data: &[u8],
        t_now_us: u64,
    ) -> Option<OutboundReport> {
        let slot = self.devices.get(handle.0 as usize)?;
        if !slot.active || data.is_empty() {
            return None;
        }
        let profile = slot.profile;

        let uses_ids = slot.layouts.iter().any(|l| l.report_id != 0)
            || profile.keyboard_report_id.is_some()
            || profile.consumer_report_id.is_some();

        if uses_ids {
            let id = data[0];
            if slot
                .layouts
                .iter()
                .any(|l| l.report_id == id && l.is_pointing())
            {
                if let Some(sample) = decode_pointing(&slot.layouts, data) {
                    self.resampler.push(
                        t_now_us,
                        sample.dx,
                        sample.dy,
                        sample.wheel,
                        sample.buttons,
                    );
                }
                return None;
            }
            if profile.keyboard_report_id == Some(id) {
                return keyboard_frame(&data[1..]);
            }
            if profile.consumer_report_id == Some(id) {
                return consumer_frame(&data[1..]);
            }
            #[cfg(feature = "defmt")]
            defmt::debug!("report id {} has no route, dropping", id);
            return None;
        }

        match (profile.keyboard, profile.pointing) {
            (false, true) => {
                if let Some(sample) = decode_pointing_auto(&slot.layouts, data) {
                    self.resampler.push(
                        t_now_us,
                        sample.dx,
                        sample.dy,
                        sample.wheel,
                        sample.buttons,
                    );
                }
                None
            }
            (true, false) => route_keyboardish(data),
            (true, true) => {
                // Composite device without report ids: the protocol hint
                // breaks the tie, then report length.
                match slot.hint {
                    ProtocolHint::Keyboard => route_keyboardish(data),
                    ProtocolHint::Pointing => {
                        if let Some(sample) = decode_pointing_auto(&slot.layouts, data) {
                            self.resampler.push(
                                t_now_us,
                                sample.dx,
                                sample.dy,
                                sample.wheel,
                                sample.buttons,
                            );
                        }
                        None
                    }
                    ProtocolHint::None => {
                        if data.len() >= 8 {
                            route_keyboardish(data)
                        } else {
                            if let Some(sample) = decode_pointing_auto(&slot.layouts, data) {
                                self.resampler.push(
                                    t_now_us,
                                    sample.dx,
                                    sample.dy,
                                    sample.wheel,
                                    sample.buttons,
                                );
                            }
                            None
                        }
                    }
                }
            }
            (false, false) => None,
        }
    }

    /// Sink readiness changed. Transition to not-ready discards buffered
    /// motion: stale deltas replayed on reconnect would teleport the
    /// pointer.
    pub fn on_sink_ready_changed(&mut self, ready: bool, t_now_us: u64) {
        if !ready {
            self.resampler.clear(t_now_us);
            #[cfg(feature = "defmt")]
            defmt::info!("sink not ready: resampler cleared");
        }
    }

    /// The negotiated connection interval changed; retime the tick.
    pub fn on_link_interval_updated(&mut self, units_1_25ms: u16) {
        self.resampler.update_send_interval(units_1_25ms);
    }

    /// One resampler tick: integrate, send, commit or retain.
    pub fn tick<S: Sink>(&mut self, t_now_us: u64, sink: &mut S) -> TickOutcome {
        self.resampler.try_send(t_now_us, sink)
    }

    /// Split-phase tick, for callers that must not hold their lock across
    /// the sink call: preview under the lock, send unlocked, then
    /// [`Bridge::tick_commit`] or [`Bridge::tick_failed`] under the lock.
    pub fn tick_preview(&self, t_now_us: u64) -> Option<PendingBatch> {
        self.resampler.preview(t_now_us)
    }

    pub fn tick_commit(&mut self, batch: &PendingBatch) {
        self.resampler.commit(batch);
    }

    pub fn tick_failed(&mut self) {
        self.resampler.record_failure();
    }

    /// Current tick period in microseconds.
    pub fn send_interval_us(&self) -> u64 {
        self.resampler.send_interval_us()
    }

    /// Resampler diagnostics (overflow/sent/failed counters, queue depth).
    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }
}

/// Keyboard-role report without ids: boot-length payloads forward as
/// keyboard, short 1-2 byte payloads are consumer controls on a separate
/// interface.
fn route_keyboardish(data: &[u8]) -> Option<OutboundReport> {
    if data.len() <= 2 {
        return consumer_frame(data);
    }
    keyboard_frame(data)
}

fn keyboard_frame(payload: &[u8]) -> Option<OutboundReport> {
    match KeyboardReport::from_usb_bytes(payload) {
        Some(report) => Some(OutboundReport::Keyboard(report.to_bytes())),
        None => {
            #[cfg(feature = "defmt")]
            defmt::warn!("keyboard report too short: {} bytes", payload.len());
            None
        }
    }
}

fn consumer_frame(payload: &[u8]) -> Option<OutboundReport> {
    ConsumerReport::from_usb_bytes(payload).map(|r| OutboundReport::Consumer(r.to_bytes()))
}
