//! Device role classification from a report descriptor.
//!
//! The USB interface's protocol field is a hint, not the truth: composite
//! devices (wireless dongles, KVM front ends, hubs with vendor pages)
//! routinely advertise roles they cannot fill. Classification therefore
//! works from the descriptor itself, with two independent signals:
//!
//! 1. **Layout heuristic** - a parsed layout carrying both X and Y axes
//!    marks the device as a pointing device.
//! 2. **Structural scan** - application collections are walked directly.
//!    A Generic Desktop `Mouse` collection adds a pointing hint. A
//!    `Keyboard`/`Keypad` collection makes the device a keyboard
//!    *candidate*, confirmed only when its Input items on the Key Codes
//!    page accumulate a report count of at least
//!    [`KEYBOARD_MIN_KEY_COUNT`]. Composite devices that declare a
//!    Keyboard usage but define only a couple of modifier bits stay
//!    unconfirmed.
//!
//! The scan also records which report ids carry keyboard and consumer
//! payloads so the bridge can dispatch multiplexed reports.

use super::descriptor::{
    ItemClass, ItemReader, ReportLayout, COLLECTION_APPLICATION, PAGE_CONSUMER, PAGE_GENERIC_DESKTOP,
    PAGE_KEY_CODES, USAGE_KEYBOARD, USAGE_MOUSE,
};

/// Minimum cumulative Key Codes report count inside a Keyboard collection
/// before the keyboard role is confirmed.
pub const KEYBOARD_MIN_KEY_COUNT: u32 = 3;

const USAGE_KEYPAD: u16 = 0x07;

/// Roles and dispatch ids derived from one device's report descriptor.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceProfile {
    /// Device produces keyboard input reports.
    pub keyboard: bool,
    /// Device produces pointing (mouse/trackball/touchpad-relative) reports.
    pub pointing: bool,
    /// Report id carrying keyboard payloads, when the device multiplexes.
    pub keyboard_report_id: Option<u8>,
    /// Report id carrying consumer-control payloads, when present.
    pub consumer_report_id: Option<u8>,
}

impl DeviceProfile {
    /// True when the descriptor yielded at least one usable role.
    pub fn any(&self) -> bool {
        self.keyboard || self.pointing
    }
}

/// Classify a device from its descriptor bytes and the layouts parsed from
/// them. Pure function; a malformed tail degrades to whatever the
/// well-formed prefix established.
pub fn classify_device(descriptor: &[u8], layouts: &[ReportLayout]) -> DeviceProfile {
    let mut profile = DeviceProfile::default();

    if layouts.iter().any(|l| l.is_pointing()) {
        profile.pointing = true;
    }

    // Structural scan state. Only the globals the scan depends on are
    // tracked; Push/Pop preserves them like the full parser does.
    let mut usage_page: u16 = 0;
    let mut report_count: u16 = 0;
    let mut report_id: u8 = 0;
    let mut stack: heapless::Vec<(u16, u16), 4> = heapless::Vec::new();

    let mut last_usage: Option<(u16, u16)> = None;
    let mut depth: u32 = 0;
    let mut keyboard_depth: Option<u32> = None;
    let mut key_count: u32 = 0;

    for item in ItemReader::new(descriptor) {
        match item.class {
            ItemClass::Main => {
                match item.tag {
                    // Input
                    0x8 => {
                        if keyboard_depth.is_some() && usage_page == PAGE_KEY_CODES {
                            key_count += report_count as u32;
                            if report_id != 0 && profile.keyboard_report_id.is_none() {
                                profile.keyboard_report_id = Some(report_id);
                            }
                        }
                        if usage_page == PAGE_CONSUMER
                            && report_id != 0
                            && profile.consumer_report_id.is_none()
                        {
                            profile.consumer_report_id = Some(report_id);
                        }
                    }
                    // Collection
                    0xA => {
                        depth += 1;
                        if item.value == COLLECTION_APPLICATION {
                            match last_usage {
                                Some((PAGE_GENERIC_DESKTOP, USAGE_MOUSE)) => {
                                    profile.pointing = true;
                                }
                                Some((PAGE_GENERIC_DESKTOP, USAGE_KEYBOARD))
                                | Some((PAGE_GENERIC_DESKTOP, USAGE_KEYPAD)) => {
                                    if keyboard_depth.is_none() {
                                        keyboard_depth = Some(depth);
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                    // End Collection
                    0xC => {
                        depth = depth.saturating_sub(1);
                        if keyboard_depth.is_some_and(|d| depth < d) {
                            keyboard_depth = None;
                        }
                    }
                    _ => {}
                }
                last_usage = None;
            }
            ItemClass::Global => match item.tag {
                0x0 => usage_page = item.value as u16,
                0x8 => {
                    if item.value != 0 {
                        report_id = item.value as u8;
                    }
                }
                0x9 => report_count = item.value as u16,
                // Push / Pop
                0xA => {
                    let _ = stack.push((usage_page, report_count));
                }
                0xB => {
                    if let Some((page, count)) = stack.pop() {
                        usage_page = page;
                        report_count = count;
                    }
                }
                _ => {}
            },
            ItemClass::Local => {
                // Usage (extended form carries its page in the high half).
                if item.tag == 0x0 {
                    last_usage = Some(if item.data_len == 4 {
                        ((item.value >> 16) as u16, item.value as u16)
                    } else {
                        (usage_page, item.value as u16)
                    });
                }
            }
            ItemClass::Reserved => {}
        }
    }

    if key_count >= KEYBOARD_MIN_KEY_COUNT {
        profile.keyboard = true;
    }

    profile
}
