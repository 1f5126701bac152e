//! Raw input report decoding.
//!
//! Applies a parsed [`ReportLayout`] to the bytes of one input report and
//! produces a normalized motion sample. When no layout catalog exists
//! (descriptor missing or unparseable) a fixed fallback layout is selected
//! by report length, matching the de-facto formats wired mice actually
//! ship: boot protocol, boot-plus-wheel, and the common id-prefixed
//! five/eight-byte variants.
//!
//! The decoder never returns partial state: a report too short for the
//! selected layout decodes to nothing at all.

use super::bits::{get_bits_s, get_bits_u};
use super::descriptor::ReportLayout;
use super::mouse::MouseReport;

/// Decode a pointing report using the device's layout catalog.
///
/// When any catalog entry carries a report id, `data[0]` selects the
/// layout and field offsets apply from `data[1]` onward.
pub fn decode_pointing(layouts: &[ReportLayout], data: &[u8]) -> Option<MouseReport> {
    if data.is_empty() {
        return None;
    }

    let uses_ids = layouts.iter().any(|l| l.report_id != 0);
    let (layout, payload) = if uses_ids {
        let layout = layouts.iter().find(|l| l.report_id == data[0])?;
        (layout, &data[1..])
    } else {
        (layouts.iter().find(|l| l.is_pointing())?, data)
    };

    if !layout.is_pointing() {
        return None;
    }

    if layout.size_bits as usize > payload.len() * 8 {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "pointing report too short: {} bits declared, {} bytes received",
            layout.size_bits,
            payload.len()
        );
        return None;
    }

    let buttons = get_bits_u(
        payload,
        layout.buttons.offset as usize,
        layout.buttons.size as usize,
    ) as u8;
    let dx = get_bits_s(payload, layout.x.offset as usize, layout.x.size as usize) as i16;
    let dy = get_bits_s(payload, layout.y.offset as usize, layout.y.size as usize) as i16;
    let wheel = get_bits_s(
        payload,
        layout.wheel.offset as usize,
        layout.wheel.size as usize,
    ) as i8;

    Some(MouseReport {
        buttons,
        dx,
        dy,
        wheel,
    })
}

/// Decode a pointing report with no layout catalog, by report length.
///
/// - 3 bytes: boot protocol `[buttons, x, y]`
/// - 4 bytes: boot protocol plus wheel
/// - 5 or 8 bytes: id-prefixed `[id, buttons, x, y, wheel, pad...]`
pub fn decode_pointing_fallback(data: &[u8]) -> Option<MouseReport> {
    match data.len() {
        3 => Some(MouseReport {
            buttons: data[0],
            dx: data[1] as i8 as i16,
            dy: data[2] as i8 as i16,
            wheel: 0,
        }),
        4 => Some(MouseReport {
            buttons: data[0],
            dx: data[1] as i8 as i16,
            dy: data[2] as i8 as i16,
            wheel: data[3] as i8,
        }),
        5 | 8 => Some(MouseReport {
            buttons: data[1],
            dx: data[2] as i8 as i16,
            dy: data[3] as i8 as i16,
            wheel: data[4] as i8,
        }),
        _ => {
            #[cfg(feature = "defmt")]
            defmt::warn!("unrecognized pointing report length: {}", data.len());
            None
        }
    }
}

/// Decode with the catalog when it describes a pointing report, otherwise
/// fall back by length. A catalog without axes (parser salvaged only
/// non-pointing sections) is as good as no catalog here.
pub fn decode_pointing_auto(layouts: &[ReportLayout], data: &[u8]) -> Option<MouseReport> {
    if layouts.iter().any(|l| l.is_pointing()) {
        decode_pointing(layouts, data)
    } else {
        decode_pointing_fallback(data)
    }
}
