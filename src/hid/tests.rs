//! Host-side tests for the HID translation core: descriptor parsing,
//! classification, and report decoding.

use super::bits::{get_bits_s, get_bits_u};
use super::classify::classify_device;
use super::decode::{decode_pointing, decode_pointing_auto, decode_pointing_fallback};
use super::descriptor::{parse_report_descriptor, BitField, ReportLayout};
use super::mouse::MouseReport;
use super::report_map::{REPORT_ID_CONSUMER, REPORT_ID_KEYBOARD, REPORT_ID_MOUSE, REPORT_MAP};

// ════════════════════════════════════════════════════════════════════════
// Reference descriptors
// ════════════════════════════════════════════════════════════════════════

/// Classic boot-protocol mouse: 3 buttons, 8-bit X/Y, 8-bit wheel, no
/// report id.
const BOOT_MOUSE: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (1)
    0x29, 0x03, //     Usage Maximum (3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant) - padding
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0x09, 0x38, //     Usage (Wheel)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection (Physical)
    0xC0, // End Collection (Application)
];

/// Gaming-style mouse on report id 2: 16 buttons, 12-bit X/Y, 8-bit
/// wheel, one byte of padding. 56 payload bits total.
const WIDE_MOUSE: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x02, //   Report ID (2)
    0x05, 0x09, //   Usage Page (Buttons)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x10, //   Usage Maximum (16)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x10, //   Report Count (16)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable)
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x16, 0x01, 0xF8, // Logical Minimum (-2047)
    0x26, 0xFF, 0x07, // Logical Maximum (2047)
    0x75, 0x0C, //   Report Size (12)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x06, //   Input (Data, Variable, Relative)
    0x09, 0x38, //   Usage (Wheel)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x06, //   Input (Data, Variable, Relative)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x01, //   Input (Constant) - padding
    0xC0, // End Collection
];

/// Mouse with a horizontal pan wheel (Consumer AC Pan) after the vertical
/// wheel.
const PAN_MOUSE: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x05, 0x09, //   Usage Page (Buttons)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x81, 0x01, //   Input (Constant)
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x06, //   Input (Data, Variable, Relative)
    0x09, 0x38, //   Usage (Wheel)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x06, //   Input (Data, Variable, Relative)
    0x05, 0x0C, //   Usage Page (Consumer)
    0x0A, 0x38, 0x02, // Usage (AC Pan)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x06, //   Input (Data, Variable, Relative)
    0xC0, // End Collection
];

/// Standard boot keyboard: modifiers, reserved byte, LED output block,
/// six-key array. No pointing fields at all.
const BOOT_KEYBOARD: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant) - reserved
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x91, 0x02, //   Output (Data, Variable)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

/// Hub-style composite that advertises a Keyboard collection but defines
/// only two modifier bits. Must not be confirmed as a keyboard.
const FAKE_KEYBOARD: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE1, //   Usage Maximum (Left Shift)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Variable)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x06, //   Report Size (6)
    0x81, 0x01, //   Input (Constant)
    0xC0, // End Collection
];

fn layout_by_id(layouts: &[ReportLayout], id: u8) -> &ReportLayout {
    layouts
        .iter()
        .find(|l| l.report_id == id)
        .expect("layout for report id")
}

fn assert_fields_in_bounds(layout: &ReportLayout) {
    for field in [
        &layout.buttons,
        &layout.x,
        &layout.y,
        &layout.wheel,
        &layout.pan,
    ] {
        if field.present() {
            assert!(
                field.offset + field.size <= layout.size_bits,
                "field {:?} exceeds report size {}",
                field,
                layout.size_bits
            );
        }
    }
}

// ════════════════════════════════════════════════════════════════════════
// Descriptor parser
// ════════════════════════════════════════════════════════════════════════

#[test]
fn boot_mouse_layout() {
    let layouts = parse_report_descriptor(BOOT_MOUSE);
    assert_eq!(layouts.len(), 1);
    let l = &layouts[0];
    assert_eq!(l.report_id, 0);
    assert_eq!(l.buttons, BitField { offset: 0, size: 3 });
    assert_eq!(l.x, BitField { offset: 8, size: 8 });
    assert_eq!(l.y, BitField { offset: 16, size: 8 });
    assert_eq!(l.wheel, BitField { offset: 24, size: 8 });
    assert!(!l.pan.present());
    assert_eq!(l.size_bits, 32);
    assert_fields_in_bounds(l);
}

#[test]
fn wide_mouse_layout_with_report_id() {
    let layouts = parse_report_descriptor(WIDE_MOUSE);
    assert_eq!(layouts.len(), 1);
    let l = layout_by_id(&layouts, 2);
    assert_eq!(l.buttons, BitField { offset: 0, size: 16 });
    assert_eq!(l.x, BitField { offset: 16, size: 12 });
    assert_eq!(l.y, BitField { offset: 28, size: 12 });
    assert_eq!(l.wheel, BitField { offset: 40, size: 8 });
    // trailing constant padding advances the cursor
    assert_eq!(l.size_bits, 56);
    assert_fields_in_bounds(l);
}

#[test]
fn pan_wheel_is_recognized() {
    let layouts = parse_report_descriptor(PAN_MOUSE);
    let l = &layouts[0];
    assert_eq!(l.wheel, BitField { offset: 24, size: 8 });
    assert_eq!(l.pan, BitField { offset: 32, size: 8 });
    assert_eq!(l.size_bits, 40);
    assert_fields_in_bounds(l);
}

#[test]
fn keyboard_layout_has_no_pointing_fields() {
    let layouts = parse_report_descriptor(BOOT_KEYBOARD);
    assert_eq!(layouts.len(), 1);
    let l = &layouts[0];
    assert!(!l.is_pointing());
    assert!(!l.buttons.present());
    // modifiers + reserved + 6 key codes; LED output does not count
    assert_eq!(l.size_bits, 64);
}

#[test]
fn composite_report_map_parses_all_ids() {
    let layouts = parse_report_descriptor(REPORT_MAP);
    assert_eq!(layouts.len(), 3);

    let kb = layout_by_id(&layouts, REPORT_ID_KEYBOARD);
    assert!(!kb.is_pointing());
    assert_eq!(kb.size_bits, 64);

    let mouse = layout_by_id(&layouts, REPORT_ID_MOUSE);
    assert_eq!(mouse.buttons, BitField { offset: 0, size: 5 });
    assert_eq!(mouse.x, BitField { offset: 8, size: 16 });
    assert_eq!(mouse.y, BitField { offset: 24, size: 16 });
    assert_eq!(mouse.wheel, BitField { offset: 40, size: 8 });
    assert_eq!(mouse.size_bits, 48);
    assert_fields_in_bounds(mouse);

    // the consumer array spans usages including AC Pan, but array fields
    // never populate pointing slots
    let consumer = layout_by_id(&layouts, REPORT_ID_CONSUMER);
    assert!(!consumer.pan.present());
    assert_eq!(consumer.size_bits, 16);
}

#[test]
fn interleaved_report_ids_resume_their_cursor() {
    // id 2 declares X, id 3 declares buttons, id 2 resumes with Y
    let desc: &[u8] = &[
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, // Mouse collection
        0x85, 0x02, // Report ID (2)
        0x09, 0x30, 0x15, 0x81, 0x25, 0x7F, 0x75, 0x08, 0x95, 0x01, 0x81, 0x06, // X
        0x85, 0x03, // Report ID (3)
        0x05, 0x09, 0x19, 0x01, 0x29, 0x08, 0x15, 0x00, 0x25, 0x01, //
        0x75, 0x01, 0x95, 0x08, 0x81, 0x02, // 8 buttons
        0x85, 0x02, // Report ID (2) again
        0x05, 0x01, 0x09, 0x31, 0x15, 0x81, 0x25, 0x7F, 0x75, 0x08, 0x95, 0x01, 0x81,
        0x06, // Y
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    assert_eq!(layouts.len(), 2);

    let two = layout_by_id(&layouts, 2);
    assert_eq!(two.x, BitField { offset: 0, size: 8 });
    assert_eq!(two.y, BitField { offset: 8, size: 8 });
    assert_eq!(two.size_bits, 16);

    let three = layout_by_id(&layouts, 3);
    assert_eq!(three.buttons, BitField { offset: 0, size: 8 });
    assert_eq!(three.size_bits, 8);
}

#[test]
fn split_button_fields_extend_the_count() {
    let desc: &[u8] = &[
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, // Mouse collection
        0x05, 0x09, 0x19, 0x01, 0x29, 0x03, 0x15, 0x00, 0x25, 0x01, //
        0x75, 0x01, 0x95, 0x03, 0x81, 0x02, // buttons 1-3
        0x19, 0x04, 0x29, 0x05, 0x95, 0x02, 0x81, 0x02, // buttons 4-5
        0x95, 0x03, 0x81, 0x01, // 3 bits padding
        0x05, 0x01, 0x09, 0x30, 0x09, 0x31, 0x15, 0x81, 0x25, 0x7F, //
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, // X, Y
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    let l = &layouts[0];
    assert_eq!(l.buttons, BitField { offset: 0, size: 5 });
    assert_eq!(l.x, BitField { offset: 8, size: 8 });
    assert_eq!(l.y, BitField { offset: 16, size: 8 });
}

#[test]
fn usage_max_before_min_forms_a_range() {
    let desc: &[u8] = &[
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, //
        0x05, 0x09, //
        0x29, 0x03, 0x19, 0x01, // Usage Maximum then Minimum
        0x15, 0x00, 0x25, 0x01, 0x75, 0x01, 0x95, 0x03, 0x81, 0x02, //
        0x95, 0x05, 0x81, 0x01, //
        0x05, 0x01, 0x09, 0x30, 0x09, 0x31, 0x15, 0x81, 0x25, 0x7F, //
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, //
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    assert_eq!(layouts[0].buttons, BitField { offset: 0, size: 3 });
}

#[test]
fn second_usage_minimum_overwrites_pending() {
    let desc: &[u8] = &[
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, //
        0x05, 0x09, //
        0x19, 0x05, // Usage Minimum (5) - stale
        0x19, 0x01, // Usage Minimum (1) - overwrites
        0x29, 0x03, // Usage Maximum (3)
        0x15, 0x00, 0x25, 0x01, 0x75, 0x01, 0x95, 0x03, 0x81, 0x02, //
        0x95, 0x05, 0x81, 0x01, //
        0x05, 0x01, 0x09, 0x30, 0x09, 0x31, 0x15, 0x81, 0x25, 0x7F, //
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, //
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    assert_eq!(layouts[0].buttons, BitField { offset: 0, size: 3 });
}

#[test]
fn push_pop_restores_usage_page() {
    let desc: &[u8] = &[
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, // Mouse collection, GD page
        0xA4, // Push
        0x05, 0x09, 0x19, 0x01, 0x29, 0x03, 0x15, 0x00, 0x25, 0x01, //
        0x75, 0x01, 0x95, 0x03, 0x81, 0x02, // buttons on Button page
        0x95, 0x01, 0x75, 0x05, 0x81, 0x01, // padding
        0xB4, // Pop - back to Generic Desktop
        0x09, 0x30, 0x09, 0x31, 0x15, 0x81, 0x25, 0x7F, //
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, // bare usages resolve via GD
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    let l = &layouts[0];
    assert_eq!(l.buttons, BitField { offset: 0, size: 3 });
    assert_eq!(l.x, BitField { offset: 8, size: 8 });
    assert_eq!(l.y, BitField { offset: 16, size: 8 });
}

#[test]
fn truncated_descriptor_yields_nothing() {
    // prefix promises one data byte that never arrives
    assert!(parse_report_descriptor(&[0x05]).is_empty());
    assert!(parse_report_descriptor(&[]).is_empty());
}

#[test]
fn malformed_tail_keeps_earlier_layouts() {
    let mut desc = heapless::Vec::<u8, 128>::new();
    desc.extend_from_slice(BOOT_MOUSE).unwrap();
    desc.push(0x95).unwrap(); // truncated Report Count
    let layouts = parse_report_descriptor(&desc);
    assert_eq!(layouts.len(), 1);
    assert!(layouts[0].is_pointing());
}

#[test]
fn push_stack_overflow_stops_the_scan() {
    // five pushes exceed the supported nesting depth
    let desc: &[u8] = &[
        0xA4, 0xA4, 0xA4, 0xA4, 0xA4, //
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, 0x09, 0x30, 0x09, 0x31, //
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, 0xC0,
    ];
    assert!(parse_report_descriptor(desc).is_empty());
}

#[test]
fn unbalanced_pop_stops_the_scan() {
    let desc: &[u8] = &[0xB4, 0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, 0xC0];
    assert!(parse_report_descriptor(desc).is_empty());
}

#[test]
fn inverted_logical_range_stops_the_scan() {
    let desc: &[u8] = &[
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, //
        0x09, 0x30, 0x09, 0x31, //
        0x15, 0x05, // Logical Minimum (5)
        0x25, 0x01, // Logical Maximum (1) - inverted
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, //
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    assert!(layouts.iter().all(|l| !l.is_pointing()));
}

#[test]
fn unsigned_logical_maximum_is_not_inverted() {
    // Logical Maximum 0xFF in a one-byte item sign-extends to -1; the
    // parser must recognize the unsigned intent instead of bailing.
    let desc: &[u8] = &[
        0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, //
        0x09, 0x30, 0x09, 0x31, //
        0x15, 0x00, // Logical Minimum (0)
        0x25, 0xFF, // Logical Maximum (255), one-byte encoding
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, //
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    assert_eq!(layouts.len(), 1);
    assert!(layouts[0].is_pointing());
    assert_eq!(layouts[0].size_bits, 16);
}

#[test]
fn long_items_are_skipped() {
    let mut desc = heapless::Vec::<u8, 128>::new();
    desc.extend_from_slice(&[0xFE, 0x02, 0x41, 0xAA, 0xBB]).unwrap(); // long item
    desc.extend_from_slice(BOOT_MOUSE).unwrap();
    let layouts = parse_report_descriptor(&desc);
    assert_eq!(layouts.len(), 1);
    assert!(layouts[0].is_pointing());
}

// ════════════════════════════════════════════════════════════════════════
// Device classifier
// ════════════════════════════════════════════════════════════════════════

#[test]
fn classify_boot_mouse() {
    let layouts = parse_report_descriptor(BOOT_MOUSE);
    let profile = classify_device(BOOT_MOUSE, &layouts);
    assert!(profile.pointing);
    assert!(!profile.keyboard);
}

#[test]
fn classify_boot_keyboard() {
    let layouts = parse_report_descriptor(BOOT_KEYBOARD);
    let profile = classify_device(BOOT_KEYBOARD, &layouts);
    assert!(profile.keyboard);
    assert!(!profile.pointing);
    assert_eq!(profile.keyboard_report_id, None);
}

#[test]
fn classify_rejects_token_keyboard_collection() {
    // two modifier bits are not a keyboard
    let layouts = parse_report_descriptor(FAKE_KEYBOARD);
    let profile = classify_device(FAKE_KEYBOARD, &layouts);
    assert!(!profile.keyboard);
    assert!(!profile.pointing);
}

#[test]
fn classify_composite_report_map() {
    let layouts = parse_report_descriptor(REPORT_MAP);
    let profile = classify_device(REPORT_MAP, &layouts);
    assert!(profile.keyboard);
    assert!(profile.pointing);
    assert_eq!(profile.keyboard_report_id, Some(REPORT_ID_KEYBOARD));
    assert_eq!(profile.consumer_report_id, Some(REPORT_ID_CONSUMER));
}

#[test]
fn classify_pointing_from_layout_without_mouse_collection() {
    // a digitizer-style descriptor: X/Y on Generic Desktop but the
    // application collection is not Mouse
    let desc: &[u8] = &[
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x08, // Usage (Multi-axis Controller)
        0xA1, 0x01, // Collection (Application)
        0x09, 0x30, 0x09, 0x31, 0x15, 0x81, 0x25, 0x7F, //
        0x75, 0x08, 0x95, 0x02, 0x81, 0x06, //
        0xC0,
    ];
    let layouts = parse_report_descriptor(desc);
    let profile = classify_device(desc, &layouts);
    assert!(profile.pointing);
}

#[test]
fn classify_is_pure_and_descriptor_driven() {
    // garbage in, nothing out - the transport hint is applied by the
    // bridge, not the classifier
    let profile = classify_device(&[0xFF, 0xFF, 0xFF], &[]);
    assert!(!profile.any());
}

// ════════════════════════════════════════════════════════════════════════
// Report decoder
// ════════════════════════════════════════════════════════════════════════

#[test]
fn decode_boot_mouse_report() {
    let layouts = parse_report_descriptor(BOOT_MOUSE);
    let report = decode_pointing(&layouts, &[0x01, 0x05, 0xFB, 0x01]).unwrap();
    assert_eq!(
        report,
        MouseReport {
            buttons: 0x01,
            dx: 5,
            dy: -5,
            wheel: 1,
        }
    );
}

#[test]
fn decode_wide_mouse_report_by_id() {
    let layouts = parse_report_descriptor(WIDE_MOUSE);
    // id 2, buttons 0x0002, X = -1 (12-bit), Y = 0, wheel = 5, padding
    let raw = [0x02, 0x02, 0x00, 0xFF, 0x0F, 0x00, 0x05, 0x00];
    let report = decode_pointing(&layouts, &raw).unwrap();
    assert_eq!(
        report,
        MouseReport {
            buttons: 0x02,
            dx: -1,
            dy: 0,
            wheel: 5,
        }
    );
}

#[test]
fn decode_rejects_unknown_report_id() {
    let layouts = parse_report_descriptor(WIDE_MOUSE);
    assert!(decode_pointing(&layouts, &[0x07, 0x00, 0x00]).is_none());
}

#[test]
fn decode_rejects_report_shorter_than_layout() {
    let layouts = parse_report_descriptor(WIDE_MOUSE);
    // layout wants 56 payload bits, only 5 bytes follow the id
    assert!(decode_pointing(&layouts, &[0x02, 0x02, 0x00, 0xFF, 0x0F, 0x00]).is_none());
}

#[test]
fn decode_never_returns_partial_state() {
    let layouts = parse_report_descriptor(BOOT_MOUSE);
    assert!(decode_pointing(&layouts, &[]).is_none());
    assert!(decode_pointing(&layouts, &[0x01, 0x05, 0xFB]).is_none());
}

#[test]
fn decode_composite_map_mouse_payload() {
    let layouts = parse_report_descriptor(REPORT_MAP);
    // our own outbound format decodes back: buttons 0x11, dx 300, dy -2,
    // wheel -1
    let dx = 300i16.to_le_bytes();
    let dy = (-2i16).to_le_bytes();
    let raw = [REPORT_ID_MOUSE, 0x11, dx[0], dx[1], dy[0], dy[1], 0xFF];
    let report = decode_pointing(&layouts, &raw).unwrap();
    assert_eq!(
        report,
        MouseReport {
            buttons: 0x11,
            dx: 300,
            dy: -2,
            wheel: -1,
        }
    );
}

#[test]
fn fallback_boot_protocol_lengths() {
    assert_eq!(
        decode_pointing_fallback(&[0x01, 0x05, 0xFB]).unwrap(),
        MouseReport {
            buttons: 0x01,
            dx: 5,
            dy: -5,
            wheel: 0,
        }
    );
    assert_eq!(
        decode_pointing_fallback(&[0x00, 0x80, 0x7F, 0xFE]).unwrap(),
        MouseReport {
            buttons: 0x00,
            dx: -128,
            dy: 127,
            wheel: -2,
        }
    );
    // id-prefixed variants
    assert_eq!(
        decode_pointing_fallback(&[0x02, 0x04, 0x0A, 0xF6, 0x01]).unwrap(),
        MouseReport {
            buttons: 0x04,
            dx: 10,
            dy: -10,
            wheel: 1,
        }
    );
    assert_eq!(
        decode_pointing_fallback(&[0x02, 0x04, 0x0A, 0xF6, 0x01, 0x00, 0x00, 0x00]).unwrap(),
        MouseReport {
            buttons: 0x04,
            dx: 10,
            dy: -10,
            wheel: 1,
        }
    );
}

#[test]
fn fallback_rejects_odd_lengths() {
    assert!(decode_pointing_fallback(&[]).is_none());
    assert!(decode_pointing_fallback(&[0x01]).is_none());
    assert!(decode_pointing_fallback(&[0x01, 0x02]).is_none());
    assert!(decode_pointing_fallback(&[0; 6]).is_none());
    assert!(decode_pointing_fallback(&[0; 7]).is_none());
    assert!(decode_pointing_fallback(&[0; 9]).is_none());
}

#[test]
fn decode_auto_prefers_catalog() {
    let layouts = parse_report_descriptor(BOOT_MOUSE);
    // 4 bytes: catalog decodes wheel, fallback would too, but the catalog
    // path must be the one taken (catalog rejects nothing here)
    let with_catalog = decode_pointing_auto(&layouts, &[0x01, 0x05, 0xFB, 0x01]).unwrap();
    assert_eq!(with_catalog.wheel, 1);

    let no_catalog = decode_pointing_auto(&[], &[0x01, 0x05, 0xFB]).unwrap();
    assert_eq!(no_catalog.dx, 5);
}

// ════════════════════════════════════════════════════════════════════════
// Round-trip: encode per layout, decode, compare
// ════════════════════════════════════════════════════════════════════════

/// Pack a tuple into a buffer following a layout, LSB-first.
fn encode_per_layout(l: &ReportLayout, buttons: u32, dx: i32, dy: i32, wheel: i32) -> [u8; 8] {
    let mut buf = [0u8; 8];
    let mut put = |offset: u16, size: u16, value: u32| {
        for i in 0..size as usize {
            if (value >> i) & 1 != 0 {
                let bit = offset as usize + i;
                buf[bit / 8] |= 1 << (bit % 8);
            }
        }
    };
    put(l.buttons.offset, l.buttons.size, buttons);
    put(l.x.offset, l.x.size, dx as u32);
    put(l.y.offset, l.y.size, dy as u32);
    put(l.wheel.offset, l.wheel.size, wheel as u32);
    buf
}

#[test]
fn parser_then_decoder_round_trip() {
    let layouts = parse_report_descriptor(WIDE_MOUSE);
    let l = layout_by_id(&layouts, 2);

    for (buttons, dx, dy, wheel) in [
        (0x0001u32, 1i32, -1i32, 0i32),
        (0x8001, -2047, 2047, -127),
        (0x0000, 0, 0, 127),
    ] {
        let payload = encode_per_layout(l, buttons, dx, dy, wheel);
        let mut raw = [0u8; 9];
        raw[0] = 2;
        raw[1..8].copy_from_slice(&payload[..7]);

        let report = decode_pointing(&layouts, &raw[..8]).unwrap();
        assert_eq!(report.buttons, buttons as u8);
        assert_eq!(report.dx, dx as i16);
        assert_eq!(report.dy, dy as i16);
        assert_eq!(report.wheel, wheel as i8);
    }
}

// ════════════════════════════════════════════════════════════════════════
// Bit extraction spot checks against layouts
// ════════════════════════════════════════════════════════════════════════

#[test]
fn layout_driven_bit_extraction() {
    let layouts = parse_report_descriptor(BOOT_MOUSE);
    let l = &layouts[0];
    let payload = [0x05, 0xF6, 0x0A, 0xFF];
    assert_eq!(
        get_bits_u(&payload, l.buttons.offset as usize, l.buttons.size as usize),
        0x05
    );
    assert_eq!(get_bits_s(&payload, l.x.offset as usize, l.x.size as usize), -10);
    assert_eq!(get_bits_s(&payload, l.y.offset as usize, l.y.size as usize), 10);
    assert_eq!(
        get_bits_s(&payload, l.wheel.offset as usize, l.wheel.size as usize),
        -1
    );
}
