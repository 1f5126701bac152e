//! Consumer Control pass-through - media keys, volume, etc.
//!
//! Consumer Control lives on its own usage page (0x0C). The bridge treats
//! the payload as an opaque usage bitmap: whatever the wired device reports
//! (after stripping its report-id byte) is re-emitted over the consumer
//! input characteristic, truncated or zero-padded to 2 bytes.

/// Consumer control report size (2 bytes for usage ID).
pub const CONSUMER_REPORT_SIZE: usize = 2;

/// Consumer Control report.
///
/// A single little-endian usage code; 0 means "nothing pressed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport {
    /// Active consumer control usage (little-endian u16).
    pub usage: u16,
}

impl ConsumerReport {
    /// Create an empty (no keys pressed) report.
    pub const fn empty() -> Self {
        Self { usage: 0 }
    }

    /// Parse from a raw wired-side payload (report id already stripped).
    ///
    /// One-byte payloads (devices with an 8-bit usage field) zero-extend.
    pub fn from_usb_bytes(data: &[u8]) -> Option<Self> {
        match data.len() {
            0 => None,
            1 => Some(Self {
                usage: data[0] as u16,
            }),
            _ => Some(Self {
                usage: u16::from_le_bytes([data[0], data[1]]),
            }),
        }
    }

    /// Encode into the 2-byte wire format.
    pub fn to_bytes(&self) -> [u8; CONSUMER_REPORT_SIZE] {
        self.usage.to_le_bytes()
    }

    /// Serialise into a byte slice.
    /// Returns the number of bytes written (always 2 on success).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < CONSUMER_REPORT_SIZE {
            return 0;
        }
        buf[..CONSUMER_REPORT_SIZE].copy_from_slice(&self.to_bytes());
        CONSUMER_REPORT_SIZE
    }

    /// Check if any control is active.
    pub fn is_empty(&self) -> bool {
        self.usage == 0
    }
}
