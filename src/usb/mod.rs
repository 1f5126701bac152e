//! Wired-side front end.
//!
//! The USB host itself lives in an external bridge IC that enumerates the
//! wired device and streams descriptors and raw input reports over UART
//! (see [`frame`] for the wire format). This module owns the UART and
//! turns that stream into core events:
//!
//! 1. `Attached` frames parse + classify the descriptor and claim a
//!    device slot.
//! 2. `Report` frames dispatch through the bridge; pointing input lands
//!    in the resampler, keyboard/consumer input is queued for the BLE
//!    writer.
//! 3. `Detached` frames release the slot.
//!
//! Keyboard LED state from the BLE host travels the other way as
//! `SET_LEDS` frames.

pub mod frame;
pub mod source;
