//! Motion resampler: decouples the bursty wired input stream from the
//! fixed-cadence BLE notification tick.
//!
//! A wired mouse can report at up to 1 kHz in bursts; a BLE connection
//! event fires at the negotiated interval (7.5 ms and up). The resampler
//! buffers timestamped pointing events in a bounded ring, and on each tick
//! integrates the events that fall inside the elapsed window into one
//! outbound report. Motion that exceeds the outbound field width is carried
//! over as a residual instead of being discarded, and a failed notification
//! leaves every piece of state untouched so the same window is retried on
//! the next tick.
//!
//! ## Two-phase commit
//!
//! `try_send` previews the ring read-only, encodes, sends, and only then
//! consumes. Pop-then-rollback schemes race with the producer: a push
//! landing between the pop and the rollback is clobbered or reordered.
//! With a read-only preview there is nothing to roll back, and the lock
//! guarding the ring never has to be held across the send. Callers that
//! split the phases around a lock use [`Resampler::preview`] and
//! [`Resampler::commit`] directly; [`Resampler::try_send`] composes them.

use crate::hid::mouse::MouseReport;
use crate::sink::{SendError, Sink};

/// Event ring capacity. Power of two; 128 entries absorb a 1 kHz burst
/// lasting longer than a whole 100 ms supervision hiccup.
pub const RING_CAPACITY: usize = 128;
const RING_MASK: usize = RING_CAPACITY - 1;

/// Default send interval: 7.5 ms, the shortest BLE connection interval.
pub const DEFAULT_SEND_INTERVAL_US: u64 = 7_500;

/// One BLE connection-interval unit is 1.25 ms.
pub const INTERVAL_UNIT_US: u64 = 1_250;

/// Outbound X/Y clamp. -32768 is avoided: some hosts treat it as
/// "no change".
pub const AXIS_CLAMP: i32 = 32767;

/// Outbound wheel clamp.
pub const WHEEL_CLAMP: i32 = 127;

/// Event flag: this event changed the button state relative to the
/// previous event from the same source.
pub const EVENT_BUTTONS_CHANGED: u8 = 0x01;

/// One timestamped pointing event as produced by the wired input path.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointingEvent {
    pub t_us: u64,
    pub dx: i16,
    pub dy: i16,
    pub wheel: i8,
    pub buttons: u8,
    pub flags: u8,
}

/// Result of one resampler tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Nothing to send: no motion, no button edge.
    Idle,
    /// Sink reported not-ready before the preview; no state touched.
    SinkNotReady,
    /// Report sent and window committed.
    Sent,
    /// Sink refused the report (`SendError::NotReady`); window retained.
    Deferred,
    /// Transient transport failure; window retained for retry.
    Failed,
}

/// Everything phase 2 computed, carried between preview and commit.
///
/// The batch is a pure value: dropping it without committing leaves the
/// resampler exactly as it was.
#[derive(Clone, Copy, Debug)]
pub struct PendingBatch {
    frame: [u8; 6],
    num_to_consume: usize,
    residual_dx: i32,
    residual_dy: i32,
    residual_wheel: i32,
    buttons: u8,
    t_now_us: u64,
}

impl PendingBatch {
    /// The encoded 6-byte pointing report for this window.
    pub fn frame(&self) -> &[u8; 6] {
        &self.frame
    }
}

/// Time-windowed integrator between producer (wired input) and consumer
/// (BLE tick).
pub struct Resampler {
    ring: [PointingEvent; RING_CAPACITY],
    head: usize,
    tail: usize,
    count: usize,

    t_last_send_us: u64,
    residual_dx: i32,
    residual_dy: i32,
    residual_wheel: i32,
    last_sent_buttons: u8,
    /// Written and read only by the producer, to flag button edges.
    last_seen_buttons: u8,

    send_interval_us: u64,

    overflow_count: u32,
    sent_count: u32,
    failed_count: u32,
}

impl Resampler {
    pub const fn new() -> Self {
        Self {
            ring: [PointingEvent {
                t_us: 0,
                dx: 0,
                dy: 0,
                wheel: 0,
                buttons: 0,
                flags: 0,
            }; RING_CAPACITY],
            head: 0,
            tail: 0,
            count: 0,
            t_last_send_us: 0,
            residual_dx: 0,
            residual_dy: 0,
            residual_wheel: 0,
            last_sent_buttons: 0,
            last_seen_buttons: 0,
            send_interval_us: DEFAULT_SEND_INTERVAL_US,
            overflow_count: 0,
            sent_count: 0,
            failed_count: 0,
        }
    }

    /// Enqueue one pointing event with the given monotonic timestamp.
    ///
    /// O(1). On a full ring the **oldest** event is dropped: stale motion
    /// would have been integrated into one sum anyway, while dropping the
    /// newest would eat current motion and button edges.
    pub fn push(&mut self, t_us: u64, dx: i16, dy: i16, wheel: i8, buttons: u8) {
        let mut flags = 0;
        if buttons != self.last_seen_buttons {
            flags |= EVENT_BUTTONS_CHANGED;
        }
        self.last_seen_buttons = buttons;

        if self.count == RING_CAPACITY {
            self.tail = (self.tail + 1) & RING_MASK;
            self.count -= 1;
            self.overflow_count = self.overflow_count.wrapping_add(1);
        }

        self.ring[self.head] = PointingEvent {
            t_us,
            dx,
            dy,
            wheel,
            buttons,
            flags,
        };
        self.head = (self.head + 1) & RING_MASK;
        self.count += 1;
    }

    /// Drop all buffered state on sink disconnect.
    ///
    /// The overflow/send counters survive for diagnostics; everything that
    /// describes in-flight motion is reset and the window restarts at
    /// `t_now_us`.
    pub fn clear(&mut self, t_now_us: u64) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        self.residual_dx = 0;
        self.residual_dy = 0;
        self.residual_wheel = 0;
        self.last_sent_buttons = 0;
        self.last_seen_buttons = 0;
        self.t_last_send_us = t_now_us;
    }

    /// Phase 1: integrate the window ending at `t_now_us`, read-only.
    ///
    /// Returns `None` when there is neither motion nor a button edge to
    /// report. Events stamped after `t_now_us` are left for a later tick
    /// so clock skew cannot pull future input into this window.
    pub fn preview(&self, t_now_us: u64) -> Option<PendingBatch> {
        let mut sum_dx: i32 = 0;
        let mut sum_dy: i32 = 0;
        let mut sum_wheel: i32 = 0;
        let mut buttons = self.last_sent_buttons;
        let mut motion_dirty = false;
        let mut button_dirty = false;
        let mut num_to_consume = 0;

        for i in 0..self.count {
            let ev = &self.ring[(self.tail + i) & RING_MASK];
            if ev.t_us > t_now_us {
                break;
            }
            sum_dx += ev.dx as i32;
            sum_dy += ev.dy as i32;
            sum_wheel += ev.wheel as i32;
            buttons = ev.buttons;
            if ev.dx != 0 || ev.dy != 0 || ev.wheel != 0 {
                motion_dirty = true;
            }
            if ev.flags & EVENT_BUTTONS_CHANGED != 0 {
                button_dirty = true;
            }
            num_to_consume += 1;
        }

        sum_dx += self.residual_dx;
        sum_dy += self.residual_dy;
        sum_wheel += self.residual_wheel;

        if self.residual_dx != 0 || self.residual_dy != 0 || self.residual_wheel != 0 {
            motion_dirty = true;
        }
        if buttons != self.last_sent_buttons {
            button_dirty = true;
        }
        if !motion_dirty && !button_dirty {
            return None;
        }

        // Phase 2: saturate to the outbound field widths and carry the
        // overshoot as residual motion for the next window.
        let dx = sum_dx.clamp(-AXIS_CLAMP, AXIS_CLAMP);
        let dy = sum_dy.clamp(-AXIS_CLAMP, AXIS_CLAMP);
        let wheel = sum_wheel.clamp(-WHEEL_CLAMP, WHEEL_CLAMP);

        let report = MouseReport {
            buttons,
            dx: dx as i16,
            dy: dy as i16,
            wheel: wheel as i8,
        };

        Some(PendingBatch {
            frame: report.to_bytes(),
            num_to_consume,
            residual_dx: sum_dx - dx,
            residual_dy: sum_dy - dy,
            residual_wheel: sum_wheel - wheel,
            buttons,
            t_now_us,
        })
    }

    /// Phase 3: the sink acknowledged the batch; consume its window.
    pub fn commit(&mut self, batch: &PendingBatch) {
        // The producer may have overwritten part of the previewed window
        // if the ring overflowed between phases; never pop past the tail.
        let n = batch.num_to_consume.min(self.count);
        self.tail = (self.tail + n) & RING_MASK;
        self.count -= n;

        self.t_last_send_us = batch.t_now_us;
        self.residual_dx = batch.residual_dx;
        self.residual_dy = batch.residual_dy;
        self.residual_wheel = batch.residual_wheel;
        self.last_sent_buttons = batch.buttons;
        self.sent_count = self.sent_count.wrapping_add(1);
    }

    /// Record a transient send failure. Window state is untouched; the
    /// same events are re-previewed on the next tick.
    pub fn record_failure(&mut self) {
        self.failed_count = self.failed_count.wrapping_add(1);
    }

    /// One tick: preview, send, commit-or-retain.
    pub fn try_send<S: Sink>(&mut self, t_now_us: u64, sink: &mut S) -> TickOutcome {
        if !sink.is_ready() {
            return TickOutcome::SinkNotReady;
        }
        let Some(batch) = self.preview(t_now_us) else {
            return TickOutcome::Idle;
        };
        match sink.send_pointing(batch.frame()) {
            Ok(()) => {
                self.commit(&batch);
                TickOutcome::Sent
            }
            Err(SendError::NotReady) => TickOutcome::Deferred,
            Err(SendError::Transient) => {
                self.record_failure();
                TickOutcome::Failed
            }
        }
    }

    /// Replace the tick period. Takes effect from the caller's next timer
    /// programming; a zero value is ignored.
    pub fn update_send_interval(&mut self, units_1_25ms: u16) {
        if units_1_25ms != 0 {
            self.send_interval_us = units_1_25ms as u64 * INTERVAL_UNIT_US;
        }
    }

    /// Current tick period in microseconds.
    pub fn send_interval_us(&self) -> u64 {
        self.send_interval_us
    }

    /// Left edge of the next integration window (time of the last commit
    /// or clear).
    pub fn t_last_send_us(&self) -> u64 {
        self.t_last_send_us
    }

    /// Number of events waiting in the ring.
    pub fn pending_events(&self) -> usize {
        self.count
    }

    /// Events dropped to ring overflow since bring-up.
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Successful pointing sends since bring-up.
    pub fn sent_count(&self) -> u32 {
        self.sent_count
    }

    /// Transient pointing send failures since bring-up.
    pub fn failed_count(&self) -> u32 {
        self.failed_count
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}
