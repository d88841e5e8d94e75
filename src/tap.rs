//! Single- vs double-tap disambiguation.
//!
//! A tap that survives the timing and drift checks either completes a double
//! tap (when it follows an earlier tap closely enough) or schedules a pending
//! single tap. The pending tap is an explicit task: it is cancelled when a
//! double tap consumes it, replaced by the next tap, and fired by `poll` once
//! due. Times are milliseconds from the host clock.

use log::debug;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapConfig {
    /// Max touch-start to touch-end time of a tap, and max gap between the
    /// two taps of a double tap.
    pub window_ms: u64,
    /// Max per-axis drift in pixels.
    pub radius: f64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            window_ms: 350,
            radius: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Stamp {
    at: Point,
    time: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingTap<T> {
    pub scheduled_at: u64,
    pub due_at: u64,
    pub at: Point,
    pub payload: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Not a tap: too slow, moved too far, or not cancelable.
    Ignored,
    DoubleTap,
    SingleScheduled { due_at: u64 },
}

impl TapOutcome {
    #[cfg(test)]
    pub fn accepted(self) -> bool {
        !matches!(self, TapOutcome::Ignored)
    }
}

#[derive(Debug)]
pub struct TapTracker<T> {
    cfg: TapConfig,
    touch_start: Option<Stamp>,
    first_tap: Option<Stamp>,
    pending: Option<PendingTap<T>>,
}

impl<T> TapTracker<T> {
    pub fn new(cfg: TapConfig) -> Self {
        Self {
            cfg,
            touch_start: None,
            first_tap: None,
            pending: None,
        }
    }

    pub fn on_touch_start(&mut self, at: Point, now: u64) {
        self.touch_start = Some(Stamp { at, time: now });
    }

    /// Feeds the end of a one-finger touch. `payload` is handed back by
    /// `poll` if this tap turns out to be a single tap.
    pub fn on_tap_end(&mut self, at: Point, cancelable: bool, now: u64, payload: T) -> TapOutcome {
        let Some(start) = self.touch_start else {
            return TapOutcome::Ignored;
        };
        let elapsed = now.saturating_sub(start.time);
        if !cancelable || elapsed > self.cfg.window_ms || !self.within(at, start.at, true) {
            debug!(
                "tap ignored: cancelable={cancelable} elapsed={elapsed}ms drift=({:.0}, {:.0})",
                at.x - start.at.x,
                at.y - start.at.y
            );
            return TapOutcome::Ignored;
        }

        let follows_first = self.first_tap.is_some_and(|first| {
            now.saturating_sub(first.time) < self.cfg.window_ms && self.within(at, first.at, true)
        });
        // either way this tap is what the next one pairs with
        self.first_tap = Some(Stamp { at, time: now });
        if follows_first {
            self.cancel_pending();
            return TapOutcome::DoubleTap;
        }

        let due_at = now.saturating_add(self.cfg.window_ms);
        if self.pending.is_some() {
            debug!("pending tap replaced by a new tap");
        }
        self.pending = Some(PendingTap {
            scheduled_at: now,
            due_at,
            at,
            payload,
        });
        TapOutcome::SingleScheduled { due_at }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.due_at)
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Returns the pending single tap once it is due, unless the latest touch
    /// started too far from where that tap ended.
    pub fn poll(&mut self, now: u64) -> Option<PendingTap<T>> {
        if self.pending.as_ref().is_none_or(|p| p.due_at > now) {
            return None;
        }
        let pending = self.pending.take()?;
        let near = match self.touch_start {
            Some(start) => self.within(pending.at, start.at, false),
            None => true,
        };
        if near {
            Some(pending)
        } else {
            debug!("single tap dropped: a later touch started elsewhere");
            None
        }
    }

    fn within(&self, a: Point, b: Point, inclusive: bool) -> bool {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        if inclusive {
            dx <= self.cfg.radius && dy <= self.cfg.radius
        } else {
            dx < self.cfg.radius && dy < self.cfg.radius
        }
    }
}
