//! Per-slot touch tracking that turns multitouch protocol-B frames into
//! browser-style touch-event batches.

use crate::events::{Touch, TouchEvent, TouchKind};
use crate::geometry::{Point, Rect};
use crate::input::AxisRange;

#[derive(Debug, Clone, Default)]
struct SlotState {
    tracking_id: i32, // -1 = inactive
    x_norm: f64,
    y_norm: f64,
    active: bool,
    // per-frame flags
    began: bool,
    moved: bool,
    released: bool,
}

#[derive(Debug)]
pub struct Tracker {
    slots: Vec<SlotState>,
    cur_slot: usize,
    x: AxisRange,
    y: AxisRange,
    /// Screen area the device's surface maps onto.
    screen: Rect,
}

impl Tracker {
    pub fn new(screen: Rect) -> Self {
        Self {
            slots: vec![
                SlotState {
                    tracking_id: -1,
                    ..SlotState::default()
                };
                10
            ],
            cur_slot: 0,
            x: AxisRange { min: 0, max: 4096 },
            y: AxisRange { min: 0, max: 4096 },
            screen,
        }
    }

    pub fn set_norm_ranges(&mut self, x: AxisRange, y: AxisRange) {
        self.x = AxisRange {
            min: x.min,
            max: x.max.max(x.min + 1),
        };
        self.y = AxisRange {
            min: y.min,
            max: y.max.max(y.min + 1),
        };
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = slot.clamp(0, self.slots.len() as i32 - 1) as usize;
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        let s = &mut self.slots[self.cur_slot];
        if tracking_id < 0 {
            if s.active {
                s.released = true;
            }
            s.active = false;
        } else {
            *s = SlotState {
                tracking_id,
                x_norm: s.x_norm,
                y_norm: s.y_norm,
                active: true,
                began: true,
                moved: false,
                released: false,
            };
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        let nx = normalize(raw, self.x);
        let s = &mut self.slots[self.cur_slot];
        s.moved |= s.x_norm != nx;
        s.x_norm = nx;
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        let ny = normalize(raw, self.y);
        let s = &mut self.slots[self.cur_slot];
        s.moved |= s.y_norm != ny;
        s.y_norm = ny;
    }

    /// The kernel dropped events; every finger's state is unknown now.
    pub fn on_dropped(&mut self) -> Option<TouchEvent> {
        let lost: Vec<Touch> = self
            .slots
            .iter()
            .filter(|s| s.active)
            .map(|s| self.touch(s))
            .collect();
        for s in &mut self.slots {
            *s = SlotState {
                tracking_id: -1,
                ..SlotState::default()
            };
        }
        if lost.is_empty() {
            None
        } else {
            Some(TouchEvent::new(TouchKind::Cancel, vec![], lost))
        }
    }

    /// Closes a frame: start, move and end batches, in that order.
    pub fn on_syn_report(&mut self) -> Vec<TouchEvent> {
        let touches: Vec<Touch> = self
            .slots
            .iter()
            .filter(|s| s.active)
            .map(|s| self.touch(s))
            .collect();
        let began: Vec<Touch> = self
            .slots
            .iter()
            .filter(|s| s.active && s.began)
            .map(|s| self.touch(s))
            .collect();
        let moved = self.slots.iter().any(|s| s.active && !s.began && s.moved);
        let released: Vec<Touch> = self
            .slots
            .iter()
            .filter(|s| s.released)
            .map(|s| self.touch(s))
            .collect();

        let mut out = Vec::new();
        if !began.is_empty() {
            out.push(TouchEvent::new(TouchKind::Start, touches.clone(), began));
        }
        if moved {
            let changed = self
                .slots
                .iter()
                .filter(|s| s.active && s.moved)
                .map(|s| self.touch(s))
                .collect();
            out.push(TouchEvent::new(TouchKind::Move, touches.clone(), changed));
        }
        if !released.is_empty() {
            out.push(TouchEvent::new(TouchKind::End, touches, released));
        }

        for s in &mut self.slots {
            s.began = false;
            s.moved = false;
            if s.released {
                s.released = false;
                s.tracking_id = -1;
            }
        }
        out
    }

    fn touch(&self, s: &SlotState) -> Touch {
        let at = Point::new(
            self.screen.x + s.x_norm * self.screen.width(),
            self.screen.y + s.y_norm * self.screen.height(),
        );
        Touch::new(s.tracking_id, at.x, at.y)
    }
}

fn normalize(raw: i32, range: AxisRange) -> f64 {
    ((raw - range.min) as f64 / (range.max - range.min) as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> Tracker {
        let mut t = Tracker::new(Rect::new(0.0, 0.0, 400.0, 600.0));
        t.set_norm_ranges(AxisRange { min: 0, max: 1000 }, AxisRange { min: 0, max: 1000 });
        t
    }

    fn finger(t: &mut Tracker, slot: i32, id: i32, x: i32, y: i32) {
        t.on_slot(slot);
        t.on_tracking_id(id);
        t.on_pos_x(x);
        t.on_pos_y(y);
    }

    #[test]
    fn first_contact_is_a_start() {
        let mut t = tracker();
        finger(&mut t, 0, 11, 500, 500);
        let evs = t.on_syn_report();
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].kind, TouchKind::Start);
        assert_eq!(evs[0].touches, vec![Touch::new(11, 200.0, 300.0)]);
        assert_eq!(evs[0].changed, evs[0].touches);
    }

    #[test]
    fn motion_then_release() {
        let mut t = tracker();
        finger(&mut t, 0, 11, 500, 500);
        t.on_syn_report();

        t.on_slot(0);
        t.on_pos_x(250);
        let evs = t.on_syn_report();
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].kind, TouchKind::Move);
        assert_eq!(evs[0].touches, vec![Touch::new(11, 100.0, 300.0)]);

        // a frame without changes produces nothing
        assert!(t.on_syn_report().is_empty());

        t.on_slot(0);
        t.on_tracking_id(-1);
        let evs = t.on_syn_report();
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].kind, TouchKind::End);
        assert!(evs[0].touches.is_empty());
        assert_eq!(evs[0].changed, vec![Touch::new(11, 100.0, 300.0)]);
    }

    #[test]
    fn second_finger_joins_as_start_with_both_touches() {
        let mut t = tracker();
        finger(&mut t, 0, 1, 100, 100);
        t.on_syn_report();
        finger(&mut t, 1, 2, 900, 100);
        let evs = t.on_syn_report();
        assert_eq!(evs[0].kind, TouchKind::Start);
        assert_eq!(evs[0].touches.len(), 2);
        assert_eq!(evs[0].changed, vec![Touch::new(2, 360.0, 60.0)]);
    }

    #[test]
    fn dropped_events_cancel_active_fingers() {
        let mut t = tracker();
        assert!(t.on_dropped().is_none());
        finger(&mut t, 0, 1, 100, 100);
        t.on_syn_report();
        let ev = t.on_dropped().unwrap();
        assert_eq!(ev.kind, TouchKind::Cancel);
        assert_eq!(ev.changed.len(), 1);
        assert!(t.on_syn_report().is_empty());
    }

    #[test]
    fn positions_are_clamped_to_the_surface() {
        let mut t = tracker();
        finger(&mut t, 0, 1, -50, 2000);
        let evs = t.on_syn_report();
        assert_eq!(evs[0].touches[0], Touch::new(1, 0.0, 600.0));
    }
}
