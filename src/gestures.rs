//! Touch-session bookkeeping: which fingers belong to the running pinch or
//! drag, and where they were on the previous move.

use crate::events::Touch;
use crate::geometry::{Point, center_of_points, point_distance};

/// How a move event is routed, decided by the number of fingers down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveGesture {
    Drag(Touch),
    Pinch(Touch, Touch),
    Ignored,
}

impl MoveGesture {
    pub fn classify(touches: &[Touch]) -> Self {
        match touches {
            [one] => MoveGesture::Drag(*one),
            [a, b] => MoveGesture::Pinch(*a, *b),
            _ => MoveGesture::Ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchStep {
    /// Either finger was not part of the running session.
    pub new_touches: bool,
    /// Distance now over distance on the previous frame; 1 on a new session.
    pub ratio: f64,
    pub centroid: Point,
}

#[derive(Debug, Default)]
pub struct TouchSession {
    ids: Vec<i32>,
    last_pinch: (Point, Point),
    last_drag: Point,
}

impl TouchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_tracking(&self, id: i32) -> bool {
        self.ids.contains(&id)
    }

    pub fn pinch_step(&mut self, a: &Touch, b: &Touch) -> PinchStep {
        let new_touches = !(self.is_tracking(a.identifier) && self.is_tracking(b.identifier));
        let (pa, pb) = (a.client(), b.client());
        if new_touches {
            self.last_pinch = (pa, pb);
        }

        let previous = point_distance(self.last_pinch.0, self.last_pinch.1);
        let current = point_distance(pa, pb);
        // fingers on the same pixel give no usable ratio
        let ratio = if previous > 0.0 { current / previous } else { 1.0 };

        self.last_pinch = (pa, pb);
        self.ids = vec![a.identifier, b.identifier];

        PinchStep {
            new_touches,
            ratio,
            centroid: center_of_points(&[pa, pb]),
        }
    }

    /// Movement since the previous drag frame, zero on a fresh finger.
    pub fn drag_step(&mut self, t: &Touch) -> Point {
        let at = t.client();
        let delta = if self.is_tracking(t.identifier) && self.ids.len() == 1 {
            at.sub(self.last_drag)
        } else {
            Point::ZERO
        };
        self.ids = vec![t.identifier];
        self.last_drag = at;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_finger_count() {
        let t = Touch::new(1, 0.0, 0.0);
        assert!(matches!(MoveGesture::classify(&[t]), MoveGesture::Drag(_)));
        assert!(matches!(MoveGesture::classify(&[t, t]), MoveGesture::Pinch(..)));
        assert_eq!(MoveGesture::classify(&[]), MoveGesture::Ignored);
        assert_eq!(MoveGesture::classify(&[t, t, t]), MoveGesture::Ignored);
    }

    #[test]
    fn pinch_ratio_follows_finger_distance() {
        let mut s = TouchSession::new();
        let first = s.pinch_step(&Touch::new(1, 100.0, 100.0), &Touch::new(2, 200.0, 100.0));
        assert!(first.new_touches);
        assert_eq!(first.ratio, 1.0);
        assert_eq!(first.centroid, Point::new(150.0, 100.0));

        let next = s.pinch_step(&Touch::new(1, 50.0, 100.0), &Touch::new(2, 250.0, 100.0));
        assert!(!next.new_touches);
        assert_eq!(next.ratio, 2.0);
    }

    #[test]
    fn replaced_finger_restarts_pinch() {
        let mut s = TouchSession::new();
        s.pinch_step(&Touch::new(1, 0.0, 0.0), &Touch::new(2, 100.0, 0.0));
        let step = s.pinch_step(&Touch::new(1, 0.0, 0.0), &Touch::new(7, 300.0, 0.0));
        assert!(step.new_touches);
        assert_eq!(step.ratio, 1.0);
    }

    #[test]
    fn coincident_fingers_do_not_divide_by_zero() {
        let mut s = TouchSession::new();
        s.pinch_step(&Touch::new(1, 5.0, 5.0), &Touch::new(2, 5.0, 5.0));
        let step = s.pinch_step(&Touch::new(1, 0.0, 5.0), &Touch::new(2, 10.0, 5.0));
        assert_eq!(step.ratio, 1.0);
    }

    #[test]
    fn drag_delta_starts_at_zero() {
        let mut s = TouchSession::new();
        assert_eq!(s.drag_step(&Touch::new(4, 10.0, 10.0)), Point::ZERO);
        assert_eq!(s.drag_step(&Touch::new(4, 15.0, 7.0)), Point::new(5.0, -3.0));
        s.clear();
        assert_eq!(s.drag_step(&Touch::new(4, 30.0, 30.0)), Point::ZERO);
    }

    #[test]
    fn drag_after_pinch_is_fresh() {
        let mut s = TouchSession::new();
        s.pinch_step(&Touch::new(1, 0.0, 0.0), &Touch::new(2, 100.0, 0.0));
        assert_eq!(s.drag_step(&Touch::new(1, 40.0, 0.0)), Point::ZERO);
    }
}
