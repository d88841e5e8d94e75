//! Pinch-zoom, drag and double-tap handling for a zoomable element inside a
//! viewport.
//!
//! `PinchZoom` owns all gesture state. The host feeds it touch events through
//! [`PinchZoom::handle`] and calls [`PinchZoom::tick`] so a pending single tap
//! can fire once the double-tap window has passed (`next_deadline` tells when).
//! Layout is read through the [`Dom`] on every step; only the initial
//! positions and the zoomable's content size are captured at construction.
//! A resized zoomable needs a new controller.

use log::{debug, info, trace};

use crate::events::{EventResponse, Recognized, TargetId, Touch, TouchEvent, TouchKind};
use crate::gestures::{MoveGesture, TouchSession};
use crate::geometry::{Point, Size};
use crate::host::{Clock, CssTransform, Dom, Element};
use crate::tap::{TapConfig, TapOutcome, TapTracker};
use crate::zoom::{AxisFreedom, PinchScaling, Placement, TransformState, ZoomBoundaries, ZoomLimits};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomConfig {
    /// Zoom out so content wider than the viewport fits its width.
    pub initially_zoom_to_viewport_width: bool,
    pub limits: ZoomLimits,
    pub tap: TapConfig,
    pub pinch_scaling: PinchScaling,
}

/// Called with the original touch-end event and its target when a single tap
/// is confirmed.
pub type SingleTapAction = Box<dyn FnMut(&TouchEvent, Option<TargetId>)>;

pub struct PinchZoom<D: Dom, C: Clock> {
    dom: D,
    clock: C,
    limits: ZoomLimits,
    pinch_scaling: PinchScaling,
    initial_zoomable: Point,
    initial_viewport: Point,
    zoomable_size: Size,
    state: TransformState,
    session: TouchSession,
    taps: TapTracker<TouchEvent>,
    single_tap: SingleTapAction,
}

impl<D: Dom, C: Clock> PinchZoom<D, C> {
    /// Starts handling gestures right away. Both elements must have been
    /// laid out, and the zoomable should cover the viewport.
    pub fn new(mut dom: D, clock: C, cfg: ZoomConfig, single_tap: SingleTapAction) -> Self {
        let initial_zoomable = dom.bounding_rect(Element::Zoomable).origin();
        let initial_viewport = dom.bounding_rect(Element::Viewport).origin();
        let zoomable_size = dom.scroll_size(Element::Zoomable);

        dom.attach_listeners();
        dom.restrict_touch_action();
        dom.hide_viewport_overflow();
        info!(
            "pinch zoom on {:.0}x{:.0} content, scale {:.2}..{:.2}",
            zoomable_size.width,
            zoomable_size.height,
            cfg.limits.boundaries.min,
            cfg.limits.boundaries.max
        );

        let mut zoom = Self {
            dom,
            clock,
            limits: cfg.limits,
            pinch_scaling: cfg.pinch_scaling,
            initial_zoomable,
            initial_viewport,
            zoomable_size,
            state: TransformState::default(),
            session: TouchSession::new(),
            taps: TapTracker::new(cfg.tap),
            single_tap,
        };
        if cfg.initially_zoom_to_viewport_width {
            zoom.rescale();
        }
        zoom
    }

    /// Detaches from the page and hands the host back. Must be called before
    /// the controller goes away; a pending single tap is dropped.
    pub fn remove(mut self) -> D {
        self.dom.detach_listeners();
        if self.taps.cancel_pending() {
            debug!("pending single tap dropped on teardown");
        }
        self.dom
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    pub fn boundaries(&self) -> ZoomBoundaries {
        self.limits.boundaries
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    #[cfg(test)]
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.taps.next_deadline()
    }

    /// Fires the pending single tap if it is due. Returns whether it fired.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_ms();
        match self.taps.poll(now) {
            Some(tap) => {
                debug!("single tap at ({:.0}, {:.0})", tap.at.x, tap.at.y);
                (self.single_tap)(&tap.payload, tap.payload.target);
                true
            }
            None => false,
        }
    }

    pub fn handle(&mut self, ev: &TouchEvent) -> EventResponse {
        // a due tap belongs before anything that happened after it
        self.tick();
        match ev.kind {
            TouchKind::Start => {
                self.on_touch_start(ev);
                EventResponse::PASS
            }
            TouchKind::Move => self.on_touch_move(ev),
            TouchKind::End => self.on_touch_end(ev),
            TouchKind::Cancel => {
                self.session.clear();
                EventResponse::PASS
            }
        }
    }

    fn on_touch_start(&mut self, ev: &TouchEvent) {
        if let Some(t) = ev.touches.first() {
            self.taps.on_touch_start(t.client(), self.clock.now_ms());
        }
    }

    fn on_touch_move(&mut self, ev: &TouchEvent) -> EventResponse {
        match MoveGesture::classify(&ev.touches) {
            MoveGesture::Drag(t) => self.drag(&t, ev.cancelable),
            MoveGesture::Pinch(a, b) => self.pinch(&a, &b),
            MoveGesture::Ignored => EventResponse::PASS,
        }
    }

    fn on_touch_end(&mut self, ev: &TouchEvent) -> EventResponse {
        self.session.clear();
        let [changed] = ev.changed.as_slice() else {
            return EventResponse::PASS;
        };
        if !ev.touches.is_empty() {
            return EventResponse::PASS;
        }

        let at = changed.client();
        let now = self.clock.now_ms();
        match self.taps.on_tap_end(at, ev.cancelable, now, ev.clone()) {
            TapOutcome::Ignored => EventResponse::PASS,
            TapOutcome::SingleScheduled { due_at } => {
                trace!("tap at ({:.0}, {:.0}), single due at {due_at}", at.x, at.y);
                EventResponse::recognized(Recognized::TapScheduled, true)
            }
            TapOutcome::DoubleTap => {
                self.double_tap(at);
                EventResponse::recognized(Recognized::DoubleTap, true)
            }
        }
    }

    fn pinch(&mut self, a: &Touch, b: &Touch) -> EventResponse {
        let step = self.session.pinch_step(a, b);
        let scale = self.state.scale;
        // translation and origin only hold within one side of scale 1
        let crosses = (scale >= 1.0 && step.ratio < 1.0) || (scale < 1.0 && step.ratio >= 1.0);
        let new_session = step.new_touches || crosses;

        let (translation, origin) = if new_session {
            trace!("pinch session at ({:.0}, {:.0})", step.centroid.x, step.centroid.y);
            self.session_anchor(step.centroid)
        } else {
            (self.state.translation, self.state.origin)
        };

        self.commit(TransformState {
            scale: self.pinch_scaling.apply(scale, step.ratio),
            translation,
            origin,
        });
        EventResponse::recognized(Recognized::Pinch { new_session }, false)
    }

    fn drag(&mut self, t: &Touch, cancelable: bool) -> EventResponse {
        let scale = self.state.scale;
        // an untouched page still sits at exactly 1, where no origin solves the pan
        if scale <= self.limits.boundaries.min || scale == 1.0 {
            return EventResponse::PASS;
        }

        let delta = self.session.drag_step(t);
        let current = self.dom.bounding_rect(Element::Zoomable).origin();
        let base = self.untransformed_position().add(self.state.translation);
        let origin = Point::new(
            (current.x + delta.x - base.x) / (1.0 - scale),
            (current.y + delta.y - base.y) / (1.0 - scale),
        );

        let freedom = self.commit(TransformState {
            scale,
            translation: self.state.translation,
            origin,
        });
        // once the vertical edge is reached the page may scroll natively
        EventResponse::recognized(Recognized::Drag, cancelable && freedom.vertical_allowed)
    }

    fn double_tap(&mut self, at: Point) {
        let ZoomBoundaries { min, max } = self.limits.boundaries;
        let zoomed_out = self.state.scale - self.limits.resting_scale() < self.limits.epsilon;
        let target = if zoomed_out { (min + max) / 2.0 } else { min };
        debug!(
            "double tap at ({:.0}, {:.0}): scale {:.2} -> {target:.2}",
            at.x, at.y, self.state.scale
        );
        let (translation, origin) = self.session_anchor(at);
        self.commit(TransformState {
            scale: target,
            translation,
            origin,
        });
    }

    /// Zooms content wider than the viewport out to the viewport width and
    /// lowers the minimum scale accordingly.
    fn rescale(&mut self) {
        let container = self.dom.offset_size(Element::Viewport).width;
        let width = self.zoomable_size.width;
        if width <= container {
            self.dom.clear_transform();
            return;
        }

        let scale = container / width;
        let height = self.dom.scroll_size(Element::Viewport).height * scale;
        self.dom.set_viewport_height(height);
        self.limits.boundaries.min = scale;
        info!("fit to viewport width: scale {scale:.3}, viewport height {height:.0}");
        self.commit(TransformState {
            scale,
            translation: Point::ZERO,
            origin: Point::ZERO,
        });
    }

    /// Translation and origin that reproduce the zoomable's current on-screen
    /// rectangle at the current scale while anchoring scaling at `at`.
    fn session_anchor(&self, at: Point) -> (Point, Point) {
        let current = self.dom.bounding_rect(Element::Zoomable).origin();
        let offset = self.scroll_offset();
        let s = self.state.scale;
        let anchored = Point::new(
            (current.x + at.x * (s - 1.0)) / s,
            (current.y + at.y * (s - 1.0)) / s,
        );
        let translation = anchored.sub(self.initial_zoomable).add(offset);
        let origin = at.sub(anchored);
        (translation, origin)
    }

    /// How far the page scrolled the viewport since construction.
    fn scroll_offset(&self) -> Point {
        let now = self.dom.bounding_rect(Element::Viewport).origin();
        self.initial_viewport.sub(now)
    }

    /// Where the zoomable would be without any transform.
    fn untransformed_position(&self) -> Point {
        self.initial_zoomable.sub(self.scroll_offset())
    }

    fn commit(&mut self, proposal: TransformState) -> AxisFreedom {
        let viewport = self.dom.bounding_rect(Element::Viewport);
        let placement = Placement {
            position: self.untransformed_position(),
            size: self.zoomable_size,
        };
        let (state, freedom) =
            self.limits
                .safe_position(self.state.scale, viewport, placement, proposal);
        self.state = state;
        self.update();
        freedom
    }

    fn update(&mut self) {
        self.dom.apply_transform(&CssTransform {
            translation: self.state.translation,
            scale: self.state.scale,
            origin: self.state.origin,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::host::{LayoutProvider, ManualClock, SimulatedDom};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Zoom = PinchZoom<SimulatedDom, Rc<ManualClock>>;

    struct Harness {
        zoom: Zoom,
        clock: Rc<ManualClock>,
        taps: Rc<RefCell<Vec<Option<TargetId>>>>,
    }

    fn harness(content: Size, fit: bool) -> Harness {
        let dom = SimulatedDom::new(Rect::new(0.0, 0.0, 400.0, 600.0), content);
        let clock = Rc::new(ManualClock::new(0));
        let taps = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&taps);
        let cfg = ZoomConfig {
            initially_zoom_to_viewport_width: fit,
            ..ZoomConfig::default()
        };
        let zoom = PinchZoom::new(
            dom,
            Rc::clone(&clock),
            cfg,
            Box::new(move |_ev: &TouchEvent, target| sink.borrow_mut().push(target)),
        );
        Harness { zoom, clock, taps }
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn start(x: f64, y: f64) -> TouchEvent {
        TouchEvent::new(TouchKind::Start, vec![Touch::new(0, x, y)], vec![Touch::new(0, x, y)])
    }

    fn end(x: f64, y: f64) -> TouchEvent {
        TouchEvent::new(TouchKind::End, vec![], vec![Touch::new(0, x, y)])
    }

    fn drag_to(id: i32, x: f64, y: f64) -> TouchEvent {
        TouchEvent::new(TouchKind::Move, vec![Touch::new(id, x, y)], vec![Touch::new(id, x, y)])
    }

    fn pinch(center: Point, distance: f64) -> TouchEvent {
        let a = Touch::new(1, center.x - distance / 2.0, center.y);
        let b = Touch::new(2, center.x + distance / 2.0, center.y);
        TouchEvent::new(TouchKind::Move, vec![a, b], vec![a, b])
    }

    fn tap_at(h: &mut Harness, x: f64, y: f64, t_start: u64, t_end: u64) -> EventResponse {
        h.clock.set(t_start);
        h.zoom.handle(&start(x, y));
        h.clock.set(t_end);
        h.zoom.handle(&end(x, y))
    }

    fn assert_covers_viewport(zoom: &Zoom) {
        let r = zoom.dom().bounding_rect(Element::Zoomable);
        let borders = zoom.dom().viewport_rect().inset(1.0);
        assert!(r.x <= borders.x + 1e-6, "{r:?} vs {borders:?}");
        assert!(r.x2 >= borders.x2 - 1e-6, "{r:?} vs {borders:?}");
        assert!(r.y <= borders.y + 1e-6, "{r:?} vs {borders:?}");
        assert!(r.y2 >= borders.y2 - 1e-6, "{r:?} vs {borders:?}");
    }

    #[test]
    fn construction_prepares_the_page() {
        let h = harness(Size::new(400.0, 600.0), true);
        let dom = h.zoom.dom();
        assert!(dom.listeners_attached);
        assert!(dom.touch_action_restricted);
        assert!(dom.overflow_hidden);
        // content no wider than the viewport stays untransformed
        assert!(dom.transform().is_none());
        assert_eq!(h.zoom.state().scale, 1.0);
    }

    #[test]
    fn wide_content_is_fit_to_viewport_width() {
        let h = harness(Size::new(800.0, 1200.0), true);
        assert_eq!(h.zoom.boundaries().min, 0.5);
        assert_eq!(h.zoom.state().scale, 0.5);
        let r = h.zoom.dom().bounding_rect(Element::Zoomable);
        assert!(approx_eq(r.x, 0.0) && approx_eq(r.x2, 400.0));
        assert!(approx_eq(r.y, 0.0) && approx_eq(r.y2, 600.0));
        assert!(approx_eq(h.zoom.dom().viewport_rect().height(), 600.0));
    }

    #[test]
    fn single_tap_fires_after_the_double_tap_window() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        h.clock.set(0);
        h.zoom.handle(&start(100.0, 100.0));
        h.clock.set(50);
        let resp = h.zoom.handle(&end(105.0, 102.0).with_target(7));
        assert!(resp.default_prevented);
        assert_eq!(resp.gesture, Some(Recognized::TapScheduled));
        assert_eq!(h.zoom.next_deadline(), Some(400));

        h.clock.set(399);
        assert!(!h.zoom.tick());
        h.clock.set(400);
        assert!(h.zoom.tick());
        assert_eq!(*h.taps.borrow(), vec![Some(7)]);
        // nothing zoomed
        assert!(h.zoom.dom().transform().is_none());
    }

    #[test]
    fn double_tap_zooms_without_single_tap() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        tap_at(&mut h, 200.0, 300.0, 0, 10);
        let resp = tap_at(&mut h, 200.0, 300.0, 190, 200);
        assert_eq!(resp.gesture, Some(Recognized::DoubleTap));
        assert!(resp.default_prevented);
        assert!(approx_eq(h.zoom.state().scale, 2.0));

        h.clock.set(2000);
        assert!(!h.zoom.tick());
        assert!(h.taps.borrow().is_empty());

        // the tapped point stays in place
        let r = h.zoom.dom().bounding_rect(Element::Zoomable);
        assert!(approx_eq(r.x, -200.0) && approx_eq(r.y, -300.0));
        assert_covers_viewport(&h.zoom);
    }

    #[test]
    fn second_double_tap_zooms_back_out() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        tap_at(&mut h, 200.0, 300.0, 0, 10);
        tap_at(&mut h, 200.0, 300.0, 100, 110);
        assert!(approx_eq(h.zoom.state().scale, 2.0));

        tap_at(&mut h, 50.0, 50.0, 1000, 1010);
        tap_at(&mut h, 50.0, 50.0, 1100, 1110);
        assert_eq!(h.zoom.state().scale, 1.01);
        assert_covers_viewport(&h.zoom);
    }

    #[test]
    fn stale_tap_is_ignored() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        let resp = tap_at(&mut h, 100.0, 100.0, 0, 500);
        assert_eq!(resp, EventResponse::PASS);
        h.clock.set(5000);
        assert!(!h.zoom.tick());
        assert!(h.taps.borrow().is_empty());
    }

    #[test]
    fn handle_flushes_a_due_single_tap_first() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        tap_at(&mut h, 100.0, 100.0, 0, 20);
        h.clock.set(900);
        h.zoom.handle(&start(100.0, 100.0));
        assert_eq!(h.taps.borrow().len(), 1);
    }

    #[test]
    fn spreading_fingers_never_decreases_scale() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        let center = Point::new(200.0, 300.0);
        let mut last = 0.0;
        let mut distance = 100.0;
        while distance <= 400.0 {
            let resp = h.zoom.handle(&pinch(center, distance));
            assert!(!resp.default_prevented);
            let scale = h.zoom.state().scale;
            assert!(scale >= last, "{scale} < {last}");
            assert!(scale <= 3.0);
            assert_covers_viewport(&h.zoom);
            last = scale;
            distance += 10.0;
        }
        assert_eq!(last, 3.0);
    }

    #[test]
    fn pinch_out_is_centered_on_the_fingers() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        let center = Point::new(200.0, 300.0);
        let first = h.zoom.handle(&pinch(center, 100.0));
        assert_eq!(first.gesture, Some(Recognized::Pinch { new_session: true }));
        let second = h.zoom.handle(&pinch(center, 200.0));
        assert_eq!(second.gesture, Some(Recognized::Pinch { new_session: false }));
        assert!(approx_eq(h.zoom.state().scale, 2.02));
        let r = h.zoom.dom().bounding_rect(Element::Zoomable);
        assert!(approx_eq((r.x + r.x2) / 2.0, 200.0));
        assert!(approx_eq((r.y + r.y2) / 2.0, 300.0));
    }

    #[test]
    fn pinching_in_past_one_starts_a_new_session() {
        let mut h = harness(Size::new(800.0, 1200.0), true);
        let center = Point::new(200.0, 300.0);
        h.zoom.handle(&pinch(center, 100.0));
        h.zoom.handle(&pinch(center, 300.0));
        assert!(h.zoom.state().scale > 1.0);
        let resp = h.zoom.handle(&pinch(center, 150.0));
        assert_eq!(resp.gesture, Some(Recognized::Pinch { new_session: true }));
        assert!(h.zoom.state().scale < 1.0);
        assert!(h.zoom.state().scale >= 0.5);
        assert_covers_viewport(&h.zoom);
    }

    #[test]
    fn additive_pinch_scaling() {
        let dom = SimulatedDom::new(Rect::new(0.0, 0.0, 400.0, 600.0), Size::new(400.0, 600.0));
        let cfg = ZoomConfig {
            pinch_scaling: PinchScaling::Additive,
            ..ZoomConfig::default()
        };
        let mut zoom = PinchZoom::new(dom, ManualClock::new(0), cfg, Box::new(|_: &TouchEvent, _| {}));
        let center = Point::new(200.0, 300.0);
        zoom.handle(&pinch(center, 100.0));
        zoom.handle(&pinch(center, 200.0));
        assert!(approx_eq(zoom.state().scale, 2.01));
    }

    #[test]
    fn drag_is_a_no_op_at_minimum_scale() {
        let mut h = harness(Size::new(800.0, 1200.0), true);
        let before = *h.zoom.state();
        for (x, y) in [(100.0, 100.0), (150.0, 180.0), (20.0, 400.0)] {
            let resp = h.zoom.handle(&drag_to(3, x, y));
            assert_eq!(resp, EventResponse::PASS);
        }
        assert_eq!(h.zoom.state().translation, before.translation);
        assert_eq!(h.zoom.state().scale, before.scale);
    }

    #[test]
    fn drag_before_any_zoom_leaves_a_shrinkable_page_alone() {
        let dom = SimulatedDom::new(Rect::new(0.0, 0.0, 400.0, 600.0), Size::new(400.0, 600.0));
        let mut cfg = ZoomConfig::default();
        cfg.limits.boundaries.min = 0.5;
        let mut zoom = PinchZoom::new(dom, ManualClock::new(0), cfg, Box::new(|_: &TouchEvent, _| {}));

        assert_eq!(zoom.handle(&drag_to(3, 200.0, 300.0)), EventResponse::PASS);
        assert_eq!(zoom.handle(&drag_to(3, 150.0, 250.0)), EventResponse::PASS);
        let s = zoom.state();
        assert_eq!(s.scale, 1.0);
        assert!(!s.origin.x.is_nan() && !s.origin.y.is_nan());
        assert!(zoom.dom().transform().is_none());
    }

    #[test]
    fn drag_pans_zoomed_content() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        tap_at(&mut h, 200.0, 300.0, 0, 10);
        tap_at(&mut h, 200.0, 300.0, 100, 110);

        let first = h.zoom.handle(&drag_to(9, 200.0, 300.0));
        assert_eq!(first.gesture, Some(Recognized::Drag));
        let r = h.zoom.dom().bounding_rect(Element::Zoomable);
        assert!(approx_eq(r.x, -200.0) && approx_eq(r.y, -300.0));

        let resp = h.zoom.handle(&drag_to(9, 230.0, 310.0));
        assert!(resp.default_prevented);
        let r = h.zoom.dom().bounding_rect(Element::Zoomable);
        assert!(approx_eq(r.x, -170.0), "{r:?}");
        assert!(approx_eq(r.y, -290.0), "{r:?}");
        assert!(approx_eq(h.zoom.state().scale, 2.0));
    }

    #[test]
    fn vertical_edge_hands_over_to_native_scroll() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        tap_at(&mut h, 200.0, 300.0, 0, 10);
        tap_at(&mut h, 200.0, 300.0, 100, 110);

        h.zoom.handle(&drag_to(9, 200.0, 300.0));
        let resp = h.zoom.handle(&drag_to(9, 200.0, 700.0));
        assert!(!resp.default_prevented);
        let r = h.zoom.dom().bounding_rect(Element::Zoomable);
        assert!(approx_eq(r.y, 1.0), "{r:?}");
        assert_covers_viewport(&h.zoom);

        // uncancelable events are never prevented either
        let resp = h.zoom.handle(&drag_to(9, 210.0, 690.0).non_cancelable());
        assert!(!resp.default_prevented);
    }

    #[test]
    fn page_scroll_is_followed() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        tap_at(&mut h, 200.0, 300.0, 0, 10);
        tap_at(&mut h, 200.0, 300.0, 100, 110);

        h.zoom.dom_mut().scroll_by(0.0, 50.0);
        h.zoom.handle(&drag_to(4, 100.0, 100.0));
        h.zoom.handle(&drag_to(4, 90.0, 80.0));
        assert_covers_viewport(&h.zoom);
        let r = h.zoom.dom().bounding_rect(Element::Zoomable);
        assert!(approx_eq(r.x, -210.0), "{r:?}");
        assert!(approx_eq(r.y, -370.0), "{r:?}");
    }

    #[test]
    fn three_fingers_and_cancel_are_ignored() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        let t = Touch::new(1, 10.0, 10.0);
        let three = TouchEvent::new(TouchKind::Move, vec![t, t, t], vec![]);
        assert_eq!(h.zoom.handle(&three), EventResponse::PASS);
        let cancel = TouchEvent::new(TouchKind::Cancel, vec![], vec![t]);
        assert_eq!(h.zoom.handle(&cancel), EventResponse::PASS);
        assert!(h.zoom.dom().transform().is_none());
    }

    proptest! {
        #[test]
        fn random_gestures_keep_content_covering_viewport(
            steps in prop::collection::vec(
                (any::<bool>(), 0.0f64..400.0, 0.0f64..600.0, 20.0f64..380.0),
                1..120,
            ),
        ) {
            let mut h = harness(Size::new(800.0, 1200.0), true);
            for (is_drag, x, y, distance) in steps {
                let ev = if is_drag {
                    drag_to(5, x, y)
                } else {
                    pinch(Point::new(x.clamp(50.0, 350.0), y.clamp(50.0, 550.0)), distance)
                };
                h.zoom.handle(&ev);
                let s = h.zoom.state().scale;
                prop_assert!((0.5..=3.0).contains(&s));
                prop_assert!(s != 1.0);
                assert_covers_viewport(&h.zoom);
            }
        }
    }

    #[test]
    fn remove_detaches_listeners() {
        let mut h = harness(Size::new(400.0, 600.0), false);
        tap_at(&mut h, 100.0, 100.0, 0, 10);
        let taps = Rc::clone(&h.taps);
        let dom = h.zoom.remove();
        assert!(!dom.listeners_attached);
        assert!(taps.borrow().is_empty());
    }
}
